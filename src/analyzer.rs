//! Orchestrates one statistics run.
//!
//! The analyzer owns all per-run state: it spins up the worker pool, feeds
//! it one work item per iterated object identifier, waits for the pool to
//! drain, and then runs the single-threaded aggregation stages over the
//! quiesced tables. Any failure aborts the run after the workers have been
//! joined; no partial report is ever produced.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::accumulator::{AccumulatedTables, CommitTable, ObjectAccumulator};
use crate::error::Result;
use crate::object_store::ObjectStore;
use crate::report::{
    BiggestObjects, BlobExtremes, CheckoutStats, CommitExtremes, Count, CountAndSize,
    HistoryStructure, Report, RepositorySize, TreeExtremes, TreeTotals,
};
use crate::tag_chain::TagDepthResolver;
use crate::tree_rollup::TreeAggregator;
use crate::worker_pool::WorkerPool;

/// Default worker count: one per hardware thread, floor of four.
fn default_num_workers() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
        .max(4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Iterating,
    Draining,
    Aggregating,
    Done,
    Failed,
}

fn transition(phase: &mut Phase, next: Phase) {
    debug!("analysis phase {:?} -> {:?}", phase, next);
    *phase = next;
}

pub struct Analyzer<S> {
    store: S,
    num_workers: usize,
}

impl<S: ObjectStore> Analyzer<S> {
    pub fn new(store: S) -> Self {
        Analyzer {
            store,
            num_workers: default_num_workers(),
        }
    }

    /// Overrides the worker count (floor 1), for embedders and tests.
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn run(self) -> Result<Report> {
        let mut phase = Phase::Idle;
        let result = self.execute(&mut phase);
        let end = if result.is_ok() {
            Phase::Done
        } else {
            Phase::Failed
        };
        transition(&mut phase, end);
        result
    }

    fn execute(self, phase: &mut Phase) -> Result<Report> {
        let t_start = Instant::now();
        let store = &self.store;
        let accumulator = Arc::new(ObjectAccumulator::new());

        transition(phase, Phase::Iterating);
        debug!("accumulating objects with {} workers", self.num_workers);
        let pool = WorkerPool::spawn(self.num_workers, |_| {
            let mut reader = store.reader();
            let accumulator = Arc::clone(&accumulator);
            move |oid| accumulator.process(&mut reader, oid)
        });

        let mut num_objects = 0u64;
        let iteration = store.for_each_object_id(&mut |oid| {
            num_objects += 1;
            // The identifier is copied into the work item; nothing from the
            // iterator's buffers is retained.
            pool.submit(oid);
            Ok(())
        });

        transition(phase, Phase::Draining);
        let drained = pool.shutdown();
        iteration?;
        drained?;
        debug!(
            "accumulated {num_objects} objects in {:.6}s",
            t_start.elapsed().as_secs_f64()
        );

        transition(phase, Phase::Aggregating);
        let tables = Arc::try_unwrap(accumulator)
            .ok()
            .expect("joined workers should have released the accumulator")
            .into_tables();
        let report = assemble(tables, store)?;
        debug!("report assembled in {:.6}s", t_start.elapsed().as_secs_f64());
        Ok(report)
    }
}

fn assemble<S: ObjectStore>(tables: AccumulatedTables, store: &S) -> Result<Report> {
    let AccumulatedTables {
        commits,
        mut trees,
        blobs,
        mut tags,
    } = tables;
    let CommitTable {
        root_trees,
        total_size: commits_total_size,
        max_size: commits_max_size,
        max_parents,
        dag,
    } = commits;

    let mut biggest_checkouts = CheckoutStats::default();
    {
        let mut aggregator = TreeAggregator::new(&mut trees.records, &blobs.sizes);
        for root in root_trees.values() {
            let stats = aggregator.roll_up_root(*root)?;
            biggest_checkouts.max_merge(&stats);
        }
    }

    let max_tag_depth = TagDepthResolver::new(&mut tags.records).max_depth()?;
    let max_depth = dag.max_depth();

    let mut num_references = 0u64;
    store.for_each_reference_name(&mut |_name| num_references += 1)?;

    Ok(Report {
        repository_size: RepositorySize {
            commits: CountAndSize {
                count: root_trees.len() as u64,
                size: commits_total_size,
            },
            trees: TreeTotals {
                count: trees.records.len() as u64,
                size: trees.total_size,
                entries: trees.total_entries,
            },
            blobs: CountAndSize {
                count: blobs.sizes.len() as u64,
                size: blobs.total_size,
            },
            annotated_tags: Count {
                count: tags.records.len() as u64,
            },
            references: Count {
                count: num_references,
            },
        },
        biggest_objects: BiggestObjects {
            commits: CommitExtremes {
                max_size: commits_max_size,
                max_parents,
            },
            trees: TreeExtremes {
                max_entries: trees.max_entries,
            },
            blobs: BlobExtremes {
                max_size: blobs.max_size,
            },
        },
        history_structure: HistoryStructure {
            max_depth,
            max_tag_depth,
        },
        biggest_checkouts,
    })
}
