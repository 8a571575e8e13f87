use gix::ObjectId;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use repo_statistics::memory_store::MemoryObjectStore;
use repo_statistics::object_store::{EntryMode, ObjectKind, TreeEntry};
use repo_statistics::report::{
    BiggestObjects, BlobExtremes, CheckoutStats, CommitExtremes, Count, CountAndSize,
    HistoryStructure, Report, RepositorySize, TreeExtremes, TreeTotals,
};
use repo_statistics::{Analyzer, Error};

fn oid(n: u8) -> ObjectId {
    ObjectId::try_from([n; 20].as_slice()).unwrap()
}

fn analyze(store: MemoryObjectStore) -> Report {
    Analyzer::new(store).num_workers(4).run().unwrap()
}

fn file(name: &str, blob: ObjectId) -> TreeEntry {
    TreeEntry::new(name, EntryMode::Blob, ObjectKind::Blob, blob)
}

#[test]
fn empty_repository_reports_all_zeroes() {
    let report = analyze(MemoryObjectStore::new());
    assert_eq!(report, Report::default());
}

#[test]
fn single_commit_with_the_empty_tree() {
    let mut store = MemoryObjectStore::new();
    store.insert_tree(oid(10), 10, vec![]);
    store.insert_commit(oid(1), 123, &[], oid(10));
    store.add_reference("refs/heads/main");

    let report = analyze(store);
    assert_eq!(
        report,
        Report {
            repository_size: RepositorySize {
                commits: CountAndSize {
                    count: 1,
                    size: 123,
                },
                trees: TreeTotals::default(),
                blobs: CountAndSize::default(),
                annotated_tags: Count::default(),
                references: Count { count: 1 },
            },
            biggest_objects: BiggestObjects {
                commits: CommitExtremes {
                    max_size: 123,
                    max_parents: 0,
                },
                trees: TreeExtremes::default(),
                blobs: BlobExtremes::default(),
            },
            history_structure: HistoryStructure {
                max_depth: 1,
                max_tag_depth: 0,
            },
            biggest_checkouts: CheckoutStats::default(),
        }
    );
}

#[test]
fn linear_history_of_five_commits() {
    let mut store = MemoryObjectStore::new();
    for n in 1..=5u8 {
        store.insert_blob(oid(20 + n), 10);
        store.insert_tree(oid(10 + n), 30, vec![file("f", oid(20 + n))]);
        let parents = if n == 1 { vec![] } else { vec![oid(n - 1)] };
        store.insert_commit(oid(n), 200 + u64::from(n), &parents, oid(10 + n));
    }
    store.add_reference("refs/heads/main");

    let report = analyze(store);
    assert_eq!(
        report.repository_size,
        RepositorySize {
            commits: CountAndSize {
                count: 5,
                size: 201 + 202 + 203 + 204 + 205,
            },
            trees: TreeTotals {
                count: 5,
                size: 150,
                entries: 5,
            },
            blobs: CountAndSize {
                count: 5,
                size: 50,
            },
            annotated_tags: Count::default(),
            references: Count { count: 1 },
        }
    );
    assert_eq!(
        report.biggest_objects,
        BiggestObjects {
            commits: CommitExtremes {
                max_size: 205,
                max_parents: 1,
            },
            trees: TreeExtremes { max_entries: 1 },
            blobs: BlobExtremes { max_size: 10 },
        }
    );
    assert_eq!(report.history_structure.max_depth, 5);
    assert_eq!(
        report.biggest_checkouts,
        CheckoutStats {
            num_directories: 1,
            max_path_depth: 1,
            max_path_length: 1,
            num_files: 1,
            total_file_size: 10,
            num_symlinks: 0,
            num_submodules: 0,
        }
    );
}

#[test]
fn diamond_history() {
    let mut store = MemoryObjectStore::new();
    store.insert_blob(oid(20), 10);
    store.insert_tree(oid(10), 30, vec![file("f", oid(20))]);
    store.insert_commit(oid(1), 100, &[], oid(10));
    store.insert_commit(oid(2), 100, &[oid(1)], oid(10));
    store.insert_commit(oid(3), 100, &[oid(1)], oid(10));
    store.insert_commit(oid(4), 100, &[oid(2), oid(3)], oid(10));

    let report = analyze(store);
    assert_eq!(report.history_structure.max_depth, 3);
    assert_eq!(report.biggest_objects.commits.max_parents, 2);
    assert_eq!(report.repository_size.commits.count, 4);
}

#[test]
fn tag_chain_of_three() {
    let mut store = MemoryObjectStore::new();
    store.insert_tree(oid(10), 10, vec![]);
    store.insert_commit(oid(1), 100, &[], oid(10));
    store.insert_tag(oid(21), oid(1), Some(ObjectKind::Commit));
    store.insert_tag(oid(22), oid(21), Some(ObjectKind::Tag));
    store.insert_tag(oid(23), oid(22), Some(ObjectKind::Tag));

    let report = analyze(store);
    assert_eq!(report.repository_size.annotated_tags.count, 3);
    assert_eq!(report.history_structure.max_tag_depth, 3);
}

#[test]
fn checkout_with_submodule_and_symlink() {
    let mut store = MemoryObjectStore::new();
    store.insert_blob(oid(20), 100);
    store.insert_blob(oid(21), 4);
    store.insert_blob(oid(22), 50);
    store.insert_tree(oid(11), 20, vec![file("file", oid(22))]);
    store.insert_tree(
        oid(10),
        80,
        vec![
            file("file.txt", oid(20)),
            TreeEntry::new("link", EntryMode::Symlink, ObjectKind::Blob, oid(21)),
            TreeEntry::new("sub", EntryMode::Submodule, ObjectKind::Commit, oid(99)),
            TreeEntry::new("dir", EntryMode::Tree, ObjectKind::Tree, oid(11)),
        ],
    );
    store.insert_commit(oid(1), 100, &[], oid(10));

    let report = analyze(store);
    assert_eq!(
        report.biggest_checkouts,
        CheckoutStats {
            num_directories: 2,
            max_path_depth: 2,
            max_path_length: 8,
            num_files: 2,
            total_file_size: 150,
            num_symlinks: 1,
            num_submodules: 1,
        }
    );
    assert_eq!(
        report.repository_size.trees,
        TreeTotals {
            count: 2,
            size: 100,
            entries: 5,
        }
    );
    assert_eq!(
        report.repository_size.blobs,
        CountAndSize {
            count: 3,
            size: 154,
        }
    );
}

#[test]
fn commits_sharing_a_root_tree_reuse_its_checkout() {
    let mut store = MemoryObjectStore::new();
    store.insert_blob(oid(20), 10);
    store.insert_tree(oid(10), 30, vec![file("f", oid(20))]);
    store.insert_commit(oid(1), 100, &[], oid(10));
    store.insert_commit(oid(2), 100, &[oid(1)], oid(10));
    store.insert_commit(oid(3), 100, &[oid(2)], oid(10));

    let report = analyze(store);
    assert_eq!(report.biggest_checkouts.num_files, 1);
    assert_eq!(report.biggest_checkouts.total_file_size, 10);
}

#[test]
fn duplicate_iteration_entries_are_idempotent() {
    let mut plain = MemoryObjectStore::new();
    plain.insert_blob(oid(20), 10);
    plain.insert_tree(oid(10), 30, vec![file("f", oid(20))]);
    plain.insert_commit(oid(1), 100, &[], oid(10));

    let mut noisy = plain.clone();
    for n in [1u8, 10, 20] {
        noisy.repeat_visit(oid(n));
        noisy.repeat_visit(oid(n));
    }

    assert_eq!(analyze(noisy), analyze(plain));
}

#[test]
fn iteration_order_does_not_change_the_report() {
    // Same objects, children-first versus parents-first insertion.
    let mut forward = MemoryObjectStore::new();
    forward.insert_blob(oid(20), 10);
    forward.insert_tree(oid(10), 30, vec![file("f", oid(20))]);
    forward.insert_commit(oid(1), 100, &[], oid(10));
    forward.insert_commit(oid(2), 110, &[oid(1)], oid(10));

    let mut backward = MemoryObjectStore::new();
    backward.insert_commit(oid(2), 110, &[oid(1)], oid(10));
    backward.insert_commit(oid(1), 100, &[], oid(10));
    backward.insert_tree(oid(10), 30, vec![file("f", oid(20))]);
    backward.insert_blob(oid(20), 10);

    assert_eq!(analyze(forward), analyze(backward));
}

#[test]
fn repeated_runs_produce_equal_reports() {
    let mut store = MemoryObjectStore::new();
    store.insert_blob(oid(20), 10);
    store.insert_tree(oid(10), 30, vec![file("f", oid(20))]);
    store.insert_commit(oid(1), 100, &[], oid(10));
    store.add_reference("refs/heads/main");
    store.add_reference("refs/tags/v1");

    assert_eq!(analyze(store.clone()), analyze(store));
}

#[test]
fn default_worker_count_is_used_without_an_override() {
    let mut store = MemoryObjectStore::new();
    store.insert_blob(oid(20), 10);
    let report = Analyzer::new(store).run().unwrap();
    assert_eq!(report.repository_size.blobs.count, 1);
}

#[test]
fn a_failing_lookup_aborts_the_run() {
    let mut store = MemoryObjectStore::new();
    store.insert_blob(oid(20), 10);
    store.visit_dangling(oid(77));

    let err = Analyzer::new(store).num_workers(4).run().unwrap_err();
    match err {
        Error::Lookup { oid: failed, .. } => assert_eq!(failed, oid(77)),
        other => panic!("expected a lookup failure, got {other:?}"),
    }
}

fn blob_layouts() -> impl Strategy<Value = (Vec<u64>, Vec<usize>)> {
    prop::collection::vec(1u64..=4096, 1..12).prop_flat_map(|sizes| {
        let indexes: Vec<usize> = (0..sizes.len()).collect();
        (Just(sizes), Just(indexes).prop_shuffle())
    })
}

fn store_with_blob_order(sizes: &[u64], order: &[usize]) -> MemoryObjectStore {
    let mut store = MemoryObjectStore::new();
    for &i in order {
        store.insert_blob(oid(100 + i as u8), sizes[i]);
    }
    let entries = (0..sizes.len())
        .map(|i| file(&format!("f{i}"), oid(100 + i as u8)))
        .collect();
    store.insert_tree(oid(10), 64, entries);
    store.insert_commit(oid(1), 200, &[], oid(10));
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn report_is_a_function_of_the_object_set_only((sizes, permutation) in blob_layouts()) {
        let natural: Vec<usize> = (0..sizes.len()).collect();
        let a = analyze(store_with_blob_order(&sizes, &natural));
        let b = analyze(store_with_blob_order(&sizes, &permutation));
        prop_assert_eq!(a, b);
    }
}
