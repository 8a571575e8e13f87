//! A fixed-size pool of worker threads over a shared FIFO queue.
//!
//! The queue is a single `Mutex<VecDeque>` plus one `Condvar`. Shutdown is
//! signalled by a single sentinel entry that is left at the front of the
//! queue so that every worker observes it exactly once. Handler failures
//! land in a result slot guarded by the queue mutex; the first one recorded
//! wins and is returned from [`WorkerPool::shutdown`].

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crate::error::{Error, Result};

enum Item<T> {
    Work(T),
    Shutdown,
}

struct State<T> {
    queue: VecDeque<Item<T>>,
    failure: Option<Error>,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

pub struct WorkerPool<T> {
    shared: Arc<Shared<T>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawns `num_workers` threads, each running the handler produced for
    /// it by `make_handler`. Handlers own their per-worker state (object
    /// store handles, scratch buffers); the factory runs on the calling
    /// thread.
    pub fn spawn<H, F>(num_workers: usize, mut make_handler: F) -> Self
    where
        F: FnMut(usize) -> H,
        H: FnMut(T) -> Result<()> + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                failure: None,
            }),
            ready: Condvar::new(),
        });

        let workers = (0..num_workers)
            .map(|worker_index| {
                let shared = Arc::clone(&shared);
                let handler = make_handler(worker_index);
                std::thread::Builder::new()
                    .name(format!("object-worker-{worker_index}"))
                    .spawn(move || worker_loop(shared, handler))
                    .expect("spawning a worker thread should succeed")
            })
            .collect();

        WorkerPool { shared, workers }
    }

    /// Enqueues one work item and wakes one waiting worker.
    ///
    /// Safe from a single producer while workers run; workers themselves
    /// never enqueue.
    pub fn submit(&self, item: T) {
        let mut state = self.shared.state.lock().unwrap();
        state.queue.push_back(Item::Work(item));
        self.shared.ready.notify_one();
    }

    /// Enqueues the shutdown sentinel, wakes every worker, and joins them
    /// all. Returns the first handler failure recorded, if any.
    pub fn shutdown(self) -> Result<()> {
        let WorkerPool { shared, workers } = self;

        {
            let mut state = shared.state.lock().unwrap();
            state.queue.push_back(Item::Shutdown);
        }
        shared.ready.notify_all();

        for handle in workers {
            handle.join().expect("worker thread should not panic");
        }

        let mut state = shared.state.lock().unwrap();
        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn worker_loop<T, H>(shared: Arc<Shared<T>>, mut handler: H)
where
    H: FnMut(T) -> Result<()>,
{
    loop {
        let item = {
            let mut state = shared.state.lock().unwrap();
            loop {
                match state.queue.front() {
                    None => state = shared.ready.wait(state).unwrap(),
                    // The sentinel stays in place for the other workers.
                    Some(Item::Shutdown) => return,
                    Some(Item::Work(_)) => match state.queue.pop_front() {
                        Some(Item::Work(item)) => break item,
                        _ => unreachable!("front of the queue was a work item"),
                    },
                }
            }
        };

        if let Err(err) = handler(item) {
            let mut state = shared.state.lock().unwrap();
            if state.failure.is_none() {
                state.failure = Some(err);
            }
            // Exit early; the remaining workers keep draining the queue.
            return;
        }
    }
}
