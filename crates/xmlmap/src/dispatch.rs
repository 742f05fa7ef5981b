//! Completion contexts: where a finished conversion is handed back.
//!
//! A conversion runs on a worker; its completion handler is wrapped in a
//! [`Job`] and passed to a [`CompletionContext`], which decides the thread
//! the handler runs on.

use std::fmt;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

/// A completion handler bound to its result, ready to run once.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Destination for completion jobs.
pub trait CompletionContext: Send + Sync + 'static {
    /// Schedule `job` to run on this context.
    fn dispatch(&self, job: Job);
}

/// Runs completion jobs as tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    handle: Handle,
}

impl RuntimeContext {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Context for the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl CompletionContext for RuntimeContext {
    /// Jobs dispatched after the runtime has shut down are discarded with a
    /// warning.
    fn dispatch(&self, job: Job) {
        let guard = JobGuard(Some(job));
        self.handle.spawn(async move { guard.run() });
    }
}

/// Warns when a spawned job is dropped before it ran.
struct JobGuard(Option<Job>);

impl JobGuard {
    fn run(mut self) {
        if let Some(job) = self.0.take() {
            job();
        }
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        if self.0.is_some() {
            warn!("completion runtime shut down; completion discarded");
        }
    }
}

/// Explicit task queue owned by one thread, typically the application's main
/// or UI thread.
///
/// Jobs dispatched through any [`MainQueueHandle`] run only when the owner
/// drains the queue with [`run_pending`](Self::run_pending),
/// [`run_next`](Self::run_next) or [`blocking_run_next`](Self::blocking_run_next).
pub struct MainQueue {
    tx: UnboundedSender<Job>,
    rx: UnboundedReceiver<Job>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Cloneable sender side to hand to converters.
    pub fn handle(&self) -> MainQueueHandle {
        MainQueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Run every job already queued and return how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait for the next job and run it.
    ///
    /// The queue keeps a sender of its own, so this waits until something is
    /// dispatched.
    pub async fn run_next(&mut self) {
        if let Some(job) = self.rx.recv().await {
            job();
        }
    }

    /// Blocking variant of [`run_next`](Self::run_next) for threads outside
    /// any async runtime.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_run_next(&mut self) {
        if let Some(job) = self.rx.blocking_recv() {
            job();
        }
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainQueue").finish_non_exhaustive()
    }
}

/// Sender side of a [`MainQueue`].
#[derive(Clone)]
pub struct MainQueueHandle {
    tx: UnboundedSender<Job>,
}

impl fmt::Debug for MainQueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainQueueHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl CompletionContext for MainQueueHandle {
    fn dispatch(&self, job: Job) {
        if self.tx.send(job).is_err() {
            warn!("main queue dropped; completion discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn main_queue_runs_jobs_in_order_on_owner() {
        let mut queue = MainQueue::new();
        let handle = queue.handle();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let owner = std::thread::current().id();

        let worker = {
            let order = Arc::clone(&order);
            std::thread::spawn(move || {
                for i in 0..3 {
                    let order = Arc::clone(&order);
                    handle.dispatch(Box::new(move || {
                        assert_eq!(std::thread::current().id(), owner);
                        order.lock().unwrap().push(i);
                    }));
                }
            })
        };
        worker.join().unwrap();

        assert!(order.lock().unwrap().is_empty(), "nothing runs before draining");
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn dispatch_after_queue_dropped_is_discarded() {
        let queue = MainQueue::new();
        let handle = queue.handle();
        drop(queue);
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        handle.dispatch(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn runtime_context_spawns_job() {
        let context = RuntimeContext::current();
        let (tx, rx) = tokio::sync::oneshot::channel();
        context.dispatch(Box::new(move || {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[test]
    fn runtime_context_after_shutdown_discards_job() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let context = RuntimeContext::new(runtime.handle().clone());
        runtime.shutdown_background();

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        context.dispatch(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_next_waits_for_dispatch() {
        let mut queue = MainQueue::new();
        let handle = queue.handle();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            handle.dispatch(Box::new(move || {
                let _ = tx.send("done");
            }));
        });
        queue.run_next().await;
        assert_eq!(rx.await.unwrap(), "done");
    }
}
