//! Resource Bag
//!
//! Everything a rendered item keeps running (clock ticks, scroll loops,
//! reload timers, media pumps, caption sessions) lives in the item's
//! [`ResourceBag`]. Jobs are registered while rendering but only start on
//! [`ResourceBag::activate`], after the surface is attached. The engine
//! calls [`ResourceBag::release`] on every teardown path.

use futures_util::future::BoxFuture;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

struct PendingJob {
    name: &'static str,
    future: BoxFuture<'static, ()>,
}

/// Owned set of cancellable background jobs
///
/// Dropping a bag cancels and aborts whatever it still holds; `release`
/// additionally waits until every job has actually finished.
#[derive(Default)]
pub struct ResourceBag {
    token: CancellationToken,
    pending: Vec<PendingJob>,
    running: Vec<(&'static str, JoinHandle<()>)>,
    children: Vec<ResourceBag>,
}

impl ResourceBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job to start on activation
    pub fn defer<F>(&mut self, name: &'static str, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.pending.push(PendingJob {
            name,
            future: Box::pin(job),
        });
    }

    /// Take ownership of another bag (mosaic panes)
    pub fn adopt(&mut self, child: ResourceBag) {
        if !child.is_empty() {
            self.children.push(child);
        }
    }

    /// Whether the bag holds no jobs at all
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
            && self.running.is_empty()
            && self.children.iter().all(ResourceBag::is_empty)
    }

    /// Number of started jobs, including adopted bags
    pub fn running_jobs(&self) -> usize {
        self.running.len() + self.children.iter().map(ResourceBag::running_jobs).sum::<usize>()
    }

    /// Start every registered job
    ///
    /// Each job runs until it returns or the bag is released.
    pub fn activate(&mut self) {
        if self.token.is_cancelled() {
            warn!("Ignoring activation of a released resource bag");
            return;
        }
        for PendingJob { name, future } in self.pending.drain(..) {
            let token = self.token.clone();
            debug!(job = name, "Starting surface job");
            let handle = tokio::spawn(async move {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {}
                    () = future => {}
                }
            });
            self.running.push((name, handle));
        }
        for child in &mut self.children {
            child.activate();
        }
    }

    /// Cancel every job and wait until none is running
    pub async fn release(mut self) {
        let mut bags = vec![std::mem::take(&mut self)];
        while let Some(mut bag) = bags.pop() {
            bag.token.cancel();
            bag.pending.clear();
            for (name, handle) in bag.running.drain(..) {
                if let Err(e) = handle.await {
                    if e.is_panic() {
                        warn!(job = name, "Surface job panicked");
                    }
                }
            }
            bags.append(&mut bag.children);
        }
    }
}

impl Drop for ResourceBag {
    fn drop(&mut self) {
        self.token.cancel();
        for (_, handle) in &self.running {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ResourceBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceBag")
            .field("pending", &self.pending.len())
            .field("running", &self.running.len())
            .field("children", &self.children.len())
            .field("released", &self.token.is_cancelled())
            .finish()
    }
}
