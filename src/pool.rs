// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A bounded worker pool over crossbeam's scoped threads.
//!
//! Every task gets its own scoped thread, but a thread is only spawned
//! once a permit has been taken from a fixed-size pool.  The permit
//! pool is a bounded channel used as a counting semaphore: taking a
//! permit sends into it (and blocks while it is full), returning one
//! receives from it.  The scope that owns the threads is the join
//! point: it does not return until every worker has finished.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::thread::Scope;

use error::{Error, Result};

/// A shared "stop now" flag.  Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not fired.
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Fires the token.  Cannot be undone.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A counting semaphore with `limit` permits, instrumented so the
/// bound can be checked from outside.
#[derive(Debug)]
pub struct Permits {
    slots: Sender<()>,
    returns: Receiver<()>,
    limit: usize,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

/// A held permit.  Dropping it, including during a panic, hands the
/// permit back.
pub struct Permit<'a> {
    permits: &'a Permits,
}

impl Permits {
    /// A pool of `limit` permits; a limit of zero is treated as one.
    pub fn new(limit: usize) -> Permits {
        let limit = limit.max(1);
        let (slots, returns) = channel::bounded(limit);
        Permits {
            slots,
            returns,
            limit,
            in_flight: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
        }
    }

    /// Blocks until a permit is free, then takes it.
    pub fn acquire(&self) -> Permit<'_> {
        // Both channel ends live in self, so the send cannot fail.
        let _ = self.slots.send(());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        Permit { permits: self }
    }

    /// Number of permits.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The most permits ever held at once.
    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

impl<'a> Drop for Permit<'a> {
    fn drop(&mut self) {
        self.permits.in_flight.fetch_sub(1, Ordering::SeqCst);
        let _ = self.permits.returns.recv();
    }
}

/// Runs one job per task with at most `limit` jobs alive at a time.
#[derive(Debug)]
pub struct WorkerPool {
    permits: Permits,
    cancel: CancelToken,
}

impl Default for WorkerPool {
    fn default() -> WorkerPool {
        WorkerPool::new(::num_cpus::get())
    }
}

impl WorkerPool {
    /// A pool running at most `limit` jobs at once.
    pub fn new(limit: usize) -> WorkerPool {
        WorkerPool {
            permits: Permits::new(limit),
            cancel: CancelToken::new(),
        }
    }

    /// The instrumented permit pool.
    pub fn permits(&self) -> &Permits {
        &self.permits
    }

    /// The token checked before each submission and handed to every job.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Stops submitting, and asks running jobs to stop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Submits every task in order.  Each submission first takes a
    /// permit, so this blocks while the pool is full.  Every job's
    /// outcome is sent on `sink`, except for jobs that were cancelled,
    /// which publish nothing.  Returns the number of tasks submitted.
    ///
    /// Jobs run on threads of `scope`; waiting for them is the scope's
    /// business, not this function's.
    pub fn run<'env, I, R, F>(
        &'env self,
        scope: &Scope<'env>,
        tasks: I,
        work: &'env F,
        sink: Sender<Result<R>>,
    ) -> usize
    where
        I: IntoIterator,
        I::Item: Send + 'env,
        R: Send + 'env,
        F: Fn(I::Item, &CancelToken) -> Result<R> + Sync,
    {
        let mut submitted = 0;
        for task in tasks {
            if self.cancel.is_cancelled() {
                debug!("pool cancelled after {} submissions", submitted);
                break;
            }
            let permit = self.permits.acquire();
            debug!(
                "submitting task {} ({} of {} permits held)",
                submitted,
                self.permits.in_flight(),
                self.permits.limit()
            );
            let sink = sink.clone();
            let cancel = &self.cancel;
            scope.spawn(move |_| {
                let _permit = permit;
                match work(task, cancel) {
                    Err(Error::Cancelled) => {}
                    outcome => {
                        // The receiver is only gone once the collector
                        // has given up; the outcome is moot by then.
                        let _ = sink.send(outcome);
                    }
                }
            });
            submitted += 1;
        }
        submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn zero_limit_is_promoted_to_one() {
        assert_eq!(WorkerPool::new(0).permits().limit(), 1);
    }

    #[test]
    fn permits_are_returned_on_drop() {
        let permits = Permits::new(2);
        {
            let _a = permits.acquire();
            let _b = permits.acquire();
            assert_eq!(permits.in_flight(), 2);
        }
        assert_eq!(permits.in_flight(), 0);
        assert_eq!(permits.high_water(), 2);
        let _c = permits.acquire();
        assert_eq!(permits.in_flight(), 1);
    }

    #[test]
    fn never_exceeds_the_limit() {
        for limit in 1..5 {
            let pool = WorkerPool::new(limit);
            let (tx, rx) = channel::unbounded();
            let running = AtomicUsize::new(0);
            let peak = AtomicUsize::new(0);
            let work = |i: usize, _: &CancelToken| -> Result<usize> {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(i)
            };
            let submitted = crossbeam::scope(|s| pool.run(s, 0..12, &work, tx)).unwrap();
            assert_eq!(submitted, 12);
            let mut seen: Vec<usize> = rx.iter().map(|r| r.unwrap()).collect();
            seen.sort();
            assert_eq!(seen, (0..12).collect::<Vec<_>>());
            assert!(peak.load(Ordering::SeqCst) <= limit);
            assert!(pool.permits().high_water() <= limit);
            assert_eq!(pool.permits().in_flight(), 0);
        }
    }

    #[test]
    fn cancelled_pool_submits_nothing() {
        let pool = WorkerPool::new(2);
        pool.cancel();
        let (tx, rx) = channel::unbounded();
        let work = |i: usize, _: &CancelToken| -> Result<usize> { Ok(i) };
        let submitted = crossbeam::scope(|s| pool.run(s, 0..4, &work, tx)).unwrap();
        assert_eq!(submitted, 0);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn cancelled_jobs_publish_nothing() {
        let pool = WorkerPool::new(2);
        let (tx, rx) = channel::unbounded();
        let work = |i: usize, _: &CancelToken| -> Result<usize> {
            if i % 2 == 0 {
                Err(Error::Cancelled)
            } else {
                Ok(i)
            }
        };
        crossbeam::scope(|s| pool.run(s, 0..6, &work, tx)).unwrap();
        let mut seen: Vec<usize> = rx.iter().map(|r| r.unwrap()).collect();
        seen.sort();
        assert_eq!(seen, vec![1, 3, 5]);
    }
}
