//! One long-lived thread that owns toolkit state and runs jobs posted to it.
//!
//! The toolkit is initialised once, on that thread, and its event loop never
//! exits. Callers hand it closures through `call`; `Wake` tells the loop that
//! the queue is non-empty, since a GTK or Win32 loop does not poll a channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::platform::PlatformError;

pub(crate) type Job = Box<dyn FnOnce() + Send>;

/// Nudges the event loop to run `drain`.
pub(crate) type Wake = Box<dyn Fn() + Send + Sync>;

pub(crate) struct Dispatcher {
    jobs: Sender<Job>,
    wake: Wake,
}

impl Dispatcher {
    /// Spawns the loop thread, runs `init` on it and then hands the job queue
    /// to `run`. Returns once `init` has finished.
    pub(crate) fn start<I, R>(name: &str, init: I, run: R) -> Result<Self, PlatformError>
    where
        I: FnOnce() -> Result<Wake, PlatformError> + Send + 'static,
        R: FnOnce(Receiver<Job>) + Send + 'static,
    {
        let (jobs, queue) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Wake, PlatformError>>();

        thread::Builder::new().name(name.into()).spawn(move || match init() {
            Ok(wake) => {
                let _ = ready_tx.send(Ok(wake));
                log::debug!("tray: event loop running");
                run(queue);
                log::debug!("tray: event loop exited");
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
            }
        })?;

        match ready_rx.recv() {
            Ok(Ok(wake)) => Ok(Self { jobs, wake }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PlatformError::Other(
                "tray thread exited before reporting status".into(),
            )),
        }
    }

    /// Runs `job` on the loop thread and waits up to `timeout` for its result.
    pub(crate) fn call<T, F>(&self, timeout: Duration, job: F) -> Result<T, PlatformError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.jobs
            .send(Box::new(move || {
                let _ = reply_tx.send(job());
            }))
            .map_err(|_| PlatformError::Other("tray thread has exited".into()))?;
        (self.wake)();
        reply_rx
            .recv_timeout(timeout)
            .map_err(|_| PlatformError::Other(format!("tray thread did not answer within {timeout:?}")))
    }
}

/// Runs every queued job. Called on the loop thread.
pub(crate) fn drain(queue: &Receiver<Job>) {
    while let Ok(job) = queue.try_recv() {
        job();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, OnceLock};

    const WAIT: Duration = Duration::from_secs(5);

    fn blocking_loop(queue: Receiver<Job>) {
        for job in queue {
            job();
        }
    }

    fn no_wake() -> Result<Wake, PlatformError> {
        Ok(Box::new(|| {}))
    }

    thread_local! {
        static SLOT: Cell<u32> = const { Cell::new(0) };
    }

    #[test]
    fn jobs_share_one_thread_and_its_state() {
        let d = Dispatcher::start("tray-shared", no_wake, blocking_loop).unwrap();

        let first = d.call(WAIT, || thread::current().name().map(str::to_owned)).unwrap();
        d.call(WAIT, || SLOT.with(|s| s.set(7))).unwrap();
        let second = d.call(WAIT, || thread::current().name().map(str::to_owned)).unwrap();

        assert_eq!(first.as_deref(), Some("tray-shared"));
        assert_eq!(first, second);
        assert_eq!(d.call(WAIT, || SLOT.with(Cell::get)).unwrap(), 7);
        assert_eq!(SLOT.with(Cell::get), 0);
    }

    #[test]
    fn replace_remove_replace_reuses_the_loop() {
        let inits = Arc::new(AtomicUsize::new(0));
        let counter = inits.clone();
        let cell: OnceLock<Dispatcher> = OnceLock::new();
        let dispatcher = || {
            cell.get_or_init(|| {
                let counter = counter.clone();
                let init = move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    no_wake()
                };
                Dispatcher::start("tray-reuse", init, blocking_loop).unwrap()
            })
        };

        for round in 1..=3 {
            dispatcher().call(WAIT, move || SLOT.with(|s| s.set(round))).unwrap();
            dispatcher().call(WAIT, || SLOT.with(|s| s.set(0))).unwrap();
        }
        dispatcher().call(WAIT, || SLOT.with(|s| s.set(9))).unwrap();

        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher().call(WAIT, || SLOT.with(Cell::get)).unwrap(), 9);
    }

    #[test]
    fn wake_runs_after_each_post() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        let init = move || -> Result<Wake, PlatformError> {
            Ok(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
        };
        let d = Dispatcher::start("tray-wake", init, blocking_loop).unwrap();
        d.call(WAIT, || ()).unwrap();
        d.call(WAIT, || ()).unwrap();
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_init_is_reported() {
        let init = || -> Result<Wake, PlatformError> {
            Err(PlatformError::Unavailable("no display".into()))
        };
        let err = Dispatcher::start("tray-fail", init, blocking_loop)
            .err()
            .unwrap();
        assert!(matches!(err, PlatformError::Unavailable(_)));
    }

    #[test]
    fn drain_runs_everything_queued() {
        let (tx, rx) = mpsc::channel::<Job>();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = hits.clone();
            tx.send(Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        }
        drain(&rx);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }
}
