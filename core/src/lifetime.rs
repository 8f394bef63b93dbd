//! Application lifetime: the "stopping" signal shared by the host and the
//! embedding application.
//!
//! `stop_application` may be called from any thread, any number of times; the
//! registered callbacks run once, on the first caller's thread, and later
//! callers wait until they have returned. A callback registered after the
//! signal fired runs immediately on the registering thread. Stopping also
//! cancels any startup work still in flight (the runtime installer).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::cancel::CancelToken;

type StoppingCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    fired: bool,
    entries: Vec<(u64, StoppingCallback)>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Progress {
    #[default]
    Idle,
    Running(ThreadId),
    Done,
}

#[derive(Default)]
struct LifetimeState {
    stopping: AtomicBool,
    next_id: AtomicU64,
    callbacks: Mutex<Callbacks>,
    progress: Mutex<Progress>,
    done: Condvar,
    startup: CancelToken,
}

impl LifetimeState {
    /// Recovers from mutex poison so a panicking callback cannot wedge shutdown.
    fn callbacks(&self) -> MutexGuard<'_, Callbacks> {
        self.callbacks.lock().unwrap_or_else(|e| {
            log::error!("Lifetime callback mutex was poisoned, recovering");
            e.into_inner()
        })
    }

    fn progress(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the first caller's callbacks have returned. A callback
    /// that stops the application again does not wait on itself.
    fn wait_stopped(&self) {
        let me = thread::current().id();
        let mut progress = self.progress();
        loop {
            match *progress {
                Progress::Done => return,
                Progress::Running(id) if id == me => return,
                _ => progress = self.done.wait(progress).unwrap_or_else(PoisonError::into_inner),
            }
        }
    }
}

/// Marks the callbacks finished even when one of them panics.
struct FinishOnDrop<'a>(&'a LifetimeState);

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        *self.0.progress() = Progress::Done;
        self.0.done.notify_all();
    }
}

#[derive(Clone, Default)]
pub struct ApplicationLifetime {
    inner: Arc<LifetimeState>,
}

impl ApplicationLifetime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for the stopping signal. The callback is removed
    /// when the returned registration is dropped. When the signal has already
    /// fired, the callback runs before this returns.
    #[must_use = "dropping the registration unregisters the callback"]
    pub fn register_stopping<F>(&self, callback: F) -> StoppingRegistration
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let registration = StoppingRegistration {
            id,
            lifetime: Arc::clone(&self.inner),
        };
        let mut callbacks = self.inner.callbacks();
        if callbacks.fired {
            drop(callbacks);
            callback();
        } else {
            callbacks.entries.push((id, Arc::new(callback)));
        }
        registration
    }

    /// Fires the stopping signal once and returns after the callbacks have run.
    pub fn stop_application(&self) {
        self.stop(true);
    }

    /// Fires the stopping signal without waiting on another thread's
    /// callbacks. The UI thread uses this: those callbacks wait on it.
    pub(crate) fn stop_from_ui_thread(&self) {
        self.stop(false);
    }

    fn stop(&self, wait: bool) {
        if self.inner.stopping.swap(true, Ordering::AcqRel) {
            if wait {
                self.inner.wait_stopped();
            }
            return;
        }
        log::info!("Application stopping");
        *self.inner.progress() = Progress::Running(thread::current().id());
        let _finish = FinishOnDrop(&self.inner);
        self.inner.startup.cancel();
        // Snapshot so callbacks may register or unregister without deadlocking.
        let callbacks: Vec<StoppingCallback> = {
            let mut callbacks = self.inner.callbacks();
            callbacks.fired = true;
            callbacks.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in callbacks {
            callback();
        }
    }

    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.inner.stopping.load(Ordering::Acquire)
    }

    /// Token cancelled when the application stops; used for startup work.
    #[must_use]
    pub fn startup_token(&self) -> CancelToken {
        self.inner.startup.clone()
    }
}

/// Handle to a stopping callback; unregisters on drop.
pub struct StoppingRegistration {
    id: u64,
    lifetime: Arc<LifetimeState>,
}

impl Drop for StoppingRegistration {
    fn drop(&mut self) {
        self.lifetime.callbacks().entries.retain(|(id, _)| *id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn callbacks_fire_once() {
        let lifetime = ApplicationLifetime::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _reg = lifetime.register_stopping(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        lifetime.stop_application();
        lifetime.clone().stop_application();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(lifetime.is_stopping());
    }

    #[test]
    fn dropped_registration_is_not_called() {
        let lifetime = ApplicationLifetime::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let reg = lifetime.register_stopping(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        drop(reg);
        lifetime.stop_application();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stopping_cancels_startup_work() {
        let lifetime = ApplicationLifetime::new();
        let token = lifetime.startup_token();
        assert!(!token.is_cancelled());
        lifetime.stop_application();
        assert!(token.is_cancelled());
    }

    #[test]
    fn stop_from_another_thread_runs_callbacks_there() {
        let lifetime = ApplicationLifetime::new();
        let (tx, rx) = std::sync::mpsc::channel();
        let _reg = lifetime.register_stopping(move || {
            let _ = tx.send(std::thread::current().id());
        });
        let remote = lifetime.clone();
        let worker = std::thread::spawn(move || {
            remote.stop_application();
            std::thread::current().id()
        });
        let worker_id = worker.join().unwrap();
        assert_eq!(rx.recv().unwrap(), worker_id);
    }

    #[test]
    fn registering_after_stop_runs_immediately() {
        let lifetime = ApplicationLifetime::new();
        lifetime.stop_application();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let _reg = lifetime.register_stopping(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        lifetime.stop_application();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_caller_waits_for_callbacks() {
        let lifetime = ApplicationLifetime::new();
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let _reg = lifetime.register_stopping(move || {
            let _ = entered_tx.send(());
            let _ = release_rx.lock().unwrap().recv();
        });

        let first = lifetime.clone();
        let first = std::thread::spawn(move || first.stop_application());
        entered_rx.recv().unwrap();

        let second = lifetime.clone();
        let second = std::thread::spawn(move || second.stop_application());
        std::thread::sleep(std::time::Duration::from_millis(100));
        assert!(!second.is_finished());

        release_tx.send(()).unwrap();
        first.join().unwrap();
        second.join().unwrap();
    }

    #[test]
    fn ui_thread_stop_does_not_wait() {
        let lifetime = ApplicationLifetime::new();
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let _reg = lifetime.register_stopping(move || {
            let _ = entered_tx.send(());
            let _ = release_rx.lock().unwrap().recv();
        });

        let first = lifetime.clone();
        let first = std::thread::spawn(move || first.stop_application());
        entered_rx.recv().unwrap();
        lifetime.stop_from_ui_thread();
        assert!(lifetime.is_stopping());

        release_tx.send(()).unwrap();
        first.join().unwrap();
    }

    #[test]
    fn stopping_again_from_a_callback_returns() {
        let lifetime = ApplicationLifetime::new();
        let inner = lifetime.clone();
        let _reg = lifetime.register_stopping(move || inner.stop_application());
        lifetime.stop_application();
        assert!(lifetime.is_stopping());
    }
}
