//! OS theme change notifications.
//!
//! The watcher runs on its own thread and never touches the window: each change
//! is posted to the UI thread as [`UserEvent::ThemeChanged`], where the chrome
//! controller re-queries the preference and applies it. Delivery stops when the
//! [`ThemeSubscription`] is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::event_loop::{Dispatch, UserEvent};

/// How often the OS preference is sampled.
pub const THEME_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Reads the current OS dark-mode preference.
pub fn system_prefers_dark() -> bool {
    matches!(dark_light::detect(), dark_light::Mode::Dark)
}

/// Watches the OS light/dark preference.
pub struct ThemeWatcher<F> {
    probe: F,
    interval: Duration,
}

impl ThemeWatcher<fn() -> bool> {
    /// Watcher backed by the OS preference.
    #[must_use]
    pub fn system() -> Self {
        Self::new(system_prefers_dark, THEME_POLL_INTERVAL)
    }
}

impl<F> ThemeWatcher<F>
where
    F: Fn() -> bool + Send + 'static,
{
    #[must_use]
    pub fn new(probe: F, interval: Duration) -> Self {
        Self { probe, interval }
    }

    /// Starts watching. Every change of preference is dispatched once.
    pub fn subscribe<D: Dispatch>(self, dispatcher: D) -> ThemeSubscription {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let Self { probe, interval } = self;
        let handle = thread::Builder::new()
            .name("theme-watcher".to_string())
            .spawn(move || {
                let mut last = probe();
                while !thread_stop.load(Ordering::Acquire) {
                    thread::sleep(interval);
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }
                    let current = probe();
                    if current != last {
                        last = current;
                        log::debug!("OS theme changed (dark: {})", current);
                        if !dispatcher.dispatch(UserEvent::ThemeChanged) {
                            // UI thread is gone.
                            break;
                        }
                    }
                }
            });
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Theme watcher thread failed to start: {}", e);
                None
            }
        };
        ThemeSubscription { stop, handle }
    }
}

/// Keeps a theme watcher alive. Dropping it stops notifications.
pub struct ThemeSubscription {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThemeSubscription {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ThemeSubscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        // Not joined: the thread exits after its current sleep.
        self.handle.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const TICK: Duration = Duration::from_millis(5);

    #[test]
    fn dispatches_on_change_only() {
        let dark = Arc::new(AtomicBool::new(false));
        let probe_dark = Arc::clone(&dark);
        let (tx, rx) = mpsc::channel();
        let sub = ThemeWatcher::new(move || probe_dark.load(Ordering::SeqCst), TICK).subscribe(tx);

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        dark.store(true, Ordering::SeqCst);
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(event, UserEvent::ThemeChanged));
        assert!(sub.is_active());
    }

    #[test]
    fn dropping_subscription_stops_delivery() {
        let dark = Arc::new(AtomicBool::new(false));
        let probe_dark = Arc::clone(&dark);
        let (tx, rx) = mpsc::channel();
        let sub = ThemeWatcher::new(move || probe_dark.load(Ordering::SeqCst), TICK).subscribe(tx);
        drop(sub);
        thread::sleep(Duration::from_millis(30));
        dark.store(true, Ordering::SeqCst);
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn watcher_exits_when_dispatcher_is_closed() {
        let flip = Arc::new(AtomicBool::new(false));
        let probe_flip = Arc::clone(&flip);
        let (tx, rx) = mpsc::channel::<UserEvent>();
        drop(rx);
        let sub = ThemeWatcher::new(
            move || !probe_flip.fetch_xor(true, Ordering::SeqCst),
            TICK,
        )
        .subscribe(tx);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while sub.is_active() && std::time::Instant::now() < deadline {
            thread::sleep(TICK);
        }
        assert!(!sub.is_active());
    }
}
