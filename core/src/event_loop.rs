//! Event loop and user events.
//!
//! Owns `UserEvent`, the [`Dispatch`] seam background threads use to reach the
//! UI thread, and `run_event_loop`. Everything that touches the window runs
//! inside the loop closure.

use std::sync::{mpsc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use tao::event::{ElementState, Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopProxy};

use crate::bridge::{fullscreen_event_script, ForwarderCall};
use crate::chrome::{ChromeController, FullscreenChanged};
use crate::lifetime::{ApplicationLifetime, StoppingRegistration};
use crate::platform::NativeWindow;
use crate::storage::{PlacementStore, WindowPlacement};
use crate::theme::ThemeSubscription;

/// User-defined events sent from background threads or IPC into the main loop.
#[derive(Debug)]
pub enum UserEvent {
    /// First page load finished (or the fallback timer fired).
    ShowWindow,
    /// OS light/dark preference changed.
    ThemeChanged,
    /// Call from page script through the event forwarder.
    Bridge(ForwarderCall),
    /// Stop requested through the lifetime. The sender is dropped once the loop
    /// has been torn down.
    Shutdown(mpsc::Sender<()>),
}

/// Posts events to the UI thread. Returns false when the loop is gone.
pub trait Dispatch: Send + 'static {
    fn dispatch(&self, event: UserEvent) -> bool;
}

impl Dispatch for EventLoopProxy<UserEvent> {
    fn dispatch(&self, event: UserEvent) -> bool {
        self.send_event(event).is_ok()
    }
}

#[cfg(test)]
impl Dispatch for mpsc::Sender<UserEvent> {
    fn dispatch(&self, event: UserEvent) -> bool {
        self.send(event).is_ok()
    }
}

/// Posts `UserEvent::Shutdown`. Off the UI thread, blocks until the loop has
/// been torn down; on it, returns at once since the loop cannot ack itself.
pub fn request_shutdown<D: Dispatch>(dispatch: &D, ui_thread: ThreadId) {
    let (ack, done) = mpsc::channel();
    if !dispatch.dispatch(UserEvent::Shutdown(ack)) {
        return;
    }
    if thread::current().id() != ui_thread {
        // Err means every sender is gone, which also ends the wait.
        let _ = done.recv();
    }
}

/// Hooks the UI loop to the lifetime's stopping signal. Call on the UI thread.
/// A signal that fired before this call still reaches the loop.
pub fn register_shutdown<D: Dispatch>(lifetime: &ApplicationLifetime, dispatch: D) -> StoppingRegistration {
    let ui_thread = thread::current().id();
    let dispatch = Mutex::new(dispatch);
    lifetime.register_stopping(move || {
        let dispatch = dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        request_shutdown(&*dispatch, ui_thread);
    })
}

pub type FullscreenListener = Box<dyn Fn(FullscreenChanged)>;

/// State owned by the UI thread for the whole run.
///
/// Field order is drop order: the webview (inside the controller) must go
/// before its web context.
pub struct Shell {
    pub controller: ChromeController<NativeWindow>,
    pub placement: PlacementStore,
    pub on_fullscreen_changed: Option<FullscreenListener>,
    pub lifetime: ApplicationLifetime,
    pub theme: ThemeSubscription,
    pub stopping: StoppingRegistration,
    pub web_context: wry::WebContext,
}

impl Shell {
    fn notify_fullscreen(&self, changed: FullscreenChanged) {
        self.controller
            .platform()
            .evaluate_script(&fullscreen_event_script(changed.fullscreen));
        if let Some(listener) = &self.on_fullscreen_changed {
            listener(changed);
        }
    }

    fn handle_bridge(&mut self, call: ForwarderCall) {
        match call {
            ForwarderCall::MouseDownDrag => {
                if let Err(e) = self.controller.begin_drag() {
                    log::debug!("Caption drag failed: {}", e);
                }
            }
            ForwarderCall::ToggleFullScreen => {
                let changed = self.controller.toggle_fullscreen();
                self.notify_fullscreen(changed);
            }
        }
    }

    /// Saves position and size. Fullscreen geometry is never persisted.
    fn save_placement(&self) {
        if self.controller.is_fullscreen() {
            return;
        }
        let window = self.controller.platform().window();
        let Ok(pos) = window.outer_position() else {
            return;
        };
        let size = window.inner_size();
        self.placement.save(&WindowPlacement {
            x: pos.x,
            y: pos.y,
            width: size.width,
            height: size.height,
            maximized: window.is_maximized(),
        });
    }
}

/// Runs the tao event loop until exit.
///
/// Uses `ControlFlow::Wait` throughout; all work arrives as window or user events.
pub fn run_event_loop(event_loop: EventLoop<UserEvent>, mut shell: Shell) -> ! {
    let mut shown = false;
    let mut shutdown_acks: Vec<mpsc::Sender<()>> = Vec::new();

    event_loop.run(move |event, _target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => {
                shell.controller.apply_system_theme();
            }
            Event::UserEvent(ev) => match ev {
                UserEvent::ShowWindow => {
                    if !shown {
                        shown = true;
                        shell.controller.on_page_loaded();
                    }
                }
                UserEvent::ThemeChanged => {
                    shell.controller.apply_system_theme();
                }
                UserEvent::Bridge(call) => shell.handle_bridge(call),
                UserEvent::Shutdown(ack) => {
                    shutdown_acks.push(ack);
                    shell.save_placement();
                    *control_flow = ControlFlow::Exit;
                }
            },
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    shell.save_placement();
                    shell.lifetime.stop_from_ui_thread();
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(_) => {
                    shell.controller.on_state_changed();
                    shell.controller.platform().relayout();
                }
                WindowEvent::ThemeChanged(_) => {
                    shell.controller.apply_system_theme();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;
                    if let Some(changed) =
                        shell
                            .controller
                            .handle_key(event.physical_key, pressed, event.repeat)
                    {
                        shell.notify_fullscreen(changed);
                    }
                }
                _ => {}
            },
            Event::LoopDestroyed => {
                shell.lifetime.stop_from_ui_thread();
                for ack in shutdown_acks.drain(..) {
                    let _ = ack.send(());
                }
                log::info!("UI event loop stopped");
            }
            _ => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn expect_shutdown(rx: &mpsc::Receiver<UserEvent>) -> mpsc::Sender<()> {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            UserEvent::Shutdown(ack) => ack,
            other => panic!("expected Shutdown, got {other:?}"),
        }
    }

    #[test]
    fn off_thread_request_waits_for_ack() {
        let (tx, rx) = mpsc::channel();
        let ui = thread::current().id();
        let worker = thread::spawn(move || request_shutdown(&tx, ui));

        let ack = expect_shutdown(&rx);
        thread::sleep(Duration::from_millis(100));
        assert!(!worker.is_finished());

        ack.send(()).unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn dropped_ack_releases_waiter() {
        let (tx, rx) = mpsc::channel();
        let ui = thread::current().id();
        let worker = thread::spawn(move || request_shutdown(&tx, ui));
        drop(expect_shutdown(&rx));
        worker.join().unwrap();
    }

    #[test]
    fn ui_thread_request_does_not_block() {
        let (tx, rx) = mpsc::channel();
        request_shutdown(&tx, thread::current().id());
        let _ack = expect_shutdown(&rx);
    }

    #[test]
    fn closed_loop_does_not_block() {
        let (tx, rx) = mpsc::channel::<UserEvent>();
        drop(rx);
        let ui = thread::current().id();
        let worker = thread::spawn(move || request_shutdown(&tx, ui));
        worker.join().unwrap();
    }

    #[test]
    fn stop_before_registration_still_posts_shutdown() {
        let lifetime = ApplicationLifetime::new();
        lifetime.stop_application();
        let (tx, rx) = mpsc::channel();
        let _registration = register_shutdown(&lifetime, tx);
        let _ack = expect_shutdown(&rx);
    }

    #[test]
    fn remote_stop_posts_shutdown_and_waits() {
        let lifetime = ApplicationLifetime::new();
        let (tx, rx) = mpsc::channel();
        let _registration = register_shutdown(&lifetime, tx);

        let remote = lifetime.clone();
        let stopper = thread::spawn(move || remote.stop_application());
        let ack = expect_shutdown(&rx);
        thread::sleep(Duration::from_millis(100));
        assert!(!stopper.is_finished());

        ack.send(()).unwrap();
        stopper.join().unwrap();
        assert!(lifetime.is_stopping());
    }

    #[test]
    fn ui_thread_stop_posts_shutdown_without_blocking() {
        let lifetime = ApplicationLifetime::new();
        let (tx, rx) = mpsc::channel();
        let _registration = register_shutdown(&lifetime, tx);
        lifetime.stop_application();
        let _ack = expect_shutdown(&rx);
    }
}
