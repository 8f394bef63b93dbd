//! Script bridge between the page and the host.
//!
//! The page sees a host object, `window.shell.hostObjects.eventForwarder`, whose
//! methods post a JSON envelope over the webview IPC channel:
//! `{ "object": "eventForwarder", "method": "MouseDownDrag" }`. The IPC handler
//! only parses and forwards; the actual window work runs on the UI thread when
//! the event loop receives [`UserEvent::Bridge`]. Invalid messages are ignored.

use serde::Deserialize;

use crate::components::RenderedComponent;
use crate::config::ASSETS;
use crate::event_loop::{Dispatch, UserEvent};

/// Name of the host object exposed to page script.
pub const EVENT_FORWARDER: &str = "eventForwarder";

const BRIDGE_SCRIPT: &str = "bridge.js";
const COMPONENTS_PLACEHOLDER: &str = "__SHELL_COMPONENTS__";

/// Methods of the event forwarder host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "method")]
pub enum ForwarderCall {
    /// Mouse pressed inside a drag region: start a native caption drag.
    MouseDownDrag,
    /// F11 pressed while the page has focus.
    ToggleFullScreen,
}

/// Incoming message: target host object + flattened method.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeEnvelope {
    pub object: String,
    #[serde(flatten)]
    pub call: ForwarderCall,
}

/// Parses a raw IPC message. Invalid JSON, unknown methods and unknown host
/// objects return `None`.
#[must_use]
pub fn parse_message(raw: &str) -> Option<ForwarderCall> {
    let envelope: BridgeEnvelope = serde_json::from_str(raw).ok()?;
    if envelope.object != EVENT_FORWARDER {
        log::debug!("Bridge call to unknown host object '{}'", envelope.object);
        return None;
    }
    Some(envelope.call)
}

/// Receives IPC messages on whatever thread the webview delivers them and
/// forwards them to the UI thread.
#[derive(Clone)]
pub struct EventForwarder<D> {
    dispatcher: D,
}

impl<D: Dispatch> EventForwarder<D> {
    #[must_use]
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    /// Handles one raw message. Returns true when a call was forwarded.
    pub fn handle(&self, raw: &str) -> bool {
        let Some(call) = parse_message(raw) else {
            return false;
        };
        self.dispatcher.dispatch(UserEvent::Bridge(call))
    }
}

/// Script injected before any page script runs: host objects, drag-region
/// detection, F11 forwarding and root component mounting.
#[must_use]
pub fn init_script(components: &[RenderedComponent]) -> String {
    let template = ASSETS
        .get_file(BRIDGE_SCRIPT)
        .and_then(|f| f.contents_utf8())
        .unwrap_or_default();
    // JSON is a valid JS expression, so it can be spliced in as-is.
    let json = serde_json::to_string(components).unwrap_or_else(|e| {
        log::error!("Failed to serialize root components: {}", e);
        "[]".to_string()
    });
    template.replace(COMPONENTS_PLACEHOLDER, &json)
}

/// Script that tells the page the fullscreen state changed.
#[must_use]
pub fn fullscreen_event_script(fullscreen: bool) -> String {
    format!(
        "window.dispatchEvent(new CustomEvent('shell:fullscreenchange', {{ detail: {{ fullscreen: {fullscreen} }} }}));"
    )
}
