//! Root components and the render exception boundary.
//!
//! A root component renders an HTML fragment that the bridge script mounts
//! into the element matched by its selector. Rendering happens once on the UI
//! thread at startup; a component that fails or panics is logged and skipped
//! so one broken component never takes the application down.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{HostError, RenderError};

/// Parameters passed to a root component.
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// A piece of UI rendered to an HTML fragment.
pub trait Component: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn render(&self, parameters: &Parameters) -> Result<String, RenderError>;
}

/// Static HTML fragment.
pub struct Html(pub String);

impl Component for Html {
    fn name(&self) -> &str {
        "Html"
    }

    fn render(&self, _parameters: &Parameters) -> Result<String, RenderError> {
        Ok(self.0.clone())
    }
}

impl<F> Component for F
where
    F: Fn(&Parameters) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, parameters: &Parameters) -> Result<String, RenderError> {
        self(parameters)
    }
}

/// A component bound to a DOM selector.
#[derive(Clone)]
pub struct RootComponentMapping {
    selector: String,
    component: Arc<dyn Component>,
    parameters: Parameters,
}

impl std::fmt::Debug for RootComponentMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootComponentMapping")
            .field("selector", &self.selector)
            .field("component", &self.component.name())
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl RootComponentMapping {
    /// Maps `component` to `selector`. The selector must not be blank.
    pub fn new(
        component: Arc<dyn Component>,
        selector: impl Into<String>,
        parameters: Parameters,
    ) -> Result<Self, HostError> {
        let selector = selector.into();
        if selector.trim().is_empty() {
            return Err(HostError::InvalidComponent(format!(
                "component '{}' needs a non-empty selector",
                component.name()
            )));
        }
        Ok(Self {
            selector,
            component,
            parameters,
        })
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn component_name(&self) -> &str {
        self.component.name()
    }
}

/// Ordered collection of root components.
#[derive(Debug, Clone, Default)]
pub struct RootComponentMappingCollection {
    mappings: Vec<RootComponentMapping>,
}

impl RootComponentMappingCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<C: Component + 'static>(&mut self, component: C, selector: &str) -> Result<&mut Self, HostError> {
        self.add_with_parameters(component, selector, Parameters::new())
    }

    pub fn add_with_parameters<C: Component + 'static>(
        &mut self,
        component: C,
        selector: &str,
        parameters: Parameters,
    ) -> Result<&mut Self, HostError> {
        self.mappings
            .push(RootComponentMapping::new(Arc::new(component), selector, parameters)?);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RootComponentMapping> {
        self.mappings.iter()
    }

    /// Renders every component behind the exception boundary.
    #[must_use]
    pub fn render_all(&self) -> Vec<RenderedComponent> {
        self.mappings.iter().filter_map(render_guarded).collect()
    }
}

impl<'a> IntoIterator for &'a RootComponentMappingCollection {
    type Item = &'a RootComponentMapping;
    type IntoIter = std::slice::Iter<'a, RootComponentMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}

/// Output of a successful render, embedded in the bridge script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedComponent {
    pub selector: String,
    pub html: String,
}

/// Renders one mapping. Errors and panics are logged and swallowed.
fn render_guarded(mapping: &RootComponentMapping) -> Option<RenderedComponent> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        mapping.component.render(&mapping.parameters)
    }));
    match outcome {
        Ok(Ok(html)) => Some(RenderedComponent {
            selector: mapping.selector.clone(),
            html,
        }),
        Ok(Err(e)) => {
            log_unhandled_render_error(&e);
            None
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic with non-string payload".to_string());
            log::error!(
                "Unhandled exception rendering component: {} (component '{}' panicked)",
                message,
                mapping.component_name()
            );
            None
        }
    }
}

/// Message logged for a render failure. An invocation wrapper is peeled once
/// so the log shows the component's own error.
#[must_use]
pub fn unhandled_message(error: &RenderError) -> String {
    match error {
        RenderError::Invocation { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

fn log_unhandled_render_error(error: &RenderError) {
    log::error!("Unhandled exception rendering component: {}", unhandled_message(error));
}
