//! Presentation payload shared by all extensions.

use crate::error::ActionError;
use std::fmt;
use std::sync::Arc;

type ActionFn = dyn Fn() -> Result<(), ActionError> + Send + Sync;

/// A labelled side effect attached to a result.
///
/// The index carries and orders actions but never looks inside them.
#[derive(Clone)]
pub struct Action {
    label: String,
    run: Arc<ActionFn>,
}

impl Action {
    pub fn new<F>(label: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            run: Arc::new(run),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn activate(&self) -> Result<(), ActionError> {
        (self.run)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("label", &self.label).finish()
    }
}

/// What a result looks like in the proposal list.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub text: String,
    pub subtext: String,
    pub icon: Option<String>,
    /// First action is the default one.
    pub actions: Vec<Action>,
}

impl Entry {
    pub fn new(text: impl Into<String>, subtext: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subtext: subtext.into(),
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn default_action(&self) -> Option<&Action> {
        self.actions.first()
    }
}
