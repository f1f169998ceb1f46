//! Deterministic headless DOM event engine for Rust tests.
//!
//! A [`Harness`] owns one document tree, the listeners registered on its
//! nodes, and the browser-side state that default actions touch (focus,
//! form controls, navigation). Events walk the tree in the capturing,
//! at-target and bubbling phases; once a walk finishes without being
//! cancelled the matching default action runs (checkbox toggling, form
//! submission, hyperlink navigation, and so on).
//!
//! Script evaluation, networking and rendering are out of scope. Handlers are
//! plain Rust closures, and navigation goes through a pluggable
//! [`PageLoader`].

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

mod assertions;
mod config;
mod default_actions;
mod dispatch;
mod dom;
mod event;
mod form_controls;
mod forms;
mod harness;
mod html;
mod listeners;
mod navigation;
mod trace;
mod user_actions;


pub use config::{BeforeUnloadPolicy, CloneIdPolicy, HarnessConfig};
pub use dispatch::ReportedHandlerError;
pub use dom::{Attributes, ButtonType, Dom, ElementKind, InputType, NodeKind};
pub use event::{Event, EventDetail, EventFamily, EventInit, EventPhase};
pub use harness::Harness;
pub use listeners::{EventCallback, HandlerResult, HandlerValue, ListenerOptions};
pub use navigation::{
    HttpMethod, JavascriptUrlHandler, NavigationRequest, NavigationSource, PageInitializer,
    PageLoader,
};

use harness::FocusState;
use listeners::{ListenerKind, ListenerStore};
use navigation::{NavigationState, is_javascript_url};
use trace::TraceState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),
    #[error("type mismatch for {target}: expected {expected}, actual {actual}")]
    TypeMismatch {
        target: String,
        expected: String,
        actual: String,
    },
    #[error("assertion failed for {target}: expected {expected}, actual {actual}, snippet {dom_snippet}")]
    AssertionFailed {
        target: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
}

/// Error raised inside an event handler.
///
/// Handler errors never escape a dispatch walk; they are collected by the
/// harness (see [`Harness::take_handler_errors`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for HandlerError {
    fn from(err: Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Stable handle to a node inside a [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}
