//! kwarn core types
//!
//! Raw warning events as they come off the cluster, the display model the panel renders,
//! and the pure pieces of the pipeline (normalize, dedup, layout, view).

#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod columns;
pub mod config;
pub mod dedup;
pub mod error;
pub mod layout;
pub mod links;
pub mod normalize;
pub mod time;
pub mod view;

pub use config::{RetryPolicy, Settings};
pub use error::{FetchError, FetchErrorKind};

/// Reference to the cluster object an event is about.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectRef {
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub name: Option<String>,
}

/// Event record as returned by the events source. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEvent {
    pub involved_object: ObjectRef,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Normalized event ready for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayEvent {
    /// Event name up to the first `.` (generation hash stripped).
    pub identity_key: String,
    pub namespace: String,
    /// Navigation path to the involved object; empty when not resolvable.
    pub link_target: String,
    pub reason: String,
    pub message: String,
    pub first_seen: String,
    pub last_seen: String,
}

impl DisplayEvent {
    pub fn link(&self) -> Option<&str> {
        if self.link_target.is_empty() { None } else { Some(&self.link_target) }
    }
}

/// Outcome of the most recent poll.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultState {
    #[default]
    Loading,
    Ready(Vec<DisplayEvent>),
    Errored,
}

impl ResultState {
    pub fn events(&self) -> Option<&[DisplayEvent]> {
        match self {
            ResultState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResultState::Loading => "loading",
            ResultState::Ready(_) => "ready",
            ResultState::Errored => "errored",
        }
    }
}

/// Cluster the panel is looking at. `None` means the kubeconfig's current context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClusterContext {
    pub name: Option<String>,
}

impl ClusterContext {
    pub fn current() -> Self { Self { name: None } }

    pub fn named(name: impl Into<String>) -> Self { Self { name: Some(name.into()) } }

    /// Reads `KWARN_CONTEXT`; empty or unset selects the current context.
    pub fn from_env() -> Self {
        match std::env::var("KWARN_CONTEXT") {
            Ok(v) if !v.trim().is_empty() => Self::named(v.trim()),
            _ => Self::current(),
        }
    }
}

impl std::fmt::Display for ClusterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(n) => f.write_str(n),
            None => f.write_str("(current)"),
        }
    }
}

pub mod prelude {
    pub use super::{ClusterContext, DisplayEvent, ObjectRef, RawEvent, ResultState};
    pub use super::{FetchError, FetchErrorKind, RetryPolicy, Settings};
    pub use super::layout::{choose_layout, EnvSignals, LayoutMode};
    pub use super::normalize::Normalizer;
    pub use super::view::{render, PanelView};
}
