//! Raw event → display event.
//!
//! Normalization is total: every missing field maps to a defined default. Link
//! resolution and timestamp rendering are delegated to pluggable collaborators.

#![forbid(unsafe_code)]

use std::sync::Arc;

use crate::dedup::dedup;
use crate::links::{LinkResolver, RouteLinks};
use crate::time::{LocalTime, TimestampFormatter};
use crate::{DisplayEvent, RawEvent};

/// Grouping key for an event name: the part before the first `.`. Names whose leading
/// segment is empty are kept verbatim.
pub fn identity_key(name: Option<&str>) -> String {
    match name {
        None => String::new(),
        Some(n) => match n.split('.').next() {
            Some(head) if !head.is_empty() => head.to_string(),
            _ => n.to_string(),
        },
    }
}

#[derive(Clone)]
pub struct Normalizer {
    links: Arc<dyn LinkResolver>,
    times: Arc<dyn TimestampFormatter>,
}

impl Default for Normalizer {
    fn default() -> Self { Self::new(Arc::new(RouteLinks), Arc::new(LocalTime)) }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("Normalizer").finish_non_exhaustive() }
}

impl Normalizer {
    pub fn new(links: Arc<dyn LinkResolver>, times: Arc<dyn TimestampFormatter>) -> Self {
        Self { links, times }
    }

    pub fn normalize(&self, raw: &RawEvent) -> DisplayEvent {
        DisplayEvent {
            identity_key: identity_key(raw.name.as_deref()),
            namespace: raw.namespace.clone().unwrap_or_default(),
            link_target: self.links.resolve(&raw.involved_object),
            reason: raw.reason.clone().unwrap_or_default(),
            message: raw.message.clone().unwrap_or_default(),
            first_seen: self.times.format(raw.first_seen.as_ref()),
            last_seen: self.times.format(raw.last_seen.as_ref()),
        }
    }

    /// Normalize a poll's raw list and collapse duplicates.
    pub fn run(&self, raw: &[RawEvent]) -> Vec<DisplayEvent> {
        dedup(raw.iter().map(|r| self.normalize(r)))
    }
}
