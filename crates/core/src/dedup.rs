#![forbid(unsafe_code)]

use metrics::counter;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::DisplayEvent;

/// Keep the first event per identity key, preserving source order. Later duplicates are
/// dropped whole.
pub fn dedup(events: impl IntoIterator<Item = DisplayEvent>) -> Vec<DisplayEvent> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::new();
    let mut dropped = 0u64;
    for ev in events {
        if seen.contains(&ev.identity_key) {
            dropped += 1;
            continue;
        }
        seen.insert(ev.identity_key.clone());
        out.push(ev);
    }
    if dropped > 0 {
        counter!("warnings_dedup_dropped_total", dropped);
        trace!(kept = out.len(), dropped, "dedup: collapsed repeated keys");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(key: &str, reason: &str) -> DisplayEvent {
        DisplayEvent {
            identity_key: key.to_string(),
            namespace: String::new(),
            link_target: String::new(),
            reason: reason.to_string(),
            message: String::new(),
            first_seen: String::new(),
            last_seen: String::new(),
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let out = dedup(vec![ev("a", "1"), ev("b", "2"), ev("a", "3"), ev("c", "4"), ev("b", "5")]);
        let got: Vec<(&str, &str)> = out.iter().map(|e| (e.identity_key.as_str(), e.reason.as_str())).collect();
        assert_eq!(got, vec![("a", "1"), ("b", "2"), ("c", "4")]);
    }

    #[test]
    fn distinct_keys_pass_through_unchanged() {
        let input = vec![ev("x", "1"), ev("y", "2"), ev("z", "3")];
        assert_eq!(dedup(input.clone()), input);
    }

    #[test]
    fn empty_keys_collapse_too() {
        let out = dedup(vec![ev("", "first"), ev("", "second")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].reason, "first");
        assert!(dedup(Vec::new()).is_empty());
    }
}
