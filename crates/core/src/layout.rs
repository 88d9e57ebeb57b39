#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Viewports narrower than this get the compact list.
pub const COMPACT_BREAKPOINT: f32 = 992.0;

/// Environment the panel is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvSignals {
    /// Touch/mobile/hybrid platform.
    pub compact_platform: bool,
    pub viewport_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    Compact,
    Tabular,
}

pub fn choose_layout(signals: &EnvSignals) -> LayoutMode {
    if signals.compact_platform || signals.viewport_width < COMPACT_BREAKPOINT {
        LayoutMode::Compact
    } else {
        LayoutMode::Tabular
    }
}

/// Platform class from the build target, overridable with `KWARN_PLATFORM`
/// (`mobile`, `hybrid` or `compact` force the compact class; `desktop` forces the wide one).
pub fn compact_platform_from_env() -> bool {
    match std::env::var("KWARN_PLATFORM") {
        Ok(v) => platform_is_compact(&v),
        Err(_) => cfg!(any(target_os = "android", target_os = "ios")),
    }
}

fn platform_is_compact(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "mobile" | "hybrid" | "compact")
}
