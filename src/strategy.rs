//! Stream strategy selection.
//!
//! A URL whose path ends in the segmented-manifest extension is played
//! through the adaptive engine when one is available and supported;
//! everything else goes straight to the media element.  The check runs on
//! every play request — a station may change strategy between plays.

/// Segmented-manifest extension that triggers adaptive playback.
pub const MANIFEST_SUFFIX: &str = ".m3u8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Segmented streaming through an adaptive session.
    Adaptive,
    /// Set the element source directly.
    Direct,
}

/// Pure decision: suffix match (case-insensitive) AND engine support.
pub fn select_strategy(url: &str, adaptive_supported: bool) -> Strategy {
    if adaptive_supported && is_manifest_url(url) {
        Strategy::Adaptive
    } else {
        Strategy::Direct
    }
}

pub fn is_manifest_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.ends_with(MANIFEST_SUFFIX)
}
