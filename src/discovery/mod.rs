//! Pagination boundary discovery
//!
//! This module answers "how many pages does this category have?" for a site
//! that does not advertise it reliably. Discovery runs in two phases:
//! 1. A signal pass over the first page (visible `page-N` markers, the
//!    "next block" button, numeric ranges in the text)
//! 2. When the signals hint at more pages, a bounded forward probe that
//!    fetches pages one by one and stops once failures cluster
//!
//! The heuristic bounds live in [`DiscoveryLimits`].

mod engine;
mod links;
mod state;

pub use engine::{classify_probe, DiscoveryReport, PageCountDiscovery};
pub use links::{build_page_url, build_page_urls};
pub use state::{DiscoveryState, ProbeOutcome, Termination};

/// Probed pages shorter than this many characters count as unreachable
pub const DEFAULT_MIN_PAGE_LENGTH: usize = 10_000;

/// Consecutive non-valid probes after which the listing is taken to have ended
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Highest page index ever probed
pub const DEFAULT_MAX_PAGE_INDEX: u32 = 300;

/// Maximum number of probe fetches per discovery run
pub const DEFAULT_MAX_PROBES: u32 = 200;

/// Bounds of the active probing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryLimits {
    /// Minimum markup length (characters) for a probed page to be considered
    pub min_page_length: usize,

    /// Consecutive non-valid probes that stop the scan
    pub max_consecutive_failures: u32,

    /// Hard ceiling on the probed page index
    pub max_page_index: u32,

    /// Hard ceiling on probe fetches
    pub max_probes: u32,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            min_page_length: DEFAULT_MIN_PAGE_LENGTH,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            max_page_index: DEFAULT_MAX_PAGE_INDEX,
            max_probes: DEFAULT_MAX_PROBES,
        }
    }
}
