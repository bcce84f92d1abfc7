//! Running state of the active probing phase and its outcome types
//!
//! A `DiscoveryState` is created per discovery run, mutated once per probe,
//! and dropped when the run terminates. It is never shared.
use crate::discovery::DiscoveryLimits;
use crate::listing::ErrorCheck;
use std::fmt;

/// Classification of one probed page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Page has at least one product link and is not an error page
    Valid {
        /// Number of distinct product links found
        products: usize,
    },

    /// Fetch succeeded but the page lists no products
    Empty,

    /// The error-page classifier matched
    ErrorPage(ErrorCheck),

    /// Fetch returned nothing, or markup shorter than the minimum length
    Unreachable,
}

impl ProbeOutcome {
    /// Returns true if the probed page is a real listing page
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Why a discovery run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    // ===== Decided on the first page =====
    /// First page could not be fetched
    FirstPageUnavailable,

    /// First page lists no products
    EmptyFirstPage,

    /// First page has no pagination markers
    NoPagination,

    /// Visible pagination with no hint of further pages
    VisibleOnly,

    // ===== Decided by probing =====
    /// Too many non-valid pages in a row
    ConsecutiveFailures,

    /// Reached the page index ceiling
    PageCeiling,

    /// Used up the probe budget
    ProbeBudget,
}

impl Termination {
    /// Returns true if the run went through the active probing phase
    pub fn probed(&self) -> bool {
        matches!(
            self,
            Self::ConsecutiveFailures | Self::PageCeiling | Self::ProbeBudget
        )
    }

    /// Converts the termination reason to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::FirstPageUnavailable => "first_page_unavailable",
            Self::EmptyFirstPage => "empty_first_page",
            Self::NoPagination => "no_pagination",
            Self::VisibleOnly => "visible_only",
            Self::ConsecutiveFailures => "consecutive_failures",
            Self::PageCeiling => "page_ceiling",
            Self::ProbeBudget => "probe_budget",
        }
    }

    /// Parses a termination reason from its database string representation
    ///
    /// Returns None if the string doesn't match any known reason.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "first_page_unavailable" => Some(Self::FirstPageUnavailable),
            "empty_first_page" => Some(Self::EmptyFirstPage),
            "no_pagination" => Some(Self::NoPagination),
            "visible_only" => Some(Self::VisibleOnly),
            "consecutive_failures" => Some(Self::ConsecutiveFailures),
            "page_ceiling" => Some(Self::PageCeiling),
            "probe_budget" => Some(Self::ProbeBudget),
            _ => None,
        }
    }

    /// Returns all termination reasons
    pub fn all() -> Vec<Self> {
        vec![
            Self::FirstPageUnavailable,
            Self::EmptyFirstPage,
            Self::NoPagination,
            Self::VisibleOnly,
            Self::ConsecutiveFailures,
            Self::PageCeiling,
            Self::ProbeBudget,
        ]
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// State of the forward probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryState {
    /// Next page index to probe
    pub current_page_index: u32,

    /// Highest page index confirmed valid
    pub last_valid_page_index: u32,

    /// Non-valid outcomes since the last valid page
    pub consecutive_failures: u32,

    /// Probe fetches issued so far
    pub total_probes_made: u32,
}

impl DiscoveryState {
    /// State for a probe that starts right after the last known page
    pub fn starting_after(start_from: u32) -> Self {
        Self {
            current_page_index: start_from.saturating_add(1),
            last_valid_page_index: start_from,
            consecutive_failures: 0,
            total_probes_made: 0,
        }
    }

    /// Returns the bound that ends the probe, or None if probing continues
    ///
    /// When several bounds are hit at once the failure streak is reported
    /// first, then the page ceiling, then the probe budget.
    pub fn stop_reason(&self, limits: &DiscoveryLimits) -> Option<Termination> {
        if self.consecutive_failures >= limits.max_consecutive_failures {
            Some(Termination::ConsecutiveFailures)
        } else if self.current_page_index > limits.max_page_index {
            Some(Termination::PageCeiling)
        } else if self.total_probes_made >= limits.max_probes {
            Some(Termination::ProbeBudget)
        } else {
            None
        }
    }

    /// Applies one probe outcome and advances to the next index
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        if outcome.is_valid() {
            self.last_valid_page_index = self.current_page_index;
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
        }

        self.total_probes_made += 1;
        self.current_page_index += 1;
    }
}
