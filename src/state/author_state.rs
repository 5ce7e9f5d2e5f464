/// Author state definitions for tracking crawl progress
///
/// This module defines every state an author can be in during a crawl.
use std::fmt;

/// Represents the current state of an author in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorState {
    // ===== Active States =====
    /// Author is in the frontier and has not been submitted yet
    Queued,

    /// A scan for this author has been submitted and not yet observed complete
    InFlight,

    /// Author was submitted, finished without resolving, and went back to the frontier
    Requeued,

    // ===== Terminal States =====
    /// Author has an entry in the catalog
    Resolved,

    /// A page fetch for this author was rejected by the platform
    Blacklisted,
}

impl AuthorState {
    /// Returns true if this is a terminal state (no further scans will happen)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Blacklisted)
    }

    /// Returns true if the author may still be scanned
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InFlight => "in_flight",
            Self::Requeued => "requeued",
            Self::Resolved => "resolved",
            Self::Blacklisted => "blacklisted",
        }
    }

    /// Returns all possible author states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::InFlight,
            Self::Requeued,
            Self::Resolved,
            Self::Blacklisted,
        ]
    }
}

impl fmt::Display for AuthorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
