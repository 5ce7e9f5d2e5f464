//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `AuthorState`: Where an author is in the crawl (queued, in flight, resolved, ...)
//! - `Blacklist`: Authors whose profile was rejected and must not be re-scanned

mod author_state;
mod blacklist;

// Re-export main types
pub use author_state::AuthorState;
pub use blacklist::Blacklist;
