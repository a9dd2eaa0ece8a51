//! # Core
//!
//! Types shared by the interop components: the request/response plumbing
//! used to dispatch to handlers, and the versioned [`State`] envelope used
//! to persist per-session data between requests.

pub mod api;
pub mod state;

pub use self::state::{Conflict, State};
