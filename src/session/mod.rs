//! Session module
//!
//! In-memory per-session counters shared by every transport.

pub mod store;

pub use store::SessionStore;
