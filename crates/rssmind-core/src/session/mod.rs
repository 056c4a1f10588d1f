//! Request slots
//!
//! A UI slot (one chat thread, one article summary) holds at most one live
//! stream. Starting a new request in a busy slot cancels and supersedes the
//! old one.

mod slots;

pub use slots::{SlotKey, SlotLease, SlotRegistry};
