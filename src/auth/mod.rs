//! Caller identity for owner-scoped requests.
//!
//! Authentication happens upstream of this service. By the time a request
//! arrives, the authenticated user's id has been placed in the `X-User-Id`
//! header; this module only reads it.

mod extractor;

pub use extractor::Owner;
