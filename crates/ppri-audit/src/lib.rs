//! ppri-audit
//!
//! Application-level audit trail. Events are emitted through `tracing` so they
//! land wherever the host's subscriber sends logs.

pub mod events;

pub use events::{AuditAction, AuditEvent};
