pub mod entities;

pub use entities::{AuditEvent, NewAuditEvent, SECURITY_EVENTS_TABLE, Severity};
