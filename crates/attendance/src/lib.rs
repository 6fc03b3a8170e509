//! `taproll-attendance` — attendance-event recording from NFC scans.
//!
//! The [`recorder::AttendanceRecorder`] is the core of the service: it resolves
//! a raw tag against the student directory, applies the duplicate-scan policy
//! and persists exactly zero or one immutable [`event::AttendanceEvent`] per
//! call. Everything else in the workspace is glue around it.

pub mod event;
pub mod recorder;
pub mod session;
pub mod store;

pub use event::AttendanceEvent;
pub use recorder::{AttendanceRecorder, RecordError, ScanOutcome};
pub use session::SessionId;
pub use store::AttendanceStore;
