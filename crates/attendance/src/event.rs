use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taproll_core::{EventId, StudentId};
use taproll_directory::TagId;

use crate::session::SessionId;

/// One recorded scan: an immutable fact, never mutated after creation.
///
/// Invariant (store-enforced): at most one event exists per
/// `(student_id, session_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub id: EventId,
    pub student_id: StudentId,
    pub session_id: SessionId,
    /// The tag that produced the scan, kept for audit.
    pub tag_id: TagId,
    pub observed_at: DateTime<Utc>,
}

impl AttendanceEvent {
    /// Build a new event with a freshly generated id.
    pub fn record(
        student_id: StudentId,
        session_id: SessionId,
        tag_id: TagId,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            student_id,
            session_id,
            tag_id,
            observed_at,
        }
    }
}
