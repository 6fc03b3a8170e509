use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use taproll_attendance::AttendanceEvent;
use taproll_core::Entity;
use taproll_directory::{Faculty, Student, StudentStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub tag_id: String,
    pub session_id: String,
    /// Defaults to the server's current time when omitted.
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    /// Optional initial tag to bind.
    pub tag_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    /// Optional new name (if `None`, keep existing).
    pub name: Option<String>,
    /// Optional new status (if `None`, keep existing).
    pub status: Option<StudentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct BindTagRequest {
    pub tag_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFacultyRequest {
    pub name: String,
    pub email: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFacultyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

// -------------------------
// Response JSON mapping
// -------------------------

pub fn student_to_json(student: &Student) -> JsonValue {
    json!({
        "id": student.id().to_string(),
        "name": student.name(),
        "status": student.status(),
        "active_tag": student.active_tag().map(|t| t.as_str()),
        "tags": student.tags().iter().map(|b| json!({
            "tag": b.tag.as_str(),
            "active": b.active,
            "bound_at": b.bound_at,
        })).collect::<Vec<_>>(),
    })
}

pub fn event_to_json(event: &AttendanceEvent) -> JsonValue {
    json!({
        "id": event.id.to_string(),
        "student_id": event.student_id.to_string(),
        "session_id": event.session_id.as_str(),
        "tag_id": event.tag_id.as_str(),
        "observed_at": event.observed_at,
    })
}

pub fn faculty_to_json(faculty: &Faculty) -> JsonValue {
    json!({
        "id": faculty.id.to_string(),
        "name": faculty.name,
        "email": faculty.email,
        "department": faculty.department,
    })
}
