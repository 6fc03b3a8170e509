//! Store/recorder wiring.

use std::sync::Arc;

use taproll_attendance::{AttendanceRecorder, AttendanceStore};
use taproll_directory::{FacultyRepository, StudentRepository};
use taproll_infra::{
    Database, InMemoryAttendanceStore, InMemoryFacultyRepository, InMemoryStudentRepository,
    PgAttendanceStore, PgFacultyRepository, PgStudentRepository,
};

/// Everything the handlers need, assembled once at startup and shared via
/// `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub students: Arc<dyn StudentRepository>,
    pub faculty: Arc<dyn FacultyRepository>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub recorder: AttendanceRecorder,
}

impl AppServices {
    /// In-memory wiring for dev mode and router tests.
    pub fn in_memory() -> Self {
        let students = Arc::new(InMemoryStudentRepository::new());
        let attendance = Arc::new(InMemoryAttendanceStore::new());
        let recorder = AttendanceRecorder::new(students.clone(), attendance.clone());
        Self {
            students,
            faculty: Arc::new(InMemoryFacultyRepository::new()),
            attendance,
            recorder,
        }
    }

    /// Postgres wiring; all stores share the database's pool.
    pub fn postgres(db: &Database) -> Self {
        let students = Arc::new(PgStudentRepository::new(db.pool()));
        let attendance = Arc::new(PgAttendanceStore::new(db.pool()));
        let recorder = AttendanceRecorder::new(students.clone(), attendance.clone());
        Self {
            students,
            faculty: Arc::new(PgFacultyRepository::new(db.pool())),
            attendance,
            recorder,
        }
    }
}
