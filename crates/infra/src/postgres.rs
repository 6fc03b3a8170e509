//! Postgres-backed stores.
//!
//! All stores share one `PgPool` handed in from [`crate::Database`]. The
//! attendance uniqueness invariant is the `uq_attendance_student_session`
//! constraint; a violation surfaces as `StoreError::DuplicateKey`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use taproll_attendance::{AttendanceEvent, AttendanceStore, SessionId};
use taproll_core::{Entity, EventId, FacultyId, StoreError, StudentId};
use taproll_directory::{
    Faculty, FacultyRepository, Student, StudentDirectory, StudentRepository, StudentStatus,
    TagBinding, TagId,
};

fn unavailable(e: impl core::fmt::Display) -> StoreError {
    StoreError::unavailable(e.to_string())
}

/// Unique-constraint violations become `DuplicateKey`; everything else is a
/// store availability problem.
fn map_write_err(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey,
        _ => unavailable(e),
    }
}

fn status_as_str(status: StudentStatus) -> &'static str {
    match status {
        StudentStatus::Active => "active",
        StudentStatus::Inactive => "inactive",
    }
}

fn status_from_str(s: &str) -> Result<StudentStatus, StoreError> {
    match s {
        "active" => Ok(StudentStatus::Active),
        "inactive" => Ok(StudentStatus::Inactive),
        other => Err(StoreError::unavailable(format!(
            "corrupt student status in store: {other}"
        ))),
    }
}

/// Students + tag bindings over `students` and `student_tags`.
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_tags(&self, student_id: StudentId) -> Result<Vec<TagBinding>, StoreError> {
        let rows = sqlx::query(
            "SELECT tag, active, bound_at FROM student_tags \
             WHERE student_id = $1 ORDER BY bound_at",
        )
        .bind(student_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.into_iter()
            .map(|row| {
                let tag: String = row.try_get("tag").map_err(unavailable)?;
                let active: bool = row.try_get("active").map_err(unavailable)?;
                let bound_at: DateTime<Utc> = row.try_get("bound_at").map_err(unavailable)?;
                Ok(TagBinding {
                    tag: TagId::new(&tag).map_err(unavailable)?,
                    active,
                    bound_at,
                })
            })
            .collect()
    }

    async fn load_student(&self, student_id: StudentId) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query("SELECT id, name, status FROM students WHERE id = $1")
            .bind(student_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = row.try_get("name").map_err(unavailable)?;
        let status: String = row.try_get("status").map_err(unavailable)?;
        let tags = self.load_tags(student_id).await?;

        Student::from_parts(student_id, name, status_from_str(&status)?, tags)
            .map(Some)
            .map_err(unavailable)
    }

    async fn write_tags(
        tx: &mut Transaction<'_, Postgres>,
        student: &Student,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM student_tags WHERE student_id = $1")
            .bind(student.id().as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(unavailable)?;

        for binding in student.tags() {
            sqlx::query(
                "INSERT INTO student_tags (tag, student_id, active, bound_at) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(binding.tag.as_str())
            .bind(student.id().as_uuid())
            .bind(binding.active)
            .bind(binding.bound_at)
            .execute(&mut **tx)
            .await
            .map_err(map_write_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl StudentDirectory for PgStudentRepository {
    async fn find_student_by_tag(&self, tag: &TagId) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query("SELECT student_id FROM student_tags WHERE tag = $1 AND active")
            .bind(tag.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let student_id: Uuid = row.try_get("student_id").map_err(unavailable)?;
        self.load_student(StudentId::from_uuid(student_id)).await
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn insert(&self, student: Student) -> Result<Student, StoreError> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        sqlx::query("INSERT INTO students (id, name, status) VALUES ($1, $2, $3)")
            .bind(student.id().as_uuid())
            .bind(student.name())
            .bind(status_as_str(student.status()))
            .execute(&mut *tx)
            .await
            .map_err(map_write_err)?;

        Self::write_tags(&mut tx, &student).await?;
        tx.commit().await.map_err(unavailable)?;
        Ok(student)
    }

    async fn get(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        self.load_student(id).await
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let rows = sqlx::query("SELECT id FROM students ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        let mut students = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.try_get("id").map_err(unavailable)?;
            if let Some(student) = self.load_student(StudentId::from_uuid(id)).await? {
                students.push(student);
            }
        }
        Ok(students)
    }

    async fn update(&self, student: Student) -> Result<Student, StoreError> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let result = sqlx::query("UPDATE students SET name = $2, status = $3 WHERE id = $1")
            .bind(student.id().as_uuid())
            .bind(student.name())
            .bind(status_as_str(student.status()))
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Self::write_tags(&mut tx, &student).await?;
        tx.commit().await.map_err(unavailable)?;
        Ok(student)
    }
}

/// Faculty CRUD over the `faculty` table.
pub struct PgFacultyRepository {
    pool: PgPool,
}

impl PgFacultyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn faculty_from_row(row: &sqlx::postgres::PgRow) -> Result<Faculty, StoreError> {
    let id: Uuid = row.try_get("id").map_err(unavailable)?;
    Ok(Faculty {
        id: FacultyId::from_uuid(id),
        name: row.try_get("name").map_err(unavailable)?,
        email: row.try_get("email").map_err(unavailable)?,
        department: row.try_get("department").map_err(unavailable)?,
    })
}

#[async_trait]
impl FacultyRepository for PgFacultyRepository {
    async fn insert(&self, faculty: Faculty) -> Result<Faculty, StoreError> {
        sqlx::query("INSERT INTO faculty (id, name, email, department) VALUES ($1, $2, $3, $4)")
            .bind(faculty.id.as_uuid())
            .bind(&faculty.name)
            .bind(&faculty.email)
            .bind(&faculty.department)
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;
        Ok(faculty)
    }

    async fn get(&self, id: FacultyId) -> Result<Option<Faculty>, StoreError> {
        let row = sqlx::query("SELECT id, name, email, department FROM faculty WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        row.as_ref().map(faculty_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Faculty>, StoreError> {
        let rows = sqlx::query("SELECT id, name, email, department FROM faculty ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        rows.iter().map(faculty_from_row).collect()
    }

    async fn update(&self, faculty: Faculty) -> Result<Faculty, StoreError> {
        let result = sqlx::query(
            "UPDATE faculty SET name = $2, email = $3, department = $4 WHERE id = $1",
        )
        .bind(faculty.id.as_uuid())
        .bind(&faculty.name)
        .bind(&faculty.email)
        .bind(&faculty.department)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(faculty)
    }

    async fn delete(&self, id: FacultyId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Attendance events over `attendance_events`.
pub struct PgAttendanceStore {
    pool: PgPool,
}

impl PgAttendanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn event_from_row(row: &sqlx::postgres::PgRow) -> Result<AttendanceEvent, StoreError> {
    let id: Uuid = row.try_get("id").map_err(unavailable)?;
    let student_id: Uuid = row.try_get("student_id").map_err(unavailable)?;
    let session_id: String = row.try_get("session_id").map_err(unavailable)?;
    let tag: String = row.try_get("tag").map_err(unavailable)?;
    let observed_at: DateTime<Utc> = row.try_get("observed_at").map_err(unavailable)?;
    Ok(AttendanceEvent {
        id: EventId::from_uuid(id),
        student_id: StudentId::from_uuid(student_id),
        session_id: SessionId::new(&session_id).map_err(unavailable)?,
        tag_id: TagId::new(&tag).map_err(unavailable)?,
        observed_at,
    })
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn find_event(
        &self,
        student_id: StudentId,
        session_id: &SessionId,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        let row = sqlx::query(
            "SELECT id, student_id, session_id, tag, observed_at FROM attendance_events \
             WHERE student_id = $1 AND session_id = $2",
        )
        .bind(student_id.as_uuid())
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        row.as_ref().map(event_from_row).transpose()
    }

    async fn insert_event(&self, event: AttendanceEvent) -> Result<AttendanceEvent, StoreError> {
        sqlx::query(
            "INSERT INTO attendance_events (id, student_id, session_id, tag, observed_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.id.as_uuid())
        .bind(event.student_id.as_uuid())
        .bind(event.session_id.as_str())
        .bind(event.tag_id.as_str())
        .bind(event.observed_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_err)?;
        Ok(event)
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, student_id, session_id, tag, observed_at FROM attendance_events \
             WHERE session_id = $1 ORDER BY observed_at",
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        rows.iter().map(event_from_row).collect()
    }

    async fn list_by_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, student_id, session_id, tag, observed_at FROM attendance_events \
             WHERE student_id = $1 ORDER BY observed_at",
        )
        .bind(student_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        rows.iter().map(event_from_row).collect()
    }
}
