//! In-memory stores.
//!
//! Intended for tests/dev. Uniqueness invariants are enforced the same way the
//! Postgres stores enforce them, so recorder behavior is identical under both.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use taproll_attendance::{AttendanceEvent, AttendanceStore, SessionId};
use taproll_core::{Entity, FacultyId, StoreError, StudentId};
use taproll_directory::{
    Faculty, FacultyRepository, Student, StudentDirectory, StudentRepository, TagId,
};

fn poisoned() -> StoreError {
    StoreError::unavailable("lock poisoned")
}

/// Mirrors the `student_tags.tag` primary key: every tag in a student's
/// binding history, active or superseded, belongs to that student alone.
fn tag_held_by_other(students: &HashMap<StudentId, Student>, candidate: &Student) -> bool {
    students.values().any(|other| {
        other.id() != candidate.id()
            && candidate
                .tags()
                .iter()
                .any(|b| other.tags().iter().any(|o| o.tag == b.tag))
    })
}

/// In-memory student repository + directory.
#[derive(Debug, Default)]
pub struct InMemoryStudentRepository {
    students: RwLock<HashMap<StudentId, Student>>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentDirectory for InMemoryStudentRepository {
    async fn find_student_by_tag(&self, tag: &TagId) -> Result<Option<Student>, StoreError> {
        let students = self.students.read().map_err(|_| poisoned())?;
        Ok(students
            .values()
            .find(|s| s.active_tag() == Some(tag))
            .cloned())
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn insert(&self, student: Student) -> Result<Student, StoreError> {
        let mut students = self.students.write().map_err(|_| poisoned())?;
        let id = *student.id();
        if students.contains_key(&id) || tag_held_by_other(&students, &student) {
            return Err(StoreError::DuplicateKey);
        }
        students.insert(id, student.clone());
        Ok(student)
    }

    async fn get(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        let students = self.students.read().map_err(|_| poisoned())?;
        Ok(students.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        let students = self.students.read().map_err(|_| poisoned())?;
        let mut all: Vec<_> = students.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all)
    }

    async fn update(&self, student: Student) -> Result<Student, StoreError> {
        let mut students = self.students.write().map_err(|_| poisoned())?;
        let id = *student.id();
        if !students.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if tag_held_by_other(&students, &student) {
            return Err(StoreError::DuplicateKey);
        }
        students.insert(id, student.clone());
        Ok(student)
    }
}

/// In-memory faculty repository.
#[derive(Debug, Default)]
pub struct InMemoryFacultyRepository {
    faculty: RwLock<HashMap<FacultyId, Faculty>>,
}

impl InMemoryFacultyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FacultyRepository for InMemoryFacultyRepository {
    async fn insert(&self, faculty: Faculty) -> Result<Faculty, StoreError> {
        let mut map = self.faculty.write().map_err(|_| poisoned())?;
        if map.contains_key(&faculty.id) {
            return Err(StoreError::DuplicateKey);
        }
        map.insert(faculty.id, faculty.clone());
        Ok(faculty)
    }

    async fn get(&self, id: FacultyId) -> Result<Option<Faculty>, StoreError> {
        let map = self.faculty.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Faculty>, StoreError> {
        let map = self.faculty.read().map_err(|_| poisoned())?;
        let mut all: Vec<_> = map.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update(&self, faculty: Faculty) -> Result<Faculty, StoreError> {
        let mut map = self.faculty.write().map_err(|_| poisoned())?;
        if !map.contains_key(&faculty.id) {
            return Err(StoreError::NotFound);
        }
        map.insert(faculty.id, faculty.clone());
        Ok(faculty)
    }

    async fn delete(&self, id: FacultyId) -> Result<(), StoreError> {
        let mut map = self.faculty.write().map_err(|_| poisoned())?;
        map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

/// In-memory attendance store keyed by `(student_id, session_id)`.
///
/// The occupancy check and insert happen under one write lock, so the
/// duplicate-key guarantee holds under concurrent calls.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceStore {
    events: RwLock<HashMap<(StudentId, SessionId), AttendanceEvent>>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn find_event(
        &self,
        student_id: StudentId,
        session_id: &SessionId,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events.get(&(student_id, session_id.clone())).cloned())
    }

    async fn insert_event(&self, event: AttendanceEvent) -> Result<AttendanceEvent, StoreError> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        let key = (event.student_id, event.session_id.clone());
        if events.contains_key(&key) {
            return Err(StoreError::DuplicateKey);
        }
        events.insert(key, event.clone());
        Ok(event)
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        let mut matching: Vec<_> = events
            .values()
            .filter(|e| &e.session_id == session_id)
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.observed_at);
        Ok(matching)
    }

    async fn list_by_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        let mut matching: Vec<_> = events
            .values()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.observed_at);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn event(student_id: StudentId, session: &str) -> AttendanceEvent {
        AttendanceEvent::record(
            student_id,
            SessionId::new(session).unwrap(),
            TagId::new("A1B2").unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn attendance_insert_rejects_duplicate_pair() {
        let store = InMemoryAttendanceStore::new();
        let student_id = StudentId::new();

        store.insert_event(event(student_id, "S1")).await.unwrap();
        let err = store
            .insert_event(event(student_id, "S1"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateKey);

        // Same student, different session is fine.
        store.insert_event(event(student_id, "S2")).await.unwrap();
        assert_eq!(
            store.list_by_student(student_id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn directory_resolves_only_the_active_binding() {
        let repo = InMemoryStudentRepository::new();
        let mut student = Student::new(StudentId::new(), "Ada").unwrap();
        let old = TagId::new("OLD1").unwrap();
        let new = TagId::new("NEW1").unwrap();
        student.bind_tag(old.clone(), Utc::now()).unwrap();
        student.bind_tag(new.clone(), Utc::now()).unwrap();
        repo.insert(student.clone()).await.unwrap();

        assert!(
            repo.find_student_by_tag(&old).await.unwrap().is_none(),
            "superseded binding must not resolve"
        );
        let found = repo.find_student_by_tag(&new).await.unwrap().unwrap();
        assert_eq!(found.id(), student.id());
    }

    #[tokio::test]
    async fn tag_cannot_belong_to_two_students() {
        let repo = InMemoryStudentRepository::new();
        let tag = TagId::new("A1B2").unwrap();

        let mut first = Student::new(StudentId::new(), "Ada").unwrap();
        first.bind_tag(tag.clone(), Utc::now()).unwrap();
        repo.insert(first).await.unwrap();

        let mut second = Student::new(StudentId::new(), "Grace").unwrap();
        second.bind_tag(tag, Utc::now()).unwrap();
        let err = repo.insert(second).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateKey);
    }

    #[tokio::test]
    async fn update_cannot_claim_another_students_tag() {
        let repo = InMemoryStudentRepository::new();
        let tag = TagId::new("A1B2").unwrap();

        let mut owner = Student::new(StudentId::new(), "Ada").unwrap();
        owner.bind_tag(tag.clone(), Utc::now()).unwrap();
        repo.insert(owner.clone()).await.unwrap();

        let other = Student::new(StudentId::new(), "Grace").unwrap();
        let mut other = repo.insert(other).await.unwrap();
        other.bind_tag(tag, Utc::now()).unwrap();
        let err = repo.update(other).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateKey);

        // The owner re-saving their own bindings is not a conflict.
        repo.update(owner).await.unwrap();
    }

    #[tokio::test]
    async fn student_update_requires_existing_row() {
        let repo = InMemoryStudentRepository::new();
        let student = Student::new(StudentId::new(), "Ada").unwrap();
        let err = repo.update(student).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[tokio::test]
    async fn faculty_delete_missing_is_not_found() {
        let repo = InMemoryFacultyRepository::new();
        let err = repo.delete(FacultyId::new()).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}
