//! The attendance recorder: scan in, at most one event out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use taproll_core::StoreError;
use taproll_directory::{StudentDirectory, TagId};

use crate::event::AttendanceEvent;
use crate::session::SessionId;
use crate::store::AttendanceStore;

/// Result of a scan-recording attempt.
///
/// `AlreadyRecorded` is success-shaped: repeating a scan within a session is an
/// idempotent no-op carrying the prior event, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A new event was persisted.
    Recorded(AttendanceEvent),
    /// An event for this `(student, session)` pair already existed.
    AlreadyRecorded(AttendanceEvent),
}

impl ScanOutcome {
    /// The event behind the outcome, new or prior.
    pub fn event(&self) -> &AttendanceEvent {
        match self {
            Self::Recorded(e) | Self::AlreadyRecorded(e) => e,
        }
    }
}

/// Scan-recording failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The tag is not mapped to any active student. Permanent; retrying the
    /// same scan cannot help.
    #[error("tag not mapped to any active student")]
    UnknownTag,

    /// The session id is empty or malformed. Permanent.
    #[error("invalid session id")]
    InvalidSession,

    /// The persistence layer failed. The only variant worth retrying.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for RecordError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

/// Records attendance events from NFC scans.
///
/// Holds its two collaborators behind trait objects so any directory/store
/// pairing (in-memory for tests, Postgres in production) plugs in unchanged.
/// Safe to share across concurrent request handlers; the duplicate-scan
/// guard is the store's uniqueness invariant, not a lock here.
pub struct AttendanceRecorder {
    directory: Arc<dyn StudentDirectory>,
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceRecorder {
    pub fn new(directory: Arc<dyn StudentDirectory>, store: Arc<dyn AttendanceStore>) -> Self {
        Self { directory, store }
    }

    /// Record one scan.
    ///
    /// Resolves `tag_id` to an active student, then check-then-insert against
    /// the store. If the insert loses a concurrent race (`DuplicateKey`), the
    /// winner's event is fetched and returned as `AlreadyRecorded`; the raw
    /// storage error never escapes.
    ///
    /// `observed_at` defaults to the current time when `None`.
    pub async fn record_scan(
        &self,
        tag_id: &str,
        session_id: &str,
        observed_at: Option<DateTime<Utc>>,
    ) -> Result<ScanOutcome, RecordError> {
        let session = SessionId::new(session_id).map_err(|_| RecordError::InvalidSession)?;
        let tag = TagId::new(tag_id).map_err(|_| RecordError::UnknownTag)?;

        let student = self
            .directory
            .find_student_by_tag(&tag)
            .await?
            .ok_or(RecordError::UnknownTag)?;
        if !student.is_active() {
            tracing::debug!(%tag, "scan from inactive student rejected");
            return Err(RecordError::UnknownTag);
        }
        let student_id = *taproll_core::Entity::id(&student);

        if let Some(prior) = self.store.find_event(student_id, &session).await? {
            tracing::debug!(%student_id, session = %session, "duplicate scan, already recorded");
            return Ok(ScanOutcome::AlreadyRecorded(prior));
        }

        let event = AttendanceEvent::record(
            student_id,
            session.clone(),
            tag,
            observed_at.unwrap_or_else(Utc::now),
        );

        match self.store.insert_event(event).await {
            Ok(stored) => {
                tracing::info!(%student_id, session = %session, event_id = %stored.id, "attendance recorded");
                Ok(ScanOutcome::Recorded(stored))
            }
            Err(StoreError::DuplicateKey) => {
                // Lost the check-then-insert race; the winner's row is the fact.
                let prior = self
                    .store
                    .find_event(student_id, &session)
                    .await?
                    .ok_or_else(|| {
                        RecordError::StoreUnavailable(
                            "duplicate key reported but no event found".to_string(),
                        )
                    })?;
                tracing::debug!(%student_id, session = %session, "lost insert race, returning prior event");
                Ok(ScanOutcome::AlreadyRecorded(prior))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use taproll_core::StudentId;
    use taproll_directory::{Student, StudentDirectory};

    use super::*;

    /// Fixed tag -> student mapping.
    #[derive(Default)]
    struct FakeDirectory {
        by_tag: HashMap<TagId, Student>,
    }

    impl FakeDirectory {
        fn with(mut self, tag: &str, student: Student) -> Self {
            self.by_tag.insert(TagId::new(tag).unwrap(), student);
            self
        }
    }

    #[async_trait]
    impl StudentDirectory for FakeDirectory {
        async fn find_student_by_tag(&self, tag: &TagId) -> Result<Option<Student>, StoreError> {
            Ok(self.by_tag.get(tag).cloned())
        }
    }

    /// Keyed map store; occupied key on insert means `DuplicateKey`.
    #[derive(Default)]
    struct FakeStore {
        events: RwLock<HashMap<(StudentId, SessionId), AttendanceEvent>>,
        fail: AtomicBool,
    }

    impl FakeStore {
        fn len(&self) -> usize {
            self.events.read().unwrap().len()
        }
    }

    #[async_trait]
    impl AttendanceStore for FakeStore {
        async fn find_event(
            &self,
            student_id: StudentId,
            session_id: &SessionId,
        ) -> Result<Option<AttendanceEvent>, StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::unavailable("injected failure"));
            }
            Ok(self
                .events
                .read()
                .unwrap()
                .get(&(student_id, session_id.clone()))
                .cloned())
        }

        async fn insert_event(
            &self,
            event: AttendanceEvent,
        ) -> Result<AttendanceEvent, StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::unavailable("injected failure"));
            }
            let mut events = self.events.write().unwrap();
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
            Ok(self
                .events
                .read()
                .unwrap()
                .values()
                .filter(|e| &e.session_id == session_id)
                .cloned()
                .collect())
        }

        async fn list_by_student(
            &self,
            student_id: StudentId,
        ) -> Result<Vec<AttendanceEvent>, StoreError> {
            Ok(self
                .events
                .read()
                .unwrap()
                .values()
                .filter(|e| e.student_id == student_id)
                .cloned()
                .collect())
        }
    }

    /// Wraps a store and hides the first `find_event` result, so the recorder
    /// takes the insert path and hits the store's duplicate-key guard.
    struct RacyStore {
        inner: Arc<FakeStore>,
        hide_next_find: AtomicBool,
    }

    #[async_trait]
    impl AttendanceStore for RacyStore {
        async fn find_event(
            &self,
            student_id: StudentId,
            session_id: &SessionId,
        ) -> Result<Option<AttendanceEvent>, StoreError> {
            if self.hide_next_find.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_event(student_id, session_id).await
        }

        async fn insert_event(
            &self,
            event: AttendanceEvent,
        ) -> Result<AttendanceEvent, StoreError> {
            self.inner.insert_event(event).await
        }

        async fn list_by_session(
            &self,
            session_id: &SessionId,
        ) -> Result<Vec<AttendanceEvent>, StoreError> {
            self.inner.list_by_session(session_id).await
        }

        async fn list_by_student(
            &self,
            student_id: StudentId,
        ) -> Result<Vec<AttendanceEvent>, StoreError> {
            self.inner.list_by_student(student_id).await
        }
    }

    fn active_student(tag: &str) -> Student {
        let mut s = Student::new(StudentId::new(), "Test Student").unwrap();
        s.bind_tag(TagId::new(tag).unwrap(), Utc::now()).unwrap();
        s
    }

    fn recorder_with(
        directory: FakeDirectory,
        store: Arc<FakeStore>,
    ) -> (AttendanceRecorder, Arc<FakeStore>) {
        (
            AttendanceRecorder::new(Arc::new(directory), store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn first_scan_records_second_returns_prior_event() {
        let student = active_student("A1B2");
        let directory = FakeDirectory::default().with("A1B2", student);
        let (recorder, store) = recorder_with(directory, Arc::new(FakeStore::default()));

        let first = recorder
            .record_scan("A1B2", "2024-05-01-P1", None)
            .await
            .unwrap();
        let recorded = match &first {
            ScanOutcome::Recorded(e) => e.clone(),
            other => panic!("expected Recorded, got {other:?}"),
        };

        let second = recorder
            .record_scan("A1B2", "2024-05-01-P1", None)
            .await
            .unwrap();
        match second {
            ScanOutcome::AlreadyRecorded(e) => {
                assert_eq!(e.id, recorded.id);
                assert_eq!(e.observed_at, recorded.observed_at);
            }
            other => panic!("expected AlreadyRecorded, got {other:?}"),
        }

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_tag_persists_nothing() {
        let directory = FakeDirectory::default();
        let (recorder, store) = recorder_with(directory, Arc::new(FakeStore::default()));

        let err = recorder.record_scan("ZZZZ", "S1", None).await.unwrap_err();
        assert_eq!(err, RecordError::UnknownTag);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn inactive_student_tag_persists_nothing() {
        let mut student = active_student("A1B2");
        student.deactivate();
        let directory = FakeDirectory::default().with("A1B2", student);
        let (recorder, store) = recorder_with(directory, Arc::new(FakeStore::default()));

        let err = recorder.record_scan("A1B2", "S1", None).await.unwrap_err();
        assert_eq!(err, RecordError::UnknownTag);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn blank_session_is_invalid() {
        let directory = FakeDirectory::default().with("A1B2", active_student("A1B2"));
        let (recorder, store) = recorder_with(directory, Arc::new(FakeStore::default()));

        let err = recorder.record_scan("A1B2", "   ", None).await.unwrap_err();
        assert_eq!(err, RecordError::InvalidSession);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn blank_tag_is_unknown() {
        let (recorder, _) =
            recorder_with(FakeDirectory::default(), Arc::new(FakeStore::default()));

        let err = recorder.record_scan("  ", "S1", None).await.unwrap_err();
        assert_eq!(err, RecordError::UnknownTag);
    }

    #[tokio::test]
    async fn explicit_observed_at_is_kept() {
        let directory = FakeDirectory::default().with("A1B2", active_student("A1B2"));
        let (recorder, _) = recorder_with(directory, Arc::new(FakeStore::default()));

        let at = "2024-05-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let outcome = recorder.record_scan("A1B2", "S1", Some(at)).await.unwrap();
        assert_eq!(outcome.event().observed_at, at);
    }

    #[tokio::test]
    async fn store_failure_propagates_as_unavailable() {
        let directory = FakeDirectory::default().with("A1B2", active_student("A1B2"));
        let store = Arc::new(FakeStore::default());
        store.fail.store(true, Ordering::SeqCst);
        let (recorder, _) = recorder_with(directory, store);

        let err = recorder.record_scan("A1B2", "S1", None).await.unwrap_err();
        match err {
            RecordError::StoreUnavailable(_) => {}
            other => panic!("expected StoreUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_key_on_insert_becomes_already_recorded() {
        let student = active_student("A1B2");
        let directory = FakeDirectory::default().with("A1B2", student.clone());
        let inner = Arc::new(FakeStore::default());

        // Seed the winner's event, then hide it from the first find so the
        // recorder's insert collides the way a concurrent scan would.
        let prior = AttendanceEvent::record(
            *taproll_core::Entity::id(&student),
            SessionId::new("S1").unwrap(),
            TagId::new("A1B2").unwrap(),
            Utc::now(),
        );
        inner.insert_event(prior.clone()).await.unwrap();

        let racy = RacyStore {
            inner: inner.clone(),
            hide_next_find: AtomicBool::new(true),
        };
        let recorder = AttendanceRecorder::new(Arc::new(directory), Arc::new(racy));

        let outcome = recorder.record_scan("A1B2", "S1", None).await.unwrap();
        match outcome {
            ScanOutcome::AlreadyRecorded(e) => assert_eq!(e.id, prior.id),
            other => panic!("expected AlreadyRecorded, got {other:?}"),
        }
        assert_eq!(inner.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_identical_scans_record_exactly_once() {
        let directory = FakeDirectory::default().with("A1B2", active_student("A1B2"));
        let store = Arc::new(FakeStore::default());
        let recorder = Arc::new(AttendanceRecorder::new(
            Arc::new(directory),
            store.clone(),
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let recorder = recorder.clone();
            handles.push(tokio::spawn(async move {
                recorder.record_scan("A1B2", "S1", None).await.unwrap()
            }));
        }

        let mut recorded = 0;
        let mut already = 0;
        for handle in handles {
            match handle.await.unwrap() {
                ScanOutcome::Recorded(_) => recorded += 1,
                ScanOutcome::AlreadyRecorded(_) => already += 1,
            }
        }

        assert_eq!(recorded, 1);
        assert_eq!(already, 7);
        assert_eq!(store.len(), 1);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            // Idempotence: for any valid (tag, session), scanning twice stores
            // exactly one event and the second outcome references the first.
            #[test]
            fn double_scan_stores_one_event(
                tag in "[0-9A-F]{4,12}",
                session in "[a-z0-9-]{1,24}",
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                rt.block_on(async {
                    let directory = FakeDirectory::default().with(&tag, active_student(&tag));
                    let store = Arc::new(FakeStore::default());
                    let recorder =
                        AttendanceRecorder::new(Arc::new(directory), store.clone());

                    let first = recorder.record_scan(&tag, &session, None).await.unwrap();
                    let second = recorder.record_scan(&tag, &session, None).await.unwrap();

                    prop_assert!(matches!(&first, ScanOutcome::Recorded(_)));
                    match second {
                        ScanOutcome::AlreadyRecorded(e) => {
                            prop_assert_eq!(&e.id, &first.event().id);
                        }
                        other => return Err(TestCaseError::fail(format!(
                            "expected AlreadyRecorded, got {other:?}"
                        ))),
                    }
                    prop_assert_eq!(store.len(), 1);
                    Ok(())
                })?;
            }
        }
    }
}
