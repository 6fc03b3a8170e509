use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taproll_core::{DomainError, DomainResult, Entity, StudentId, ValueObject};

/// Identifier read from an NFC chip.
///
/// Normalized on construction: surrounding whitespace is stripped and hex
/// letters are upper-cased, so readers reporting `a1b2` and `A1B2` resolve to
/// the same binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub fn new(raw: impl AsRef<str>) -> DomainResult<Self> {
        let normalized = raw.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("tag id cannot be empty"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for TagId {}

impl core::fmt::Display for TagId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enrollment status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Active,
    Inactive,
}

/// One tag owned by a student.
///
/// A student may accumulate several bindings over time (lost cards get
/// replaced); at most one binding is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBinding {
    pub tag: TagId,
    pub active: bool,
    pub bound_at: DateTime<Utc>,
}

/// Student record.
///
/// Owned by the directory; the attendance recorder only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    name: String,
    status: StudentStatus,
    tags: Vec<TagBinding>,
}

impl Student {
    pub fn new(id: StudentId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            status: StudentStatus::Active,
            tags: Vec::new(),
        })
    }

    /// Rehydrate a student from stored parts. No invariant re-checking beyond
    /// the single-active-tag rule; the store is trusted for the rest.
    pub fn from_parts(
        id: StudentId,
        name: String,
        status: StudentStatus,
        tags: Vec<TagBinding>,
    ) -> DomainResult<Self> {
        if tags.iter().filter(|b| b.active).count() > 1 {
            return Err(DomainError::invariant("more than one active tag binding"));
        }
        Ok(Self {
            id,
            name,
            status,
            tags,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> StudentStatus {
        self.status
    }

    pub fn tags(&self) -> &[TagBinding] {
        &self.tags
    }

    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }

    /// The currently active tag, if any.
    pub fn active_tag(&self) -> Option<&TagId> {
        self.tags.iter().find(|b| b.active).map(|b| &b.tag)
    }

    /// Bind a new tag, deactivating any previously active binding.
    pub fn bind_tag(&mut self, tag: TagId, bound_at: DateTime<Utc>) -> DomainResult<()> {
        if self.tags.iter().any(|b| b.tag == tag) {
            return Err(DomainError::conflict("tag already bound to this student"));
        }
        for binding in &mut self.tags {
            binding.active = false;
        }
        self.tags.push(TagBinding {
            tag,
            active: true,
            bound_at,
        });
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        self.name = name;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.status = StudentStatus::Inactive;
    }

    pub fn reactivate(&mut self) {
        self.status = StudentStatus::Active;
    }
}

impl Entity for Student {
    type Id = StudentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student::new(StudentId::new(), "Ada Lovelace").unwrap()
    }

    #[test]
    fn tag_id_normalizes_case_and_whitespace() {
        let tag = TagId::new("  a1b2 ").unwrap();
        assert_eq!(tag.as_str(), "A1B2");
        assert_eq!(tag, TagId::new("A1B2").unwrap());
    }

    #[test]
    fn tag_id_rejects_blank() {
        let err = TagId::new("   ").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn new_student_rejects_empty_name() {
        let err = Student::new(StudentId::new(), "   ").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn bind_tag_keeps_at_most_one_active() {
        let mut s = student();
        let first = TagId::new("A1B2").unwrap();
        let second = TagId::new("C3D4").unwrap();

        s.bind_tag(first.clone(), Utc::now()).unwrap();
        assert_eq!(s.active_tag(), Some(&first));

        s.bind_tag(second.clone(), Utc::now()).unwrap();
        assert_eq!(s.active_tag(), Some(&second));
        assert_eq!(s.tags().len(), 2);
        assert_eq!(s.tags().iter().filter(|b| b.active).count(), 1);
    }

    #[test]
    fn bind_tag_rejects_rebinding_same_tag() {
        let mut s = student();
        let tag = TagId::new("A1B2").unwrap();
        s.bind_tag(tag.clone(), Utc::now()).unwrap();

        let err = s.bind_tag(tag, Utc::now()).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn from_parts_rejects_two_active_bindings() {
        let id = StudentId::new();
        let tags = vec![
            TagBinding {
                tag: TagId::new("A1B2").unwrap(),
                active: true,
                bound_at: Utc::now(),
            },
            TagBinding {
                tag: TagId::new("C3D4").unwrap(),
                active: true,
                bound_at: Utc::now(),
            },
        ];
        let err =
            Student::from_parts(id, "Ada".to_string(), StudentStatus::Active, tags).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn deactivate_flips_status() {
        let mut s = student();
        assert!(s.is_active());
        s.deactivate();
        assert!(!s.is_active());
        s.reactivate();
        assert!(s.is_active());
    }
}
