use serde::{Deserialize, Serialize};

use taproll_core::{DomainError, DomainResult, FacultyId};

/// Faculty record: plain directory data, no part in the recording policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl Faculty {
    pub fn new(
        id: FacultyId,
        name: impl Into<String>,
        email: Option<String>,
        department: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            email,
            department,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_faculty_rejects_empty_name() {
        let err = Faculty::new(FacultyId::new(), "", None, None).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
