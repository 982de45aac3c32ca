//! [libs/domain/models/src/caller.rs]
//!
//! The caller context value object (§3, §6, §9). This is never persisted:
//! it is constructed by the outer layer from an already-authenticated
//! request and passed as an explicit first argument to every core
//! operation. Design note (§9) explicitly rejects the thread-local /
//! request-extension convention the teacher codebase uses for its own
//! `OperatorIdentity` — the whole point of this shape is that a test can
//! construct one directly with no ambient state to fake.

use crate::enums::Role;

/// Identity on whose behalf a core operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// Non-null for every role except `System`.
    pub user_id: Option<i64>,
    pub role: Role,
    pub department_id: Option<i64>,
}

impl CallerContext {
    pub fn new(user_id: Option<i64>, role: Role, department_id: Option<i64>) -> Self {
        Self {
            user_id,
            role,
            department_id,
        }
    }

    pub fn system() -> Self {
        Self {
            user_id: None,
            role: Role::System,
            department_id: None,
        }
    }

    pub fn citizen(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            role: Role::Citizen,
            department_id: None,
        }
    }

    pub fn staff(user_id: i64, department_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            role: Role::Staff,
            department_id: Some(department_id),
        }
    }

    pub fn dept_head(user_id: i64, department_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            role: Role::DeptHead,
            department_id: Some(department_id),
        }
    }

    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            role: Role::Admin,
            department_id: None,
        }
    }

    /// A `CallerContext` is only ever well formed if non-SYSTEM roles carry
    /// a user id. Constructors above already uphold this; this helper is
    /// for contexts assembled by the outer layer from raw fields.
    pub fn is_valid(&self) -> bool {
        self.role == Role::System || self.user_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_caller_has_no_user_id() {
        let caller = CallerContext::system();
        assert_eq!(caller.user_id, None);
        assert!(caller.is_valid());
    }

    #[test]
    fn non_system_caller_without_user_id_is_invalid() {
        let caller = CallerContext {
            user_id: None,
            role: Role::Citizen,
            department_id: None,
        };
        assert!(!caller.is_valid());
    }
}
