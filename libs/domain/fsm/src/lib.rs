//! [libs/domain/fsm/src/lib.rs]
//!
//! The complaint lifecycle state machine (§4.1). Pure and stateless: no
//! I/O, no dependency on any other component. `ComplaintStateService`
//! consults it before doing anything else; the guard evaluator and the
//! repository layer are unaware of it.

use grievance_domain_models::enums::{Role, Status};

/// One legal move in the lifecycle, and the roles permitted to make it.
struct Transition {
    from: Status,
    to: Status,
    roles: &'static [Role],
}

/// §4.1's transition table, RBAC policy included. `RESOLVED -> IN_PROGRESS`
/// is SYSTEM-only by design: a human never drives that edge directly, it
/// is only reached via `DisputeWorkflow::review_dispute` approving a
/// dispute and then calling back into `transition` as SYSTEM (§4.9).
const TRANSITIONS: &[Transition] = &[
    Transition {
        from: Status::Filed,
        to: Status::InProgress,
        roles: &[Role::System],
    },
    Transition {
        from: Status::Filed,
        to: Status::Cancelled,
        roles: &[Role::Citizen, Role::Admin],
    },
    Transition {
        from: Status::InProgress,
        to: Status::Resolved,
        roles: &[Role::Staff, Role::DeptHead],
    },
    Transition {
        from: Status::InProgress,
        to: Status::Cancelled,
        roles: &[Role::Citizen, Role::Admin],
    },
    Transition {
        from: Status::Resolved,
        to: Status::Closed,
        roles: &[Role::Citizen, Role::System],
    },
    Transition {
        from: Status::Resolved,
        to: Status::Cancelled,
        roles: &[Role::Citizen, Role::Admin],
    },
    Transition {
        from: Status::Resolved,
        to: Status::InProgress,
        roles: &[Role::System],
    },
];

fn find(from: Status, to: Status) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|transition| transition.from == from && transition.to == to)
}

/// Is `from -> to` a legal move at all, regardless of caller?
pub fn is_legal(from: Status, to: Status) -> bool {
    find(from, to).is_some()
}

/// Every status reachable from `from` in one legal move. Terminal states
/// (CLOSED, CANCELLED) return an empty set.
pub fn allowed_targets(from: Status) -> Vec<Status> {
    TRANSITIONS
        .iter()
        .filter(|transition| transition.from == from)
        .map(|transition| transition.to)
        .collect()
}

/// May `role` perform `from -> to`? False both when the transition itself
/// is illegal and when it is legal but not for this role.
pub fn role_allowed(from: Status, to: Status, role: Role) -> bool {
    find(from, to)
        .map(|transition| transition.roles.contains(&role))
        .unwrap_or(false)
}

/// The roles permitted to perform `from -> to`, for diagnostics
/// (`CoreError::Unauthorized` carries this list, §7).
pub fn allowed_roles(from: Status, to: Status) -> Vec<Role> {
    find(from, to)
        .map(|transition| transition.roles.to_vec())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grievance_domain_models::enums::Status::*;

    #[test]
    fn terminal_states_have_no_successors() {
        assert!(allowed_targets(Closed).is_empty());
        assert!(allowed_targets(Cancelled).is_empty());
    }

    #[test]
    fn filed_to_in_progress_is_system_only() {
        assert!(role_allowed(Filed, InProgress, Role::System));
        assert!(!role_allowed(Filed, InProgress, Role::Staff));
        assert!(!role_allowed(Filed, InProgress, Role::Admin));
    }

    #[test]
    fn resolved_to_closed_allows_citizen_and_system_not_staff() {
        assert!(role_allowed(Resolved, Closed, Role::Citizen));
        assert!(role_allowed(Resolved, Closed, Role::System));
        assert!(!role_allowed(Resolved, Closed, Role::Staff));
    }

    #[test]
    fn resolved_to_in_progress_is_system_only_dispute_reopen() {
        assert!(is_legal(Resolved, InProgress));
        assert!(role_allowed(Resolved, InProgress, Role::System));
        assert!(!role_allowed(Resolved, InProgress, Role::DeptHead));
    }

    #[test]
    fn unrelated_pairs_are_illegal() {
        assert!(!is_legal(Filed, Resolved));
        assert!(!is_legal(Closed, InProgress));
        assert!(!is_legal(Cancelled, Filed));
    }

    #[test]
    fn unauthorized_diagnostics_list_the_legal_roles() {
        let roles = allowed_roles(Resolved, Closed);
        assert_eq!(roles, vec![Role::Citizen, Role::System]);
    }

    #[test]
    fn every_non_terminal_status_has_at_least_one_successor() {
        for status in Status::ALL {
            if !status.is_terminal() {
                assert!(
                    !allowed_targets(status).is_empty(),
                    "{status} should have at least one legal successor"
                );
            }
        }
    }
}
