//! [libs/domain/escalation/src/lib.rs]
//!
//! The escalation evaluator (§4.5). Pure: given a complaint and a clock,
//! it says which escalation level is now required, with no repository
//! access and no side effects. `EscalationService` (in
//! `grievance-core-escalation`) is the only caller; it adds the
//! idempotency check, the persistence, and the notification fan-out that
//! this crate deliberately has no business containing.

use chrono::{DateTime, Utc};
use grievance_domain_models::complaint::Complaint;
use grievance_domain_models::enums::EscalationLevel;

/// The two day-thresholds that drive required-level computation (§4.5,
/// §6 configuration). Defaults match the spec; an implementer may tune
/// them to a different pair without touching the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationThresholds {
    pub l1_threshold_days: i64,
    pub l2_threshold_days: i64,
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            l1_threshold_days: 1,
            l2_threshold_days: 3,
        }
    }
}

/// Outcome of evaluating one complaint against the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum EscalationResult {
    /// No escalation is due. Carries the complaint's current level and a
    /// human-readable reason (not overdue, no SLA set, or already at/above
    /// the level the overdue window would otherwise require).
    NoEscalation {
        current_level: EscalationLevel,
        reason: String,
    },
    /// The complaint must be escalated from `current_level` to
    /// `required_level`.
    EscalationRequired {
        current_level: EscalationLevel,
        required_level: EscalationLevel,
        days_overdue: i64,
        sla_deadline: DateTime<Utc>,
        reason: String,
    },
}

impl EscalationResult {
    pub fn requires_escalation(&self) -> bool {
        matches!(self, EscalationResult::EscalationRequired { .. })
    }

    pub fn current_level(&self) -> EscalationLevel {
        match self {
            EscalationResult::NoEscalation { current_level, .. } => *current_level,
            EscalationResult::EscalationRequired { current_level, .. } => *current_level,
        }
    }
}

fn current_level(complaint: &Complaint) -> EscalationLevel {
    EscalationLevel::from_u8(complaint.escalation_level).unwrap_or(EscalationLevel::L0)
}

fn required_level(days_overdue: i64, thresholds: EscalationThresholds) -> EscalationLevel {
    if days_overdue > thresholds.l2_threshold_days {
        EscalationLevel::L2
    } else if days_overdue > thresholds.l1_threshold_days {
        EscalationLevel::L1
    } else {
        EscalationLevel::L0
    }
}

/// Evaluate one complaint against `today` using `thresholds`. See §4.5
/// for the numbered algorithm this mirrors step for step.
pub fn evaluate(
    complaint: &Complaint,
    today: DateTime<Utc>,
    thresholds: EscalationThresholds,
) -> EscalationResult {
    let current = current_level(complaint);

    let Some(sla_deadline) = complaint.sla_deadline else {
        return EscalationResult::NoEscalation {
            current_level: current,
            reason: "no SLA set".to_string(),
        };
    };

    let days_overdue = today.date_naive().signed_duration_since(sla_deadline.date_naive()).num_days();

    if days_overdue <= 0 {
        return EscalationResult::NoEscalation {
            current_level: current,
            reason: "within SLA".to_string(),
        };
    }

    let required = required_level(days_overdue, thresholds);

    if required > current {
        EscalationResult::EscalationRequired {
            current_level: current,
            required_level: required,
            days_overdue,
            sla_deadline,
            reason: format!(
                "complaint is {days_overdue} day(s) overdue (deadline {sla_deadline})"
            ),
        }
    } else {
        EscalationResult::NoEscalation {
            current_level: current,
            reason: "already at or above required level".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn complaint_with_deadline(deadline: Option<DateTime<Utc>>, escalation_level: u8) -> Complaint {
        let now = Utc::now();
        let mut complaint =
            Complaint::new_filed(1, "t".into(), "d".into(), "l".into(), 1, 0.9, now);
        complaint.sla_deadline = deadline;
        complaint.escalation_level = escalation_level;
        complaint
    }

    #[test]
    fn no_sla_set_never_escalates() {
        let complaint = complaint_with_deadline(None, 0);
        let result = evaluate(&complaint, Utc::now(), EscalationThresholds::default());
        assert!(!result.requires_escalation());
    }

    #[test]
    fn within_sla_does_not_escalate() {
        let today = Utc::now();
        let complaint = complaint_with_deadline(Some(today + Duration::days(3)), 0);
        let result = evaluate(&complaint, today, EscalationThresholds::default());
        assert!(!result.requires_escalation());
    }

    #[test]
    fn two_days_overdue_requires_l1() {
        let today = Utc::now();
        let complaint = complaint_with_deadline(Some(today - Duration::days(2)), 0);
        let result = evaluate(&complaint, today, EscalationThresholds::default());
        match result {
            EscalationResult::EscalationRequired {
                required_level,
                days_overdue,
                ..
            } => {
                assert_eq!(required_level, EscalationLevel::L1);
                assert_eq!(days_overdue, 2);
            }
            other => panic!("expected EscalationRequired, got {other:?}"),
        }
    }

    #[test]
    fn five_days_overdue_jumps_straight_to_l2() {
        let today = Utc::now();
        let complaint = complaint_with_deadline(Some(today - Duration::days(5)), 0);
        let result = evaluate(&complaint, today, EscalationThresholds::default());
        match result {
            EscalationResult::EscalationRequired { required_level, .. } => {
                assert_eq!(required_level, EscalationLevel::L2);
            }
            other => panic!("expected EscalationRequired, got {other:?}"),
        }
    }

    #[test]
    fn already_at_required_level_does_not_re_escalate() {
        let today = Utc::now();
        let complaint = complaint_with_deadline(Some(today - Duration::days(2)), 1);
        let result = evaluate(&complaint, today, EscalationThresholds::default());
        assert!(!result.requires_escalation());
    }

    #[test]
    fn zero_days_overdue_is_still_within_sla() {
        let today = Utc::now();
        let complaint = complaint_with_deadline(Some(today), 0);
        let result = evaluate(&complaint, today, EscalationThresholds::default());
        assert!(!result.requires_escalation());
    }
}
