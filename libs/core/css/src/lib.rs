//! [libs/core/css/src/lib.rs]
//!
//! The Complaint State Service (CSS, §4.8): the primary public API surface
//! for state changes, plus the intake routing side-effect and the other
//! operations §6 lists as exposed by the core (resolution proof and
//! signoff submission, overdue/audit/escalation-history queries).

use chrono::Utc;
use grievance_core_audit::AuditRecorder;
use grievance_domain_fsm as fsm;
use grievance_domain_guard as guard;
use grievance_domain_models::enums::{NotificationType, Role, Status};
use grievance_domain_models::{
    AuditLog, CallerContext, Category, Complaint, CoreError, EscalationEvent, ResolutionProof,
    SlaRule,
};
use grievance_domain_notification::{NotificationDispatcher, NotificationJob};
use grievance_domain_repository::{
    CategoryRepository, CitizenSignoffRepository, ComplaintRepository, EscalationEventRepository,
    ResolutionProofRepository, RoutingDecision, SlaRuleRepository,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The result of a `transition` call: the complaint as it stands after the
/// write, and whether anything actually changed (step 2's no-op case).
#[derive(Debug, Clone)]
pub struct TransitionResult {
    pub complaint: Complaint,
    pub changed: bool,
}

/// Annotated entry for `get_overdue_complaints` (§6): an active,
/// past-deadline complaint together with what the escalation evaluator
/// would do with it right now.
#[derive(Debug, Clone)]
pub struct OverdueComplaint {
    pub complaint: Complaint,
    pub current_level: grievance_domain_models::enums::EscalationLevel,
    pub required_level: grievance_domain_models::enums::EscalationLevel,
    pub days_overdue: i64,
}

/// Routing confidence threshold below which a complaint is parked in
/// FILED pending manual department assignment (§4.8, §6 config
/// `routing.confidence_threshold`, default 0.7).
const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

pub struct ComplaintStateService {
    complaints: Arc<dyn ComplaintRepository>,
    categories: Arc<dyn CategoryRepository>,
    sla_rules: Arc<dyn SlaRuleRepository>,
    resolution_proofs: Arc<dyn ResolutionProofRepository>,
    signoffs: Arc<dyn CitizenSignoffRepository>,
    escalation_events: Arc<dyn EscalationEventRepository>,
    audit: Arc<AuditRecorder>,
    notifications: NotificationDispatcher,
    confidence_threshold: f64,
    escalation_thresholds: grievance_domain_escalation::EscalationThresholds,
}

impl ComplaintStateService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        complaints: Arc<dyn ComplaintRepository>,
        categories: Arc<dyn CategoryRepository>,
        sla_rules: Arc<dyn SlaRuleRepository>,
        resolution_proofs: Arc<dyn ResolutionProofRepository>,
        signoffs: Arc<dyn CitizenSignoffRepository>,
        escalation_events: Arc<dyn EscalationEventRepository>,
        audit: Arc<AuditRecorder>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            complaints,
            categories,
            sla_rules,
            resolution_proofs,
            signoffs,
            escalation_events,
            audit,
            notifications,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            escalation_thresholds: grievance_domain_escalation::EscalationThresholds::default(),
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    async fn load(&self, complaint_id: i64) -> Result<Complaint, CoreError> {
        self.complaints
            .find_by_id(complaint_id)
            .await
            .map_err(CoreError::from)?
            .ok_or(CoreError::NotFound {
                entity: "complaint",
                id: complaint_id,
            })
    }

    /// §6: intersects `SM.allowed_targets` with RBAC for `caller.role`.
    pub async fn get_allowed_transitions(
        &self,
        complaint_id: i64,
        caller: &CallerContext,
    ) -> Result<Vec<Status>, CoreError> {
        let complaint = self.load(complaint_id).await?;
        Ok(fsm::allowed_targets(complaint.status)
            .into_iter()
            .filter(|&to| fsm::role_allowed(complaint.status, to, caller.role))
            .collect())
    }

    /// §4.8: the primary public operation. A single business transaction
    /// (delegated to `ComplaintRepository::apply_state_transition`)
    /// followed by best-effort, post-commit notification dispatch.
    #[instrument(skip(self, caller, reason), fields(complaint_id))]
    pub async fn transition(
        &self,
        complaint_id: i64,
        target: Status,
        caller: &CallerContext,
        reason: Option<String>,
    ) -> Result<TransitionResult, CoreError> {
        let complaint = self.load(complaint_id).await?;
        let from = complaint.status;

        if from == target {
            return Ok(TransitionResult {
                complaint,
                changed: false,
            });
        }

        if !fsm::is_legal(from, target) {
            return Err(CoreError::InvalidTransition {
                from,
                to: target,
                legal_targets: fsm::allowed_targets(from),
            });
        }

        if !fsm::role_allowed(from, target, caller.role) {
            return Err(CoreError::Unauthorized {
                role: caller.role,
                allowed_roles: fsm::allowed_roles(from, target),
            });
        }

        if matches!(target, Status::Cancelled | Status::Closed) {
            guard::require_ownership(caller, &complaint)?;
        }
        if matches!(target, Status::Resolved) {
            guard::require_department_match(caller, &complaint)?;
        }

        match (from, target) {
            (Status::InProgress, Status::Resolved) => {
                guard::require_resolution_proof(self.resolution_proofs.as_ref(), complaint_id).await?;
            }
            (Status::Resolved, Status::Closed) => {
                guard::require_accepted_signoff(self.signoffs.as_ref(), caller, complaint_id).await?;
            }
            (Status::Resolved, Status::InProgress) => {
                guard::require_approved_dispute(self.signoffs.as_ref(), complaint_id).await?;
            }
            _ => {}
        }

        let audit = self
            .audit
            .record_state_change(complaint_id, from, target, caller, reason);
        let now = Utc::now();
        let updated = self
            .complaints
            .apply_state_transition(complaint_id, from, target, now, audit)
            .await
            .map_err(CoreError::from)?;

        self.dispatch_transition_notifications(&updated, target);

        info!(complaint_id, from = %from, to = %target, "complaint transitioned");

        Ok(TransitionResult {
            complaint: updated,
            changed: true,
        })
    }

    /// §4.8 step 12: best-effort, outside the business transaction.
    fn dispatch_transition_notifications(&self, complaint: &Complaint, target: Status) {
        self.notifications.dispatch(NotificationJob {
            user_id: complaint.citizen_id,
            notification_type: NotificationType::ComplaintStatusChanged,
            title: "Your complaint's status changed".to_string(),
            message: format!("Complaint {} is now {}", complaint.id, target),
            complaint_id: Some(complaint.id),
            link: None,
        });

        match target {
            Status::Resolved => {
                self.notifications.dispatch(NotificationJob {
                    user_id: complaint.citizen_id,
                    notification_type: NotificationType::ComplaintResolved,
                    title: "Your complaint has been resolved".to_string(),
                    message: format!("Complaint {} has been marked resolved", complaint.id),
                    complaint_id: Some(complaint.id),
                    link: None,
                });
                self.notifications.dispatch(NotificationJob {
                    user_id: complaint.citizen_id,
                    notification_type: NotificationType::RatingRequest,
                    title: "Rate your resolution".to_string(),
                    message: format!("Let us know how complaint {} was handled", complaint.id),
                    complaint_id: Some(complaint.id),
                    link: None,
                });
            }
            Status::Closed => {
                self.notifications.dispatch(NotificationJob {
                    user_id: complaint.citizen_id,
                    notification_type: NotificationType::ComplaintClosed,
                    title: "Your complaint is closed".to_string(),
                    message: format!("Complaint {} has been closed", complaint.id),
                    complaint_id: Some(complaint.id),
                    link: None,
                });
            }
            _ => {}
        }
    }

    /// §4.8 intake side-effect. Resolves the SLA rule for `category_id` and
    /// applies routing; below `confidence_threshold`, leaves the complaint
    /// FILED with `needs_manual_routing = true` and no department, rather
    /// than guessing one.
    #[instrument(skip(self, caller), fields(complaint_id))]
    pub async fn route_new_complaint(
        &self,
        complaint_id: i64,
        category_id: i64,
        ai_confidence: f64,
        caller: &CallerContext,
    ) -> Result<Complaint, CoreError> {
        let rule = self
            .sla_rules
            .find_by_category(category_id)
            .await
            .map_err(CoreError::from)?
            .ok_or(CoreError::NotFound {
                entity: "sla_rule",
                id: category_id,
            })?;

        let now = Utc::now();
        let confident = ai_confidence >= self.confidence_threshold;

        let decision = RoutingDecision {
            category_id,
            department_id: if confident { Some(rule.department_id) } else { None },
            priority: rule.base_priority,
            sla_deadline: if confident {
                Some(now + chrono::Duration::days(rule.sla_days as i64))
            } else {
                None
            },
            needs_manual_routing: !confident,
        };

        let transition_audit = confident.then(|| {
            self.audit
                .record_state_change(complaint_id, Status::Filed, Status::InProgress, caller, None)
        });

        let complaint = self
            .complaints
            .apply_routing(complaint_id, decision, now, transition_audit)
            .await
            .map_err(CoreError::from)?;

        if !confident {
            warn!(complaint_id, ai_confidence, "routing confidence below threshold, manual routing required");
        }

        Ok(complaint)
    }

    /// An admin assigning a department to a complaint flagged
    /// `needs_manual_routing` (§4.8). Does not itself perform the
    /// FILED -> IN_PROGRESS transition; a subsequent SYSTEM `transition`
    /// call does that once the complaint is ready.
    pub async fn assign_department(
        &self,
        complaint_id: i64,
        department_id: i64,
    ) -> Result<Complaint, CoreError> {
        let now = Utc::now();
        self.complaints
            .assign_department(complaint_id, department_id, now)
            .await
            .map_err(CoreError::from)
    }

    /// Assign (or reassign) the staff handling a complaint (§4.3, §4.8).
    pub async fn assign_staff(
        &self,
        complaint_id: i64,
        staff_id: i64,
        caller: &CallerContext,
        reason: Option<String>,
    ) -> Result<Complaint, CoreError> {
        let complaint = self.load(complaint_id).await?;
        let audit = self
            .audit
            .record_assignment(complaint_id, complaint.staff_id, staff_id, caller, reason);
        let now = Utc::now();
        let updated = self
            .complaints
            .assign_staff(complaint_id, staff_id, now, audit)
            .await
            .map_err(CoreError::from)?;

        self.notifications.dispatch(NotificationJob {
            user_id: staff_id,
            notification_type: NotificationType::ComplaintAssigned,
            title: "A complaint has been assigned to you".to_string(),
            message: format!("Complaint {complaint_id} has been assigned to you"),
            complaint_id: Some(complaint_id),
            link: None,
        });

        Ok(updated)
    }

    /// §6: staff must belong to the complaint's department.
    pub async fn submit_resolution_proof(
        &self,
        complaint_id: i64,
        staff: &CallerContext,
        image_reference: String,
        latitude: f64,
        longitude: f64,
        remarks: Option<String>,
    ) -> Result<ResolutionProof, CoreError> {
        let complaint = self.load(complaint_id).await?;
        guard::require_department_match(staff, &complaint)?;

        let now = Utc::now();
        let proof = ResolutionProof {
            id: 0,
            complaint_id,
            staff_id: staff.user_id.ok_or(CoreError::OwnershipViolation { complaint_id })?,
            image_reference,
            latitude,
            longitude,
            captured_at: now,
            remarks,
            is_verified: false,
            created_at: now,
        };

        let id = self.resolution_proofs.insert(&proof).await.map_err(CoreError::from)?;

        self.audit
            .record(
                grievance_domain_models::enums::EntityType::Complaint,
                complaint_id,
                grievance_domain_models::enums::AuditAction::Create,
                None,
                Some(proof.image_reference.clone()),
                staff,
                None,
            )
            .await?;

        Ok(ResolutionProof { id, ..proof })
    }

    /// §6: validates ownership and records a citizen's *acceptance* of a
    /// resolution. This method only ever constructs an accepted signoff —
    /// it has no `is_accepted` parameter, so it cannot be used to create an
    /// unrouted, unenforced dispute row. Filing a dispute is a distinct
    /// operation, `DisputeWorkflow::file_dispute`, which enforces I-S3 (at
    /// most one pending dispute per complaint) and performs the
    /// `RESOLUTION_DISPUTED`/`DISPUTE_RECEIVED` notification fan-out this
    /// call does not; callers implementing §6's `submit_signoff` surface
    /// dispatch to one or the other based on the citizen's `is_accepted`
    /// input before reaching either method.
    pub async fn submit_signoff(
        &self,
        complaint_id: i64,
        citizen: &CallerContext,
        rating: Option<u8>,
        feedback: Option<String>,
    ) -> Result<grievance_domain_models::CitizenSignoff, CoreError> {
        let complaint = self.load(complaint_id).await?;
        guard::require_ownership(citizen, &complaint)?;

        if complaint.status != Status::Resolved {
            return Err(CoreError::InvalidDisputeState {
                reason: format!("complaint {complaint_id} is not RESOLVED"),
            });
        }

        let citizen_id = citizen.user_id.ok_or(CoreError::OwnershipViolation { complaint_id })?;
        let now = Utc::now();
        let signoff = grievance_domain_models::CitizenSignoff {
            id: 0,
            complaint_id,
            citizen_id,
            is_accepted: true,
            rating,
            feedback,
            dispute_reason: None,
            dispute_image_reference: None,
            signed_off_at: now,
            dispute_approved: None,
            dispute_approved_by: None,
            dispute_reviewed_at: None,
            dispute_rejection_reason: None,
        };

        let id = self.signoffs.insert(&signoff).await.map_err(CoreError::from)?;

        if let Some(rating) = rating {
            self.complaints
                .record_citizen_satisfaction(complaint_id, rating)
                .await
                .map_err(CoreError::from)?;
        }

        Ok(grievance_domain_models::CitizenSignoff { id, ..signoff })
    }

    /// §6: active complaints whose `sla_deadline` has passed, each
    /// annotated with what the escalation evaluator would currently do.
    pub async fn get_overdue_complaints(&self) -> Result<Vec<OverdueComplaint>, CoreError> {
        let active = self.complaints.find_active().await.map_err(CoreError::from)?;
        let now = Utc::now();
        Ok(active
            .into_iter()
            .filter_map(|complaint| {
                match grievance_domain_escalation::evaluate(&complaint, now, self.escalation_thresholds) {
                    grievance_domain_escalation::EscalationResult::EscalationRequired {
                        current_level,
                        required_level,
                        days_overdue,
                        ..
                    } => Some(OverdueComplaint {
                        complaint,
                        current_level,
                        required_level,
                        days_overdue,
                    }),
                    grievance_domain_escalation::EscalationResult::NoEscalation { .. } => None,
                }
            })
            .collect())
    }

    /// §6, ordered ascending.
    pub async fn get_audit_for_complaint(&self, complaint_id: i64) -> Result<Vec<AuditLog>, CoreError> {
        self.audit
            .history_for(grievance_domain_models::enums::EntityType::Complaint, complaint_id)
            .await
    }

    /// §6, ordered ascending.
    pub async fn get_escalation_history(&self, complaint_id: i64) -> Result<Vec<EscalationEvent>, CoreError> {
        self.escalation_events
            .history_by_complaint(complaint_id)
            .await
            .map_err(CoreError::from)
    }

    pub async fn find_category(&self, category_id: i64) -> Result<Option<Category>, CoreError> {
        self.categories.find_by_id(category_id).await.map_err(CoreError::from)
    }

    pub async fn find_sla_rule(&self, category_id: i64) -> Result<Option<SlaRule>, CoreError> {
        self.sla_rules.find_by_category(category_id).await.map_err(CoreError::from)
    }
}

/// A newly filed complaint's caller is always SYSTEM for the intake
/// routing transition (§4.8) — a human never drives FILED -> IN_PROGRESS
/// directly.
pub fn system_caller() -> CallerContext {
    CallerContext::system()
}

/// Whether `role` may act on operational (staff/department-scoped)
/// transitions at all, used by an outer HTTP layer to decide what to show
/// before calling `get_allowed_transitions`.
pub fn is_operational_role(role: Role) -> bool {
    matches!(role, Role::Staff | Role::DeptHead)
}
