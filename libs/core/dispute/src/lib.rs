//! [libs/core/dispute/src/lib.rs]
//!
//! The Dispute Workflow (DW, §4.9): citizen rejection of a resolution, and
//! department-head review of that rejection. `review_dispute`'s approved
//! path is the only legal way back from RESOLVED to IN_PROGRESS (§4.1) —
//! it calls back into `ComplaintStateService::transition` as SYSTEM.

use chrono::Utc;
use grievance_core_audit::AuditRecorder;
use grievance_core_css::ComplaintStateService;
use grievance_domain_models::enums::{AuditAction, EntityType, NotificationType, Role, Status};
use grievance_domain_models::{CallerContext, CitizenSignoff, CoreError};
use grievance_domain_notification::{NotificationDispatcher, NotificationJob};
use grievance_domain_repository::{CitizenSignoffRepository, ComplaintRepository, RecipientDirectory};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct DisputeWorkflow {
    complaints: Arc<dyn ComplaintRepository>,
    signoffs: Arc<dyn CitizenSignoffRepository>,
    css: Arc<ComplaintStateService>,
    audit: Arc<AuditRecorder>,
    recipients: Arc<dyn RecipientDirectory>,
    notifications: NotificationDispatcher,
}

impl DisputeWorkflow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        complaints: Arc<dyn ComplaintRepository>,
        signoffs: Arc<dyn CitizenSignoffRepository>,
        css: Arc<ComplaintStateService>,
        audit: Arc<AuditRecorder>,
        recipients: Arc<dyn RecipientDirectory>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            complaints,
            signoffs,
            css,
            audit,
            recipients,
            notifications,
        }
    }

    /// §4.9: preconditions are RESOLVED status, citizen ownership, and no
    /// existing pending dispute (I-S3). The complaint's status is left
    /// untouched — filing a dispute does not itself reopen the complaint.
    #[instrument(skip(self, citizen, reason, evidence), fields(complaint_id))]
    pub async fn file_dispute(
        &self,
        complaint_id: i64,
        citizen: &CallerContext,
        reason: String,
        evidence: Option<String>,
    ) -> Result<CitizenSignoff, CoreError> {
        let complaint = self
            .complaints
            .find_by_id(complaint_id)
            .await
            .map_err(CoreError::from)?
            .ok_or(CoreError::NotFound {
                entity: "complaint",
                id: complaint_id,
            })?;

        if complaint.status != Status::Resolved {
            return Err(CoreError::InvalidDisputeState {
                reason: format!("complaint {complaint_id} is not RESOLVED"),
            });
        }

        if citizen.role != Role::Citizen || citizen.user_id != Some(complaint.citizen_id) {
            return Err(CoreError::OwnershipViolation { complaint_id });
        }

        if self
            .signoffs
            .find_pending_dispute(complaint_id)
            .await
            .map_err(CoreError::from)?
            .is_some()
        {
            return Err(CoreError::DuplicateDispute { complaint_id });
        }

        let now = Utc::now();
        let signoff = CitizenSignoff {
            id: 0,
            complaint_id,
            citizen_id: complaint.citizen_id,
            is_accepted: false,
            rating: None,
            feedback: None,
            dispute_reason: Some(reason.clone()),
            dispute_image_reference: evidence,
            signed_off_at: now,
            dispute_approved: None,
            dispute_approved_by: None,
            dispute_reviewed_at: None,
            dispute_rejection_reason: None,
        };

        let id = self.signoffs.insert(&signoff).await.map_err(|err| match err {
            grievance_domain_repository::RepoError::Conflict(_) => {
                CoreError::DuplicateDispute { complaint_id }
            }
            other => CoreError::from(other),
        })?;

        self.audit
            .record(
                EntityType::Complaint,
                complaint_id,
                AuditAction::Dispute,
                None,
                Some(reason),
                citizen,
                None,
            )
            .await?;

        if let Some(staff_id) = complaint.staff_id {
            self.notifications.dispatch(NotificationJob {
                user_id: staff_id,
                notification_type: NotificationType::ResolutionDisputed,
                title: "Resolution disputed".to_string(),
                message: format!("The citizen has disputed the resolution of complaint {complaint_id}"),
                complaint_id: Some(complaint_id),
                link: None,
            });
        }

        // Best-effort, mirrors ES's recipient resolution (§4.4): failure to
        // resolve a department head never unwinds the filed dispute.
        if let Some(department_id) = complaint.department_id {
            match self.recipients.dept_head_for_department(department_id).await {
                Ok(Some(dept_head_user_id)) => self.notifications.dispatch(NotificationJob {
                    user_id: dept_head_user_id,
                    notification_type: NotificationType::DisputeReceived,
                    title: "A dispute needs review".to_string(),
                    message: format!("Complaint {complaint_id} has a pending dispute"),
                    complaint_id: Some(complaint_id),
                    link: None,
                }),
                Ok(None) => warn!(complaint_id, department_id, "no department head to notify of dispute"),
                Err(err) => warn!(complaint_id, department_id, %err, "failed to resolve department head for dispute notice"),
            }
        }

        info!(complaint_id, "dispute filed");

        Ok(CitizenSignoff { id, ..signoff })
    }

    /// §4.9: preconditions are that `dept_head` is the DEPT_HEAD of the
    /// complaint's department and the signoff is still pending. On
    /// approval, reopens the complaint via `CSS.transition` as SYSTEM —
    /// the only legal RESOLVED -> IN_PROGRESS path.
    #[instrument(skip(self, dept_head, rejection_reason), fields(signoff_id))]
    pub async fn review_dispute(
        &self,
        signoff_id: i64,
        dept_head: &CallerContext,
        approved: bool,
        rejection_reason: Option<String>,
    ) -> Result<CitizenSignoff, CoreError> {
        let signoff = self
            .signoffs
            .find_by_id(signoff_id)
            .await
            .map_err(CoreError::from)?
            .ok_or(CoreError::NotFound {
                entity: "citizen_signoff",
                id: signoff_id,
            })?;

        if !signoff.is_pending_dispute() {
            return Err(CoreError::InvalidDisputeState {
                reason: format!("signoff {signoff_id} is not a pending dispute"),
            });
        }

        let complaint = self
            .complaints
            .find_by_id(signoff.complaint_id)
            .await
            .map_err(CoreError::from)?
            .ok_or(CoreError::NotFound {
                entity: "complaint",
                id: signoff.complaint_id,
            })?;

        if dept_head.role != Role::DeptHead || dept_head.department_id != complaint.department_id {
            return Err(CoreError::DepartmentMismatch {
                caller_department: dept_head.department_id,
                complaint_department: complaint.department_id,
            });
        }

        let approved_by = dept_head
            .user_id
            .ok_or(CoreError::OwnershipViolation {
                complaint_id: signoff.complaint_id,
            })?;
        let now = Utc::now();

        let reviewed = self
            .signoffs
            .review_dispute(signoff_id, approved, approved_by, rejection_reason.clone(), now)
            .await
            .map_err(CoreError::from)?;

        if approved {
            self.css
                .transition(
                    signoff.complaint_id,
                    Status::InProgress,
                    &CallerContext::system(),
                    Some("dispute approved".to_string()),
                )
                .await?;

            self.notifications.dispatch(NotificationJob {
                user_id: complaint.citizen_id,
                notification_type: NotificationType::DisputeApproved,
                title: "Your dispute was approved".to_string(),
                message: format!("Complaint {} has been reopened", signoff.complaint_id),
                complaint_id: Some(signoff.complaint_id),
                link: None,
            });
            if let Some(staff_id) = complaint.staff_id {
                self.notifications.dispatch(NotificationJob {
                    user_id: staff_id,
                    notification_type: NotificationType::ComplaintReopened,
                    title: "Complaint reopened".to_string(),
                    message: format!("Complaint {} was reopened after a dispute", signoff.complaint_id),
                    complaint_id: Some(signoff.complaint_id),
                    link: None,
                });
            }
        } else {
            self.notifications.dispatch(NotificationJob {
                user_id: complaint.citizen_id,
                notification_type: NotificationType::DisputeRejected,
                title: "Your dispute was rejected".to_string(),
                message: rejection_reason
                    .clone()
                    .unwrap_or_else(|| format!("Complaint {} dispute was rejected", signoff.complaint_id)),
                complaint_id: Some(signoff.complaint_id),
                link: None,
            });
        }

        info!(signoff_id, approved, "dispute reviewed");

        Ok(reviewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use grievance_domain_models::{AuditLog, Complaint};
    use grievance_domain_repository::{
        AuditLogRepository, NewAuditEntry, NewEscalationEvent, RepoError, RoutingDecision, StatusCount,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeComplaints {
        store: Mutex<Option<Complaint>>,
    }

    fn resolved_complaint() -> Complaint {
        let now = Utc::now();
        let mut complaint = Complaint::new_filed(1, "t".into(), "d".into(), "l".into(), 10, 0.9, now);
        complaint.status = Status::Resolved;
        complaint.department_id = Some(5);
        complaint.staff_id = Some(20);
        complaint
    }

    #[async_trait]
    impl ComplaintRepository for FakeComplaints {
        async fn find_by_id(&self, id: i64) -> Result<Option<Complaint>, RepoError> {
            Ok(self.store.lock().unwrap().clone().filter(|c| c.id == id))
        }
        async fn insert(&self, complaint: &Complaint) -> Result<i64, RepoError> {
            *self.store.lock().unwrap() = Some(complaint.clone());
            Ok(complaint.id)
        }
        async fn find_active(&self) -> Result<Vec<Complaint>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_citizen(&self, _citizen_id: i64) -> Result<Vec<Complaint>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_staff(&self, _staff_id: i64) -> Result<Vec<Complaint>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_department(&self, _department_id: i64) -> Result<Vec<Complaint>, RepoError> {
            Ok(vec![])
        }
        async fn find_unassigned_active_by_department(
            &self,
            _department_id: i64,
        ) -> Result<Vec<Complaint>, RepoError> {
            Ok(vec![])
        }
        async fn find_escalated(&self) -> Result<Vec<Complaint>, RepoError> {
            Ok(vec![])
        }
        async fn count_by_status(&self, _department_id: Option<i64>) -> Result<Vec<StatusCount>, RepoError> {
            Ok(vec![])
        }
        async fn apply_routing(
            &self,
            _complaint_id: i64,
            _decision: RoutingDecision,
            _now: DateTime<Utc>,
            _transition_audit: Option<NewAuditEntry>,
        ) -> Result<Complaint, RepoError> {
            unimplemented!()
        }
        async fn assign_department(
            &self,
            _complaint_id: i64,
            _department_id: i64,
            _now: DateTime<Utc>,
        ) -> Result<Complaint, RepoError> {
            unimplemented!()
        }
        async fn apply_state_transition(
            &self,
            complaint_id: i64,
            from: Status,
            to: Status,
            _now: DateTime<Utc>,
            _audit: NewAuditEntry,
        ) -> Result<Complaint, RepoError> {
            let mut guard = self.store.lock().unwrap();
            let complaint = guard.as_mut().unwrap();
            assert_eq!(complaint.id, complaint_id);
            assert_eq!(complaint.status, from);
            complaint.status = to;
            Ok(complaint.clone())
        }
        async fn raise_escalation_level(
            &self,
            _complaint_id: i64,
            _new_level: u8,
            _now: DateTime<Utc>,
            _audit: NewAuditEntry,
        ) -> Result<Option<Complaint>, RepoError> {
            unimplemented!()
        }
        async fn assign_staff(
            &self,
            _complaint_id: i64,
            _staff_id: i64,
            _now: DateTime<Utc>,
            _audit: NewAuditEntry,
        ) -> Result<Complaint, RepoError> {
            unimplemented!()
        }
        async fn record_citizen_satisfaction(&self, _complaint_id: i64, _rating: u8) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSignoffs {
        rows: Mutex<Vec<CitizenSignoff>>,
        next_id: Mutex<i64>,
    }

    #[async_trait]
    impl CitizenSignoffRepository for FakeSignoffs {
        async fn find_by_id(&self, id: i64) -> Result<Option<CitizenSignoff>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
        }
        async fn find_by_complaint(&self, complaint_id: i64) -> Result<Vec<CitizenSignoff>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.complaint_id == complaint_id)
                .cloned()
                .collect())
        }
        async fn insert(&self, signoff: &CitizenSignoff) -> Result<i64, RepoError> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let id = *next_id;
            let mut row = signoff.clone();
            row.id = id;
            self.rows.lock().unwrap().push(row);
            Ok(id)
        }
        async fn exists_accepted_for(&self, complaint_id: i64) -> Result<bool, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .any(|s| s.complaint_id == complaint_id && s.is_accepted))
        }
        async fn find_pending_dispute(&self, complaint_id: i64) -> Result<Option<CitizenSignoff>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.complaint_id == complaint_id && s.is_pending_dispute())
                .cloned())
        }
        async fn find_pending_disputes_by_department(
            &self,
            _department_id: i64,
        ) -> Result<Vec<CitizenSignoff>, RepoError> {
            Ok(vec![])
        }
        async fn review_dispute(
            &self,
            signoff_id: i64,
            approved: bool,
            approved_by: i64,
            rejection_reason: Option<String>,
            reviewed_at: DateTime<Utc>,
        ) -> Result<CitizenSignoff, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|s| s.id == signoff_id)
                .ok_or_else(|| RepoError::NotFound(format!("signoff {signoff_id}")))?;
            if row.dispute_approved.is_some() {
                return Err(RepoError::Conflict(format!("signoff {signoff_id} already reviewed")));
            }
            row.dispute_approved = Some(approved);
            row.dispute_approved_by = Some(approved_by);
            row.dispute_reviewed_at = Some(reviewed_at);
            row.dispute_rejection_reason = rejection_reason;
            Ok(row.clone())
        }
    }

    #[derive(Default)]
    struct NoopAuditLog;
    #[async_trait]
    impl AuditLogRepository for NoopAuditLog {
        async fn insert(&self, entry: NewAuditEntry) -> Result<AuditLog, RepoError> {
            Ok(AuditLog {
                id: 1,
                entity_type: entry.entity_type,
                entity_id: entry.entity_id,
                action: entry.action,
                old_value: entry.old_value,
                new_value: entry.new_value,
                actor_type: entry.actor_type,
                actor_id: entry.actor_id,
                reason: entry.reason,
                created_at: Utc::now(),
            })
        }
        async fn find_by_entity(&self, _entity_type: EntityType, _entity_id: i64) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_action(&self, _action: AuditAction) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_actor(&self, _actor_id: i64) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_action_in_window(
            &self,
            _action: AuditAction,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
    }

    struct NullNotifications;
    #[async_trait]
    impl grievance_domain_repository::NotificationRepository for NullNotifications {
        async fn insert(
            &self,
            notification: grievance_domain_repository::NewNotification,
        ) -> Result<grievance_domain_models::Notification, RepoError> {
            Ok(grievance_domain_models::Notification {
                id: 1,
                user_id: notification.user_id,
                notification_type: notification.notification_type,
                title: notification.title,
                message: notification.message,
                complaint_id: notification.complaint_id,
                link: notification.link,
                is_read: false,
                read_at: None,
                created_at: Utc::now(),
            })
        }
        async fn find_by_user(&self, _user_id: i64) -> Result<Vec<grievance_domain_models::Notification>, RepoError> {
            Ok(vec![])
        }
        async fn find_unread_by_user(
            &self,
            _user_id: i64,
        ) -> Result<Vec<grievance_domain_models::Notification>, RepoError> {
            Ok(vec![])
        }
        async fn unread_count(&self, _user_id: i64) -> Result<i64, RepoError> {
            Ok(0)
        }
        async fn find_by_user_and_complaint(
            &self,
            _user_id: i64,
            _complaint_id: i64,
        ) -> Result<Vec<grievance_domain_models::Notification>, RepoError> {
            Ok(vec![])
        }
        async fn mark_read(&self, _id: i64, _user_id: i64) -> Result<(), RepoError> {
            Ok(())
        }
        async fn mark_all_read(&self, _user_id: i64) -> Result<i64, RepoError> {
            Ok(0)
        }
        async fn mark_read_for_complaint(&self, _user_id: i64, _complaint_id: i64) -> Result<i64, RepoError> {
            Ok(0)
        }
    }

    struct NoopCategories;
    #[async_trait]
    impl grievance_domain_repository::CategoryRepository for NoopCategories {
        async fn find_by_id(&self, _id: i64) -> Result<Option<grievance_domain_models::Category>, RepoError> {
            Ok(None)
        }
        async fn find_all(&self) -> Result<Vec<grievance_domain_models::Category>, RepoError> {
            Ok(vec![])
        }
        async fn insert(&self, _category: &grievance_domain_models::Category) -> Result<i64, RepoError> {
            Ok(1)
        }
        async fn update(&self, _category: &grievance_domain_models::Category) -> Result<(), RepoError> {
            Ok(())
        }
    }

    struct NoopSlaRules;
    #[async_trait]
    impl grievance_domain_repository::SlaRuleRepository for NoopSlaRules {
        async fn find_by_category(
            &self,
            _category_id: i64,
        ) -> Result<Option<grievance_domain_models::SlaRule>, RepoError> {
            Ok(None)
        }
        async fn find_all(&self) -> Result<Vec<grievance_domain_models::SlaRule>, RepoError> {
            Ok(vec![])
        }
        async fn insert(&self, _rule: &grievance_domain_models::SlaRule) -> Result<i64, RepoError> {
            Ok(1)
        }
    }

    struct NoopResolutionProofs;
    #[async_trait]
    impl grievance_domain_repository::ResolutionProofRepository for NoopResolutionProofs {
        async fn exists_for(&self, _complaint_id: i64) -> Result<bool, RepoError> {
            Ok(true)
        }
        async fn find_by_complaint(
            &self,
            _complaint_id: i64,
        ) -> Result<Vec<grievance_domain_models::ResolutionProof>, RepoError> {
            Ok(vec![])
        }
        async fn insert(&self, _proof: &grievance_domain_models::ResolutionProof) -> Result<i64, RepoError> {
            Ok(1)
        }
    }

    struct NoopEscalationEvents;
    #[async_trait]
    impl grievance_domain_repository::EscalationEventRepository for NoopEscalationEvents {
        async fn exists_for(
            &self,
            _complaint_id: i64,
            _level: grievance_domain_models::enums::EscalationLevel,
        ) -> Result<bool, RepoError> {
            Ok(false)
        }
        async fn insert_if_absent(
            &self,
            _event: NewEscalationEvent,
        ) -> Result<Option<grievance_domain_models::EscalationEvent>, RepoError> {
            Ok(None)
        }
        async fn history_by_complaint(
            &self,
            _complaint_id: i64,
        ) -> Result<Vec<grievance_domain_models::EscalationEvent>, RepoError> {
            Ok(vec![])
        }
    }

    struct FakeRecipients;

    #[async_trait]
    impl RecipientDirectory for FakeRecipients {
        async fn dept_head_for_department(&self, _department_id: i64) -> Result<Option<i64>, RepoError> {
            Ok(Some(99))
        }
        async fn commissioner(&self) -> Result<Option<i64>, RepoError> {
            Ok(Some(1))
        }
    }

    fn workflow_with(
        complaints: Arc<FakeComplaints>,
        signoffs: Arc<FakeSignoffs>,
    ) -> DisputeWorkflow {
        let audit = Arc::new(AuditRecorder::new(Arc::new(NoopAuditLog)));
        let notification_repo: Arc<dyn grievance_domain_repository::NotificationRepository> =
            Arc::new(NullNotifications);
        let dispatcher = NotificationDispatcher::spawn(notification_repo, 8);
        let css = Arc::new(ComplaintStateService::new(
            complaints.clone(),
            Arc::new(NoopCategories),
            Arc::new(NoopSlaRules),
            Arc::new(NoopResolutionProofs),
            signoffs.clone(),
            Arc::new(NoopEscalationEvents),
            audit.clone(),
            dispatcher.clone(),
        ));
        DisputeWorkflow::new(complaints, signoffs, css, audit, Arc::new(FakeRecipients), dispatcher)
    }

    #[tokio::test]
    async fn filing_a_dispute_on_non_resolved_complaint_fails() {
        let complaints = Arc::new(FakeComplaints::default());
        let mut complaint = resolved_complaint();
        complaint.status = Status::InProgress;
        *complaints.store.lock().unwrap() = Some(complaint);
        let signoffs = Arc::new(FakeSignoffs::default());
        let workflow = workflow_with(complaints, signoffs);

        let err = workflow
            .file_dispute(1, &CallerContext::citizen(10), "broken again".into(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidDisputeState { .. }));
    }

    #[tokio::test]
    async fn non_owner_cannot_file_dispute() {
        let complaints = Arc::new(FakeComplaints::default());
        *complaints.store.lock().unwrap() = Some(resolved_complaint());
        let signoffs = Arc::new(FakeSignoffs::default());
        let workflow = workflow_with(complaints, signoffs);

        let err = workflow
            .file_dispute(1, &CallerContext::citizen(999), "broken again".into(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::OwnershipViolation { .. }));
    }

    #[tokio::test]
    async fn filing_a_second_dispute_while_one_is_pending_fails() {
        let complaints = Arc::new(FakeComplaints::default());
        *complaints.store.lock().unwrap() = Some(resolved_complaint());
        let signoffs = Arc::new(FakeSignoffs::default());
        let workflow = workflow_with(complaints, signoffs);

        workflow
            .file_dispute(1, &CallerContext::citizen(10), "first".into(), None)
            .await
            .unwrap();

        let err = workflow
            .file_dispute(1, &CallerContext::citizen(10), "second".into(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::DuplicateDispute { .. }));
    }

    #[tokio::test]
    async fn approved_dispute_reopens_complaint() {
        let complaints = Arc::new(FakeComplaints::default());
        *complaints.store.lock().unwrap() = Some(resolved_complaint());
        let signoffs = Arc::new(FakeSignoffs::default());
        let workflow = workflow_with(complaints.clone(), signoffs);

        let signoff = workflow
            .file_dispute(1, &CallerContext::citizen(10), "not fixed".into(), None)
            .await
            .unwrap();

        let reviewed = workflow
            .review_dispute(signoff.id, &CallerContext::dept_head(1, 5), true, None)
            .await
            .unwrap();

        assert_eq!(reviewed.dispute_approved, Some(true));
        assert_eq!(complaints.store.lock().unwrap().as_ref().unwrap().status, Status::InProgress);
    }

    #[tokio::test]
    async fn rejected_dispute_leaves_complaint_resolved() {
        let complaints = Arc::new(FakeComplaints::default());
        *complaints.store.lock().unwrap() = Some(resolved_complaint());
        let signoffs = Arc::new(FakeSignoffs::default());
        let workflow = workflow_with(complaints.clone(), signoffs);

        let signoff = workflow
            .file_dispute(1, &CallerContext::citizen(10), "not fixed".into(), None)
            .await
            .unwrap();

        let reviewed = workflow
            .review_dispute(signoff.id, &CallerContext::dept_head(1, 5), false, Some("already repaired".into()))
            .await
            .unwrap();

        assert_eq!(reviewed.dispute_approved, Some(false));
        assert_eq!(complaints.store.lock().unwrap().as_ref().unwrap().status, Status::Resolved);
    }

    #[tokio::test]
    async fn wrong_department_head_cannot_review() {
        let complaints = Arc::new(FakeComplaints::default());
        *complaints.store.lock().unwrap() = Some(resolved_complaint());
        let signoffs = Arc::new(FakeSignoffs::default());
        let workflow = workflow_with(complaints, signoffs);

        let signoff = workflow
            .file_dispute(1, &CallerContext::citizen(10), "not fixed".into(), None)
            .await
            .unwrap();

        let err = workflow
            .review_dispute(signoff.id, &CallerContext::dept_head(1, 999), true, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::DepartmentMismatch { .. }));
    }
}
