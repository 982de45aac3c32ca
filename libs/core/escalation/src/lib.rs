//! [libs/core/escalation/src/lib.rs]
//!
//! The Escalation Service (ES, §4.6) and Escalation Scheduler (SCH, §4.7).
//! `EscalationService::process` is the single-complaint algorithm; the
//! scheduler is a thin periodic driver on top of `process_batch`, plus a
//! manual trigger for administrative use.

use chrono::{DateTime, Utc};
use grievance_core_audit::AuditRecorder;
use grievance_domain_escalation::{evaluate, EscalationResult, EscalationThresholds};
use grievance_domain_models::enums::{EscalationLevel, NotificationType};
use grievance_domain_models::{CallerContext, Complaint, CoreError, EscalationEvent};
use grievance_domain_notification::{escalation_recipient_role, NotificationDispatcher, NotificationJob};
use grievance_domain_repository::{
    ComplaintRepository, EscalationEventRepository, NewEscalationEvent, RecipientDirectory,
};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{interval, Duration};
use tracing::{error, info, instrument, warn};

/// Everything `EscalationService::process` needs, collected so the
/// scheduler and the manual trigger can share one constructor.
pub struct EscalationService {
    complaints: Arc<dyn ComplaintRepository>,
    escalation_events: Arc<dyn EscalationEventRepository>,
    recipients: Arc<dyn RecipientDirectory>,
    audit: Arc<AuditRecorder>,
    notifications: NotificationDispatcher,
    thresholds: EscalationThresholds,
}

impl EscalationService {
    pub fn new(
        complaints: Arc<dyn ComplaintRepository>,
        escalation_events: Arc<dyn EscalationEventRepository>,
        recipients: Arc<dyn RecipientDirectory>,
        audit: Arc<AuditRecorder>,
        notifications: NotificationDispatcher,
        thresholds: EscalationThresholds,
    ) -> Self {
        Self {
            complaints,
            escalation_events,
            recipients,
            audit,
            notifications,
            thresholds,
        }
    }

    /// §4.6 steps 1-8, for one complaint. Returns `Ok(None)` when no
    /// escalation was due, or when a concurrent run already recorded this
    /// level (I-E2/I-E3) — both are success, not failure.
    #[instrument(skip(self, complaint), fields(complaint_id = complaint.id))]
    pub async fn process(
        &self,
        complaint: &Complaint,
        today: DateTime<Utc>,
    ) -> Result<Option<EscalationEvent>, CoreError> {
        let result = evaluate(complaint, today, self.thresholds);

        let EscalationResult::EscalationRequired {
            current_level,
            required_level,
            days_overdue,
            sla_deadline,
            reason,
        } = result
        else {
            return Ok(None);
        };

        if self
            .escalation_events
            .exists_for(complaint.id, required_level)
            .await
            .map_err(CoreError::from)?
        {
            return Ok(None);
        }

        let Some(escalated_to_role) = required_level.responsible_role() else {
            // L0 never satisfies EscalationRequired (evaluate() only raises
            // the level, never lowers to L0), but guard the invariant anyway.
            return Ok(None);
        };

        let caller = CallerContext::system();
        let audit = self.audit.record_escalation(
            complaint.id,
            current_level.as_u8(),
            required_level.as_u8(),
            &caller,
            Some(reason.clone()),
        );

        let event = self
            .escalation_events
            .insert_if_absent(NewEscalationEvent {
                complaint_id: complaint.id,
                previous_level: current_level,
                escalation_level: required_level,
                escalated_at: today,
                escalated_to_role,
                reason: reason.clone(),
                days_overdue,
                sla_deadline_snapshot: sla_deadline,
                is_automated: true,
            })
            .await
            .map_err(CoreError::from)?;

        let Some(event) = event else {
            // Lost the unique-constraint race to a concurrent run (I-E2).
            return Ok(None);
        };

        let updated = self
            .complaints
            .raise_escalation_level(complaint.id, required_level.as_u8(), today, audit)
            .await
            .map_err(CoreError::from)?;

        if updated.is_none() {
            // Lost the monotonic-update race (I-C2) after already winning the
            // event-insert race. The event row stands; no further work to do.
            warn!(
                complaint_id = complaint.id,
                "escalation event recorded but level update lost a concurrent race"
            );
            return Ok(Some(event));
        }

        self.dispatch_notifications(complaint, required_level, days_overdue)
            .await;

        info!(
            complaint_id = complaint.id,
            from = %current_level,
            to = %required_level,
            days_overdue,
            "complaint escalated"
        );

        Ok(Some(event))
    }

    /// Best-effort, post-commit (§4.4, §4.6 step 8). Failure to resolve a
    /// recipient or to reach the dispatcher never unwinds the escalation
    /// itself — it is logged and dropped.
    async fn dispatch_notifications(
        &self,
        complaint: &Complaint,
        level: EscalationLevel,
        days_overdue: i64,
    ) {
        if let Some(role) = escalation_recipient_role(level) {
            let recipient = match role {
                grievance_domain_models::enums::Role::DeptHead => match complaint.department_id {
                    Some(department_id) => {
                        self.recipients.dept_head_for_department(department_id).await
                    }
                    None => Ok(None),
                },
                grievance_domain_models::enums::Role::Commissioner => {
                    self.recipients.commissioner().await
                }
                _ => Ok(None),
            };

            match recipient {
                Ok(Some(user_id)) => self.notifications.dispatch(NotificationJob {
                    user_id,
                    notification_type: NotificationType::EscalationAlert,
                    title: "Complaint escalated".to_string(),
                    message: format!(
                        "Complaint {} is now {} day(s) overdue and has escalated to {}",
                        complaint.id, days_overdue, level
                    ),
                    complaint_id: Some(complaint.id),
                    link: None,
                }),
                Ok(None) => warn!(
                    complaint_id = complaint.id,
                    %level,
                    "no recipient resolved for escalation notification"
                ),
                Err(err) => error!(
                    complaint_id = complaint.id,
                    %level,
                    error = %err,
                    "failed to resolve escalation recipient"
                ),
            }
        }

        self.notifications.dispatch(NotificationJob {
            user_id: complaint.citizen_id,
            notification_type: NotificationType::ComplaintStatusChanged,
            title: "Your complaint has escalated".to_string(),
            message: format!(
                "Complaint {} is {} day(s) overdue and has been escalated for attention",
                complaint.id, days_overdue
            ),
            complaint_id: Some(complaint.id),
            link: None,
        });
    }

    /// §4.6 batch driver: one failing complaint is logged and skipped, not
    /// allowed to abort the run. Returns the count of escalations actually
    /// performed.
    #[instrument(skip(self, complaints))]
    pub async fn process_batch(&self, complaints: &[Complaint], today: DateTime<Utc>) -> usize {
        let mut escalated = 0;
        for complaint in complaints {
            match self.process(complaint, today).await {
                Ok(Some(_)) => escalated += 1,
                Ok(None) => {}
                Err(err) => error!(
                    complaint_id = complaint.id,
                    error = %err,
                    "escalation run failed for complaint, continuing"
                ),
            }
        }
        escalated
    }

    /// Fetches the scheduler's working set (§4.7: active complaints with a
    /// deadline) and runs it through `process_batch`. Re-entrant and
    /// idempotent (I-E2) — safe to call concurrently with the periodic
    /// scheduler, which is exactly what the manual trigger does.
    #[instrument(skip(self))]
    pub async fn trigger_escalation_run(&self, today: DateTime<Utc>) -> Result<usize, CoreError> {
        let active = self.complaints.find_active().await.map_err(CoreError::from)?;
        Ok(self.process_batch(&active, today).await)
    }
}

/// §4.7: periodic driver on top of `EscalationService::trigger_escalation_run`,
/// default cadence every 6 hours. Supports cooperative shutdown via `stop`.
pub struct EscalationScheduler {
    service: Arc<EscalationService>,
    period: Duration,
    stop: Arc<Notify>,
}

impl EscalationScheduler {
    pub fn new(service: Arc<EscalationService>) -> Self {
        Self::with_period(service, Duration::from_secs(6 * 60 * 60))
    }

    pub fn with_period(service: Arc<EscalationService>, period: Duration) -> Self {
        Self {
            service,
            period,
            stop: Arc::new(Notify::new()),
        }
    }

    /// A clone of the handle this instance would use to stop itself, for a
    /// caller holding on to the scheduler elsewhere (e.g. a shutdown signal
    /// handler in the binary that spawned it).
    pub fn stop_handle(&self) -> Arc<Notify> {
        self.stop.clone()
    }

    /// Spawns the periodic loop on the current Tokio runtime. Each tick
    /// calls `trigger_escalation_run` with the real clock; a failed run is
    /// logged and the loop continues on the next tick.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        let EscalationScheduler { service, period, stop } = self;
        tokio::spawn(async move {
            let mut ticker = interval(period);
            info!(period_secs = period.as_secs(), "escalation scheduler started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match service.trigger_escalation_run(Utc::now()).await {
                            Ok(count) => info!(escalated = count, "scheduled escalation run complete"),
                            Err(err) => error!(error = %err, "scheduled escalation run failed"),
                        }
                    }
                    _ = stop.notified() => {
                        info!("escalation scheduler stopping");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use grievance_domain_models::enums::Status;
    use grievance_domain_models::AuditLog;
    use grievance_domain_repository::{AuditLogRepository, NewAuditEntry, RepoError, RoutingDecision, StatusCount};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeComplaints {
        raised: Mutex<Vec<(i64, u8)>>,
    }

    #[async_trait]
    impl ComplaintRepository for FakeComplaints {
        async fn find_by_id(&self, _id: i64) -> Result<Option<Complaint>, RepoError> {
            Ok(None)
        }
        async fn insert(&self, _complaint: &Complaint) -> Result<i64, RepoError> {
            Ok(1)
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
        async fn count_by_status(
            &self,
            _department_id: Option<i64>,
        ) -> Result<Vec<StatusCount>, RepoError> {
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
            _complaint_id: i64,
            _from: Status,
            _to: Status,
            _now: DateTime<Utc>,
            _audit: NewAuditEntry,
        ) -> Result<Complaint, RepoError> {
            unimplemented!()
        }
        async fn raise_escalation_level(
            &self,
            complaint_id: i64,
            new_level: u8,
            _now: DateTime<Utc>,
            _audit: NewAuditEntry,
        ) -> Result<Option<Complaint>, RepoError> {
            self.raised.lock().unwrap().push((complaint_id, new_level));
            Ok(Some(
                Complaint::new_filed(complaint_id, "t".into(), "d".into(), "l".into(), 1, 0.9, Utc::now()),
            ))
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
        async fn record_citizen_satisfaction(
            &self,
            _complaint_id: i64,
            _rating: u8,
        ) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeEscalationEvents {
        seen: Mutex<Vec<(i64, EscalationLevel)>>,
    }

    #[async_trait]
    impl EscalationEventRepository for FakeEscalationEvents {
        async fn exists_for(&self, complaint_id: i64, level: EscalationLevel) -> Result<bool, RepoError> {
            Ok(self.seen.lock().unwrap().contains(&(complaint_id, level)))
        }
        async fn insert_if_absent(
            &self,
            event: NewEscalationEvent,
        ) -> Result<Option<EscalationEvent>, RepoError> {
            let key = (event.complaint_id, event.escalation_level);
            let mut seen = self.seen.lock().unwrap();
            if seen.contains(&key) {
                return Ok(None);
            }
            seen.push(key);
            Ok(Some(EscalationEvent {
                id: 1,
                complaint_id: event.complaint_id,
                previous_level: event.previous_level,
                escalation_level: event.escalation_level,
                escalated_at: event.escalated_at,
                escalated_to_role: event.escalated_to_role,
                reason: event.reason,
                days_overdue: event.days_overdue,
                sla_deadline_snapshot: event.sla_deadline_snapshot,
                is_automated: event.is_automated,
            }))
        }
        async fn history_by_complaint(&self, _complaint_id: i64) -> Result<Vec<EscalationEvent>, RepoError> {
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
        async fn find_by_entity(
            &self,
            _entity_type: grievance_domain_models::enums::EntityType,
            _entity_id: i64,
        ) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_action(
            &self,
            _action: grievance_domain_models::enums::AuditAction,
        ) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_actor(&self, _actor_id: i64) -> Result<Vec<AuditLog>, RepoError> {
            Ok(vec![])
        }
        async fn find_by_action_in_window(
            &self,
            _action: grievance_domain_models::enums::AuditAction,
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
        async fn mark_read_for_complaint(
            &self,
            _user_id: i64,
            _complaint_id: i64,
        ) -> Result<i64, RepoError> {
            Ok(0)
        }
    }

    fn service_with(
        complaints: Arc<FakeComplaints>,
        events: Arc<FakeEscalationEvents>,
    ) -> EscalationService {
        let audit = Arc::new(AuditRecorder::new(Arc::new(NoopAuditLog)));
        let notification_repo: Arc<dyn grievance_domain_repository::NotificationRepository> =
            Arc::new(NullNotifications);
        let dispatcher = NotificationDispatcher::spawn(notification_repo, 8);
        EscalationService::new(
            complaints,
            events,
            Arc::new(FakeRecipients),
            audit,
            dispatcher,
            EscalationThresholds::default(),
        )
    }

    fn overdue_complaint(days: i64, level: u8) -> Complaint {
        let now = Utc::now();
        let mut complaint = Complaint::new_filed(1, "t".into(), "d".into(), "l".into(), 7, 0.9, now);
        complaint.sla_deadline = Some(now - ChronoDuration::days(days));
        complaint.escalation_level = level;
        complaint.department_id = Some(5);
        complaint
    }

    #[tokio::test]
    async fn overdue_complaint_escalates_and_raises_level() {
        let complaints = Arc::new(FakeComplaints::default());
        let events = Arc::new(FakeEscalationEvents::default());
        let service = service_with(complaints.clone(), events);

        let complaint = overdue_complaint(2, 0);
        let event = service.process(&complaint, Utc::now()).await.unwrap();

        assert!(event.is_some());
        assert_eq!(complaints.raised.lock().unwrap().as_slice(), &[(1, 1)]);
    }

    #[tokio::test]
    async fn within_sla_does_not_escalate() {
        let complaints = Arc::new(FakeComplaints::default());
        let events = Arc::new(FakeEscalationEvents::default());
        let service = service_with(complaints.clone(), events);

        let complaint = overdue_complaint(-3, 0);
        let event = service.process(&complaint, Utc::now()).await.unwrap();

        assert!(event.is_none());
        assert!(complaints.raised.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn already_recorded_level_is_idempotent() {
        let complaints = Arc::new(FakeComplaints::default());
        let events = Arc::new(FakeEscalationEvents::default());
        events.seen.lock().unwrap().push((1, EscalationLevel::L1));
        let service = service_with(complaints.clone(), events);

        let complaint = overdue_complaint(2, 0);
        let event = service.process(&complaint, Utc::now()).await.unwrap();

        assert!(event.is_none());
        assert!(complaints.raised.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn process_batch_counts_only_actual_escalations() {
        let complaints = Arc::new(FakeComplaints::default());
        let events = Arc::new(FakeEscalationEvents::default());
        let service = service_with(complaints.clone(), events);

        let batch = vec![overdue_complaint(2, 0), overdue_complaint(-1, 0)];
        let count = service.process_batch(&batch, Utc::now()).await;

        assert_eq!(count, 1);
    }
}
