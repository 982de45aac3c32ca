//! [apps/scheduler/src/main.rs]
//!
//! Background worker binary: runs `EscalationScheduler` on a fixed
//! cadence (§4.7) and exits when it receives SIGINT/SIGTERM.

use grievance_core_audit::AuditRecorder;
use grievance_core_escalation::{EscalationScheduler, EscalationService};
use grievance_domain_escalation::EscalationThresholds;
use grievance_domain_repository::{ComplaintRepository, EscalationEventRepository, RecipientDirectory};
use grievance_infra_db::{
    AuditLogRepositoryImpl, ComplaintRepositoryImpl, DbClient, EscalationEventRepositoryImpl,
    NotificationRepositoryImpl, RecipientDirectoryImpl,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn escalation_period() -> Duration {
    std::env::var("ESCALATION_PERIOD_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(6 * 60 * 60))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    grievance_shared_telemetry::init_tracing("grievance_scheduler");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "file:grievance.db".to_string());
    let database_token = std::env::var("TURSO_AUTH_TOKEN").ok();

    let db = DbClient::connect(&database_url, database_token).await?;

    let complaints: Arc<dyn ComplaintRepository> = Arc::new(ComplaintRepositoryImpl::new(db.clone()));
    let escalation_events: Arc<dyn EscalationEventRepository> =
        Arc::new(EscalationEventRepositoryImpl::new(db.clone()));
    let recipients: Arc<dyn RecipientDirectory> = Arc::new(RecipientDirectoryImpl::new(db.clone()));
    let audit = Arc::new(AuditRecorder::new(Arc::new(AuditLogRepositoryImpl::new(db.clone()))));
    let notification_repo = Arc::new(NotificationRepositoryImpl::new(db.clone()));
    let notifications = grievance_domain_notification::NotificationDispatcher::spawn(notification_repo, 256);

    let service = Arc::new(EscalationService::new(
        complaints,
        escalation_events,
        recipients,
        audit,
        notifications,
        EscalationThresholds::default(),
    ));

    let scheduler = EscalationScheduler::with_period(service, escalation_period());
    let stop = scheduler.stop_handle();
    let handle = scheduler.spawn();

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    stop.notify_one();
    handle.await?;

    Ok(())
}
