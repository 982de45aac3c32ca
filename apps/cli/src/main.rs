//! [apps/cli/src/main.rs]
//!
//! Administrative CLI: drives the core services directly against the
//! configured database, for operations support and manual intervention
//! (§6) without going through an outer HTTP layer.

use clap::{Parser, Subcommand};
use grievance_core_audit::AuditRecorder;
use grievance_core_css::ComplaintStateService;
use grievance_core_dispute::DisputeWorkflow;
use grievance_core_escalation::EscalationService;
use grievance_domain_escalation::EscalationThresholds;
use grievance_domain_models::enums::{Priority, Role, Status};
use grievance_domain_models::{CallerContext, Category, Complaint, SlaRule};
use grievance_domain_notification::NotificationDispatcher;
use grievance_domain_repository::{
    CategoryRepository, CitizenSignoffRepository, ComplaintRepository, EscalationEventRepository,
    RecipientDirectory, ResolutionProofRepository, SlaRuleRepository,
};
use grievance_infra_db::{
    AuditLogRepositoryImpl, CategoryRepositoryImpl, CitizenSignoffRepositoryImpl,
    ComplaintRepositoryImpl, DbClient, EscalationEventRepositoryImpl, NotificationRepositoryImpl,
    RecipientDirectoryImpl, ResolutionProofRepositoryImpl, SlaRuleRepositoryImpl,
};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "grievance-cli", about = "Administrative CLI for the grievance governance core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// File a new complaint in FILED status.
    File {
        title: String,
        description: String,
        location: String,
        citizen_id: i64,
        ai_confidence: f64,
    },
    /// Run the intake routing side-effect for a filed complaint.
    Route {
        complaint_id: i64,
        category_id: i64,
        ai_confidence: f64,
    },
    /// Transition a complaint to a new status.
    Transition {
        complaint_id: i64,
        /// FILED | IN_PROGRESS | RESOLVED | CLOSED | CANCELLED
        target: String,
        #[arg(long, default_value = "SYSTEM")]
        role: String,
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long)]
        department_id: Option<i64>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Assign a department to a complaint flagged for manual routing.
    AssignDepartment { complaint_id: i64, department_id: i64 },
    /// Assign (or reassign) the staff handling a complaint.
    AssignStaff {
        complaint_id: i64,
        staff_id: i64,
        #[arg(long, default_value = "SYSTEM")]
        role: String,
        #[arg(long)]
        user_id: Option<i64>,
        #[arg(long)]
        department_id: Option<i64>,
    },
    /// Submit a resolution proof for a complaint being resolved.
    SubmitProof {
        complaint_id: i64,
        staff_id: i64,
        department_id: i64,
        image_reference: String,
        latitude: f64,
        longitude: f64,
    },
    /// Record a citizen's acceptance of a resolution.
    AcceptResolution {
        complaint_id: i64,
        citizen_id: i64,
        #[arg(long)]
        rating: Option<u8>,
    },
    /// File a dispute against a resolved complaint.
    FileDispute {
        complaint_id: i64,
        citizen_id: i64,
        reason: String,
    },
    /// A department head's review of a pending dispute.
    ReviewDispute {
        signoff_id: i64,
        dept_head_user_id: i64,
        department_id: i64,
        #[arg(long)]
        approve: bool,
        #[arg(long)]
        rejection_reason: Option<String>,
    },
    /// List active, past-deadline complaints.
    Overdue,
    /// Show a complaint's audit trail.
    AuditHistory { complaint_id: i64 },
    /// Show a complaint's escalation history.
    EscalationHistory { complaint_id: i64 },
    /// Manually trigger an escalation sweep over all active complaints.
    TriggerEscalation,
    /// Seed a complaint category.
    SeedCategory {
        name: String,
        description: String,
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,
    },
    /// Seed an SLA rule for a category.
    SeedSlaRule {
        category_id: i64,
        sla_days: u32,
        base_priority: String,
        department_id: i64,
    },
}

struct Services {
    css: Arc<ComplaintStateService>,
    escalation: EscalationService,
    dispute: DisputeWorkflow,
    categories: Arc<dyn CategoryRepository>,
    sla_rules: Arc<dyn SlaRuleRepository>,
    complaints: Arc<dyn ComplaintRepository>,
}

async fn build_services(db: DbClient) -> anyhow::Result<Services> {
    let complaints: Arc<dyn ComplaintRepository> = Arc::new(ComplaintRepositoryImpl::new(db.clone()));
    let categories: Arc<dyn CategoryRepository> = Arc::new(CategoryRepositoryImpl::new(db.clone()));
    let sla_rules: Arc<dyn SlaRuleRepository> = Arc::new(SlaRuleRepositoryImpl::new(db.clone()));
    let resolution_proofs: Arc<dyn ResolutionProofRepository> =
        Arc::new(ResolutionProofRepositoryImpl::new(db.clone()));
    let signoffs: Arc<dyn CitizenSignoffRepository> =
        Arc::new(CitizenSignoffRepositoryImpl::new(db.clone()));
    let escalation_events: Arc<dyn EscalationEventRepository> =
        Arc::new(EscalationEventRepositoryImpl::new(db.clone()));
    let recipients: Arc<dyn RecipientDirectory> = Arc::new(RecipientDirectoryImpl::new(db.clone()));
    let audit = Arc::new(AuditRecorder::new(Arc::new(AuditLogRepositoryImpl::new(db.clone()))));
    let notification_repo = Arc::new(NotificationRepositoryImpl::new(db.clone()));
    let notifications = NotificationDispatcher::spawn(notification_repo, 64);

    let css = Arc::new(ComplaintStateService::new(
        complaints.clone(),
        categories.clone(),
        sla_rules.clone(),
        resolution_proofs,
        signoffs.clone(),
        escalation_events.clone(),
        audit.clone(),
        notifications.clone(),
    ));

    let escalation = EscalationService::new(
        complaints.clone(),
        escalation_events,
        recipients.clone(),
        audit.clone(),
        notifications.clone(),
        EscalationThresholds::default(),
    );

    let dispute = DisputeWorkflow::new(
        complaints.clone(),
        signoffs,
        css.clone(),
        audit,
        recipients,
        notifications,
    );

    Ok(Services {
        css,
        escalation,
        dispute,
        categories,
        sla_rules,
        complaints,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    grievance_shared_telemetry::init_tracing("grievance_cli");

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "file:grievance.db".to_string());
    let database_token = std::env::var("TURSO_AUTH_TOKEN").ok();
    let db = DbClient::connect(&database_url, database_token).await?;
    let services = build_services(db).await?;

    match cli.command {
        Command::File {
            title,
            description,
            location,
            citizen_id,
            ai_confidence,
        } => {
            let complaint = Complaint::new_filed(0, title, description, location, citizen_id, ai_confidence, chrono::Utc::now());
            let id = services.complaints.insert(&complaint).await?;
            println!("filed complaint {id}");
        }
        Command::Route {
            complaint_id,
            category_id,
            ai_confidence,
        } => {
            let complaint = services
                .css
                .route_new_complaint(complaint_id, category_id, ai_confidence, &CallerContext::system())
                .await?;
            println!("{complaint:#?}");
        }
        Command::Transition {
            complaint_id,
            target,
            role,
            user_id,
            department_id,
            reason,
        } => {
            let target = Status::from_str(&target).map_err(|e| anyhow::anyhow!(e))?;
            let caller = caller_from(&role, user_id, department_id)?;
            let result = services.css.transition(complaint_id, target, &caller, reason).await?;
            println!("{:#?}", result.complaint);
        }
        Command::AssignDepartment { complaint_id, department_id } => {
            let complaint = services.css.assign_department(complaint_id, department_id).await?;
            println!("{complaint:#?}");
        }
        Command::AssignStaff {
            complaint_id,
            staff_id,
            role,
            user_id,
            department_id,
        } => {
            let caller = caller_from(&role, user_id, department_id)?;
            let complaint = services.css.assign_staff(complaint_id, staff_id, &caller, None).await?;
            println!("{complaint:#?}");
        }
        Command::SubmitProof {
            complaint_id,
            staff_id,
            department_id,
            image_reference,
            latitude,
            longitude,
        } => {
            let staff = CallerContext::staff(staff_id, department_id);
            let proof = services
                .css
                .submit_resolution_proof(complaint_id, &staff, image_reference, latitude, longitude, None)
                .await?;
            println!("{proof:#?}");
        }
        Command::AcceptResolution { complaint_id, citizen_id, rating } => {
            let citizen = CallerContext::citizen(citizen_id);
            let signoff = services
                .css
                .submit_signoff(complaint_id, &citizen, rating, None)
                .await?;
            println!("{signoff:#?}");
        }
        Command::FileDispute { complaint_id, citizen_id, reason } => {
            let citizen = CallerContext::citizen(citizen_id);
            let signoff = services.dispute.file_dispute(complaint_id, &citizen, reason, None).await?;
            println!("{signoff:#?}");
        }
        Command::ReviewDispute {
            signoff_id,
            dept_head_user_id,
            department_id,
            approve,
            rejection_reason,
        } => {
            let dept_head = CallerContext::dept_head(dept_head_user_id, department_id);
            let signoff = services
                .dispute
                .review_dispute(signoff_id, &dept_head, approve, rejection_reason)
                .await?;
            println!("{signoff:#?}");
        }
        Command::Overdue => {
            let overdue = services.css.get_overdue_complaints().await?;
            for entry in overdue {
                println!(
                    "complaint {} overdue {} day(s), {} -> {}",
                    entry.complaint.id, entry.days_overdue, entry.current_level, entry.required_level
                );
            }
        }
        Command::AuditHistory { complaint_id } => {
            for entry in services.css.get_audit_for_complaint(complaint_id).await? {
                println!("{entry:#?}");
            }
        }
        Command::EscalationHistory { complaint_id } => {
            for entry in services.css.get_escalation_history(complaint_id).await? {
                println!("{entry:#?}");
            }
        }
        Command::TriggerEscalation => {
            let count = services.escalation.trigger_escalation_run(chrono::Utc::now()).await?;
            println!("escalated {count} complaint(s)");
        }
        Command::SeedCategory { name, description, keywords } => {
            let id = services
                .categories
                .insert(&Category { id: 0, name, description, keywords })
                .await?;
            println!("seeded category {id}");
        }
        Command::SeedSlaRule {
            category_id,
            sla_days,
            base_priority,
            department_id,
        } => {
            let base_priority = Priority::from_str(&base_priority).map_err(|e| anyhow::anyhow!(e))?;
            let id = services
                .sla_rules
                .insert(&SlaRule {
                    id: 0,
                    category_id,
                    sla_days,
                    base_priority,
                    department_id,
                })
                .await?;
            println!("seeded sla rule {id}");
        }
    }

    Ok(())
}

fn caller_from(role: &str, user_id: Option<i64>, department_id: Option<i64>) -> anyhow::Result<CallerContext> {
    let role = Role::from_str(role).map_err(|e| anyhow::anyhow!(e))?;
    Ok(CallerContext::new(user_id, role, department_id))
}
