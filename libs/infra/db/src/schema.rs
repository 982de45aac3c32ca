//! [libs/infra/db/src/schema.rs]
//!
//! Schema bootstrap. Idempotent: every statement is `CREATE TABLE IF NOT
//! EXISTS` / `CREATE INDEX IF NOT EXISTS`, so it is safe to run on every
//! connect. Required indices per §6: complaint(status, sla_deadline),
//! escalation_event(complaint_id, escalation_level) unique,
//! audit_log(entity_type, entity_id, created_at), notification(user_id,
//! is_read). Also enforces I-S3 (§5: "at most one pending dispute per
//! complaint") with a partial unique index on
//! citizen_signoff(complaint_id) restricted to still-pending disputes, so
//! two concurrent `file_dispute` inserts cannot both succeed.

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const TABLES: &[(&str, &str)] = &[
    (
        "category",
        r#"
        CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            keywords TEXT NOT NULL DEFAULT '[]'
        );
    "#,
    ),
    (
        "sla_rule",
        r#"
        CREATE TABLE IF NOT EXISTS sla_rule (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL UNIQUE,
            sla_days INTEGER NOT NULL,
            base_priority TEXT NOT NULL,
            department_id INTEGER NOT NULL
        );
    "#,
    ),
    (
        "complaint",
        r#"
        CREATE TABLE IF NOT EXISTS complaint (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            location TEXT NOT NULL,
            citizen_id INTEGER NOT NULL,
            department_id INTEGER,
            staff_id INTEGER,
            category_id INTEGER,
            priority TEXT NOT NULL,
            status TEXT NOT NULL,
            escalation_level INTEGER NOT NULL DEFAULT 0,
            sla_deadline TEXT,
            created_at TEXT NOT NULL,
            started_at TEXT,
            resolved_at TEXT,
            closed_at TEXT,
            needs_manual_routing INTEGER NOT NULL DEFAULT 0,
            ai_confidence REAL NOT NULL DEFAULT 0.0,
            citizen_satisfaction INTEGER
        );
    "#,
    ),
    (
        "escalation_event",
        r#"
        CREATE TABLE IF NOT EXISTS escalation_event (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            complaint_id INTEGER NOT NULL,
            previous_level TEXT NOT NULL,
            escalation_level TEXT NOT NULL,
            escalated_at TEXT NOT NULL,
            escalated_to_role TEXT NOT NULL,
            reason TEXT NOT NULL,
            days_overdue INTEGER NOT NULL,
            sla_deadline_snapshot TEXT NOT NULL,
            is_automated INTEGER NOT NULL
        );
    "#,
    ),
    (
        "resolution_proof",
        r#"
        CREATE TABLE IF NOT EXISTS resolution_proof (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            complaint_id INTEGER NOT NULL,
            staff_id INTEGER NOT NULL,
            image_reference TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            captured_at TEXT NOT NULL,
            remarks TEXT,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "citizen_signoff",
        r#"
        CREATE TABLE IF NOT EXISTS citizen_signoff (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            complaint_id INTEGER NOT NULL,
            citizen_id INTEGER NOT NULL,
            is_accepted INTEGER NOT NULL,
            rating INTEGER,
            feedback TEXT,
            dispute_reason TEXT,
            dispute_image_reference TEXT,
            signed_off_at TEXT NOT NULL,
            dispute_approved INTEGER,
            dispute_approved_by INTEGER,
            dispute_reviewed_at TEXT,
            dispute_rejection_reason TEXT
        );
    "#,
    ),
    (
        "audit_log",
        r#"
        CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_type TEXT NOT NULL,
            entity_id INTEGER NOT NULL,
            action TEXT NOT NULL,
            old_value TEXT,
            new_value TEXT,
            actor_type TEXT NOT NULL,
            actor_id INTEGER,
            reason TEXT,
            created_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "notification",
        r#"
        CREATE TABLE IF NOT EXISTS notification (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            notification_type TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            complaint_id INTEGER,
            link TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            read_at TEXT,
            created_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "department_directory",
        r#"
        CREATE TABLE IF NOT EXISTS department_directory (
            department_id INTEGER PRIMARY KEY,
            dept_head_user_id INTEGER NOT NULL
        );
    "#,
    ),
    (
        "commissioner_directory",
        r#"
        CREATE TABLE IF NOT EXISTS commissioner_directory (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            user_id INTEGER NOT NULL
        );
    "#,
    ),
];

const INDEXES: &[(&str, &str)] = &[
    (
        "idx_complaint_status_deadline",
        "CREATE INDEX IF NOT EXISTS idx_complaint_status_deadline ON complaint(status, sla_deadline);",
    ),
    (
        "idx_complaint_citizen",
        "CREATE INDEX IF NOT EXISTS idx_complaint_citizen ON complaint(citizen_id);",
    ),
    (
        "idx_complaint_staff",
        "CREATE INDEX IF NOT EXISTS idx_complaint_staff ON complaint(staff_id);",
    ),
    (
        "idx_complaint_department",
        "CREATE INDEX IF NOT EXISTS idx_complaint_department ON complaint(department_id);",
    ),
    (
        "idx_escalation_event_unique",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_escalation_event_unique ON escalation_event(complaint_id, escalation_level);",
    ),
    (
        "idx_audit_log_entity",
        "CREATE INDEX IF NOT EXISTS idx_audit_log_entity ON audit_log(entity_type, entity_id, created_at);",
    ),
    (
        "idx_audit_log_actor",
        "CREATE INDEX IF NOT EXISTS idx_audit_log_actor ON audit_log(actor_id);",
    ),
    (
        "idx_notification_user_read",
        "CREATE INDEX IF NOT EXISTS idx_notification_user_read ON notification(user_id, is_read);",
    ),
    (
        "idx_citizen_signoff_complaint",
        "CREATE INDEX IF NOT EXISTS idx_citizen_signoff_complaint ON citizen_signoff(complaint_id);",
    ),
    (
        "idx_resolution_proof_complaint",
        "CREATE INDEX IF NOT EXISTS idx_resolution_proof_complaint ON resolution_proof(complaint_id);",
    ),
    (
        "idx_citizen_signoff_pending_dispute_unique",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_citizen_signoff_pending_dispute_unique \
         ON citizen_signoff(complaint_id) WHERE is_accepted = 0 AND dispute_approved IS NULL;",
    ),
];

#[instrument(skip(connection))]
pub async fn apply_schema(connection: &Connection) -> Result<()> {
    info!("applying schema");
    for (name, sql) in TABLES {
        debug!(table = name, "creating table");
        connection
            .execute(sql, ())
            .await
            .with_context(|| format!("failed to create table {name}"))?;
    }
    for (name, sql) in INDEXES {
        debug!(index = name, "creating index");
        connection
            .execute(sql, ())
            .await
            .with_context(|| format!("failed to create index {name}"))?;
    }
    Ok(())
}
