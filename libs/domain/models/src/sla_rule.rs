//! [libs/domain/models/src/sla_rule.rs]

use crate::enums::Priority;

/// One SLA rule per category; drives the initial deadline, priority, and
/// department assigned at intake routing (§3, §4.8).
#[derive(Debug, Clone, PartialEq)]
pub struct SlaRule {
    pub id: i64,
    pub category_id: i64,
    pub sla_days: u32,
    pub base_priority: Priority,
    pub department_id: i64,
}
