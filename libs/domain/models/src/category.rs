//! [libs/domain/models/src/category.rs]

/// Classification bucket fed to (and returned by) the external AI
/// classifier. Immutable after creation except by an admin (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
}
