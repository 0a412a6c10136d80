use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A WhatsApp contact in the tenant's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    /// E.164 phone number, e.g. +5511999990001.
    pub phone: String,
    /// Tag names. Tags double as agent assignment: a contact tagged with
    /// an agent's name belongs to that agent's audience pool.
    pub tags: Vec<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Partial contact update; unset fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub tags: Option<Vec<String>>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// A label contacts can carry, with a display color for the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactTag {
    pub id: Uuid,
    pub name: String,
    /// Hex color, e.g. "#25d366".
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

/// Permission level of a team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Admin,
    Manager,
    Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub role: TeamRole,
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamMemberRequest {
    pub name: String,
    pub phone: String,
    pub role: TeamRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Pending,
    Paid,
    Overdue,
}

/// A line item on the tenant's invoice history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingEntry {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: BillingStatus,
}
