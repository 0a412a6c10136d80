//! Directory accessors — contacts, tags, team members and billing records
//! over an in-memory store.

pub mod store;
pub mod types;

pub use store::DirectoryStore;
pub use types::{
    BillingEntry, BillingStatus, Contact, ContactTag, CreateContactRequest, CreateTagRequest,
    CreateTeamMemberRequest, TeamMember, TeamRole, UpdateContactRequest,
};
