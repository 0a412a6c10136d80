//! In-memory directory store backed by DashMap.
//!
//! Production: replace with the hosted Postgres backend. This provides the
//! same API surface for development and testing.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use zapline_core::event_bus::{make_event, EventSink, EventType};

use crate::types::*;

/// Thread-safe in-memory store for contacts, tags, team and billing.
pub struct DirectoryStore {
    contacts: DashMap<Uuid, Contact>,
    tags: DashMap<Uuid, ContactTag>,
    team: DashMap<Uuid, TeamMember>,
    billing: DashMap<Uuid, BillingEntry>,
    event_sink: Arc<dyn EventSink>,
}

impl DirectoryStore {
    pub fn new(event_sink: Arc<dyn EventSink>) -> Self {
        info!("Directory store initialized (in-memory, development mode)");
        Self {
            contacts: DashMap::new(),
            tags: DashMap::new(),
            team: DashMap::new(),
            billing: DashMap::new(),
            event_sink,
        }
    }

    // ─── Contacts ──────────────────────────────────────────────────────────

    /// Lists contacts, newest first, optionally filtered by tag name.
    pub fn list_contacts(&self, tag: Option<&str>) -> Vec<Contact> {
        let mut contacts: Vec<Contact> = self
            .contacts
            .iter()
            .filter(|r| match tag {
                Some(t) => r.value().tags.iter().any(|x| x == t),
                None => true,
            })
            .map(|r| r.value().clone())
            .collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        contacts
    }

    pub fn get_contact(&self, id: Uuid) -> Option<Contact> {
        self.contacts.get(&id).map(|r| r.value().clone())
    }

    pub fn create_contact(&self, req: CreateContactRequest) -> Contact {
        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            name: req.name,
            phone: req.phone,
            tags: req.tags,
            email: req.email,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };
        self.contacts.insert(contact.id, contact.clone());
        self.event_sink.emit(make_event(
            EventType::ContactCreated,
            None,
            Some(contact.id),
            serde_json::json!({"name": &contact.name}),
        ));
        contact
    }

    pub fn update_contact(&self, id: Uuid, req: UpdateContactRequest) -> Option<Contact> {
        self.contacts.get_mut(&id).map(|mut entry| {
            let c = entry.value_mut();
            if let Some(name) = req.name {
                c.name = name;
            }
            if let Some(phone) = req.phone {
                c.phone = phone;
            }
            if let Some(tags) = req.tags {
                c.tags = tags;
            }
            if let Some(email) = req.email {
                c.email = Some(email);
            }
            if let Some(notes) = req.notes {
                c.notes = Some(notes);
            }
            c.updated_at = Utc::now();
            c.clone()
        })
    }

    pub fn delete_contact(&self, id: Uuid) -> bool {
        let removed = self.contacts.remove(&id).is_some();
        if removed {
            self.event_sink.emit(make_event(
                EventType::ContactDeleted,
                None,
                Some(id),
                serde_json::json!({}),
            ));
        }
        removed
    }

    /// The contact-picker pool for a user. Admins and managers see the
    /// whole directory; agents only see contacts tagged with their own
    /// name (tag-based assignment). Unknown agent ids see nothing.
    pub fn audience_pool(&self, user_id: Uuid, role: TeamRole) -> Vec<Contact> {
        match role {
            TeamRole::Admin | TeamRole::Manager => self.list_contacts(None),
            TeamRole::Agent => match self.team.get(&user_id) {
                Some(member) => self.list_contacts(Some(&member.name)),
                None => Vec::new(),
            },
        }
    }

    // ─── Tags ──────────────────────────────────────────────────────────────

    pub fn list_tags(&self) -> Vec<ContactTag> {
        let mut tags: Vec<ContactTag> = self.tags.iter().map(|r| r.value().clone()).collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    pub fn create_tag(&self, req: CreateTagRequest) -> ContactTag {
        let tag = ContactTag {
            id: Uuid::new_v4(),
            name: req.name,
            color: req.color,
        };
        self.tags.insert(tag.id, tag.clone());
        tag
    }

    /// Deletes the tag and strips its name from every contact.
    pub fn delete_tag(&self, id: Uuid) -> bool {
        let Some((_, tag)) = self.tags.remove(&id) else {
            return false;
        };
        for mut entry in self.contacts.iter_mut() {
            entry.value_mut().tags.retain(|t| *t != tag.name);
        }
        true
    }

    // ─── Team ──────────────────────────────────────────────────────────────

    pub fn list_team(&self) -> Vec<TeamMember> {
        let mut team: Vec<TeamMember> = self.team.iter().map(|r| r.value().clone()).collect();
        team.sort_by(|a, b| a.name.cmp(&b.name));
        team
    }

    pub fn add_team_member(&self, req: CreateTeamMemberRequest) -> TeamMember {
        let member = TeamMember {
            id: Uuid::new_v4(),
            name: req.name,
            phone: req.phone,
            role: req.role,
            active: true,
        };
        self.team.insert(member.id, member.clone());
        member
    }

    // ─── Billing ───────────────────────────────────────────────────────────

    pub fn list_billing(&self) -> Vec<BillingEntry> {
        let mut entries: Vec<BillingEntry> =
            self.billing.iter().map(|r| r.value().clone()).collect();
        entries.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        entries
    }

    // ─── Demo Data ─────────────────────────────────────────────────────────

    /// Seeds demo contacts, tags, team members and billing history.
    pub fn seed_demo_data(&self) {
        let now = Utc::now();

        for (name, color) in [
            ("cliente-vip", "#25d366"),
            ("lead", "#f5a623"),
            ("Carla Mendes", "#4a90d9"),
        ] {
            self.create_tag(CreateTagRequest {
                name: name.to_string(),
                color: color.to_string(),
            });
        }

        let contacts = [
            ("Ana Souza", "+5511999990001", vec!["cliente-vip"]),
            ("Bruno Lima", "+5511999990002", vec!["lead"]),
            ("Camila Rocha", "+5521999990003", vec!["lead", "Carla Mendes"]),
            ("Diego Alves", "+5531999990004", vec!["cliente-vip", "Carla Mendes"]),
            ("Elisa Martins", "+5541999990005", vec![]),
        ];
        for (i, (name, phone, tags)) in contacts.iter().enumerate() {
            let contact = Contact {
                id: Uuid::new_v4(),
                name: name.to_string(),
                phone: phone.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                email: None,
                notes: None,
                created_at: now - Duration::days(i as i64),
                updated_at: now,
            };
            self.contacts.insert(contact.id, contact);
        }

        for (name, phone, role) in [
            ("Paulo Dias", "+5511988880001", TeamRole::Admin),
            ("Renata Costa", "+5511988880002", TeamRole::Manager),
            ("Carla Mendes", "+5511988880003", TeamRole::Agent),
        ] {
            self.add_team_member(CreateTeamMemberRequest {
                name: name.to_string(),
                phone: phone.to_string(),
                role,
            });
        }

        for (desc, amount, days_ago, status) in [
            ("Plano Business — mensalidade", 249.90, 40, BillingStatus::Paid),
            ("Plano Business — mensalidade", 249.90, 10, BillingStatus::Pending),
            ("Pacote extra de disparos", 89.00, 70, BillingStatus::Overdue),
        ] {
            let entry = BillingEntry {
                id: Uuid::new_v4(),
                description: desc.to_string(),
                amount,
                due_date: (now - Duration::days(days_ago)).date_naive(),
                status,
            };
            self.billing.insert(entry.id, entry);
        }

        info!(
            contacts = self.contacts.len(),
            tags = self.tags.len(),
            team = self.team.len(),
            "Demo directory data seeded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zapline_core::event_bus::CaptureSink;

    fn store_with_sink() -> (DirectoryStore, Arc<CaptureSink>) {
        let sink = Arc::new(CaptureSink::new());
        (DirectoryStore::new(sink.clone()), sink)
    }

    #[test]
    fn test_contact_crud_and_events() {
        let (store, sink) = store_with_sink();

        let contact = store.create_contact(CreateContactRequest {
            name: "Ana".to_string(),
            phone: "+5511999990001".to_string(),
            tags: vec!["lead".to_string()],
            email: None,
            notes: None,
        });
        assert_eq!(sink.count_type(EventType::ContactCreated), 1);

        let updated = store
            .update_contact(
                contact.id,
                UpdateContactRequest {
                    name: Some("Ana Souza".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Ana Souza");
        assert_eq!(updated.phone, contact.phone);

        assert!(store.delete_contact(contact.id));
        assert!(!store.delete_contact(contact.id));
        assert_eq!(sink.count_type(EventType::ContactDeleted), 1);
    }

    #[test]
    fn test_tag_filter_and_tag_deletion_strips_contacts() {
        let (store, _) = store_with_sink();
        let tag = store.create_tag(CreateTagRequest {
            name: "vip".to_string(),
            color: "#25d366".to_string(),
        });
        let contact = store.create_contact(CreateContactRequest {
            name: "Bruno".to_string(),
            phone: "+5511999990002".to_string(),
            tags: vec!["vip".to_string()],
            email: None,
            notes: None,
        });

        assert_eq!(store.list_contacts(Some("vip")).len(), 1);
        assert!(store.delete_tag(tag.id));
        assert_eq!(store.list_contacts(Some("vip")).len(), 0);
        assert!(store.get_contact(contact.id).unwrap().tags.is_empty());
    }

    #[test]
    fn test_audience_pool_role_filtering() {
        let (store, _) = store_with_sink();
        store.seed_demo_data();

        let team = store.list_team();
        let admin = team.iter().find(|m| m.role == TeamRole::Admin).unwrap();
        let agent = team.iter().find(|m| m.role == TeamRole::Agent).unwrap();

        let all = store.audience_pool(admin.id, TeamRole::Admin);
        assert_eq!(all.len(), 5);

        // Carla only sees contacts tagged with her name.
        let mine = store.audience_pool(agent.id, TeamRole::Agent);
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|c| c.tags.contains(&agent.name)));

        // Unknown agent id sees nothing.
        assert!(store.audience_pool(Uuid::new_v4(), TeamRole::Agent).is_empty());
    }

    #[test]
    fn test_billing_sorted_newest_due_first() {
        let (store, _) = store_with_sink();
        store.seed_demo_data();
        let entries = store.list_billing();
        assert_eq!(entries.len(), 3);
        assert!(entries.windows(2).all(|w| w[0].due_date >= w[1].due_date));
    }
}
