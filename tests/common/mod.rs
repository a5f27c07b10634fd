//! In-memory collaborators for driving the landing page workflow.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use landing_page_lib::free_email::FreeDomainList;
use landing_page_lib::integrations::{
    AccountOwner, Contact, ContactInfo, ContactInfoType, Crm, CrmError, Note, Organisation, User,
};
use landing_page_lib::mail::{Email, MailError, Mailer};
use landing_page_lib::templates::JsonTemplateStore;
use landing_page_lib::LandingPage;

#[derive(Debug, Default)]
pub struct CrmState {
    next_id: i64,
    pub organisations: Vec<Organisation>,
    pub contacts: Vec<Contact>,
    pub notes: HashMap<i64, Vec<Note>>,
    pub users: Vec<User>,
    pub organisation_searches: Vec<(String, String)>,
    pub contact_reads: Vec<(Vec<(String, String)>, usize)>,
    pub updates: Vec<i64>,
    pub creates: usize,
    /// Answer organisation creates the way a misbehaving CRM might: no ID.
    pub omit_organisation_ids: bool,
}

impl CrmState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct MemoryCrm {
    pub state: Mutex<CrmState>,
    pub owner: AccountOwner,
}

impl MemoryCrm {
    pub fn new() -> Self {
        let state = CrmState {
            next_id: 100,
            users: vec![user("sales@example.com"), user("support@example.com")],
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
            owner: AccountOwner {
                name: "Art Zemon".to_string(),
                email: "owner@example.com".to_string(),
                dropbox: Some("dropbox@mailbox.example.com".to_string()),
            },
        }
    }

    pub fn seed_contact(&self, email: &str, background: Option<&str>) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.contacts.push(Contact {
            contact_id: Some(id),
            first_name: "Existing".to_string(),
            last_name: "Person".to_string(),
            background: background.map(str::to_string),
            contactinfos: vec![ContactInfo::work(ContactInfoType::Email, email)],
            ..Default::default()
        });
        id
    }

    pub fn seed_organisation(&self, name: &str, domain: &str) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.organisations.push(Organisation {
            organisation_id: Some(id),
            organisation_name: name.to_string(),
            contactinfos: vec![ContactInfo::work(ContactInfoType::EmailDomain, domain)],
        });
        id
    }

    pub fn contact(&self, id: i64) -> Contact {
        self.state
            .lock()
            .contacts
            .iter()
            .find(|c| c.contact_id == Some(id))
            .cloned()
            .expect("contact exists")
    }
}

fn has_info(infos: &[ContactInfo], kind: ContactInfoType, detail: &str) -> bool {
    infos
        .iter()
        .any(|i| i.kind == kind && i.detail.eq_ignore_ascii_case(detail))
}

pub fn user(email: &str) -> User {
    User {
        email_address: email.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl Crm for MemoryCrm {
    async fn search_organisations(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Organisation>, CrmError> {
        let mut state = self.state.lock();
        state
            .organisation_searches
            .push((field.to_string(), value.to_string()));
        Ok(state
            .organisations
            .iter()
            .filter(|o| has_info(&o.contactinfos, ContactInfoType::EmailDomain, value))
            .cloned()
            .collect())
    }

    async fn create_organisation(
        &self,
        organisation: &Organisation,
    ) -> Result<Organisation, CrmError> {
        let mut state = self.state.lock();
        let mut created = organisation.clone();
        if !state.omit_organisation_ids {
            created.organisation_id = Some(state.next_id());
        }
        state.organisations.push(created.clone());
        Ok(created)
    }

    async fn read_contacts(
        &self,
        filters: &[(&str, &str)],
        top: usize,
    ) -> Result<Vec<Contact>, CrmError> {
        let mut state = self.state.lock();
        state.contact_reads.push((
            filters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            top,
        ));
        let email = filters
            .iter()
            .find(|(k, _)| *k == "email")
            .map(|(_, v)| *v)
            .unwrap_or_default();
        Ok(state
            .contacts
            .iter()
            .filter(|c| has_info(&c.contactinfos, ContactInfoType::Email, email))
            .take(top)
            .cloned()
            .collect())
    }

    async fn create_contact(&self, contact: &Contact) -> Result<Contact, CrmError> {
        let mut state = self.state.lock();
        let mut created = contact.clone();
        created.contact_id = Some(state.next_id());
        state.creates += 1;
        state.contacts.push(created.clone());
        Ok(created)
    }

    async fn update_contact(&self, contact: &Contact, id: i64) -> Result<Contact, CrmError> {
        let mut state = self.state.lock();
        state.updates.push(id);
        let existing = state
            .contacts
            .iter_mut()
            .find(|c| c.contact_id == Some(id))
            .ok_or(CrmError::MissingId("contact"))?;
        *existing = Contact {
            contact_id: Some(id),
            ..contact.clone()
        };
        Ok(existing.clone())
    }

    async fn add_contact_note(&self, contact_id: i64, note: &Note) -> Result<Note, CrmError> {
        let mut state = self.state.lock();
        let mut created = note.clone();
        created.note_id = Some(state.next_id());
        state
            .notes
            .entry(contact_id)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn users(&self) -> Result<Vec<User>, CrmError> {
        Ok(self.state.lock().users.clone())
    }

    async fn account_owner(&self) -> Result<AccountOwner, CrmError> {
        Ok(self.owner.clone())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

pub const TEMPLATES: &str = r#"{
    "Contact": {
        "url": "https://example.com/thanks/{first_name}",
        "subject": "Thanks for getting in touch, {first_name}",
        "message": "Hi {first_name},\nWe will be in touch. Meanwhile: {url}"
    },
    "Download": { "url": "https://example.com/download" }
}"#;

pub struct Harness {
    pub crm: Arc<MemoryCrm>,
    pub mailer: Arc<RecordingMailer>,
    pub page: LandingPage,
}

pub fn harness() -> Harness {
    harness_with(false)
}

pub fn harness_with(debug: bool) -> Harness {
    let crm = Arc::new(MemoryCrm::new());
    let mailer = Arc::new(RecordingMailer::default());
    let templates = JsonTemplateStore::from_json(TEMPLATES).expect("templates parse");
    let page = LandingPage::new(
        crm.clone(),
        mailer.clone(),
        Arc::new(templates),
        Arc::new(FreeDomainList::new()),
    )
    .with_debug(debug);
    Harness { crm, mailer, page }
}

pub fn jane(form_name: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("email", "a@b.com"),
        ("first_name", "Jane"),
        ("last_name", "Doe"),
        ("form_name", form_name),
    ]
}
