pub mod insightly;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ─── CRM Records ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContactInfoType {
    Email,
    Phone,
    Website,
    EmailDomain,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info_id: Option<i64>,
    #[serde(rename = "TYPE")]
    pub kind: ContactInfoType,
    #[serde(default)]
    pub label: Option<String>,
    pub detail: String,
}

impl ContactInfo {
    pub fn work(kind: ContactInfoType, detail: impl Into<String>) -> Self {
        Self {
            contact_info_id: None,
            kind,
            label: Some("Work".to_string()),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Tag {
    pub tag_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Organisation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<i64>,
    pub organisation_name: String,
    #[serde(default)]
    pub contactinfos: Vec<ContactInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub contactinfos: Vec<ContactInfo>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<i64>,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct User {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email_address: String,
}

impl User {
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The person the CRM account belongs to. Outgoing mail is sent in their name.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountOwner {
    pub name: String,
    pub email: String,
    /// Mail-in address that files copies of outgoing mail in the CRM.
    pub dropbox: Option<String>,
}

// ─── CRM Collaborator ────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("CRM request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("CRM error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to parse CRM response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("CRM returned a {0} without an ID")]
    MissingId(&'static str),
}

/// Operations the landing page needs from the CRM.
#[async_trait]
pub trait Crm: Send + Sync {
    /// Organisations whose `field` equals `value` exactly.
    async fn search_organisations(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Organisation>, CrmError>;

    async fn create_organisation(&self, organisation: &Organisation)
        -> Result<Organisation, CrmError>;

    /// At most `top` contacts matching every filter.
    async fn read_contacts(
        &self,
        filters: &[(&str, &str)],
        top: usize,
    ) -> Result<Vec<Contact>, CrmError>;

    async fn create_contact(&self, contact: &Contact) -> Result<Contact, CrmError>;

    async fn update_contact(&self, contact: &Contact, id: i64) -> Result<Contact, CrmError>;

    async fn add_contact_note(&self, contact_id: i64, note: &Note) -> Result<Note, CrmError>;

    async fn users(&self) -> Result<Vec<User>, CrmError>;

    async fn account_owner(&self) -> Result<AccountOwner, CrmError>;
}
