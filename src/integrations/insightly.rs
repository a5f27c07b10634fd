use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{AccountOwner, Contact, Crm, CrmError, Note, Organisation, User};

pub const DEFAULT_API_URL: &str = "https://api.insightly.com/v2.1";

const ORGANISATIONS: &str = "Organisations";
const CONTACTS: &str = "Contacts";
const NOTES: &str = "Notes";
const USERS: &str = "Users";

/// Insightly REST client. Requests are made one at a time with no retries.
#[derive(Debug, Clone)]
pub struct InsightlyClient {
    client: Client,
    base_url: String,
    auth_header: String,
    dropbox: Option<String>,
}

impl InsightlyClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, CrmError> {
        Self::with_timeout(api_key, base_url, None)
    }

    pub fn with_timeout(
        api_key: &str,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, CrmError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: basic_auth(api_key),
            dropbox: None,
        })
    }

    /// Mail-in address reported as part of the account owner's profile.
    pub fn with_dropbox(mut self, dropbox: Option<String>) -> Self {
        self.dropbox = dropbox;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        log::debug!("Insightly {} {}", method, url);
        self.client
            .request(method, url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }

    async fn parse<T: DeserializeOwned>(
        sent: Result<Response, reqwest::Error>,
    ) -> Result<T, CrmError> {
        let response = sent.map_err(|e| {
            log::warn!("Insightly request failed: {}", e);
            CrmError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Insightly error ({}): {}", status, body);
            return Err(CrmError::Api { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `GET /{collection}/Search?{field}={value}`
    pub async fn search<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, CrmError> {
        let response = self
            .request(Method::GET, &format!("{}/Search", collection))
            .query(&[(field, value)])
            .send()
            .await;
        Self::parse(response).await
    }

    /// `GET /{collection}?{filters}&top={top}`
    pub async fn read<T: DeserializeOwned>(
        &self,
        collection: &str,
        filters: &[(&str, &str)],
        top: Option<usize>,
    ) -> Result<Vec<T>, CrmError> {
        let mut builder = self.request(Method::GET, collection).query(filters);
        if let Some(top) = top {
            builder = builder.query(&[("top", top)]);
        }
        let response = builder.send().await;
        Self::parse(response).await
    }

    /// `POST /{collection}`
    pub async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        record: &B,
    ) -> Result<T, CrmError> {
        let response = self
            .request(Method::POST, collection)
            .json(record)
            .send()
            .await;
        Self::parse(response).await
    }

    /// `POST /{collection}/{id}/{sub_type}`
    pub async fn create_child<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        id: i64,
        sub_type: &str,
        record: &B,
    ) -> Result<T, CrmError> {
        let response = self
            .request(Method::POST, &format!("{}/{}/{}", collection, id, sub_type))
            .json(record)
            .send()
            .await;
        Self::parse(response).await
    }

    /// `PUT /{collection}`; the record carries its own ID.
    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        record: &B,
    ) -> Result<T, CrmError> {
        let response = self
            .request(Method::PUT, collection)
            .json(record)
            .send()
            .await;
        Self::parse(response).await
    }
}

fn basic_auth(api_key: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{}:", api_key));
    format!("Basic {}", token)
}

#[async_trait]
impl Crm for InsightlyClient {
    async fn search_organisations(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<Organisation>, CrmError> {
        self.search(ORGANISATIONS, field, value).await
    }

    async fn create_organisation(
        &self,
        organisation: &Organisation,
    ) -> Result<Organisation, CrmError> {
        self.create(ORGANISATIONS, organisation).await
    }

    async fn read_contacts(
        &self,
        filters: &[(&str, &str)],
        top: usize,
    ) -> Result<Vec<Contact>, CrmError> {
        self.read(CONTACTS, filters, Some(top)).await
    }

    async fn create_contact(&self, contact: &Contact) -> Result<Contact, CrmError> {
        self.create(CONTACTS, contact).await
    }

    async fn update_contact(&self, contact: &Contact, id: i64) -> Result<Contact, CrmError> {
        let mut record = contact.clone();
        record.contact_id = Some(id);
        self.update(CONTACTS, &record).await
    }

    async fn add_contact_note(&self, contact_id: i64, note: &Note) -> Result<Note, CrmError> {
        self.create_child(CONTACTS, contact_id, NOTES, note).await
    }

    async fn users(&self) -> Result<Vec<User>, CrmError> {
        self.read(USERS, &[], None).await
    }

    async fn account_owner(&self) -> Result<AccountOwner, CrmError> {
        let me: User = {
            let response = self.request(Method::GET, "Users/Me").send().await;
            Self::parse(response).await?
        };

        Ok(AccountOwner {
            name: me.display_name(),
            email: me.email_address,
            dropbox: self.dropbox.clone(),
        })
    }
}
