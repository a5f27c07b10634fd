use crate::form::FormSubmission;
use crate::integrations::{
    Contact, ContactInfo, ContactInfoType, Crm, CrmError, Link, Organisation, Tag,
};

pub const WEB_CONTACT_TAG: &str = "Web Contact";

/// Two is enough to tell a unique match from an ambiguous one.
const MATCH_LIMIT: usize = 2;

/// The contact record a submission describes, before it is reconciled with
/// what the CRM already holds.
pub fn build(
    form: &FormSubmission,
    organisation: Option<&Organisation>,
) -> Result<Contact, CrmError> {
    let mut contactinfos = vec![ContactInfo::work(ContactInfoType::Email, &form.email)];
    if let Some(phone) = &form.phone {
        contactinfos.push(ContactInfo::work(ContactInfoType::Phone, phone));
    }
    if let Some(website) = &form.website {
        contactinfos.push(ContactInfo::work(ContactInfoType::Website, website));
    }

    let links = match organisation {
        Some(org) => {
            let id = org
                .organisation_id
                .ok_or(CrmError::MissingId("organisation"))?;
            vec![Link {
                link_id: None,
                organisation_id: Some(id),
            }]
        }
        None => Vec::new(),
    };

    Ok(Contact {
        contact_id: None,
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        background: form.background(),
        contactinfos,
        tags: vec![Tag {
            tag_name: WEB_CONTACT_TAG.to_string(),
        }],
        links,
    })
}

/// New background text is appended to what is already there.
pub fn merge_background(existing: Option<&str>, new: Option<String>) -> Option<String> {
    match (existing, new) {
        (Some(old), Some(new)) => Some(format!("{}\n{}", old, new)),
        (None, Some(new)) => Some(new),
        (existing, None) => existing.map(str::to_string),
    }
}

/// Updates the contact with the submitter's email when exactly one exists,
/// otherwise creates a new one. Ambiguous matches are never merged.
pub async fn upsert(
    crm: &dyn Crm,
    form: &FormSubmission,
    organisation: Option<&Organisation>,
) -> Result<Contact, CrmError> {
    let matches = crm
        .read_contacts(&[("email", form.email.as_str())], MATCH_LIMIT)
        .await?;
    let mut contact = build(form, organisation)?;

    match matches.as_slice() {
        [existing] => {
            let id = existing.contact_id.ok_or(CrmError::MissingId("contact"))?;
            contact.contact_id = Some(id);
            contact.background =
                merge_background(existing.background.as_deref(), contact.background.take());
            let updated = crm.update_contact(&contact, id).await?;
            log::info!("Updated contact {} for {}", id, form.email);
            Ok(updated)
        }
        _ => {
            if matches.len() > 1 {
                log::warn!(
                    "{} matches several contacts, creating a new one",
                    form.email
                );
            }
            let created = crm.create_contact(&contact).await?;
            log::info!(
                "Created contact {:?} for {}",
                created.contact_id,
                form.email
            );
            Ok(created)
        }
    }
}
