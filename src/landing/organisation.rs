use crate::free_email::FreeEmailClassifier;
use crate::form::FormSubmission;
use crate::integrations::{ContactInfo, ContactInfoType, Crm, CrmError, Organisation};

/// Search field matching an organisation's email-domain contact info.
pub const EMAIL_DOMAIN_FIELD: &str = "email_domain";

/// Finds the submitter's organisation by email domain, creating it when the
/// CRM has none. Free webmail domains get no organisation. Whatever is
/// returned carries its CRM ID.
pub async fn resolve(
    crm: &dyn Crm,
    classifier: &dyn FreeEmailClassifier,
    form: &FormSubmission,
) -> Result<Option<Organisation>, CrmError> {
    let domain = form.domain();
    if classifier.is_free(&domain) {
        log::debug!("{} is a free email domain, skipping organisation", domain);
        return Ok(None);
    }

    let found = crm.search_organisations(EMAIL_DOMAIN_FIELD, &domain).await?;
    if let Some(organisation) = found.into_iter().next() {
        let id = organisation
            .organisation_id
            .ok_or(CrmError::MissingId("organisation"))?;
        log::debug!(
            "Using organisation {:?} ({}) for {}",
            organisation.organisation_name,
            id,
            domain
        );
        return Ok(Some(organisation));
    }

    let name = form.company.clone().unwrap_or_else(|| domain.clone());
    let organisation = Organisation {
        organisation_id: None,
        organisation_name: name,
        contactinfos: vec![ContactInfo::work(ContactInfoType::EmailDomain, domain)],
    };
    let created = crm.create_organisation(&organisation).await?;
    let id = created
        .organisation_id
        .ok_or(CrmError::MissingId("organisation"))?;
    log::info!("Created organisation {:?} ({})", created.organisation_name, id);
    Ok(Some(created))
}
