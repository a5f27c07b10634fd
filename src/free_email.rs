//! Recognises public webmail domains so personal addresses don't spawn
//! organisations in the CRM.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;

pub trait FreeEmailClassifier: Send + Sync {
    fn is_free(&self, domain: &str) -> bool;
}

static BUILTIN_FREE_DOMAINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "aol.com",
        "att.net",
        "bellsouth.net",
        "btinternet.com",
        "comcast.net",
        "cox.net",
        "fastmail.com",
        "gmail.com",
        "gmx.com",
        "gmx.de",
        "googlemail.com",
        "hotmail.co.uk",
        "hotmail.com",
        "hotmail.fr",
        "icloud.com",
        "live.com",
        "mac.com",
        "mail.com",
        "mail.ru",
        "me.com",
        "msn.com",
        "outlook.com",
        "proton.me",
        "protonmail.com",
        "qq.com",
        "sbcglobal.net",
        "verizon.net",
        "web.de",
        "yahoo.co.uk",
        "yahoo.com",
        "yandex.ru",
        "ymail.com",
        "zoho.com",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Default, Clone)]
pub struct FreeDomainList {
    extra: HashSet<String>,
}

impl FreeDomainList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds domains from a list with one entry per line. Blank lines and `#`
    /// comments are skipped.
    pub fn extend_from_str(&mut self, list: &str) {
        let domains = list
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .map(str::to_ascii_lowercase);
        self.extra.extend(domains);
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut list = Self::new();
        list.extend_from_str(&content);
        log::debug!(
            "Loaded {} extra free email domains from {}",
            list.extra.len(),
            path.display()
        );
        Ok(list)
    }
}

impl FreeEmailClassifier for FreeDomainList {
    fn is_free(&self, domain: &str) -> bool {
        let domain = domain.trim().to_ascii_lowercase();
        BUILTIN_FREE_DOMAINS.contains(domain.as_str()) || self.extra.contains(&domain)
    }
}
