//! Lead capture. The "get the full report" form shown under every HTML
//! report posts here.
//!
//! Inquiries live in process memory only; a restart forgets them. The store
//! holds at most `capacity` entries and refuses new ones once full.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::config::DEFAULT_MAX_INQUIRIES;

pub const MAX_NAME_CHARS: usize = 200;
pub const MAX_EMAIL_CHARS: usize = 254;
pub const MAX_COMPANY_CHARS: usize = 200;
pub const MAX_URL_CHARS: usize = 2_048;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InquiryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    /// Page the visitor was looking at when they filled in the form.
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: String,
    pub url: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InquiryError {
    #[error("name is required")]
    MissingName,

    #[error("email is required")]
    MissingEmail,

    #[error("email address is not valid: {0}")]
    InvalidEmail(String),

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("inquiry store is full ({0} entries)")]
    StoreFull(usize),
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), InquiryError> {
    if value.chars().count() > max {
        return Err(InquiryError::TooLong { field, max });
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

impl InquiryForm {
    /// Trimmed copy, or the first validation failure.
    pub fn validated(&self) -> Result<InquiryForm, InquiryError> {
        let form = InquiryForm {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            company: self.company.trim().to_string(),
            url: self.url.trim().to_string(),
        };
        check_len("name", &form.name, MAX_NAME_CHARS)?;
        check_len("email", &form.email, MAX_EMAIL_CHARS)?;
        check_len("company", &form.company, MAX_COMPANY_CHARS)?;
        check_len("url", &form.url, MAX_URL_CHARS)?;
        if form.name.is_empty() {
            return Err(InquiryError::MissingName);
        }
        if form.email.is_empty() {
            return Err(InquiryError::MissingEmail);
        }
        if !looks_like_email(&form.email) {
            return Err(InquiryError::InvalidEmail(form.email));
        }
        Ok(form)
    }
}

#[derive(Debug)]
pub struct InquiryStore {
    inquiries: RwLock<Vec<Inquiry>>,
    capacity: usize,
}

impl Default for InquiryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_INQUIRIES)
    }
}

impl InquiryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inquiries: RwLock::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn submit(&self, form: &InquiryForm) -> Result<Inquiry, InquiryError> {
        let form = form.validated()?;
        let inquiry = Inquiry {
            id: Uuid::new_v4(),
            name: form.name,
            email: form.email,
            company: form.company,
            url: form.url,
            received_at: Utc::now(),
        };
        {
            let mut inquiries = self.inquiries.write().await;
            if inquiries.len() >= self.capacity {
                warn!("Inquiry store full ({} entries), refusing submission", self.capacity);
                return Err(InquiryError::StoreFull(self.capacity));
            }
            inquiries.push(inquiry.clone());
        }
        info!("Inquiry {} received for {}", inquiry.id, inquiry.url);
        Ok(inquiry)
    }

    /// Snapshot in submission order.
    pub async fn list(&self) -> Vec<Inquiry> {
        self.inquiries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inquiries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inquiries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str) -> InquiryForm {
        InquiryForm {
            name: name.to_string(),
            email: email.to_string(),
            company: " Acme ".to_string(),
            url: "https://example.com/".to_string(),
        }
    }

    #[test]
    fn test_validation() {
        assert_eq!(form("  ", "a@b.c").validated().unwrap_err(), InquiryError::MissingName);
        assert_eq!(form("Ann", " ").validated().unwrap_err(), InquiryError::MissingEmail);
        assert!(matches!(
            form("Ann", "ann.example.com").validated(),
            Err(InquiryError::InvalidEmail(_))
        ));
        assert!(matches!(
            form("Ann", "ann@").validated(),
            Err(InquiryError::InvalidEmail(_))
        ));
        assert!(matches!(
            form("Ann", "a n@example.com").validated(),
            Err(InquiryError::InvalidEmail(_))
        ));

        let ok = form(" Ann ", " ann@example.com ").validated().unwrap();
        assert_eq!(ok.name, "Ann");
        assert_eq!(ok.email, "ann@example.com");
        assert_eq!(ok.company, "Acme");
    }

    #[tokio::test]
    async fn test_store_keeps_submission_order() {
        let store = InquiryStore::new();
        assert!(store.is_empty().await);

        let first = store.submit(&form("Ann", "ann@example.com")).await.unwrap();
        let second = store.submit(&form("Bo", "bo@example.com")).await.unwrap();
        assert_ne!(first.id, second.id);

        let all = store.list().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Ann");
        assert_eq!(all[1].name, "Bo");
    }

    #[test]
    fn test_oversized_fields_are_rejected() {
        let mut long_company = form("Ann", "ann@example.com");
        long_company.company = "x".repeat(10_000);
        assert_eq!(
            long_company.validated().unwrap_err(),
            InquiryError::TooLong {
                field: "company",
                max: MAX_COMPANY_CHARS
            }
        );

        let mut long_url = form("Ann", "ann@example.com");
        long_url.url = format!("https://example.com/{}", "a".repeat(MAX_URL_CHARS));
        assert!(matches!(
            long_url.validated(),
            Err(InquiryError::TooLong { field: "url", .. })
        ));

        let mut at_limit = form("Ann", "ann@example.com");
        at_limit.name = "n".repeat(MAX_NAME_CHARS);
        assert!(at_limit.validated().is_ok());
    }

    #[tokio::test]
    async fn test_store_refuses_submissions_past_capacity() {
        let store = InquiryStore::with_capacity(3);
        for i in 0..3 {
            store
                .submit(&form(&format!("Visitor {}", i), "v@example.com"))
                .await
                .unwrap();
        }

        for _ in 0..50 {
            let err = store.submit(&form("Late", "late@example.com")).await.unwrap_err();
            assert_eq!(err, InquiryError::StoreFull(3));
        }

        let all = store.list().await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Visitor 0");
        assert_eq!(all[2].name, "Visitor 2");
    }

    #[tokio::test]
    async fn test_invalid_submission_is_not_stored() {
        let store = InquiryStore::new();
        assert!(store.submit(&form("", "x@y.z")).await.is_err());
        assert_eq!(store.len().await, 0);
    }
}
