//! Account domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Domain model representing an account in the system.
///
/// An account owns exactly one position set; its positions are only ever
/// mutated through the holdings service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewAccount {
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email,
        }
    }

    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if let Some(email) = &self.email {
            if !is_plausible_email(email.trim()) {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Invalid email address '{}'",
                    email
                ))));
            }
        }
        Ok(())
    }

    /// Returns a copy with surrounding whitespace removed and the email
    /// lower-cased, which is the form stored and matched against.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        self
    }
}

fn is_plausible_email(email: &str) -> bool {
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
