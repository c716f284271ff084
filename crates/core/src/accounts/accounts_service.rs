use log::{debug, info};
use std::sync::Arc;

use super::accounts_model::{Account, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::{Error, Result, ValidationError};

/// Service for managing accounts
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        let new_account = new_account.normalized();
        new_account.validate()?;

        if let Some(email) = new_account.email.as_deref() {
            if self.repository.find_by_email(email)?.is_some() {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "An account with email '{}' already exists",
                    email
                ))));
            }
        }

        debug!("Creating account '{}'", new_account.name);
        let account = self.repository.create(new_account).await?;
        info!("Created account {}", account.id);
        Ok(account)
    }

    async fn delete_account(&self, account_id: &str) -> Result<()> {
        let deleted = self.repository.delete(account_id).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Account {}", account_id)));
        }
        info!("Deleted account {}", account_id);
        Ok(())
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(account_id)
    }

    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.repository.find_by_email(&email.trim().to_lowercase())
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.repository.list()
    }
}
