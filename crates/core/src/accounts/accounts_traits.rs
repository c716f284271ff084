//! Account repository and service traits.
//!
//! These traits define the contract for account operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::accounts_model::{Account, NewAccount};
use crate::errors::Result;

/// Trait defining the contract for Account repository operations.
///
/// Implementations of this trait handle the persistence of account data.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Creates a new account. An empty position set is implied.
    async fn create(&self, new_account: NewAccount) -> Result<Account>;

    /// Deletes an account and its positions.
    ///
    /// Returns the number of deleted account records.
    async fn delete(&self, account_id: &str) -> Result<usize>;

    /// Retrieves an account by its ID. Fails with `Error::NotFound` when absent.
    fn get_by_id(&self, account_id: &str) -> Result<Account>;

    /// Looks up an account by its (normalized) email.
    fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Lists all accounts ordered by name.
    fn list(&self) -> Result<Vec<Account>>;
}

/// Trait defining the contract for Account service operations.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Creates a new account with business validation.
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;

    /// Deletes an account. Fails with `Error::NotFound` for unknown ids.
    async fn delete_account(&self, account_id: &str) -> Result<()>;

    /// Retrieves an account by ID.
    fn get_account(&self, account_id: &str) -> Result<Account>;

    /// Retrieves an account by email, if one is registered.
    fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Lists all accounts.
    fn list_accounts(&self) -> Result<Vec<Account>>;
}
