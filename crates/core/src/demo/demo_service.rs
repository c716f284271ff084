use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::accounts::{Account, AccountServiceTrait, NewAccount};
use crate::constants::{DEMO_ACCOUNT_EMAIL, DEMO_ACCOUNT_NAME};
use crate::errors::Result;
use crate::portfolio::holdings::{HoldingsServiceTrait, NewAcquisition, Position};

/// Sample holdings given to the demo account: symbol, name, quantity, price.
pub const SAMPLE_HOLDINGS: [(&str, &str, Decimal, Decimal); 5] = [
    ("RELIANCE", "Reliance Industries Ltd", dec!(10), dec!(2500.50)),
    ("TCS", "Tata Consultancy Services", dec!(5), dec!(3200.75)),
    ("INFY", "Infosys Limited", dec!(15), dec!(1450.25)),
    ("HINDUNILVR", "Hindustan Unilever Ltd", dec!(8), dec!(2750.00)),
    ("ICICIBANK", "ICICI Bank Limited", dec!(12), dec!(950.30)),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSeedResult {
    pub account: Account,
    /// False when the demo account already existed.
    pub created: bool,
    pub positions: Vec<Position>,
}

/// Creates the demo account and its sample holdings.
pub struct DemoDataService {
    account_service: Arc<dyn AccountServiceTrait>,
    holdings_service: Arc<dyn HoldingsServiceTrait>,
    seed_lock: Mutex<()>,
}

impl DemoDataService {
    pub fn new(
        account_service: Arc<dyn AccountServiceTrait>,
        holdings_service: Arc<dyn HoldingsServiceTrait>,
    ) -> Self {
        Self {
            account_service,
            holdings_service,
            seed_lock: Mutex::new(()),
        }
    }

    /// Seeds the demo account. Running it again returns the existing account
    /// and only adds sample holdings that are missing from it.
    pub async fn seed_demo_account(&self) -> Result<DemoSeedResult> {
        let _guard = self.seed_lock.lock().await;

        let (account, created) = match self.account_service.find_account_by_email(DEMO_ACCOUNT_EMAIL)? {
            Some(account) => (account, false),
            None => self.create_demo_account().await?,
        };

        let held: HashSet<String> = self
            .holdings_service
            .get_positions(&account.id)?
            .into_iter()
            .map(|p| p.symbol)
            .collect();

        let mut added = 0;
        for (symbol, name, quantity, price) in SAMPLE_HOLDINGS {
            if held.contains(symbol) {
                continue;
            }
            self.holdings_service
                .acquire(NewAcquisition {
                    account_id: account.id.clone(),
                    symbol: symbol.to_string(),
                    display_name: name.to_string(),
                    quantity,
                    price,
                })
                .await?;
            added += 1;
        }

        let positions = self.holdings_service.get_positions(&account.id)?;
        if added > 0 {
            info!(
                "Seeded demo account {} with {} sample positions",
                account.id, added
            );
        }
        Ok(DemoSeedResult {
            account,
            created,
            positions,
        })
    }

    /// Creates the demo account. Another process may create it first; in that
    /// case the stored account is returned with `created = false`.
    async fn create_demo_account(&self) -> Result<(Account, bool)> {
        let result = self
            .account_service
            .create_account(NewAccount::new(
                DEMO_ACCOUNT_NAME,
                Some(DEMO_ACCOUNT_EMAIL.to_string()),
            ))
            .await;

        match result {
            Ok(account) => Ok((account, true)),
            Err(err) => match self.account_service.find_account_by_email(DEMO_ACCOUNT_EMAIL)? {
                Some(account) => {
                    warn!("Demo account was created concurrently: {}", err);
                    Ok((account, false))
                }
                None => Err(err),
            },
        }
    }
}
