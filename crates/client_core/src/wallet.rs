use std::sync::LazyLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;
use shared::domain::{Activity, RedemptionId};
use storage::{Storage, StoredRedemption};
use tracing::info;

use crate::error::WalletError;

pub const STARTING_BALANCE: u64 = 1350;
pub const MIN_REDEEM_BALANCE: u64 = 100;
pub const REDEMPTION_COST: u64 = 1000;
/// Coins needed for the next reward, a free metro ride.
pub const NEXT_REWARD_COINS: u64 = 1500;
/// Rupees per 1000 coins.
const CASH_PER_THOUSAND: f64 = 50.0;
const TOKEN_PREFIX: &str = "AS";
const TOKEN_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

static TOKEN_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AS-[0-9A-Z]{4}-\d{4}$").expect("token regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub id: RedemptionId,
    pub token: String,
    pub coins_spent: u64,
    pub balance_after: u64,
}

/// `AS-XXXX-NNNN`: four base-36 characters and a zero-padded number.
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    let code: String = (0..4)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect();
    let number = rng.gen_range(0..10_000);
    format!("{TOKEN_PREFIX}-{code}-{number:04}")
}

pub fn is_token_format(token: &str) -> bool {
    TOKEN_FORMAT.is_match(token)
}

/// Coin balance earned through low-emission travel. Every change is written
/// to storage before it becomes visible.
pub struct EcoWallet {
    storage: Storage,
    coins: u64,
}

impl EcoWallet {
    pub async fn load(storage: Storage) -> Result<Self, WalletError> {
        let coins = storage.load_coins().await?.unwrap_or(STARTING_BALANCE);
        Ok(Self { storage, coins })
    }

    pub fn balance(&self) -> u64 {
        self.coins
    }

    pub fn cash_value(&self) -> f64 {
        self.coins as f64 / 1000.0 * CASH_PER_THOUSAND
    }

    pub fn progress_to_next_reward(&self) -> f64 {
        (self.coins as f64 / NEXT_REWARD_COINS as f64).min(1.0)
    }

    pub async fn earn(&mut self, activity: Activity) -> Result<u64, WalletError> {
        let coins = self.coins.saturating_add(activity.reward());
        self.storage.save_coins(coins).await?;
        self.coins = coins;
        info!(?activity, reward = activity.reward(), balance = coins, "coins earned");
        Ok(coins)
    }

    pub async fn redeem(&mut self) -> Result<Redemption, WalletError> {
        let token = generate_token(&mut rand::thread_rng());
        self.commit_redemption(token).await
    }

    pub async fn redeem_with<R: Rng + Send + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Redemption, WalletError> {
        let token = generate_token(rng);
        self.commit_redemption(token).await
    }

    pub async fn history(&self, limit: u32) -> Result<Vec<StoredRedemption>, WalletError> {
        Ok(self.storage.list_redemptions(limit).await?)
    }

    async fn commit_redemption(&mut self, token: String) -> Result<Redemption, WalletError> {
        if self.coins < MIN_REDEEM_BALANCE {
            return Err(WalletError::InsufficientBalance {
                balance: self.coins,
                minimum: MIN_REDEEM_BALANCE,
            });
        }
        let balance_after = self.coins.saturating_sub(REDEMPTION_COST);
        let coins_spent = self.coins - balance_after;
        let id = self
            .storage
            .record_redemption(&token, coins_spent, balance_after, Utc::now())
            .await?;
        self.coins = balance_after;
        info!(%token, coins_spent, balance = balance_after, "coins redeemed");
        Ok(Redemption {
            id,
            token,
            coins_spent,
            balance_after,
        })
    }
}

#[cfg(test)]
#[path = "tests/wallet_tests.rs"]
mod tests;
