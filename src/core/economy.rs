//! Economy business logic - wallets, timed rewards and coin-flip bets.
//!
//! Every user has one wallet row, created on first use. Rewards and bets run inside a
//! database transaction so the cooldown or balance check and the write can't be split
//! by a concurrent command from the same user.

use crate::{
    config::settings::EconomySettings,
    entities::{Economy, economy},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use std::fmt;

/// Result of a successful reward claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    /// Coins credited
    pub amount: i64,
    /// Wallet balance afterwards
    pub balance: i64,
}

/// Result of a work shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPayout {
    /// Flavour line chosen for this shift
    pub message: String,
    /// Coins and new balance
    pub payout: Payout,
}

/// Coin face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    /// Heads
    Heads,
    /// Tails
    Tails,
}

impl CoinSide {
    /// Parses `h`, `heads`, `t` or `tails`, ignoring case.
    #[must_use]
    pub fn parse(guess: &str) -> Option<Self> {
        match guess.trim().to_lowercase().as_str() {
            "h" | "heads" => Some(Self::Heads),
            "t" | "tails" => Some(Self::Tails),
            _ => None,
        }
    }

    /// Fair flip.
    pub fn flip<R: Rng>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::Heads
        } else {
            Self::Tails
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heads => f.write_str("heads"),
            Self::Tails => f.write_str("tails"),
        }
    }
}

/// Outcome of a coin-flip bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinFlip {
    /// What the user bet on
    pub guess: CoinSide,
    /// What the coin showed
    pub landed: CoinSide,
    /// Stake
    pub amount: i64,
    /// Wallet balance afterwards
    pub balance: i64,
}

impl CoinFlip {
    /// Whether the guess matched.
    #[must_use]
    pub fn won(&self) -> bool {
        self.guess == self.landed
    }
}

#[derive(Debug, Clone, Copy)]
enum Reward {
    Daily,
    Work,
}

/// Returns the user's wallet, creating an empty one on first use.
pub async fn get_or_create_account<C>(db: &C, user_id: &str) -> Result<economy::Model>
where
    C: ConnectionTrait,
{
    let account = economy::ActiveModel {
        user_id: Set(user_id.to_string()),
        balance: Set(0),
        last_daily: Set(None),
        last_work: Set(None),
    };
    Economy::insert(account)
        .on_conflict(
            OnConflict::column(economy::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Economy::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("wallet for {user_id}")).into())
}

/// Current balance; users without a wallet have zero coins and none is created.
pub async fn get_balance(db: &DatabaseConnection, user_id: &str) -> Result<i64> {
    Ok(Economy::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .map_or(0, |account| account.balance))
}

/// Atomically adds `delta` (negative to subtract) to the wallet.
///
/// `UPDATE economy SET balance = balance + delta WHERE user_id = ?`
pub async fn adjust_balance<C>(db: &C, user_id: &str, delta: i64) -> Result<economy::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    Economy::update_many()
        .col_expr(
            economy::Column::Balance,
            Expr::col(economy::Column::Balance).add(delta),
        )
        .filter(economy::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Economy::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("wallet for {user_id}")).into())
}

/// Seconds left before a reward last claimed at `last` can be claimed again.
#[must_use]
pub fn remaining_cooldown(
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown_secs: i64,
) -> Option<i64> {
    let elapsed = now.signed_duration_since(last?).num_seconds();
    let remaining = cooldown_secs - elapsed;
    (remaining > 0).then_some(remaining)
}

/// Formats seconds as `HH:MM:SS`.
#[must_use]
pub fn format_remaining(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Claims the daily reward.
///
/// Fails with [`Error::Cooldown`] when the last claim was less than the configured
/// cooldown ago.
pub async fn claim_daily<R: Rng>(
    db: &DatabaseConnection,
    user_id: &str,
    settings: &EconomySettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Payout> {
    let amount = rng.gen_range(settings.daily_min..=settings.daily_max);
    claim_reward(db, user_id, Reward::Daily, settings, now, amount).await
}

/// Works a shift for a random payout and flavour line.
pub async fn work<R: Rng>(
    db: &DatabaseConnection,
    user_id: &str,
    settings: &EconomySettings,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<WorkPayout> {
    let amount = rng.gen_range(settings.work_min..=settings.work_max);
    let message = if settings.work_messages.is_empty() {
        "You worked hard and earned".to_string()
    } else {
        settings.work_messages[rng.gen_range(0..settings.work_messages.len())].clone()
    };
    let payout = claim_reward(db, user_id, Reward::Work, settings, now, amount).await?;
    Ok(WorkPayout { message, payout })
}

async fn claim_reward(
    db: &DatabaseConnection,
    user_id: &str,
    reward: Reward,
    settings: &EconomySettings,
    now: DateTime<Utc>,
    amount: i64,
) -> Result<Payout> {
    let txn = db.begin().await?;
    let account = get_or_create_account(&txn, user_id).await?;

    let (last, cooldown) = match reward {
        Reward::Daily => (account.last_daily, settings.daily_cooldown_secs),
        Reward::Work => (account.last_work, settings.work_cooldown_secs),
    };
    if let Some(remaining_secs) = remaining_cooldown(last, now, cooldown) {
        return Err(Error::Cooldown { remaining_secs });
    }

    let balance = account.balance + amount;
    let mut active: economy::ActiveModel = account.into();
    active.balance = Set(balance);
    match reward {
        Reward::Daily => active.last_daily = Set(Some(now)),
        Reward::Work => active.last_work = Set(Some(now)),
    }
    active.update(&txn).await?;
    txn.commit().await?;

    tracing::debug!(user_id, ?reward, amount, balance, "Reward claimed");
    Ok(Payout { amount, balance })
}

/// Bets `amount` coins on `guess`.
///
/// The stake must be positive and covered by the wallet. A correct guess adds the
/// stake, a wrong one removes it.
pub async fn coin_flip<R: Rng>(
    db: &DatabaseConnection,
    user_id: &str,
    guess: CoinSide,
    amount: i64,
    rng: &mut R,
) -> Result<CoinFlip> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let landed = CoinSide::flip(rng);

    let txn = db.begin().await?;
    let account = get_or_create_account(&txn, user_id).await?;
    if amount > account.balance {
        return Err(Error::InsufficientFunds {
            current: account.balance,
            required: amount,
        });
    }

    let delta = if landed == guess { amount } else { -amount };
    let balance = adjust_balance(&txn, user_id, delta).await?.balance;
    txn.commit().await?;

    Ok(CoinFlip {
        guess,
        landed,
        amount,
        balance,
    })
}
