//! Leveling - XP earned by using commands, with a quadratic level curve.
//!
//! Completing level `L` costs `5L² + 50L + 100` XP. Leftover XP carries into the next
//! level, so one large award can complete several levels at once.

use crate::{
    config::settings::LevelingSettings,
    entities::{User, user},
    errors::Result,
};
use rand::Rng;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::OnConflict};

/// XP needed to complete `level`.
#[must_use]
pub const fn xp_needed(level: i64) -> i64 {
    5 * level * level + 50 * level + 100
}

/// A user's position on the level curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Levels completed
    pub level: i64,
    /// XP inside the current level
    pub xp: i64,
}

impl Progress {
    /// XP needed to finish the current level.
    #[must_use]
    pub const fn needed(self) -> i64 {
        xp_needed(self.level)
    }

    /// Adds `amount` XP, completing as many levels as it covers.
    ///
    /// Returns the new progress and how many levels were completed.
    #[must_use]
    pub const fn gain(self, amount: i64) -> (Self, i64) {
        let mut level = self.level;
        let mut xp = self.xp + amount;
        let mut levels = 0;
        while xp >= xp_needed(level) {
            xp -= xp_needed(level);
            level += 1;
            levels += 1;
        }
        (Self { level, xp }, levels)
    }
}

/// Result of an XP award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpGain {
    /// XP added
    pub amount: i64,
    /// Progress afterwards
    pub progress: Progress,
    /// Levels completed by this award
    pub levels_gained: i64,
}

impl XpGain {
    /// Whether the award completed at least one level.
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Current progress; users who never earned XP are at level 0.
pub async fn get_progress(db: &DatabaseConnection, user_id: &str) -> Result<Progress> {
    Ok(User::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .map_or_else(Progress::default, |row| Progress {
            level: row.level,
            xp: row.xp,
        }))
}

/// Adds `amount` XP to the user, creating their row on first use.
pub async fn add_xp(db: &DatabaseConnection, user_id: &str, amount: i64) -> Result<XpGain> {
    let txn = db.begin().await?;

    let fresh = user::ActiveModel {
        user_id: Set(user_id.to_string()),
        xp: Set(0),
        level: Set(0),
    };
    User::insert(fresh)
        .on_conflict(OnConflict::column(user::Column::UserId).do_nothing().to_owned())
        .exec_without_returning(&txn)
        .await?;
    let row = User::find_by_id(user_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("level row for {user_id}")))?;

    let current = Progress {
        level: row.level,
        xp: row.xp,
    };
    let (progress, levels_gained) = current.gain(amount);

    let mut active: user::ActiveModel = row.into();
    active.xp = Set(progress.xp);
    active.level = Set(progress.level);
    active.update(&txn).await?;
    txn.commit().await?;

    if levels_gained > 0 {
        tracing::info!(user_id, level = progress.level, "Level up");
    }
    Ok(XpGain {
        amount,
        progress,
        levels_gained,
    })
}

/// Awards a random amount of XP from the configured range.
pub async fn award_command_xp<R: Rng>(
    db: &DatabaseConnection,
    user_id: &str,
    settings: &LevelingSettings,
    rng: &mut R,
) -> Result<XpGain> {
    let amount = rng.gen_range(settings.xp_min..=settings.xp_max);
    add_xp(db, user_id, amount).await
}

/// Highest levels first, ties broken by XP.
pub async fn leaderboard(db: &DatabaseConnection, limit: u64) -> Result<Vec<user::Model>> {
    Ok(User::find()
        .order_by_desc(user::Column::Level)
        .order_by_desc(user::Column::Xp)
        .limit(limit)
        .all(db)
        .await?)
}
