//! Economy entity - one wallet row per Discord user.
//!
//! Rows are created lazily the first time a user touches the economy. Cooldown
//! timestamps stay `None` until the corresponding reward is claimed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "economy")]
pub struct Model {
    /// Discord user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Coins in the wallet
    pub balance: i64,
    /// When the daily reward was last claimed
    pub last_daily: Option<DateTimeUtc>,
    /// When the user last worked
    pub last_work: Option<DateTimeUtc>,
}

/// Wallets have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
