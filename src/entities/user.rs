//! User entity - leveling progress, one row per Discord user.
//!
//! `xp` is the progress inside the current level, not a lifetime total; it resets
//! whenever a level is completed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Leveling database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Discord user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// XP earned towards the next level
    pub xp: i64,
    /// Levels completed so far
    pub level: i64,
}

/// Users have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
