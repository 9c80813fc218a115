//! Entity module - Contains all SeaORM entity definitions for the database.
//! Game state is never persisted; only wallets and leveling progress have tables.

pub mod economy;
pub mod user;

pub use economy::{Column as EconomyColumn, Entity as Economy, Model as EconomyModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
