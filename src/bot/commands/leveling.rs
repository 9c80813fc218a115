//! Leveling commands - personal stats and the server leaderboard.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::leveling,
        errors::{Error, Result},
    };
    use poise::serenity_prelude::{self as serenity, CreateEmbed};
    use std::fmt::Write;

    const LEADERBOARD_SIZE: u64 = 10;

    /// Shows your level and XP, or someone else's.
    #[poise::command(slash_command, prefix_command)]
    pub async fn stats(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Whose stats to show"] user: Option<serenity::User>,
    ) -> Result<()> {
        let user = user.as_ref().unwrap_or_else(|| ctx.author());
        let progress = leveling::get_progress(&ctx.data().database, &user.id.to_string()).await?;

        let embed = CreateEmbed::new()
            .title(format!("{}'s Stats", user.name))
            .field("Level", progress.level.to_string(), true)
            .field("XP", format!("{} / {}", progress.xp, progress.needed()), true)
            .colour(0x9b59b6);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Displays the top 10 users by level.
    #[poise::command(slash_command, prefix_command)]
    pub async fn leaderboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let rows = leveling::leaderboard(&ctx.data().database, LEADERBOARD_SIZE).await?;
        if rows.is_empty() {
            ctx.say("No leaderboard data yet.").await?;
            return Ok(());
        }

        let mut lines = String::new();
        for (rank, row) in rows.iter().enumerate() {
            writeln!(
                &mut lines,
                "**{}.** <@{}> - Level {} ({} XP)",
                rank + 1,
                row.user_id,
                row.level,
                row.xp
            )?;
        }

        let embed = CreateEmbed::new()
            .title("🏆 Leaderboard")
            .description(lines)
            .colour(0xf1c40f);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
