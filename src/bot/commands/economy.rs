//! Economy commands - wallets, daily rewards, work shifts and coin-flip bets.
//!
//! Balances live in the database through [`crate::core::economy`]; these commands only
//! parse input and turn outcomes into replies.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::economy::{self, CoinSide},
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude::{self as serenity, CreateEmbed};
    use rand::{SeedableRng, rngs::StdRng};

    /// Shows your wallet, or someone else's.
    #[poise::command(slash_command, prefix_command)]
    pub async fn balance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Whose wallet to show"] user: Option<serenity::User>,
    ) -> Result<()> {
        let user = user.as_ref().unwrap_or_else(|| ctx.author());
        let balance = economy::get_balance(&ctx.data().database, &user.id.to_string()).await?;

        let embed = CreateEmbed::new()
            .colour(0xf1c40f)
            .title(format!("{}'s Wallet", user.name))
            .description(format!("They have **{}** coins.", balance));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Claims your daily reward.
    #[poise::command(slash_command, prefix_command)]
    pub async fn daily(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let mut rng = StdRng::from_entropy();
        let result = economy::claim_daily(
            &data.database,
            &ctx.author().id.to_string(),
            &data.settings.economy,
            Utc::now(),
            &mut rng,
        )
        .await;

        let reply = match result {
            Ok(payout) => format!(
                "🎁 You claimed your daily reward of **{}** coins! You now have **{}**.",
                payout.amount, payout.balance
            ),
            Err(Error::Cooldown { remaining_secs }) => format!(
                "You've already claimed your daily reward. Come back in **{}**.",
                economy::format_remaining(remaining_secs)
            ),
            Err(e) => return Err(e),
        };
        ctx.say(reply).await?;
        Ok(())
    }

    /// Works a shift for some coins.
    #[poise::command(slash_command, prefix_command)]
    pub async fn work(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let mut rng = StdRng::from_entropy();
        let result = economy::work(
            &data.database,
            &ctx.author().id.to_string(),
            &data.settings.economy,
            Utc::now(),
            &mut rng,
        )
        .await;

        let reply = match result {
            Ok(shift) => format!(
                "💼 {} **{}** coins! You now have **{}**.",
                shift.message, shift.payout.amount, shift.payout.balance
            ),
            Err(Error::Cooldown { remaining_secs }) => format!(
                "You're tired from working. Take a break for **{}**.",
                economy::format_remaining(remaining_secs)
            ),
            Err(e) => return Err(e),
        };
        ctx.say(reply).await?;
        Ok(())
    }

    /// Bets coins on a coin flip.
    #[poise::command(slash_command, prefix_command)]
    pub async fn coin(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "heads, tails, h or t"] guess: String,
        #[description = "How many coins to bet"] amount: i64,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(guess) = CoinSide::parse(&guess) else {
            ctx.say(format!(
                "Please guess heads or tails. Usage: `{}coin (h/t) (amt)`.",
                data.settings.prefix
            ))
            .await?;
            return Ok(());
        };

        let mut rng = StdRng::from_entropy();
        let result = economy::coin_flip(
            &data.database,
            &ctx.author().id.to_string(),
            guess,
            amount,
            &mut rng,
        )
        .await;

        let reply = match result {
            Ok(flip) if flip.won() => format!(
                "🪙 It landed on **{}**! You won **{}** coins. You now have **{}**.",
                flip.landed, flip.amount, flip.balance
            ),
            Ok(flip) => format!(
                "🪙 It landed on **{}**. You lost **{}** coins. You now have **{}**.",
                flip.landed, flip.amount, flip.balance
            ),
            Err(Error::InvalidAmount { .. }) => {
                "Please provide a valid, positive amount to bet.".to_string()
            }
            Err(Error::InsufficientFunds { .. }) => {
                "You don't have enough coins to gamble that much.".to_string()
            }
            Err(e) => return Err(e),
        };
        ctx.say(reply).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
