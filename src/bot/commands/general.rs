//! General Discord commands - ping, help, and a few chance toys and party prompts.
//! This module contains simple commands that don't require database operations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };
    use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

    const EIGHT_BALL_ANSWERS: &[&str] = &[
        "Yes.",
        "No.",
        "Maybe.",
        "Definitely!",
        "Ask again later.",
        "Without a doubt.",
        "Don't count on it.",
        "My sources say no.",
    ];

    const JOKES: &[&str] = &[
        "Why don't skeletons fight each other? They don't have the guts.",
        "Parallel lines have so much in common. It's a shame they'll never meet.",
        "I'm reading a book on anti-gravity. It's impossible to put down!",
    ];

    const TRUTHS: &[&str] = &[
        "What's the most embarrassing thing you've ever done?",
        "What's a secret you've never told anyone?",
        "What's your biggest fear?",
        "When was the last time you lied?",
        "What's the biggest mistake you've ever made?",
        "What's your worst habit?",
        "What's the biggest misconception about you?",
        "What TV/Movie/Anime character do you relate to the most?",
        "What's the weirdest lie you've ever told?",
        "What's the weirdest habit you have when you're alone?",
    ];

    const DARES: &[&str] = &[
        "Send a screenshot of your home screen.",
        "Talk in rhymes for the next 5 minutes.",
        "Send the 5th picture from your gallery.",
        "Use only emojis to talk for the next 10 minutes.",
        "Text your best friend and ask, 'u up?'",
    ];

    fn pick(lines: &[&'static str]) -> &'static str {
        lines
            .choose(&mut StdRng::from_entropy())
            .copied()
            .unwrap_or_default()
    }

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let p = &ctx.data().settings.prefix;
        let help_text = format!(
            "**Guild Arcade Help**\n\
            Every command works with the `{p}` prefix or as a slash command.\n\n\
            **Games**\n\
            • `{p}tictactoe @user` - Challenge someone to Tic Tac Toe.\n\
            • `{p}connect4 @user` - Challenge someone to Connect 4.\n\
            • `{p}stopgame` - Stop the game in this channel (players only).\n\n\
            **Economy**\n\
            • `{p}balance [@user]` - Show a wallet.\n\
            • `{p}daily` - Claim your daily reward.\n\
            • `{p}work` - Work a shift for some coins.\n\
            • `{p}coin <h|t> <amount>` - Bet coins on a coin flip.\n\n\
            **Leveling**\n\
            Every command you use earns a little XP.\n\
            • `{p}stats [@user]` - Show level and XP.\n\
            • `{p}leaderboard` - Top 10 users by level.\n\n\
            **Fun**\n\
            • `{p}coinflip` - Flip a coin.\n\
            • `{p}dice` - Roll a six-sided die.\n\
            • `{p}8ball <question>` - Ask the magic 8-ball.\n\
            • `{p}joke`, `{p}truth`, `{p}dare` - Jokes and party prompts.\n\
            • `{p}ping` - Check if the bot is responsive."
        );

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Flips a coin.
    #[poise::command(slash_command, prefix_command)]
    pub async fn coinflip(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let side = if StdRng::from_entropy().gen_bool(0.5) {
            "Heads"
        } else {
            "Tails"
        };
        ctx.say(format!("🪙 You flipped **{side}**")).await?;
        Ok(())
    }

    /// Rolls a six-sided die.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dice(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let roll = StdRng::from_entropy().gen_range(1..=6);
        ctx.say(format!("🎲 You rolled a **{roll}**")).await?;
        Ok(())
    }

    /// Asks the magic 8-ball a question.
    #[poise::command(slash_command, prefix_command, rename = "8ball")]
    pub async fn eight_ball(
        ctx: poise::Context<'_, BotData, Error>,
        #[rest]
        #[description = "Your question"]
        question: Option<String>,
    ) -> Result<()> {
        if question.as_deref().is_none_or(|q| q.trim().is_empty()) {
            ctx.say("🎱 Please ask a question!").await?;
            return Ok(());
        }
        ctx.say(format!("🎱 {}", pick(EIGHT_BALL_ANSWERS))).await?;
        Ok(())
    }

    /// Tells a random joke.
    #[poise::command(slash_command, prefix_command)]
    pub async fn joke(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(format!("😂 {}", pick(JOKES))).await?;
        Ok(())
    }

    /// Gives you a random truth question.
    #[poise::command(slash_command, prefix_command)]
    pub async fn truth(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(format!("🤔 **Truth**: {}", pick(TRUTHS))).await?;
        Ok(())
    }

    /// Gives you a random dare.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dare(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(format!("😈 **Dare**: {}", pick(DARES))).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
