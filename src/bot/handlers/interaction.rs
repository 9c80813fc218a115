//! Board button presses.
//!
//! Every component interaction reaches this handler; presses whose custom id is not a
//! board id (challenge prompts, for instance) are left to their own collectors.

use crate::{
    bot::{BotData, render},
    errors::{Error, Result},
};
use poise::serenity_prelude::{
    self as serenity, ComponentInteraction, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use tracing::{debug, instrument};

/// Framework event hook.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    if let serenity::FullEvent::InteractionCreate {
        interaction: serenity::Interaction::Component(component),
    } = event
    {
        handle_board_press(ctx, component, data).await?;
    }
    Ok(())
}

/// Routes a board press to the registry and answers with the new board, or with an
/// ephemeral explanation when the move was refused.
#[instrument(skip_all, fields(user_id = component.user.id.get(), cid = %component.data.custom_id))]
pub async fn handle_board_press(
    ctx: &serenity::Context,
    component: &ComponentInteraction,
    data: &BotData,
) -> Result<()> {
    let Some(press) = render::parse_board_custom_id(&component.data.custom_id) else {
        return Ok(());
    };

    let channel = component.channel_id.get();
    let result = data
        .games
        .submit_move(channel, press.game_id, component.user.id.get(), press.mv)
        .await;

    let response = match result {
        Ok(snapshot) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .embed(render::board_embed(&snapshot))
                .components(render::board_components(&snapshot)),
        ),
        Err(e) => {
            debug!(error = %e, "Move refused");
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(e.to_string())
                    .ephemeral(true),
            )
        }
    };
    component.create_response(ctx, response).await?;
    Ok(())
}
