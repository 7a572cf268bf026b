//! Interaction endpoint.
//!
//! Commands that touch channel history are acknowledged immediately and run
//! on a background task; Discord expects an answer within three seconds.

use axum::{body::Bytes, extract::State, Json};
use tracing::{info, warn};

use keeper_core::ReportKind;
use keeper_discord::commands::{names, EMAIL_LIST_OPTION};

use crate::error::{ApiError, Result};
use crate::interaction::{
    parse_email_list, Interaction, InteractionResponse, APPLICATION_COMMAND, PING,
};
use crate::state::AppState;

/// POST /interactions - Discord interaction webhook.
///
/// The signature middleware has already checked the body.
pub async fn interactions(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InteractionResponse>> {
    let interaction: Interaction = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid interaction: {}", e)))?;

    info!(
        id = %interaction.id,
        kind = interaction.kind,
        command = ?interaction.command_name(),
        "interaction received"
    );

    match interaction.kind {
        PING => Ok(Json(InteractionResponse::pong())),
        APPLICATION_COMMAND => Ok(Json(dispatch_command(&state, &interaction))),
        other => Err(ApiError::BadRequest(format!(
            "unsupported interaction type: {}",
            other
        ))),
    }
}

fn dispatch_command(state: &AppState, interaction: &Interaction) -> InteractionResponse {
    match interaction.command_name() {
        Some(names::TEST) => InteractionResponse::message(format!(
            "Scene Keeper is online! Hello, {}.",
            interaction.invoker_name()
        )),
        Some(names::CLEAN) => handle_clean(state, interaction),
        Some(names::TRANSCRIBE) => handle_export(state, interaction, ReportKind::Transcription),
        Some(names::ARCHIVE) => handle_export(state, interaction, ReportKind::Archive),
        Some(other) => {
            warn!(command = other, "unknown command");
            InteractionResponse::message(format!("Unknown command: {}", other))
        }
        None => InteractionResponse::message("Unknown command"),
    }
}

fn handle_clean(state: &AppState, interaction: &Interaction) -> InteractionResponse {
    let user = interaction.invoker_name();
    let Some(ctx) = interaction.context() else {
        return InteractionResponse::message(format!(
            "Clean command received from user {}! But the channel could not be determined.",
            user
        ));
    };

    state.keeper.spawn_clean(ctx);

    InteractionResponse::message(format!(
        "Clean command received from user {}! Preparing to clear non-pinned messages.",
        user
    ))
}

/// Transcribe and archive share everything but wording.
fn handle_export(
    state: &AppState,
    interaction: &Interaction,
    kind: ReportKind,
) -> InteractionResponse {
    let user = interaction.invoker_name();
    let command = match kind {
        ReportKind::Transcription => "Transcribe",
        ReportKind::Archive => "Archive",
    };

    let recipients = interaction
        .option_str(EMAIL_LIST_OPTION)
        .map(parse_email_list)
        .unwrap_or_default();
    if recipients.is_empty() {
        return InteractionResponse::message(format!(
            "{} command received from user {}! But no email recipients were provided.",
            command, user
        ));
    }

    let ctx = match interaction.context() {
        Some(ctx) if ctx.guild_id.is_some() => ctx,
        _ => {
            return InteractionResponse::message(format!(
                "{} command received from user {}! But it only works in a server channel.",
                command, user
            ))
        }
    };

    state.keeper.spawn_transcribe(ctx, kind, recipients);

    InteractionResponse::message(format!(
        "{} command received from user {}! Preparing to email message log.",
        command, user
    ))
}
