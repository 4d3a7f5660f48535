//! Per-game chat: participant-only history, posting and live fan-out.

use tokio::sync::broadcast;
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    dao::models::{GameRecord, NewChatMessage},
    dto::{
        chat::{ChatHistoryResponse, ChatMessageDto, PostMessageRequest, PostMessageResponse},
        sse::ServerEvent,
    },
    error::ServiceError,
    state::SharedState,
};

/// SSE event name carrying a newly persisted message.
pub const MESSAGE_EVENT: &str = "message";

async fn participant_game(
    state: &SharedState,
    game_id: i64,
    user_id: i64,
) -> Result<GameRecord, ServiceError> {
    let Some(record) = state.store().find_game(game_id).await? else {
        return Err(ServiceError::NotFound("Game not found".into()));
    };
    if !record.is_participant(user_id) {
        return Err(ServiceError::Forbidden(
            "You are not a participant in this game".into(),
        ));
    }
    Ok(record)
}

/// Every message of the game, oldest first. Participants only.
pub async fn list_messages(
    state: &SharedState,
    game_id: i64,
    user_id: i64,
) -> Result<ChatHistoryResponse, ServiceError> {
    participant_game(state, game_id, user_id).await?;

    let messages = state.store().list_messages(game_id).await?;
    Ok(ChatHistoryResponse {
        messages: messages.into_iter().map(ChatMessageDto::from).collect(),
    })
}

/// Persist a message, then hand it to the live subscribers of the game.
///
/// Membership is checked before the message body.
pub async fn post_message(
    state: &SharedState,
    game_id: i64,
    user_id: i64,
    request: PostMessageRequest,
) -> Result<PostMessageResponse, ServiceError> {
    participant_game(state, game_id, user_id).await?;

    if request
        .message
        .as_deref()
        .is_none_or(|text| text.trim().is_empty())
    {
        return Err(ServiceError::InvalidInput("Missing message content".into()));
    }
    request.validate()?;
    let message_text = request.message.unwrap_or_default().trim().to_string();

    let stored = state
        .store()
        .append_message(NewChatMessage {
            game_id,
            user_id,
            message_text,
        })
        .await?;
    let chat_message = ChatMessageDto::from(stored);

    match ServerEvent::json(Some(MESSAGE_EVENT.to_string()), &chat_message) {
        Ok(event) => state.chat().publish(game_id, event),
        Err(err) => warn!(game_id, error = %err, "failed to serialize chat event"),
    }
    debug!(game_id, user_id, message_id = chat_message.message_id, "chat message posted");

    Ok(PostMessageResponse {
        message: "Message sent successfully".into(),
        chat_message,
    })
}

/// Subscribe a participant to the messages posted from now on.
pub async fn subscribe(
    state: &SharedState,
    game_id: i64,
    user_id: i64,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    participant_game(state, game_id, user_id).await?;
    Ok(state.chat().subscribe(game_id))
}
