use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::ChatMessageEntity,
    dto::{format_timestamp, validation::validate_not_blank},
};

/// Longest chat message accepted, in characters.
pub const MAX_MESSAGE_CHARS: u64 = 2000;

/// Body of `POST /api/chat/games/{id}`.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct PostMessageRequest {
    #[validate(
        length(max = 2000, message = "Message must be at most 2000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub message: Option<String>,
}

/// Chat message as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatMessageDto {
    /// Message identifier, increasing in posting order.
    pub message_id: i64,
    /// Game the message belongs to.
    pub game_id: i64,
    /// Author.
    pub user_id: i64,
    /// Author's login name at posting time.
    pub username: String,
    /// Trimmed message body.
    pub message_text: String,
    /// Posting time, RFC 3339.
    pub timestamp: String,
}

impl From<ChatMessageEntity> for ChatMessageDto {
    fn from(message: ChatMessageEntity) -> Self {
        Self {
            message_id: message.id,
            game_id: message.game_id,
            user_id: message.user_id,
            username: message.username,
            message_text: message.message_text,
            timestamp: format_timestamp(message.timestamp),
        }
    }
}

/// Chat history of one game.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatHistoryResponse {
    /// Every message of the game, oldest first.
    pub messages: Vec<ChatMessageDto>,
}

/// Answer to a posted message.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostMessageResponse {
    /// Human-readable outcome.
    pub message: String,
    /// The stored message, as broadcast to subscribers.
    pub chat_message: ChatMessageDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_length_is_bounded() {
        let long = PostMessageRequest {
            message: Some("x".repeat(MAX_MESSAGE_CHARS as usize + 1)),
        };
        let at_limit = PostMessageRequest {
            message: Some("x".repeat(MAX_MESSAGE_CHARS as usize)),
        };
        assert!(long.validate().is_err());
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn whitespace_only_message_is_rejected() {
        let blank = PostMessageRequest {
            message: Some("   ".into()),
        };
        assert!(blank.validate().is_err());
    }
}
