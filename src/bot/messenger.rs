use async_trait::async_trait;
use teloxide::{
    payloads::SendMessageSetters,
    prelude::*,
    types::{MessageId, ParseMode, Recipient},
    ApiError, RequestError,
};

/* Messenger is the bot's outbound link to the chat platform.
 * The processor only ever talks to the platform through this trait, which
 * keeps the payout workflow runnable against an in-memory messenger in tests.
 */

#[derive(thiserror::Error, Debug)]
pub enum MessengerError {
    #[error("Message not found")]
    MessageNotFound,
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),
    #[error("Request error: {0}")]
    RequestError(RequestError),
}

// Telegram reports an already deleted message as its own API error.
impl From<RequestError> for MessengerError {
    fn from(request_error: RequestError) -> MessengerError {
        match request_error {
            RequestError::Api(ApiError::MessageToDeleteNotFound) => MessengerError::MessageNotFound,
            other => MessengerError::RequestError(other),
        }
    }
}

// A sent message, identified well enough to delete it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: String,
    pub message_id: i32,
}

// The invoking command message. Notices are sent back to its channel.
pub type RequestContext = MessageHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Preformatted(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub title: Option<String>,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        channel_id: &str,
        content: Content,
    ) -> Result<MessageHandle, MessengerError>;

    async fn delete_message(&self, message: &MessageHandle) -> Result<(), MessengerError>;

    // Looks up a channel the bot can post in. None if it is gone or inaccessible.
    async fn resolve_channel(&self, channel_id: &str) -> Option<Channel>;
}

/* Parses a configured channel identifier.
 * Numeric identifiers are chat ids, anything else is a public channel username.
 */
pub fn parse_recipient(channel_id: &str) -> Result<Recipient, MessengerError> {
    let channel_id = channel_id.trim();
    if let Ok(id) = channel_id.parse::<i64>() {
        Ok(Recipient::Id(ChatId(id)))
    } else if channel_id.starts_with('@') && channel_id.len() > 1 {
        Ok(Recipient::ChannelUsername(channel_id.to_string()))
    } else {
        Err(MessengerError::InvalidChannel(channel_id.to_string()))
    }
}

// Only '\' and '`' need escaping inside a MarkdownV2 code block.
fn escape_code_block(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`")
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> TelegramMessenger {
        TelegramMessenger { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_message(
        &self,
        channel_id: &str,
        content: Content,
    ) -> Result<MessageHandle, MessengerError> {
        let recipient = parse_recipient(channel_id)?;
        let sent = match content {
            Content::Text(text) => self.bot.send_message(recipient, text).await?,
            Content::Preformatted(text) => {
                self.bot
                    .send_message(recipient, format!("```\n{}\n```", escape_code_block(&text)))
                    .parse_mode(ParseMode::MarkdownV2)
                    .await?
            }
        };

        Ok(MessageHandle {
            channel_id: sent.chat.id.0.to_string(),
            message_id: sent.id.0,
        })
    }

    async fn delete_message(&self, message: &MessageHandle) -> Result<(), MessengerError> {
        let recipient = parse_recipient(&message.channel_id)?;
        self.bot
            .delete_message(recipient, MessageId(message.message_id))
            .await?;
        Ok(())
    }

    async fn resolve_channel(&self, channel_id: &str) -> Option<Channel> {
        let recipient = parse_recipient(channel_id).ok()?;
        match self.bot.get_chat(recipient).await {
            Ok(chat) => Some(Channel {
                id: chat.id.0.to_string(),
                title: chat.title().map(|title| title.to_string()),
            }),
            Err(err) => {
                log::debug!("Failed to resolve channel {}: {}", channel_id, err);
                None
            }
        }
    }
}

/* In-memory messenger for tests.
 * Knows a fixed set of channels, records everything sent and deleted.
 */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipient() {
        assert_eq!(
            parse_recipient("-1001234567890").unwrap(),
            Recipient::Id(ChatId(-1001234567890))
        );
        assert_eq!(
            parse_recipient("@ranch_payouts").unwrap(),
            Recipient::ChannelUsername("@ranch_payouts".to_string())
        );
        assert!(matches!(
            parse_recipient("payouts"),
            Err(MessengerError::InvalidChannel(_))
        ));
        assert!(matches!(
            parse_recipient("@"),
            Err(MessengerError::InvalidChannel(_))
        ));
    }

    #[test]
    fn test_escape_code_block() {
        assert_eq!(escape_code_block("a`b\\c"), "a\\`b\\\\c");
        assert_eq!(escape_code_block("🤠 @Alice: $17.50"), "🤠 @Alice: $17.50");
    }

    #[test]
    fn test_message_not_found_error() {
        let error = MessengerError::from(RequestError::Api(ApiError::MessageToDeleteNotFound));
        assert!(matches!(error, MessengerError::MessageNotFound));

        let error = MessengerError::from(RequestError::Api(ApiError::BotBlocked));
        assert!(matches!(error, MessengerError::RequestError(_)));
    }
}
