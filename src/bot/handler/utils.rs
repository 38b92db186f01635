use teloxide::{payloads::SendMessage, prelude::*, requests::JsonRequest};

use crate::bot::{config::Config, messenger::RequestContext};

/* Common utilites for handlers. */

// Sends a message back to the chat the command came from.
pub fn send_bot_message(bot: &Bot, msg: &Message, text: String) -> JsonRequest<SendMessage> {
    bot.send_message(msg.chat.id, text)
}

// The request context of a command message, used to notify and clean up.
pub fn request_context(msg: &Message) -> RequestContext {
    RequestContext {
        channel_id: msg.chat.id.0.to_string(),
        message_id: msg.id.0,
    }
}

/* Checks if the sender of a message may run privileged commands.
 * Service messages and anonymous senders are never admins.
 */
pub fn assert_admin(config: &Config, msg: &Message) -> bool {
    match msg.from() {
        Some(user) => config.is_admin(user.id.0),
        None => false,
    }
}
