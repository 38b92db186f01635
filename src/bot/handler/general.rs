use teloxide::{prelude::*, utils::command::BotCommands};

use crate::bot::dispatcher::{Command, HandlerResult};

use super::{
    constants::{COMMAND_HELP, COMMAND_PAYOUT, COMMAND_WIPE},
    utils::send_bot_message,
};

/* Start command.
 * Displays a welcome message to the user.
 */
pub async fn action_start(bot: Bot, msg: Message) -> HandlerResult {
    let introduction = "🤠 Howdy! I'm RanchScribe!\n\n🥛 I pay out your ranch hands for every bottle of milk and basket of eggs they bring in.";
    let payout_info = format!("💰 Run {COMMAND_PAYOUT} at the end of a tracking period, and I'll post everyone's earnings to the ranch payout channels. Stats are wiped right after, but I always keep a backup!");
    let wipe_info = format!("🧹 Need a clean slate without paying out? That's {COMMAND_WIPE}.");
    let closing = format!("📖 Ask me for {COMMAND_HELP} anytime!");
    send_bot_message(
        &bot,
        &msg,
        format!("{introduction}\n\n{payout_info}\n\n{wipe_info}\n\n{closing}"),
    )
    .await?;
    Ok(())
}

/* Help command.
 * Displays a list of commands available to the user.
 */
pub async fn action_help(bot: Bot, msg: Message) -> HandlerResult {
    let commands = Command::descriptions().to_string();
    send_bot_message(&bot, &msg, format!("⭐️ My Commands ⭐️\n\n{commands}")).await?;
    Ok(())
}
