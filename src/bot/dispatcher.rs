use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands, RequestError};

use super::{
    config::Config,
    handler::{action_help, action_payout, action_start, action_wipe},
    messenger::{Messenger, TelegramMessenger},
    processor::{PayoutProcessor, StatsWipe},
    tracking::ConfiguredTracking,
};

/* Dispatcher wires the bot together.
 * It builds the processor and its collaborators from the config, and routes
 * commands to the front-facing handlers.
 */

/* Types */
pub type HandlerResult = Result<(), BotError>;

#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("Request error: {0}")]
    RequestError(RequestError),
}

impl From<RequestError> for BotError {
    fn from(request_error: RequestError) -> BotError {
        BotError::RequestError(request_error)
    }
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Show this help message.")]
    Help,
    #[command(description = "Start the bot.")]
    Start,
    #[command(description = "Pay out all ranches, then wipe their stats.")]
    Payout,
    #[command(description = "Wipe the stats of all ranches.")]
    Wipe,
}

/* Main Dispatch function */
pub async fn run_dispatcher(bot: Bot, config: Config) {
    use dptree::case;

    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot.clone()));
    let wipe = Arc::new(StatsWipe::new(config.ranches.clone(), messenger.clone()));
    let payout = Arc::new(PayoutProcessor::new(
        config.ranches.clone(),
        config.backup_dir.clone(),
        messenger,
        Arc::new(ConfiguredTracking::new(config.tracking.clone())),
        wipe.clone(),
    ));
    log::info!(
        "Loaded {} ranches, backups go to {}",
        config.ranches.len(),
        config.backup_dir.display()
    );

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(action_start))
        .branch(case![Command::Help].endpoint(action_help))
        .branch(case![Command::Payout].endpoint(action_payout))
        .branch(case![Command::Wipe].endpoint(action_wipe));

    let schema = Update::filter_message().branch(command_handler);

    Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![Arc::new(config), payout, wipe])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
