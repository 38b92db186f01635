use std::sync::Arc;

use teloxide::prelude::*;
use tokio::task::JoinHandle;

use crate::bot::{
    config::Config,
    dispatcher::HandlerResult,
    messenger::RequestContext,
    processor::{PayoutProcessor, PayoutRun, StatsWipe, WipeAction},
};

use super::{
    constants::NOT_ADMIN_MESSAGE,
    utils::{assert_admin, request_context, send_bot_message},
};

/* Runs a payout in its own task, and logs how it ended.
 * Updates from one chat are handled in order, so the handler must not wait
 * for the run. A repeated command then reaches the processor while the first
 * run is still active, and is dropped there.
 */
pub fn spawn_payout(payout: Arc<PayoutProcessor>, request: RequestContext) -> JoinHandle<PayoutRun> {
    tokio::spawn(async move {
        let run = payout.execute(&request).await;
        match &run {
            PayoutRun::Completed(reports) => {
                let failed: Vec<&str> = reports
                    .iter()
                    .filter(|report| report.result.is_err())
                    .map(|report| report.ranch.as_str())
                    .collect();
                log::info!(
                    "Payout - Completed in chat {}, {} ranches, failed: [{}]",
                    request.channel_id,
                    reports.len(),
                    failed.join(", ")
                );
            }
            PayoutRun::Aborted => log::warn!("Payout - Aborted in chat {}", request.channel_id),
            PayoutRun::AlreadyActive => {
                log::info!("Payout - Rejected in chat {}, already active", request.channel_id)
            }
        }
        run
    })
}

/* Payout command.
 * Pays out every ranch, then wipes the stats. All replies are transient,
 * and are sent by the processor itself.
 */
pub async fn action_payout(
    bot: Bot,
    msg: Message,
    config: Arc<Config>,
    payout: Arc<PayoutProcessor>,
) -> HandlerResult {
    if !assert_admin(&config, &msg) {
        log::info!("Payout - Non-admin in chat {} denied", msg.chat.id.0);
        send_bot_message(&bot, &msg, NOT_ADMIN_MESSAGE.to_string()).await?;
        return Ok(());
    }

    spawn_payout(payout, request_context(&msg));
    Ok(())
}

/* Wipe command.
 * Clears the stats of every ranch, without paying out.
 */
pub async fn action_wipe(
    bot: Bot,
    msg: Message,
    config: Arc<Config>,
    wipe: Arc<StatsWipe>,
) -> HandlerResult {
    if !assert_admin(&config, &msg) {
        log::info!("Wipe - Non-admin in chat {} denied", msg.chat.id.0);
        send_bot_message(&bot, &msg, NOT_ADMIN_MESSAGE.to_string()).await?;
        return Ok(());
    }

    wipe.wipe(&request_context(&msg)).await;
    Ok(())
}
