use std::sync::Arc;

use async_trait::async_trait;

use crate::bot::{
    config::Ranch,
    messenger::{Messenger, RequestContext},
    scheduler::{schedule_delete, send_transient, PayoutTimings},
};

/* Wipe resets the ranch stats files once a payout has been archived.
 * It runs on its own through the wipe command, or deferred after a payout.
 */

const EMPTY_STATS: &str = "{}";

#[async_trait]
pub trait WipeAction: Send + Sync {
    async fn wipe(&self, request: &RequestContext);
}

pub struct StatsWipe {
    ranches: Vec<Ranch>,
    messenger: Arc<dyn Messenger>,
    timings: PayoutTimings,
}

impl StatsWipe {
    pub fn new(ranches: Vec<Ranch>, messenger: Arc<dyn Messenger>) -> StatsWipe {
        StatsWipe {
            ranches,
            messenger,
            timings: PayoutTimings::default(),
        }
    }

    /* Empties every configured stats file.
     * Failures are logged per ranch, and do not stop the others.
     * Returns the number of files wiped.
     */
    pub async fn wipe_files(&self) -> usize {
        let mut wiped = 0;
        for ranch in &self.ranches {
            let data_file = match &ranch.data_file {
                Some(data_file) => data_file,
                None => {
                    log::warn!("[{}] No dataFile to wipe.", ranch.name);
                    continue;
                }
            };

            match tokio::fs::write(data_file, EMPTY_STATS).await {
                Ok(()) => {
                    log::info!("[{}] Stats wiped.", ranch.name);
                    wiped += 1;
                }
                Err(err) => log::error!("[{}] Failed to wipe stats: {}", ranch.name, err),
            }
        }
        wiped
    }
}

#[async_trait]
impl WipeAction for StatsWipe {
    async fn wipe(&self, request: &RequestContext) {
        let wiped = self.wipe_files().await;
        send_transient(
            &self.messenger,
            &request.channel_id,
            &format!("Stats wiped for {wiped} ranches."),
            self.timings.notice_delete,
        )
        .await;
        schedule_delete(
            self.messenger.clone(),
            request.clone(),
            self.timings.invoker_delete,
        );
    }
}
