use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono::Utc;

use crate::bot::{
    config::Ranch,
    messenger::{Content, Messenger, MessengerError, RequestContext},
    scheduler::{schedule_delete, schedule_task, send_transient, PayoutTimings},
    stats::{display_amount, write_backup, StatsError, StatsRecord},
    tracking::{TrackingPeriod, TrackingPeriodResolver},
};

use super::wipe::WipeAction;

/* Payout is the periodic payout run over all configured ranches.
 * Execution flow: resolve the tracking period, then per ranch read the stats,
 * back them up, compute the payouts and publish the report.
 * Once every ranch has been attempted, the stats wipe is scheduled.
 * Only one run may be active at a time; overlapping requests are dropped.
 */

const ALREADY_ACTIVE_MESSAGE: &str =
    "A payout process is already active. Please wait for it to complete.";
const TRACKING_ERROR_MESSAGE: &str = "An error occurred while calculating the tracking period.";
const PAYOUT_ERROR_MESSAGE: &str = "An error occurred while processing payouts. Check logs.";

#[derive(thiserror::Error, Debug)]
pub enum PayoutError {
    #[error("Failed to prepare backup directory {0}: {1}")]
    BackupDir(PathBuf, std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum RanchError {
    #[error("Failed to read stats file: {0}")]
    Read(std::io::Error),
    #[error("{0}")]
    Stats(StatsError),
    #[error("Failed to write backup: {0}")]
    Backup(std::io::Error),
    #[error("Failed to send payout message: {0}")]
    Publish(MessengerError),
}

impl From<StatsError> for RanchError {
    fn from(stats_error: StatsError) -> RanchError {
        RanchError::Stats(stats_error)
    }
}

impl From<MessengerError> for RanchError {
    fn from(messenger_error: MessengerError) -> RanchError {
        RanchError::Publish(messenger_error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RanchOutcome {
    MissingConfig,
    NoStats,
    ChannelNotFound { backup: PathBuf },
    Published { backup: PathBuf, players: usize },
}

#[derive(Debug)]
pub struct RanchReport {
    pub ranch: String,
    pub result: Result<RanchOutcome, RanchError>,
}

#[derive(Debug)]
pub enum PayoutRun {
    AlreadyActive,
    Aborted,
    Completed(Vec<RanchReport>),
}

// Holds the active flag for one run, and releases it on every exit path.
struct ActiveGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ActiveGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<ActiveGuard<'a>> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActiveGuard { flag })
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/* Composes the payout report of a ranch.
 * Players are listed in the order they appear in the stats file.
 */
pub fn compose_report(ranch_name: &str, period: &TrackingPeriod, payouts: &[(String, f64)]) -> String {
    let lines: Vec<String> = payouts
        .iter()
        .map(|(player, amount)| format!("🤠 {}: {}", player, display_amount(*amount)))
        .collect();

    format!(
        "🥛 {} Payout 🥚\n📅 Dates: {}\n\n{}\n\n---\n\n💡 This payout is for milk and eggs only!",
        ranch_name,
        period,
        lines.join("\n")
    )
}

pub struct PayoutProcessor {
    ranches: Vec<Ranch>,
    backup_dir: PathBuf,
    messenger: Arc<dyn Messenger>,
    tracking: Arc<dyn TrackingPeriodResolver>,
    wipe: Arc<dyn WipeAction>,
    timings: PayoutTimings,
    active: AtomicBool,
}

impl PayoutProcessor {
    pub fn new(
        ranches: Vec<Ranch>,
        backup_dir: PathBuf,
        messenger: Arc<dyn Messenger>,
        tracking: Arc<dyn TrackingPeriodResolver>,
        wipe: Arc<dyn WipeAction>,
    ) -> PayoutProcessor {
        PayoutProcessor {
            ranches,
            backup_dir,
            messenger,
            tracking,
            wipe,
            timings: PayoutTimings::default(),
            active: AtomicBool::new(false),
        }
    }

    // Mainly for testing purposes
    #[allow(dead_code)]
    pub fn with_timings(mut self, timings: PayoutTimings) -> PayoutProcessor {
        self.timings = timings;
        self
    }

    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    async fn notify(&self, request: &RequestContext, text: &str) {
        send_transient(
            &self.messenger,
            &request.channel_id,
            text,
            self.timings.notice_delete,
        )
        .await;
    }

    /* Runs a payout for all ranches.
     * Rejected if a run is already active. Otherwise, the invoking message is
     * always cleaned up, however the run ends.
     */
    pub async fn execute(&self, request: &RequestContext) -> PayoutRun {
        let guard = match ActiveGuard::acquire(&self.active) {
            Some(guard) => guard,
            None => {
                log::warn!("Payout requested while another payout is active");
                self.notify(request, ALREADY_ACTIVE_MESSAGE).await;
                return PayoutRun::AlreadyActive;
            }
        };

        let run = match self.run(request).await {
            Ok(run) => run,
            Err(err) => {
                log::error!("Payout process error: {}", err);
                self.notify(request, PAYOUT_ERROR_MESSAGE).await;
                PayoutRun::Aborted
            }
        };

        drop(guard);
        schedule_delete(
            self.messenger.clone(),
            request.clone(),
            self.timings.invoker_delete,
        );

        run
    }

    async fn run(&self, request: &RequestContext) -> Result<PayoutRun, PayoutError> {
        let period = match self.tracking.current_period() {
            Ok(period) => period,
            Err(err) => {
                log::error!("Failed to calculate tracking period: {}", err);
                self.notify(request, TRACKING_ERROR_MESSAGE).await;
                return Ok(PayoutRun::Aborted);
            }
        };

        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|err| PayoutError::BackupDir(self.backup_dir.clone(), err))?;

        let mut reports = Vec::new();
        for ranch in &self.ranches {
            let result = self.process_ranch(ranch, &period).await;
            match &result {
                Ok(RanchOutcome::MissingConfig) => {
                    log::warn!("[{}] Missing dataFile or payoutChannelId.", ranch.name)
                }
                Ok(RanchOutcome::NoStats) => {
                    log::info!("[{}] No stats available for payout.", ranch.name)
                }
                Ok(RanchOutcome::ChannelNotFound { .. }) => log::warn!(
                    "[{}] Payout channel not found: {}",
                    ranch.name,
                    ranch.payout_channel_id.as_deref().unwrap_or_default()
                ),
                Ok(RanchOutcome::Published { players, .. }) => {
                    log::info!("[{}] Payout message sent for {} players.", ranch.name, players)
                }
                Err(err) => log::error!("[{}] Error processing payout: {}", ranch.name, err),
            }
            reports.push(RanchReport {
                ranch: ranch.name.clone(),
                result,
            });
        }

        let wipe_secs = self.timings.wipe_delay.as_secs();
        self.notify(
            request,
            &format!("Payouts processed. Data will be wiped in {wipe_secs} seconds..."),
        )
        .await;

        let wipe = self.wipe.clone();
        let wipe_request = request.clone();
        schedule_task(self.timings.wipe_delay, async move {
            wipe.wipe(&wipe_request).await;
        });

        Ok(PayoutRun::Completed(reports))
    }

    /* Processes the payout of a single ranch.
     * The stats are backed up before anything is computed or published,
     * so the backup always matches what was read.
     */
    async fn process_ranch(
        &self,
        ranch: &Ranch,
        period: &TrackingPeriod,
    ) -> Result<RanchOutcome, RanchError> {
        let (data_file, channel_id) = match (&ranch.data_file, &ranch.payout_channel_id) {
            (Some(data_file), Some(channel_id)) => (data_file, channel_id),
            _ => return Ok(RanchOutcome::MissingConfig),
        };

        let text = tokio::fs::read_to_string(data_file)
            .await
            .map_err(RanchError::Read)?;
        let record = StatsRecord::parse(&text)?;
        if record.is_empty() {
            return Ok(RanchOutcome::NoStats);
        }

        let backup = write_backup(
            &self.backup_dir,
            &ranch.name,
            &record,
            Utc::now().timestamp_millis(),
        )
        .await
        .map_err(RanchError::Backup)?;
        log::info!("[{}] Payout data backed up at {}", ranch.name, backup.display());

        let payouts: Vec<(String, f64)> = record
            .players()?
            .into_iter()
            .map(|(player, stats)| (player, stats.total_profit()))
            .collect();
        let report = compose_report(&ranch.name, period, &payouts);

        let channel = match self.messenger.resolve_channel(channel_id).await {
            Some(channel) => channel,
            None => return Ok(RanchOutcome::ChannelNotFound { backup }),
        };

        log::debug!(
            "[{}] Publishing payout to {}",
            ranch.name,
            channel.title.as_deref().unwrap_or(&channel.id)
        );
        self.messenger
            .send_message(&channel.id, Content::Preformatted(report))
            .await?;

        Ok(RanchOutcome::Published {
            backup,
            players: payouts.len(),
        })
    }
}
