use std::{future::Future, sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::sleep};

use super::messenger::{Content, MessageHandle, Messenger, MessengerError};

/* Scheduler runs fire-and-forget work after a fixed delay.
 * Scheduled tasks are never cancelled, and separate timers fire in no particular order.
 */

const NOTICE_DELETE_DELAY: Duration = Duration::from_secs(5);
const INVOKER_DELETE_DELAY: Duration = Duration::from_secs(5);
const WIPE_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoutTimings {
    pub notice_delete: Duration,
    pub invoker_delete: Duration,
    pub wipe_delay: Duration,
}

impl Default for PayoutTimings {
    fn default() -> Self {
        PayoutTimings {
            notice_delete: NOTICE_DELETE_DELAY,
            invoker_delete: INVOKER_DELETE_DELAY,
            wipe_delay: WIPE_DELAY,
        }
    }
}

// Runs a task once the delay has passed.
pub fn schedule_task<F, T>(delay: Duration, task: F) -> JoinHandle<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(async move {
        sleep(delay).await;
        task.await
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
    Failed,
}

/* Classifies the result of a message deletion.
 * A message that is already gone is not worth a log line, any other failure is logged.
 */
fn delete_outcome(message: &MessageHandle, result: Result<(), MessengerError>) -> DeleteOutcome {
    match result {
        Ok(()) => DeleteOutcome::Deleted,
        Err(MessengerError::MessageNotFound) => DeleteOutcome::AlreadyGone,
        Err(err) => {
            log::error!(
                "Failed to delete message {} in {}: {}",
                message.message_id,
                message.channel_id,
                err
            );
            DeleteOutcome::Failed
        }
    }
}

// Deletes a message once the delay has passed.
pub fn schedule_delete(
    messenger: Arc<dyn Messenger>,
    message: MessageHandle,
    delay: Duration,
) -> JoinHandle<DeleteOutcome> {
    schedule_task(delay, async move {
        let result = messenger.delete_message(&message).await;
        delete_outcome(&message, result)
    })
}

// Sends a short-lived notice, which deletes itself after the delay.
pub async fn send_transient(
    messenger: &Arc<dyn Messenger>,
    channel_id: &str,
    text: &str,
    delay: Duration,
) -> Option<MessageHandle> {
    match messenger
        .send_message(channel_id, Content::Text(text.to_string()))
        .await
    {
        Ok(handle) => {
            schedule_delete(messenger.clone(), handle.clone(), delay);
            Some(handle)
        }
        Err(err) => {
            log::error!("Failed to send notice to {}: {}", channel_id, err);
            None
        }
    }
}
