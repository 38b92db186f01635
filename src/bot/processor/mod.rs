/* Processor is the overall logic center of the bot.
 * It runs the payout and wipe workflows for the front-facing handler,
 * and talks to the chat platform only through the Messenger.
 */

// Exported structs and types
pub use self::payout::{PayoutProcessor, PayoutRun};
pub use self::wipe::{StatsWipe, WipeAction};

// Submodules
mod payout;
mod wipe;
