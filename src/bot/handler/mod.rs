// Exported functions
pub use self::general::{action_help, action_start};
pub use self::payout::{action_payout, action_wipe};

// Submodules
mod constants;
mod general;
mod payout;
mod utils;
