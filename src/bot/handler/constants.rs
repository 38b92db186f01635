// Commands
pub const COMMAND_HELP: &str = "/help";
pub const COMMAND_PAYOUT: &str = "/payout";
pub const COMMAND_WIPE: &str = "/wipe";

// Messages
pub const NOT_ADMIN_MESSAGE: &str = "🚫 Sorry, only ranch admins can do that!";
