// bot/mod.rs

// Exported functions
pub use self::dispatcher::run_dispatcher;

// Exported structs and types
pub use self::config::{Config, ConfigError, Ranch};
pub use self::dispatcher::{BotError, Command, HandlerResult};

// Declare submodules
mod config;
mod dispatcher;
mod handler;
mod messenger;
mod processor;
mod scheduler;
mod stats;
mod tracking;
