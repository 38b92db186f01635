use ranchscribe::bot::{run_dispatcher, Config};

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting RanchScribe bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Failed to load ranch config: {}", err);
            return;
        }
    };

    let bot = teloxide::Bot::from_env();

    log::info!("RanchScribe bot started successfully!");

    run_dispatcher(bot, config).await;
}
