use clap::Parser;

use std::error::Error;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use versebot::passage::{PassageService, DEFAULT_VERSION};
use versebot::telegram::{self, Gateway};

#[derive(Parser, Debug)]
struct Args {
    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    token: String,
    /// Translation used when a command does not name one
    #[arg(long, default_value = DEFAULT_VERSION)]
    version: String,
    /// Long-poll timeout for getUpdates, in seconds
    #[arg(long, default_value_t = 30)]
    poll_timeout: u64,
}

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let service = PassageService::new();
    let gateway = Gateway::new(&args.token, Duration::from_secs(args.poll_timeout))?;

    info!("bot started, polling for updates");

    let mut offset = 0i64;
    loop {
        let updates = match gateway.get_updates(offset) {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "getUpdates failed, retrying");
                std::thread::sleep(POLL_RETRY_DELAY);
                continue;
            }
        };
        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Err(e) = telegram::handle_update(&gateway, &service, &args.version, update) {
                warn!(error = %e, "failed to handle update");
            }
        }
    }
}
