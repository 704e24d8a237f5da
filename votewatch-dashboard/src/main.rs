//! VoteWatch dashboard entry point.

use std::io::Write;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use votewatch_dashboard::{render, ApiClient, DashboardConfig, DashboardError, PollState};

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig::load()?;
    let client = ApiClient::new(&config)?;
    info!(
        url = client.votes_url(),
        interval_secs = config.poll_interval.as_secs(),
        "Dashboard polling"
    );

    let mut state = PollState::default();
    print_state(&state)?;

    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = client.fetch_votes().await;
                if let Err(err) = &outcome {
                    warn!(error = %err, "Poll failed");
                }
                state.apply(outcome);
                print_state(&state)?;

                polls += 1;
                if config.max_polls.is_some_and(|max| polls >= max) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    Ok(())
}

fn print_state(state: &PollState) -> Result<(), DashboardError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render(state).as_bytes())?;
    stdout.flush()?;
    Ok(())
}
