//! VoteWatch dashboard library exports.

pub mod api_client;
pub mod config;
pub mod error;
pub mod ranking;
pub mod render;
pub mod state;

pub use api_client::{decode_votes, ApiClient, ApiClientError, VotesSnapshot};
pub use config::{ConfigError, DashboardConfig};
pub use error::DashboardError;
pub use ranking::{rank, RankedCandidate};
pub use render::render;
pub use state::{PollState, RankedSnapshot};
