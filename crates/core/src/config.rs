//! Settings shared by every binary of the workspace.

use tracing::Level;

/// Maps a `LOG_LEVEL` value to a tracing level; anything unknown is `INFO`.
pub fn parse_log_level(value: &str) -> Level {
    value.trim().parse().unwrap_or(Level::INFO)
}
