use eyre::{eyre, Result, WrapErr};
use std::{env, str::FromStr, time::Duration};
use tracing::Level;
pub use vetclinic_core::config::parse_log_level;

/// What the calendar does after a dragged appointment was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RescheduleStrategy {
    /// Trust the moved position shown by the calendar.
    #[default]
    KeepMoved,
    /// Reload the visible range from the service.
    Refetch,
}

impl FromStr for RescheduleStrategy {
    type Err = eyre::Report;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "keep" | "keep_moved" => Ok(RescheduleStrategy::KeepMoved),
            "refetch" => Ok(RescheduleStrategy::Refetch),
            other => Err(eyre!("Unknown reschedule strategy: {}", other)),
        }
    }
}

/// Configuration for calendar clients such as the `agenda` binary.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the clinic service, without a trailing slash
    pub api_url: String,
    pub reschedule_strategy: RescheduleStrategy,
    /// How often the waiting room list reloads itself
    pub waiting_room_refresh: Duration,
    pub log_level: Level,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// - `VETCLINIC_API_URL` (default: "http://localhost:3000")
    /// - `RESCHEDULE_STRATEGY`: "keep_moved" or "refetch" (default: "keep_moved")
    /// - `WAITING_ROOM_REFRESH_SECONDS` (default: 30)
    /// - `LOG_LEVEL` (default: "info")
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("VETCLINIC_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let reschedule_strategy = match env::var("RESCHEDULE_STRATEGY") {
            Ok(value) => value
                .parse()
                .wrap_err("Invalid RESCHEDULE_STRATEGY value")?,
            Err(_) => RescheduleStrategy::default(),
        };

        let waiting_room_refresh = env::var("WAITING_ROOM_REFRESH_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .wrap_err("Invalid WAITING_ROOM_REFRESH_SECONDS value")?;
        if waiting_room_refresh == 0 {
            return Err(eyre!("WAITING_ROOM_REFRESH_SECONDS must be greater than zero"));
        }

        Ok(Self {
            api_url,
            reschedule_strategy,
            waiting_room_refresh: Duration::from_secs(waiting_room_refresh),
            log_level: parse_log_level(&env::var("LOG_LEVEL").unwrap_or_default()),
        })
    }
}
