use std::env;
use tracing::warn;

pub const DEFAULT_SLOT_INTERVAL_MINUTES: i64 = 30;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub slot_interval_minutes: i64,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            slot_interval_minutes: parse_slot_interval(env::var("SLOT_INTERVAL_MINUTES").ok()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    /// Config pointing at a given store with default scheduling settings.
    pub fn with_store(supabase_url: impl Into<String>, supabase_anon_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            supabase_anon_key: supabase_anon_key.into(),
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn parse_slot_interval(raw: Option<String>) -> i64 {
    let Some(raw) = raw else {
        return DEFAULT_SLOT_INTERVAL_MINUTES;
    };

    match raw.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => minutes,
        _ => {
            warn!("SLOT_INTERVAL_MINUTES={:?} is not a positive integer, using {}", raw, DEFAULT_SLOT_INTERVAL_MINUTES);
            DEFAULT_SLOT_INTERVAL_MINUTES
        }
    }
}
