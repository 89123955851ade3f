use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use url::Url;

use crate::{errors::Error, Result};

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_TELEGRAM_BOT_TOKEN: &str = "demo-bot-token";
const DEFAULT_MAX_ACCESS_TOKEN: &str = "demo-access-token";
const DEFAULT_MAX_BASE_URL: &str = "https://platform-api.max.ru";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Typed configuration for the gateway host and its provider adapters.
///
/// The core itself never reads configuration; only the binary and the adapter
/// constructors consume these values.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind: SocketAddr,

    // Telegram
    pub telegram_bot_token: String,

    // MAX
    pub max_access_token: String,
    pub max_base_url: Url,
    /// Text MAX shows the user when a callback is answered.
    pub max_ack_notification: Option<String>,

    pub request_timeout: Duration,
}

impl Config {
    /// Load from the process environment, after merging an optional `.env` file.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let bind_raw = get("MSGW_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("MSGW_BIND '{bind_raw}' is invalid: {e}")))?;

        let telegram_bot_token =
            get("TELEGRAM_BOT_TOKEN").unwrap_or_else(|| DEFAULT_TELEGRAM_BOT_TOKEN.to_string());
        let max_access_token =
            get("MAX_ACCESS_TOKEN").unwrap_or_else(|| DEFAULT_MAX_ACCESS_TOKEN.to_string());

        let base_raw = get("MAX_BASE_URL").unwrap_or_else(|| DEFAULT_MAX_BASE_URL.to_string());
        let max_base_url = Url::parse(base_raw.trim())
            .map_err(|e| Error::Config(format!("MAX_BASE_URL '{base_raw}' is invalid: {e}")))?;

        let max_ack_notification = get("MAX_ACK_NOTIFICATION");

        let timeout_ms = match get("MSGW_REQUEST_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("MSGW_REQUEST_TIMEOUT_MS '{raw}' is invalid: {e}"))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_MS,
        };

        Ok(Self {
            bind,
            telegram_bot_token,
            max_access_token,
            max_base_url,
            max_ack_notification,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
