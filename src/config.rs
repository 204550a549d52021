use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use std::env;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub timezone: Tz,
    /// When set, updates arrive over a webhook instead of long polling.
    pub webhook_url: Option<Url>,
    pub webhook_port: u16,
    pub http_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let timezone_str = env::var("BOT_TIMEZONE").unwrap_or_else(|_| "Europe/Moscow".to_string());
        let timezone_str = if timezone_str.trim().is_empty() {
            "Europe/Moscow".to_string()
        } else {
            timezone_str
        };
        let timezone = timezone_str
            .trim()
            .parse::<Tz>()
            .map_err(|_| anyhow!("BOT_TIMEZONE '{}' is not a known timezone", timezone_str))?;

        let webhook_url = match env::var("WEBHOOK_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                Url::parse(raw.trim()).map_err(|e| anyhow!("Invalid WEBHOOK_URL: {}", e))?,
            ),
            _ => None,
        };

        let webhook_port_str = env::var("WEBHOOK_PORT").unwrap_or_else(|_| "8443".to_string());
        let webhook_port = webhook_port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid WEBHOOK_PORT"))?;

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        Ok(Config {
            telegram_bot_token: token,
            timezone,
            webhook_url,
            webhook_port,
            http_port,
        })
    }
}
