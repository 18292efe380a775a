use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub text_gen_api_url: String,
    pub text_gen_api_key: Option<String>,
    pub text_gen_model: String,
    pub text_gen_timeout_seconds: u64,
    pub countdown_tick_millis: u64,
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://imposter_game.db?mode=rwc".to_string()),
            text_gen_api_url: env::var("TEXT_GEN_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string()),
            text_gen_api_key: env::var("TEXT_GEN_API_KEY").ok().filter(|k| !k.is_empty()),
            text_gen_model: env::var("TEXT_GEN_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string()),
            text_gen_timeout_seconds: parse_var("TEXT_GEN_TIMEOUT_SECONDS", 20)?,
            countdown_tick_millis: parse_var("COUNTDOWN_TICK_MILLIS", 1000)?,
            rng_seed: env::var("RNG_SEED")
                .ok()
                .map(|seed| seed.parse().context("Invalid RNG_SEED"))
                .transpose()?,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("Invalid {}", key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_when_unset() {
        let value: u64 = parse_var("IMPOSTER_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
