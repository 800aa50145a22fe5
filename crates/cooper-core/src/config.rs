use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid, or if only one
/// of `APIFY_TOKEN` / `APIFY_ACTOR_TASK_ID` is set.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid, or if only one
/// of `APIFY_TOKEN` / `APIFY_ACTOR_TASK_ID` is set.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Credentials are optional: each integration is enabled only when its keys
/// are present, and values are passed through untouched.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `FOO=` in a .env file disables an integration.
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let env = parse_environment(&or_default("COOPER_ENV", "development"));
    let bind_addr = parse_var(&lookup, "COOPER_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("COOPER_LOG_LEVEL", "info");

    let request_timeout_secs: u64 = non_zero(
        parse_var(&lookup, "COOPER_REQUEST_TIMEOUT_SECS", "30")?,
        "COOPER_REQUEST_TIMEOUT_SECS",
    )?;
    let user_agent = or_default("COOPER_USER_AGENT", "cooper/0.1 (video-insights)");
    let max_concurrent_videos: usize = non_zero(
        parse_var(&lookup, "COOPER_MAX_CONCURRENT_VIDEOS", "5")?,
        "COOPER_MAX_CONCURRENT_VIDEOS",
    )?;

    let scraper_poll_interval_secs: u64 = non_zero(
        parse_var(&lookup, "COOPER_SCRAPER_POLL_INTERVAL_SECS", "5")?,
        "COOPER_SCRAPER_POLL_INTERVAL_SECS",
    )?;
    let scraper_timeout_secs: u64 = parse_var(&lookup, "COOPER_SCRAPER_TIMEOUT_SECS", "300")?;

    // Apify token and task id must be set together.
    let apify_token = optional("APIFY_TOKEN");
    let apify_actor_task_id = optional("APIFY_ACTOR_TASK_ID");
    match (&apify_token, &apify_actor_task_id) {
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvVar("APIFY_ACTOR_TASK_ID".to_string()))
        }
        (None, Some(_)) => return Err(ConfigError::MissingEnvVar("APIFY_TOKEN".to_string())),
        _ => {}
    }

    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1")
        .trim_end_matches('/')
        .to_string();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        request_timeout_secs,
        user_agent,
        max_concurrent_videos,
        youtube_api_key: optional("YOUTUBE_API_KEY"),
        apify_token,
        apify_actor_task_id,
        scraper_webhook_url: optional("COOPER_SCRAPER_WEBHOOK_URL"),
        scraper_poll_interval_secs,
        scraper_timeout_secs,
        openai_api_key: optional("OPENAI_API_KEY"),
        openai_base_url,
        text_model: or_default("COOPER_TEXT_MODEL", "gpt-3.5-turbo"),
        insight_model: or_default("COOPER_INSIGHT_MODEL", "gpt-4"),
        transcription_model: or_default("COOPER_TRANSCRIPTION_MODEL", "whisper-1"),
        tei_url: optional("COOPER_TEI_URL"),
        pinecone_api_key: optional("PINECONE_API_KEY"),
        pinecone_index_host: optional("PINECONE_INDEX_HOST"),
        pinecone_namespace: or_default("PINECONE_NAMESPACE", "brand-guidelines"),
        brand_guidelines_path: optional("COOPER_BRAND_GUIDELINES_PATH").map(PathBuf::from),
    })
}

/// Parse `var` (or `default` when unset) into `T`.
fn parse_var<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn non_zero<T: Default + PartialEq>(value: T, var: &str) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
