use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rigsmith_core::config::AppConfig;
use serde::Serialize;
use serde_json::json;
use toml::Value;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let entries = effective_entries(&config, config_file_doc.as_ref(), config_file_path.as_deref());

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        Some(json!({ "entries": entries })),
    )
}

fn effective_entries(
    config: &AppConfig,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> Vec<ConfigEntry> {
    let fields: [(&'static str, String, &[&str]); 11] = [
        ("database.url", config.database.url.clone(), &["RIGSMITH_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["RIGSMITH_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["RIGSMITH_DATABASE_TIMEOUT_SECS"],
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["RIGSMITH_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["RIGSMITH_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["RIGSMITH_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        (
            "recommendations.window_days",
            config.recommendations.window_days.to_string(),
            &["RIGSMITH_RECOMMENDATIONS_WINDOW_DAYS"],
        ),
        (
            "recommendations.decay_lambda",
            config.recommendations.decay_lambda.to_string(),
            &["RIGSMITH_RECOMMENDATIONS_DECAY_LAMBDA"],
        ),
        (
            "recommendations.limit",
            config.recommendations.limit.to_string(),
            &["RIGSMITH_RECOMMENDATIONS_LIMIT"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["RIGSMITH_LOGGING_LEVEL", "RIGSMITH_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["RIGSMITH_LOGGING_FORMAT", "RIGSMITH_LOG_FORMAT"],
        ),
    ];

    fields
        .into_iter()
        .map(|(key, value, env_keys)| ConfigEntry {
            key,
            value,
            source: field_source(key, env_keys, config_file_doc, config_file_path),
        })
        .collect()
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("rigsmith.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/rigsmith.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
