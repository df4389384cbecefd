use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use flowgate_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let app_token = redact_token(config.slack.app_token.expose_secret());
    let bot_token = redact_token(config.slack.bot_token.expose_secret());
    let signing_secret =
        if config.slack.signing_secret.expose_secret().is_empty() { "<empty>" } else { "<redacted>" };
    lines.push(render_line(
        "slack.app_token",
        &app_token,
        field_source(
            "slack.app_token",
            &["FLOWGATE_SLACK_APP_TOKEN"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "slack.bot_token",
        &bot_token,
        field_source(
            "slack.bot_token",
            &["FLOWGATE_SLACK_BOT_TOKEN"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "slack.signing_secret",
        signing_secret,
        field_source(
            "slack.signing_secret",
            &["FLOWGATE_SLACK_SIGNING_SECRET"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "trigger.kind",
        config.trigger.kind.label(),
        field_source(
            "trigger.kind",
            &["FLOWGATE_TRIGGER_KIND"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "trigger.command_filter",
        config.trigger.command_filter.as_deref().unwrap_or("<unset>"),
        field_source(
            "trigger.command_filter",
            &["FLOWGATE_TRIGGER_COMMAND_FILTER"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            &["FLOWGATE_LOGGING_LEVEL", "FLOWGATE_LOG_LEVEL"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source(
            "logging.format",
            &["FLOWGATE_LOGGING_FORMAT", "FLOWGATE_LOG_FORMAT"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("flowgate.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/flowgate.toml");
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
    // Same keys, same precedence, and same blank-value filter as the
    // loader, so attribution matches what actually took effect.
    for env_key in env_keys {
        let is_set = env::var(env_key).is_ok_and(|value| !value.trim().is_empty());
        if is_set {
            return format!("env ({env_key})");
        }
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
