use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use hubsync::GithubClient;
use hubsync::http::ReqwestTransport;

use crate::config::Config;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Output format for rate limit display.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Handle the `limits` command: show quota for every API resource.
pub(crate) async fn handle_limits(
    output: OutputFormat,
    token: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(ReqwestTransport::with_timeout(HTTP_TIMEOUT)?);
    let client = GithubClient::new(transport, config.github_config(token));

    let payload = client.fetch("/rate_limit").await?;
    let items = rate_limits_to_display(&payload);
    if items.is_empty() {
        return Err("rate limit response contained no resources".into());
    }
    RateLimitDisplay::print_many(items, output);

    Ok(())
}

/// Rate limit information for display.
#[derive(Debug, Clone, serde::Serialize, tabled::Tabled)]
pub(crate) struct RateLimitDisplay {
    #[tabled(rename = "Resource")]
    #[serde(rename = "resource")]
    pub resource: String,
    #[tabled(rename = "Limit")]
    pub limit: String,
    #[tabled(rename = "Used")]
    pub used: String,
    #[tabled(rename = "Remaining")]
    pub remaining: String,
    #[tabled(rename = "Usage %")]
    pub usage_percent: String,
    #[tabled(rename = "Resets At")]
    pub reset_at: String,
    #[tabled(rename = "Resets In")]
    pub reset_in: String,
}

impl RateLimitDisplay {
    fn from_resource(name: &str, resource: &serde_json::Value) -> Option<Self> {
        let limit = resource.get("limit")?.as_i64()?;
        let used = resource.get("used").and_then(serde_json::Value::as_i64);
        let remaining = resource.get("remaining")?.as_i64()?;
        let reset = resource.get("reset")?.as_i64()?;

        let used = used.unwrap_or(limit - remaining);
        let usage_percent = if limit > 0 {
            (used as f64 / limit as f64) * 100.0
        } else {
            0.0
        };

        let now = Utc::now();
        let reset_at = DateTime::<Utc>::from_timestamp(reset, 0)?;
        let reset_duration = reset_at.signed_duration_since(now);
        let reset_in = if reset_duration.num_seconds() > 0 {
            format_duration(reset_duration)
        } else {
            "now".to_string()
        };

        Some(Self {
            resource: name.to_string(),
            limit: limit.to_string(),
            used: used.to_string(),
            remaining: remaining.to_string(),
            usage_percent: format!("{:.1}%", usage_percent),
            reset_at: reset_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            reset_in,
        })
    }

    pub(crate) fn print_many(mut items: Vec<Self>, format: OutputFormat) {
        // Sort by resource name for consistent output
        items.sort_by(|a, b| a.resource.cmp(&b.resource));

        match format {
            OutputFormat::Table => {
                let mut table = tabled::Table::new(items);
                table.with(tabled::settings::Style::rounded());
                println!("{}", table);
            }
            OutputFormat::Json => match serde_json::to_string_pretty(&items) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize rate limits: {}", e),
            },
        }
    }
}

/// Build display rows from the raw `/rate_limit` payload.
///
/// Every entry under `resources` is shown; entries that are missing the
/// expected numeric fields are dropped rather than rendered as garbage.
pub(crate) fn rate_limits_to_display(payload: &serde_json::Value) -> Vec<RateLimitDisplay> {
    let Some(resources) = payload.get("resources").and_then(|r| r.as_object()) else {
        return Vec::new();
    };

    resources
        .iter()
        .filter_map(|(name, resource)| RateLimitDisplay::from_resource(name, resource))
        .collect()
}

/// Format a duration in a human-readable way.
fn format_duration(duration: chrono::Duration) -> String {
    let total_secs = duration.num_seconds();
    if total_secs < 60 {
        format!("{}s", total_secs)
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    } else {
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }
}
