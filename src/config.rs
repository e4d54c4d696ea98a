use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub debug: bool,

    // Metric naming
    pub metrics_prefix: String,
    pub aggregate_key: String,

    /// Print the Prometheus export before exiting
    pub export_metrics: bool,

    /// Calls per second allowed per operation; unlimited when absent
    pub rate_limit_per_sec: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            metrics_prefix: "invocation".to_string(),
            aggregate_key: "instance".to_string(),
            export_metrics: true,
            rate_limit_per_sec: None,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Build the config from any key lookup, falling back to defaults.
pub fn load_config_from<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = Config::default();

    let debug = lookup("DEBUG").is_some();

    let metrics_prefix = lookup("CONTRACT_INVOKE_METRICS_PREFIX")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.metrics_prefix);

    let aggregate_key = lookup("CONTRACT_INVOKE_AGGREGATE_KEY")
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(defaults.aggregate_key);

    let export_metrics = lookup("CONTRACT_INVOKE_EXPORT_METRICS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(defaults.export_metrics);

    let rate_limit_per_sec = lookup("CONTRACT_INVOKE_RATE_LIMIT")
        .and_then(|v| v.parse().ok())
        .filter(|&n: &u64| n > 0);

    if aggregate_key.contains('.') {
        anyhow::bail!("aggregate key {:?} must not contain '.'", aggregate_key);
    }

    Ok(Config {
        debug,
        metrics_prefix,
        aggregate_key,
        export_metrics,
        rate_limit_per_sec,
    })
}
