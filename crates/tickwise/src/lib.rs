//! Tickwise - stock ticker analysis with a pipeline of reasoning agents.
//!
//! A ticker is validated against reference data, then handed to four agents
//! (price, news, sentiment, recommendation) that pass their outputs forward
//! and end in a Buy/Sell/Hold recommendation.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tickwise::models::TickwiseConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = TickwiseConfig::default();
//! let controller = tickwise::build_controller(&config, "brave-key".to_string())?;
//! let (success, error) = controller.analyze("AAPL").await.into_parts();
//! # Ok(())
//! # }
//! ```

pub use tickwise_agents as agents;
pub use tickwise_data as data;
pub use tickwise_models as models;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tickwise_agents::{
    CapabilityAgentFactory, ClaudeEngineFactory, Controller, Orchestrator, Validator,
};
use tickwise_data::{BraveSearch, CachedReferenceData, YahooClient};
use tickwise_models::TickwiseConfig;
use tracing::{info, warn};

/// Load configuration from a TOML file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> anyhow::Result<TickwiseConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TickwiseConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: TickwiseConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    check_config(&config).with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

/// Reject settings that would make every run fail.
pub fn check_config(config: &TickwiseConfig) -> anyhow::Result<()> {
    anyhow::ensure!(
        config.agents.task_timeout_seconds > 0,
        "agents.task_timeout_seconds must be at least 1"
    );
    anyhow::ensure!(
        config.data.request_timeout_seconds > 0,
        "data.request_timeout_seconds must be at least 1"
    );
    Ok(())
}

/// Wire the production controller: Yahoo for reference and market data,
/// Brave for news search, the Claude CLI for reasoning.
pub fn build_controller(
    config: &TickwiseConfig,
    search_api_key: String,
) -> anyhow::Result<Controller> {
    check_config(config)?;
    let data = &config.data;
    let request_timeout = Duration::from_secs(data.request_timeout_seconds);

    let yahoo = Arc::new(
        YahooClient::new(&data.yahoo_base_url, &data.user_agent, request_timeout)
            .context("Failed to build market data client")?,
    );
    let search = Arc::new(
        BraveSearch::new(
            &data.search_base_url,
            search_api_key,
            &data.user_agent,
            request_timeout,
        )
        .with_context(|| format!("Failed to build web search client (is {} set?)", data.search_api_key_env))?,
    );
    let reference = Arc::new(CachedReferenceData::new(
        yahoo.clone(),
        data.reference_cache_capacity,
        Duration::from_secs(data.reference_cache_ttl_seconds),
    ));

    let engines = Arc::new(ClaudeEngineFactory::new(config.agents.clone()));
    let mut orchestrator =
        Orchestrator::new(Duration::from_secs(config.agents.task_timeout_seconds));
    if config.agents.planning {
        orchestrator = orchestrator.with_planner(engines.planner());
    }

    let agents = CapabilityAgentFactory::new(engines, yahoo, search, config.agents.clone());

    info!(
        model = %config.agents.model,
        planning = config.agents.planning,
        "Controller ready"
    );
    Ok(Controller::new(
        Arc::new(Validator::new(reference)),
        Arc::new(agents),
        Arc::new(orchestrator),
    ))
}
