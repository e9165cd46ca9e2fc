use serde::{Deserialize, Serialize};

/// Top-level configuration for tickwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TickwiseConfig {
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub data: DataConfig,
}

/// The four agent kinds of the analysis pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Price,
    News,
    Sentiment,
    Recommendation,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Price,
        AgentKind::News,
        AgentKind::Sentiment,
        AgentKind::Recommendation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Price => "price",
            AgentKind::News => "news",
            AgentKind::Sentiment => "sentiment",
            AgentKind::Recommendation => "recommendation",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the agent orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentsConfig {
    /// Default reasoning-engine model for every agent.
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used to plan a run. Falls back to `model`.
    #[serde(default)]
    pub planner_model: Option<String>,
    /// Ask the planner for per-task notes before executing.
    #[serde(default = "default_true")]
    pub planning: bool,
    /// Per-task timeout in seconds. A task exceeding it fails the run.
    #[serde(default = "default_task_timeout")]
    pub task_timeout_seconds: u64,
    /// Days of daily bars the price tool requests.
    #[serde(default = "default_price_history_days")]
    pub price_history_days: u32,
    /// Maximum search results handed to the news agent.
    #[serde(default = "default_news_results")]
    pub news_results: usize,
    /// Per-kind overrides of role, goal and model.
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

impl AgentsConfig {
    pub fn profile(&self, kind: AgentKind) -> Option<&ProfileConfig> {
        self.profiles.iter().find(|p| p.kind == kind)
    }

    /// Model for an agent kind, honouring a per-profile override.
    pub fn model_for(&self, kind: AgentKind) -> String {
        self.profile(kind)
            .and_then(|p| p.model.clone())
            .unwrap_or_else(|| self.model.clone())
    }

    pub fn planner_model(&self) -> String {
        self.planner_model
            .clone()
            .unwrap_or_else(|| self.model.clone())
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            planner_model: None,
            planning: true,
            task_timeout_seconds: default_task_timeout(),
            price_history_days: default_price_history_days(),
            news_results: default_news_results(),
            profiles: Vec::new(),
        }
    }
}

/// Override for a single agent kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileConfig {
    pub kind: AgentKind,
    pub role: Option<String>,
    pub goal: Option<String>,
    /// Override model for this agent. Falls back to `AgentsConfig::model`.
    pub model: Option<String>,
}

/// Configuration for the external data capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Maximum number of memoised reference lookups.
    #[serde(default = "default_reference_cache_capacity")]
    pub reference_cache_capacity: u64,
    /// How long a successful reference lookup stays memoised.
    #[serde(default = "default_reference_cache_ttl")]
    pub reference_cache_ttl_seconds: u64,
    /// Environment variable holding the web search API key.
    #[serde(default = "default_search_api_key_env")]
    pub search_api_key_env: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: default_yahoo_base_url(),
            search_base_url: default_search_base_url(),
            user_agent: default_user_agent(),
            request_timeout_seconds: default_request_timeout(),
            reference_cache_capacity: default_reference_cache_capacity(),
            reference_cache_ttl_seconds: default_reference_cache_ttl(),
            search_api_key_env: default_search_api_key_env(),
        }
    }
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}
fn default_true() -> bool {
    true
}
fn default_task_timeout() -> u64 {
    120
}
fn default_price_history_days() -> u32 {
    30
}
fn default_news_results() -> usize {
    5
}
fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_search_base_url() -> String {
    "https://api.search.brave.com/res/v1/web/search".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
fn default_request_timeout() -> u64 {
    20
}
fn default_reference_cache_capacity() -> u64 {
    1_000
}
fn default_reference_cache_ttl() -> u64 {
    900
}
fn default_search_api_key_env() -> String {
    "BRAVE_API_KEY".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_tickwise_config() {
        let config = TickwiseConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: TickwiseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: TickwiseConfig = toml::from_str("").unwrap();
        assert_eq!(config, TickwiseConfig::default());
        assert!(config.agents.planning);
        assert_eq!(config.agents.price_history_days, 30);
    }

    #[test]
    fn config_from_toml() {
        let toml_str = r#"
[agents]
model = "claude-3-5-haiku-latest"
planner_model = "claude-sonnet-4-5-20250929"
planning = false
task_timeout_seconds = 60

[[agents.profiles]]
kind = "recommendation"
goal = "Be decisive."
model = "claude-sonnet-4-5-20250929"

[[agents.profiles]]
kind = "news"
role = "Headline Scout"

[data]
request_timeout_seconds = 5
search_api_key_env = "MY_SEARCH_KEY"
"#;

        let config: TickwiseConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.agents.planning);
        assert_eq!(config.agents.task_timeout_seconds, 60);
        assert_eq!(config.agents.profiles.len(), 2);
        assert_eq!(
            config.agents.model_for(AgentKind::Recommendation),
            "claude-sonnet-4-5-20250929"
        );
        assert_eq!(
            config.agents.model_for(AgentKind::Price),
            "claude-3-5-haiku-latest"
        );
        assert_eq!(
            config.agents.profile(AgentKind::News).and_then(|p| p.role.as_deref()),
            Some("Headline Scout")
        );
        assert_eq!(config.data.request_timeout_seconds, 5);
        assert_eq!(config.data.search_api_key_env, "MY_SEARCH_KEY");
        assert_eq!(config.data.yahoo_base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn planner_model_falls_back_to_default() {
        let agents = AgentsConfig::default();
        assert_eq!(agents.planner_model(), agents.model);
    }
}
