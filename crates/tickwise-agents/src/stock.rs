//! The fixed four-stage stock analysis pipeline.

use std::sync::Arc;

use tickwise_data::{MarketData, WebSearch};
use tickwise_models::{AgentKind, AgentsConfig};
use tracing::debug;

use crate::agent::{Agent, AgentProfile, CapabilityAgent};
use crate::engine::EngineFactory;
use crate::error::AgentError;
use crate::prompts::task_texts;
use crate::task::{Pipeline, TaskDescriptor};
use crate::tools::Tool;

/// The four agents of one analysis run.
#[derive(Clone)]
pub struct StockAgents {
    pub price: Arc<dyn Agent>,
    pub news: Arc<dyn Agent>,
    pub sentiment: Arc<dyn Agent>,
    pub recommendation: Arc<dyn Agent>,
}

/// Builds a fresh set of agents for each run.
pub trait AgentFactory: Send + Sync {
    fn build(&self, symbol: &str) -> Result<StockAgents, AgentError>;
}

/// Production factory: capability agents wired to engines and data providers.
pub struct CapabilityAgentFactory {
    engines: Arc<dyn EngineFactory>,
    market: Arc<dyn MarketData>,
    search: Arc<dyn WebSearch>,
    config: AgentsConfig,
}

impl CapabilityAgentFactory {
    pub fn new(
        engines: Arc<dyn EngineFactory>,
        market: Arc<dyn MarketData>,
        search: Arc<dyn WebSearch>,
        config: AgentsConfig,
    ) -> Self {
        Self {
            engines,
            market,
            search,
            config,
        }
    }

    fn tools_for(&self, kind: AgentKind) -> Vec<Tool> {
        match kind {
            AgentKind::Price => vec![Tool::PriceFetch {
                market: Arc::clone(&self.market),
                days: self.config.price_history_days,
            }],
            AgentKind::News => vec![Tool::WebSearch {
                search: Arc::clone(&self.search),
                limit: self.config.news_results,
            }],
            AgentKind::Sentiment | AgentKind::Recommendation => Vec::new(),
        }
    }

    fn agent(&self, kind: AgentKind) -> Result<Arc<dyn Agent>, AgentError> {
        let profile = AgentProfile::default_for(kind).with_overrides(self.config.profile(kind));
        let agent = CapabilityAgent::new(profile, self.tools_for(kind), self.engines.engine_for(kind))?;
        Ok(Arc::new(agent))
    }
}

impl AgentFactory for CapabilityAgentFactory {
    fn build(&self, symbol: &str) -> Result<StockAgents, AgentError> {
        debug!(symbol, "Constructing agents");
        Ok(StockAgents {
            price: self.agent(AgentKind::Price)?,
            news: self.agent(AgentKind::News)?,
            sentiment: self.agent(AgentKind::Sentiment)?,
            recommendation: self.agent(AgentKind::Recommendation)?,
        })
    }
}

fn stage(kind: AgentKind, symbol: &str, agent: &Arc<dyn Agent>) -> TaskDescriptor {
    let (description, expected_output) = task_texts(kind, symbol);
    TaskDescriptor::new(kind.as_str(), description, expected_output, Arc::clone(agent))
}

/// Price → News → Sentiment, with Recommendation reading both Price and Sentiment.
pub fn build_stock_pipeline(symbol: &str, agents: &StockAgents) -> Pipeline {
    let price = stage(AgentKind::Price, symbol, &agents.price);
    let news = stage(AgentKind::News, symbol, &agents.news).after(&price);
    let sentiment = stage(AgentKind::Sentiment, symbol, &agents.sentiment).after(&news);
    let recommendation = stage(AgentKind::Recommendation, symbol, &agents.recommendation)
        .after(&price)
        .after(&sentiment);

    Pipeline::new(symbol, vec![price, news, sentiment, recommendation])
}
