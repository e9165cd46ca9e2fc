pub mod config;
pub mod market;
pub mod recommendation;
pub mod task;
pub mod ticker;

pub use config::{AgentKind, AgentsConfig, DataConfig, ProfileConfig, TickwiseConfig};
pub use market::{InstrumentInfo, PriceBar, PriceSeries, SearchHit};
pub use recommendation::{Action, Recommendation};
pub use task::{ContextEntry, TaskId, TaskOutput};
pub use ticker::{normalize_symbol, ValidationResult};
