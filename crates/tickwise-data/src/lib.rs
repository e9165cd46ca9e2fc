pub mod brave;
pub mod capability;
pub mod error;
pub mod memory;
pub mod yahoo;

pub use brave::BraveSearch;
pub use capability::{MarketData, ReferenceData, WebSearch};
pub use error::DataError;
pub use memory::CachedReferenceData;
pub use yahoo::YahooClient;
