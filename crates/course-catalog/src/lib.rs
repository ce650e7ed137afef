pub mod advisor;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod mcp_api;
pub mod model;
pub mod projection;
pub mod scorer;

pub use catalog::Catalog;
pub use engine::{EngineOptions, LogLevels, QueryEngine};
pub use error::{CatalogError, SearchError};
pub use model::{Course, CourseFilter, Prerequisites, RecommendationRequest, SearchResult};
