/// Error types for the course catalog.
///
/// Load-time errors (`CatalogError`) are fatal and propagated to whoever builds the
/// engine. Query-time errors (`SearchError`) are contained by the engine and degrade
/// to an empty result list unless the caller asks for them explicitly.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("course data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing course data: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("non-finite score {score} for course {course_id}")]
    InvalidScore { course_id: String, score: f32 },
}
