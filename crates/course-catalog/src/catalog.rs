/// Course catalog loading.
///
/// The catalog is read once from a JSON document of the form
/// `{"courses": [{...}, ...]}` and never changes afterwards.
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::CatalogError;
use crate::model::Course;

/// Conventional file name for the course data document.
pub const DEFAULT_CATALOG_FILE: &str = "course_data.json";

#[derive(Deserialize)]
struct CatalogDocument {
    courses: Vec<Course>,
}

/// The immutable, ordered list of courses plus a fingerprint of its source.
#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
    digest: String,
}

impl Catalog {
    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CatalogError::NotFound(path.to_path_buf()),
            _ => CatalogError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Self::from_slice(&bytes)
    }

    /// Parse a catalog from an in-memory JSON document.
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        Self::from_slice(content.as_bytes())
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_slice(bytes)?;

        let mut seen = HashSet::new();
        for course in &document.courses {
            if !seen.insert(course.id.as_str()) {
                warn!(course_id = %course.id, "duplicate course id, lookups return the first");
            }
        }

        Ok(Self {
            courses: document.courses,
            digest: content_digest(bytes),
        })
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Hex SHA-256 of the source document.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl From<Vec<Course>> for Catalog {
    fn from(courses: Vec<Course>) -> Self {
        let digest = serde_json::to_vec(&courses)
            .map(|bytes| content_digest(&bytes))
            .unwrap_or_default();
        Self { courses, digest }
    }
}

fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
