/// Query engine over an immutable course catalog.
///
/// Offers four read-only operations: ranked keyword search, lookup by id,
/// attribute filtering, and interest-based recommendations. Course texts are
/// projected once at construction; the catalog never changes afterwards, so this
/// gives the same results as projecting on every query.
use std::path::Path;
use std::sync::Arc;

use tracing::Level;

use crate::catalog::Catalog;
use crate::error::{CatalogError, SearchError};
use crate::model::{
    CategorySummary, Course, CourseFilter, RecommendationRequest, SearchResult, DIFFICULTY_LEVELS,
};
use crate::projection::course_text;
use crate::scorer;

/// Default page size for `search_courses`.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Recommendations over-fetch this many candidates per requested result, so the
/// skill-level filter has something left to keep.
const RECOMMENDATION_CANDIDATE_FACTOR: usize = 4;

/// Emit a tracing event at a level chosen at runtime.
macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {{
        let level: Level = $level;
        if level == Level::ERROR {
            tracing::error!($($arg)+);
        } else if level == Level::WARN {
            tracing::warn!($($arg)+);
        } else if level == Level::INFO {
            tracing::info!($($arg)+);
        } else if level == Level::DEBUG {
            tracing::debug!($($arg)+);
        } else {
            tracing::trace!($($arg)+);
        }
    }};
}

/// Levels for the engine's own lifecycle events. Where the events go is decided by
/// the caller's tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevels {
    pub load_success: Level,
    pub load_failure: Level,
    pub search_failure: Level,
}

impl Default for LogLevels {
    fn default() -> Self {
        Self {
            load_success: Level::INFO,
            load_failure: Level::ERROR,
            search_failure: Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub log_levels: LogLevels,
}

pub struct QueryEngine {
    catalog: Arc<Catalog>,
    texts: Vec<String>,
    options: EngineOptions,
}

impl QueryEngine {
    pub fn new(catalog: impl Into<Arc<Catalog>>, options: EngineOptions) -> Self {
        let catalog = catalog.into();
        let texts = catalog.courses().iter().map(course_text).collect();
        Self {
            catalog,
            texts,
            options,
        }
    }

    /// Load the catalog at `path` and build an engine over it.
    pub fn open(path: impl AsRef<Path>, options: EngineOptions) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        match Catalog::load(path) {
            Ok(catalog) => {
                event_at!(
                    options.log_levels.load_success,
                    courses = catalog.len(),
                    digest = %catalog.digest(),
                    path = %path.display(),
                    "loaded courses"
                );
                Ok(Self::new(catalog, options))
            }
            Err(e) => {
                event_at!(
                    options.log_levels.load_failure,
                    error = %e,
                    path = %path.display(),
                    "failed to load course catalog"
                );
                Err(e)
            }
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn courses(&self) -> &[Course] {
        self.catalog.courses()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Rank courses by keyword overlap with `query`, best first.
    ///
    /// Courses scoring zero are dropped. Equal scores keep catalog order. At most
    /// `top_k` results are returned, ranked from 1.
    pub fn try_search_courses(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut scored: Vec<(usize, f32)> = Vec::new();
        for (idx, text) in self.texts.iter().enumerate() {
            let score = scorer::score(query, text);
            if !score.is_finite() {
                return Err(SearchError::InvalidScore {
                    course_id: self.catalog.courses()[idx].id.clone(),
                    score,
                });
            }
            if score > 0.0 {
                scored.push((idx, score));
            }
        }

        // stable: ties stay in catalog order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let courses = self.catalog.courses();
        Ok(scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(i, (idx, score))| SearchResult {
                course: courses[idx].clone(),
                similarity_score: score,
                rank: i + 1,
            })
            .collect())
    }

    /// Like [`try_search_courses`](Self::try_search_courses), but logs failures and
    /// returns an empty list instead.
    pub fn search_courses(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        self.results_or_empty(query, self.try_search_courses(query, top_k))
    }

    fn results_or_empty(
        &self,
        query: &str,
        outcome: Result<Vec<SearchResult>, SearchError>,
    ) -> Vec<SearchResult> {
        match outcome {
            Ok(results) => results,
            Err(e) => {
                event_at!(
                    self.options.log_levels.search_failure,
                    error = %e,
                    query,
                    "error searching courses"
                );
                Vec::new()
            }
        }
    }

    pub fn get_course_by_id(&self, course_id: &str) -> Option<&Course> {
        self.catalog.courses().iter().find(|c| c.id == course_id)
    }

    /// Courses matching every filter that is set, in catalog order.
    pub fn filter_courses(&self, filter: &CourseFilter) -> Vec<&Course> {
        let category = non_empty(filter.category.as_deref()).map(fold);
        let difficulty = non_empty(filter.difficulty.as_deref()).map(fold);
        let skills: Option<Vec<String>> = filter
            .skills
            .as_ref()
            .filter(|skills| !skills.is_empty())
            .map(|skills| skills.iter().map(|s| fold(s)).collect());

        self.catalog
            .courses()
            .iter()
            .filter(|c| {
                category
                    .as_ref()
                    .map_or(true, |wanted| fold(&c.category) == *wanted)
            })
            .filter(|c| {
                difficulty
                    .as_ref()
                    .map_or(true, |wanted| fold(&c.difficulty) == *wanted)
            })
            .filter(|c| {
                skills.as_ref().map_or(true, |wanted| {
                    c.skills.iter().any(|s| wanted.contains(&fold(s)))
                })
            })
            .collect()
    }

    /// Recommend courses for a learner's interests and background.
    ///
    /// When `skill_level` names a recognized difficulty, only courses at that level
    /// are kept, so fewer than `top_k` results may come back.
    pub fn get_recommendations(&self, request: &RecommendationRequest) -> Vec<SearchResult> {
        let query = [
            request.user_interests.as_str(),
            request.user_background.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        let candidates = request
            .top_k
            .saturating_mul(RECOMMENDATION_CANDIDATE_FACTOR);
        let mut recommendations = self.search_courses(&query, candidates);

        if let Some(level) = recognized_level(&request.skill_level) {
            let level = fold(level);
            recommendations.retain(|r| fold(&r.course.difficulty) == level);
            for (i, result) in recommendations.iter_mut().enumerate() {
                result.rank = i + 1;
            }
        }

        recommendations.truncate(request.top_k);
        recommendations
    }

    /// Distinct categories in first-seen order, compared case-insensitively.
    pub fn categories(&self) -> Vec<CategorySummary> {
        let mut categories: Vec<CategorySummary> = Vec::new();
        for course in self.catalog.courses() {
            match categories
                .iter_mut()
                .find(|c| fold(&c.name) == fold(&course.category))
            {
                Some(existing) => existing.course_count += 1,
                None => categories.push(CategorySummary {
                    name: course.category.clone(),
                    course_count: 1,
                }),
            }
        }
        categories
    }
}

/// Case folding shared by every case-insensitive comparison in the engine.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// The canonical level matching `skill_level`, if it names one.
fn recognized_level(skill_level: &str) -> Option<&'static str> {
    DIFFICULTY_LEVELS
        .iter()
        .copied()
        .find(|level| fold(level) == fold(skill_level))
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::model::Prerequisites;

    fn course(
        id: &str,
        title: &str,
        description: &str,
        category: &str,
        difficulty: &str,
        skills: &[&str],
    ) -> Course {
        Course {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            difficulty: difficulty.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            prerequisites: Prerequisites::default(),
            extra: Map::new(),
        }
    }

    fn example_engine() -> QueryEngine {
        let mut c2 = course(
            "c2",
            "Advanced ML",
            "deep learning with python",
            "ml",
            "Advanced",
            &["python", "ml"],
        );
        c2.prerequisites = Prerequisites::List(vec!["c1".to_string()]);
        let catalog = Catalog::from(vec![
            course(
                "c1",
                "Intro to Python",
                "basics of python programming",
                "programming",
                "Beginner",
                &["python", "syntax"],
            ),
            c2,
        ]);
        QueryEngine::new(catalog, EngineOptions::default())
    }

    fn larger_engine() -> QueryEngine {
        let catalog = Catalog::from(vec![
            course(
                "w1",
                "Web Basics",
                "html and css",
                "Web Development",
                "Beginner",
                &["HTML", "CSS"],
            ),
            course(
                "w2",
                "React Apps",
                "javascript web apps",
                "web development",
                "Intermediate",
                &["JavaScript", "React"],
            ),
            course(
                "d1",
                "Data Analysis",
                "pandas and python for data",
                "Data Science",
                "Intermediate",
                &["Python", "Pandas"],
            ),
            course(
                "d2",
                "Data Engineering",
                "pipelines and sql data",
                "Data Science",
                "Advanced",
                &["SQL", "Spark"],
            ),
            course(
                "s1",
                "Security Fundamentals",
                "network security basics",
                "Cybersecurity",
                "Beginner",
                &["Networking"],
            ),
            course(
                "d3",
                "Intro Data",
                "first steps with data",
                "data science",
                "Beginner",
                &["Excel"],
            ),
        ]);
        QueryEngine::new(catalog, EngineOptions::default())
    }

    #[test]
    fn example_scenario_ties_keep_catalog_order() {
        let engine = example_engine();
        let results = engine.search_courses("python", 5);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].course.id, "c1");
        assert_eq!(results[1].course.id, "c2");
        assert_eq!(results[0].similarity_score, 1.0);
        assert_eq!(results[1].similarity_score, 1.0);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
    }

    #[test]
    fn example_scenario_beginner_recommendation() {
        let engine = example_engine();
        let recs = engine.get_recommendations(
            &RecommendationRequest::new("python").skill_level("beginner"),
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].course.id, "c1");
        assert_eq!(recs[0].rank, 1);
    }

    #[test]
    fn empty_query_returns_nothing() {
        let engine = larger_engine();
        assert!(engine.search_courses("", 10).is_empty());
        assert!(engine.try_search_courses("  ", 10).unwrap().is_empty());
    }

    #[test]
    fn search_respects_top_k_and_ordering() {
        let engine = larger_engine();
        let results = engine.search_courses("data python sql", 2);

        assert_eq!(results.len(), 2);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.rank, i + 1);
            assert!((0.0..=1.0).contains(&r.similarity_score));
        }
        assert!(results[0].similarity_score >= results[1].similarity_score);
        // d1 and d2 match two of three words each; d1 comes first in the catalog
        assert_eq!(results[0].course.id, "d1");
        assert_eq!(results[1].course.id, "d2");
    }

    #[test]
    fn search_drops_zero_scores() {
        let engine = larger_engine();
        let results = engine.search_courses("security", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].course.id, "s1");
    }

    #[test]
    fn search_with_zero_top_k_is_empty() {
        let engine = larger_engine();
        assert!(engine.search_courses("data", 0).is_empty());
    }

    #[test]
    fn mixed_case_query_scores_like_lowercase() {
        let engine = larger_engine();
        let upper = engine.search_courses("Data PYTHON", 10);
        let lower = engine.search_courses("data python", 10);
        assert_eq!(upper, lower);
    }

    #[test]
    fn search_results_are_copies() {
        let engine = example_engine();
        let mut results = engine.search_courses("python", 1);
        results[0].course.title.push_str(" (edited)");
        assert_eq!(engine.get_course_by_id("c1").unwrap().title, "Intro to Python");
    }

    #[test]
    fn search_failure_degrades_to_empty() {
        let engine = example_engine();
        let failed = Err(SearchError::InvalidScore {
            course_id: "c1".to_string(),
            score: f32::NAN,
        });
        assert!(engine.results_or_empty("python", failed).is_empty());

        let ok = engine.try_search_courses("python", 5);
        assert_eq!(engine.results_or_empty("python", ok).len(), 2);
    }

    #[test]
    fn search_failure_level_is_configurable() {
        let options = EngineOptions {
            log_levels: LogLevels {
                search_failure: Level::WARN,
                ..LogLevels::default()
            },
        };
        let engine = QueryEngine::new(Catalog::from(Vec::new()), options);
        let failed = Err(SearchError::InvalidScore {
            course_id: "c9".to_string(),
            score: f32::INFINITY,
        });
        assert!(engine.results_or_empty("anything", failed).is_empty());
    }

    #[test]
    fn case_folding_is_unicode_aware_everywhere() {
        let course_a = course(
            "f1",
            "Écriture créative",
            "atelier d'écriture",
            "Écriture",
            "Beginner",
            &["Rédaction"],
        );
        let course_b = course("f2", "Other", "other", "écriture", "Advanced", &["RÉDACTION"]);
        let engine = QueryEngine::new(
            Catalog::from(vec![course_a, course_b]),
            EngineOptions::default(),
        );

        let by_category = engine.filter_courses(&CourseFilter::default().category("ÉCRITURE"));
        assert_eq!(by_category.len(), 2);
        let by_skill = engine.filter_courses(&CourseFilter::default().skills(["rédaction"]));
        assert_eq!(by_skill.len(), 2);
        assert_eq!(engine.categories().len(), 1);

        let recs = engine.get_recommendations(
            &RecommendationRequest::new("écriture").skill_level("BEGINNER"),
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].course.id, "f1");
    }

    #[test]
    fn lookup_by_id() {
        let engine = example_engine();
        let found = engine.get_course_by_id("c2").expect("c2 exists");
        assert_eq!(found, &engine.courses()[1]);
        assert!(engine.get_course_by_id("C2").is_none());
        assert!(engine.get_course_by_id("missing").is_none());
    }

    #[test]
    fn filter_by_category_is_case_insensitive() {
        let engine = larger_engine();
        let found = engine.filter_courses(&CourseFilter::default().category("DATA SCIENCE"));
        let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["d1", "d2", "d3"]);
        for c in &found {
            assert!(engine.courses().contains(*c));
        }
    }

    #[test]
    fn filters_compose() {
        let engine = larger_engine();
        let found = engine.filter_courses(
            &CourseFilter::default()
                .category("data science")
                .difficulty("beginner"),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "d3");
    }

    #[test]
    fn filter_by_any_skill() {
        let engine = larger_engine();
        let found =
            engine.filter_courses(&CourseFilter::default().skills(["react", "SQL", "rust"]));
        let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["w2", "d2"]);
    }

    #[test]
    fn empty_filters_return_everything() {
        let engine = larger_engine();
        assert_eq!(engine.filter_courses(&CourseFilter::default()).len(), 6);
        let blank = CourseFilter {
            category: Some(String::new()),
            difficulty: Some(String::new()),
            skills: Some(Vec::new()),
        };
        assert_eq!(engine.filter_courses(&blank).len(), 6);
    }

    #[test]
    fn unmatched_filter_is_empty() {
        let engine = larger_engine();
        assert!(engine
            .filter_courses(&CourseFilter::default().category("cooking"))
            .is_empty());
    }

    #[test]
    fn recommendations_filter_by_level_and_truncate() {
        let engine = larger_engine();
        let recs = engine.get_recommendations(
            &RecommendationRequest::new("data")
                .background("python")
                .skill_level("Intermediate")
                .top_k(3),
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].course.id, "d1");

        let recs = engine.get_recommendations(&RecommendationRequest::new("data").top_k(2));
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.rank <= 2));
    }

    #[test]
    fn recommendations_never_mismatch_level() {
        let engine = larger_engine();
        for level in ["beginner", "Intermediate", "ADVANCED"] {
            let recs = engine.get_recommendations(
                &RecommendationRequest::new("data web security")
                    .skill_level(level)
                    .top_k(5),
            );
            assert!(recs.len() <= 5);
            for (i, r) in recs.iter().enumerate() {
                assert_eq!(r.course.difficulty.to_lowercase(), level.to_lowercase());
                assert_eq!(r.rank, i + 1);
            }
        }
    }

    #[test]
    fn unrecognized_level_does_not_filter() {
        let engine = larger_engine();
        let recs = engine.get_recommendations(
            &RecommendationRequest::new("data").skill_level("expert").top_k(10),
        );
        assert_eq!(recs.len(), 3);
    }

    #[test]
    fn recommendations_with_no_input_are_empty() {
        let engine = larger_engine();
        assert!(engine
            .get_recommendations(&RecommendationRequest::new(""))
            .is_empty());
    }

    #[test]
    fn categories_in_first_seen_order() {
        let engine = larger_engine();
        let categories = engine.categories();
        let summary: Vec<(&str, usize)> = categories
            .iter()
            .map(|c| (c.name.as_str(), c.course_count))
            .collect();
        assert_eq!(
            summary,
            [("Web Development", 2), ("Data Science", 3), ("Cybersecurity", 1)]
        );
    }

    #[test]
    fn open_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = QueryEngine::open(dir.path().join("nope.json"), EngineOptions::default());
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn open_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("course_data.json");
        std::fs::write(
            &path,
            r#"{"courses": [{"id": "c1", "title": "Intro to Python", "description": "",
                "category": "programming", "difficulty": "Beginner",
                "skills": ["python"], "prerequisites": "None"}]}"#,
        )
        .unwrap();

        let engine = QueryEngine::open(&path, EngineOptions::default()).unwrap();
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.search_courses("python", 5).len(), 1);
    }
}
