use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{
    CategorySummary, ChatMessage, Course, Prerequisites, SearchResult, UserProfile,
};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchCoursesParams {
    /// Free-text query, e.g. "python for data analysis".
    pub query: String,
    /// Maximum number of results to return (default: 5, max: 50).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCourseParams {
    /// Course ID exactly as it appears in the catalog, e.g. "c1".
    pub course_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FilterCoursesParams {
    /// Category name, matched case-insensitively.
    pub category: Option<String>,
    /// Difficulty level such as "Beginner", matched case-insensitively.
    pub difficulty: Option<String>,
    /// Keep courses teaching at least one of these skills.
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetRecommendationsParams {
    /// What the learner wants to learn.
    pub user_interests: String,
    /// The learner's background and experience.
    pub user_background: Option<String>,
    /// "Beginner", "Intermediate" or "Advanced"; other values do not filter.
    pub skill_level: Option<String>,
    /// Maximum number of recommendations (default: 3, max: 50).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendationContextParams {
    /// The learner's latest message.
    pub user_message: String,
    pub user_interests: Option<String>,
    pub user_background: Option<String>,
    pub skill_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChatMessageParam {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExtractUserProfileParams {
    /// Conversation history, oldest first.
    pub messages: Vec<ChatMessageParam>,
}

impl From<ChatMessageParam> for ChatMessage {
    fn from(param: ChatMessageParam) -> Self {
        ChatMessage {
            role: param.role,
            content: param.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CourseDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub skills: Vec<String>,
    pub prerequisites: Vec<String>,
    /// Any further fields present in the source data, such as `duration`,
    /// `provider`, `rating` or `enrollment_count`, as the source wrote them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&Course> for CourseDetail {
    fn from(course: &Course) -> Self {
        let prerequisites = match &course.prerequisites {
            p if p.is_empty() => Vec::new(),
            Prerequisites::List(items) => items.clone(),
            Prerequisites::Text(text) => vec![text.clone()],
        };
        CourseDetail {
            id: course.id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            difficulty: course.difficulty.clone(),
            skills: course.skills.clone(),
            prerequisites,
            extra: course.extra.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CourseSearchResult {
    pub rank: usize,
    pub similarity_score: f32,
    #[serde(flatten)]
    pub course: CourseDetail,
}

/// Keys computed per query. Source fields with these names are dropped so they
/// cannot shadow the computed values in the flattened output.
const COMPUTED_KEYS: [&str; 2] = ["rank", "similarity_score"];

impl From<&SearchResult> for CourseSearchResult {
    fn from(result: &SearchResult) -> Self {
        let mut course = CourseDetail::from(&result.course);
        for key in COMPUTED_KEYS {
            course.extra.remove(key);
        }
        CourseSearchResult {
            rank: result.rank,
            similarity_score: result.similarity_score,
            course,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchCoursesResponse {
    pub results: Vec<CourseSearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CourseListResponse {
    pub total: usize,
    pub courses: Vec<CourseDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryInfo {
    pub name: String,
    pub course_count: usize,
}

impl From<CategorySummary> for CategoryInfo {
    fn from(summary: CategorySummary) -> Self {
        CategoryInfo {
            name: summary.name,
            course_count: summary.course_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserProfileResponse {
    pub interests: String,
    pub background: String,
    pub skill_level: String,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        UserProfileResponse {
            interests: profile.interests,
            background: profile.background,
            skill_level: profile.skill_level,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationContextResponse {
    /// Prompt context describing the recommended courses.
    pub context: String,
    pub courses: Vec<CourseSearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogInfoResponse {
    pub course_count: usize,
    pub category_count: usize,
    /// SHA-256 of the loaded course data file.
    pub digest: String,
    pub difficulty_levels: Vec<String>,
}
