/// MCP server exposing the course catalog.
///
/// Tools:
/// - `search_courses`: keyword search, ranked by relevance
/// - `get_course`: look up one course by ID
/// - `filter_courses`: filter by category, difficulty and skills
/// - `get_recommendations`: recommendations from interests, background and level
/// - `list_categories`: categories with course counts
/// - `recommendation_context`: recommendations plus prompt context for a chat reply
/// - `extract_user_profile`: learner profile guessed from a conversation
/// - `catalog_info`: size and fingerprint of the loaded catalog
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::config::Config;
use course_catalog::advisor;
use course_catalog::mcp_api::{
    CatalogInfoResponse, CategoryInfo, CategoryListResponse, CourseDetail, CourseListResponse,
    CourseSearchResult, ExtractUserProfileParams, FilterCoursesParams, GetCourseParams,
    GetRecommendationsParams, RecommendationContextParams, RecommendationContextResponse,
    SearchCoursesParams, SearchCoursesResponse, UserProfileResponse,
};
use course_catalog::model::{
    ChatMessage, CourseFilter, RecommendationRequest, UserProfile, DIFFICULTY_LEVELS,
};
use course_catalog::QueryEngine;

const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;

#[derive(Clone)]
pub struct CourseAdvisorServer {
    engine: Arc<QueryEngine>,
    config: Config,
    tool_router: ToolRouter<CourseAdvisorServer>,
}

impl CourseAdvisorServer {
    pub fn new(engine: Arc<QueryEngine>, config: Config) -> Self {
        Self {
            engine,
            config,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl CourseAdvisorServer {
    #[tool(description = "Search the course catalog by keywords. Returns courses ranked by the fraction of query words they contain.")]
    async fn search_courses(
        &self,
        Parameters(params): Parameters<SearchCoursesParams>,
    ) -> Result<Json<SearchCoursesResponse>, String> {
        if params.query.trim().is_empty() {
            return Err("query must not be empty".to_string());
        }
        let query = params.query;

        let limit = self.config.limit(params.limit, self.config.default_limit);
        let results = self
            .engine
            .try_search_courses(&query, limit)
            .map_err(|e| format!("search failed: {e}"))?;
        info!(query = %query, results = results.len(), "search_courses");

        Ok(Json(SearchCoursesResponse {
            results: results.iter().map(CourseSearchResult::from).collect(),
        }))
    }

    #[tool(description = "Get the full record of a course by its ID.")]
    async fn get_course(
        &self,
        Parameters(params): Parameters<GetCourseParams>,
    ) -> Result<Json<CourseDetail>, String> {
        let course_id = params.course_id.trim().to_string();
        if course_id.is_empty() {
            return Err("course_id must not be empty".to_string());
        }

        let course = self
            .engine
            .get_course_by_id(&course_id)
            .ok_or_else(|| format!("course not found: {course_id}"))?;

        Ok(Json(CourseDetail::from(course)))
    }

    #[tool(description = "Filter courses by category, difficulty (Beginner, Intermediate, Advanced) and skills. All given filters must match; skills match if any one does.")]
    async fn filter_courses(
        &self,
        Parameters(params): Parameters<FilterCoursesParams>,
    ) -> Result<Json<CourseListResponse>, String> {
        let filter = CourseFilter {
            category: params.category,
            difficulty: params.difficulty,
            skills: params.skills,
        };
        let courses: Vec<CourseDetail> = self
            .engine
            .filter_courses(&filter)
            .into_iter()
            .map(CourseDetail::from)
            .collect();

        Ok(Json(CourseListResponse {
            total: courses.len(),
            courses,
        }))
    }

    #[tool(description = "Recommend courses from the learner's interests and background, optionally restricted to a skill level (Beginner, Intermediate, Advanced).")]
    async fn get_recommendations(
        &self,
        Parameters(params): Parameters<GetRecommendationsParams>,
    ) -> Result<Json<SearchCoursesResponse>, String> {
        let interests = params.user_interests.trim().to_string();
        if interests.is_empty() {
            return Err("user_interests must not be empty".to_string());
        }

        let request = RecommendationRequest::new(interests)
            .background(params.user_background.unwrap_or_default())
            .skill_level(params.skill_level.unwrap_or_default())
            .top_k(self.config.limit(params.limit, DEFAULT_RECOMMENDATION_LIMIT));
        let results = self.engine.get_recommendations(&request);

        Ok(Json(SearchCoursesResponse {
            results: results.iter().map(CourseSearchResult::from).collect(),
        }))
    }

    #[tool(description = "List the course categories in the catalog with the number of courses in each.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        let categories = self
            .engine
            .categories()
            .into_iter()
            .map(CategoryInfo::from)
            .collect();
        Ok(Json(CategoryListResponse { categories }))
    }

    #[tool(description = "Build course context for answering a learner's message: recommends courses from the profile (or the message itself) and formats them as prompt text.")]
    async fn recommendation_context(
        &self,
        Parameters(params): Parameters<RecommendationContextParams>,
    ) -> Result<Json<RecommendationContextResponse>, String> {
        let message = params.user_message.trim().to_string();
        if message.is_empty() {
            return Err("user_message must not be empty".to_string());
        }

        let profile = UserProfile {
            interests: params.user_interests.unwrap_or_default(),
            background: params.user_background.unwrap_or_default(),
            skill_level: params.skill_level.unwrap_or_default(),
        };
        let found = advisor::recommendation_context(&self.engine, &message, &profile);

        Ok(Json(RecommendationContextResponse {
            context: found.context,
            courses: found.courses.iter().map(CourseSearchResult::from).collect(),
        }))
    }

    #[tool(description = "Guess the learner's interests, background and skill level from a conversation history.")]
    async fn extract_user_profile(
        &self,
        Parameters(params): Parameters<ExtractUserProfileParams>,
    ) -> Result<Json<UserProfileResponse>, String> {
        let messages: Vec<ChatMessage> =
            params.messages.into_iter().map(ChatMessage::from).collect();
        Ok(Json(advisor::extract_user_profile(&messages).into()))
    }

    #[tool(description = "Report the number of courses and categories in the loaded catalog and its content digest.")]
    async fn catalog_info(&self) -> Result<Json<CatalogInfoResponse>, String> {
        Ok(Json(CatalogInfoResponse {
            course_count: self.engine.len(),
            category_count: self.engine.categories().len(),
            digest: self.engine.catalog().digest().to_string(),
            difficulty_levels: DIFFICULTY_LEVELS.iter().map(|l| l.to_string()).collect(),
        }))
    }
}

#[tool_handler]
impl ServerHandler for CourseAdvisorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "course-advisor".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Course advisor MCP server. Provides keyword search, lookup and \
                 filtering over a fixed course catalog. Use search_courses for free-text \
                 queries, get_course for a specific course ID, filter_courses to browse by \
                 category/difficulty/skills, get_recommendations for learner-specific \
                 suggestions, and recommendation_context to prepare prompt context for a \
                 chat reply."
                    .to_string(),
            ),
        }
    }
}
