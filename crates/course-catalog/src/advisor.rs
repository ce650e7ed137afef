/// Helpers for a conversational course advisor.
///
/// Turns search results into prompt context for a language model and pulls a
/// rough learner profile out of a conversation. No model is called from here.
use std::fmt::Write;

use crate::engine::QueryEngine;
use crate::model::{ChatMessage, Course, RecommendationRequest, SearchResult, UserProfile};

/// Number of courses placed into the context for a single reply.
pub const CONTEXT_COURSE_COUNT: usize = 5;

pub const NO_COURSES_CONTEXT: &str = "No relevant courses found in the database.";

const INTEREST_MARKERS: [&str; 4] = ["interested in", "want to learn", "goal", "passion"];
const BACKGROUND_MARKERS: [&str; 4] = ["experience", "background", "worked as", "studied"];

/// Markdown summary of a single course.
pub fn format_course(course: &Course) -> String {
    let mut out = format!("**{}**\n", course.title);
    let _ = writeln!(out, "- **Category:** {}", course.category);
    let _ = writeln!(out, "- **Difficulty:** {}", course.difficulty);
    if let Some(duration) = course.duration() {
        let _ = writeln!(out, "- **Duration:** {duration}");
    }
    let _ = writeln!(out, "- **Skills:** {}", course.skills.join(", "));
    let _ = writeln!(out, "- **Prerequisites:** {}", course.prerequisites);
    if let Some(provider) = course.provider() {
        let _ = writeln!(out, "- **Provider:** {provider}");
    }
    if let Some(rating) = course.rating() {
        match course.enrollment_count() {
            Some(count) => {
                let _ = writeln!(out, "- **Rating:** {rating}/5.0 ({count} students)");
            }
            None => {
                let _ = writeln!(out, "- **Rating:** {rating}/5.0");
            }
        }
    }
    let _ = writeln!(out, "- **Description:** {}", course.description);
    out
}

/// Numbered plain-text listing of courses, for use as model context.
pub fn build_context<'a, I>(courses: I) -> String
where
    I: IntoIterator<Item = &'a Course>,
{
    let mut context = String::from("Here are the relevant courses from our database:\n\n");
    let mut any = false;
    for (i, course) in courses.into_iter().enumerate() {
        any = true;
        let _ = writeln!(context, "{}. {}", i + 1, course.title);
        let _ = writeln!(context, "   Category: {}", course.category);
        let _ = writeln!(context, "   Difficulty: {}", course.difficulty);
        if let Some(duration) = course.duration() {
            let _ = writeln!(context, "   Duration: {duration}");
        }
        let _ = writeln!(context, "   Skills: {}", course.skills.join(", "));
        let _ = writeln!(context, "   Prerequisites: {}", course.prerequisites);
        let _ = writeln!(context, "   Description: {}", course.description);
        if let Some(provider) = course.provider() {
            let _ = writeln!(context, "   Provider: {provider}");
        }
        if let Some(rating) = course.rating() {
            let _ = writeln!(context, "   Rating: {rating}/5.0");
        }
        context.push('\n');
    }

    if any {
        context
    } else {
        NO_COURSES_CONTEXT.to_string()
    }
}

/// Guess interests, background, and skill level from the user's messages.
///
/// Interest and background text accumulate across messages. The skill level is
/// taken from the latest message that mentions one.
pub fn extract_user_profile(messages: &[ChatMessage]) -> UserProfile {
    let mut interests: Vec<&str> = Vec::new();
    let mut background: Vec<&str> = Vec::new();
    let mut skill_level = "";

    for message in messages.iter().filter(|m| m.role == "user") {
        let text = message.content.to_lowercase();

        if INTEREST_MARKERS.iter().any(|k| text.contains(k)) {
            interests.push(&message.content);
        }
        if BACKGROUND_MARKERS.iter().any(|k| text.contains(k)) {
            background.push(&message.content);
        }

        if text.contains("beginner") || text.contains("new to") {
            skill_level = "Beginner";
        } else if text.contains("intermediate") {
            skill_level = "Intermediate";
        } else if text.contains("advanced") || text.contains("expert") {
            skill_level = "Advanced";
        }
    }

    UserProfile {
        interests: interests.join(" "),
        background: background.join(" "),
        skill_level: skill_level.to_string(),
    }
}

/// Courses and prompt context for answering `user_message`.
#[derive(Debug, Clone)]
pub struct RecommendationContext {
    pub courses: Vec<SearchResult>,
    pub context: String,
}

/// Recommend courses for a message, falling back to the message itself when the
/// profile has no interests yet.
pub fn recommendation_context(
    engine: &QueryEngine,
    user_message: &str,
    profile: &UserProfile,
) -> RecommendationContext {
    let interests = if profile.interests.is_empty() {
        user_message
    } else {
        profile.interests.as_str()
    };
    let request = RecommendationRequest::new(interests)
        .background(profile.background.clone())
        .skill_level(profile.skill_level.clone())
        .top_k(CONTEXT_COURSE_COUNT);

    let courses = engine.get_recommendations(&request);
    let context = build_context(courses.iter().map(|r| &r.course));
    RecommendationContext { courses, context }
}
