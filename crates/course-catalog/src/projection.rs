use crate::model::Course;

/// Flatten the searchable fields of a course into one lowercase string.
///
/// Field order: title, description, category, difficulty, skills, prerequisites.
pub fn course_text(course: &Course) -> String {
    let skills = course.skills.join(" ");
    let prerequisites = course.prerequisites.joined();
    let parts: [&str; 6] = [
        &course.title,
        &course.description,
        &course.category,
        &course.difficulty,
        &skills,
        &prerequisites,
    ];
    parts.join(" ").to_lowercase()
}
