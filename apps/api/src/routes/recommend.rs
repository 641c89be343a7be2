use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::recommender::{RecommendationPayload, RecommendationResponse};
use crate::routes::require_user;
use crate::state::AppState;

/// Form fields as submitted, comma-joined; they may differ from the saved
/// profile (the user can edit without saving first).
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub gmail: String,
    pub skills: String,
    pub education: String,
    pub interests: String,
}

#[derive(Debug, Serialize)]
pub struct JobView {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CourseView {
    pub title: String,
    pub platform: String,
    pub link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsView {
    pub summary: Option<String>,
    pub jobs: Vec<JobView>,
    pub courses: Vec<CourseView>,
    /// False when the courses could not be appended to the course log.
    pub course_log_synced: bool,
}

fn render(response: &RecommendationResponse, course_log_synced: bool) -> RecommendationsView {
    RecommendationsView {
        summary: response.summary.clone(),
        jobs: response
            .jobs
            .iter()
            .map(|job| JobView {
                title: job.title().to_string(),
                company: job.company().to_string(),
                location: job.location().to_string(),
                link: job.link().map(str::to_string),
            })
            .collect(),
        courses: response
            .courses
            .iter()
            .map(|course| CourseView {
                title: course.title().to_string(),
                platform: course.platform().to_string(),
                link: course.link().map(str::to_string),
            })
            .collect(),
        course_log_synced,
    }
}

/// POST /api/v1/recommendations
/// Forwards the profile to the webhook, logs returned courses to the
/// spreadsheet best-effort, and returns the rendered suggestions.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendationsView>, AppError> {
    let username = require_user(&state, &headers)?;

    if req.gmail.is_empty()
        || req.skills.is_empty()
        || req.education.is_empty()
        || req.interests.is_empty()
    {
        return Err(AppError::Validation(
            "Please fill in all fields".to_string(),
        ));
    }

    let payload = RecommendationPayload::new(
        &username,
        &req.gmail,
        &req.skills,
        &req.education,
        &req.interests,
    );
    let response = state.recommender.request(&payload).await?;

    let course_log_synced = if response.courses.is_empty() {
        true
    } else {
        match state
            .mirror
            .append_course_rows(&username, &response.courses)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Course log append failed for {username}: {e}");
                false
            }
        }
    };

    Ok(Json(render(&response, course_log_synced)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::test_state;
    use crate::session::SESSION_HEADER;

    #[tokio::test]
    async fn missing_fields_are_rejected_before_any_call() {
        let (_dir, state, _mirror) = test_state();
        let token = state.sessions.open("alice");
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, token.to_string().parse().unwrap());

        let err = handle_recommendations(
            State(state),
            headers,
            Json(RecommendRequest {
                gmail: "alice@example.com".to_string(),
                skills: String::new(),
                education: "B.Sc".to_string(),
                interests: "AI".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn no_session_is_unauthorized() {
        let (_dir, state, _mirror) = test_state();

        let err = handle_recommendations(
            State(state),
            HeaderMap::new(),
            Json(RecommendRequest {
                gmail: "a@x".to_string(),
                skills: "Python".to_string(),
                education: "B.Sc".to_string(),
                interests: "AI".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn rendering_applies_placeholders_and_link_fallback() {
        let response: RecommendationResponse = serde_json::from_str(
            r#"{
                "summary": "ok",
                "jobs": [
                    {"title": "Dev", "company": "Acme", "location": "Remote", "link": "http://a"},
                    {"apply_options": [{"link": "http://b"}]}
                ],
                "courses": [{"title": "ML101", "platform": "Coursera", "link": "http://x"}]
            }"#,
        )
        .unwrap();

        let view = render(&response, true);
        assert_eq!(view.summary.as_deref(), Some("ok"));
        assert_eq!(view.jobs[0].link.as_deref(), Some("http://a"));
        assert_eq!(view.jobs[1].title, "N/A");
        assert_eq!(view.jobs[1].link.as_deref(), Some("http://b"));
        assert_eq!(view.courses[0].title, "ML101");
        assert!(view.course_log_synced);
    }
}
