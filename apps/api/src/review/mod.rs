//! Resume review: stores review requests and returns the canned analysis.
//!
//! There is no real scoring engine behind this; the analysis is a fixed
//! fixture. Uploaded file contents are never parsed — only the file name is
//! recorded alongside the result.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::review::ReviewRow;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionFeedback {
    pub score: i32,
    pub feedback: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSections {
    pub content: SectionFeedback,
    pub format: SectionFeedback,
    pub ats: SectionFeedback,
}

/// The full analysis payload returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnalysis {
    pub overall_score: i32,
    pub sections: ReviewSections,
    pub keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

/// The canned analysis every review receives.
pub fn canned_analysis() -> ReviewAnalysis {
    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    ReviewAnalysis {
        overall_score: 72,
        sections: ReviewSections {
            content: SectionFeedback {
                score: 68,
                feedback: strings(&[
                    "Your professional summary could be more impactful.",
                    "Work experience lacks quantifiable achievements.",
                    "Education section is well-structured.",
                ]),
                improvements: strings(&[
                    "Add metrics to demonstrate your impact (e.g., 'Increased sales by 25%').",
                    "Use stronger action verbs at the beginning of each bullet point.",
                    "Include more specific technical skills relevant to your target role.",
                ]),
            },
            format: SectionFeedback {
                score: 85,
                feedback: strings(&[
                    "Resume layout is clean and professional.",
                    "Font sizes and spacing are appropriate.",
                    "Section headings should be more prominent for better scannability.",
                ]),
                improvements: strings(&[
                    "Consider using a single-column format for better ATS compatibility.",
                    "Add more white space between sections for improved readability.",
                    "Ensure consistent formatting of dates and locations.",
                ]),
            },
            ats: SectionFeedback {
                score: 64,
                feedback: strings(&[
                    "Missing several keywords relevant to your target job.",
                    "Some formatting may cause issues with ATS parsing.",
                    "Contact information is clearly presented.",
                ]),
                improvements: strings(&[
                    "Include these keywords: JavaScript, React, Node.js, TypeScript, API.",
                    "Remove tables, headers, footers, and graphic elements.",
                    "Use standard section headings like 'Experience' and 'Education'.",
                ]),
            },
        },
        keywords: strings(&["software", "development", "communication", "team", "project"]),
        missing_keywords: strings(&["JavaScript", "React", "Node.js", "TypeScript", "API"]),
    }
}

#[derive(Deserialize)]
pub struct CreateReviewBody {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "resumeId")]
    pub resume_id: Option<Uuid>,
    #[serde(rename = "fileName")]
    pub file_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// POST /api/reviews
///
/// A review must reference either a saved resume or an uploaded file.
pub async fn handle_create_review(
    State(state): State<AppState>,
    Json(body): Json<CreateReviewBody>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewRow>>), AppError> {
    if body.resume_id.is_none() && body.file_name.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::Validation(
            "A review must reference a saved resume or an uploaded file".to_string(),
        ));
    }
    if let Some(resume_id) = body.resume_id {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM resumes WHERE id = $1")
            .bind(resume_id)
            .fetch_optional(&state.db)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
        }
    }

    let analysis = canned_analysis();
    let sections = serde_json::to_value(&analysis.sections)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize sections: {e}")))?;

    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        INSERT INTO reviews
            (user_id, resume_id, file_name, overall_score, sections, keywords, missing_keywords)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(body.user_id)
    .bind(body.resume_id)
    .bind(body.file_name)
    .bind(analysis.overall_score)
    .bind(sections)
    .bind(&analysis.keywords)
    .bind(&analysis.missing_keywords)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Resume analyzed successfully", row)),
    ))
}

/// GET /api/reviews?user_id=...
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ApiResponse<Vec<ReviewRow>>>, AppError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(params.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ApiResponse::ok("Reviews fetched", rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_analysis_shape() {
        let analysis = canned_analysis();
        assert_eq!(analysis.overall_score, 72);
        assert_eq!(analysis.sections.content.score, 68);
        assert_eq!(analysis.sections.format.score, 85);
        assert_eq!(analysis.sections.ats.score, 64);
        assert_eq!(analysis.keywords.len(), 5);
        assert_eq!(analysis.missing_keywords.len(), 5);
    }

    #[test]
    fn analysis_serializes_camel_case() {
        let json = serde_json::to_value(canned_analysis()).unwrap();
        assert!(json.get("overallScore").is_some());
        assert!(json.get("missingKeywords").is_some());
    }
}
