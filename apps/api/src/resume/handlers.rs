//! HTTP handlers for saved resume drafts: create, list, fetch, apply builder
//! updates, and render into a template.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::builder::{apply, ResumeData, ResumeUpdate};
use crate::resume::template::{Document, Template};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateResumeBody {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(default = "default_title")]
    pub title: String,
    pub data: ResumeData,
    #[serde(default = "default_template")]
    pub template: String,
}

fn default_title() -> String {
    "My Resume".to_string()
}

fn default_template() -> String {
    "modern".to_string()
}

/// POST /api/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(body): Json<CreateResumeBody>,
) -> Result<(StatusCode, Json<ApiResponse<ResumeRow>>), AppError> {
    let template = Template::parse(&body.template)?;
    let data = serde_json::to_value(&body.data)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize resume data: {e}")))?;

    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (user_id, title, data, template)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(body.user_id)
    .bind(body.title.trim())
    .bind(data)
    .bind(template.as_str())
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Resume saved successfully", row)),
    ))
}

/// GET /api/resumes?user_id=...
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ApiResponse<Vec<ResumeRow>>>, AppError> {
    let rows = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(params.user_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ApiResponse::ok("Resumes fetched", rows)))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResumeRow>>, AppError> {
    let row = fetch_resume(&state, id).await?;
    Ok(Json(ApiResponse::ok("Resume fetched", row)))
}

#[derive(Deserialize)]
pub struct UpdatesBody {
    pub updates: Vec<ResumeUpdate>,
}

/// POST /api/resumes/:id/updates
///
/// Folds a batch of builder updates over the stored draft and persists the
/// result. The reducer is pure; this is the only write path for form state.
pub async fn handle_apply_updates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatesBody>,
) -> Result<Json<ApiResponse<ResumeRow>>, AppError> {
    let row = fetch_resume(&state, id).await?;
    let data = parse_data(&row.data)?;
    let next = body.updates.into_iter().fold(data, |acc, u| apply(&acc, u));
    let next_value = serde_json::to_value(&next)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize resume data: {e}")))?;

    let updated = sqlx::query_as::<_, ResumeRow>(
        "UPDATE resumes SET data = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(next_value)
    .bind(Utc::now())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ApiResponse::ok("Resume updated", updated)))
}

/// POST /api/resumes/:id/render
///
/// Renders the stored draft with its template (or an override passed in the
/// body) and returns the HTML document.
#[derive(Deserialize, Default)]
pub struct RenderBody {
    pub template: Option<String>,
}

pub async fn handle_render_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<RenderBody>>,
) -> Result<Json<ApiResponse<Document>>, AppError> {
    let row = fetch_resume(&state, id).await?;
    let template_name = body
        .and_then(|Json(b)| b.template)
        .unwrap_or_else(|| row.template.clone());
    let template = Template::parse(&template_name)?;
    let data = parse_data(&row.data)?;
    Ok(Json(ApiResponse::ok(
        "Resume rendered",
        template.render(&data),
    )))
}

async fn fetch_resume(state: &AppState, id: Uuid) -> Result<ResumeRow, AppError> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

fn parse_data(value: &Value) -> Result<ResumeData, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored resume data is malformed: {e}")))
}
