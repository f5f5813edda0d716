//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use sessioncraft_domain::{
    DraftPayload, FlexibleSessionOutline, SectionId, SessionId, SessionTemplate, TemplateId,
    ValidationReport,
};
use sessioncraft_shared::{
    AddSectionRequest, CreateTemplateRequest, DuplicateSectionRequest, ErrorBody, ErrorCode,
    GenerateOutlineRequest, GenerateOutlineResponse, HealthResponse, RemoveSectionRequest,
    ReorderSectionsRequest, UpdateSectionRequest, ValidateOutlineRequest,
};

use crate::app::App;
use crate::use_cases::{DraftError, GeneratedOutline, SectionEditError, TemplateError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/templates", get(list_templates).post(create_template))
        .route("/api/templates/{id}", get(get_template))
        .route("/api/outlines/generate", post(generate_outline))
        .route("/api/outlines/validate", post(validate_outline))
        .route("/api/outlines/sections/add", post(add_section))
        .route("/api/outlines/sections/remove", post(remove_section))
        .route("/api/outlines/sections/update", post(update_section))
        .route("/api/outlines/sections/reorder", post(reorder_sections))
        .route("/api/outlines/sections/duplicate", post(duplicate_section))
        .route("/api/drafts/{session_id}", get(get_draft).put(put_draft))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// =============================================================================
// Templates
// =============================================================================

async fn list_templates(State(app): State<Arc<App>>) -> Json<Vec<SessionTemplate>> {
    let templates = app
        .use_cases
        .templates
        .get_templates()
        .iter()
        .map(|t| SessionTemplate::clone(t))
        .collect();
    Json(templates)
}

async fn get_template(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionTemplate>, ApiError> {
    let template = app
        .use_cases
        .templates
        .get_template(TemplateId::from_uuid(id))?;
    Ok(Json(SessionTemplate::clone(&template)))
}

async fn create_template(
    State(app): State<Arc<App>>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<SessionTemplate>), ApiError> {
    let template = app.use_cases.templates.create_custom_template(
        &request.name,
        &request.description,
        &request.sections,
        request.category,
    )?;
    Ok((StatusCode::CREATED, Json(SessionTemplate::clone(&template))))
}

// =============================================================================
// Outlines
// =============================================================================

async fn generate_outline(
    State(app): State<Arc<App>>,
    Json(request): Json<GenerateOutlineRequest>,
) -> Result<Json<GenerateOutlineResponse>, ApiError> {
    if request.brief.category.trim().is_empty() {
        return Err(ApiError::BadRequest("category is required".to_string()));
    }

    let generate = &app.use_cases.outline.generate;
    let generated = if request.legacy {
        generate.execute_legacy(&request.brief).await
    } else {
        generate
            .execute(&request.brief, request.template_id.map(TemplateId::from_uuid))
            .await
    };

    Ok(Json(to_response(generated)))
}

fn to_response(generated: GeneratedOutline) -> GenerateOutlineResponse {
    GenerateOutlineResponse {
        outline: generated.outline,
        relevant_topics: generated.relevant_topics,
        rag_available: generated.provenance.rag_available,
        rag_queried: generated.provenance.rag_queried,
        fallback_used: generated.provenance.fallback_used,
    }
}

async fn validate_outline(
    State(app): State<Arc<App>>,
    Json(request): Json<ValidateOutlineRequest>,
) -> Json<ValidationReport> {
    Json(app.use_cases.outline.sections.validate(&request.outline))
}

async fn add_section(
    State(app): State<Arc<App>>,
    Json(request): Json<AddSectionRequest>,
) -> Result<Json<FlexibleSessionOutline>, ApiError> {
    let outline = app.use_cases.outline.sections.add(
        &request.outline,
        request.section_type,
        &request.section,
        request.position,
    )?;
    Ok(Json(outline))
}

async fn remove_section(
    State(app): State<Arc<App>>,
    Json(request): Json<RemoveSectionRequest>,
) -> Json<FlexibleSessionOutline> {
    Json(
        app.use_cases
            .outline
            .sections
            .remove(&request.outline, SectionId::from_uuid(request.section_id)),
    )
}

async fn update_section(
    State(app): State<Arc<App>>,
    Json(request): Json<UpdateSectionRequest>,
) -> Result<Json<FlexibleSessionOutline>, ApiError> {
    let outline = app.use_cases.outline.sections.update(
        &request.outline,
        SectionId::from_uuid(request.section_id),
        &request.updates,
    )?;
    Ok(Json(outline))
}

async fn reorder_sections(
    State(app): State<Arc<App>>,
    Json(request): Json<ReorderSectionsRequest>,
) -> Result<Json<FlexibleSessionOutline>, ApiError> {
    let order: Vec<SectionId> = request
        .section_ids
        .into_iter()
        .map(SectionId::from_uuid)
        .collect();
    let outline = app
        .use_cases
        .outline
        .sections
        .reorder(&request.outline, &order)?;
    Ok(Json(outline))
}

async fn duplicate_section(
    State(app): State<Arc<App>>,
    Json(request): Json<DuplicateSectionRequest>,
) -> Result<Json<FlexibleSessionOutline>, ApiError> {
    let outline = app
        .use_cases
        .outline
        .sections
        .duplicate(&request.outline, SectionId::from_uuid(request.section_id))?;
    Ok(Json(outline))
}

// =============================================================================
// Drafts
// =============================================================================

async fn get_draft(
    State(app): State<Arc<App>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<DraftPayload>, ApiError> {
    let payload = app
        .use_cases
        .drafts
        .load(SessionId::from_uuid(session_id))
        .await?;
    Ok(Json(payload))
}

async fn put_draft(
    State(app): State<Arc<App>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<DraftPayload>,
) -> Result<Json<DraftPayload>, ApiError> {
    let saved = app
        .use_cases
        .drafts
        .save(SessionId::from_uuid(session_id), payload)
        .await?;
    Ok(Json(saved))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(ErrorCode::NotFound, msg)),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(ErrorCode::BadRequest, msg))
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(ErrorCode::InternalError, "Internal error"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<TemplateError> for ApiError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::NotFound(_) => ApiError::NotFound(e.to_string()),
            TemplateError::MissingName | TemplateError::NoSections => {
                ApiError::BadRequest(e.to_string())
            }
        }
    }
}

impl From<SectionEditError> for ApiError {
    fn from(e: SectionEditError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<DraftError> for ApiError {
    fn from(e: DraftError) -> Self {
        match e {
            DraftError::NotFound(_) => ApiError::NotFound(e.to_string()),
            DraftError::Invalid(_) => ApiError::BadRequest(e.to_string()),
            DraftError::Repo(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use sessioncraft_domain::{Section, SectionType};

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::drafts::SqliteDraftRepo;
    use crate::infrastructure::ports::{
        LlmError, MockDraftRepo, MockLlmPort, MockRagPort, MockTopicRepo,
    };
    use crate::use_cases::GenerationConfig;

    fn offline_sources() -> (MockTopicRepo, MockRagPort, MockLlmPort) {
        let mut topics = MockTopicRepo::new();
        topics
            .expect_find_by_category_and_keywords()
            .returning(|_, _, _| Ok(vec![]));
        topics.expect_find_by_category().returning(|_, _| Ok(vec![]));
        let mut rag = MockRagPort::new();
        rag.expect_is_available().returning(|| Ok(false));
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("offline".into())));
        (topics, rag, llm)
    }

    fn router_with_drafts(drafts: Arc<dyn crate::infrastructure::ports::DraftRepo>) -> Router {
        let (topics, rag, llm) = offline_sources();
        let app = App::new(
            Arc::new(topics),
            drafts,
            Arc::new(rag),
            Arc::new(llm),
            Arc::new(FixedClock(Utc::now())),
            GenerationConfig::default(),
        );
        routes().with_state(Arc::new(app))
    }

    fn router() -> Router {
        router_with_drafts(Arc::new(MockDraftRepo::new()))
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn outline_json(sections: &[Section]) -> Value {
        serde_json::to_value(FlexibleSessionOutline::new(sections.to_vec(), Utc::now())).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(router(), "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn generate_with_everything_offline_returns_fallback() {
        let request = json!({
            "category": "Leadership",
            "sessionType": "workshop",
            "desiredOutcome": "build trust",
            "duration": 60
        });

        let (status, body) = send(router(), "POST", "/api/outlines/generate", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fallbackUsed"], true);
        assert_eq!(body["ragAvailable"], false);
        assert_eq!(body["ragQueried"], false);
        assert_eq!(body["outline"]["totalDuration"], 110);
    }

    #[tokio::test]
    async fn generate_requires_category() {
        let (status, body) = send(
            router(),
            "POST",
            "/api/outlines/generate",
            Some(json!({"category": " "})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn validate_reports_all_violations() {
        let now = Utc::now();
        let sections = [
            Section::new(SectionType::Content, "A", 5, now),
            Section::new(SectionType::Content, "B", 5, now),
            Section::new(SectionType::Activity, "C", 10, now),
        ];

        let (status, body) = send(
            router(),
            "POST",
            "/api/outlines/validate",
            Some(json!({"outline": outline_json(&sections)})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], false);
        assert!(body["errors"].as_array().unwrap().len() >= 3);
    }

    #[tokio::test]
    async fn reorder_with_unknown_id_is_bad_request() {
        let now = Utc::now();
        let sections = [
            Section::new(SectionType::Opener, "A", 10, now),
            Section::new(SectionType::Closing, "B", 20, now),
        ];
        let request = json!({
            "outline": outline_json(&sections),
            "sectionIds": [sections[1].id, Uuid::new_v4()]
        });

        let (status, body) =
            send(router(), "POST", "/api/outlines/sections/reorder", Some(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn duplicate_returns_new_outline() {
        let now = Utc::now();
        let sections = [
            Section::new(SectionType::Opener, "Welcome", 10, now),
            Section::new(SectionType::Closing, "Wrap", 20, now),
        ];
        let request = json!({
            "outline": outline_json(&sections),
            "sectionId": sections[0].id
        });

        let (status, body) =
            send(router(), "POST", "/api/outlines/sections/duplicate", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sections"][1]["title"], "Welcome (Copy)");
        assert_eq!(body["totalDuration"], 40);
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let uri = format!("/api/templates/{}", Uuid::new_v4());
        let (status, body) = send(router(), "GET", &uri, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn created_template_is_listed_after_default() {
        let router = router();
        let sections = vec![Section::new(SectionType::Opener, "Hi", 10, Utc::now())];
        let request = json!({"name": "Quick Sync", "sections": sections});

        let (status, created) =
            send(router.clone(), "POST", "/api/templates", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, listed) = send(router, "GET", "/api/templates", None).await;
        let names: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Standard Training Session", "Quick Sync"]);
        assert_eq!(created["isDefault"], false);
    }

    #[tokio::test]
    async fn drafts_round_trip_through_sqlite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drafts.db");
        let repo = SqliteDraftRepo::new(path.to_str().unwrap(), Arc::new(FixedClock(Utc::now())))
            .await
            .unwrap();
        let router = router_with_drafts(Arc::new(repo));
        let uri = format!("/api/drafts/{}", Uuid::new_v4());

        let (status, _) = send(router.clone(), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let draft = json!({"metadata": {"title": "Kickoff"}, "aiPromptText": "focus on trust"});
        let (status, saved) = send(router.clone(), "PUT", &uri, Some(draft)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(saved["updatedAt"].is_string());

        let (status, loaded) = send(router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(loaded["metadata"]["title"], "Kickoff");
        assert_eq!(loaded["aiPromptText"], "focus on trust");
    }
}
