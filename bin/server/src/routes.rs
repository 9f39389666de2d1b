//! HTTP routes: webhook ingress and manual execution.
//!
//! Every route authenticates and validates before anything touches the
//! workflow engine: a request that fails signature verification is rejected
//! with no side effects.

use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use flowline_core::WorkflowId;
use flowline_ingress::{
    SignatureError, google_form_initial_data, parse_google_form_payload, stripe_initial_data,
    verify_signature, verify_stripe_signature,
};
use flowline_workflow::Workflow;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tower_http::trace::TraceLayer;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/webhooks/google-form", post(google_form_webhook))
        .route("/api/webhooks/stripe", post(stripe_webhook))
        .route("/api/workflows/{workflow_id}/execute", post(execute_workflow))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query parameters shared by the webhook routes.
#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    #[serde(rename = "workflowId")]
    workflow_id: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(json!({"success": false, "error": error.into()})),
    )
        .into_response()
}

fn parse_workflow_id(raw: &str) -> Result<WorkflowId, Response> {
    raw.parse().map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("invalid workflow id: {raw}"),
        )
    })
}

async fn fetch_workflow(state: &AppState, workflow_id: WorkflowId) -> Result<Workflow, Response> {
    match state.workflows.get(workflow_id).await {
        Ok(Some(workflow)) => Ok(workflow),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "workflow not found")),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

async fn launch(state: &AppState, workflow_id: WorkflowId, initial: JsonValue) -> Option<Response> {
    match state.launcher.launch(workflow_id, initial).await {
        Ok(()) => None,
        Err(e) => Some(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

/// `POST /api/webhooks/google-form?workflowId=...`
///
/// Verifies the HMAC signature over the raw body when the workflow has a
/// webhook secret, validates the payload shape, and launches a run seeded
/// with the form submission under `googleForm`.
pub async fn google_form_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let workflow_id = match parse_workflow_id(&query.workflow_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let workflow = match fetch_workflow(&state, workflow_id).await {
        Ok(workflow) => workflow,
        Err(response) => return response,
    };

    if let Some(secret) = workflow.webhook_secret.as_deref().filter(|s| !s.is_empty()) {
        let Some(signature) = headers
            .get("x-webhook-signature")
            .and_then(|value| value.to_str().ok())
        else {
            return error_response(StatusCode::UNAUTHORIZED, SignatureError::Missing.to_string());
        };

        if !verify_signature(secret, &body, signature) {
            return error_response(StatusCode::UNAUTHORIZED, SignatureError::Invalid.to_string());
        }
    }

    let payload = match parse_google_form_payload(&body) {
        Ok(payload) => payload,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let raw: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);
    let initial = google_form_initial_data(&payload, &raw);

    if let Some(response) = launch(&state, workflow_id, initial).await {
        return response;
    }

    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Webhook processed successfully"})),
    )
        .into_response()
}

/// `POST /api/webhooks/stripe?workflowId=...`
///
/// Verifies the `stripe-signature` header against the workflow's signing
/// secret and launches a run seeded with the event under `stripe`.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let workflow_id = match parse_workflow_id(&query.workflow_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let workflow = match fetch_workflow(&state, workflow_id).await {
        Ok(workflow) => workflow,
        Err(response) => return response,
    };

    let Some(secret) = workflow
        .stripe_webhook_secret
        .as_deref()
        .filter(|s| !s.is_empty())
    else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Stripe webhook secret not configured for this workflow",
        );
    };

    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
    else {
        return error_response(StatusCode::UNAUTHORIZED, SignatureError::Missing.to_string());
    };

    if let Err(e) = verify_stripe_signature(
        secret,
        &body,
        signature,
        state.stripe_tolerance_seconds,
        Utc::now(),
    ) {
        return error_response(StatusCode::UNAUTHORIZED, e.to_string());
    }

    let event: JsonValue = match serde_json::from_str(&body) {
        Ok(event) => event,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("invalid payload: {e}")),
    };
    let initial = stripe_initial_data(&event);

    if let Some(response) = launch(&state, workflow_id, initial).await {
        return response;
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Webhook processed successfully",
            "eventId": event.get("id").cloned().unwrap_or(JsonValue::Null),
        })),
    )
        .into_response()
}

/// Request body of the manual execute route.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecuteRequest {
    initial_data: JsonValue,
}

/// `POST /api/workflows/{workflow_id}/execute`
///
/// Manual trigger: schedules a run with the caller-provided initial data.
pub async fn execute_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
    body: Option<Json<ExecuteRequest>>,
) -> Response {
    let workflow_id = match parse_workflow_id(&workflow_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if let Err(response) = fetch_workflow(&state, workflow_id).await {
        return response;
    }

    let initial = body.map(|Json(request)| request.initial_data).unwrap_or(JsonValue::Null);
    if let Some(response) = launch(&state, workflow_id, initial).await {
        return response;
    }

    (
        StatusCode::OK,
        Json(json!({"success": true, "message": "Execution scheduled"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flowline_core::UserId;
    use flowline_ingress::{LaunchError, RunLauncher, sign_payload};
    use flowline_workflow::{MemoryWorkflowStore, WorkflowStore};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingLauncher {
        launches: Mutex<Vec<(WorkflowId, JsonValue)>>,
    }

    impl RecordingLauncher {
        async fn count(&self) -> usize {
            self.launches.lock().await.len()
        }
    }

    #[async_trait]
    impl RunLauncher for RecordingLauncher {
        async fn launch(
            &self,
            workflow_id: WorkflowId,
            initial_data: JsonValue,
        ) -> Result<(), LaunchError> {
            self.launches.lock().await.push((workflow_id, initial_data));
            Ok(())
        }
    }

    async fn state_with(workflow: Workflow) -> (AppState, Arc<RecordingLauncher>) {
        let store = Arc::new(MemoryWorkflowStore::new());
        store.insert(workflow).await;
        let launcher = Arc::new(RecordingLauncher::default());
        (
            AppState {
                workflows: store as Arc<dyn WorkflowStore>,
                launcher: Arc::clone(&launcher) as Arc<dyn RunLauncher>,
                stripe_tolerance_seconds: 300,
            },
            launcher,
        )
    }

    fn form_body() -> String {
        json!({
            "formId": "form-1",
            "formTitle": "Feedback",
            "responseId": "resp-1",
            "timestamp": "2024-03-01T10:00:00Z",
            "responses": {"Your Name": "Amy"}
        })
        .to_string()
    }

    fn query_for(workflow: &Workflow) -> Query<WebhookQuery> {
        Query(WebhookQuery {
            workflow_id: workflow.id.to_string(),
        })
    }

    #[tokio::test]
    async fn stripe_invalid_signature_launches_nothing() {
        let mut workflow = Workflow::new(UserId::new(), "Payments");
        workflow.stripe_webhook_secret = Some("whsec_test".to_string());
        let query = query_for(&workflow);
        let (state, launcher) = state_with(workflow).await;

        let mut headers = HeaderMap::new();
        headers.insert(
            "stripe-signature",
            format!("t={},v1=deadbeef", Utc::now().timestamp())
                .parse()
                .expect("header"),
        );

        let response = stripe_webhook(
            State(state),
            query,
            headers,
            json!({"id": "evt_1"}).to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(launcher.count().await, 0);
    }

    #[tokio::test]
    async fn stripe_valid_signature_launches_run() {
        let mut workflow = Workflow::new(UserId::new(), "Payments");
        workflow.stripe_webhook_secret = Some("whsec_test".to_string());
        let query = query_for(&workflow);
        let workflow_id = workflow.id;
        let (state, launcher) = state_with(workflow).await;

        let body = json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": Utc::now().timestamp(),
            "data": {"object": {"amount_total": 4200}}
        })
        .to_string();
        let timestamp = Utc::now().timestamp();
        let signature = sign_payload("whsec_test", &format!("{timestamp}.{body}"));
        let mut headers = HeaderMap::new();
        headers.insert(
            "stripe-signature",
            format!("t={timestamp},v1={signature}").parse().expect("header"),
        );

        let response = stripe_webhook(State(state), query, headers, body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let launches = launcher.launches.lock().await;
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].0, workflow_id);
        assert_eq!(launches[0].1["stripe"]["eventId"], "evt_1");
    }

    #[tokio::test]
    async fn stripe_without_configured_secret_is_unauthorized() {
        let workflow = Workflow::new(UserId::new(), "Payments");
        let query = query_for(&workflow);
        let (state, launcher) = state_with(workflow).await;

        let response =
            stripe_webhook(State(state), query, HeaderMap::new(), "{}".to_string()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(launcher.count().await, 0);
    }

    #[tokio::test]
    async fn google_form_missing_signature_is_unauthorized() {
        let mut workflow = Workflow::new(UserId::new(), "Forms");
        workflow.webhook_secret = Some("secret".to_string());
        let query = query_for(&workflow);
        let (state, launcher) = state_with(workflow).await;

        let response =
            google_form_webhook(State(state), query, HeaderMap::new(), form_body()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(launcher.count().await, 0);
    }

    #[tokio::test]
    async fn google_form_valid_signature_launches_run() {
        let mut workflow = Workflow::new(UserId::new(), "Forms");
        workflow.webhook_secret = Some("secret".to_string());
        let query = query_for(&workflow);
        let (state, launcher) = state_with(workflow).await;

        let body = form_body();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-webhook-signature",
            sign_payload("secret", &body).parse().expect("header"),
        );

        let response = google_form_webhook(State(state), query, headers, body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let launches = launcher.launches.lock().await;
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].1["googleForm"]["responses"]["Your Name"], "Amy");
    }

    #[tokio::test]
    async fn google_form_without_secret_skips_verification() {
        let workflow = Workflow::new(UserId::new(), "Forms");
        let query = query_for(&workflow);
        let (state, launcher) = state_with(workflow).await;

        let response =
            google_form_webhook(State(state), query, HeaderMap::new(), form_body()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(launcher.count().await, 1);
    }

    #[tokio::test]
    async fn google_form_invalid_payload_is_bad_request() {
        let workflow = Workflow::new(UserId::new(), "Forms");
        let query = query_for(&workflow);
        let (state, launcher) = state_with(workflow).await;

        let response = google_form_webhook(
            State(state),
            query,
            HeaderMap::new(),
            json!({"formTitle": "no id"}).to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(launcher.count().await, 0);
    }

    #[tokio::test]
    async fn execute_unknown_workflow_is_not_found() {
        let workflow = Workflow::new(UserId::new(), "Other");
        let (state, launcher) = state_with(workflow).await;

        let response = execute_workflow(
            State(state),
            Path(WorkflowId::new().to_string()),
            Some(Json(ExecuteRequest::default())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(launcher.count().await, 0);
    }

    #[tokio::test]
    async fn execute_schedules_run_with_initial_data() {
        let workflow = Workflow::new(UserId::new(), "Manual");
        let workflow_id = workflow.id;
        let (state, launcher) = state_with(workflow).await;

        let response = execute_workflow(
            State(state),
            Path(workflow_id.to_string()),
            Some(Json(ExecuteRequest {
                initial_data: json!({"trigger": {"user": "Amy"}}),
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let launches = launcher.launches.lock().await;
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].1["trigger"]["user"], "Amy");
    }
}
