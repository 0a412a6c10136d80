//! API router — mounts the dashboard endpoints under /api/v1.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{self, AppState};

/// Builds the full application router over the given state.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Contacts
        .route(
            "/api/v1/contacts",
            get(handlers::list_contacts).post(handlers::create_contact),
        )
        .route(
            "/api/v1/contacts/:id",
            get(handlers::get_contact)
                .put(handlers::update_contact)
                .delete(handlers::delete_contact),
        )
        .route("/api/v1/audience", get(handlers::audience_pool))
        // Tags
        .route(
            "/api/v1/tags",
            get(handlers::list_tags).post(handlers::create_tag),
        )
        .route("/api/v1/tags/:id", axum::routing::delete(handlers::delete_tag))
        // Team
        .route(
            "/api/v1/team",
            get(handlers::list_team).post(handlers::add_team_member),
        )
        // Billing
        .route("/api/v1/billing", get(handlers::list_billing))
        // Campaigns
        .route(
            "/api/v1/campaigns",
            get(handlers::list_campaigns).post(handlers::submit_campaign),
        )
        .route("/api/v1/campaigns/:id", get(handlers::get_campaign))
        .route(
            "/api/v1/campaigns/:id/progress",
            get(handlers::campaign_progress),
        )
        .route(
            "/api/v1/campaigns/:id/cancel",
            post(handlers::cancel_campaign),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;
    use uuid::Uuid;

    use zapline_campaigns::CampaignStore;
    use zapline_core::event_bus::noop_sink;
    use zapline_directory::DirectoryStore;
    use zapline_workflow::{CampaignObjective, CampaignSubmission, StepKind, WorkflowStep};

    use super::*;

    fn test_app() -> Router {
        let directory = Arc::new(DirectoryStore::new(noop_sink()));
        directory.seed_demo_data();
        let campaigns = Arc::new(CampaignStore::new(noop_sink()));
        api_router(AppState {
            directory,
            campaigns,
        })
    }

    fn valid_submission() -> CampaignSubmission {
        let mut step = WorkflowStep::new(StepKind::Text);
        step.content = "Hello".to_string();
        CampaignSubmission {
            name: "API test".to_string(),
            scheduled_at: None,
            objective: CampaignObjective::Sales,
            audience: vec![Uuid::new_v4()],
            steps: vec![step],
            min_delay_secs: 5,
            max_delay_secs: 10,
        }
    }

    async fn post_json(app: Router, uri: &str, body: &impl serde::Serialize) -> StatusCode {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_contacts_listing_and_missing_id() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/contacts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/contacts/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_campaign_created_and_unprocessable() {
        let app = test_app();
        assert_eq!(
            post_json(app.clone(), "/api/v1/campaigns", &valid_submission()).await,
            StatusCode::CREATED
        );

        let mut bad = valid_submission();
        bad.audience.clear();
        assert_eq!(
            post_json(app, "/api/v1/campaigns", &bad).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_cancel_unknown_campaign_is_404() {
        let app = test_app();
        let status = post_json(
            app,
            &format!("/api/v1/campaigns/{}/cancel", Uuid::new_v4()),
            &serde_json::json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
