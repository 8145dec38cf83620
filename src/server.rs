//! Router assembly. Everything under /api/v1 sits behind the JWT middleware
//! except token issuance; `/` and `/health` are public.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, feedback, projects, requests, rotations, tasks, users};
use crate::middleware::jwt_auth_middleware;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

pub fn app(store: Arc<dyn Store>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/user/token/", post(auth::token_obtain))
        .route("/api/v1/user/token/refresh/", post(auth::token_refresh))
        .merge(protected_routes())
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn protected_routes() -> Router {
    Router::new()
        .route("/api/v1/user/whoami/", get(auth::whoami))
        // Profiles
        .route(
            "/api/v1/user/trainers/",
            get(users::trainers_list).post(users::trainers_create),
        )
        .route(
            "/api/v1/user/trainers/:id/",
            get(users::trainers_get)
                .put(users::trainers_update)
                .delete(users::trainers_delete),
        )
        .route(
            "/api/v1/user/mentors/",
            get(users::mentors_list).post(users::mentors_create),
        )
        .route(
            "/api/v1/user/mentors/:id/",
            get(users::mentors_get)
                .put(users::mentors_update)
                .delete(users::mentors_delete),
        )
        .route(
            "/api/v1/user/apprentices/",
            get(users::apprentices_list).post(users::apprentices_create),
        )
        .route(
            "/api/v1/user/apprentices/:id/",
            get(users::apprentices_get)
                .put(users::apprentices_update)
                .delete(users::apprentices_delete),
        )
        // Projects
        .route(
            "/api/v1/projects/",
            get(projects::list).post(projects::create),
        )
        .route(
            "/api/v1/projects/:id/",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        // Tasks
        .route("/api/v1/tasks/", get(tasks::list).post(tasks::create))
        .route(
            "/api/v1/tasks/:id/",
            get(tasks::get).put(tasks::update).delete(tasks::delete),
        )
        // Feedback
        .route(
            "/api/v1/feedback/",
            get(feedback::list).post(feedback::create),
        )
        .route(
            "/api/v1/feedback/:id/",
            get(feedback::get).put(feedback::update),
        )
        .route("/api/v1/feedback/project/:id/", get(feedback::by_project))
        .route(
            "/api/v1/feedback/apprentice/:id/",
            get(feedback::by_apprentice),
        )
        // Rotations
        .route("/api/v1/rotations/", get(rotations::list))
        .route("/api/v1/rotations/departments/", get(rotations::departments))
        // Approvable requests
        .route("/api/v1/requests/", get(requests::list_all))
        .route("/api/v1/requests/pending/", get(requests::list_pending))
        .route("/api/v1/requests/processed/", get(requests::list_processed))
        .route(
            "/api/v1/requests/:kind/:id/approve/",
            post(requests::approve),
        )
        .route(
            "/api/v1/requests/project/join/",
            post(requests::create_join),
        )
        .route(
            "/api/v1/requests/project/leave/",
            post(requests::create_leave),
        )
        .route(
            "/api/v1/requests/rotation/change/",
            post(requests::create_rotation_change),
        )
        .route(
            "/api/v1/requests/mentor/leave/",
            post(requests::create_mentor_leave),
        )
        .route(
            "/api/v1/requests/apprentice/removal/",
            post(requests::create_apprentice_removal),
        )
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Apprentice API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "token": "/api/v1/user/token/ (public)",
                "profiles": "/api/v1/user/{trainers,mentors,apprentices}/ (protected)",
                "projects": "/api/v1/projects/ (protected)",
                "tasks": "/api/v1/tasks/ (protected)",
                "feedback": "/api/v1/feedback/ (protected)",
                "rotations": "/api/v1/rotations/ (protected)",
                "requests": "/api/v1/requests/ (protected)",
            }
        }
    }))
}

async fn health(Extension(state): Extension<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt, Claims};
    use crate::domain::Role;
    use crate::testing::MemStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        store: Arc<MemStore>,
        router: Router,
    }

    fn test_app() -> TestApp {
        let store = Arc::new(MemStore::new());
        let router = app(store.clone());
        TestApp { store, router }
    }

    fn token_for(id: Uuid, role: Role, staff: bool) -> String {
        let claims = Claims::new(id, format!("{}@example.com", role), role, staff);
        generate_jwt(&claims).unwrap()
    }

    fn get_with_token(path: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(path: &str, token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app();
        let response = app
            .router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let app = test_app();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/requests/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = test_app();
        let response = app
            .router
            .oneshot(get_with_token("/api/v1/requests/", "not.a.jwt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn request_listing_is_trainer_gated() {
        let app = test_app();
        let trainer = app.store.add_trainer("trainer@example.com");
        let project = app.store.add_project("billing");
        let mentor = app.store.add_mentor("mentor@example.com", trainer, Some(project));
        let apprentice =
            app.store
                .add_apprentice("apprentice@example.com", trainer, Some(mentor), Some(project));

        let response = app
            .router
            .clone()
            .oneshot(get_with_token(
                "/api/v1/requests/",
                &token_for(apprentice, Role::Apprentice, false),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .router
            .oneshot(get_with_token(
                "/api/v1/requests/",
                &token_for(trainer, Role::Trainer, false),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn join_request_lifecycle_over_http() {
        let app = test_app();
        let trainer = app.store.add_trainer("trainer@example.com");
        let project = app.store.add_project("billing");
        let mentor = app.store.add_mentor("mentor@example.com", trainer, Some(project));
        let apprentice =
            app.store
                .add_apprentice("apprentice@example.com", trainer, Some(mentor), Some(project));
        let apprentice_token = token_for(apprentice, Role::Apprentice, false);

        let payload = serde_json::json!({
            "apprentice": apprentice,
            "project": project,
            "reason": "interested in billing"
        });

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/v1/requests/project/join/",
                &apprentice_token,
                payload.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "pending");
        let request_id = body["data"]["id"].as_str().unwrap().to_string();

        // Duplicate pending join for the same pair conflicts
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/v1/requests/project/join/",
                &apprentice_token,
                payload,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let trainer_token = token_for(trainer, Role::Trainer, false);
        let response = app
            .router
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/requests/join/{}/approve/", request_id),
                &trainer_token,
                serde_json::json!({ "status": "approved", "admin_notes": "ok" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "approved");
        assert_eq!(body["data"]["admin_notes"], "ok");

        let response = app
            .router
            .oneshot(post_json(
                &format!("/api/v1/requests/vacation/{}/approve/", request_id),
                &trainer_token,
                serde_json::json!({ "status": "approved" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn smuggled_status_in_create_payload_is_ignored() {
        let app = test_app();
        let trainer = app.store.add_trainer("trainer@example.com");
        let project = app.store.add_project("billing");
        let mentor = app.store.add_mentor("mentor@example.com", trainer, Some(project));
        let apprentice =
            app.store
                .add_apprentice("apprentice@example.com", trainer, Some(mentor), Some(project));

        let response = app
            .router
            .oneshot(post_json(
                "/api/v1/requests/project/join/",
                &token_for(apprentice, Role::Apprentice, false),
                serde_json::json!({
                    "apprentice": apprentice,
                    "project": project,
                    "reason": "let me in",
                    "status": "approved"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], "pending");
        assert!(body["data"].get("reviewed_by").is_none());
    }

    #[tokio::test]
    async fn malformed_approve_id_is_bad_request() {
        let app = test_app();
        let trainer = app.store.add_trainer("trainer@example.com");

        let response = app
            .router
            .oneshot(post_json(
                "/api/v1/requests/join/not-a-uuid/approve/",
                &token_for(trainer, Role::Trainer, false),
                serde_json::json!({ "status": "approved" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn token_obtain_and_whoami_round_trip() {
        let app = test_app();
        let trainer = app.store.add_trainer("trainer@example.com");
        // Seed a usable credential
        let digest = crate::auth::password_digest("trainer@example.com", "hunter2");
        app.store
            .update_user(
                trainer,
                crate::store::UserUpdate {
                    password_digest: Some(digest),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/user/token/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "email": "trainer@example.com",
                            "password": "hunter2"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let response = app
            .router
            .oneshot(get_with_token("/api/v1/user/whoami/", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["email"], "trainer@example.com");
        assert_eq!(body["data"]["role"], "trainer");
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let app = test_app();
        app.store.add_trainer("trainer@example.com");

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/user/token/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "email": "trainer@example.com",
                            "password": "wrong"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
