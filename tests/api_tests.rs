//! Integration tests for the Kitchen HTTP API.
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot` against a
//! fresh migrated database per test.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use kitchen::api::{create_router, AppState};
use kitchen::config::Environment;
use kitchen::db::{migrate, Db};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

async fn create_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Db::new(temp_dir.path().join("kitchen.db"));
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
        .await
        .unwrap();

    let router = create_router(AppState::new(db, Environment::Test), &[]);
    (router, temp_dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body)).await
}

/// 101 start, 102 mid, 103 end; utensils 1 and 2.
async fn create_populated_test_app() -> (Router, TempDir) {
    let (app, temp) = create_test_app().await;
    for (id, name, kind) in [(101, "egg", "start"), (102, "beaten egg", "mid"), (103, "omelette", "end")] {
        let (status, _) = post(&app, "/ingredients", json!({"id": id, "name": name, "type": kind})).await;
        assert_eq!(status, StatusCode::OK);
    }
    for (id, name, wait) in [(1, "whisk", 2000), (2, "pan", 5000)] {
        let (status, _) = post(&app, "/utensils", json!({"id": id, "name": name, "waitTimeInMillis": wait})).await;
        assert_eq!(status, StatusCode::OK);
    }
    (app, temp)
}

// =============================================================================
// INDEX AND ROUTING
// =============================================================================

#[tokio::test]
async fn test_index_reports_environment_and_stats() {
    let (app, _temp) = create_populated_test_app().await;

    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["environment"], "TEST");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(
        body["stats"],
        json!({"ingredients": 3, "utensils": 2, "steps": 0, "recipes": 0})
    );
}

#[tokio::test]
async fn test_unknown_route_and_bad_ids_are_endpoint_not_found() {
    let (app, _temp) = create_test_app().await;

    for uri in ["/nothing-here", "/ingredients/abc", "/utensils/1.5", "/steps/1-2"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, json!({"message": "Endpoint not found"}), "{}", uri);
    }
}

#[tokio::test]
async fn test_detailed_must_be_boolean() {
    let (app, _temp) = create_test_app().await;

    let (status, body) = get(&app, "/steps?detailed=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "\"detailed\" must be a boolean");

    let (status, _) = get(&app, "/recipes?detailed=false").await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// INGREDIENTS AND UTENSILS
// =============================================================================

#[tokio::test]
async fn test_ingredient_crud() {
    let (app, _temp) = create_test_app().await;

    let (status, created) = post(&app, "/ingredients", json!({"name": "flour", "type": "start"})).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created, json!({"id": id, "name": "flour", "type": "start"}));

    let (status, fetched) = get(&app, &format!("/ingredients/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/ingredients/{}", id),
        Some(json!({"name": "rye flour", "type": "start"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "rye flour");

    let (_, all) = get(&app, "/ingredients").await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "DELETE", &format!("/ingredients/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "DELETE", &format!("/ingredients/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Ingredient not found");
}

#[tokio::test]
async fn test_put_on_missing_entity_is_not_found() {
    let (app, _temp) = create_test_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/utensils/42",
        Some(json!({"name": "oven", "waitTimeInMillis": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Utensil not found");
}

#[tokio::test]
async fn test_invalid_bodies_are_rejected() {
    let (app, _temp) = create_test_app().await;

    let (status, _) = post(&app, "/ingredients", json!({"name": "x", "type": "start", "colour": "red"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "/ingredients", json!({"name": "x", "type": "raw"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&app, "/ingredients", json!({"name": "  ", "type": "mid"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "\"name\" is not allowed to be empty");

    let (status, body) = post(&app, "/utensils", json!({"name": "pan", "waitTimeInMillis": -5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "\"waitTimeInMillis\" must be greater than or equal to 0");
}

#[tokio::test]
async fn test_duplicate_id_is_bad_request() {
    let (app, _temp) = create_populated_test_app().await;

    let (status, body) = post(&app, "/utensils", json!({"id": 1, "name": "again", "waitTimeInMillis": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Utensil with id 1 already exists"}));

    let (status, body) = post(&app, "/ingredients", json!({"id": 101, "name": "again", "type": "mid"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Ingredient with id 101 already exists"}));
}

// =============================================================================
// STEPS
// =============================================================================

#[tokio::test]
async fn test_step_validation_messages() {
    let (app, _temp) = create_populated_test_app().await;

    let cases = [
        (json!({"input": 999, "utensil": 1, "output": 999}), "Input and output can't be the same ingredient"),
        (json!({"input": 999, "utensil": 1, "output": 102}), "The specified input ingredient doesn't exist"),
        (json!({"input": 103, "utensil": 1, "output": 102}), "Input ingredient can't be an end ingredient"),
        (json!({"input": 101, "utensil": 9, "output": 102}), "The specified utensil doesn't exist"),
        (json!({"input": 101, "utensil": 1, "output": 999}), "The specified output ingredient doesn't exist"),
        (json!({"input": 102, "utensil": 1, "output": 101}), "Output ingredient can't be a start ingredient"),
    ];

    for (body, message) in cases {
        let (status, response) = post(&app, "/steps", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", message);
        assert_eq!(response, json!({"message": message}));
    }
}

#[tokio::test]
async fn test_shared_components_are_reported() {
    let (app, _temp) = create_populated_test_app().await;

    let (status, _) = post(&app, "/steps", json!({"input": 101, "utensil": 1, "output": 102})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&app, "/steps", json!({"input": 101, "utensil": 1, "output": 102})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "This step already exists");

    let (status, body) = post(&app, "/steps", json!({"input": 101, "utensil": 1, "output": 103})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Steps can't share 2 or more components with another step");
    assert_eq!(body["conflicts"], json!([{"input": 101, "utensil": 1, "output": 102}]));

    // shares only the utensil
    let (status, _) = post(&app, "/steps", json!({"input": 102, "utensil": 1, "output": 103})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_creates_sharing_a_pair() {
    let (app, _temp) = create_populated_test_app().await;
    let first = json!({"input": 101, "utensil": 1, "output": 102});
    let second = json!({"input": 101, "utensil": 1, "output": 103});

    for _ in 0..20 {
        let ((status_a, body_a), (status_b, body_b)) = tokio::join!(
            post(&app, "/steps", first.clone()),
            post(&app, "/steps", second.clone()),
        );

        let (stored, rejected) = if status_a == StatusCode::OK && status_b == StatusCode::BAD_REQUEST {
            (&first, body_b)
        } else if status_a == StatusCode::BAD_REQUEST && status_b == StatusCode::OK {
            (&second, body_a)
        } else {
            panic!("expected exactly one insert, got {} and {}", status_a, status_b);
        };
        assert_eq!(
            rejected,
            json!({
                "message": "Steps can't share 2 or more components with another step",
                "conflicts": [stored],
            })
        );

        let (status, _) = send(&app, "DELETE", "/steps", Some(stored.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, steps) = get(&app, "/steps").await;
    assert_eq!(steps, json!([]));
}

#[tokio::test]
async fn test_step_get_and_delete() {
    let (app, _temp) = create_populated_test_app().await;
    post(&app, "/steps", json!({"input": 101, "utensil": 1, "output": 102})).await;

    let (status, simple) = get(&app, "/steps/101-1-102").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(simple, json!({"input": 101, "utensil": 1, "output": 102}));

    let (status, detailed) = get(&app, "/steps/101-1-102?detailed=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detailed["utensil"], json!({"id": 1, "name": "whisk", "waitTimeInMillis": 2000}));

    let (status, body) = get(&app, "/steps/101-2-102").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Step not found");

    let triple = json!({"input": 101, "utensil": 1, "output": 102});
    let (status, _) = send(&app, "DELETE", "/steps", Some(triple.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "DELETE", "/steps", Some(triple)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Step not found");
}

#[tokio::test]
async fn test_outcomes_sources_and_uses() {
    let (app, _temp) = create_populated_test_app().await;
    post(&app, "/steps", json!({"input": 101, "utensil": 1, "output": 102})).await;
    post(&app, "/steps", json!({"input": 102, "utensil": 2, "output": 103})).await;

    let (status, outcomes) = get(&app, "/ingredients/102/outcomes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcomes[0]["output"]["id"], 103);

    let (status, sources) = get(&app, "/ingredients/102/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sources[0]["input"]["name"], "egg");

    let (status, _) = get(&app, "/ingredients/103/outcomes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/ingredients/101/sources").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, uses) = get(&app, "/utensils/2/uses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(uses.as_array().unwrap().len(), 1);

    let (status, _) = get(&app, "/utensils/7/uses").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_utensil_removes_its_steps() {
    let (app, _temp) = create_populated_test_app().await;
    post(&app, "/steps", json!({"input": 101, "utensil": 1, "output": 102})).await;

    let (status, _) = send(&app, "DELETE", "/utensils/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, steps) = get(&app, "/steps").await;
    assert_eq!(steps, json!([]));
}

// =============================================================================
// RECIPES
// =============================================================================

#[tokio::test]
async fn test_end_to_end_recipe() {
    let (app, _temp) = create_populated_test_app().await;

    let (status, created) = post(&app, "/steps", json!({"input": 101, "utensil": 1, "output": 102})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["input"]["id"], 101);
    assert_eq!(created["output"]["type"], "mid");

    let (status, _) = get(&app, "/steps/101-1-102").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(&app, "/steps", json!({"input": 102, "utensil": 2, "output": 103})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, recipes) = get(&app, "/recipes?detailed=true").await;
    assert_eq!(status, StatusCode::OK);
    let recipes = recipes.as_array().unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["steps"], 2);
    assert_eq!(recipes[0]["output"]["id"], 103);
    assert_eq!(recipes[0]["utensil2"]["name"], "pan");
    assert!(recipes[0].get("mid3").is_none());

    let (status, simple) = get(&app, "/recipes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        simple,
        json!([{
            "input": 101,
            "utensil1": 1, "mid1": 102,
            "utensil2": 2, "mid2": 103,
            "steps": 2,
            "output": 103
        }])
    );

    let (_, index) = get(&app, "/").await;
    assert_eq!(index["stats"]["recipes"], 1);
}
