mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{admin_token, role_id, role_names, send, spawn_app};

fn person(email: &str) -> Value {
    json!({
        "first_name": "Test",
        "last_name": "Person",
        "email": email,
        "password": "secret1"
    })
}

#[tokio::test]
async fn test_person_crud() {
    let (app, _) = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, created) = send(&app, "POST", "/api/persons", Some(&admin), Some(person("p@x.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/api/persons/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "p@x.com");

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/persons/{id}"),
        Some(&admin),
        Some(json!({ "first_name": "Renamed", "picture": "https://img.example/p.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["first_name"], "Renamed");
    assert_eq!(updated["last_name"], "Person");
    assert_eq!(updated["picture"], "https://img.example/p.png");

    let (status, body) = send(&app, "DELETE", &format!("/api/persons/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, "GET", &format!("/api/persons/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", &format!("/api/persons/{id}"), Some(&admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/persons/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_person_conflicts_and_validation() {
    let (app, _) = spawn_app().await;
    let admin = admin_token(&app).await;

    let (_, first) = send(&app, "POST", "/api/persons", Some(&admin), Some(person("one@x.com"))).await;
    let (_, second) = send(&app, "POST", "/api/persons", Some(&admin), Some(person("two@x.com"))).await;

    let (status, _) = send(&app, "POST", "/api/persons", Some(&admin), Some(person("one@x.com"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let second_id = second["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/persons/{second_id}"),
        Some(&admin),
        Some(json!({ "email": first["email"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut no_password = person("three@x.com");
    no_password.as_object_mut().unwrap().remove("password");
    let (status, _) = send(&app, "POST", "/api/persons", Some(&admin), Some(no_password)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/persons/0", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_person_category_and_roles() {
    let (app, _) = spawn_app().await;
    let admin = admin_token(&app).await;

    let mut body = person("cat@x.com");
    body["category_id"] = json!(999);
    let (status, _) = send(&app, "POST", "/api/persons", Some(&admin), Some(body.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, category) = send(&app, "POST", "/api/categories", Some(&admin), Some(json!({ "name": "Staff" }))).await;
    let category_id = category["id"].as_i64().unwrap();

    let admin_role = role_id(&app, &admin, "admin").await;
    body["category_id"] = json!(category_id);
    body["role_ids"] = json!([admin_role, 9999]);
    body["biometric_fingerprint"] = json!("AQID");
    let (status, created) = send(&app, "POST", "/api/persons", Some(&admin), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"]["name"], "Staff");
    assert_eq!(role_names(&created), vec!["admin"]);
    assert_eq!(created["biometric_fingerprint"], "AQID");

    // role_ids replaces the whole set
    let id = created["id"].as_i64().unwrap();
    let user_role = role_id(&app, &admin, "user").await;
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/persons/{id}"),
        Some(&admin),
        Some(json!({ "role_ids": [user_role] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role_names(&updated), vec!["user"]);

    // Deleting the category leaves the reference dangling
    let (status, _) = send(&app, "DELETE", &format!("/api/categories/{category_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, fetched) = send(&app, "GET", &format!("/api/persons/{id}"), Some(&admin), None).await;
    assert!(fetched["category"].is_null());
}

#[tokio::test]
async fn test_person_role_edges_are_idempotent() {
    let (app, _) = spawn_app().await;
    let admin = admin_token(&app).await;

    let (_, created) = send(&app, "POST", "/api/persons", Some(&admin), Some(person("edge@x.com"))).await;
    let id = created["id"].as_i64().unwrap();
    let admin_role = role_id(&app, &admin, "admin").await;
    let uri = format!("/api/persons/{id}/roles/{admin_role}");

    for _ in 0..2 {
        let (status, body) = send(&app, "POST", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let names = role_names(&body);
        assert_eq!(names.iter().filter(|n| *n == "admin").count(), 1);
    }

    for _ in 0..2 {
        let (status, body) = send(&app, "DELETE", &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(role_names(&body), vec!["user"]);
    }

    let (status, _) = send(&app, "POST", &format!("/api/persons/{id}/roles/9999"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", &format!("/api/persons/9999/roles/{admin_role}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/persons/9999/roles/{admin_role}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_role_crud_and_permission_edges() {
    let (app, _) = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, permission) = send(&app, "POST", "/api/permissions", Some(&admin), Some(json!({ "name": "publish" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let permission_id = permission["id"].as_i64().unwrap();

    let (status, _) = send(&app, "POST", "/api/permissions", Some(&admin), Some(json!({ "name": "publish" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, role) = send(
        &app,
        "POST",
        "/api/roles",
        Some(&admin),
        Some(json!({ "name": "editor", "permissionIds": [permission_id, 4242] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(role["permissions"].as_array().unwrap().len(), 1);
    let role_id = role["id"].as_i64().unwrap();

    let (status, _) = send(&app, "POST", "/api/roles", Some(&admin), Some(json!({ "name": "editor" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let edge = format!("/api/roles/{role_id}/permissions/{permission_id}");
    for _ in 0..2 {
        let (status, body) = send(&app, "POST", &edge, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["permissions"].as_array().unwrap().len(), 1);
    }
    for _ in 0..2 {
        let (status, body) = send(&app, "DELETE", &edge, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["permissions"].as_array().unwrap().is_empty());
    }

    let (status, renamed) = send(
        &app,
        "PUT",
        &format!("/api/roles/{role_id}"),
        Some(&admin),
        Some(json!({ "name": "writer", "permission_ids": [permission_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "writer");
    assert_eq!(renamed["permissions"][0]["name"], "publish");

    let (status, _) = send(&app, "PUT", &format!("/api/roles/{role_id}"), Some(&admin), Some(json!({ "name": "admin" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "DELETE", &format!("/api/permissions/{permission_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, role) = send(&app, "GET", &format!("/api/roles/{role_id}"), Some(&admin), None).await;
    assert!(role["permissions"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &format!("/api/roles/{role_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/roles/{role_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_crud() {
    let (app, _) = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, created) = send(&app, "POST", "/api/categories", Some(&admin), Some(json!({ "name": "Guests" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, "POST", "/api/categories", Some(&admin), Some(json!({ "name": "Guests" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/api/categories", Some(&admin), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(&app, "PUT", &format!("/api/categories/{id}"), Some(&admin), Some(json!({ "name": "Visitors" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Visitors");

    let (status, fetched) = send(&app, "GET", &format!("/api/categories/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Visitors");

    let (status, _) = send(&app, "DELETE", &format!("/api/categories/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/categories/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", &format!("/api/categories/{id}"), Some(&admin), Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_input_is_bad_request() {
    let (app, _) = spawn_app().await;
    let admin = admin_token(&app).await;

    let mut body = person("typed@x.com");
    body["role_ids"] = json!("abc");
    let (status, response) = send(&app, "POST", "/api/persons", Some(&admin), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].is_string());

    for uri in ["/api/persons/abc", "/api/permissions/1.5"] {
        let (status, response) = send(&app, "GET", uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(response["message"].is_string(), "{uri}: {response}");
    }

    let (status, response) = send(&app, "POST", "/api/roles/abc/permissions/1", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].is_string());

    // Body without a JSON content type
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/categories")
        .header("Authorization", format!("Bearer {admin}"))
        .body(axum::body::Body::from(r#"{"name":"Plain"}"#))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
