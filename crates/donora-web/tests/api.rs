use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use donora_auth::{AuthStore, SqliteAuthStore, hash_password};
use donora_core::WebSettings;
use donora_web::{AppState, build_router};

const PASSWORD: &str = "correct-horse";

async fn app() -> (Router, Arc<dyn AuthStore>) {
    let store = SqliteAuthStore::open_in_memory().unwrap();
    store.migrate().await.unwrap();
    store.seed_defaults().await.unwrap();
    let store: Arc<dyn AuthStore> = Arc::new(store);

    let hash = hash_password(PASSWORD).unwrap();
    for (username, role) in [("root", "Super Admin"), ("ann", "Admin"), ("ed", "Editor")] {
        let role = store.get_role_by_name(role).await.unwrap();
        store
            .create_user(username, &hash, None, Some(&role.id))
            .await
            .unwrap();
    }

    let state = Arc::new(AppState::new(&WebSettings::default(), store.clone()));
    (build_router(state), store)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": username, "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _) = app().await;
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": "ann", "password": "not-the-password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _) = app().await;
    let req = Request::builder()
        .uri("/api/profile")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_returns_role_and_permissions() {
    let (app, _) = app().await;
    let token = login(&app, "ed").await;
    let (status, body) = send(&app, get("/api/profile", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Editor");
    let perms: Vec<&str> = body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert!(perms.contains(&"events_create"));
    assert!(!perms.contains(&"roles_view"));
}

#[tokio::test]
async fn gate_distinguishes_unconfigured_modules() {
    let (app, _) = app().await;
    let token = login(&app, "ed").await;

    let (_, allowed) = send(&app, get("/api/gate?module=events&action=edit", &token)).await;
    assert_eq!(allowed["allowed"], true);

    let (_, missing) = send(&app, get("/api/gate?module=roles&action=edit", &token)).await;
    assert_eq!(missing["allowed"], false);
    assert_eq!(missing["reason"], "missing permission: roles_edit");

    let (_, unknown) = send(&app, get("/api/gate?module=widgets&action=view", &token)).await;
    assert_eq!(unknown["allowed"], false);
    assert!(unknown["reason"].as_str().unwrap().starts_with("not configured"));
}

#[tokio::test]
async fn editor_cannot_list_roles() {
    let (app, _) = app().await;
    let token = login(&app, "ed").await;
    let (status, body) = send(&app, get("/api/roles", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "missing permission: roles_view");
}

#[tokio::test]
async fn admin_manages_custom_roles_but_not_protected_ones() {
    let (app, store) = app().await;
    let token = login(&app, "ann").await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/roles", Some(&token), json!({"name": "Volunteer"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["level"], "other");
    let volunteer_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request("POST", "/api/roles", Some(&token), json!({"name": "Super Admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("protected"));

    let super_admin = store.get_role_by_name("Super Admin").await.unwrap();
    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/roles/{}", super_admin.id),
            Some(&token),
            json!({"description": "mine now"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        json_request(
            "DELETE",
            &format!("/api/roles/{volunteer_id}"),
            Some(&token),
            Value::Null,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let audit = store.list_audit(10, 0).await.unwrap();
    assert_eq!(audit[0].action, "role.delete");
}

#[tokio::test]
async fn super_admin_can_edit_protected_role_but_not_delete_it() {
    let (app, store) = app().await;
    let token = login(&app, "root").await;
    let admin = store.get_role_by_name("Admin").await.unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/roles/{}", admin.id),
            Some(&token),
            json!({"description": "Runs the back office"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Runs the back office");

    let (status, _) = send(
        &app,
        json_request(
            "DELETE",
            &format!("/api/roles/{}", admin.id),
            Some(&token),
            Value::Null,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_cannot_promote_to_admin() {
    let (app, store) = app().await;
    let token = login(&app, "ann").await;
    let ed = store.get_user_by_username("ed").await.unwrap();
    let admin = store.get_role_by_name("Admin").await.unwrap();

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/admins/{}/role", ed.id),
            Some(&token),
            json!({"role_id": admin.id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let ed = store.get_user_by_id(&ed.id).await.unwrap();
    assert_ne!(ed.role_id.as_deref(), Some(admin.id.as_str()));
}

#[tokio::test]
async fn demotion_applies_to_existing_token() {
    let (app, store) = app().await;
    let token = login(&app, "ann").await;
    let ann = store.get_user_by_username("ann").await.unwrap();
    let editor = store.get_role_by_name("Editor").await.unwrap();
    store.set_user_role(&ann.id, &editor.id).await.unwrap();

    let (_, gate) = send(&app, get("/api/gate?module=roles&action=create", &token)).await;
    assert_eq!(gate["allowed"], false);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/roles", Some(&token), json!({"name": "Sneaky"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], gate["reason"]);
    assert!(store.get_role_by_name("Sneaky").await.is_err());
}

#[tokio::test]
async fn deactivated_admin_loses_access() {
    let (app, store) = app().await;
    let token = login(&app, "ann").await;
    let ann = store.get_user_by_username("ann").await.unwrap();
    store.set_user_active(&ann.id, false).await.unwrap();

    let (status, _) = send(&app, get("/api/roles", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_admin_token_is_unauthorized() {
    let (app, store) = app().await;
    let token = login(&app, "ed").await;
    let ed = store.get_user_by_username("ed").await.unwrap();
    store.delete_user(&ed.id).await.unwrap();

    let (status, _) = send(&app, get("/api/profile", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
