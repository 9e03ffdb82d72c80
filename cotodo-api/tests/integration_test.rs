/// Integration tests for the cotodo API
///
/// These tests verify the full system works end-to-end:
/// - Signup/login flow and token auth
/// - The creator-or-mentioned permission model
/// - Mention grants and revocations
/// - Tag registry permissions
/// - Notes
/// - List filtering

mod common;

use axum::http::StatusCode;
use common::{create_todo_via_api, TestContext, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_signup_and_login_flow() {
    let ctx = TestContext::new().await.unwrap();

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let email = format!("signup_{}@example.com", &suffix[..8]);
    let username = format!("signup_{}", &suffix[..8]);

    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "name": "Sign Up",
                "email": email,
                "username": username,
                "password": TEST_PASSWORD,
            })),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "success");
    assert!(body["token"].is_string());
    assert_eq!(body["data"]["user"]["email"], email.as_str());
    // The generated avatar is filled in when none is supplied
    assert!(body["data"]["user"]["avatarUrl"]
        .as_str()
        .unwrap()
        .contains("ui-avatars.com"));

    // Password material must never appear in responses
    let raw = body.to_string();
    assert!(!raw.contains("password"));

    let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["token"].is_string());

    // Token works against a protected endpoint
    let token = body["token"].as_str().unwrap().to_string();
    let (status, body) = ctx
        .request("GET", "/api/users/me", Some(&token), None)
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["user"]["id"], user_id.as_str());

    // Cleanup: the account was created through the API, not create_user
    let id = user_id.parse().unwrap();
    cotodo_shared::models::user::User::delete(&ctx.db, id)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new().await.unwrap();
    let (user, _token) = ctx.create_user("login").await.unwrap();

    // Wrong password
    let (status, wrong_pw) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": user.email, "password": "not-the-password" })),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(wrong_pw.get("token").is_none());

    // Unknown email
    let (status, unknown) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "whatever" })),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // Same message either way, so the endpoint cannot probe for accounts
    assert_eq!(wrong_pw["message"], unknown["message"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_protected_endpoints_require_auth() {
    let ctx = TestContext::new().await.unwrap();

    for uri in ["/api/todos", "/api/tags", "/api/users"] {
        let (status, _body) = ctx.request("GET", uri, None, None).await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should require auth", uri);
    }

    // Health stays public
    let (status, body) = ctx.request("GET", "/health", None, None).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "reachable");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_mention_grants_read_access() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();
    let (bob, bob_token) = ctx.create_user("bob").await.unwrap();
    let (_charlie, charlie_token) = ctx.create_user("charlie").await.unwrap();

    let todo_id = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({
            "title": "Plan the launch",
            "mentions": [format!("@{}", bob.username)],
        }),
    )
    .await
    .unwrap();

    let uri = format!("/api/todos/{}", todo_id);

    // Bob is mentioned: read allowed
    let (status, body) = ctx.request("GET", &uri, Some(&bob_token), None).await.unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["todo"]["mentions"][0]["id"], bob.id.to_string());

    // Charlie is neither creator nor mentioned
    let (status, _body) = ctx
        .request("GET", &uri, Some(&charlie_token), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The mention also lands in Bob's assigned set
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/api/users/{}", bob.id),
            Some(&alice_token),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["user"]["assignedTodoIds"][0],
        todo_id.to_string()
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_removing_mention_revokes_access() {
    let ctx = TestContext::new().await.unwrap();
    let (alice, alice_token) = ctx.create_user("alice").await.unwrap();
    let (bob, bob_token) = ctx.create_user("bob").await.unwrap();

    let todo_id = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({
            "title": "Temporary grant",
            "mentions": [bob.id.to_string()],
        }),
    )
    .await
    .unwrap();

    let uri = format!("/api/todos/{}", todo_id);

    let (status, _body) = ctx.request("GET", &uri, Some(&bob_token), None).await.unwrap();
    assert_eq!(status, StatusCode::OK);

    // Alice replaces the mention set with an empty one
    let (status, body) = ctx
        .request("PATCH", &uri, Some(&alice_token), Some(json!({ "mentions": [] })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["data"]["todo"]["mentions"].as_array().unwrap().is_empty());

    // Bob's access is gone immediately
    let (status, _body) = ctx.request("GET", &uri, Some(&bob_token), None).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    // And the todo left his assigned set
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/api/users/{}", bob.id),
            Some(&alice_token),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["user"]["assignedTodoIds"]
        .as_array()
        .unwrap()
        .is_empty());

    // Creator still sees it
    let (status, body) = ctx.request("GET", &uri, Some(&alice_token), None).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["todo"]["createdBy"]["id"], alice.id.to_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_unresolvable_mention_rejects_request() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();

    let (status, body) = ctx
        .request(
            "POST",
            "/api/todos",
            Some(&alice_token),
            Some(json!({
                "title": "Bad grant",
                "mentions": ["@no_such_user_anywhere"],
            })),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].as_str().unwrap().contains("no_such_user_anywhere"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_creator_is_immutable() {
    let ctx = TestContext::new().await.unwrap();
    let (alice, alice_token) = ctx.create_user("alice").await.unwrap();
    let (bob, _bob_token) = ctx.create_user("bob").await.unwrap();

    let todo_id = create_todo_via_api(&ctx, &alice_token, json!({ "title": "Mine" }))
        .await
        .unwrap();

    // A patch naming a new creator is silently ignored
    let (status, body) = ctx
        .request(
            "PATCH",
            &format!("/api/todos/{}", todo_id),
            Some(&alice_token),
            Some(json!({ "createdBy": bob.id.to_string(), "completed": true })),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["todo"]["createdBy"]["id"], alice.id.to_string());
    assert_eq!(body["data"]["todo"]["completed"], true);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_only_creator_may_update_or_delete() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();
    let (bob, bob_token) = ctx.create_user("bob").await.unwrap();

    // Bob is mentioned, so he can read but not write
    let todo_id = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({
            "title": "Read-only for Bob",
            "mentions": [bob.id.to_string()],
        }),
    )
    .await
    .unwrap();

    let uri = format!("/api/todos/{}", todo_id);

    let (status, _body) = ctx
        .request("PATCH", &uri, Some(&bob_token), Some(json!({ "title": "Hijacked" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _body) = ctx.request("DELETE", &uri, Some(&bob_token), None).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The todo is untouched
    let (status, body) = ctx.request("GET", &uri, Some(&alice_token), None).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["todo"]["title"], "Read-only for Bob");

    // The creator can delete it
    let (status, _body) = ctx.request("DELETE", &uri, Some(&alice_token), None).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _body) = ctx.request("GET", &uri, Some(&alice_token), None).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_notes_append_in_order() {
    let ctx = TestContext::new().await.unwrap();
    let (alice, alice_token) = ctx.create_user("alice").await.unwrap();
    let (bob, bob_token) = ctx.create_user("bob").await.unwrap();
    let (_charlie, charlie_token) = ctx.create_user("charlie").await.unwrap();

    let todo_id = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({
            "title": "Discussion",
            "mentions": [bob.id.to_string()],
        }),
    )
    .await
    .unwrap();

    let notes_uri = format!("/api/todos/{}/notes", todo_id);

    let (status, _body) = ctx
        .request("POST", &notes_uri, Some(&alice_token), Some(json!({ "content": "first" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    // Mentioned users may append too
    let (status, body) = ctx
        .request("POST", &notes_uri, Some(&bob_token), Some(json!({ "content": "second" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let notes = body["data"]["todo"]["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["content"], "first");
    assert_eq!(notes[0]["createdBy"]["id"], alice.id.to_string());
    assert_eq!(notes[1]["content"], "second");
    assert_eq!(notes[1]["createdBy"]["id"], bob.id.to_string());

    // Outsiders may not append
    let (status, _body) = ctx
        .request("POST", &notes_uri, Some(&charlie_token), Some(json!({ "content": "nope" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_tag_permissions_and_uniqueness() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();
    let (_bob, bob_token) = ctx.create_user("bob").await.unwrap();

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let tag_name = format!("release_{}", &suffix[..8]);

    let (status, body) = ctx
        .request(
            "POST",
            "/api/tags",
            Some(&alice_token),
            Some(json!({ "name": tag_name, "color": "#336699" })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let tag_id: uuid::Uuid = body["data"]["tag"]["id"].as_str().unwrap().parse().unwrap();
    ctx.track_tag(tag_id);
    assert_eq!(body["data"]["tag"]["textColor"], "#000000"); // server default

    // Names are unique case-insensitively
    let (status, _body) = ctx
        .request(
            "POST",
            "/api/tags",
            Some(&bob_token),
            Some(json!({ "name": tag_name.to_uppercase() })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);

    // Everyone sees the tag, but only the creator may mutate it
    let tag_uri = format!("/api/tags/{}", tag_id);

    let (status, _body) = ctx
        .request("PATCH", &tag_uri, Some(&bob_token), Some(json!({ "color": "#ff0000" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _body) = ctx.request("DELETE", &tag_uri, Some(&bob_token), None).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.request("GET", "/api/tags", Some(&bob_token), None).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(names.contains(&tag_name.as_str()));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_list_filters_are_and_combined() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();

    create_todo_via_api(
        &ctx,
        &alice_token,
        json!({ "title": "Deploy the service", "priority": "High" }),
    )
    .await
    .unwrap();
    create_todo_via_api(
        &ctx,
        &alice_token,
        json!({ "title": "Deploy the docs", "priority": "Low" }),
    )
    .await
    .unwrap();
    create_todo_via_api(
        &ctx,
        &alice_token,
        json!({ "title": "Water the plants", "priority": "High" }),
    )
    .await
    .unwrap();

    // Both predicates must hold
    let (status, body) = ctx
        .request(
            "GET",
            "/api/todos?priority=High&search=deploy",
            Some(&alice_token),
            None,
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["todos"][0]["title"], "Deploy the service");

    // Comma-separated multi-value priorities widen the match
    let (status, body) = ctx
        .request(
            "GET",
            "/api/todos?priority=High,Low&search=deploy",
            Some(&alice_token),
            None,
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 2);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_tag_and_status_filters_match_against_data() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let (status, body) = ctx
        .request(
            "POST",
            "/api/tags",
            Some(&alice_token),
            Some(json!({ "name": format!("backend_{}", &suffix[..8]) })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let tag_id: uuid::Uuid = body["data"]["tag"]["id"].as_str().unwrap().parse().unwrap();
    ctx.track_tag(tag_id);

    let tagged_pending = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({ "title": "Tagged and pending", "tags": [tag_id], "status": "Pending" }),
    )
    .await
    .unwrap();
    let tagged_completed = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({ "title": "Tagged and done", "tags": [tag_id], "status": "Completed" }),
    )
    .await
    .unwrap();
    create_todo_via_api(
        &ctx,
        &alice_token,
        json!({ "title": "Untagged and pending", "status": "Pending" }),
    )
    .await
    .unwrap();

    // Tag filter alone: both tagged todos, the untagged one excluded
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/api/todos?tags={}", tag_id),
            Some(&alice_token),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"], 2);
    let ids: Vec<&str> = body["data"]["todos"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert!(ids.contains(&tagged_pending.to_string().as_str()));
    assert!(ids.contains(&tagged_completed.to_string().as_str()));

    // Tag AND status: only the tagged pending todo survives both predicates
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/api/todos?tags={}&status=Pending", tag_id),
            Some(&alice_token),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["todos"][0]["id"], tagged_pending.to_string());

    // Status is an exact match
    let (status, body) = ctx
        .request("GET", "/api/todos?status=Completed", Some(&alice_token), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["todos"][0]["id"], tagged_completed.to_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_view_as_applies_to_reads_only() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();
    let (bob, bob_token) = ctx.create_user("bob").await.unwrap();
    let (_charlie, charlie_token) = ctx.create_user("charlie").await.unwrap();

    let todo_id = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({
            "title": "Bob can see this",
            "mentions": [bob.id.to_string()],
        }),
    )
    .await
    .unwrap();

    // Charlie cannot see the todo as himself...
    let (status, body) = ctx
        .request("GET", "/api/todos", Some(&charlie_token), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 0);

    // ...but evaluating the list as Bob shows it
    let (status, body) = ctx
        .request(
            "GET",
            &format!("/api/todos?userId={}", bob.id),
            Some(&charlie_token),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["todos"][0]["id"], todo_id.to_string());

    // An unknown override user is a 404
    let (status, _body) = ctx
        .request(
            "GET",
            &format!("/api/todos?userId={}", uuid::Uuid::new_v4()),
            Some(&charlie_token),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The override never applies to writes: Bob's token is what counts
    let (status, _body) = ctx
        .request(
            "PATCH",
            &format!("/api/todos/{}?userId={}", todo_id, bob.id),
            Some(&bob_token),
            Some(json!({ "title": "Still not allowed" })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_clearing_description_with_null() {
    let ctx = TestContext::new().await.unwrap();
    let (_alice, alice_token) = ctx.create_user("alice").await.unwrap();

    let todo_id = create_todo_via_api(
        &ctx,
        &alice_token,
        json!({ "title": "Has details", "description": "long form" }),
    )
    .await
    .unwrap();

    let uri = format!("/api/todos/{}", todo_id);

    // A patch that omits description leaves it alone
    let (status, body) = ctx
        .request("PATCH", &uri, Some(&alice_token), Some(json!({ "status": "In Progress" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["todo"]["description"], "long form");
    assert_eq!(body["data"]["todo"]["status"], "In Progress");

    // An explicit null clears it
    let (status, body) = ctx
        .request("PATCH", &uri, Some(&alice_token), Some(json!({ "description": null })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["todo"]["description"].is_null());

    ctx.cleanup().await.unwrap();
}
