//! End-to-end handler tests against the in-memory store.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Location, Post, User};
use blogicum_infra::{Argon2PasswordService, JwtConfig, JwtTokenService, MemoryStore};
use blogicum_server::handlers;
use blogicum_server::state::AppState;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

fn state() -> AppState {
    AppState::in_memory(
        MemoryStore::new(),
        Arc::new(JwtTokenService::new(JwtConfig::default())),
        Arc::new(Argon2PasswordService::with_cost(1024, 1, 1).unwrap()),
        10,
    )
}

async fn user(state: &AppState, username: &str) -> (User, String) {
    let user = state
        .users
        .create(User::new(
            username.into(),
            format!("{username}@example.com"),
            "hash".into(),
        ))
        .await
        .unwrap();
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();
    (user, format!("Bearer {token}"))
}

async fn post(state: &AppState, post: Post) -> Post {
    state.posts.create(post).await.unwrap()
}

fn published(author: &User, title: &str, pub_date: DateTime<Utc>) -> Post {
    Post::new(author.id, title.into(), format!("{title} text"), pub_date)
}

fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

fn titles(body: &Value) -> Vec<String> {
    body["posts"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_home_shows_only_publicly_visible_posts() {
    let state = state();
    let (anna, _) = user(&state, "anna").await;
    let hidden = state
        .categories
        .create(Category::new("Secret".into(), "".into(), "secret".into()).hidden())
        .await
        .unwrap();

    post(&state, published(&anna, "Visible", hours_ago(1))).await;
    post(&state, published(&anna, "Future", Utc::now() + Duration::days(2))).await;
    post(&state, published(&anna, "Draft", hours_ago(1)).hidden()).await;
    post(&state, published(&anna, "In secret", hours_ago(1)).in_category(hidden.id)).await;

    let app = app!(state);
    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(titles(&body), vec!["Visible"]);
    assert_eq!(body["posts"]["total_items"], 1);
}

#[actix_web::test]
async fn test_home_pages_ten_newest_first() {
    let state = state();
    let (anna, _) = user(&state, "anna").await;
    for i in 0..12 {
        post(&state, published(&anna, &format!("Post {i}"), hours_ago(i + 1))).await;
    }
    let app = app!(state);

    let first: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    let first_titles = titles(&first);
    assert_eq!(first_titles.len(), 10);
    assert_eq!(first_titles[0], "Post 0");
    assert_eq!(first_titles[9], "Post 9");
    assert_eq!(first["posts"]["has_next"], true);
    assert_eq!(first["posts"]["total_pages"], 2);

    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=2").to_request(),
    )
    .await;
    assert_eq!(titles(&second), vec!["Post 10", "Post 11"]);
    assert_eq!(second["posts"]["has_previous"], true);

    for uri in ["/?page=3", "/?page=0", "/?page=-1", "/?page=abc"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_empty_home_page_is_ok() {
    let state = state();
    let app = app!(state);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(body["posts"]["total_items"], 0);
    assert_eq!(body["posts"]["total_pages"], 1);
}

#[actix_web::test]
async fn test_category_page() {
    let state = state();
    let (anna, _) = user(&state, "anna").await;
    let travel = state
        .categories
        .create(Category::new("Travel".into(), "Trips".into(), "travel".into()))
        .await
        .unwrap();
    state
        .categories
        .create(Category::new("Drafts".into(), "".into(), "drafts".into()).hidden())
        .await
        .unwrap();

    post(&state, published(&anna, "Kazan", hours_ago(2)).in_category(travel.id)).await;
    let soon = published(&anna, "Soon", Utc::now() + Duration::hours(3));
    post(&state, soon.in_category(travel.id)).await;
    post(&state, published(&anna, "Elsewhere", hours_ago(1))).await;
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/category/travel/").to_request(),
    )
    .await;
    assert_eq!(body["category"]["slug"], "travel");
    assert_eq!(titles(&body), vec!["Kazan"]);

    for uri in ["/category/drafts/", "/category/missing/"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_profile_owner_sees_own_drafts() {
    let state = state();
    let (anna, token) = user(&state, "anna").await;
    post(&state, published(&anna, "Public", hours_ago(1))).await;
    post(&state, published(&anna, "Draft", hours_ago(2)).hidden()).await;
    let app = app!(state);

    let own: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/anna/")
            .insert_header((header::AUTHORIZATION, token))
            .to_request(),
    )
    .await;
    assert_eq!(titles(&own), vec!["Public", "Draft"]);
    assert_eq!(own["profile"]["username"], "anna");
    assert!(own["profile"].get("email").is_none());

    let public: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/anna/").to_request(),
    )
    .await;
    assert_eq!(titles(&public), vec!["Public"]);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/profile/nobody/").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_post_detail_visibility_and_comment_order() {
    let state = state();
    let (anna, anna_token) = user(&state, "anna").await;
    let (boris, _) = user(&state, "boris").await;
    let draft = post(&state, published(&anna, "Draft", hours_ago(1)).hidden()).await;
    let public = post(&state, published(&anna, "Public", hours_ago(1))).await;

    let mut second = Comment::new(public.id, boris.id, "second".into());
    second.created_at = Utc::now();
    let mut first = Comment::new(public.id, anna.id, "first".into());
    first.created_at = second.created_at - Duration::minutes(1);
    state.comments.create(second).await.unwrap();
    state.comments.create(first).await.unwrap();
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/posts/{}/", draft.id)).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", draft.id))
            .insert_header((header::AUTHORIZATION, anna_token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&format!("/posts/{}/", public.id)).to_request(),
    )
    .await;
    let comments: Vec<&str> = body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(comments, vec!["first", "second"]);
    assert_eq!(body["form"]["text"], "");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/posts/not-a-uuid/").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_post_sets_author_and_redirects_to_profile() {
    let state = state();
    let (anna, token) = user(&state, "anna").await;
    let (boris, _) = user(&state, "boris").await;
    let place = state.locations.create(Location::new("Kazan".into())).await.unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({
            "title": "Morning",
            "text": "Coffee",
            "pub_date": hours_ago(1),
            "location_id": place.id,
            "author_id": boris.id,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/anna/");

    let page = state
        .posts
        .list_by_author(anna.id, state.page(1))
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].post.title, "Morning");
    assert_eq!(page.items[0].post.location_id, Some(place.id));
    assert!(page.items[0].post.is_published);
}

#[actix_web::test]
async fn test_create_post_form_errors() {
    let state = state();
    let (_, token) = user(&state, "anna").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({ "text": "No title", "category_id": Uuid::new_v4() }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["pub_date"].is_array());
    assert!(body["errors"]["category_id"].is_array());
    assert!(body["errors"].get("text").is_none());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .set_json(json!({ "title": "Anonymous" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_non_author_is_redirected_from_edit_and_delete() {
    let state = state();
    let (anna, _) = user(&state, "anna").await;
    let (_, boris_token) = user(&state, "boris").await;
    let target = post(&state, published(&anna, "Mine", hours_ago(1))).await;
    let app = app!(state);
    let detail = format!("/posts/{}/", target.id);

    for action in ["edit", "delete"] {
        let uri = format!("/posts/{}/{action}/", target.id);

        let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), detail);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&uri)
                .insert_header((header::AUTHORIZATION, boris_token.clone()))
                .set_json(json!({ "title": "Stolen", "text": "x", "pub_date": Utc::now() }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), detail);
    }

    let stored = state.posts.find_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Mine");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", Uuid::new_v4()))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_guard_runs_before_the_body_is_read() {
    let state = state();
    let (anna, anna_token) = user(&state, "anna").await;
    let (_, boris_token) = user(&state, "boris").await;
    let target = post(&state, published(&anna, "Mine", hours_ago(1))).await;
    let app = app!(state);
    let uri = format!("/posts/{}/edit/", target.id);

    for auth in [Some(boris_token), None] {
        let mut req = test::TestRequest::post().uri(&uri).set_json(json!({ "title": 5 }));
        if let Some(token) = auth {
            req = req.insert_header((header::AUTHORIZATION, token));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), format!("/posts/{}/", target.id));
    }

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, anna_token.clone()))
            .set_json(json!({ "title": 5, "text": "x", "pub_date": "2024-05-01" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"].get("pub_date").is_none());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, anna_token))
            .set_json(json!({ "title": "Dated", "text": "x", "pub_date": "2024-05-01" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let stored = state.posts.find_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Dated");
    assert_eq!(stored.pub_date.to_rfc3339(), "2024-05-01T00:00:00+00:00");
}

#[actix_web::test]
async fn test_blank_post_is_not_stored() {
    let state = state();
    let (anna, token) = user(&state, "anna").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(json!({ "title": "   ", "text": "  ", "pub_date": Utc::now() }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["text"].is_array());

    let page = state
        .posts
        .list_by_author(anna.id, state.page(1))
        .await
        .unwrap();
    assert_eq!(page.total_items, 0);
}

#[actix_web::test]
async fn test_author_edits_and_deletes_post() {
    let state = state();
    let (anna, token) = user(&state, "anna").await;
    let target = post(&state, published(&anna, "Old", hours_ago(1))).await;
    state
        .comments
        .create(Comment::new(target.id, anna.id, "note".into()))
        .await
        .unwrap();
    let app = app!(state);

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/edit/", target.id))
            .insert_header((header::AUTHORIZATION, token.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(form["form"]["title"], "Old");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/edit/", target.id))
            .insert_header((header::AUTHORIZATION, token.clone()))
            .set_json(json!({
                "title": "New",
                "text": "Body",
                "pub_date": hours_ago(1),
                "is_published": false,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/anna/");

    let stored = state.posts.find_by_id(target.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "New");
    assert!(!stored.is_published);
    assert_eq!(stored.author_id, anna.id);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/delete/", target.id))
            .insert_header((header::AUTHORIZATION, token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/anna/");
    assert!(state.posts.find_by_id(target.id).await.unwrap().is_none());
    assert!(state.comments.list_for_post(target.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_comment_is_bound_to_requester_and_url_post() {
    let state = state();
    let (anna, _) = user(&state, "anna").await;
    let (boris, boris_token) = user(&state, "boris").await;
    let target = post(&state, published(&anna, "Open", hours_ago(1))).await;
    let other = post(&state, published(&anna, "Other", hours_ago(1))).await;
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", target.id))
            .insert_header((header::AUTHORIZATION, boris_token.clone()))
            .set_json(json!({ "text": "Nice", "author_id": anna.id, "post_id": other.id }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{}/", target.id));

    let comments = state.comments.list_for_post(target.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.author_id, boris.id);
    assert!(state.comments.list_for_post(other.id).await.unwrap().is_empty());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", target.id))
            .insert_header((header::AUTHORIZATION, boris_token))
            .set_json(json!({ "text": "   " }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", target.id))
            .set_json(json!({ "text": "Anonymous" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_cannot_comment_on_hidden_post() {
    let state = state();
    let (anna, _) = user(&state, "anna").await;
    let (_, boris_token) = user(&state, "boris").await;
    let draft = post(&state, published(&anna, "Draft", hours_ago(1)).hidden()).await;
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/posts/{}/comment/", draft.id))
            .insert_header((header::AUTHORIZATION, boris_token))
            .set_json(json!({ "text": "Peek" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comment_edit_and_delete() {
    let state = state();
    let (anna, anna_token) = user(&state, "anna").await;
    let (boris, boris_token) = user(&state, "boris").await;
    let target = post(&state, published(&anna, "Open", hours_ago(1))).await;
    let other = post(&state, published(&anna, "Other", hours_ago(1))).await;
    let comment = state
        .comments
        .create(Comment::new(target.id, boris.id, "typo".into()))
        .await
        .unwrap();
    let app = app!(state);
    let detail = format!("/posts/{}/", target.id);
    let edit_uri = format!("/posts/{}/comments/{}/edit/", target.id, comment.id);

    // The post author is not the comment author.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&edit_uri)
            .insert_header((header::AUTHORIZATION, anna_token.clone()))
            .set_json(json!({ "text": "hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);

    let delete_uri = format!("/posts/{}/comments/{}/delete/", target.id, comment.id);
    for uri in [&edit_uri, &delete_uri] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&res), detail);
    }

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&delete_uri)
            .insert_header((header::AUTHORIZATION, anna_token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_some());

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/comments/{}/edit/", other.id, comment.id))
            .insert_header((header::AUTHORIZATION, boris_token.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let form: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&edit_uri)
            .insert_header((header::AUTHORIZATION, boris_token.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(form["form"]["text"], "typo");
    assert_eq!(form["comment"]["author"]["username"], "boris");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&edit_uri)
            .insert_header((header::AUTHORIZATION, boris_token.clone()))
            .set_json(json!({ "text": "fixed" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);
    let stored = state.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "fixed");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&delete_uri)
            .insert_header((header::AUTHORIZATION, boris_token))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), detail);
    assert!(state.comments.find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let state = state();
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "username": "anna",
                "email": "anna@example.com",
                "password": "correct horse",
                "first_name": "Anna",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "username": "anna",
                "email": "other@example.com",
                "password": "correct horse",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "anna", "password": "wrong password" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let login: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "anna", "password": "correct horse" }))
            .to_request(),
    )
    .await;
    assert_eq!(login["token_type"], "Bearer");
    let token = login["access_token"].as_str().unwrap();

    let me: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/auth/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(me["username"], "anna");
    assert_eq!(me["email"], "anna@example.com");
}

#[actix_web::test]
async fn test_profile_edit() {
    let state = state();
    let (anna, token) = user(&state, "anna").await;
    user(&state, "boris").await;
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit/")
            .insert_header((header::AUTHORIZATION, token.clone()))
            .set_json(json!({ "username": "boris", "email": "anna@example.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["username"].is_array());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/profile/edit/")
            .insert_header((header::AUTHORIZATION, token))
            .set_json(json!({
                "username": "anna_k",
                "first_name": "Anna",
                "last_name": "K",
                "email": "anna@example.com",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/profile/anna_k/");

    let stored = state.users.find_by_id(anna.id).await.unwrap().unwrap();
    assert_eq!(stored.username, "anna_k");
    assert_eq!(stored.display_name(), "Anna K");
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let state = state();
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_non_json_form_submission_is_forbidden() {
    let state = state();
    let (_, token) = user(&state, "anna").await;
    let app = app!(state);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts/create/")
            .insert_header((header::AUTHORIZATION, token))
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("title=Hi&text=There")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 403);
}
