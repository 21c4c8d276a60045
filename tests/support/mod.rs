//! In-process stand-in for the feed backend. Mirrors the REST contract the
//! client consumes and records every request it sees.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use instalite::api::ApiClient;
use instalite::auth::{MemoryTokenStore, TokenStore};
use instalite::host::RecordingHost;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
struct User {
    id: i64,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    user_id: i64,
    content: String,
    img_path: String,
    created_at: String,
    updated_at: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: i64,
    post_id: i64,
    user_id: i64,
    comment: String,
    created_at: String,
}

#[derive(Default)]
struct BackendState {
    next_id: i64,
    users: Vec<User>,
    tokens: HashMap<String, i64>,
    posts: Vec<StoredPost>,
    likes: HashSet<(i64, i64)>,
    comments: Vec<StoredComment>,
    uploads: Vec<String>,
    requests: Vec<RecordedRequest>,
}

impl BackendState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<User> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *id).cloned()
    }

    fn email_of(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.email.clone())
            .unwrap_or_default()
    }

    fn post_json(&self, post: &StoredPost) -> Value {
        json!({
            "id": post.id,
            "user_id": post.user_id,
            "img_path": post.img_path,
            "content": post.content,
            "created_at": post.created_at,
            "updated_at": post.updated_at,
            "user_email": self.email_of(post.user_id),
            "like_count": self.likes.iter().filter(|(p, _)| *p == post.id).count(),
            "comment_count": self.comments.iter().filter(|c| c.post_id == post.id).count(),
        })
    }
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account and a valid token for it.
    pub fn seed_user(&self, email: &str, password: &str) -> (i64, String) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.users.push(User {
            id,
            email: email.to_string(),
            password: password.to_string(),
        });
        let token = format!("token-{}", uuid::Uuid::now_v7());
        state.tokens.insert(token.clone(), id);
        (id, token)
    }

    pub fn seed_post(&self, user_id: i64, content: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.posts.push(StoredPost {
            id,
            user_id,
            content: content.to_string(),
            img_path: format!("/uploads/{}.png", id),
            created_at: now(),
            updated_at: None,
        });
        id
    }

    pub fn seed_comment(&self, post_id: i64, user_id: i64, comment: &str) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.comments.push(StoredComment {
            id,
            post_id,
            user_id,
            comment: comment.to_string(),
            created_at: now(),
        });
    }

    /// Delete a post behind the client's back.
    pub fn remove_post(&self, post_id: i64) {
        self.state.lock().unwrap().posts.retain(|p| p.id != post_id);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn post_count(&self) -> usize {
        self.state.lock().unwrap().posts.len()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// Serve on an ephemeral port; returns the API base URL.
    pub async fn spawn(&self) -> Url {
        let app = router(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{}/api", addr)).unwrap()
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn router(backend: FakeBackend) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/users/me", get(me))
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(read_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/{id}/like", post(like_post))
        .route("/api/posts/{id}/comments", post(create_comment))
        .route("/api/boom", get(boom))
        .route("/api/empty", get(empty))
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

async fn record(State(backend): State<FakeBackend>, req: Request, next: Next) -> Response {
    let recorded = {
        let header_str = |name: header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
        }
    };
    backend.state.lock().unwrap().requests.push(recorded);
    next.run(req).await
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn unauthorized() -> Response {
    detail(StatusCode::UNAUTHORIZED, "Could not validate credentials")
}

async fn login(State(backend): State<FakeBackend>, mut multipart: Multipart) -> Response {
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        fields.insert(name, field.text().await.unwrap());
    }

    let mut state = backend.state.lock().unwrap();
    let user = state.users.iter().find(|u| {
        Some(&u.email) == fields.get("username") && Some(&u.password) == fields.get("password")
    });
    let Some(user_id) = user.map(|u| u.id) else {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    };

    let token = format!("token-{}", uuid::Uuid::now_v7());
    state.tokens.insert(token.clone(), user_id);
    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
}

async fn register(State(backend): State<FakeBackend>, Json(body): Json<RegisterBody>) -> Response {
    let mut state = backend.state.lock().unwrap();
    if state.users.iter().any(|u| u.email == body.email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let id = state.next_id();
    state.users.push(User {
        id,
        email: body.email,
        password: body.password,
    });
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    )
        .into_response()
}

async fn me(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    let state = backend.state.lock().unwrap();
    match state.user_for(&headers) {
        Some(user) => Json(json!({ "id": user.id, "email": user.email })).into_response(),
        None => unauthorized(),
    }
}

async fn list_posts(State(backend): State<FakeBackend>) -> Response {
    let state = backend.state.lock().unwrap();
    let mut posts: Vec<&StoredPost> = state.posts.iter().collect();
    posts.sort_by(|a, b| b.id.cmp(&a.id));
    let body: Vec<Value> = posts.iter().map(|p| state.post_json(p)).collect();
    Json(body).into_response()
}

async fn create_post(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let user = backend.state.lock().unwrap().user_for(&headers);
    let Some(user) = user else {
        return unauthorized();
    };

    let mut content = None;
    let mut image = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "content" => content = Some(field.text().await.unwrap()),
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.unwrap();
                image = Some((file_name, bytes.len()));
            }
            _ => {}
        }
    }
    let (Some(content), Some((file_name, size))) = (content, image) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "msg": "field required" }] })),
        )
            .into_response();
    };
    if size == 0 {
        return detail(StatusCode::BAD_REQUEST, "Empty image");
    }

    let mut state = backend.state.lock().unwrap();
    let id = state.next_id();
    state.uploads.push(file_name.clone());
    state.posts.push(StoredPost {
        id,
        user_id: user.id,
        content,
        img_path: format!("/uploads/{}", file_name),
        created_at: now(),
        updated_at: None,
    });
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Post created successfully", "id": id })),
    )
        .into_response()
}

async fn read_post(State(backend): State<FakeBackend>, Path(id): Path<i64>) -> Response {
    let state = backend.state.lock().unwrap();
    let Some(post) = state.posts.iter().find(|p| p.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Post not found");
    };
    let comments: Vec<Value> = state
        .comments
        .iter()
        .filter(|c| c.post_id == id)
        .map(|c| {
            json!({
                "id": c.id,
                "post_id": c.post_id,
                "user_id": c.user_id,
                "user_email": state.email_of(c.user_id),
                "comment": c.comment,
                "created_at": c.created_at,
            })
        })
        .collect();
    Json(json!({ "post": state.post_json(post), "comments": comments })).into_response()
}

#[derive(Deserialize)]
struct UpdateBody {
    content: String,
}

async fn update_post(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    let mut state = backend.state.lock().unwrap();
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };
    let Some(post) = state.posts.iter_mut().find(|p| p.id == id) else {
        return detail(StatusCode::NOT_FOUND, "Post not found");
    };
    if post.user_id != user.id {
        return detail(StatusCode::FORBIDDEN, "Not authorized to update this post");
    }
    post.content = body.content;
    post.updated_at = Some(now());
    Json(json!({ "message": "Post updated successfully" })).into_response()
}

async fn delete_post(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = backend.state.lock().unwrap();
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };
    let Some(owner) = state.posts.iter().find(|p| p.id == id).map(|p| p.user_id) else {
        return detail(StatusCode::NOT_FOUND, "Post not found");
    };
    if owner != user.id {
        return detail(StatusCode::FORBIDDEN, "Not authorized to delete this post");
    }
    state.posts.retain(|p| p.id != id);
    Json(json!({ "message": "Post deleted successfully" })).into_response()
}

async fn like_post(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = backend.state.lock().unwrap();
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };
    let liked = state.likes.insert((id, user.id));
    if !liked {
        state.likes.remove(&(id, user.id));
    }
    Json(json!({ "liked": liked })).into_response()
}

#[derive(Deserialize)]
struct CommentBody {
    comment: String,
}

async fn create_comment(
    State(backend): State<FakeBackend>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<CommentBody>,
) -> Response {
    let mut state = backend.state.lock().unwrap();
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !state.posts.iter().any(|p| p.id == id) {
        return detail(StatusCode::NOT_FOUND, "Post not found");
    }
    let comment_id = state.next_id();
    state.comments.push(StoredComment {
        id: comment_id,
        post_id: id,
        user_id: user.id,
        comment: body.comment,
        created_at: now(),
    });
    Json(json!({ "message": "Comment added successfully" })).into_response()
}

async fn boom() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn empty() -> Response {
    StatusCode::OK.into_response()
}

/// A client wired to a fresh fake backend.
pub struct Harness {
    pub backend: FakeBackend,
    pub host: Arc<RecordingHost>,
    pub tokens: Arc<MemoryTokenStore>,
    pub api: ApiClient,
}

impl Harness {
    pub async fn start(backend: FakeBackend, token: Option<&str>) -> Self {
        Self::start_with_host(backend, token, RecordingHost::new(true)).await
    }

    pub async fn start_with_host(
        backend: FakeBackend,
        token: Option<&str>,
        host: RecordingHost,
    ) -> Self {
        let base = backend.spawn().await;
        let tokens = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let host = Arc::new(host);
        let api = ApiClient::new(&base, tokens.clone(), host.clone());
        Self {
            backend,
            host,
            tokens,
            api,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }
}
