use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::models::{
    Credentials, CurrentUser, ImageUpload, LikeResult, MessageResponse, NewComment, Post,
    PostDetail, PostUpdate, TokenResponse,
};
use crate::auth::TokenStore;
use crate::error::{ClientError, ClientResult, GENERIC_ERROR};
use crate::host::{Host, LOGIN_PATH};

pub enum Body {
    Empty,
    Json(Vec<u8>),
    Multipart(Form),
}

/// Method, extra headers and body of a single API call.
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Body,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::method(Method::GET)
    }

    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    pub fn put() -> Self {
        Self::method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Body::Json(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Wrapper around the feed backend's REST API. Every call goes through
/// [`ApiClient::request`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    host: Arc<dyn Host>,
}

impl ApiClient {
    pub fn new(base_url: &Url, tokens: Arc<dyn TokenStore>, host: Arc<dyn Host>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, tokens, host)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: &Url,
        tokens: Arc<dyn TokenStore>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            tokens,
            host,
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn url(&self, endpoint: &str) -> ClientResult<Url> {
        Ok(Url::parse(&format!("{}{}", self.base_url, endpoint))?)
    }

    /// JSON content type, plus the bearer token when one is stored.
    pub fn default_headers(&self) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.get() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    fn merge_headers(&self, extra: HeaderMap, multipart: bool) -> ClientResult<HeaderMap> {
        let mut headers = self.default_headers()?;
        headers.extend(extra);
        // The multipart boundary goes in the content type, reqwest sets it.
        if multipart {
            headers.remove(CONTENT_TYPE);
        }
        Ok(headers)
    }

    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<Option<Value>> {
        let result = self.send(endpoint, options).await;
        if let Err(ref e) = result {
            if !e.is_silent() {
                tracing::error!("API request error on {}: {}", endpoint, e);
            }
        }
        result
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> ClientResult<Option<Value>> {
        let url = self.url(endpoint)?;
        let multipart = matches!(options.body, Body::Multipart(_));
        let headers = self.merge_headers(options.headers, multipart)?;

        let builder = self.http.request(options.method, url).headers(headers);
        let builder = match options.body {
            Body::Empty => builder,
            Body::Json(bytes) => builder.body(bytes),
            Body::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.tokens.clear()?;
            self.host.navigate(LOGIN_PATH);
            return Err(ClientError::SessionExpired);
        }

        if !status.is_success() {
            let body: Value = response
                .json()
                .await
                .unwrap_or_else(|_| Value::Object(Default::default()));
            let detail = body
                .get("detail")
                .and_then(Value::as_str)
                .unwrap_or(GENERIC_ERROR)
                .to_string();
            return Err(ClientError::Api { status, detail });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Log in with form fields; the returned token is stored when present.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        let form = Form::new()
            .text("username", email.to_string())
            .text("password", password.to_string());

        let data: TokenResponse =
            decode(self.request("/auth/login", RequestOptions::post().multipart(form)).await?)?;

        if let Some(ref token) = data.access_token {
            self.tokens.set(token)?;
        }
        Ok(data)
    }

    pub async fn register(&self, email: &str, password: &str) -> ClientResult<MessageResponse> {
        let options = RequestOptions::post().json(&Credentials { email, password })?;
        decode_or_default(self.request("/auth/register", options).await?)
    }

    pub async fn me(&self) -> ClientResult<CurrentUser> {
        decode(self.request("/users/me", RequestOptions::get()).await?)
    }

    pub async fn posts(&self) -> ClientResult<Vec<Post>> {
        decode(self.request("/posts", RequestOptions::get()).await?)
    }

    pub async fn create_post(
        &self,
        content: &str,
        image: ImageUpload,
    ) -> ClientResult<MessageResponse> {
        let mime = image.mime_type();
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&mime)?;
        let form = Form::new()
            .text("content", content.to_string())
            .part("image", part);

        decode_or_default(
            self.request("/posts", RequestOptions::post().multipart(form))
                .await?,
        )
    }

    pub async fn update_post(&self, post_id: i64, content: &str) -> ClientResult<MessageResponse> {
        let options = RequestOptions::put().json(&PostUpdate { content })?;
        decode_or_default(self.request(&format!("/posts/{}", post_id), options).await?)
    }

    pub async fn delete_post(&self, post_id: i64) -> ClientResult<MessageResponse> {
        decode_or_default(
            self.request(&format!("/posts/{}", post_id), RequestOptions::delete())
                .await?,
        )
    }

    /// Toggle the viewer's like; the server reports the new state.
    pub async fn like_post(&self, post_id: i64) -> ClientResult<LikeResult> {
        decode(
            self.request(&format!("/posts/{}/like", post_id), RequestOptions::post())
                .await?,
        )
    }

    pub async fn post(&self, post_id: i64) -> ClientResult<PostDetail> {
        decode(
            self.request(&format!("/posts/{}", post_id), RequestOptions::get())
                .await?,
        )
    }

    pub async fn create_comment(
        &self,
        post_id: i64,
        comment: &str,
    ) -> ClientResult<MessageResponse> {
        let options = RequestOptions::post().json(&NewComment { comment })?;
        decode_or_default(
            self.request(&format!("/posts/{}/comments", post_id), options)
                .await?,
        )
    }
}

fn decode<T: DeserializeOwned>(value: Option<Value>) -> ClientResult<T> {
    let value = value.ok_or(ClientError::EmptyBody)?;
    Ok(serde_json::from_value(value)?)
}

fn decode_or_default<T: DeserializeOwned + Default>(value: Option<Value>) -> ClientResult<T> {
    match value {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(T::default()),
    }
}
