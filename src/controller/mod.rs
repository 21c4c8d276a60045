//! Page controller: picks the page for a path once at load time, syncs the
//! navigation bar with the login state and exposes the page's handlers.

pub mod auth;
pub mod feed;
pub mod login;
pub mod register;

pub use auth::sync_auth_ui;
pub use feed::FeedPage;
pub use login::LoginPage;
pub use register::RegisterPage;

use crate::api::ApiClient;
use crate::auth::Session;
use crate::error::ClientResult;
use crate::host::LOGIN_PATH;
use crate::view::{render, NavView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Feed,
    Login,
    Register,
}

impl Page {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "/index.html" => Some(Page::Feed),
            "/login" => Some(Page::Login),
            "/register" => Some(Page::Register),
            _ => None,
        }
    }
}

pub enum PageContext {
    Feed(FeedPage),
    Login(LoginPage),
    Register(RegisterPage),
    Blank,
}

/// One loaded page. Moving to another page means loading a new `App`.
pub struct App {
    api: ApiClient,
    session: Session,
    nav: NavView,
    page: PageContext,
}

impl App {
    pub async fn load(api: ApiClient, path: &str) -> Self {
        let session = sync_auth_ui(&api).await;
        let nav = NavView::for_session(&session);

        let page = match Page::from_path(path) {
            Some(Page::Feed) => PageContext::Feed(FeedPage::init(api.clone(), session.clone()).await),
            Some(Page::Login) => PageContext::Login(LoginPage::new(api.clone())),
            Some(Page::Register) => PageContext::Register(RegisterPage::new(api.clone())),
            None => PageContext::Blank,
        };

        Self {
            api,
            session,
            nav,
            page,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn nav(&self) -> &NavView {
        &self.nav
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut PageContext {
        &mut self.page
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.api.tokens().clear()?;
        self.api.host().navigate(LOGIN_PATH);
        Ok(())
    }

    pub async fn render_html(&self) -> askama::Result<String> {
        match &self.page {
            PageContext::Feed(page) => render::feed(&self.nav, &page.view().await),
            PageContext::Login(page) => render::login(&self.nav, page.form()),
            PageContext::Register(page) => render::register(&self.nav, page.form()),
            PageContext::Blank => render::blank(&self.nav),
        }
    }

    pub async fn render_text(&self) -> String {
        match &self.page {
            PageContext::Feed(page) => page.view().await.to_string(),
            PageContext::Login(page) => form_text("Log in", page.form().error.as_deref()),
            PageContext::Register(page) => form_text("Sign up", page.form().error.as_deref()),
            PageContext::Blank => String::new(),
        }
    }
}

fn form_text(title: &str, error: Option<&str>) -> String {
    match error {
        Some(error) => format!("{}: {}", title, error),
        None => title.to_string(),
    }
}
