//! One CLI invocation: load the page the command acts on, run the action,
//! then land on wherever the host was sent.

use anyhow::Context;

use crate::api::models::ImageUpload;
use crate::api::ApiClient;
use crate::config::Command;
use crate::controller::{App, FeedPage, PageContext};
use crate::host::{FEED_PATH, LOGIN_PATH, REGISTER_PATH};

/// Path of the page a command starts on.
pub fn start_path(command: &Command) -> String {
    match command {
        Command::Login { .. } | Command::Logout => LOGIN_PATH.to_string(),
        Command::Register { .. } => REGISTER_PATH.to_string(),
        Command::Render { path } => path.clone(),
        _ => FEED_PATH.to_string(),
    }
}

/// Run `command` and return the page that ends up loaded. A navigation made
/// while loading counts too, so an expired session ends on the login page.
pub async fn run(command: Command, api: ApiClient) -> anyhow::Result<App> {
    let start = api.host().location();
    let mut app = App::load(api.clone(), &start_path(&command)).await;

    match command {
        Command::Login { email, password } => {
            if let PageContext::Login(page) = app.page_mut() {
                page.submit(&email, &password).await;
            }
        }
        Command::Register {
            email,
            password,
            confirm,
        } => {
            if let PageContext::Register(page) = app.page_mut() {
                page.submit(&email, &password, &confirm).await;
            }
        }
        Command::Logout => app.logout()?,
        Command::Feed | Command::Render { .. } => {}
        Command::Post { content, image } => {
            let image = match image {
                Some(path) => Some(
                    ImageUpload::from_path(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => {
                    tracing::warn!("A post needs an image, nothing was sent");
                    None
                }
            };
            if let Some(page) = feed_page(&app) {
                page.submit_post(&content, image).await;
            }
        }
        Command::Edit { post_id, content } => {
            if let Some(page) = feed_page(&app) {
                page.edit_post(post_id, &content).await;
            }
        }
        Command::Like { post_id } => {
            if let Some(page) = feed_page(&app) {
                page.toggle_like(post_id).await;
            }
        }
        Command::Comments { post_id } => {
            if let Some(page) = feed_page(&app) {
                page.toggle_comments(post_id).await;
            }
        }
        Command::Comment { post_id, text } => {
            if let Some(page) = feed_page(&app) {
                if page.submit_comment(post_id, &text).await {
                    page.reveal_comments(post_id).await;
                }
            }
        }
        Command::Delete { post_id } => {
            if let Some(page) = feed_page(&app) {
                page.delete_post(post_id).await;
            }
        }
    }

    // Follow a navigation, the way a browser would
    if let Some(next) = api.host().location().filter(|loc| Some(loc) != start.as_ref()) {
        app = App::load(api, &next).await;
    }

    Ok(app)
}

/// The feed page, unless loading already sent the host elsewhere.
fn feed_page(app: &App) -> Option<FeedPage> {
    match app.page() {
        PageContext::Feed(page) => Some(page.clone()),
        _ => None,
    }
}
