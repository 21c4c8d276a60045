use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::models::ImageUpload;
use crate::api::ApiClient;
use crate::auth::Session;
use crate::view::{FeedContent, FeedView, COMMENT_FAILED, CONFIRM_DELETE, LOGIN_REQUIRED};

/// The landing page. Cheap to clone; clones share the same view, so
/// handlers for different cards can run at the same time. The view is only
/// locked to apply a response, and responses land in arrival order.
#[derive(Clone)]
pub struct FeedPage {
    api: ApiClient,
    session: Session,
    view: Arc<Mutex<FeedView>>,
}

impl FeedPage {
    pub async fn init(api: ApiClient, session: Session) -> Self {
        let view = FeedView::new(&session);
        let page = Self {
            api,
            session,
            view: Arc::new(Mutex::new(view)),
        };
        page.reload().await;
        page
    }

    /// Snapshot of what the page currently shows.
    pub async fn view(&self) -> FeedView {
        self.view.lock().await.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the whole list with a fresh copy from the backend.
    pub async fn reload(&self) {
        let result = self.api.posts().await;
        let mut view = self.view.lock().await;
        match result {
            Ok(posts) => view.show_posts(&posts, &self.session),
            Err(_) => view.content = FeedContent::Failed,
        }
    }

    /// Publish a post. Without an image nothing is sent.
    pub async fn submit_post(&self, content: &str, image: Option<ImageUpload>) {
        let Some(image) = image else {
            return;
        };

        match self.api.create_post(content, image).await {
            Ok(_) => {
                tracing::info!("Post created");
                self.reload().await;
            }
            Err(e) if e.is_silent() => {}
            Err(e) => self
                .api
                .host()
                .alert(&format!("Failed to create post: {}", e.user_message())),
        }
    }

    pub async fn toggle_like(&self, post_id: i64) {
        if !self.session.is_logged_in() {
            self.api.host().alert(LOGIN_REQUIRED);
            return;
        }

        match self.api.like_post(post_id).await {
            Ok(result) => {
                let mut view = self.view.lock().await;
                if let Some(card) = view.card_mut(post_id) {
                    card.apply_like(result.liked);
                }
            }
            Err(e) if e.is_silent() => {}
            Err(e) => tracing::error!("Failed to toggle like on post {}: {}", post_id, e),
        }
    }

    /// Show or hide a card's comments, fetching them each time they open.
    pub async fn toggle_comments(&self, post_id: i64) {
        let opened = {
            let mut view = self.view.lock().await;
            let Some(card) = view.card_mut(post_id) else {
                return;
            };
            card.comments_open = !card.comments_open;
            card.comments_open
        };

        if opened {
            self.load_comments(post_id).await;
        }
    }

    async fn load_comments(&self, post_id: i64) {
        match self.api.post(post_id).await {
            Ok(detail) => {
                let mut view = self.view.lock().await;
                if let Some(card) = view.card_mut(post_id) {
                    card.set_comments(&detail.comments);
                }
            }
            Err(e) if e.is_silent() => {}
            Err(e) => tracing::error!("Failed to load comments for post {}: {}", post_id, e),
        }
    }

    /// Add a comment and refresh the card's comment list. Returns whether
    /// the backend accepted it.
    pub async fn submit_comment(&self, post_id: i64, text: &str) -> bool {
        if !self.session.is_logged_in() {
            self.api.host().alert(LOGIN_REQUIRED);
            return false;
        }

        match self.api.create_comment(post_id, text).await {
            Ok(_) => {
                self.load_comments(post_id).await;
                let mut view = self.view.lock().await;
                if let Some(card) = view.card_mut(post_id) {
                    card.comment_count += 1;
                }
                true
            }
            Err(e) if e.is_silent() => false,
            Err(_) => {
                self.api.host().alert(COMMENT_FAILED);
                false
            }
        }
    }

    /// Open a card's comment section without fetching; used after a
    /// submit has already loaded the list.
    pub async fn reveal_comments(&self, post_id: i64) {
        let mut view = self.view.lock().await;
        if let Some(card) = view.card_mut(post_id) {
            card.comments_open = true;
        }
    }

    /// Delete one of the viewer's own posts after confirmation. Cards the
    /// viewer does not own have no delete control, so nothing happens.
    pub async fn delete_post(&self, post_id: i64) {
        if !self.is_owned(post_id).await {
            return;
        }
        if !self.api.host().confirm(CONFIRM_DELETE).await {
            return;
        }

        match self.api.delete_post(post_id).await {
            Ok(_) => {
                self.view.lock().await.remove_card(post_id);
                tracing::info!("Deleted post {}", post_id);
            }
            Err(e) if e.is_silent() => {}
            Err(e) => tracing::error!("Failed to delete post {}: {}", post_id, e),
        }
    }

    /// Change the text of one of the viewer's own posts.
    pub async fn edit_post(&self, post_id: i64, content: &str) {
        if !self.is_owned(post_id).await {
            return;
        }

        match self.api.update_post(post_id, content).await {
            Ok(_) => {
                let mut view = self.view.lock().await;
                if let Some(card) = view.card_mut(post_id) {
                    card.content = content.to_string();
                }
            }
            Err(e) if e.is_silent() => {}
            Err(e) => self
                .api
                .host()
                .alert(&format!("Failed to edit post: {}", e.user_message())),
        }
    }

    async fn is_owned(&self, post_id: i64) -> bool {
        self.view
            .lock()
            .await
            .card(post_id)
            .is_some_and(|card| card.owner_controls)
    }
}
