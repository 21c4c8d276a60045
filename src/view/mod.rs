//! View models: everything the page shows, independent of how it is drawn.
//! Handlers patch these; [`render`] turns them into HTML.

pub mod render;

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

use crate::api::models::{Comment, Post};
use crate::auth::Session;

pub const NO_POSTS: &str = "Be the first to post!";
pub const POSTS_FAILED: &str = "Failed to load posts.";
pub const LOGIN_REQUIRED: &str = "Login required.";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub const REGISTERED: &str = "Registration complete! Please log in.";
pub const CONFIRM_DELETE: &str = "Delete this post?";
pub const COMMENT_FAILED: &str = "Failed to add comment";

/// Visibility of the shared navigation links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavView {
    pub login_visible: bool,
    pub register_visible: bool,
    pub logout_visible: bool,
}

impl NavView {
    pub fn for_session(session: &Session) -> Self {
        let logged_in = session.is_logged_in();
        Self {
            login_visible: !logged_in,
            register_visible: !logged_in,
            logout_visible: logged_in,
        }
    }
}

/// A login or register form; only its inline error is dynamic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    pub error: Option<String>,
}

impl FormView {
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

#[derive(Debug, Clone)]
pub struct CommentLine {
    pub author: String,
    pub text: String,
}

impl From<&Comment> for CommentLine {
    fn from(comment: &Comment) -> Self {
        Self {
            author: comment.user_email.clone(),
            text: comment.comment.clone(),
        }
    }
}

/// One rendered post.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub post_id: i64,
    pub author: String,
    pub date: String,
    pub content: String,
    pub image_src: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub liked: bool,
    /// Delete and edit controls, shown to the owner only.
    pub owner_controls: bool,
    pub comments_open: bool,
    pub comments: Vec<CommentLine>,
}

impl PostCard {
    pub fn from_post(post: &Post, session: &Session) -> Self {
        Self {
            post_id: post.id,
            author: post.user_email.clone(),
            date: format_local_date(&post.created_at),
            content: post.content.clone(),
            image_src: post.img_path.clone(),
            like_count: post.like_count,
            comment_count: post.comment_count,
            liked: post.is_liked,
            owner_controls: session.owns(post.user_id),
            comments_open: false,
            comments: Vec::new(),
        }
    }

    /// Reflect the server's answer to a like toggle.
    pub fn apply_like(&mut self, liked: bool) {
        self.liked = liked;
        if liked {
            self.like_count += 1;
        } else {
            self.like_count -= 1;
        }
    }

    pub fn set_comments(&mut self, comments: &[Comment]) {
        self.comments = comments.iter().map(CommentLine::from).collect();
    }
}

#[derive(Debug, Clone)]
pub enum FeedContent {
    Loading,
    Posts(Vec<PostCard>),
    Failed,
}

#[derive(Debug, Clone)]
pub struct FeedView {
    /// Post form for signed-in viewers, login prompt for guests.
    pub logged_in: bool,
    pub content: FeedContent,
}

impl FeedView {
    pub fn new(session: &Session) -> Self {
        Self {
            logged_in: session.is_logged_in(),
            content: FeedContent::Loading,
        }
    }

    pub fn show_posts(&mut self, posts: &[Post], session: &Session) {
        let cards = posts
            .iter()
            .map(|post| PostCard::from_post(post, session))
            .collect();
        self.content = FeedContent::Posts(cards);
    }

    pub fn cards(&self) -> &[PostCard] {
        match &self.content {
            FeedContent::Posts(cards) => cards,
            _ => &[],
        }
    }

    pub fn card(&self, post_id: i64) -> Option<&PostCard> {
        self.cards().iter().find(|c| c.post_id == post_id)
    }

    pub fn card_mut(&mut self, post_id: i64) -> Option<&mut PostCard> {
        match &mut self.content {
            FeedContent::Posts(cards) => cards.iter_mut().find(|c| c.post_id == post_id),
            _ => None,
        }
    }

    /// Drop the card for `post_id`; the rest of the list is untouched.
    pub fn remove_card(&mut self, post_id: i64) -> bool {
        match &mut self.content {
            FeedContent::Posts(cards) => {
                let before = cards.len();
                cards.retain(|c| c.post_id != post_id);
                cards.len() != before
            }
            _ => false,
        }
    }

    /// Text shown in place of cards, if any.
    pub fn placeholder(&self) -> Option<&'static str> {
        match &self.content {
            FeedContent::Posts(cards) if cards.is_empty() => Some(NO_POSTS),
            FeedContent::Failed => Some(POSTS_FAILED),
            _ => None,
        }
    }
}

/// Backend timestamps are UTC without a zone suffix.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn format_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    match parse_utc(raw) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}

pub fn format_local_date(raw: &str) -> String {
    format_date_in(raw, &Local)
}

impl fmt::Display for PostCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {} · {}", self.post_id, self.author, self.date)?;
        if !self.content.is_empty() {
            writeln!(f, "  {}", self.content)?;
        }
        writeln!(f, "  image: {}", self.image_src)?;
        write!(
            f,
            "  {} {} likes · {} comments",
            if self.liked { "♥" } else { "♡" },
            self.like_count,
            self.comment_count
        )?;
        if self.comments_open {
            for line in &self.comments {
                write!(f, "\n    {}: {}", line.author, line.text)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for FeedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.placeholder() {
            return write!(f, "{}", text);
        }
        if matches!(self.content, FeedContent::Loading) {
            return write!(f, "Loading…");
        }
        let cards = self.cards();
        for (i, card) in cards.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}
