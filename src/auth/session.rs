use crate::api::models::CurrentUser;

/// Per-page-load login state, passed explicitly to whatever needs to know
/// who is looking at the page.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub current_user: Option<CurrentUser>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn signed_in(user: CurrentUser) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Whether the viewer owns a post written by `user_id`.
    pub fn owns(&self, user_id: i64) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|user| user.id == user_id)
    }
}
