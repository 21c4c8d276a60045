use askama::Template;

use crate::view::{FeedView, FormView, NavView};

#[derive(Template)]
#[template(path = "pages/feed.html")]
pub struct FeedTemplate<'a> {
    pub nav: &'a NavView,
    pub feed: &'a FeedView,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate<'a> {
    pub nav: &'a NavView,
    pub form: &'a FormView,
}

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate<'a> {
    pub nav: &'a NavView,
    pub form: &'a FormView,
}

/// Pages with no controller of their own still get the navigation bar.
#[derive(Template)]
#[template(path = "pages/blank.html")]
pub struct BlankTemplate<'a> {
    pub nav: &'a NavView,
}

pub fn feed(nav: &NavView, feed: &FeedView) -> askama::Result<String> {
    FeedTemplate { nav, feed }.render()
}

pub fn login(nav: &NavView, form: &FormView) -> askama::Result<String> {
    LoginTemplate { nav, form }.render()
}

pub fn register(nav: &NavView, form: &FormView) -> askama::Result<String> {
    RegisterTemplate { nav, form }.render()
}

pub fn blank(nav: &NavView) -> askama::Result<String> {
    BlankTemplate { nav }.render()
}
