use crate::api::ApiClient;
use crate::host::FEED_PATH;
use crate::view::FormView;

pub struct LoginPage {
    api: ApiClient,
    form: FormView,
}

impl LoginPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            form: FormView::default(),
        }
    }

    pub fn form(&self) -> &FormView {
        &self.form
    }

    pub async fn submit(&mut self, email: &str, password: &str) {
        match self.api.login(email, password).await {
            Ok(_) => self.api.host().navigate(FEED_PATH),
            Err(e) if e.is_silent() => {}
            Err(e) => self.form.show_error(e.user_message()),
        }
    }
}
