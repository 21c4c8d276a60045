use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::host::LOGIN_PATH;
use crate::view::{FormView, PASSWORD_MISMATCH, REGISTERED};

pub struct RegisterPage {
    api: ApiClient,
    form: FormView,
}

impl RegisterPage {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            form: FormView::default(),
        }
    }

    pub fn form(&self) -> &FormView {
        &self.form
    }

    /// Mismatched passwords are rejected here, before anything is sent.
    pub async fn submit(&mut self, email: &str, password: &str, confirm: &str) {
        if let Err(e) = check_passwords(password, confirm) {
            self.form.show_error(e.user_message());
            return;
        }

        match self.api.register(email, password).await {
            Ok(_) => {
                self.api.host().alert(REGISTERED);
                self.api.host().navigate(LOGIN_PATH);
            }
            Err(e) if e.is_silent() => {}
            Err(e) => self.form.show_error(e.user_message()),
        }
    }
}

fn check_passwords(password: &str, confirm: &str) -> ClientResult<()> {
    if password != confirm {
        return Err(ClientError::Validation(PASSWORD_MISMATCH.to_string()));
    }
    Ok(())
}
