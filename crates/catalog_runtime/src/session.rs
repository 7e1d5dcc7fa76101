use catalog_api::{validate_api_key, ApiKeyValidation};
use catalog_state::{AuthError, Registration, SessionContext};
use leptos::*;

use crate::{notice::NoticeKind, CatalogContext};

impl CatalogContext {
    /// Registers a local account. The password is the user's metadata API key.
    pub fn register(&self, form: &Registration) -> Result<(), AuthError> {
        self.auth().register(form).map_err(|err| {
            if let AuthError::Storage(storage_err) = &err {
                logging::warn!("account registration failed: {storage_err}");
            }
            err
        })?;
        self.notify(NoticeKind::Success, "Account created. Sign in to continue.");
        Ok(())
    }

    /// Signs in and publishes the new session to every view.
    pub fn sign_in(
        &self,
        email: &str,
        api_key: &str,
        keep_login: bool,
    ) -> Result<SessionContext, AuthError> {
        match self.auth().sign_in(email, api_key, keep_login) {
            Ok(session) => {
                self.session.set(Some(session.clone()));
                Ok(session)
            }
            Err(err) => {
                if let AuthError::Storage(storage_err) = &err {
                    logging::warn!("sign-in persistence failed: {storage_err}");
                }
                Err(err)
            }
        }
    }

    /// Signs out. The session signal is cleared even when clearing storage fails.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.session.set(None);
        self.auth().sign_out().map_err(|err| {
            logging::warn!("sign-out cleanup failed: {err}");
            err
        })
    }

    /// Checks an API key against the metadata API before it is used as a password.
    pub async fn check_api_key(&self, api_key: String) -> ApiKeyValidation {
        let transport = self.transport.get_value();
        let config = self.config.get_value();
        validate_api_key(&transport, &config, &api_key).await
    }
}
