//! Local sign-in gate.
//!
//! Accounts live in the browser only: the "password" is the user's metadata API key, stored as
//! entered. Signing in stores the key for API calls and marks the current user, durably when the
//! user asked to stay signed in and in session scope otherwise.

use platform_host::{read_json_with, write_json_with, KeyValueStore, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key holding registered accounts.
pub const USERS_KEY: &str = "users";
/// Storage key holding the signed-in user.
pub const CURRENT_USER_KEY: &str = "current_user";
/// Storage key holding the metadata API key.
pub const API_KEY_KEY: &str = "api_key";
/// Storage key holding the "keep me signed in" flag.
pub const KEEP_LOGIN_KEY: &str = "keep_login";
/// Minimum password (API key) length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Sign-in and registration failures, worded for the form.
pub enum AuthError {
    /// A required field is blank.
    #[error("Fill in every field.")]
    MissingField,
    /// The email is not shaped like an address.
    #[error("Enter a valid email address.")]
    InvalidEmail,
    /// The password is shorter than [`MIN_PASSWORD_LEN`].
    #[error("The password must be at least {MIN_PASSWORD_LEN} characters.")]
    PasswordTooShort,
    /// Password and confirmation differ.
    #[error("The passwords do not match.")]
    PasswordMismatch,
    /// Terms were not accepted.
    #[error("Accept the terms to continue.")]
    TermsNotAccepted,
    /// An account with this email already exists.
    #[error("An account with this email already exists.")]
    DuplicateAccount,
    /// No account matches the email and password.
    #[error("Incorrect email or password.")]
    InvalidCredentials,
    /// Reading or writing account data failed.
    #[error("Could not save sign-in data: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Registration form input.
pub struct Registration {
    /// Email used as the account id.
    pub email: String,
    /// Password; the user's metadata API key.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// Whether the terms were accepted.
    pub terms_accepted: bool,
}

impl Registration {
    /// Checks the form without touching storage.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AuthError::MissingField);
        }
        if !is_valid_email(&self.email) {
            return Err(AuthError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if !self.terms_accepted {
            return Err(AuthError::TermsNotAccepted);
        }
        Ok(())
    }
}

/// Returns `true` for `local@domain.tld` shapes without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Signed-in user and the credential views pass to the metadata client.
pub struct SessionContext {
    /// Account id (email).
    pub user_id: String,
    /// Metadata API key.
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    id: String,
    password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CurrentUser {
    id: String,
}

/// Local account registry and sign-in state over a durable and a session-scoped store.
#[derive(Debug, Clone)]
pub struct AuthService<D, S> {
    durable: D,
    session: S,
}

impl<D: KeyValueStore, S: KeyValueStore> AuthService<D, S> {
    /// Service over `durable` (local storage) and `session` (session storage).
    pub fn new(durable: D, session: S) -> Self {
        Self { durable, session }
    }

    fn accounts(&self) -> Vec<Account> {
        read_json_with::<_, Vec<Account>>(&self.durable, USERS_KEY)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Registers a new account after validating the form.
    pub fn register(&self, form: &Registration) -> Result<(), AuthError> {
        form.validate()?;
        let email = form.email.trim();
        let mut accounts = self.accounts();
        if accounts.iter().any(|account| account.id == email) {
            return Err(AuthError::DuplicateAccount);
        }
        accounts.push(Account {
            id: email.to_string(),
            password: form.password.clone(),
        });
        write_json_with(&self.durable, USERS_KEY, &accounts)?;
        Ok(())
    }

    /// Signs in to an existing account and stores its API key.
    ///
    /// With `keep_login` the current user survives browser restarts; otherwise it lasts for the
    /// browser session only.
    pub fn sign_in(
        &self,
        email: &str,
        api_key: &str,
        keep_login: bool,
    ) -> Result<SessionContext, AuthError> {
        let email = email.trim();
        if email.is_empty() || api_key.is_empty() {
            return Err(AuthError::MissingField);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        let known = self
            .accounts()
            .iter()
            .any(|account| account.id == email && account.password == api_key);
        if !known {
            return Err(AuthError::InvalidCredentials);
        }

        let user = CurrentUser {
            id: email.to_string(),
        };
        // The key is written last so a failed sign-in never leaves a credential without a user.
        let written = self.store_sign_in(&user, api_key, keep_login);
        if written.is_err() {
            self.clear_sign_in();
        }
        written?;
        Ok(SessionContext {
            user_id: user.id,
            api_key: api_key.to_string(),
        })
    }

    fn store_sign_in(
        &self,
        user: &CurrentUser,
        api_key: &str,
        keep_login: bool,
    ) -> Result<(), StorageError> {
        if keep_login {
            write_json_with(&self.durable, CURRENT_USER_KEY, user)?;
            self.session.remove(CURRENT_USER_KEY)?;
        } else {
            write_json_with(&self.session, CURRENT_USER_KEY, user)?;
            self.durable.remove(CURRENT_USER_KEY)?;
        }
        write_json_with(&self.durable, KEEP_LOGIN_KEY, &keep_login)?;
        write_json_with(&self.durable, API_KEY_KEY, api_key)
    }

    /// Best-effort removal of everything a sign-in writes.
    fn clear_sign_in(&self) {
        let _ = self.session.remove(CURRENT_USER_KEY);
        let _ = self.durable.remove(CURRENT_USER_KEY);
        let _ = self.durable.remove(KEEP_LOGIN_KEY);
        let _ = self.durable.remove(API_KEY_KEY);
    }

    fn current_user(&self) -> Option<CurrentUser> {
        read_current_user(&self.session).or_else(|| read_current_user(&self.durable))
    }

    /// Stored API key, if any.
    pub fn stored_api_key(&self) -> Option<String> {
        read_json_with::<_, String>(&self.durable, API_KEY_KEY)
            .ok()
            .flatten()
            .filter(|key| !key.trim().is_empty())
    }

    /// Whether the user asked to stay signed in.
    pub fn keep_login(&self) -> bool {
        read_json_with::<_, bool>(&self.durable, KEEP_LOGIN_KEY)
            .ok()
            .flatten()
            .unwrap_or(false)
    }

    /// Returns `true` when a user is signed in.
    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    /// Session for the signed-in user, when both the user and an API key are stored.
    pub fn current_session(&self) -> Option<SessionContext> {
        let user = self.current_user()?;
        let api_key = self.stored_api_key()?;
        Some(SessionContext {
            user_id: user.id,
            api_key,
        })
    }

    /// Clears the signed-in user, the stored API key, and the keep-login flag. Accounts remain.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.session.remove(CURRENT_USER_KEY)?;
        self.durable.remove(CURRENT_USER_KEY)?;
        self.durable.remove(API_KEY_KEY)?;
        self.durable.remove(KEEP_LOGIN_KEY)?;
        Ok(())
    }
}

fn read_current_user<K: KeyValueStore>(store: &K) -> Option<CurrentUser> {
    read_json_with(store, CURRENT_USER_KEY).ok().flatten()
}
