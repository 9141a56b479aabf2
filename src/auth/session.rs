use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::api::Backend;
use crate::auth::dto::{CredentialPair, LoginRequest, ProfileUpdate, RegisterRequest};
use crate::auth::storage::{self, CredentialStore};
use crate::error::ApiError;
use crate::models::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

const MIN_PASSWORD_LEN: usize = 8;

/// Owns the authenticated-identity lifecycle: login, registration, logout,
/// the cached current user, and the access credential attached to every
/// authenticated request.
///
/// The credential pair and the cached identity are the only process-wide
/// mutable session state; both are written here and read by every
/// authenticated call site through accessors.
pub struct SessionManager {
    backend: Arc<dyn Backend>,
    store: Arc<dyn CredentialStore>,
    user: RwLock<Option<User>>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            backend,
            store,
            user: RwLock::new(None),
        }
    }

    /// Rehydrate a persisted session at startup and refresh the cached
    /// identity. A stale or invalid persisted credential is left in place;
    /// subsequent authenticated calls will surface the rejection.
    pub async fn init(&self) {
        match storage::load_pair(self.store.as_ref()) {
            Ok(Some(_)) => {
                if let Err(e) = self.refresh_user().await {
                    warn!(error = %e, "profile refresh on startup failed");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "credential rehydration failed"),
        }
    }

    /// Authenticate and persist the credential pair. On success the cached
    /// identity is refreshed; a failed login mutates nothing.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair, ApiError> {
        let req = LoginRequest {
            email: email.trim().to_lowercase(),
            password: password.to_string(),
        };
        let pair = self.backend.login(&req).await?;
        storage::save_pair(self.store.as_ref(), &pair)?;
        if let Err(e) = self.refresh_user().await {
            warn!(error = %e, "profile fetch after login failed");
        }
        info!("logged in");
        Ok(pair)
    }

    /// Create an account. Fails locally, before any request, when the
    /// passwords do not match, the email is malformed, or the password is
    /// too short. Success does not authenticate; the caller routes the
    /// onboarding step (the Profile overlay).
    #[instrument(skip(self, password, password2))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password2: &str,
    ) -> Result<(), ApiError> {
        if password != password2 {
            warn!("password confirmation mismatch");
            return Err(ApiError::validation("passwords do not match"));
        }
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::validation("invalid email"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            warn!("password too short");
            return Err(ApiError::validation("password too short"));
        }

        let req = RegisterRequest {
            username: username.to_string(),
            email,
            password: password.to_string(),
            password2: password2.to_string(),
        };
        self.backend.register(&req).await?;
        info!(username = %req.username, "registered");
        Ok(())
    }

    /// Destroy the session: both persisted credentials and the cached
    /// identity. The cache is cleared even if the store errors, so logout
    /// always wins over an in-flight login.
    pub fn logout(&self) -> Result<(), ApiError> {
        *self.user.write().unwrap() = None;
        storage::clear_pair(self.store.as_ref())?;
        info!("logged out");
        Ok(())
    }

    /// Synchronous read of the cached identity.
    pub fn current_user(&self) -> Option<User> {
        self.user.read().unwrap().clone()
    }

    /// Access credential for outgoing authenticated requests, or `None`
    /// when no session exists. A storage failure reads as no session.
    pub fn access_token(&self) -> Option<String> {
        match storage::load_pair(self.store.as_ref()) {
            Ok(pair) => pair.map(|p| p.access),
            Err(e) => {
                warn!(error = %e, "credential read failed");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Re-fetch the current user with the stored access credential.
    pub async fn refresh_user(&self) -> Result<(), ApiError> {
        let access = self.access_token().ok_or(ApiError::AuthRequired)?;
        let user = self.backend.fetch_profile(&access).await?;
        *self.user.write().unwrap() = Some(user);
        Ok(())
    }

    /// Update profile fields and refresh the cache from the response.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let access = self.access_token().ok_or(ApiError::AuthRequired)?;
        let user = self.backend.update_profile(&access, update).await?;
        *self.user.write().unwrap() = Some(user.clone());
        info!(user_id = user.id, "profile updated");
        Ok(user)
    }
}
