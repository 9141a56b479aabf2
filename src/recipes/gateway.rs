use std::sync::{Arc, Mutex};

use tracing::{info, instrument};

use crate::api::Backend;
use crate::auth::session::SessionManager;
use crate::error::ApiError;
use crate::models::Recipe;
use crate::recipes::dto::RecipeDraft;

/// Create/update/delete of a recipe owned by the current user.
///
/// Delete is a two-step gesture: the gateway holds the armed slug as UI
/// state, and `confirm_delete` issues the request only when it matches.
pub struct MutationGateway {
    backend: Arc<dyn Backend>,
    session: Arc<SessionManager>,
    armed_delete: Mutex<Option<String>>,
}

impl MutationGateway {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionManager>) -> Self {
        Self {
            backend,
            session,
            armed_delete: Mutex::new(None),
        }
    }

    fn access(&self) -> Result<String, ApiError> {
        self.session.access_token().ok_or(ApiError::AuthRequired)
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        draft.validate()?;
        let access = self.access()?;
        let recipe = self.backend.create_recipe(&access, draft).await?;
        info!(recipe_id = recipe.id, slug = %recipe.slug, "recipe created");
        Ok(recipe)
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, slug: &str, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        draft.validate()?;
        let access = self.access()?;
        let recipe = self.backend.update_recipe(&access, slug, draft).await?;
        info!(recipe_id = recipe.id, "recipe updated");
        Ok(recipe)
    }

    /// First step of the delete gesture. Arming a second recipe replaces
    /// the first.
    pub fn arm_delete(&self, slug: &str) {
        *self.armed_delete.lock().unwrap() = Some(slug.to_string());
    }

    pub fn disarm_delete(&self) {
        *self.armed_delete.lock().unwrap() = None;
    }

    pub fn armed_delete(&self) -> Option<String> {
        self.armed_delete.lock().unwrap().clone()
    }

    /// Second step of the delete gesture. Refuses locally unless `slug`
    /// was armed; the armed state is consumed before the request so the
    /// delete is issued exactly once.
    #[instrument(skip(self))]
    pub async fn confirm_delete(&self, slug: &str) -> Result<(), ApiError> {
        {
            let mut armed = self.armed_delete.lock().unwrap();
            if armed.as_deref() != Some(slug) {
                return Err(ApiError::validation("delete is not armed for this recipe"));
            }
            *armed = None;
        }
        let access = self.access()?;
        self.backend.delete_recipe(&access, slug).await?;
        info!(slug, "recipe deleted");
        Ok(())
    }
}
