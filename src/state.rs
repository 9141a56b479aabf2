use std::sync::Arc;

use crate::api::{Backend, HttpBackend};
use crate::auth::dto::ProfileUpdate;
use crate::auth::session::SessionManager;
use crate::auth::storage::CredentialStore;
use crate::catalog::CatalogStore;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{Recipe, User};
use crate::overlay::{ModalOrchestrator, Overlay};
use crate::recipes::dto::RecipeDraft;
use crate::recipes::{FavoriteCoordinator, MutationGateway};

/// Composition root. Owns the synchronization components and routes the
/// completion signals between them: a successful login closes the
/// Authentication overlay, registration opens Profile, mutations patch
/// the catalog and dismiss their overlay, logout force-closes everything.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionManager>,
    pub catalog: Arc<CatalogStore>,
    pub favorites: Arc<FavoriteCoordinator>,
    pub gateway: Arc<MutationGateway>,
    pub overlays: Arc<ModalOrchestrator>,
}

impl AppState {
    pub async fn init(store: Arc<dyn CredentialStore>) -> anyhow::Result<Self> {
        let config = Arc::new(ClientConfig::from_env()?);
        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config)?);
        Ok(Self::assemble(config, backend, store).await)
    }

    /// Wire the components and run the startup reads: session
    /// rehydration, the category list, and the initial unfiltered
    /// catalog fetch.
    pub async fn assemble(
        config: Arc<ClientConfig>,
        backend: Arc<dyn Backend>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let session = Arc::new(SessionManager::new(backend.clone(), store));
        let catalog = Arc::new(CatalogStore::new(backend.clone(), session.clone()));
        let favorites = Arc::new(FavoriteCoordinator::new(
            backend.clone(),
            session.clone(),
            catalog.clone(),
        ));
        let gateway = Arc::new(MutationGateway::new(backend, session.clone()));
        let overlays = Arc::new(ModalOrchestrator::new(session.clone()));

        let state = Self {
            config,
            session,
            catalog,
            favorites,
            gateway,
            overlays,
        };
        state.session.init().await;
        state.catalog.load_categories().await;
        state.catalog.refresh().await;
        state
    }

    /// Login, close the Authentication overlay, and resynchronize the
    /// catalog so per-user favorite state is current.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.session.login(email, password).await?;
        self.overlays
            .close_if(|o| matches!(o, Overlay::Authentication));
        self.catalog.refresh().await;
        Ok(())
    }

    /// Register, then present the Profile overlay as the onboarding step.
    /// Registration does not authenticate.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password2: &str,
    ) -> Result<(), ApiError> {
        self.session
            .register(username, email, password, password2)
            .await?;
        self.overlays.open_profile();
        Ok(())
    }

    /// Destroy the session and force every overlay closed; they all
    /// assume an authenticated identity for their mutating actions.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.logout()?;
        self.overlays.close();
        Ok(())
    }

    pub async fn save_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let user = self.session.update_profile(update).await?;
        self.overlays.close_if(|o| matches!(o, Overlay::Profile));
        Ok(user)
    }

    pub async fn submit_new_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        let recipe = self.gateway.create(draft).await?;
        self.catalog.apply_created(recipe.clone());
        self.overlays.close_if(|o| matches!(o, Overlay::Create));
        Ok(recipe)
    }

    pub async fn submit_recipe_update(
        &self,
        slug: &str,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ApiError> {
        let recipe = self.gateway.update(slug, draft).await?;
        self.catalog.apply_updated(recipe.clone());
        self.overlays.close_if(|o| matches!(o, Overlay::Edit(_)));
        Ok(recipe)
    }

    /// Confirmed delete: issue the request, drop the recipe from the held
    /// list, and dismiss a View/Edit overlay still showing it.
    pub async fn confirm_recipe_delete(&self, slug: &str) -> Result<(), ApiError> {
        self.gateway.confirm_delete(slug).await?;
        self.catalog.apply_removed(slug);
        self.overlays.close_if(|o| match o {
            Overlay::View(r) | Overlay::Edit(r) => r.slug == slug,
            _ => false,
        });
        Ok(())
    }

    pub async fn toggle_favorite(&self, recipe_id: i64) -> Result<bool, ApiError> {
        self.favorites.toggle(recipe_id).await
    }
}

#[cfg(test)]
impl AppState {
    /// Fully wired state over the in-memory backend, with one account
    /// (`a@b.com` / `secretpw`) and a small seeded catalog.
    pub(crate) async fn fake() -> (Self, Arc<crate::testing::FakeBackend>) {
        use crate::auth::storage::MemoryCredentialStore;
        use crate::testing::{sample_category, sample_recipe, FakeBackend};

        let backend = Arc::new(FakeBackend::new());
        backend.with_account("a@b.com", "secretpw", 7, "ana");
        backend.push_recipe(sample_recipe(1, "pancakes", "Pancakes", 1));
        backend.push_recipe(sample_recipe(2, "beef-stew", "Beef Stew", 2));
        backend.push_category(sample_category(1, "Breakfast"));
        backend.push_category(sample_category(2, "Dinner"));

        let config = Arc::new(ClientConfig::new("http://backend.test", 5));
        let state = Self::assemble(
            config,
            backend.clone(),
            Arc::new(MemoryCredentialStore::new()),
        )
        .await;
        (state, backend)
    }
}
