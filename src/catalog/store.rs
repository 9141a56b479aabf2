use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, instrument, warn};

use crate::api::Backend;
use crate::auth::session::SessionManager;
use crate::error::ApiError;
use crate::models::{Category, FilterCriteria, Recipe};

/// Recipe-fetch lifecycle as observed by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Idle,
    Loading,
    Error,
}

/// Holds the filtered recipe list and the category list, re-deriving the
/// recipes whenever the filter changes.
///
/// Every fetch carries a monotonically increasing tag; a response is
/// applied only while its tag is still the latest issued, so overlapping
/// fetches settle on the newest filter no matter the arrival order.
pub struct CatalogStore {
    backend: Arc<dyn Backend>,
    session: Arc<SessionManager>,
    recipes: RwLock<Vec<Recipe>>,
    categories: RwLock<Vec<Category>>,
    status: RwLock<CatalogStatus>,
    filter: RwLock<FilterCriteria>,
    fetch_seq: AtomicU64,
}

impl CatalogStore {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<SessionManager>) -> Self {
        Self {
            backend,
            session,
            recipes: RwLock::new(Vec::new()),
            categories: RwLock::new(Vec::new()),
            status: RwLock::new(CatalogStatus::Idle),
            filter: RwLock::new(FilterCriteria::default()),
            fetch_seq: AtomicU64::new(0),
        }
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.recipes.read().unwrap().clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories.read().unwrap().clone()
    }

    pub fn status(&self) -> CatalogStatus {
        *self.status.read().unwrap()
    }

    pub fn filter(&self) -> FilterCriteria {
        self.filter.read().unwrap().clone()
    }

    /// Replace the filter and fetch with the new criteria. An in-flight
    /// fetch is superseded immediately: its response will be discarded.
    pub async fn set_filter(&self, criteria: FilterCriteria) {
        *self.filter.write().unwrap() = criteria.clone();
        self.run_fetch(criteria).await;
    }

    /// Re-fetch with the current filter (resynchronization).
    pub async fn refresh(&self) {
        let criteria = self.filter();
        self.run_fetch(criteria).await;
    }

    #[instrument(skip(self, criteria), fields(search = %criteria.search_term))]
    async fn run_fetch(&self, criteria: FilterCriteria) {
        let tag = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.status.write().unwrap() = CatalogStatus::Loading;
        let result = self.backend.list_recipes(&criteria).await;

        // A newer fetch was issued while this one was in flight.
        if tag != self.fetch_seq.load(Ordering::SeqCst) {
            debug!(tag, "discarding superseded catalog response");
            return;
        }
        match result {
            Ok(list) => {
                debug!(tag, count = list.len(), "catalog updated");
                *self.recipes.write().unwrap() = list;
                *self.status.write().unwrap() = CatalogStatus::Idle;
            }
            Err(e) => {
                // Keep the previously held list so a transient failure
                // does not blank the UI.
                warn!(tag, error = %e, "catalog fetch failed");
                *self.status.write().unwrap() = CatalogStatus::Error;
            }
        }
    }

    /// Category fetch is unconditional and independent of filter state.
    pub async fn load_categories(&self) {
        match self.backend.list_categories().await {
            Ok(list) => *self.categories.write().unwrap() = list,
            Err(e) => warn!(error = %e, "category fetch failed"),
        }
    }

    /// Recipes owned by the current user. Requires a session.
    pub async fn my_recipes(&self) -> Result<Vec<Recipe>, ApiError> {
        let access = self.session.access_token().ok_or(ApiError::AuthRequired)?;
        self.backend.my_recipes(&access).await
    }

    // Targeted patches: successful mutations apply their result directly
    // instead of forcing a full reload.

    /// A newly created recipe is shown first, matching the backend's
    /// newest-first ordering.
    pub fn apply_created(&self, recipe: Recipe) {
        self.recipes.write().unwrap().insert(0, recipe);
    }

    pub fn apply_updated(&self, recipe: Recipe) {
        let mut recipes = self.recipes.write().unwrap();
        if let Some(slot) = recipes.iter_mut().find(|r| r.id == recipe.id) {
            *slot = recipe;
        }
    }

    pub fn apply_removed(&self, slug: &str) {
        self.recipes.write().unwrap().retain(|r| r.slug != slug);
    }

    /// Optimistically flip `user_id`'s membership in the recipe's favorites
    /// and adjust the count by one. Returns the new membership state, or
    /// `None` when the recipe is not in the held list.
    pub fn toggle_favorite_entry(&self, recipe_id: i64, user_id: i64) -> Option<bool> {
        let mut recipes = self.recipes.write().unwrap();
        let recipe = recipes.iter_mut().find(|r| r.id == recipe_id)?;
        let favorited = if let Some(pos) = recipe.favorites.iter().position(|&id| id == user_id) {
            recipe.favorites.remove(pos);
            recipe.favorite_count = recipe.favorite_count.saturating_sub(1);
            false
        } else {
            recipe.favorites.push(user_id);
            recipe.favorite_count += 1;
            true
        };
        Some(favorited)
    }

    /// Reconcile a recipe's favorited state to server truth. No-op when
    /// the held state already matches.
    pub fn set_favorite_entry(&self, recipe_id: i64, user_id: i64, favorited: bool) {
        let mut recipes = self.recipes.write().unwrap();
        let Some(recipe) = recipes.iter_mut().find(|r| r.id == recipe_id) else {
            return;
        };
        let present = recipe.favorites.contains(&user_id);
        if favorited && !present {
            recipe.favorites.push(user_id);
            recipe.favorite_count += 1;
        } else if !favorited && present {
            recipe.favorites.retain(|&id| id != user_id);
            recipe.favorite_count = recipe.favorite_count.saturating_sub(1);
        }
    }
}
