//! In-memory backend and fixtures for the crate's tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use time::macros::datetime;

use crate::api::Backend;
use crate::auth::dto::{CredentialPair, LoginRequest, ProfileUpdate, RegisterRequest};
use crate::error::ApiError;
use crate::models::{Category, CategoryFilter, FilterCriteria, Recipe, User};
use crate::recipes::dto::RecipeDraft;

pub(crate) fn sample_user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        bio: None,
        location: None,
        profile_picture: None,
        is_chef_verified: false,
        recipes_count: 0,
        date_joined: datetime!(2026-01-01 00:00 UTC),
    }
}

pub(crate) fn sample_category(id: i64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        slug: name.to_lowercase(),
        description: None,
        image: None,
        recipes_count: 0,
        created_at: Some(datetime!(2026-01-01 00:00 UTC)),
    }
}

pub(crate) fn sample_recipe(id: i64, slug: &str, title: &str, category_id: i64) -> Recipe {
    Recipe {
        id,
        slug: slug.to_string(),
        title: title.to_string(),
        author: "ana".to_string(),
        category: sample_category(category_id, &format!("Category {category_id}")),
        description: format!("{title} description"),
        ingredients: "ingredients".to_string(),
        instructions: "instructions".to_string(),
        tips: None,
        prep_time: 10,
        cook_time: 20,
        difficulty: crate::models::Difficulty::Easy,
        favorites: Vec::new(),
        favorite_count: 0,
        average_rating: 4.2,
        comments: Vec::new(),
        featured_image: None,
        is_published: true,
        created_at: datetime!(2026-01-15 08:30 UTC),
    }
}

struct Account {
    email: String,
    password: String,
    user: User,
}

/// Scriptable in-memory [`Backend`]. Records every call so tests can
/// assert which requests were (or were not) issued, and serves catalog
/// data with the same filtering the real backend applies.
pub(crate) struct FakeBackend {
    recipes: Mutex<Vec<Recipe>>,
    categories: Mutex<Vec<Category>>,
    account: Mutex<Option<Account>>,
    calls: Mutex<Vec<String>>,
    fail_status: Mutex<Option<u16>>,
    list_delays: Mutex<VecDeque<u64>>,
    next_id: AtomicI64,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            recipes: Mutex::new(Vec::new()),
            categories: Mutex::new(Vec::new()),
            account: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            fail_status: Mutex::new(None),
            list_delays: Mutex::new(VecDeque::new()),
            next_id: AtomicI64::new(100),
        }
    }

    /// Register an account the fake will authenticate with the fixed
    /// credential pair `{access: "A", refresh: "R"}`.
    pub fn with_account(&self, email: &str, password: &str, user_id: i64, username: &str) {
        *self.account.lock().unwrap() = Some(Account {
            email: email.to_string(),
            password: password.to_string(),
            user: sample_user(user_id, username),
        });
    }

    pub fn push_recipe(&self, recipe: Recipe) {
        self.recipes.lock().unwrap().push(recipe);
    }

    pub fn push_category(&self, category: Category) {
        self.categories.lock().unwrap().push(category);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Make every subsequent call fail with `Rejected { status }`.
    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    /// Queue per-call delays (milliseconds) for `list_recipes`, consumed
    /// in order. Used to stage overlapping-fetch races.
    pub fn queue_list_delays(&self, delays_ms: &[u64]) {
        self.list_delays.lock().unwrap().extend(delays_ms);
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn failure(&self) -> Result<(), ApiError> {
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(ApiError::Rejected { status }),
            None => Ok(()),
        }
    }

    fn authorize(&self, access: &str) -> Result<User, ApiError> {
        let account = self.account.lock().unwrap();
        match account.as_ref() {
            Some(account) if access == "A" => Ok(account.user.clone()),
            _ => Err(ApiError::Rejected { status: 401 }),
        }
    }

    fn apply_draft(recipe: &mut Recipe, draft: &RecipeDraft, categories: &[Category]) {
        recipe.title = draft.title.clone();
        recipe.description = draft.description.clone();
        recipe.ingredients = draft.ingredients.clone();
        recipe.instructions = draft.instructions.clone();
        recipe.tips = draft.tips.clone();
        recipe.prep_time = draft.prep_time;
        recipe.cook_time = draft.cook_time;
        recipe.difficulty = draft.difficulty;
        recipe.is_published = draft.is_published;
        recipe.category = categories
            .iter()
            .find(|c| c.id == draft.category)
            .cloned()
            .unwrap_or_else(|| sample_category(draft.category, &format!("Category {}", draft.category)));
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_recipes(&self, filter: &FilterCriteria) -> Result<Vec<Recipe>, ApiError> {
        self.record("GET /recipes/");
        let list_delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = list_delay {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.failure()?;
        let needle = filter.search_term.to_lowercase();
        let recipes = self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                let matches_search = needle.is_empty()
                    || r.title.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle);
                let matches_category = match filter.category {
                    CategoryFilter::All => true,
                    CategoryFilter::Id(id) => r.category.id == id,
                };
                matches_search && matches_category
            })
            .cloned()
            .collect();
        Ok(recipes)
    }

    async fn my_recipes(&self, access: &str) -> Result<Vec<Recipe>, ApiError> {
        self.record("GET /recipes/my-recipes/");
        self.failure()?;
        let user = self.authorize(access)?;
        let recipes = self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.author == user.username)
            .cloned()
            .collect();
        Ok(recipes)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.record("GET /categories/");
        self.failure()?;
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn login(&self, req: &LoginRequest) -> Result<CredentialPair, ApiError> {
        self.record("POST /auth/login/");
        self.failure()?;
        let account = self.account.lock().unwrap();
        match account.as_ref() {
            Some(a) if a.email == req.email && a.password == req.password => Ok(CredentialPair {
                access: "A".to_string(),
                refresh: "R".to_string(),
            }),
            _ => Err(ApiError::Rejected { status: 401 }),
        }
    }

    async fn register(&self, _req: &RegisterRequest) -> Result<(), ApiError> {
        self.record("POST /auth/register/");
        self.failure()?;
        Ok(())
    }

    async fn fetch_profile(&self, access: &str) -> Result<User, ApiError> {
        self.record("GET /auth/profile/");
        self.failure()?;
        self.authorize(access)
    }

    async fn update_profile(
        &self,
        access: &str,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.record("POST /auth/profile/");
        self.failure()?;
        self.authorize(access)?;
        let mut account = self.account.lock().unwrap();
        let account = account.as_mut().expect("authorized account");
        if let Some(bio) = &update.bio {
            account.user.bio = Some(bio.clone());
        }
        if let Some(location) = &update.location {
            account.user.location = Some(location.clone());
        }
        if let Some(picture) = &update.profile_picture {
            account.user.profile_picture = Some(picture.clone());
        }
        Ok(account.user.clone())
    }

    async fn create_recipe(&self, access: &str, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        self.record("POST /recipes/create/");
        self.failure()?;
        let user = self.authorize(access)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let slug = draft.title.to_lowercase().replace(' ', "-");
        let mut recipe = sample_recipe(id, &slug, &draft.title, draft.category);
        recipe.author = user.username;
        Self::apply_draft(&mut recipe, draft, &self.categories.lock().unwrap());
        self.recipes.lock().unwrap().insert(0, recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        access: &str,
        slug: &str,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ApiError> {
        self.record(format!("PUT /recipes/{slug}/update/"));
        self.failure()?;
        self.authorize(access)?;
        let categories = self.categories.lock().unwrap().clone();
        let mut recipes = self.recipes.lock().unwrap();
        let recipe = recipes
            .iter_mut()
            .find(|r| r.slug == slug)
            .ok_or(ApiError::Rejected { status: 404 })?;
        Self::apply_draft(recipe, draft, &categories);
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, access: &str, slug: &str) -> Result<(), ApiError> {
        self.record(format!("DELETE /recipes/{slug}/delete/"));
        self.failure()?;
        self.authorize(access)?;
        let mut recipes = self.recipes.lock().unwrap();
        let before = recipes.len();
        recipes.retain(|r| r.slug != slug);
        if recipes.len() == before {
            return Err(ApiError::Rejected { status: 404 });
        }
        Ok(())
    }

    async fn toggle_favorite(&self, access: &str, recipe_id: i64) -> Result<bool, ApiError> {
        self.record(format!("POST /recipes/{recipe_id}/favorite/"));
        self.failure()?;
        let user = self.authorize(access)?;
        let mut recipes = self.recipes.lock().unwrap();
        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .ok_or(ApiError::Rejected { status: 404 })?;
        let favorited = if let Some(pos) = recipe.favorites.iter().position(|&id| id == user.id) {
            recipe.favorites.remove(pos);
            recipe.favorite_count -= 1;
            false
        } else {
            recipe.favorites.push(user.id);
            recipe.favorite_count += 1;
            true
        };
        Ok(favorited)
    }
}
