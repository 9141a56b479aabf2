use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::auth::dto::{CredentialPair, LoginRequest, ProfileUpdate, RegisterRequest};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{Category, CategoryFilter, FilterCriteria, Recipe, User};
use crate::recipes::dto::RecipeDraft;

/// Everything the synchronization core asks of the backend. One method per
/// consumed endpoint; tests substitute an in-memory implementation.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_recipes(&self, filter: &FilterCriteria) -> Result<Vec<Recipe>, ApiError>;
    async fn my_recipes(&self, access: &str) -> Result<Vec<Recipe>, ApiError>;
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn login(&self, req: &LoginRequest) -> Result<CredentialPair, ApiError>;
    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError>;
    async fn fetch_profile(&self, access: &str) -> Result<User, ApiError>;
    async fn update_profile(&self, access: &str, update: &ProfileUpdate)
        -> Result<User, ApiError>;
    async fn create_recipe(&self, access: &str, draft: &RecipeDraft) -> Result<Recipe, ApiError>;
    async fn update_recipe(
        &self,
        access: &str,
        slug: &str,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ApiError>;
    async fn delete_recipe(&self, access: &str, slug: &str) -> Result<(), ApiError>;
    /// Returns the recipe's favorited state for the calling user after the
    /// toggle, as reported by the server.
    async fn toggle_favorite(&self, access: &str, recipe_id: i64) -> Result<bool, ApiError>;
}

#[derive(Debug, Deserialize)]
struct FavoriteResponse {
    favorited: bool,
}

/// HTTP implementation of [`Backend`].
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Arc<str>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: Arc::from(config.backend_url.as_str()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(access: &str) -> String {
        format!("Bearer {access}")
    }
}

/// Pass a successful response through, convert anything else to
/// [`ApiError::Rejected`] after logging the body.
async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(%status, body = %body, "request rejected");
    Err(ApiError::Rejected {
        status: status.as_u16(),
    })
}

fn draft_form(draft: &RecipeDraft) -> Result<multipart::Form, ApiError> {
    let mut form = multipart::Form::new()
        .text("title", draft.title.clone())
        .text("description", draft.description.clone())
        .text("category", draft.category.to_string())
        .text("prep_time", draft.prep_time.to_string())
        .text("cook_time", draft.cook_time.to_string())
        .text("difficulty", draft.difficulty.as_str())
        .text("ingredients", draft.ingredients.clone())
        .text("instructions", draft.instructions.clone())
        .text("is_published", draft.is_published.to_string());
    if let Some(tips) = &draft.tips {
        form = form.text("tips", tips.clone());
    }
    if let Some(image) = &draft.featured_image {
        let part = multipart::Part::stream(image.body.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        form = form.part("featured_image", part);
    }
    Ok(form)
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self))]
    async fn list_recipes(&self, filter: &FilterCriteria) -> Result<Vec<Recipe>, ApiError> {
        let mut query: Vec<(&str, String)> = vec![("search", filter.search_term.clone())];
        if let CategoryFilter::Id(id) = filter.category {
            query.push(("category", id.to_string()));
        }
        let response = self
            .client
            .get(self.url("/recipes/"))
            .query(&query)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self, access))]
    async fn my_recipes(&self, access: &str) -> Result<Vec<Recipe>, ApiError> {
        let response = self
            .client
            .get(self.url("/recipes/my-recipes/"))
            .header(reqwest::header::AUTHORIZATION, Self::bearer(access))
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self.client.get(self.url("/categories/")).send().await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self, req))]
    async fn login(&self, req: &LoginRequest) -> Result<CredentialPair, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/login/"))
            .json(req)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self, req))]
    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/auth/register/"))
            .json(req)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self, access))]
    async fn fetch_profile(&self, access: &str) -> Result<User, ApiError> {
        let response = self
            .client
            .get(self.url("/auth/profile/"))
            .header(reqwest::header::AUTHORIZATION, Self::bearer(access))
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self, access, update))]
    async fn update_profile(
        &self,
        access: &str,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/profile/"))
            .header(reqwest::header::AUTHORIZATION, Self::bearer(access))
            .json(update)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self, access, draft))]
    async fn create_recipe(&self, access: &str, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
        let response = self
            .client
            .post(self.url("/recipes/create/"))
            .header(reqwest::header::AUTHORIZATION, Self::bearer(access))
            .multipart(draft_form(draft)?)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self, access, draft))]
    async fn update_recipe(
        &self,
        access: &str,
        slug: &str,
        draft: &RecipeDraft,
    ) -> Result<Recipe, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/recipes/{slug}/update/")))
            .header(reqwest::header::AUTHORIZATION, Self::bearer(access))
            .multipart(draft_form(draft)?)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    #[instrument(skip(self, access))]
    async fn delete_recipe(&self, access: &str, slug: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/recipes/{slug}/delete/")))
            .header(reqwest::header::AUTHORIZATION, Self::bearer(access))
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    #[instrument(skip(self, access))]
    async fn toggle_favorite(&self, access: &str, recipe_id: i64) -> Result<bool, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/recipes/{recipe_id}/favorite/")))
            .header(reqwest::header::AUTHORIZATION, Self::bearer(access))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let payload: FavoriteResponse = expect_success(response).await?.json().await?;
        Ok(payload.favorited)
    }
}
