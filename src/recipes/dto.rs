use bytes::Bytes;

use crate::error::ApiError;
use crate::models::Difficulty;

/// Optional binary attachment for the recipe's featured image. The bytes
/// travel as a multipart part alongside the text fields.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Fields of a create/update submission. Everything except `tips` and
/// `featured_image` is required.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    /// Category id picked from the category listing.
    pub category: i64,
    pub ingredients: String,
    pub instructions: String,
    pub tips: Option<String>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub difficulty: Difficulty,
    pub is_published: bool,
    pub featured_image: Option<ImageAttachment>,
}

impl RecipeDraft {
    /// Local precondition check, run before any request is issued.
    pub fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("ingredients", &self.ingredients),
            ("instructions", &self.instructions),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::validation(format!("{field} must not be empty")));
            }
        }
        if self.category <= 0 {
            return Err(ApiError::validation("a category must be selected"));
        }
        Ok(())
    }
}
