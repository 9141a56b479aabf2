use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Difficulty grades used by the catalog and the create/edit form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Authenticated identity as served by the profile endpoint. A read-only
/// projection of the same shape is embedded in [`Comment::author`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub is_chef_verified: bool,
    pub recipes_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
}

/// Category as served by the category listing. When embedded in a
/// [`Recipe`] the backend only sends `id`, `name` and `slug`, so the
/// remaining fields are defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub recipes_count: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Comment tree node. Replies stay nested; the client never flattens them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub author: User,
    pub content: String,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// This comment plus every nested reply.
    pub fn thread_len(&self) -> usize {
        1 + self.replies.iter().map(Comment::thread_len).sum::<usize>()
    }
}

/// Recipe as served by the catalog listing.
///
/// `favorites` and `favorite_count` are populated independently by the
/// backend. An optimistic patch adjusts both locally, but the two are never
/// assumed equal; resynchronization is the only authority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub author: String,
    pub category: Category,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    #[serde(default)]
    pub tips: Option<String>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub difficulty: Difficulty,
    /// Ids of the users who favorited this recipe.
    #[serde(default)]
    pub favorites: Vec<i64>,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Recipe {
    pub fn is_favorited_by(&self, user_id: i64) -> bool {
        self.favorites.contains(&user_id)
    }

    pub fn total_time(&self) -> u32 {
        self.prep_time + self.cook_time
    }
}

/// Catalog filter. Replacing it is the sole trigger for a catalog re-fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub category: CategoryFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Id(i64),
}

impl FilterCriteria {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            category: CategoryFilter::All,
        }
    }

    pub fn category(id: i64) -> Self {
        Self {
            search_term: String::new(),
            category: CategoryFilter::Id(id),
        }
    }
}
