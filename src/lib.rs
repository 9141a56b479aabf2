//! Client-side state synchronization core for a social recipe-sharing
//! catalog.
//!
//! The crate keeps an in-memory view of catalog data, authentication state
//! and UI overlay state consistent with an external HTTP backend while
//! user-triggered mutations race against each other. The embedding UI
//! renders from the accessors and calls the operations; everything stateful
//! lives here.
//!
//! - [`auth::session::SessionManager`] — identity lifecycle and the
//!   credential pair.
//! - [`catalog::CatalogStore`] — filtered recipe list and categories.
//! - [`recipes::FavoriteCoordinator`] — optimistic favorite toggles.
//! - [`recipes::MutationGateway`] — create/update/armed-delete.
//! - [`overlay::ModalOrchestrator`] — exclusive overlay state machine.
//! - [`state::AppState`] — composition root wiring the completion signals.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod overlay;
pub mod recipes;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::api::{Backend, HttpBackend};
pub use crate::auth::dto::{CredentialPair, ProfileUpdate};
pub use crate::auth::session::SessionManager;
pub use crate::auth::storage::{CredentialStore, MemoryCredentialStore};
pub use crate::catalog::{CatalogStatus, CatalogStore};
pub use crate::config::ClientConfig;
pub use crate::error::ApiError;
pub use crate::models::{
    Category, CategoryFilter, Comment, Difficulty, FilterCriteria, Recipe, User,
};
pub use crate::overlay::{ModalOrchestrator, Overlay};
pub use crate::recipes::dto::{ImageAttachment, RecipeDraft};
pub use crate::recipes::{FavoriteCoordinator, MutationGateway};
pub use crate::state::AppState;

/// Install the tracing subscriber at application startup. `RUST_LOG`
/// controls filtering; `LOG_FORMAT=json` switches to JSON output.
pub fn init_logging() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "cookshare_client=debug,reqwest=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init();
    }
}
