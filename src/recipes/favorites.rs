use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::Backend;
use crate::auth::session::SessionManager;
use crate::catalog::CatalogStore;
use crate::error::ApiError;

/// Toggles a recipe's favorited-by-current-user state with an optimistic
/// local patch and rollback on failure.
///
/// Each toggle is keyed by a request id; only the latest request in flight
/// for a recipe reconciles or rolls back, so a double-click race settles
/// deterministically on server truth.
pub struct FavoriteCoordinator {
    backend: Arc<dyn Backend>,
    session: Arc<SessionManager>,
    catalog: Arc<CatalogStore>,
    in_flight: Mutex<HashMap<i64, Uuid>>,
}

impl FavoriteCoordinator {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: Arc<SessionManager>,
        catalog: Arc<CatalogStore>,
    ) -> Self {
        Self {
            backend,
            session,
            catalog,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Flip the favorite state of a recipe for the current user. Returns
    /// the favorited state after the toggle as reported by the server.
    ///
    /// Without a session this aborts with [`ApiError::AuthRequired`] before
    /// any request is issued.
    #[instrument(skip(self))]
    pub async fn toggle(&self, recipe_id: i64) -> Result<bool, ApiError> {
        let user = self.session.current_user().ok_or(ApiError::AuthRequired)?;
        let access = self.session.access_token().ok_or(ApiError::AuthRequired)?;

        let request_id = Uuid::new_v4();
        self.in_flight.lock().unwrap().insert(recipe_id, request_id);
        let optimistic = self.catalog.toggle_favorite_entry(recipe_id, user.id);

        let result = self.backend.toggle_favorite(&access, recipe_id).await;

        let mut in_flight = self.in_flight.lock().unwrap();
        let still_latest = in_flight.get(&recipe_id) == Some(&request_id);
        if still_latest {
            in_flight.remove(&recipe_id);
        }
        drop(in_flight);

        match result {
            Ok(favorited) => {
                if still_latest {
                    self.catalog.set_favorite_entry(recipe_id, user.id, favorited);
                }
                info!(recipe_id, favorited, "favorite toggled");
                Ok(favorited)
            }
            Err(e) => {
                if still_latest {
                    if let Some(applied) = optimistic {
                        self.catalog.set_favorite_entry(recipe_id, user.id, !applied);
                    }
                    warn!(recipe_id, error = %e, "favorite toggle failed, rolled back");
                }
                Err(e)
            }
        }
    }
}
