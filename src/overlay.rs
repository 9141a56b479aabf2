use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::auth::session::SessionManager;
use crate::models::Recipe;

/// Exclusive overlay surfaces. Exactly one value at any instant; at most
/// one of `Edit`/`View` carries a recipe payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Overlay {
    #[default]
    None,
    Authentication,
    Profile,
    Create,
    Edit(Recipe),
    View(Recipe),
}

/// Enforces single-overlay-at-a-time exclusivity and routes the
/// transitions triggered by user gestures and component completion
/// signals. Opening a new overlay implicitly closes whichever was open.
pub struct ModalOrchestrator {
    session: Arc<SessionManager>,
    current: Mutex<Overlay>,
}

impl ModalOrchestrator {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            current: Mutex::new(Overlay::None),
        }
    }

    pub fn current(&self) -> Overlay {
        self.current.lock().unwrap().clone()
    }

    fn replace(&self, next: Overlay) {
        let mut current = self.current.lock().unwrap();
        debug!(from = ?*current, to = ?next, "overlay transition");
        *current = next;
    }

    /// Login/registration surface. Only reachable when no session exists;
    /// returns whether the overlay was opened.
    pub fn open_authentication(&self) -> bool {
        if self.session.is_authenticated() {
            return false;
        }
        self.replace(Overlay::Authentication);
        true
    }

    pub fn open_profile(&self) {
        self.replace(Overlay::Profile);
    }

    pub fn open_create(&self) {
        self.replace(Overlay::Create);
    }

    /// Selecting a recipe card or "View Recipe" opens the view surface
    /// from any state.
    pub fn open_view(&self, recipe: Recipe) {
        self.replace(Overlay::View(recipe));
    }

    pub fn open_edit(&self, recipe: Recipe) {
        self.replace(Overlay::Edit(recipe));
    }

    /// Explicit cancel/close gesture, and the forced close on logout.
    pub fn close(&self) {
        self.replace(Overlay::None);
    }

    /// Close the overlay only if `predicate` matches what is open. Used by
    /// completion signals so a success for one surface never dismisses
    /// another the user has since opened.
    pub fn close_if(&self, predicate: impl FnOnce(&Overlay) -> bool) -> bool {
        let mut current = self.current.lock().unwrap();
        if predicate(&current) {
            debug!(from = ?*current, "overlay closed by completion signal");
            *current = Overlay::None;
            true
        } else {
            false
        }
    }
}
