mod store;

pub use store::{CatalogStatus, CatalogStore};
