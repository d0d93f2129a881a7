//! Application State for the HTTP binary
//!
//! One [`CartStore`] per browser session, created on first access so the
//! durable mirror is read exactly once per session.

use crate::{
    cart::CartStore,
    catalog::InMemoryCatalog,
    config::AppConfig,
    error::StartupError,
    storage::{CartStorage, FileStorage, MemoryStorage},
};
use dashmap::DashMap;
use std::sync::Arc;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Storage backend shared by every session
pub type SharedStorage = Arc<dyn CartStorage>;

pub struct AppState {
    /// Carts keyed by session id.
    /// DashMap allows concurrent access without external Mutexes.
    pub carts: DashMap<String, CartStore<SharedStorage>>,

    pub storage: SharedStorage,
    pub catalog: InMemoryCatalog,
    pub config: AppConfig,
}

impl Default for AppState {
    fn default() -> Self {
        let config = AppConfig::default();
        let storage = Arc::new(MemoryStorage::with_quota(config.storage_quota));
        Self::with_parts(config, storage, InMemoryCatalog::default())
    }
}

impl AppState {
    /// Builds the state described by `config`, opening storage and catalog.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let storage: SharedStorage = match &config.cart_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "using file-backed cart storage");
                Arc::new(FileStorage::open(dir)?)
            }
            None => {
                tracing::info!(quota = config.storage_quota, "using in-memory cart storage");
                Arc::new(MemoryStorage::with_quota(config.storage_quota))
            }
        };

        let catalog = match &config.catalog_path {
            Some(path) => InMemoryCatalog::from_json_file(path)?,
            None => InMemoryCatalog::default(),
        };
        tracing::info!(products = catalog.len(), "catalog loaded");

        Ok(Self::with_parts(config, storage, catalog))
    }

    pub fn with_parts(config: AppConfig, storage: SharedStorage, catalog: InMemoryCatalog) -> Self {
        Self {
            carts: DashMap::new(),
            storage,
            catalog,
            config,
        }
    }

    /// Runs `f` with exclusive access to the session's cart, opening and
    /// registering it on first use.
    pub fn with_cart<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut CartStore<SharedStorage>) -> R,
    ) -> R {
        if let Some(mut cart) = self.carts.get_mut(session_id) {
            return f(&mut cart);
        }
        // The mirror is read before the shard lock is taken.
        let opened = self.open_cart(session_id);
        let mut cart = self.carts.entry(session_id.to_string()).or_insert(opened);
        f(&mut cart)
    }

    /// Runs `f` against the session's cart without registering it.
    ///
    /// Unknown sessions get a transient view of their mirror, so read-only
    /// requests never grow `carts`.
    pub fn view_cart<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&CartStore<SharedStorage>) -> R,
    ) -> R {
        if let Some(cart) = self.carts.get(session_id) {
            return f(&cart);
        }
        f(&self.open_cart(session_id))
    }

    fn open_cart(&self, session_id: &str) -> CartStore<SharedStorage> {
        CartStore::open_with_key(self.storage.clone(), storage_key_for(session_id))
    }
}

/// Durable key of a session's cart mirror.
pub fn storage_key_for(session_id: &str) -> String {
    format!("{}-{session_id}", crate::cart::CART_STORAGE_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Product;

    fn product() -> Product {
        Product {
            id: "a".into(),
            name: "A".into(),
            brand: "Buffalo".into(),
            price: 1.0,
            image_url: String::new(),
        }
    }

    #[test]
    fn viewing_an_unknown_session_registers_nothing() {
        let state = AppState::default();
        let count = state.view_cart("fresh", |cart| cart.lines().len());
        assert_eq!(count, 0);
        assert!(state.carts.is_empty());
    }

    #[test]
    fn mutation_registers_and_view_reads_registered_cart() {
        let state = AppState::default();
        state.with_cart("s1", |cart| cart.add(&product(), 3)).unwrap();
        assert_eq!(state.carts.len(), 1);

        let quantity = state.view_cart("s1", |cart| cart.line("a").map(|l| l.quantity));
        assert_eq!(quantity, Some(1));
        assert_eq!(state.carts.len(), 1);
    }

    #[test]
    fn unregistered_view_reads_stored_mirror() {
        let storage = Arc::new(MemoryStorage::new());
        let first = AppState::with_parts(
            AppConfig::default(),
            storage.clone(),
            InMemoryCatalog::default(),
        );
        first.with_cart("s1", |cart| cart.add(&product(), 3)).unwrap();

        let second =
            AppState::with_parts(AppConfig::default(), storage, InMemoryCatalog::default());
        let count = second.view_cart("s1", |cart| cart.lines().len());
        assert_eq!(count, 1);
        assert!(second.carts.is_empty());
    }
}
