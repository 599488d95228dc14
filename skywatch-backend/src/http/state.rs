use std::sync::Arc;

use crate::catalog::CatalogProvider;
use crate::service::TargetService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub targets: Arc<TargetService>,
    pub catalog: Arc<CatalogProvider>,
}

impl AppState {
    pub fn new(targets: Arc<TargetService>, catalog: Arc<CatalogProvider>) -> Self {
        Self { targets, catalog }
    }
}
