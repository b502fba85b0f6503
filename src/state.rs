use std::sync::Arc;

use crate::cache::TaxonomyCache;
use crate::config::TransferConfig;
use crate::error::Result;
use crate::store::http::HttpStore;
use crate::store::ArticleStore;
use crate::transfer::TransferClient;
use crate::tree::TreeCopier;

pub struct AppState {
    pub client: TransferClient,
    pub copier: TreeCopier,
    pub cache: TaxonomyCache,
}

impl AppState {
    pub fn new(store: Arc<dyn ArticleStore>, config: &TransferConfig) -> Self {
        let client = TransferClient::new(store);
        Self {
            copier: TreeCopier::new(client.clone(), config.orphan_policy),
            client,
            cache: TaxonomyCache::new(),
        }
    }

    /// State backed by the HTTP store described by `config`.
    pub fn connect(config: &TransferConfig) -> Result<Self> {
        let store = Arc::new(HttpStore::new(config)?);
        Ok(Self::new(store, config))
    }
}
