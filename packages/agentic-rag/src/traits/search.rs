//! Search backend trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{result::RetrievalResult, search::SearchRequest};

/// A document index that can be queried with any [`SearchStrategy`].
///
/// Errors are allowed here; the cascade treats a failed strategy as one
/// that returned nothing.
///
/// [`SearchStrategy`]: crate::types::search::SearchStrategy
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run one strategy and return its results in backend order.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RetrievalResult>>;
}

#[async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Arc<T> {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RetrievalResult>> {
        (**self).search(request).await
    }
}
