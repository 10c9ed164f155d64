pub mod reddit;
pub mod types;

use crate::error::Result;
use async_trait::async_trait;
use types::Item;

#[async_trait]
pub trait ItemFeed: Send + Sync {
    /// One page of items for `source`, in feed order.
    async fn fetch_items(&mut self, source: &str) -> Result<Vec<Item>>;
}
