use serde::{Deserialize, Serialize};

use crate::db_types::UserId;

/// Criteria for listing products. An empty filter returns every product, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQueryFilter {
    pub seller_id: Option<UserId>,
    pub in_stock_only: bool,
    pub newest_first: bool,
}

impl ProductQueryFilter {
    pub fn with_seller_id(mut self, seller_id: UserId) -> Self {
        self.seller_id = Some(seller_id);
        self
    }

    pub fn in_stock_only(mut self) -> Self {
        self.in_stock_only = true;
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.seller_id.is_none() && !self.in_stock_only
    }
}
