use serde::{Deserialize, Serialize};

/// Normalized feed entry handed to the filter and renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub url: String,
    pub domain: String,
    /// Absolute link back to the discussion page.
    pub permalink: String,
}

// ── Listing envelope: { "data": { "children": [ { "data": {..} } ] } } ──

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    pub children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
pub struct ListingChild {
    pub data: Post,
}

/// Fields we read from each post; everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub url: String,
    pub domain: String,
    pub permalink: String,
}
