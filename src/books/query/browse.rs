//! Default queries used when there is nothing to search for

use chrono::{Datelike, Utc};
use rand::seq::SliceRandom;

use super::builder::{OrderBy, VolumeQuery};

/// Candidate browse queries for `year`
pub fn browse_queries(year: i32) -> Vec<String> {
    vec![
        format!("published_date:{}", year),
        "best sellers".to_string(),
        "popular books".to_string(),
        "new releases".to_string(),
        "trending books".to_string(),
    ]
}

/// Pick one browse query at random, ordered by relevance
pub fn random_browse_query() -> VolumeQuery {
    let candidates = browse_queries(Utc::now().year());
    let q = candidates
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| "best sellers".to_string());

    VolumeQuery::new(q).order_by(OrderBy::Relevance)
}
