use crate::{
    db::{RatingAggregator, Store},
    identity::IdentityResolver,
};

/// Only built from a store that already answered a ping, so handlers never
/// check for a missing connection.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub ratings: RatingAggregator,
    pub identity: IdentityResolver,
}

impl AppState {
    pub fn new(store: Store, identity: IdentityResolver) -> Self {
        Self {
            ratings: RatingAggregator::new(store.clone()),
            store,
            identity,
        }
    }
}
