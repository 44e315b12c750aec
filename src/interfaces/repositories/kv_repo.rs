use std::sync::Arc;

use crate::{settings::TokenTtls, store::KeyValueStore};

#[derive(Clone)]
pub struct KvTokenRepo {
    pub store: Arc<dyn KeyValueStore>,
    pub ttls: TokenTtls,
}
