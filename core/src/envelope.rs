//! Deserialization targets for the server's `{"result": ...}` wrapper.
//!
//! The server never returns a bare payload; every response body nests the
//! actual entity or entity list under a `result` key. A missing or null
//! `result` is tolerated: entity loads yield no entity, collection loads
//! yield an empty list.

use serde::{Deserialize, Serialize};

/// Envelope around a single entity payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct EntityEnvelope<T> {
    pub result: Option<T>,
}

/// Envelope around an ordered sequence of entities.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionEnvelope<T> {
    pub result: Option<Vec<T>>,
}
