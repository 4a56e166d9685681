//! The contract a caller's domain type must satisfy to be synced over REST.
//!
//! # Design
//! The server addresses each entity collection by a fixed path segment.
//! `ENTITY_NAME` makes that segment an explicit part of the impl instead of
//! deriving it from the type's name at runtime, so renaming a Rust type
//! never silently changes the wire paths.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A domain record with an optional server-assigned identifier, persisted
/// over REST.
///
/// The identifier is `None` until the entity has been created on the
/// server; a successful create assigns it (from the response's `Location`
/// header) and a successful delete clears it again. All serde-visible
/// fields are the entity's serializable state; fields the server must not
/// see belong behind `#[serde(skip)]`.
pub trait Entity: Serialize + DeserializeOwned + Send + 'static {
    /// Path segment naming this entity's collection on the server,
    /// e.g. `"Example"` for `<base>/Example/<id>`.
    const ENTITY_NAME: &'static str;

    /// The server-assigned identifier, if the entity has been persisted.
    fn id(&self) -> Option<&str>;

    /// Replace the identifier. Pass `None` to mark the entity as no longer
    /// persistent.
    fn set_id(&mut self, id: Option<String>);

    /// Whether the server knows about this entity.
    fn is_persistent(&self) -> bool {
        self.id().is_some()
    }

    /// Hook invoked after the entity has been decoded from a response.
    /// Override to derive local state from freshly loaded fields.
    fn on_loaded(&mut self) {}
}
