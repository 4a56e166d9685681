//! Asynchronous CRUD client for a JSON-over-REST entity server.
//!
//! # Overview
//! Caller types implement [`Entity`] to gain create/load/list/store/delete
//! operations against a REST server that wraps payloads in a
//! `{"result": ...}` envelope and authenticates via `X-User` /
//! `X-Password` headers. Each operation runs its single HTTP call on a
//! dedicated background thread and reports back through handler callbacks
//! on the caller's thread.
//!
//! # Design
//! - [`RestClient`] is stateless and sans-IO: `build_*` produces an
//!   [`HttpRequest`], `parse_*` consumes an [`HttpResponse`], so every
//!   request shape and response interpretation is testable without a
//!   server.
//! - [`Session`] owns the HTTP agent with the caller's scope and drives
//!   the round-trip, one background thread per operation.
//! - [`Dispatcher`] is the explicit, caller-owned marshaling point:
//!   handlers only ever run on the thread draining it.
//! - Failures never cross the async boundary unwrapped: they arrive as a
//!   [`Progress`] notification, then the terminal callback receives
//!   `None`. One attempt per call, no retries.

pub mod binder;
pub mod client;
pub mod dispatch;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod http;
pub mod query;
pub mod session;

mod transport;

pub use binder::{ListBinder, ListView};
pub use client::{RestClient, PASSWORD_HEADER, USER_HEADER};
pub use dispatch::{DispatchHandle, Dispatcher};
pub use entity::Entity;
pub use envelope::{CollectionEnvelope, EntityEnvelope};
pub use error::ApiError;
pub use handler::{CollectionHandler, EntityHandler, LoggingHandler, Progress};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::Query;
pub use session::{Session, SessionConfig};
