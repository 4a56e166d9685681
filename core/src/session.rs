//! Asynchronous entry points: one background thread per operation.
//!
//! # Design
//! `Session` owns the HTTP agent and a handle to the caller's dispatcher.
//! Every operation spawns one dedicated background thread that performs
//! build → execute → parse, then posts a single callback through the
//! dispatcher: the terminal result on success, or a failure progress
//! notification followed by a `None` terminal on any error. Nothing is
//! retried; each call is a single best-effort attempt.
//!
//! The session is the caller-owned replacement for a process-wide HTTP
//! client: its agent lives exactly as long as the session, and dropping
//! the session tears the connection pool down with it.

use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::client::RestClient;
use crate::dispatch::DispatchHandle;
use crate::entity::Entity;
use crate::error::ApiError;
use crate::handler::{CollectionHandler, EntityHandler, Progress};
use crate::query::Query;
use crate::transport;

/// Connection parameters for a `Session`.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    base_url: String,
    username: String,
    password: String,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: String::new(),
            password: String::new(),
        }
    }

    /// Credentials sent in the `X-User` / `X-Password` headers of every
    /// request.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }
}

/// A caller-owned connection to one REST server.
pub struct Session {
    client: RestClient,
    agent: ureq::Agent,
    dispatch: DispatchHandle,
}

impl Session {
    pub fn new(config: SessionConfig, dispatch: DispatchHandle) -> Self {
        Self {
            client: RestClient::new(&config.base_url, &config.username, &config.password),
            agent: transport::agent(),
            dispatch,
        }
    }

    /// The sans-IO client this session builds its requests with.
    pub fn client(&self) -> &RestClient {
        &self.client
    }

    /// Create the entity on the server via POST to its canonical
    /// collection path. On success the terminal result is the entity with
    /// its identifier assigned from the response's `Location` header (a
    /// pre-set identifier is preserved).
    pub fn create<T, H>(&self, mut entity: T, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
    {
        self.spawn_entity_op("create", handler, move |client, agent| {
            let request = client.build_create(&entity)?;
            let response = transport::execute(agent, &request)?;
            client.parse_create(&mut entity, response)?;
            Ok(Some(entity))
        })
    }

    /// Create the entity via POST to a caller-supplied collection path.
    pub fn create_at<T, H>(&self, path: &str, mut entity: T, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
    {
        let path = path.to_string();
        self.spawn_entity_op("create_at", handler, move |client, agent| {
            let request = client.build_create_at(&path, &entity)?;
            let response = transport::execute(agent, &request)?;
            client.parse_create(&mut entity, response)?;
            Ok(Some(entity))
        })
    }

    /// Load one entity by identifier from its canonical instance path.
    pub fn load<T, H>(&self, id: &str, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
    {
        let id = id.to_string();
        self.spawn_entity_op("load", handler, move |client, agent| {
            let request = client.build_load::<T>(&id);
            let response = transport::execute(agent, &request)?;
            client.parse_entity(response)
        })
    }

    /// Load one entity from an arbitrary path.
    pub fn load_path<T, H>(&self, path: &str, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
    {
        let path = path.to_string();
        self.spawn_entity_op("load_path", handler, move |client, agent| {
            let request = client.build_load_path(&path);
            let response = transport::execute(agent, &request)?;
            client.parse_entity(response)
        })
    }

    /// Load the first entity whose property matches the given value.
    pub fn load_where<T, H>(&self, key: &str, value: &str, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
    {
        let key = key.to_string();
        let value = value.to_string();
        self.spawn_entity_op("load_where", handler, move |client, agent| {
            let request = client.build_load_where::<T>(&key, &value);
            let response = transport::execute(agent, &request)?;
            let mut entities = client.parse_collection::<T>(response)?;
            if entities.is_empty() {
                Ok(None)
            } else {
                Ok(Some(entities.remove(0)))
            }
        })
    }

    /// Fetch the entity's canonical collection, optionally filtered and
    /// sorted.
    pub fn list<T, H>(&self, query: Option<Query>, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: CollectionHandler<T>,
    {
        self.spawn_collection_op("list", handler, move |client, agent| {
            let request = client.build_list::<T>(query.as_ref());
            let response = transport::execute(agent, &request)?;
            client.parse_collection(response)
        })
    }

    /// Fetch a collection from an arbitrary path.
    pub fn list_path<T, H>(&self, path: &str, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: CollectionHandler<T>,
    {
        let path = path.to_string();
        self.spawn_collection_op("list_path", handler, move |client, agent| {
            let request = client.build_list_path(&path);
            let response = transport::execute(agent, &request)?;
            client.parse_collection(response)
        })
    }

    /// Fetch the sub-collection of `C` entities under one `P` instance.
    pub fn children<P, C, H>(&self, parent_id: &str, query: Option<Query>, handler: H) -> JoinHandle<()>
    where
        P: Entity,
        C: Entity,
        H: CollectionHandler<C>,
    {
        let parent_id = parent_id.to_string();
        self.spawn_collection_op("children", handler, move |client, agent| {
            let request = client.build_children::<P, C>(&parent_id, query.as_ref());
            let response = transport::execute(agent, &request)?;
            client.parse_collection(response)
        })
    }

    /// Fetch a single `C` child under one `P` instance; a result proves
    /// the relationship between the two entities exists.
    pub fn child<P, C, H>(&self, parent_id: &str, child_id: &str, handler: H) -> JoinHandle<()>
    where
        P: Entity,
        C: Entity,
        H: EntityHandler<C>,
    {
        let parent_id = parent_id.to_string();
        let child_id = child_id.to_string();
        self.spawn_entity_op("child", handler, move |client, agent| {
            let request = client.build_child::<P, C>(&parent_id, &child_id);
            let response = transport::execute(agent, &request)?;
            client.parse_entity(response)
        })
    }

    /// Store the entity's serializable fields via PUT to its canonical
    /// instance path. Only the response status is checked; the terminal
    /// result is the entity unchanged.
    pub fn store<T, H>(&self, entity: T, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
    {
        self.spawn_entity_op("store", handler, move |client, agent| {
            let request = client.build_store(&entity)?;
            let response = transport::execute(agent, &request)?;
            client.parse_status(response)?;
            Ok(Some(entity))
        })
    }

    /// Delete the entity from the server. On success the terminal result
    /// is the entity with its identifier cleared.
    pub fn delete<T, H>(&self, mut entity: T, handler: H) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
    {
        self.spawn_entity_op("delete", handler, move |client, agent| {
            let id = entity.id().ok_or(ApiError::MissingId)?.to_string();
            let request = client.build_delete::<T>(&id);
            let response = transport::execute(agent, &request)?;
            client.parse_status(response)?;
            entity.set_id(None);
            Ok(Some(entity))
        })
    }

    fn spawn_entity_op<T, H, F>(&self, op: &'static str, handler: H, work: F) -> JoinHandle<()>
    where
        T: Entity,
        H: EntityHandler<T>,
        F: FnOnce(&RestClient, &ureq::Agent) -> Result<Option<T>, ApiError> + Send + 'static,
    {
        let client = self.client.clone();
        let agent = self.agent.clone();
        let dispatch = self.dispatch.clone();

        thread::spawn(move || {
            debug!(op, "starting background operation");
            let mut handler = handler;
            match work(&client, &agent) {
                Ok(result) => {
                    dispatch.post(Box::new(move || handler.handle_result(result)));
                }
                Err(err) => {
                    warn!(op, error = %err, "background operation failed");
                    dispatch.post(Box::new(move || {
                        handler.handle_progress(&[Progress::Failed(err)]);
                        handler.handle_result(None);
                    }));
                }
            }
        })
    }

    fn spawn_collection_op<T, H, F>(&self, op: &'static str, handler: H, work: F) -> JoinHandle<()>
    where
        T: Entity,
        H: CollectionHandler<T>,
        F: FnOnce(&RestClient, &ureq::Agent) -> Result<Vec<T>, ApiError> + Send + 'static,
    {
        let client = self.client.clone();
        let agent = self.agent.clone();
        let dispatch = self.dispatch.clone();

        thread::spawn(move || {
            debug!(op, "starting background operation");
            let mut handler = handler;
            match work(&client, &agent) {
                Ok(results) => {
                    dispatch.post(Box::new(move || handler.handle_results(Some(results))));
                }
                Err(err) => {
                    warn!(op, error = %err, "background operation failed");
                    dispatch.post(Box::new(move || {
                        handler.handle_progress(&[Progress::Failed(err)]);
                        handler.handle_results(None);
                    }));
                }
            }
        })
    }
}
