//! Stateless request builder and response parser for the REST dialect.
//!
//! # Design
//! `RestClient` holds only the base URL and the credential pair; it carries
//! no mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`, keeping the core deterministic and free of
//! I/O dependencies. The `Session` drives the round-trip between the two;
//! tests can do the same with hand-made responses.
//!
//! Paths are deterministic string concatenation: base URL plus the
//! entity's `ENTITY_NAME` segment (or a caller-supplied path) plus an
//! optional query string. No escaping is performed beyond literal
//! concatenation.

use crate::entity::Entity;
use crate::envelope::{CollectionEnvelope, EntityEnvelope};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::Query;

/// Header carrying the user name on every request.
pub const USER_HEADER: &str = "X-User";
/// Header carrying the password on every request.
pub const PASSWORD_HEADER: &str = "X-Password";

/// Stateless, sans-IO client for a REST entity server.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    username: String,
    password: String,
}

impl RestClient {
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Canonical collection path for an entity type.
    pub fn entity_path<T: Entity>(&self) -> String {
        format!("{}/{}", self.base_url, T::ENTITY_NAME)
    }

    /// Canonical instance path for a persisted entity.
    pub fn instance_path<T: Entity>(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, T::ENTITY_NAME, id)
    }

    /// Join a caller-supplied path onto the base URL.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![
            (USER_HEADER.to_string(), self.username.clone()),
            (PASSWORD_HEADER.to_string(), self.password.clone()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }

    fn json_body<T: Entity>(entity: &T) -> Result<String, ApiError> {
        serde_json::to_string(entity).map_err(|e| ApiError::Serialization(e.to_string()))
    }

    // ----- build -----

    /// POST the entity to its canonical collection path.
    pub fn build_create<T: Entity>(&self, entity: &T) -> Result<HttpRequest, ApiError> {
        let body = Self::json_body(entity)?;
        Ok(self.request(HttpMethod::Post, self.entity_path::<T>(), Some(body)))
    }

    /// POST the entity to a caller-supplied collection path.
    pub fn build_create_at<T: Entity>(&self, path: &str, entity: &T) -> Result<HttpRequest, ApiError> {
        let body = Self::json_body(entity)?;
        Ok(self.request(HttpMethod::Post, self.resolve(path), Some(body)))
    }

    /// GET a single entity by its identifier.
    pub fn build_load<T: Entity>(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.instance_path::<T>(id), None)
    }

    /// GET a single entity from an arbitrary path.
    pub fn build_load_path(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.resolve(path), None)
    }

    /// GET the first entity whose property matches the given value.
    pub fn build_load_where<T: Entity>(&self, key: &str, value: &str) -> HttpRequest {
        let path = format!("{}{}", self.entity_path::<T>(), Query::new().filter(key, value).to_query_string());
        self.request(HttpMethod::Get, path, None)
    }

    /// GET the entity's canonical collection, optionally filtered and sorted.
    pub fn build_list<T: Entity>(&self, query: Option<&Query>) -> HttpRequest {
        let suffix = query.map(Query::to_query_string).unwrap_or_default();
        self.request(HttpMethod::Get, format!("{}{}", self.entity_path::<T>(), suffix), None)
    }

    /// GET a collection from an arbitrary path.
    pub fn build_list_path(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, self.resolve(path), None)
    }

    /// GET the sub-collection of `C` entities under one `P` instance.
    pub fn build_children<P: Entity, C: Entity>(
        &self,
        parent_id: &str,
        query: Option<&Query>,
    ) -> HttpRequest {
        let suffix = query.map(Query::to_query_string).unwrap_or_default();
        let path = format!(
            "{}/{}/{}/{}{}",
            self.base_url,
            P::ENTITY_NAME,
            parent_id,
            C::ENTITY_NAME,
            suffix
        );
        self.request(HttpMethod::Get, path, None)
    }

    /// GET a single `C` child under one `P` instance. A 200 response proves
    /// the relationship between the two exists.
    pub fn build_child<P: Entity, C: Entity>(&self, parent_id: &str, child_id: &str) -> HttpRequest {
        let path = format!(
            "{}/{}/{}/{}/{}",
            self.base_url,
            P::ENTITY_NAME,
            parent_id,
            C::ENTITY_NAME,
            child_id
        );
        self.request(HttpMethod::Get, path, None)
    }

    /// PUT the entity's serializable fields to its canonical instance path.
    pub fn build_store<T: Entity>(&self, entity: &T) -> Result<HttpRequest, ApiError> {
        let id = entity.id().ok_or(ApiError::MissingId)?;
        let path = self.instance_path::<T>(id);
        let body = Self::json_body(entity)?;
        Ok(self.request(HttpMethod::Put, path, Some(body)))
    }

    /// DELETE the canonical instance path.
    pub fn build_delete<T: Entity>(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, self.instance_path::<T>(id), None)
    }

    // ----- parse -----

    /// Complete a create: on 201, assign the identifier from the final
    /// path segment of the `Location` header, unless the caller pre-set
    /// one (a pre-set identifier is preserved verbatim).
    pub fn parse_create<T: Entity>(
        &self,
        entity: &mut T,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        if response.status != 201 {
            return Err(http_failure(response));
        }

        let location = response.header("Location").ok_or_else(|| {
            ApiError::Deserialization("201 response without a Location header".to_string())
        })?;

        if entity.id().is_none() {
            entity.set_id(Some(id_from_location(location).to_string()));
        }

        Ok(())
    }

    /// Decode a single-entity envelope and run the post-load hook. An empty
    /// envelope yields `None` without raising.
    pub fn parse_entity<T: Entity>(&self, response: HttpResponse) -> Result<Option<T>, ApiError> {
        if response.status != 200 {
            return Err(http_failure(response));
        }

        let envelope: EntityEnvelope<T> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        Ok(envelope.result.map(|mut entity| {
            entity.on_loaded();
            entity
        }))
    }

    /// Decode a collection envelope and run the post-load hook on every
    /// element. An empty envelope yields an empty list.
    pub fn parse_collection<T: Entity>(&self, response: HttpResponse) -> Result<Vec<T>, ApiError> {
        if response.status != 200 {
            return Err(http_failure(response));
        }

        let envelope: CollectionEnvelope<T> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        let mut entities = envelope.result.unwrap_or_default();
        for entity in &mut entities {
            entity.on_loaded();
        }
        Ok(entities)
    }

    /// Accept any 2xx status and return it; store and delete report only
    /// the response status.
    pub fn parse_status(&self, response: HttpResponse) -> Result<u16, ApiError> {
        if response.is_success() {
            Ok(response.status)
        } else {
            Err(http_failure(response))
        }
    }
}

fn http_failure(response: HttpResponse) -> ApiError {
    ApiError::Http {
        status: response.status,
        reason: response.reason,
        body: response.body,
    }
}

/// The new identifier is the final path segment of the resource URL.
fn id_from_location(location: &str) -> &str {
    match location.rfind('/') {
        Some(pos) => &location[pos + 1..],
        None => location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Example {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        #[serde(skip)]
        load_count: u32,
    }

    impl Entity for Example {
        const ENTITY_NAME: &'static str = "Example";

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn set_id(&mut self, id: Option<String>) {
            self.id = id;
        }

        fn on_loaded(&mut self) {
            self.load_count += 1;
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Parent {
        id: Option<String>,
    }

    impl Entity for Parent {
        const ENTITY_NAME: &'static str = "Parent";

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn set_id(&mut self, id: Option<String>) {
            self.id = id;
        }
    }

    fn client() -> RestClient {
        RestClient::new("https://host/base", "admin", "secret")
    }

    fn example(id: Option<&str>) -> Example {
        Example {
            id: id.map(str::to_string),
            name: "test".to_string(),
            load_count: 0,
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            reason: String::new(),
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RestClient::new("https://host/base/", "admin", "secret");
        assert_eq!(client.base_url(), "https://host/base");
        assert_eq!(client.entity_path::<Example>(), "https://host/base/Example");
    }

    #[test]
    fn every_request_carries_credential_headers() {
        let req = client().build_load::<Example>("42");
        assert!(req.headers.contains(&("X-User".to_string(), "admin".to_string())));
        assert!(req.headers.contains(&("X-Password".to_string(), "secret".to_string())));
    }

    #[test]
    fn create_posts_to_the_canonical_collection() {
        let req = client().build_create(&example(None)).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "https://host/base/Example");
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));

        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "test");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn create_at_uses_the_caller_path() {
        let req = client().build_create_at("/nested/Example", &example(None)).unwrap();
        assert_eq!(req.path, "https://host/base/nested/Example");
    }

    #[test]
    fn load_targets_the_instance_path() {
        let req = client().build_load::<Example>("42");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "https://host/base/Example/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn load_path_joins_without_doubling_slashes() {
        assert_eq!(
            client().build_load_path("/examples/0001").path,
            "https://host/base/examples/0001"
        );
        assert_eq!(
            client().build_load_path("examples/0001").path,
            "https://host/base/examples/0001"
        );
    }

    #[test]
    fn load_where_filters_the_collection() {
        let req = client().build_load_where::<Example>("name", "foo");
        assert_eq!(req.path, "https://host/base/Example?name=foo");
    }

    #[test]
    fn list_appends_the_query_string() {
        let req = client().build_list::<Example>(None);
        assert_eq!(req.path, "https://host/base/Example");

        let query = Query::new().filter("name", "foo").sort("name").descending();
        let req = client().build_list::<Example>(Some(&query));
        assert_eq!(req.path, "https://host/base/Example?name=foo&sort=name&order=desc");
    }

    #[test]
    fn children_nest_under_the_parent_instance() {
        let query = Query::new().sort("name");
        let req = client().build_children::<Parent, Example>("7", Some(&query));
        assert_eq!(req.path, "https://host/base/Parent/7/Example?sort=name");

        let req = client().build_child::<Parent, Example>("7", "42");
        assert_eq!(req.path, "https://host/base/Parent/7/Example/42");
    }

    #[test]
    fn store_requires_an_identifier() {
        let req = client().build_store(&example(Some("42"))).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "https://host/base/Example/42");

        let err = client().build_store(&example(None)).unwrap_err();
        assert!(matches!(err, ApiError::MissingId));
    }

    #[test]
    fn delete_targets_the_instance_path() {
        let req = client().build_delete::<Example>("42");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "https://host/base/Example/42");
    }

    #[test]
    fn create_assigns_the_id_from_the_location_header() {
        let mut entity = example(None);
        let response = HttpResponse {
            status: 201,
            reason: "Created".to_string(),
            headers: vec![(
                "Location".to_string(),
                "https://host/base/Example/42".to_string(),
            )],
            body: String::new(),
        };
        client().parse_create(&mut entity, response).unwrap();
        assert_eq!(entity.id(), Some("42"));
    }

    #[test]
    fn create_preserves_a_preset_id() {
        let mut entity = example(Some("preset"));
        let response = HttpResponse {
            status: 201,
            reason: "Created".to_string(),
            headers: vec![(
                "Location".to_string(),
                "https://host/base/Example/42".to_string(),
            )],
            body: String::new(),
        };
        client().parse_create(&mut entity, response).unwrap();
        assert_eq!(entity.id(), Some("preset"));
    }

    #[test]
    fn create_failure_carries_status_phrase_and_body() {
        let mut entity = example(None);
        let response = HttpResponse {
            status: 422,
            reason: "Unprocessable Entity".to_string(),
            headers: Vec::new(),
            body: "name must not be empty".to_string(),
        };
        let err = client().parse_create(&mut entity, response).unwrap_err();
        match err {
            ApiError::Http { status, reason, body } => {
                assert_eq!(status, 422);
                assert_eq!(reason, "Unprocessable Entity");
                assert_eq!(body, "name must not be empty");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(entity.id(), None);
    }

    #[test]
    fn create_without_location_header_is_malformed() {
        let mut entity = example(None);
        let err = client().parse_create(&mut entity, response(201, "")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_entity_unwraps_the_envelope_and_runs_the_hook() {
        let body = r#"{"result":{"id":"42","name":"loaded"}}"#;
        let entity: Example = client().parse_entity(response(200, body)).unwrap().unwrap();
        assert_eq!(entity.id(), Some("42"));
        assert_eq!(entity.name, "loaded");
        assert_eq!(entity.load_count, 1);
    }

    #[test]
    fn parse_entity_tolerates_an_empty_envelope() {
        let result: Option<Example> = client().parse_entity(response(200, r#"{"result":null}"#)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn parse_entity_rejects_non_200() {
        let err = client()
            .parse_entity::<Example>(response(404, "not found"))
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn parse_entity_rejects_bad_json() {
        let err = client()
            .parse_entity::<Example>(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_collection_runs_the_hook_on_every_element() {
        let body = r#"{"result":[{"id":"1","name":"a"},{"id":"2","name":"b"}]}"#;
        let entities: Vec<Example> = client().parse_collection(response(200, body)).unwrap();
        assert_eq!(entities.len(), 2);
        assert!(entities.iter().all(|e| e.load_count == 1));
    }

    #[test]
    fn parse_collection_tolerates_an_empty_envelope() {
        let entities: Vec<Example> = client()
            .parse_collection(response(200, r#"{"result":null}"#))
            .unwrap();
        assert!(entities.is_empty());
    }

    #[test]
    fn parse_status_accepts_any_2xx() {
        assert_eq!(client().parse_status(response(200, "")).unwrap(), 200);
        assert_eq!(client().parse_status(response(204, "")).unwrap(), 204);
        let err = client().parse_status(response(500, "boom")).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn location_id_is_the_final_path_segment() {
        assert_eq!(id_from_location("https://host/base/Example/42"), "42");
        assert_eq!(id_from_location("42"), "42");
    }
}
