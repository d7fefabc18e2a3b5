use crate::matcher::PathPattern;
use crate::response::ResponseSpec;
use crate::server::State;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EndpointDefinition {
    pub(crate) pattern: PathPattern,
    pub(crate) default_response: ResponseSpec,
    pub(crate) method_responses: HashMap<String, ResponseSpec>,
}

impl EndpointDefinition {
    pub(crate) fn new(pattern: &str, content_type: Option<&str>) -> Self {
        Self {
            pattern: PathPattern::new(pattern),
            default_response: ResponseSpec::with_content_type(content_type),
            method_responses: HashMap::new(),
        }
    }

    /// The method override replaces the default response as a whole.
    pub(crate) fn response_for(&self, method: &str) -> &ResponseSpec {
        self.method_responses
            .get(method)
            .unwrap_or(&self.default_response)
    }

    /// A new override starts with the default status and content type as they are right now.
    /// The body is never carried over.
    pub(crate) fn method_response_mut(&mut self, method: &str) -> &mut ResponseSpec {
        let default_response = &self.default_response;
        self.method_responses
            .entry(method.to_owned())
            .or_insert_with(|| ResponseSpec {
                status: default_response.status,
                content_type: default_response.content_type.clone(),
                body: None,
            })
    }
}

///
/// Stores the response recipe for a path pattern. Should be initialized via `Server::path()`.
///
/// The endpoint is registered as soon as it is created; every `with_*` call writes straight into
/// the server, so there is nothing to commit.
///
#[derive(Clone, Debug)]
pub struct Endpoint {
    state: Arc<RwLock<State>>,
    index: usize,
}

impl Endpoint {
    pub(crate) fn new(state: Arc<RwLock<State>>, index: usize) -> Self {
        Self { state, index }
    }

    fn update(&self, change: impl FnOnce(&mut EndpointDefinition)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(definition) = state.endpoints.get_mut(self.index) {
            change(definition);
        }
    }

    ///
    /// Sets the status code of the response. Without it the response status is 200. Passing `0`
    /// unsets it again.
    ///
    /// ## Example
    ///
    /// ```
    /// let mut s = httpstub::Server::start();
    ///
    /// s.path("/nocontent").with_status(204);
    /// ```
    ///
    pub fn with_status(self, status: u16) -> Self {
        self.update(|definition| definition.default_response.set_status(status));
        self
    }

    ///
    /// Sets the `content-type` of the response, overriding the server's default content type.
    ///
    /// ## Example
    ///
    /// ```
    /// let mut s = httpstub::Server::start();
    ///
    /// s.path("/user/*/xml").with_content_type("application/xml");
    /// ```
    ///
    pub fn with_content_type(self, content_type: &str) -> Self {
        self.update(|definition| definition.default_response.set_content_type(content_type));
        self
    }

    ///
    /// Sets the body of the response, written as-is. An empty body means no body at all.
    ///
    /// ## Example
    ///
    /// ```
    /// let mut s = httpstub::Server::start();
    ///
    /// s.path("/user").with_body(r#"{"id":"a1"}"#);
    /// ```
    ///
    pub fn with_body<StrOrBytes: AsRef<[u8]>>(self, body: StrOrBytes) -> Self {
        self.update(|definition| definition.default_response.set_body(body.as_ref()));
        self
    }

    ///
    /// Returns a view that configures the response for a single HTTP method. The method name is
    /// compared case-sensitively against the request method.
    ///
    /// The first call for a method copies the endpoint's status and content type as configured
    /// so far, but not its body; later calls for the same method keep adding to that response.
    /// Requests with the method get the method's response only, requests with any other method
    /// get the endpoint's response.
    ///
    /// ## Example
    ///
    /// ```
    /// let mut s = httpstub::Server::start();
    ///
    /// let e = s.path("/").with_content_type("text/plain").with_status(418);
    /// e.with_method("GET").with_status(200).with_body("hello");
    /// e.with_method("PUT").with_status(204);
    /// ```
    ///
    pub fn with_method(&self, method: &str) -> MethodEndpoint {
        self.update(|definition| {
            definition.method_response_mut(method);
        });

        MethodEndpoint {
            endpoint: self.clone(),
            method: method.to_owned(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match state.endpoints.get(self.index) {
            Some(definition) => write!(f, "{}", definition.pattern),
            None => f.write_str("(unregistered)"),
        }
    }
}

///
/// Configures the response of an `Endpoint` for one HTTP method. Created via
/// `Endpoint::with_method()`.
///
#[derive(Clone, Debug)]
pub struct MethodEndpoint {
    endpoint: Endpoint,
    method: String,
}

impl MethodEndpoint {
    fn update(&self, change: impl FnOnce(&mut ResponseSpec)) {
        self.endpoint
            .update(|definition| change(definition.method_response_mut(&self.method)));
    }

    /// Sets the status code for this method. Passing `0` unsets it.
    pub fn with_status(self, status: u16) -> Self {
        self.update(|response| response.set_status(status));
        self
    }

    /// Sets the `content-type` for this method.
    pub fn with_content_type(self, content_type: &str) -> Self {
        self.update(|response| response.set_content_type(content_type));
        self
    }

    /// Sets the body for this method. An empty body means no body at all.
    pub fn with_body<StrOrBytes: AsRef<[u8]>>(self, body: StrOrBytes) -> Self {
        self.update(|response| response.set_body(body.as_ref()));
        self
    }
}

impl fmt::Display for MethodEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}
