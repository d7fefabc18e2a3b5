use crate::endpoint::{Endpoint, EndpointDefinition};
use crate::matcher::split_path;
use crate::response::{self, StubResponse};
use crate::{Error, ErrorKind};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) endpoints: Vec<EndpointDefinition>,
}

impl State {
    pub(crate) fn push_endpoint(&mut self, definition: EndpointDefinition) -> usize {
        self.endpoints.push(definition);
        self.endpoints.len() - 1
    }

    /// First match in registration order wins.
    pub(crate) fn find_endpoint(&self, path: &str) -> Option<&EndpointDefinition> {
        let request_segments: Vec<&str> = split_path(path).collect();

        self.endpoints
            .iter()
            .find(|endpoint| endpoint.pattern.matches_segments(&request_segments))
    }
}

///
/// Options to configure a stub server.
///
#[derive(Clone, Debug)]
pub struct ServerOpts {
    /// The server host (defaults to 127.0.0.1)
    pub host: &'static str,
    /// The server port (defaults to a randomly assigned free port)
    pub port: u16,
}

impl Default for ServerOpts {
    fn default() -> Self {
        Self {
            host: "127.0.0.1",
            port: 0,
        }
    }
}

///
/// One instance of the stub server.
///
/// Each server listens on its own port, served by a dedicated background thread, and keeps its
/// own list of endpoints. Requests are matched against the endpoints in the order they were
/// registered and the first endpoint whose pattern matches the request path renders the
/// response. Requests matching no endpoint get `200 OK` with an empty body.
///
/// Register and configure every endpoint before sending requests. Changing endpoints while the
/// server is handling traffic is unsupported: a request may see an endpoint half configured.
///
/// ## Example
///
/// ```
/// let mut s = httpstub::Server::start();
/// s.with_default_content_type("application/json");
///
/// // the default status for name requests is 204, this applies to PUT, DELETE, ...
/// let name = s.path("/user/*/name").with_status(204);
///
/// // GET overrides the status and body
/// name.with_method("GET")
///   .with_body(r#"{"id":"a1","name":"Alice"}"#)
///   .with_status(200);
///
/// s.path("/user/*/xml")
///   .with_content_type("application/xml")
///   .with_body(r#"<user id="a1"><name>Alice</name></user>"#);
/// s.path("/user").with_body(r#"{"id":"a1","name":"Alice","gender":"f"}"#);
///
/// // Use s.url() as the base URL of the client under test, then:
/// s.close();
/// ```
///
#[derive(Debug)]
pub struct Server {
    address: SocketAddr,
    state: Arc<RwLock<State>>,
    default_content_type: Option<String>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Server {
    ///
    /// Starts a new server on a random free port of the loopback interface.
    ///
    /// Panics if the server can't be started. Use `Server::try_start()` to handle the error
    /// yourself.
    ///
    #[track_caller]
    pub fn start() -> Server {
        Server::start_with_opts(ServerOpts::default())
    }

    ///
    /// Same as `Server::start` but returns the error instead of panicking.
    ///
    pub fn try_start() -> Result<Server, Error> {
        Server::try_start_with_opts(ServerOpts::default())
    }

    ///
    /// Starts a new server with the given options.
    ///
    /// ## Example
    ///
    /// ```
    /// let opts = httpstub::ServerOpts {
    ///     host: "127.0.0.1",
    ///     port: 0,
    /// };
    /// let s = httpstub::Server::start_with_opts(opts);
    /// assert!(s.url().starts_with("http://127.0.0.1:"));
    /// ```
    ///
    #[track_caller]
    pub fn start_with_opts(opts: ServerOpts) -> Server {
        match Server::try_start_with_opts(opts) {
            Ok(server) => server,
            Err(err) => panic!("{}", err),
        }
    }

    ///
    /// Same as `Server::start_with_opts` but returns the error instead of panicking.
    ///
    pub fn try_start_with_opts(opts: ServerOpts) -> Result<Server, Error> {
        let listener = StdTcpListener::bind((opts.host, opts.port))
            .map_err(|err| Error::new_with_context(ErrorKind::ServerFailure, err))?;
        listener
            .set_nonblocking(true)
            .map_err(|err| Error::new_with_context(ErrorKind::ServerFailure, err))?;
        let address = listener
            .local_addr()
            .map_err(|err| Error::new_with_context(ErrorKind::ServerFailure, err))?;

        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| Error::new_with_context(ErrorKind::ServerFailure, err))?;

        let listener = {
            let _guard = runtime.enter();
            TcpListener::from_std(listener)
                .map_err(|err| Error::new_with_context(ErrorKind::ServerFailure, err))?
        };

        let state = Arc::new(RwLock::new(State::default()));
        let (shutdown, shutdown_receiver) = oneshot::channel();

        let state_clone = state.clone();
        let thread = thread::Builder::new()
            .name(format!("httpstub::server_{}", address))
            .spawn(move || {
                runtime.block_on(Server::accept_connections(
                    listener,
                    state_clone,
                    shutdown_receiver,
                ));
            })
            .map_err(|err| Error::new_with_context(ErrorKind::ServerFailure, err))?;

        log::debug!("Server is listening at {}", address);

        Ok(Server {
            address,
            state,
            default_content_type: None,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    ///
    /// Registers an endpoint for the given path pattern and returns it for configuration.
    ///
    /// Patterns are split on `/`. A `*` segment matches any single request segment, so
    /// `/user/*/name` matches `/user/a1/name`. Patterns are prefixes: `/user` also matches
    /// `/user/a1/name`. Register the more specific patterns first, the first match wins.
    ///
    /// ## Example
    ///
    /// ```
    /// let mut s = httpstub::Server::start();
    ///
    /// s.path("/user/*/name").with_status(204);
    /// s.path("/user").with_body("user");
    /// ```
    ///
    pub fn path(&mut self, pattern: &str) -> Endpoint {
        let definition = EndpointDefinition::new(pattern, self.default_content_type.as_deref());
        let index = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push_endpoint(definition);

        log::debug!("Registered endpoint {} on {}", pattern, self.address);

        Endpoint::new(self.state.clone(), index)
    }

    ///
    /// Sets the `content-type` given to endpoints registered from now on. Endpoints registered
    /// before this call keep their content type.
    ///
    /// ## Example
    ///
    /// ```
    /// let mut s = httpstub::Server::start();
    ///
    /// s.with_default_content_type("application/json");
    /// s.path("/user").with_body(r#"{"id":"a1"}"#);
    /// ```
    ///
    pub fn with_default_content_type(&mut self, content_type: &str) -> &mut Self {
        self.default_content_type = (!content_type.is_empty()).then(|| content_type.to_owned());
        self
    }

    ///
    /// The URL of the server, e.g. `http://127.0.0.1:4321`.
    ///
    pub fn url(&self) -> String {
        format!("http://{}", self.address)
    }

    ///
    /// The host and port of the server, e.g. `127.0.0.1:4321`.
    ///
    pub fn host_with_port(&self) -> String {
        self.address.to_string()
    }

    ///
    /// The socket address of the server.
    ///
    pub fn socket_address(&self) -> SocketAddr {
        self.address
    }

    ///
    /// Stops accepting connections and releases the port. Requests still in flight are
    /// abandoned. Dropping the server has the same effect.
    ///
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };

        let _ = shutdown.send(());

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Server thread for {} panicked", self.address);
            }
        }

        log::debug!("Server at {} closed", self.address);
    }

    async fn accept_connections(
        listener: TcpListener,
        state: Arc<RwLock<State>>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, _)) => Server::serve_connection(stream, state.clone()),
                        Err(err) => log::error!("Failed to accept a connection: {}", err),
                    }
                }
            }
        }
    }

    fn serve_connection(stream: TcpStream, state: Arc<RwLock<State>>) {
        tokio::spawn(async move {
            let service = service_fn(move |request: Request<Incoming>| {
                let state = state.clone();
                async move { handle_request(&request, &state) }
            });

            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                log::debug!("Connection closed with an error: {}", err);
            }
        });
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

fn handle_request(
    request: &Request<Incoming>,
    state: &RwLock<State>,
) -> Result<StubResponse, Error> {
    let state = state
        .read()
        .map_err(|err| Error::new_with_context(ErrorKind::Deadlock, err))?;

    let method = request.method().as_str();
    let path = request.uri().path();

    let response = match state.find_endpoint(path) {
        Some(endpoint) => {
            log::debug!("{} {} matched endpoint {}", method, path, endpoint.pattern);
            endpoint.response_for(method).render()
        }
        None => {
            log::debug!("{} {} matched no endpoint", method, path);
            response::fallback()
        }
    };

    Ok(response)
}
