#![warn(missing_docs)]

//!
//! httpstub is a configurable stub HTTP server for tests. Test code registers canned responses
//! for URL path patterns and the code under test talks to them over a real loopback socket.
//!
//! Every server runs on its own random port, served by a background thread, so tests don't
//! share state and can run in parallel.
//!
//! # Getting Started
//!
//! Start a server, register the paths your client will call and point the client at
//! `Server::url()`:
//!
//! ```
//! use std::io::{BufRead, BufReader, Write};
//! use std::net::TcpStream;
//!
//! let mut s = httpstub::Server::start();
//!
//! s.path("/hello")
//!   .with_status(201)
//!   .with_content_type("text/plain")
//!   .with_body("world");
//!
//! // Any request to /hello beyond this line will be responded with 201,
//! // `content-type: text/plain` and the body "world".
//! let mut stream = TcpStream::connect(s.host_with_port()).unwrap();
//! stream.write_all(b"GET /hello HTTP/1.1\r\nhost: localhost\r\n\r\n").unwrap();
//!
//! let mut status_line = String::new();
//! BufReader::new(stream).read_line(&mut status_line).unwrap();
//! assert_eq!("HTTP/1.1 201 Created\r\n", status_line);
//!
//! s.close();
//! ```
//!
//! # Matching paths
//!
//! Patterns are split into `/`-delimited segments and compared with the request path segment by
//! segment. A `*` segment matches any single segment. A pattern matches every request path it
//! is a prefix of, so `/user` also answers `/user/a1/name`.
//!
//! Endpoints are tried in the order they were registered and the first match wins. Register
//! longer, more specific patterns before shorter ones:
//!
//! ```
//! let mut s = httpstub::Server::start();
//!
//! // GET /user/a1/name responds with 204 and no body
//! s.path("/user/*/name").with_status(204);
//! // GET /user/a1/other and GET /user respond with the user
//! s.path("/user").with_body(r#"{"id":"a1"}"#);
//! ```
//!
//! Requests matching no endpoint are responded with `200 OK`, `content-length: 0` and no
//! `content-type`.
//!
//! # Responses per method
//!
//! An endpoint responds the same to every method unless a method gets its own response. The
//! method's response starts with the endpoint's status and content type configured so far,
//! never its body, and replaces the endpoint's response entirely for requests with that method:
//!
//! ```
//! let mut s = httpstub::Server::start();
//!
//! let e = s.path("/").with_content_type("text/plain").with_status(418);
//! // GET: 200, text/plain, "hello"
//! e.with_method("GET").with_status(200).with_body("hello");
//! // PUT: 204, text/plain, no body
//! e.with_method("PUT").with_status(204);
//! // any other method: 418, text/plain, no body
//! ```
//!
//! # Content type
//!
//! Without a `content-type` set, responses carry no `content-type` header. A server-wide
//! default applies to the endpoints registered after it was set:
//!
//! ```
//! let mut s = httpstub::Server::start();
//!
//! s.with_default_content_type("application/json");
//! s.path("/user").with_body(r#"{"id":"a1"}"#);
//! s.path("/user/*/xml").with_content_type("application/xml");
//! ```
//!
//! # Closing
//!
//! `Server::close()` releases the port. Dropping the server does the same, so a server going
//! out of scope at the end of a test cleans up after itself.
//!
//! # Debug
//!
//! httpstub logs through the `log` crate: registered endpoints, matched requests and invalid
//! response settings. Install a logger like `env_logger` in your tests to see them:
//!
//! ```sh
//! RUST_LOG=httpstub=debug cargo test
//! ```
//!
pub use endpoint::{Endpoint, MethodEndpoint};
pub use error::{Error, ErrorKind};
pub use server::{Server, ServerOpts};

mod endpoint;
mod error;
mod matcher;
mod response;
mod server;
