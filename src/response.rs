use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http_body_util::Full;
use hyper::StatusCode;

pub(crate) type StubResponse = hyper::Response<Full<Bytes>>;

///
/// The response facets an endpoint can be configured with. Every facet is optional and an
/// unset facet is simply not rendered.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ResponseSpec {
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub body: Option<Bytes>,
}

impl ResponseSpec {
    pub(crate) fn with_content_type(content_type: Option<&str>) -> Self {
        let mut spec = Self::default();
        if let Some(content_type) = content_type {
            spec.set_content_type(content_type);
        }
        spec
    }

    /// A status of `0` leaves the status unset.
    pub(crate) fn set_status(&mut self, status: u16) {
        self.status = (status > 0).then_some(status);
    }

    pub(crate) fn set_content_type(&mut self, content_type: &str) {
        self.content_type = (!content_type.is_empty()).then(|| content_type.to_owned());
    }

    /// An empty body leaves the body unset.
    pub(crate) fn set_body(&mut self, body: &[u8]) {
        self.body = (!body.is_empty()).then(|| Bytes::copy_from_slice(body));
    }

    pub(crate) fn render(&self) -> StubResponse {
        let mut response = fallback();

        if let Some(ref content_type) = self.content_type {
            match HeaderValue::from_str(content_type) {
                Ok(value) => {
                    response.headers_mut().insert(CONTENT_TYPE, value);
                }
                Err(_) => log::warn!("Skipping invalid content type {:?}", content_type),
            }
        }

        if let Some(status) = self.status {
            match StatusCode::from_u16(status) {
                Ok(status) => *response.status_mut() = status,
                Err(_) => log::warn!("Skipping invalid status code {}", status),
            }
        }

        if let Some(ref body) = self.body {
            *response.body_mut() = Full::new(body.clone());
        }

        response
    }
}

///
/// The response served when no endpoint matches: `200 OK` with an empty body and no
/// `content-type`. hyper adds `content-length: 0` and `date`.
///
pub(crate) fn fallback() -> StubResponse {
    hyper::Response::new(Full::new(Bytes::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: StubResponse) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_unset_spec_renders_like_the_fallback() {
        let response = ResponseSpec::default().render();

        assert_eq!(StatusCode::OK, response.status());
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_all_facets() {
        let mut spec = ResponseSpec::default();
        spec.set_status(418);
        spec.set_content_type("text/plain");
        spec.set_body(b"ceylon?");

        let response = spec.render();

        assert_eq!(StatusCode::IM_A_TEAPOT, response.status());
        assert_eq!("text/plain", response.headers()[CONTENT_TYPE]);
        assert_eq!(Bytes::from_static(b"ceylon?"), body_of(response).await);
    }

    #[test]
    fn test_zero_status_and_empty_values_are_unset() {
        let mut spec = ResponseSpec::default();
        spec.set_status(204);
        spec.set_status(0);
        spec.set_content_type("");
        spec.set_body(b"");

        assert_eq!(ResponseSpec::default(), spec);
    }

    #[test]
    fn test_last_value_wins() {
        let mut spec = ResponseSpec::default();
        spec.set_body(b"first");
        spec.set_body(b"second");
        spec.set_content_type("text/plain");
        spec.set_content_type("application/json");

        let response = spec.render();

        assert_eq!(1, response.headers().get_all(CONTENT_TYPE).iter().count());
        assert_eq!("application/json", response.headers()[CONTENT_TYPE]);
        assert_eq!(Some(Bytes::from_static(b"second")), spec.body);
    }

    #[test]
    fn test_invalid_status_is_skipped() {
        let mut spec = ResponseSpec::default();
        spec.set_status(42);
        spec.set_content_type("text/plain");

        let response = spec.render();

        assert_eq!(StatusCode::OK, response.status());
        assert_eq!("text/plain", response.headers()[CONTENT_TYPE]);
    }

    #[test]
    fn test_invalid_content_type_is_skipped() {
        let mut spec = ResponseSpec::default();
        spec.set_status(201);
        spec.set_content_type("text/plain\r\nx-injected: yes");

        let response = spec.render();

        assert_eq!(StatusCode::CREATED, response.status());
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_with_content_type_seeds_only_the_content_type() {
        let spec = ResponseSpec::with_content_type(Some("application/json"));
        assert_eq!(Some("application/json".to_string()), spec.content_type);
        assert_eq!(None, spec.status);
        assert_eq!(None, spec.body);

        assert_eq!(ResponseSpec::default(), ResponseSpec::with_content_type(None));
    }
}
