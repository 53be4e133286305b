//! Entity lookup over HTTP.

use crate::client::DeliveryClient;
use crate::http::HttpClient;
use graphload_codec::Uri;
use graphload_core::{EntityLookup, LookupOutcome, NaturalKey, ResolverError, ResolverResult};
use tracing::debug;

/// Looks up entity URIs with `GET <base>/<kind>?<field>=<value>&...`.
///
/// A 200 response carries the URI as its body; 404 means the entity is not
/// known. Both are valid answers and may be cached. Everything else is a
/// [`ResolverError`].
pub struct HttpLookup<C> {
    client: DeliveryClient<C>,
}

impl<C: HttpClient> HttpLookup<C> {
    /// Creates a lookup issuing requests through `client`.
    pub fn new(client: DeliveryClient<C>) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &DeliveryClient<C> {
        &self.client
    }
}

impl<C: HttpClient> EntityLookup for HttpLookup<C> {
    fn lookup(&self, key: &NaturalKey) -> ResolverResult<LookupOutcome> {
        let canonical = key.canonical();
        let query: Vec<(&str, &str)> = key
            .fields()
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        let response = self
            .client
            .get(key.kind().as_str(), &query)
            .map_err(|e| ResolverError::unavailable(&canonical, e.to_string()))?;

        match response.status {
            200 => {
                let uri = Uri::parse(response.body.trim()).map_err(|_| ResolverError::InvalidUri {
                    key: canonical.clone(),
                    body: response.body.clone(),
                })?;
                debug!(key = %canonical, uri = %uri, "lookup found entity");
                Ok(LookupOutcome::Found(uri))
            }
            404 => Ok(LookupOutcome::NotFound),
            status => Err(ResolverError::UnexpectedStatus {
                key: canonical,
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::http::{HttpRequest, HttpResponse, TransportFailure};
    use graphload_core::{LookupKind, ResolverCache};
    use parking_lot::Mutex;
    use std::time::Duration;

    struct FixedClient {
        response: HttpResponse,
        urls: Mutex<Vec<String>>,
    }

    impl FixedClient {
        fn new(status: u16, body: &str) -> Self {
            Self {
                response: HttpResponse::new(status, body),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for FixedClient {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
            self.urls.lock().push(request.url.clone());
            Ok(self.response.clone())
        }
    }

    fn lookup(http: &FixedClient) -> HttpLookup<&FixedClient> {
        let retry = RetryConfig::new(1)
            .with_base_interval(Duration::ZERO)
            .with_jitter(0.0);
        HttpLookup::new(DeliveryClient::new(http, "http://lookup", retry))
    }

    fn ada() -> NaturalKey {
        NaturalKey::new(LookupKind::Person)
            .with("first_name", "Ada")
            .with("last_name", "Lovelace")
    }

    #[test]
    fn found_uri_is_trimmed() {
        let http = FixedClient::new(200, "http://example.org/people/ada\n");
        let outcome = lookup(&http).lookup(&ada()).unwrap();
        assert_eq!(outcome, LookupOutcome::Found(Uri::new("http://example.org/people/ada")));
        assert_eq!(
            http.urls.lock()[0],
            "http://lookup/person?first_name=Ada&last_name=Lovelace"
        );
    }

    #[test]
    fn not_found_is_an_answer() {
        let http = FixedClient::new(404, "");
        assert_eq!(lookup(&http).lookup(&ada()).unwrap(), LookupOutcome::NotFound);
    }

    #[test]
    fn blank_body_is_invalid() {
        let http = FixedClient::new(200, "  \n");
        assert!(matches!(
            lookup(&http).lookup(&ada()),
            Err(ResolverError::InvalidUri { .. })
        ));
    }

    #[test]
    fn other_statuses_are_errors() {
        let http = FixedClient::new(401, "");
        assert!(matches!(
            lookup(&http).lookup(&ada()),
            Err(ResolverError::UnexpectedStatus { status: 401, .. })
        ));
    }

    #[test]
    fn exhausted_retries_are_unavailable_and_not_cached() {
        let http = FixedClient::new(503, "");
        let cache = ResolverCache::new(lookup(&http));

        let err = cache.resolve(&ada()).unwrap_err();
        assert!(matches!(err, ResolverError::Unavailable { .. }));
        assert_eq!(err.key(), ada().canonical());
        assert_eq!(http.urls.lock().len(), 2);
        assert!(cache.is_empty());
    }
}
