//! Integration tests for delivery over a real socket.

use graphload_codec::{ReaderConfig, StatementReader};
use graphload_core::{EntityLookup, LookupKind, LookupOutcome, NaturalKey};
use graphload_delivery::{
    Auth, BatchLoader, DeliveryClient, DeliveryConfig, DeliveryError, HttpLookup, RetryConfig,
};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A request as received by the test server; header names are lowercased.
#[derive(Debug, Clone)]
struct Received {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Reads one request: the request line, headers up to the blank line, then
/// `content-length` bytes of body.
fn read_request(reader: &mut impl BufRead) -> Received {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if line.trim_end().is_empty() {
            break;
        }
        lines.push(line.trim_end().to_string());
    }
    let request_line = lines.remove(0);
    let headers: Vec<(String, String)> = lines
        .iter()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let mut received = Received {
        request_line,
        headers,
        body: String::new(),
    };
    let length = received
        .header("content-length")
        .map_or(0, |v| v.parse().unwrap());
    let mut body = vec![0; length];
    reader.read_exact(&mut body).unwrap();
    received.body = String::from_utf8(body).unwrap();
    received
}

/// Serves `responses` in order, one per connection, then stops.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Received>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&received);

    thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut BufReader::new(&stream));
            log.lock().push(request);

            write!(
                stream,
                "HTTP/1.1 {status} Test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        }
    });

    (url, received)
}

fn config(url: &str) -> DeliveryConfig {
    DeliveryConfig::new(url)
        .with_timeout(Duration::from_secs(10))
        .with_retry(
            RetryConfig::new(3)
                .with_base_interval(Duration::from_millis(10))
                .with_jitter(0.0),
        )
}

const PAIR: &str = "DELETE WHERE { GRAPH <http://g> { <http://example.org/s> <http://p> ?o . } };\n\
INSERT DATA { GRAPH <http://g> { <http://example.org/s> <http://p> \"v\" . } };\n";

#[test]
fn batch_is_retried_until_accepted() {
    let (url, received) = serve(vec![(503, ""), (500, ""), (204, "")]);
    let client =
        DeliveryClient::connect(&config(&url).with_auth(Auth::bearer("token-1"))).unwrap();
    let loader = BatchLoader::new(client).with_workers(1);

    let report = loader
        .load(StatementReader::with_config(PAIR.as_bytes(), ReaderConfig::new()))
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.delivered, 1);
    assert_eq!(loader.client().stats().retries(), 2);

    let received = received.lock();
    assert_eq!(received.len(), 3);
    for request in received.iter() {
        assert!(request.request_line.starts_with("POST "));
        assert_eq!(request.body, PAIR);
        assert_eq!(request.header("content-type"), Some("application/sparql-update"));
        assert_eq!(request.header("authorization"), Some("Bearer token-1"));
    }
}

#[test]
fn retries_are_bounded() {
    let (url, received) = serve(vec![(503, ""); 4]);
    let client = DeliveryClient::connect(&config(&url)).unwrap();

    let report = BatchLoader::new(client)
        .with_workers(1)
        .load(StatementReader::new(PAIR.as_bytes()))
        .unwrap();
    assert!(matches!(
        report.failures.as_slice(),
        [DeliveryError::Exhausted { attempts: 4, .. }]
    ));
    assert_eq!(received.lock().len(), 4);
}

#[test]
fn lookup_over_http() {
    let (url, received) = serve(vec![(200, "http://example.org/people/ada\n"), (404, "")]);
    let client = DeliveryClient::connect(&config(&url).with_auth(Auth::api_key("k"))).unwrap();
    let lookup = HttpLookup::new(client);

    let ada = NaturalKey::new(LookupKind::Person)
        .with("first_name", "Ada")
        .with("last_name", "Lovelace");
    let found = lookup.lookup(&ada).unwrap();
    assert_eq!(found.uri().map(|u| u.as_str()), Some("http://example.org/people/ada"));

    let nobody = NaturalKey::new(LookupKind::Person).with("last_name", "Nobody");
    assert_eq!(lookup.lookup(&nobody).unwrap(), LookupOutcome::NotFound);

    let received = received.lock();
    assert_eq!(
        received[0].request_line,
        "GET /person?first_name=Ada&last_name=Lovelace HTTP/1.1"
    );
    assert_eq!(received[0].header("x-api-key"), Some("k"));
}
