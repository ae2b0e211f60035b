//! Runs the client against a local `tiny_http` server standing in for the Netatmo API.

use netatmo_public::{
    ApiError, BoundingBox, Cell, Credentials, Netatmo, NetatmoClient, NetatmoError,
};
use std::io::Read;
use std::thread::{self, JoinHandle};

const TOKEN_BODY: &str = r#"{"access_token":"5b7f|abc","refresh_token":"5b7f|def","scope":["read_station"],"expires_in":10800,"expire_in":10800}"#;

#[derive(Debug)]
struct Recorded {
    method: String,
    url: String,
    body: String,
}

struct MockApi {
    base: String,
    handle: JoinHandle<Vec<Recorded>>,
}

impl MockApi {
    /// Serves `responses` in order, one per incoming request, then stops.
    fn start(responses: Vec<(u16, String)>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("bind mock server");
        let addr = server.server_addr().to_ip().expect("tcp listener");
        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for (status, body) in responses {
                let mut request = match server.recv() {
                    Ok(request) => request,
                    Err(_) => break,
                };
                let mut request_body = String::new();
                request
                    .as_reader()
                    .read_to_string(&mut request_body)
                    .unwrap();
                recorded.push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body: request_body,
                });
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        tiny_http::Header::from_bytes(
                            &b"Content-Type"[..],
                            &b"application/json"[..],
                        )
                        .unwrap(),
                    );
                request.respond(response).unwrap();
            }
            recorded
        });
        Self {
            base: format!("http://{addr}"),
            handle,
        }
    }

    fn client(&self) -> NetatmoClient {
        NetatmoClient::builder()
            .token_url(format!("{}/oauth2/token", self.base))
            .api_url(format!("{}/api/getpublicdata", self.base))
            .build()
            .unwrap()
    }

    fn finish(self) -> Vec<Recorded> {
        self.handle.join().expect("mock server thread")
    }
}

fn credentials() -> Credentials {
    Credentials::builder()
        .username("me@example.com")
        .password("hunter2")
        .client_id("client-id")
        .client_secret("client-secret")
        .build()
}

fn aarhus() -> BoundingBox {
    BoundingBox::new(56.233, 56.0843, 10.3324, 10.0344)
}

#[test]
fn test_authenticate_posts_form_and_computes_expiry() {
    let api = MockApi::start(vec![(200, TOKEN_BODY.to_string())]);
    let before = chrono::Utc::now();
    let token = api.client().authenticate(&credentials()).unwrap();
    let recorded = api.finish();

    assert_eq!(token.access_token, "5b7f|abc");
    assert_eq!(token.refresh_token.as_deref(), Some("5b7f|def"));
    assert_eq!(token.expires_in, 10800);
    assert!(token.expiry >= before + chrono::Duration::seconds(10800));
    assert!(!token.is_expired());

    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].url, "/oauth2/token");
    let body = &recorded[0].body;
    assert!(body.contains("grant_type=password"));
    assert!(body.contains("username=me%40example.com"));
    assert!(body.contains("password=hunter2"));
    assert!(body.contains("client_id=client-id"));
    assert!(body.contains("client_secret=client-secret"));
    assert!(body.contains("scope=read_station"));
}

#[test]
fn test_authentication_failure_reports_status() {
    let api = MockApi::start(vec![(400, r#"{"error":"invalid_grant"}"#.to_string())]);
    let err = api.client().authenticate(&credentials()).unwrap_err();
    api.finish();

    match &err {
        ApiError::AuthenticationFailed { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
    assert!(err.to_string().starts_with("authentication failed: 400"));
}

#[test]
fn test_fetch_sends_token_and_box_as_query() {
    let fixture = include_str!("fixtures/getpublicdata.json").to_string();
    let api = MockApi::start(vec![(200, TOKEN_BODY.to_string()), (200, fixture)]);
    let client = api.client();

    let token = client.authenticate(&credentials()).unwrap();
    let raw = client.fetch_public_stations(&token, &aarhus()).unwrap();
    let recorded = api.finish();

    assert_eq!(raw.status(), Some("ok"));
    assert_eq!(raw.stations().unwrap().len(), 3);

    let request = &recorded[1];
    assert_eq!(request.method, "POST");
    assert!(request.url.starts_with("/api/getpublicdata?"));
    for param in [
        "access_token=5b7f%7Cabc",
        "lat_ne=56.233",
        "lon_ne=10.3324",
        "lat_sw=56.0843",
        "lon_sw=10.0344",
    ] {
        assert!(request.url.contains(param), "{} lacks {}", request.url, param);
    }
}

#[test]
fn test_fetch_error_status_names_the_endpoint() {
    let api = MockApi::start(vec![
        (200, TOKEN_BODY.to_string()),
        (
            403,
            r#"{"error":{"code":3,"message":"Access token expired"}}"#.to_string(),
        ),
    ]);
    let client = api.client();
    let token = client.authenticate(&credentials()).unwrap();
    let err = client.fetch_public_stations(&token, &aarhus()).unwrap_err();
    api.finish();

    match err {
        ApiError::HttpStatus { url, status, .. } => {
            assert!(url.ends_with("/api/getpublicdata"));
            assert_eq!(status.as_u16(), 403);
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn test_invalid_json_is_a_parse_error() {
    let api = MockApi::start(vec![(200, "<html>maintenance</html>".to_string())]);
    let err = api.client().authenticate(&credentials()).unwrap_err();
    api.finish();
    assert!(matches!(err, ApiError::JsonParse { .. }));
}

#[test]
fn test_out_of_range_token_lifetime_is_an_error() {
    let api = MockApi::start(vec![(
        200,
        r#"{"access_token":"abc","expires_in":10000000000000000}"#.to_string(),
    )]);
    let err = api.client().authenticate(&credentials()).unwrap_err();
    api.finish();

    match err {
        ApiError::InvalidToken { url, expires_in } => {
            assert!(url.ends_with("/oauth2/token"));
            assert_eq!(expires_in, 10_000_000_000_000_000);
        }
        other => panic!("expected InvalidToken, got {other:?}"),
    }
}

#[test]
fn test_unreachable_endpoint_is_a_network_error() {
    // Bind and drop a listener to get a port nothing is serving on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = NetatmoClient::builder()
        .token_url(format!("http://127.0.0.1:{port}/oauth2/token"))
        .build()
        .unwrap();

    match client.authenticate(&credentials()).unwrap_err() {
        ApiError::NetworkRequest(url, _) => assert!(url.ends_with("/oauth2/token")),
        other => panic!("expected NetworkRequest, got {other:?}"),
    }
}

#[test]
fn test_public_data_runs_the_whole_exchange() {
    let fixture = include_str!("fixtures/getpublicdata.json").to_string();
    let api = MockApi::start(vec![(200, TOKEN_BODY.to_string()), (200, fixture)]);
    let netatmo = Netatmo::new(api.client(), credentials());

    let table = netatmo
        .public_data()
        .region(aarhus())
        .convert_timestamps(true)
        .call()
        .unwrap();
    api.finish();

    assert_eq!(table.height(), 3);
    assert!(matches!(
        table.get("temperature_utc_timestamp", 0),
        Some(Cell::DateTime(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = Netatmo::save(&table, dir.path()).unwrap();
    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(contents.lines().count(), 4);
    assert!(contents.starts_with("mac_id,altitude,longitude,latitude,timezone,"));
}

#[test]
fn test_public_data_stops_on_auth_failure() {
    let api = MockApi::start(vec![(401, r#"{"error":"invalid_client"}"#.to_string())]);
    let netatmo = Netatmo::new(api.client(), credentials());

    let err = netatmo.public_data().region(aarhus()).call().unwrap_err();
    let recorded = api.finish();

    assert!(matches!(
        err,
        NetatmoError::Api(ApiError::AuthenticationFailed { .. })
    ));
    assert_eq!(recorded.len(), 1, "no data request after a failed login");
}
