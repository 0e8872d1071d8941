use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use roster::config::{Config, Credentials};
use roster::service_account::{Claims, JWT_BEARER_GRANT, SPREADSHEETS_SCOPE, fetch_access_token};
use roster::sheets::{STUDENTS_RANGE, SheetsClient};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const ACCESS_TOKEN: &str = "tok-123";
const CLIENT_EMAIL: &str = "bot@project.iam.gserviceaccount.com";

type Received = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn issue_token(
    State(received): State<Received>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    received.lock().expect("token lock").push(form);

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3599,
    }))
}

async fn read_students(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if bearer != format!("Bearer {ACCESS_TOKEN}") {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "range": "Students!A1:H2",
            "values": [["Name", "Email"], ["A", "a@x.com"]],
        })),
    )
}

async fn spawn_google() -> (SocketAddr, Received, oneshot::Sender<()>) {
    let received = Received::default();
    let app = Router::new()
        .route("/token", post(issue_token))
        .route(
            "/v4/spreadsheets/{id}/values/{range}",
            get(read_students),
        )
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("local_addr should succeed");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    (addr, received, shutdown_tx)
}

fn config(addr: SocketAddr) -> Config {
    let key = json!({
        "type": "service_account",
        "client_email": CLIENT_EMAIL,
        "private_key_id": "test-kid",
        "private_key": include_str!("fixtures/test_rsa_private.pem"),
        "token_uri": format!("http://{addr}/token"),
    });

    Config::from_kv(&HashMap::from([
        ("GOOGLE_CREDENTIALS".to_string(), key.to_string()),
        ("SHEETS_API_BASE".to_string(), format!("http://{addr}")),
        ("SPREADSHEET_ID".to_string(), "sheet-id".to_string()),
    ]))
    .expect("config should be valid")
}

#[tokio::test]
async fn fetch_access_token_exchanges_signed_assertion() {
    let (addr, received, _shutdown) = spawn_google().await;
    let Credentials::ServiceAccount(key) = config(addr).credentials else {
        panic!("expected service account credentials");
    };

    let token = fetch_access_token(&reqwest::Client::new(), &key)
        .await
        .expect("token exchange should succeed");
    assert_eq!(token, ACCESS_TOKEN);

    let forms = received.lock().expect("token lock").clone();
    assert_eq!(forms.len(), 1);
    assert_eq!(
        forms[0].get("grant_type").map(String::as_str),
        Some(JWT_BEARER_GRANT)
    );

    let assertion = forms[0].get("assertion").expect("assertion must be sent");
    let header = jsonwebtoken::decode_header(assertion).expect("assertion header must parse");
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), Some("test-kid"));

    let token_uri = format!("http://{addr}/token");
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[token_uri.as_str()]);

    let claims = decode::<Claims>(
        assertion,
        &DecodingKey::from_rsa_pem(include_bytes!("fixtures/test_rsa_public.pem"))
            .expect("public key must parse"),
        &validation,
    )
    .expect("assertion must verify against the key pair")
    .claims;

    assert_eq!(claims.iss, CLIENT_EMAIL);
    assert_eq!(claims.scope, SPREADSHEETS_SCOPE);
    assert_eq!(claims.aud, token_uri);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn sheets_read_uses_service_account_token_as_bearer() {
    let (addr, received, _shutdown) = spawn_google().await;
    let client = SheetsClient::new(&config(addr)).expect("client should build");

    let table = client
        .read(STUDENTS_RANGE)
        .await
        .expect("read should succeed");

    assert_eq!(table.len(), 2);
    assert_eq!(
        table.header().map(|h| h.as_slice()),
        Some(["Name".to_string(), "Email".to_string()].as_slice())
    );
    assert_eq!(received.lock().expect("token lock").len(), 1);
}
