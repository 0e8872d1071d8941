//! Backend for the department coding challenge board.
//!
//!
//!
//! # General Infrastructure
//! - Google Sheets is the only datastore, editors maintain the roster by hand
//! - This server sits between the static frontend and the sheet
//! - Frontend files are served from the same process, everything else is JSON
//! - Every request reads what it needs straight from the sheet, nothing is kept in memory
//!
//!
//!
//! # Routes
//!
//! ## Login
//! - `POST /login/student`: email + registration number
//! - `POST /login/faculty`: email + password, role comes from the sheet
//!
//! ## Students
//! - `GET /students`: whole Students range
//! - `GET /students/class/{className}`: header + students in that class
//! - `GET /classes`: every class once, in sheet order
//!
//! ## Challenges
//! - `POST /addChallenge`: append one challenge, department must belong to some student
//! - `GET /challenges`: whole Challenges range
//! - `GET /challenges/{department}`: header + challenges for that department, `[]` for unknown departments
//!
//!
//!
//! # Matching
//!
//! Column names and filter values are compared trimmed and lowercased. What goes back to
//! the client is always the cell as it was typed into the sheet. Logins are the exception:
//! credentials are compared exactly.
//!
//!
//!
//! # Setup
//!
//! Service account credentials.
//! ```sh
//! export GOOGLE_CREDENTIALS="$(cat service-account.json)"
//! ```
//!
//! Or a pre-issued token for local work.
//! ```sh
//! export SHEETS_ACCESS_TOKEN="$(gcloud auth print-access-token)"
//! ```
//!
//! Run.
//! ```sh
//! RUST_LOG=info cargo run
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod challenges;
pub mod config;
pub mod error;
pub mod login;
pub mod routes;
pub mod service_account;
pub mod sheets;
pub mod state;
pub mod table;
pub mod utils;

use config::Config;
use error::StartupError;
use routes::{
    add_challenge_handler, challenges_by_department_handler, challenges_handler, classes_handler,
    faculty_login_handler, health_handler, student_login_handler, students_by_class_handler,
    students_handler,
};
use state::State;

pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/login/student", post(student_login_handler))
        .route("/login/faculty", post(faculty_login_handler))
        .route("/students", get(students_handler))
        .route("/students/class/{class_name}", get(students_by_class_handler))
        .route("/classes", get(classes_handler))
        .route("/addChallenge", post(add_challenge_handler))
        .route("/challenges", get(challenges_handler))
        .route("/challenges/{department}", get(challenges_by_department_handler))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), StartupError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config)?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
