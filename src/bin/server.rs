use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use seat_planner::interleave::sort_for_seating;
use seat_planner::planner::{Plan, plan};
use seat_planner::types::{AdjacencyMode, Classroom, DEFAULT_DEADLINE, Person, SeatingOptions};
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize)]
struct ArrangeRequest {
    people: Vec<Person>,
    classrooms: Vec<Classroom>,
    #[serde(default)]
    adjacency: AdjacencyMode,
    #[serde(default = "default_deadline_ms")]
    deadline_ms: u64,
    #[serde(default)]
    keep_order: bool,
}

fn default_deadline_ms() -> u64 {
    DEFAULT_DEADLINE.as_millis() as u64
}

async fn arrange(Json(req): Json<ArrangeRequest>) -> Result<Json<Plan>, (StatusCode, String)> {
    tracing::info!(
        people = req.people.len(),
        classrooms = req.classrooms.len(),
        adjacency = ?req.adjacency,
        deadline_ms = req.deadline_ms,
        "POST /arrange"
    );

    if req.classrooms.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "no classrooms selected".to_string(),
        ));
    }
    for room in &req.classrooms {
        room.grid().validate().map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("classroom '{}': {}", room.name, e),
            )
        })?;
    }

    let options = SeatingOptions {
        adjacency: req.adjacency,
        deadline: Duration::from_millis(req.deadline_ms),
    };
    let ArrangeRequest {
        mut people,
        classrooms,
        keep_order,
        ..
    } = req;

    // Each classroom may spend the full deadline searching.
    let result = tokio::task::spawn_blocking(move || {
        if !keep_order {
            sort_for_seating(&mut people);
        }
        plan(&people, &classrooms, options)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "seating task failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "seating generation failed".to_string(),
        )
    })?;

    Ok(Json(result))
}

#[tokio::main]
async fn main() {
    let _sentry = sentry::init(sentry::ClientOptions {
        dsn: std::env::var("SENTRY_DSN").ok().and_then(|dsn| dsn.parse().ok()),
        release: sentry::release_name!(),
        ..Default::default()
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/arrange", post(arrange))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
