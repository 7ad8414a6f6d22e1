use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use anyhow::{bail, Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vacancy_analytics_service::consumers::TaskTriggerConsumer;
use vacancy_analytics_service::repository::{PgAnalyticsStore, PgVacancySource};
use vacancy_analytics_service::{metrics, AnalyticsBuildJob, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// HTTP health endpoints plus the scheduled-task consumer
    Serve,
    /// One analytics build, then exit
    RunOnce,
}

fn parse_mode() -> Result<Mode> {
    let args: Vec<String> = std::env::args().collect();
    let mut mode = Mode::Serve;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" => {
                let value = args.get(i + 1).context("--mode requires a value")?;
                mode = match value.as_str() {
                    "serve" => Mode::Serve,
                    "run-once" => Mode::RunOnce,
                    other => bail!("unknown mode: {} (expected serve or run-once)", other),
                };
                i += 2;
            }
            "--help" | "-h" => {
                println!("Usage: vacancy-analytics-service [--mode serve|run-once]");
                std::process::exit(0);
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok(mode)
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vacancy_analytics_service=debug".into()),
        )
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

async fn ready(pool: web::Data<PgPool>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().body("READY"),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().body("NOT READY")
        }
    }
}

async fn metrics_handler() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::gather_text())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mode = parse_mode()?;
    info!("Starting vacancy-analytics-service ({:?})", mode);

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        currency = %config.analytics.currency,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database.url)
        .await
        .context("Failed to create database pool")?;
    info!("Database pool created successfully");

    let job = Arc::new(AnalyticsBuildJob::new(
        Arc::new(PgVacancySource::new(
            pool.clone(),
            config.analytics.currency.clone(),
        )),
        Arc::new(PgAnalyticsStore::new(pool.clone())),
    ));

    if mode == Mode::RunOnce {
        let stats = job.run().await.context("Analytics build failed")?;
        info!(
            inserted = stats.inserted,
            updated = stats.updated,
            "Analytics build finished"
        );
        return Ok(());
    }

    match config.trigger.clone() {
        Some(trigger) => {
            let consumer = TaskTriggerConsumer::new(Arc::clone(&job), trigger);
            tokio::spawn(consumer.run());
        }
        None => warn!("KAFKA_BROKERS not set; scheduled-task consumer disabled"),
    }

    info!(
        "Starting HTTP server on {}:{}",
        config.app.host, config.app.http_port
    );

    let pool_data = web::Data::new(pool);
    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .route("/health", web::get().to(health))
            .route("/ready", web::get().to(ready))
            .route("/metrics", web::get().to(metrics_handler))
    })
    .bind((config.app.host.as_str(), config.app.http_port))
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .map_err(|e| {
        error!("HTTP server error: {}", e);
        e
    })
    .context("HTTP server error")
}
