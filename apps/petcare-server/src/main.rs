//! PetCare server binary.
//!
//! Wires every domain module over one database connection, mounts their
//! REST routers under the legacy `/api/*` prefixes and serves them with
//! request-id, tracing, audit, timeout, CORS and body-limit middleware.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use axum::{middleware::from_fn, routing::get, Extension, Json, Router};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

use apikit::auth::{TokenSigner, TokenVerifier};
use apikit::DirectoryClient;
use runtime::{AppConfig, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "petcare-server")]
#[command(about = "PetCare Server - pet sitting marketplace backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Run,
    /// Load and validate the configuration, then exit
    Check,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PetCare API",
        description = "Accounts, client and caregiver profiles, booking requests, ratings and payments for the PetCare marketplace."
    ),
    paths(
        auth::api::rest::handlers::register,
        auth::api::rest::handlers::login,
        auth::api::rest::handlers::me,
        auth::api::rest::handlers::request_reset,
        auth::api::rest::handlers::confirm_reset,
        auth::api::rest::handlers::change_password,
        auth::api::rest::handlers::directory_get,
        auth::api::rest::handlers::directory_batch,
        auth::api::rest::handlers::bootstrap,
        auth::api::rest::handlers::admin_register,
        auth::api::rest::handlers::admin_list,
        auth::api::rest::handlers::admin_get,
        auth::api::rest::handlers::admin_set_role,
        auth::api::rest::handlers::admin_lock,
        auth::api::rest::handlers::admin_unlock,
        auth::api::rest::handlers::admin_delete,
        clients::api::rest::handlers::create,
        clients::api::rest::handlers::list,
        clients::api::rest::handlers::update_own,
        clients::api::rest::handlers::delete_own,
        clients::api::rest::handlers::get,
        clients::api::rest::handlers::get_by_user,
        clients::api::rest::handlers::verify,
        caregivers::api::rest::handlers::create,
        caregivers::api::rest::handlers::list,
        caregivers::api::rest::handlers::update_own,
        caregivers::api::rest::handlers::delete_own,
        caregivers::api::rest::handlers::get,
        caregivers::api::rest::handlers::get_by_user,
        caregivers::api::rest::handlers::verify,
        caregivers::api::rest::handlers::set_rating,
        bookings::api::rest::handlers::create,
        bookings::api::rest::handlers::mine,
        bookings::api::rest::handlers::assigned,
        bookings::api::rest::handlers::get,
        bookings::api::rest::handlers::change_status,
        bookings::api::rest::handlers::pay,
        bookings::api::rest::handlers::rate,
        ratings::api::rest::handlers::create,
        ratings::api::rest::handlers::list_for_caregiver,
        ratings::api::rest::handlers::average,
        payments::api::rest::handlers::create_order,
        payments::api::rest::handlers::save_card,
        payments::api::rest::handlers::my_cards,
        payments::api::rest::handlers::delete_card,
    ),
    tags(
        (name = "auth", description = "Registration, login and password management"),
        (name = "admin", description = "User administration"),
        (name = "clients", description = "Client profiles"),
        (name = "caregivers", description = "Caregiver profiles"),
        (name = "bookings", description = "Booking requests and their lifecycle"),
        (name = "ratings", description = "Caregiver ratings"),
        (name = "payments", description = "PayPal orders and saved cards"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered loading treats a missing file as "no overrides", which is
    // wrong for an explicitly named one.
    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
    }

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.display().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(args.config.as_deref())
        .context("failed to load configuration")?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging = config
        .logging
        .clone()
        .unwrap_or_else(runtime::config::default_logging_config);
    runtime::init_logging_from_config(&logging, Path::new(&config.server.home_dir));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    let _: auth::AuthConfig = config.module_config("auth")?;
    let _: clients::ClientsConfig = config.module_config("clients")?;
    let _: caregivers::CaregiversConfig = config.module_config("caregivers")?;
    let _: payments::PaymentsConfig = config.module_config("payments")?;
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "PetCare server starting");

    let db = connect_database(&config).await?;
    run_migrations(&db).await?;

    let app = build_app(&config, db)?;

    let bind = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = wait_for_shutdown().await {
                tracing::error!(error = %e, "failed to listen for shutdown signals");
            }
            tracing::info!("shutting down gracefully");
        })
        .await
        .context("HTTP server error")
}

async fn connect_database(config: &AppConfig) -> Result<DatabaseConnection> {
    let database = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("database configuration is required"))?;

    let mut url = database.url.trim().to_owned();
    if url.is_empty() {
        bail!("database URL is empty");
    }
    if url.starts_with("sqlite:") {
        url = absolutize_sqlite_url(&url, Path::new(&config.server.home_dir))?;
    }

    let opts = db::ConnectOpts {
        url,
        max_conns: database.max_conns.unwrap_or(10),
        busy_timeout_ms: database.busy_timeout_ms,
    };
    tracing::info!(url = %opts.url, "connecting to database");
    db::connect(&opts).await
}

async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let runner = db::MigrationRunner::default();
    runner.run::<auth::Migrator>(conn, "auth").await?;
    runner.run::<clients::Migrator>(conn, "clients").await?;
    runner.run::<caregivers::Migrator>(conn, "caregivers").await?;
    runner.run::<bookings::Migrator>(conn, "bookings").await?;
    runner.run::<ratings::Migrator>(conn, "ratings").await?;
    runner.run::<payments::Migrator>(conn, "payments").await?;
    Ok(())
}

fn build_app(config: &AppConfig, db: DatabaseConnection) -> Result<Router> {
    let auth_cfg: auth::AuthConfig = config.module_config("auth")?;
    let clients_cfg: clients::ClientsConfig = config.module_config("clients")?;
    let caregivers_cfg: caregivers::CaregiversConfig = config.module_config("caregivers")?;
    let payments_cfg: payments::PaymentsConfig = config.module_config("payments")?;

    let verifier = TokenVerifier::new(&auth_cfg.jwt);
    let signer = TokenSigner::new(&auth_cfg.jwt);

    let auth_service = Arc::new(auth::Service::new(
        Arc::new(auth::SeaOrmAuthRepository::new(db.clone())),
        signer,
        auth_cfg,
    ));

    let clients_service = Arc::new(clients::Service::new(Arc::new(
        clients::SeaOrmClientsRepository::new(db.clone()),
    )));
    let clients_directory = Arc::new(DirectoryClient::new(&clients_cfg.directory)?);

    let caregivers_service = Arc::new(caregivers::Service::new(Arc::new(
        caregivers::SeaOrmCaregiversRepository::new(db.clone()),
    )));
    let caregivers_directory = Arc::new(DirectoryClient::new(&caregivers_cfg.directory)?);
    let caregivers_api: Arc<dyn caregivers::CaregiversApi> = Arc::new(
        caregivers::CaregiversLocalClient::new(caregivers_service.clone()),
    );

    let bookings_service = Arc::new(bookings::Service::new(
        Arc::new(bookings::SeaOrmBookingsRepository::new(db.clone())),
        caregivers_api.clone(),
    ));
    let bookings_api: Arc<dyn bookings::BookingsApi> =
        Arc::new(bookings::BookingsLocalClient::new(bookings_service.clone()));

    let ratings_service = Arc::new(ratings::Service::new(
        Arc::new(ratings::SeaOrmRatingsRepository::new(db.clone())),
        bookings_api.clone(),
        caregivers_api,
    ));

    let payments_service = Arc::new(payments::Service::new(
        Arc::new(payments::SeaOrmCardsRepository::new(db)),
        payments::PayPalClient::new(&payments_cfg.paypal)?,
        payments::CardVault::new(&payments_cfg.cards)?,
        bookings_api,
    ));

    let timeout = match config.server.timeout_sec {
        0 => Duration::from_secs(30),
        secs => Duration::from_secs(secs),
    };

    let openapi = ApiDoc::openapi();

    // Layers run top-down on requests in the reverse of the order they
    // are added: request-id first, then trace, verifier, audit,
    // timeout, CORS and the body limit.
    let app = Router::new()
        .route("/health", get(health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { Json(openapi.clone()) }),
        )
        .nest("/api/auth", auth::api::rest::router(auth_service.clone()))
        .nest("/api/admin", auth::api::rest::admin_router(auth_service))
        .nest(
            "/api/clientes",
            clients::api::rest::router(clients_service, clients_directory),
        )
        .nest(
            "/api/cuidadores",
            caregivers::api::rest::router(caregivers_service, caregivers_directory),
        )
        .nest(
            "/api/solicitudes",
            bookings::api::rest::router(bookings_service),
        )
        .nest(
            "/api/calificaciones",
            ratings::api::rest::router(ratings_service),
        )
        .nest("/api/pagos", payments::api::rest::router(payments_service))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(timeout))
        .layer(from_fn(apikit::audit::log_mutations))
        .layer(Extension(verifier))
        .layer(from_fn(apikit::request_id::propagate_request_id))
        .layer(apikit::request_id::create_trace_layer())
        .layer(PropagateRequestIdLayer::new(apikit::request_id::header()))
        .layer(SetRequestIdLayer::new(
            apikit::request_id::header(),
            apikit::request_id::MakeReqId,
        ));

    Ok(app)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "petcare-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Expands a sqlite URL to an absolute path under `base_dir`, creating
/// parent directories. File URLs without a query gain `mode=rwc` so the
/// first start creates the database file.
fn absolutize_sqlite_url(url: &str, base_dir: &Path) -> Result<String> {
    if url.eq_ignore_ascii_case("sqlite::memory:") || url.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_owned());
    }

    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .ok_or_else(|| anyhow!("not a sqlite URL: {url}"))?;
    let (path_part, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_part.is_empty() {
        bail!("sqlite URL has an empty path: {url}");
    }

    let mut path = PathBuf::from(path_part);
    if path.is_relative() {
        path = base_dir.join(path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let mut out = format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::absolutize_sqlite_url;
    use std::path::Path;

    #[test]
    fn memory_urls_pass_through() {
        let out = absolutize_sqlite_url("sqlite::memory:", Path::new("/tmp")).unwrap();
        assert_eq!(out, "sqlite::memory:");
    }

    #[test]
    fn relative_paths_land_under_the_base_dir() {
        let base = tempfile::tempdir().unwrap();
        let url = absolutize_sqlite_url("sqlite://database/petcare.db", base.path()).unwrap();
        let base_str = base.path().to_string_lossy().replace('\\', "/");
        assert_eq!(
            url,
            format!("sqlite://{base_str}/database/petcare.db?mode=rwc")
        );
        assert!(base.path().join("database").is_dir());
    }

    #[test]
    fn explicit_queries_are_kept() {
        let base = tempfile::tempdir().unwrap();
        let url =
            absolutize_sqlite_url("sqlite://petcare.db?mode=ro", base.path()).unwrap();
        assert!(url.ends_with("petcare.db?mode=ro"));
    }

    #[test]
    fn non_sqlite_urls_are_rejected() {
        assert!(absolutize_sqlite_url("postgres://localhost/app", Path::new("/tmp")).is_err());
    }
}
