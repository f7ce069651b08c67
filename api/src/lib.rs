pub mod access;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod expiring;
pub mod obfuscate_errors;
pub mod panic_handler;
pub mod provision;
pub mod routes;
pub mod shared_state;
pub mod thumbnail;
pub mod tiers;
pub mod tracing_config;

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{extract::DefaultBodyLimit, Extension, Router};
use thumbtier_db::{PgStore, Store};
use thumbtier_storage::ProviderConfig;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

pub use crate::error::Error;
use crate::{auth::auth_layer, obfuscate_errors::ObfuscateErrorLayer, shared_state::InnerState};

pub struct Server {
    pub host: String,
    pub port: u16,
    listener: TcpListener,
    app: Router,
}

impl Server {
    pub async fn run(self) -> Result<(), std::io::Error> {
        axum::serve(self.listener, self.app.into_make_service()).await
    }
}

/// Build the server around an existing store. Blobs live under `config.storage_root`.
pub async fn create_server(
    config: config::Config,
    store: Arc<dyn Store>,
) -> Result<Server, eyre::Report> {
    let production = config.env != "development" && !cfg!(debug_assertions);

    let blobs = ProviderConfig::Local {
        root: config.storage_root.clone(),
    }
    .create_operator()
    .await?;

    let sessions = auth::session_manager(
        store.clone(),
        config.session_cookie_name.clone(),
        config.cookie_key.as_deref(),
        config.session_expire_days,
    )?;

    let state = Arc::new(InnerState {
        store,
        blobs,
        sessions: sessions.clone(),
        media_url_base: config.media_url_base.clone(),
        detect_content_type: config.detect_content_type,
    });

    let app = routes::configure_routes(Router::new(), &config.media_url_base).layer(
        // Global middlewares
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(move |err| {
                panic_handler::handle_panic(production, err)
            }))
            .layer(ObfuscateErrorLayer::new(production))
            .compression()
            .set_x_request_id(MakeRequestUuid)
            .propagate_x_request_id()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO)),
            )
            .layer(DefaultBodyLimit::max(config.max_upload_size))
            .layer(CookieManagerLayer::new())
            .layer(Extension(state))
            .layer(auth_layer(sessions))
            .into_inner(),
    );

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();
    event!(Level::INFO, "Listening on {}:{}", config.host, port);

    Ok(Server {
        host: config.host,
        port,
        listener,
        app,
    })
}

/// Connect to Postgres, bring its schema up to date, and build the server on top of it.
pub async fn run_server(config: config::Config) -> Result<Server, eyre::Report> {
    let pool = thumbtier_db::connect(config.database_url.as_str(), config.db_connections)?;
    thumbtier_db::run_migrations(&pool).await?;

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    create_server(config, store).await
}
