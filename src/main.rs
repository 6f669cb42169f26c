use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use gigflow_backend::auth::TokenVerifier;
use gigflow_backend::cache::{GigCache, RedisCache};
use gigflow_backend::config::AppConfig;
use gigflow_backend::create_pool;
use gigflow_backend::handlers;
use gigflow_backend::notify::{Presence, PresenceHub};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(std::io::Error::other)?;
        tracing::info!("Migrations applied");
    }
    let db_data = web::Data::new(db);

    // Redis is optional; without it gig lookups always go to the database.
    let redis = match &config.redis_url {
        Some(url) => match RedisCache::new(url).await {
            Ok(cache) => {
                tracing::info!("Connected to Redis");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, gig cache disabled");
                None
            }
        },
        None => None,
    };
    let gig_cache = web::Data::new(GigCache::new(redis, config.gig_cache_ttl));

    let verifier = web::Data::new(Arc::new(TokenVerifier::from_source(&config.token_source)));

    let presence: Arc<dyn Presence> = Arc::new(PresenceHub::new());
    let presence_data = web::Data::new(presence);

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(gig_cache.clone())
            .app_data(verifier.clone())
            .app_data(presence_data.clone())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
