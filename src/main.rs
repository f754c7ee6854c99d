use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::io;

use todo_api::config::Config;
use todo_api::routes;
use todo_api::AppState;

fn startup_error<E: std::fmt::Display>(context: &str, error: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("invalid configuration", e))?;

    let pool = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await
                .map_err(|e| startup_error("failed to connect to database", e))?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| startup_error("failed to run migrations", e))?;
            log::info!("using postgres store");
            Some(pool)
        }
        None => {
            log::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            None
        }
    };

    let state = web::Data::new(AppState::from_config(&config, pool));

    log::info!("Starting todo-api server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(NormalizePath::trim())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_headers(vec!["x-auth"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
