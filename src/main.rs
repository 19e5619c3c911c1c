mod availability;
mod clients;
mod config;
mod db;
mod error;
mod mailer;
mod models;
mod reconcile;
mod reminder;
mod reservations;
mod routes;
mod scheduler;
mod state;
mod store;
#[cfg(test)]
mod testkit;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio_util::sync::CancellationToken;

use crate::clients::ClientStore;
use crate::config::Config;
use crate::mailer::{LogMailer, Mailer, SmtpMailer};
use crate::state::AppState;
use crate::store::MongoStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    db::ensure_sqlite_dir(&config.database_url)?;
    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;
    db::run_migrations(&pool).await?;

    let store = Arc::new(MongoStore::connect(&config.mongo_url, &config.mongo_db).await?);
    db::seed_default_owner(store.as_ref()).await?;

    let mailer: Arc<dyn Mailer> = match SmtpMailer::from_env()? {
        Some(mailer) => Arc::new(mailer),
        None => {
            log::warn!("MAIL_USERNAME/MAIL_PASSWORD not set; reminders will not be delivered");
            Arc::new(LogMailer)
        }
    };

    let state = AppState {
        store,
        clients: ClientStore::new(pool),
        mailer,
        horizon_days: config.horizon_days,
    };

    let shutdown = CancellationToken::new();

    let calendar_state = state.clone();
    let calendar_task = scheduler::spawn_recurring(
        "calendar",
        Duration::from_secs(24 * 60 * 60),
        shutdown.child_token(),
        move || {
            let state = calendar_state.clone();
            async move {
                let today = chrono::Local::now().date_naive();
                match availability::extend_all(state.store.as_ref(), today, state.horizon_days).await {
                    Ok(appended) => {
                        if appended > 0 {
                            log::info!("calendar extended by {appended} day(s)");
                        }
                    }
                    Err(err) => log::error!("calendar extension failed: {err}"),
                }
            }
        },
    );

    let reminder_state = state.clone();
    let reminder_task = scheduler::spawn_recurring(
        "reminders",
        Duration::from_secs(config.reminder_interval_minutes * 60),
        shutdown.child_token(),
        move || {
            let state = reminder_state.clone();
            async move {
                match reminder::tick(&state).await {
                    Ok(stats) => log::info!(
                        "reminder tick: {} sent, {} skipped, {} failed",
                        stats.sent,
                        stats.skipped,
                        stats.failed
                    ),
                    Err(err) => log::error!("reminder tick failed: {err}"),
                }
            }
        },
    );

    let address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting Valiant booking API on http://{address}");

    let allowed_origin = config.allowed_origin.clone();
    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials(),
            None => Cors::permissive(),
        };
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .configure(routes::public::configure)
            .configure(routes::admin::configure)
    })
    .bind(address)?
    .run()
    .await?;

    shutdown.cancel();
    let _ = calendar_task.await;
    let _ = reminder_task.await;

    Ok(())
}
