mod completion;
mod config;
mod error;
mod telemetry;
mod web;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{error, info};

use completion::{CompletionService, OpenAiClient};
use config::Config;
use telemetry::{LogSink, Telemetry};
use web::routes;

// App state structure
pub struct AppState {
    pub completion: Arc<dyn CompletionService>,
    pub telemetry: Telemetry,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chat relay");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry = Telemetry::init(&config.app_name, Arc::new(LogSink::new()));

    let completion: Arc<dyn CompletionService> = Arc::new(OpenAiClient::from_config(&config));
    info!("Completion client initialized for model {}", config.model);

    let bind_addr = (config.host.clone(), config.port);
    let app_state = Data::new(AppState {
        completion,
        telemetry: telemetry.clone(),
        config,
    });

    info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    // Start web server
    let result = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}:{}", bind_addr.0, bind_addr.1))?
    .run()
    .await
    .context("server terminated with an error");

    telemetry.shutdown();
    result
}
