use std::sync::Arc;

use actix_files as fs;
use actix_web::{middleware, web::Data, App, HttpServer};
use anyhow::Context as _;
use dotenv::dotenv;
use log::{error, info};
use tera::Tera;

use groq_chat_relay::config::Config;
use groq_chat_relay::model::GroqModel;
use groq_chat_relay::store::SqliteChatStore;
use groq_chat_relay::web::routes;
use groq_chat_relay::AppState;

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store = SqliteChatStore::open(&config.database_path)
        .with_context(|| format!("failed to open chat database at {}", config.database_path))?;
    info!("Chat history stored in {}", config.database_path);

    let model = GroqModel::new(config.upstream.clone()).context("failed to build HTTP client")?;

    // Initialize template engine
    let mut tera = Tera::new(&format!("{}/**/*", config.templates_dir))
        .with_context(|| format!("template parsing error in {}", config.templates_dir))?;
    tera.autoescape_on(vec![".html"]);

    Ok(AppState::new(tera, Arc::new(model), Arc::new(store)))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Groq chat relay");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let app_state = match build_state(&config) {
        Ok(state) => Data::new(state),
        Err(e) => {
            error!("Startup failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let static_dir = config.static_dir.clone();
    info!("Listening on {}:{}", config.host, config.port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(routes::cors())
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
