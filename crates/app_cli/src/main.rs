mod files;
mod input;
mod render;
mod repl;

use std::sync::Arc;
use std::{fs, path::Path};

use backend_http::HttpBackend;
use config::{AppConfig, ConfigStore};
use core_session::Session;
use i18n::I18n;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::input::StdinPrompt;

fn main() {
    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    data_dir.push("askdoc");
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    let config_store = ConfigStore::from_dir(data_dir.join("config"));
    let config = match config_store.load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to load config: {err}");
            AppConfig::default()
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to create tokio runtime: {err}");
            return;
        }
    };

    if let Err(err) = runtime.block_on(run(config)) {
        error!("askdoc exited with error: {err:#}");
        eprintln!("{err:#}");
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    info!(base_url = %backend.base_url(), "backend configured");

    let i18n = I18n::new(config.language);
    let lines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let prompt = Arc::new(StdinPrompt::new(lines.clone()));
    let session = Arc::new(Session::new(Arc::new(backend), prompt, i18n.clone()));

    let printer = tokio::spawn(render::print_events(session.subscribe(), i18n.clone()));
    println!("{}", render::header(&i18n, config.upload.advisory_max_mb));
    if let Some(greeting) = session.messages().first() {
        println!("{}", render::message(&i18n, greeting));
    }
    session.start().await;

    repl::run(session, lines).await;
    printer.abort();
    Ok(())
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "askdoc.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,app_cli=debug,core_session=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
