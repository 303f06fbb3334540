#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli;
use crate::application::cli::Run;
use crate::application::commands;
use crate::application::repl::Repl;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::AppModel;
use crate::domain::models::ChatLog;
use crate::domain::models::Event;
use crate::domain::models::ExportTarget;
use crate::domain::models::GenerationBackend;
use crate::domain::models::SharedBuildBackend;
use crate::domain::models::SharedGenerationBackend;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::exporters::CloudApkExporter;
use crate::domain::services::BuildPoller;
use crate::domain::services::BuilderSession;
use crate::domain::services::Persistence;
use crate::infrastructure::artifacts::ArtifactWriter;
use crate::infrastructure::backends::CloudBuilds;
use crate::infrastructure::backends::HttpGenerator;
use crate::infrastructure::store::StoreManager;

fn handle_error(err: Error) {
    eprintln!(
            "{}",
            Paint::red(format!(
                "Oh no! Screenforge has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {:#}",
                env!("CARGO_PKG_VERSION"),
                env!("VERGEN_GIT_DESCRIBE"),
                err
            ))
        );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

async fn start_builder() -> Result<()> {
    let app_id = Config::get(ConfigKey::AppId);
    let store = StoreManager::get(&Config::get(ConfigKey::StoreDir));

    let model = match store.load_app(&app_id).await? {
        Some(stored) => AppModel::from_stored(stored),
        None => AppModel::new(&app_id),
    };
    let chat = ChatLog::from_messages(store.load_messages(&app_id).await?);
    tracing::info!(app_id = %app_id, screens = model.screens.len(), messages = chat.len(), "Opening app");

    let debounce = Duration::from_millis(Config::get_u64(ConfigKey::PersistDebounce)?);
    let (persistence, persistence_worker) = Persistence::start(store, debounce);

    let history_window = Config::get_u64(ConfigKey::HistoryWindow)? as usize;
    let session = BuilderSession::new(model, chat, history_window).with_persistence(persistence);

    let generator = HttpGenerator::default();
    if let Err(err) = generator.health_check().await {
        eprintln!(
            "{}",
            Paint::yellow(format!("{err}. Prompts will fail until the backend is up."))
        );
    }
    let generator: SharedGenerationBackend = Arc::new(generator);
    let builds: SharedBuildBackend = Arc::new(CloudBuilds::default());
    let poll_interval = Duration::from_millis(Config::get_u64(ConfigKey::BuildPollInterval)?);

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return ActionsService::start(
            generator,
            CloudApkExporter::new(builds.clone()),
            BuildPoller::new(builds, poll_interval),
            event_tx,
            &mut action_rx,
        )
        .await;
    });

    let repl = Repl::new(
        session,
        action_tx,
        ArtifactWriter::new(&Config::get(ConfigKey::OutputDir)),
        &Config::get(ConfigKey::ThemeColor),
    );

    let res = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = repl.start(event_rx) => res,
    );

    // The repl owned the last persistence handle, wait for the final flush.
    if let Err(err) = persistence_worker.await {
        tracing::error!(error = ?err, "Persistence worker panicked");
    }

    return res;
}

async fn run(mode: Run) -> Result<()> {
    let app_id = Config::get(ConfigKey::AppId);
    let store = StoreManager::get(&Config::get(ConfigKey::StoreDir));

    match mode {
        Run::Builder => return start_builder().await,
        Run::Build | Run::Export(ExportTarget::Apk) => {
            let interval = Duration::from_millis(Config::get_u64(ConfigKey::BuildPollInterval)?);
            commands::build_app(store, &app_id, Arc::new(CloudBuilds::default()), interval).await?;
            return Ok(());
        }
        Run::Export(target) => {
            let writer = ArtifactWriter::new(&Config::get(ConfigKey::OutputDir));
            let dir = commands::export_app(
                store,
                &app_id,
                target,
                &writer,
                &Config::get(ConfigKey::ThemeColor),
            )
            .await?;
            println!("{}", Paint::green(format!("Exported {target} to {}", dir.display())));
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() {
    better_panic::install();

    let debug_log_dir = env::var("SCREENFORGE_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("screenforge")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("screenforge")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let mode = match cli::parse().await {
        Ok(Some(mode)) => mode,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    if let Err(err) = run(mode).await {
        handle_error(err);
    }

    process::exit(0);
}
