use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ExportTarget;
use crate::domain::services::actions::help_text;

/// What the binary should do once configuration is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Run {
    Builder,
    Export(ExportTarget),
    Build,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

/// Short random id for a new app.
pub fn new_app_id() -> String {
    return uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_export() -> Command {
    return Command::new("export")
        .about("Exports a saved app without starting an interactive session.")
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .help("Export target. The apk target submits a cloud build and waits for it.")
                .num_args(1)
                .value_parser(PossibleValuesParser::new(ExportTarget::VARIANTS))
                .required(true),
        );
}

fn arg_env(key: ConfigKey) -> String {
    return format!(
        "SCREENFORGE_{}",
        key.to_string().to_uppercase().replace('-', "_")
    );
}

fn global_arg(key: ConfigKey, help: String) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(arg_env(key))
        .num_args(1)
        .help(help)
        .global(true);
}

fn with_default(help: &str, key: ConfigKey) -> String {
    return format!("{help} [default: {}]", Config::default(key));
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("PROMPTS:") {
                return Paint::new(format!("BUILDER {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("screenforge")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("builder").about("Start an interactive builder session. This is the default."))
        .subcommand(subcommand_export())
        .subcommand(Command::new("build").about("Submits a cloud APK build for a saved app and waits for it to finish."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(
            global_arg(ConfigKey::AppId, "The app to open. A new app is created when omitted.".to_string())
                .short('a'),
        )
        .arg(
            global_arg(ConfigKey::ConfigFile, with_default("Path to configuration file", ConfigKey::ConfigFile))
                .short('c'),
        )
        .arg(global_arg(
            ConfigKey::BackendURL,
            with_default("Generation backend URL.", ConfigKey::BackendURL),
        ))
        .arg(global_arg(
            ConfigKey::BackendToken,
            "Bearer token sent to the generation and build backends.".to_string(),
        ))
        .arg(global_arg(
            ConfigKey::BackendHealthCheckTimeout,
            with_default("Time to wait in milliseconds before timing out when health checking the generation backend.", ConfigKey::BackendHealthCheckTimeout),
        ))
        .arg(global_arg(
            ConfigKey::BuildURL,
            "Cloud build service URL. Defaults to the generation backend URL.".to_string(),
        ))
        .arg(global_arg(
            ConfigKey::BuildPollInterval,
            with_default("Milliseconds between cloud build status checks.", ConfigKey::BuildPollInterval),
        ))
        .arg(global_arg(
            ConfigKey::HistoryWindow,
            with_default("Number of recent chat messages sent with each prompt.", ConfigKey::HistoryWindow),
        ))
        .arg(
            global_arg(ConfigKey::OutputDir, with_default("Directory exports are written to.", ConfigKey::OutputDir))
                .short('o')
                .alias("out"),
        )
        .arg(global_arg(
            ConfigKey::PersistDebounce,
            with_default("Quiet period in milliseconds before app changes are saved.", ConfigKey::PersistDebounce),
        ))
        .arg(global_arg(
            ConfigKey::StoreDir,
            with_default("Directory apps and chat logs are saved in. Set to an empty string to keep them in memory only.", ConfigKey::StoreDir),
        ))
        .arg(global_arg(
            ConfigKey::ThemeColor,
            with_default("Theme color used by exported apps.", ConfigKey::ThemeColor),
        ));
}

fn require_app_id() -> Result<()> {
    if Config::get(ConfigKey::AppId).is_empty() {
        bail!("An app id is required, pass --app-id or set SCREENFORGE_APP_ID.");
    }

    return Ok(());
}

async fn load(matches: &ArgMatches, subcmd_matches: Option<&ArgMatches>) -> Result<()> {
    let mut all = vec![matches];
    if let Some(subcmd_matches) = subcmd_matches {
        all.push(subcmd_matches);
    }

    return Config::load(build(), all).await;
}

pub async fn parse() -> Result<Option<Run>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("export", subcmd_matches)) => {
            load(&matches, Some(subcmd_matches)).await?;
            require_app_id()?;

            let target = match subcmd_matches.get_one::<String>("target") {
                Some(target) => target.parse::<ExportTarget>()?,
                None => ExportTarget::Static,
            };
            return Ok(Some(Run::Export(target)));
        }
        Some(("build", subcmd_matches)) => {
            load(&matches, Some(subcmd_matches)).await?;
            require_app_id()?;
            return Ok(Some(Run::Build));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("builder", subcmd_matches)) => {
            load(&matches, Some(subcmd_matches)).await?;
        }
        _ => {
            load(&matches, None).await?;
        }
    }

    if Config::get(ConfigKey::AppId).is_empty() {
        Config::set(ConfigKey::AppId, &new_app_id());
    }

    return Ok(Some(Run::Builder));
}
