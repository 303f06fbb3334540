#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    AppId,
    BackendHealthCheckTimeout,
    BackendToken,
    #[strum(serialize = "backend-url")]
    BackendURL,
    BuildPollInterval,
    #[strum(serialize = "build-url")]
    BuildURL,
    ConfigFile,
    HistoryWindow,
    OutputDir,
    PersistDebounce,
    StoreDir,
    ThemeColor,
}

impl ConfigKey {
    /// Keys holding a count or a duration in milliseconds.
    pub fn is_numeric(&self) -> bool {
        return matches!(
            self,
            ConfigKey::BackendHealthCheckTimeout
                | ConfigKey::BuildPollInterval
                | ConfigKey::HistoryWindow
                | ConfigKey::PersistDebounce
        );
    }
}

fn project_dir(base: Option<path::PathBuf>) -> path::PathBuf {
    return base.unwrap_or_else(env::temp_dir).join("screenforge");
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    /// Reads a numeric key, failing with the key name when it is not a
    /// number.
    pub fn get_u64(key: ConfigKey) -> Result<u64> {
        let val = Config::get(key);
        match val.parse::<u64>() {
            Ok(num) => return Ok(num),
            Err(_) => bail!(format!("Config key '{key}' must be a number, got '{val}'")),
        }
    }

    pub fn default(key: ConfigKey) -> String {
        #[cfg(not(target_os = "macos"))]
        let config_path = project_dir(dirs::config_dir()).join("config.toml");
        #[cfg(target_os = "macos")]
        let config_path = project_dir(dirs::home_dir().map(|home| return home.join(".config")))
            .join("config.toml");

        let store_dir = project_dir(dirs::data_dir()).join("apps");

        let res = match key {
            ConfigKey::BackendHealthCheckTimeout => "1000".to_string(),
            ConfigKey::BackendToken => "".to_string(),
            ConfigKey::BackendURL => "http://localhost:8787".to_string(),
            ConfigKey::BuildPollInterval => "5000".to_string(),
            ConfigKey::BuildURL => "".to_string(),
            ConfigKey::HistoryWindow => "10".to_string(),
            ConfigKey::OutputDir => "./dist".to_string(),
            ConfigKey::PersistDebounce => "750".to_string(),
            ConfigKey::StoreDir => store_dir.to_string_lossy().to_string(),
            ConfigKey::ThemeColor => "#4f46e5".to_string(),

            // Special
            ConfigKey::AppId => "".to_string(),
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
        };

        return res;
    }

    /// The build service URL, falling back to the generation backend when
    /// unset.
    pub fn build_url() -> String {
        let url = Config::get(ConfigKey::BuildURL);
        if url.is_empty() {
            return Config::get(ConfigKey::BackendURL);
        }

        return url;
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for (name, _) in doc.iter() {
                if !cmd.get_arguments().any(|e| return e.get_long() == Some(name)) {
                    tracing::warn!(key = name, "Ignoring unknown config.toml key");
                }
            }

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        if val_int < 0 {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_int}"));
                        }
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if key.is_numeric() {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nExpected a number"));
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!("config.toml has an invalid value for key '{key}'"));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        for key in ConfigKey::iter().filter(|key| return key.is_numeric()) {
            Config::get_u64(key)?;
        }

        tracing::debug!(
            app_id = Config::get(ConfigKey::AppId),
            backend_url = Config::get(ConfigKey::BackendURL),
            build_url = Config::build_url(),
            store_dir = Config::get(ConfigKey::StoreDir),
            output_dir = Config::get(ConfigKey::OutputDir),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::AppId || key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();
                let description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<u64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
