use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::UserId, errors::Error, formatting::ColorFilter, Result};

/// Typed configuration for the bot, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub super_admins: Vec<UserId>,

    // RCON
    pub rcon_host: String,
    pub rcon_port: u16,
    pub rcon_password: String,
    pub rcon_timeout: Duration,

    // Persistence
    pub allowed_file: PathBuf,
    pub images_file: PathBuf,
    pub images_dir: PathBuf,

    // Output
    pub color_filter: ColorFilter,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let telegram_bot_token = get("TG_TOKEN").ok_or_else(|| {
            Error::Config("TG_TOKEN environment variable is required".to_string())
        })?;
        let rcon_password = get("RCON_PASSWORD").ok_or_else(|| {
            Error::Config("RCON_PASSWORD environment variable is required".to_string())
        })?;

        let super_admins = parse_csv_ids(get("SUPER_ADMINS").as_deref())?;

        let rcon_host = get("RCON_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let rcon_port = match get("RCON_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!("RCON_PORT must be a port number, got {raw:?}"))
            })?,
            None => 25575,
        };
        let rcon_timeout = match get("RCON_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(Error::Config(format!(
                        "RCON_TIMEOUT_MS must be a positive number of milliseconds, got {raw:?}"
                    )))
                }
            },
            None => Duration::from_secs(10),
        };

        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let allowed_file = get("ALLOWED_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("allowed.json"));
        let images_file = get("IMAGES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("images.json"));
        let images_dir = get("IMAGES_DIR").map(PathBuf::from).unwrap_or(data_dir);

        let color_filter = if get("STRIP_ONLY_GOLD").as_deref().is_some_and(is_truthy) {
            ColorFilter::GoldOnly
        } else {
            ColorFilter::All
        };

        Ok(Self {
            telegram_bot_token,
            super_admins,
            rcon_host,
            rcon_port,
            rcon_password,
            rcon_timeout,
            allowed_file,
            images_file,
            images_dir,
            color_filter,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim();
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = &val[1..val.len() - 1];
        }

        env::set_var(key, val);
    }
}

fn is_truthy(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_csv_ids(v: Option<&str>) -> Result<Vec<UserId>> {
    v.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<UserId>()
                .map_err(|_| Error::Config(format!("SUPER_ADMINS contains an invalid id: {s:?}")))
        })
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
