use crate::application_port::FriendshipPolicy;
use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub identity: Identity,
    pub log: Log,
    pub store: Store,
    #[serde(default)]
    pub friendship: FriendshipPolicy,
    pub sweep: Sweep,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    pub backend: String, // "fake"
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    pub redis_dsn: Option<String>,
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,
    /// Off only for trusted single-tenant setups.
    #[serde(default = "default_enforce_rules")]
    pub enforce_rules: bool,
}

#[derive(Debug, Deserialize)]
pub struct Sweep {
    pub enabled: bool,
    pub interval_secs: u64,
}

fn default_redis_prefix() -> String {
    "bookshelf".to_string()
}

fn default_enforce_rules() -> bool {
    true
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    if settings.sweep.enabled && settings.sweep.interval_secs == 0 {
        return Err(anyhow!("sweep.interval_secs must be positive"));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_port::{AcceptPolicy, SendPolicy};

    #[test]
    fn parses_the_dev_settings() {
        let settings = parse_settings(Some(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/settings/dev.toml"
        )))
        .unwrap();
        assert_eq!(settings.store.backend, "memory");
        assert!(settings.store.enforce_rules);
        assert_eq!(settings.friendship.send_policy, SendPolicy::Guarded);
        assert_eq!(settings.friendship.accept_policy, AcceptPolicy::RequirePending);
    }

    #[test]
    fn release_settings_keep_the_permissive_policies() {
        let settings = parse_settings(Some(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/settings/release.toml"
        )))
        .unwrap();
        assert_eq!(settings.store.backend, "redis");
        assert_eq!(settings.friendship.send_policy, SendPolicy::Overwrite);
        assert_eq!(settings.friendship.accept_policy, AcceptPolicy::Lenient);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
