use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    runtime: RuntimeConfig,
    #[serde(default)]
    ui: UiConfig,
}

#[derive(Deserialize, Default)]
struct RuntimeConfig {
    client_name: Option<String>,
    port_poll_interval_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct UiConfig {
    fps: Option<u16>,
}

pub struct Config {
    runtime: RuntimeConfig,
    ui: UiConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_runtime(&mut base.runtime, user.runtime);
                            merge_ui(&mut base.ui, user.ui);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            runtime: base.runtime,
            ui: base.ui,
        }
    }

    /// Client name registered with the MIDI backend.
    pub fn client_name(&self) -> &str {
        self.runtime.client_name.as_deref().unwrap_or("keywatch")
    }

    /// Port rescan interval in milliseconds (clamped to 100..10000).
    pub fn port_poll_interval_ms(&self) -> u64 {
        self.runtime
            .port_poll_interval_ms
            .unwrap_or(500)
            .clamp(100, 10_000)
    }

    /// Render rate in frames per second (clamped to 1..120).
    pub fn fps(&self) -> u16 {
        self.ui.fps.unwrap_or(30).clamp(1, 120)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("keywatch").join("config.toml"))
}

fn merge_runtime(base: &mut RuntimeConfig, user: RuntimeConfig) {
    if user.client_name.is_some() {
        base.client_name = user.client_name;
    }
    if user.port_poll_interval_ms.is_some() {
        base.port_poll_interval_ms = user.port_poll_interval_ms;
    }
}

fn merge_ui(base: &mut UiConfig, user: UiConfig) {
    if user.fps.is_some() {
        base.fps = user.fps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(default: &str, user: &str) -> Config {
        let mut base: ConfigFile = toml::from_str(default).unwrap();
        let user: ConfigFile = toml::from_str(user).unwrap();
        merge_runtime(&mut base.runtime, user.runtime);
        merge_ui(&mut base.ui, user.ui);
        Config {
            runtime: base.runtime,
            ui: base.ui,
        }
    }

    #[test]
    fn test_embedded_defaults() {
        let base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap();
        let config = Config {
            runtime: base.runtime,
            ui: base.ui,
        };
        assert_eq!(config.client_name(), "keywatch");
        assert_eq!(config.port_poll_interval_ms(), 500);
        assert_eq!(config.fps(), 30);
    }

    #[test]
    fn test_user_values_override() {
        let config = config_from(
            DEFAULT_CONFIG,
            "[runtime]\nport_poll_interval_ms = 1000\n[ui]\nfps = 60\n",
        );
        assert_eq!(config.port_poll_interval_ms(), 1000);
        assert_eq!(config.fps(), 60);
        // Untouched fields keep the embedded default
        assert_eq!(config.client_name(), "keywatch");
    }

    #[test]
    fn test_intervals_clamp() {
        let config = config_from(
            DEFAULT_CONFIG,
            "[runtime]\nport_poll_interval_ms = 5\n[ui]\nfps = 500\n",
        );
        assert_eq!(config.port_poll_interval_ms(), 100);
        assert_eq!(config.fps(), 120);
    }

    #[test]
    fn test_empty_user_config_keeps_defaults() {
        let config = config_from(DEFAULT_CONFIG, "");
        assert_eq!(config.port_poll_interval_ms(), 500);
        assert_eq!(config.fps(), 30);
    }
}
