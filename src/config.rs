use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

const CONFIG_PATH: &str = "config.json";

/// Runtime configuration, read from `config.json` in the working directory
/// when present, with CLI flags taking precedence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback speed multiplier; must be positive.
    pub speed: f64,
    /// Delay between a start trigger and the first event.
    pub start_delay_ms: u64,
    /// Name substring of a MIDI output port to audition notes on.
    pub midi_output: Option<String>,
    pub osc: OscConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    pub enabled: bool,
    pub listening_host: String,
    pub listening_port: u16,
    pub toggle_path: String,
    pub exit_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            speed: 1.0,
            start_delay_ms: 1000,
            midi_output: None,
            osc: OscConfig::default(),
        }
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        OscConfig {
            enabled: false,
            listening_host: "0.0.0.0".to_string(),
            listening_port: 9069,
            toggle_path: "/lyre/toggle".to_string(),
            exit_path: "/lyre/exit".to_string(),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load `config.json` if present, apply CLI overrides, validate, and store
/// the process-wide configuration. Call once at startup.
pub fn init(
    speed: Option<f64>,
    midi_out: Option<String>,
    osc: bool,
) -> Result<&'static Config, Box<dyn Error>> {
    let mut cfg = load_file(Path::new(CONFIG_PATH))?;
    if let Some(s) = speed {
        cfg.speed = s;
    }
    if let Some(port) = midi_out {
        cfg.midi_output = Some(port);
    }
    if osc {
        cfg.osc.enabled = true;
    }
    validate(&cfg)?;
    Ok(CONFIG.get_or_init(|| cfg))
}

/// Access the process-wide configuration (defaults if `init` was never run).
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

fn load_file(path: &Path) -> Result<Config, Box<dyn Error>> {
    if path.exists() {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(Config::default())
    }
}

fn validate(cfg: &Config) -> Result<(), Box<dyn Error>> {
    // Rejects NaN as well
    if !(cfg.speed > 0.0) {
        return Err(format!("speed must be positive (got {})", cfg.speed).into());
    }
    Ok(())
}
