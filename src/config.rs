/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing file or missing keys fall back to defaults; a file that exists
/// but cannot be read or parsed is reported as a `ConfigError` so the host
/// can log it and carry on with defaults.
///
/// Only host-side knobs live here (tick rate, gamepad mapping, logging)
/// plus the two rule policies and the RNG seed. Gameplay tuning is fixed.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::domain::ai::AttackPick;
use crate::domain::rules::{KeyDropPolicy, KEY_DROP_NTH_KILL};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown value {value:?} for {key}")]
    UnknownValue { key: &'static str, value: String },
}

// ── Public Config Struct ──

#[derive(Clone, Debug, Default)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
}

/// Rule policies the world is built with.
#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub key_drop: KeyDropPolicy,
    pub boss_pick: AttackPick,
    /// 0 means "derive from the clock" (see `resolve_seed`).
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub attack: Vec<String>,
    pub interact: Vec<String>,
    pub quit: Vec<String>,
    pub restart: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig { key_drop: KeyDropPolicy::EliteDeath, boss_pick: AttackPick::Random, seed: 0 }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        let t = TomlGamepad::default();
        GamepadConfig { jump: t.jump, attack: t.attack, interact: t.interact, quit: t.quit, restart: t.restart }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { file: PathBuf::from(default_log_file()), filter: default_log_filter() }
    }
}

impl RulesConfig {
    /// The configured seed, or a clock-derived one when it is 0.
    pub fn resolve_seed(&self) -> u64 {
        if self.seed != 0 { return self.seed; }
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
            .max(1)
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_key_drop")]
    key_drop: String,
    #[serde(default = "default_boss_pick")]
    boss_pick: String,
    #[serde(default)]
    seed: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_attack")]
    attack: Vec<String>,
    #[serde(default = "default_interact")]
    interact: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_filter")]
    filter: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }     // ~60 Hz
fn default_key_drop() -> String { "elite".into() }
fn default_boss_pick() -> String { "random".into() }

fn default_jump() -> Vec<String> { vec!["A".into()] }
fn default_attack() -> Vec<String> { vec!["X".into()] }
fn default_interact() -> Vec<String> { vec!["Y".into(), "B".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }

fn default_log_file() -> String { "dragonkeep.log".into() }
fn default_log_filter() -> String { "info".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules { key_drop: default_key_drop(), boss_pick: default_boss_pick(), seed: 0 }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            attack: default_attack(),
            interact: default_interact(),
            quit: default_quit(),
            restart: default_restart(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), filter: default_log_filter() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load `config.toml` from the first candidate directory that has one.
    /// No file at all is not an error: defaults are returned.
    pub fn load() -> Result<Self, ConfigError> {
        match candidate_dirs().iter().map(|d| d.join(CONFIG_FILE)).find(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => Ok(GameConfig::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let t: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig {
            timing: TimingConfig { tick_rate_ms: t.timing.tick_rate_ms.max(1) },
            rules: RulesConfig {
                key_drop: parse_key_drop(&t.rules.key_drop)?,
                boss_pick: parse_boss_pick(&t.rules.boss_pick)?,
                seed: t.rules.seed,
            },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                attack: t.gamepad.attack,
                interact: t.gamepad.interact,
                quit: t.gamepad.quit,
                restart: t.gamepad.restart,
            },
            log: LogConfig { file: PathBuf::from(t.log.file), filter: t.log.filter },
        })
    }
}

fn parse_key_drop(value: &str) -> Result<KeyDropPolicy, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "elite" => Ok(KeyDropPolicy::EliteDeath),
        "sixth_kill" => Ok(KeyDropPolicy::NthKill(KEY_DROP_NTH_KILL)),
        _ => Err(ConfigError::UnknownValue { key: "rules.key_drop", value: value.into() }),
    }
}

fn parse_boss_pick(value: &str) -> Result<AttackPick, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "random" => Ok(AttackPick::Random),
        "priority" => Ok(AttackPick::Priority),
        _ => Err(ConfigError::UnknownValue { key: "rules.boss_pick", value: value.into() }),
    }
}

/// Candidate directories to search: exe dir, then CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}
