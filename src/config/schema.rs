use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_OUTPUT_DIR: &str = "math_solver_output";

const CONFIG_DIR_NAME: &str = ".math-solver";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read from the environment only; never written back to disk.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    /// Load the config file (explicit path, else `~/.math-solver/config.toml`),
    /// then layer environment overrides on top.
    ///
    /// A missing default file is not an error; a missing explicit file is.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => Self::load_from_path(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|dirs| {
            dirs.home_dir()
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME)
        })
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::Load(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            let key = key.trim();
            if !key.is_empty() {
                self.api_key = Some(key.to_string());
            }
        }

        if let Ok(base_url) = std::env::var("ANTHROPIC_BASE_URL")
            && !base_url.trim().is_empty()
        {
            self.base_url = Some(base_url.trim().to_string());
        }

        if let Ok(model) = std::env::var("MATH_SOLVER_MODEL")
            && !model.trim().is_empty()
        {
            self.model = model.trim().to_string();
        }

        if let Ok(max_tokens) = std::env::var("MATH_SOLVER_MAX_TOKENS")
            && let Ok(max_tokens) = max_tokens.trim().parse::<u32>()
        {
            self.max_tokens = max_tokens;
        }

        if let Ok(output_dir) = std::env::var("MATH_SOLVER_OUTPUT_DIR")
            && !output_dir.is_empty()
        {
            self.output_dir = PathBuf::from(output_dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model must not be empty".into()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "max_tokens must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The credential is the one hard requirement for solving; checked before
    /// any client is built.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential {
                env_var: API_KEY_ENV,
            })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}
