use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest user message accepted when nothing else is configured.
pub const DEFAULT_MAX_USER_INPUT_CHARACTERS: i64 = 420;

const CONFIG_FILE_NAME: &str = "dialogue-commands.toml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Custom prompt template. The built-in template is used when unset.
    pub prompt_template: Option<PathBuf>,
    pub user_input: UserInputConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserInputConfig {
    /// A negative limit disables the length check.
    pub max_characters: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub prompt_template: Option<PathBuf>,
    pub max_characters: Option<i64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("could not read prompt template `{path}`: {source}")]
    ReadTemplate { path: PathBuf, source: std::io::Error },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for UserInputConfig {
    fn default() -> Self {
        Self { max_characters: DEFAULT_MAX_USER_INPUT_CHARACTERS }
    }
}

impl UserInputConfig {
    pub fn is_unlimited(&self) -> bool {
        self.max_characters < 0
    }

    /// True when `text` is longer than the configured character budget.
    pub fn exceeds_limit(&self, text: &str) -> bool {
        if self.is_unlimited() {
            return false;
        }
        let length = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
        length > self.max_characters
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prompt_template: None,
            user_input: UserInputConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl GeneratorConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Contents of the configured prompt template, if one is configured.
    pub fn read_prompt_template(&self) -> Result<Option<String>, ConfigError> {
        let Some(path) = &self.prompt_template else {
            return Ok(None);
        };
        fs::read_to_string(path)
            .map(Some)
            .map_err(|source| ConfigError::ReadTemplate { path: path.clone(), source })
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(prompt_template) = patch.prompt_template {
            self.prompt_template = Some(prompt_template);
        }

        if let Some(user_input) = patch.user_input {
            if let Some(max_characters) = user_input.max_characters {
                self.user_input.max_characters = max_characters;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DIALOGUE_COMMANDS_PROMPT_TEMPLATE") {
            self.prompt_template = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("DIALOGUE_COMMANDS_USER_INPUT_MAX_CHARACTERS") {
            self.user_input.max_characters =
                parse_i64("DIALOGUE_COMMANDS_USER_INPUT_MAX_CHARACTERS", &value)?;
        }
        if let Some(value) = read_env("DIALOGUE_COMMANDS_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("DIALOGUE_COMMANDS_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(prompt_template) = overrides.prompt_template {
            self.prompt_template = Some(prompt_template);
        }
        if let Some(max_characters) = overrides.max_characters {
            self.user_input.max_characters = max_characters;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_prompt_template(self.prompt_template.as_deref())?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), PathBuf::from("config").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_prompt_template(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) if !path.is_file() => Err(ConfigError::Validation(format!(
            "prompt_template `{}` does not point to a readable file",
            path.display()
        ))),
        _ => Ok(()),
    }
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    prompt_template: Option<PathBuf>,
    user_input: Option<UserInputPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct UserInputPatch {
    max_characters: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
