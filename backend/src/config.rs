use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub locale: LocaleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Locale discovery and resolution settings (the `[locale]` section)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Explicit supported locales; when non-empty no file-system lookup happens
    pub locales: Vec<String>,
    /// Default locale, `locales[0]` of the resolved set when absent
    pub default: Option<String>,
    /// File holding the locale list (JSON, or TOML by extension)
    pub config_file: Option<PathBuf>,
    /// Dotted key of the locale list inside `config_file`
    pub config_key: String,
    pub scan: ScanConfig,
    pub name_of: NameOf,
    /// Source names in priority order: path, query, header, cookie
    pub order: Vec<String>,
    /// Reject requests whose path locale is not supported
    pub reject_on_missing_path_locale: bool,
    /// Reject instead of falling back to the default for every source
    pub strict: bool,
    pub hooks: HooksConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub path: Option<PathBuf>,
    pub file_type: String,
    pub directories: bool,
    pub exclude: Vec<String>,
}

/// Attribute keys each source is read under
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NameOf {
    pub path: String,
    pub query: String,
    pub header: String,
    pub cookie: String,
    /// Key inside a structured cookie; empty reads the cookie value itself
    pub cookie_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Expose the resolved locale as a `RequestLocale` request extension
    pub accessor: bool,
    /// Attach the accessor only when the request does not carry one yet
    pub create_if_missing: bool,
    /// Name of a host-registered method invoked with the resolved locale
    pub callback: Option<String>,
    pub event: HookPoint,
}

/// Request lifecycle point the locale middleware is installed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Every request, including ones no route matches
    OnRequest,
    /// Only requests that matched a route, right before the handler runs
    #[default]
    OnPreHandler,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from the given file, or the first config.toml found
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load(path: Option<&str>) -> Result<Self, anyhow::Error> {
        // 1. Load from config file
        let config_path = path.map(str::to_string).or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            tracing::info!("Loading configuration from {}", config_path);
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,request_locale=debug")
    /// - APP_LOCALE_LOCALES: Comma separated supported locales
    /// - APP_LOCALE_DEFAULT: Default locale
    /// - APP_LOCALE_ORDER: Comma separated resolution order (e.g., "path,cookie,query,header")
    /// - APP_LOCALE_STRICT: Reject unmatched requests instead of applying the default (true/false)
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.server.port = port;
                    tracing::info!("Override server.port from env: {}", self.server.port);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_SERVER_PORT '{}': {} (keep {})",
                    port,
                    e,
                    self.server.port
                ),
            }
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(locales) = std::env::var("APP_LOCALE_LOCALES") {
            self.locale.locales = parse_list(&locales);
            tracing::info!("Override locale.locales from env: {:?}", self.locale.locales);
        }

        if let Ok(default) = std::env::var("APP_LOCALE_DEFAULT") {
            tracing::info!("Override locale.default from env: {}", default);
            self.locale.default = Some(default);
        }

        if let Ok(order) = std::env::var("APP_LOCALE_ORDER") {
            self.locale.order = parse_list(&order);
            tracing::info!("Override locale.order from env: {:?}", self.locale.order);
        }

        if let Ok(strict) = std::env::var("APP_LOCALE_STRICT") {
            match strict.parse() {
                Ok(val) => {
                    self.locale.strict = val;
                    tracing::info!("Override locale.strict from env: {}", self.locale.strict);
                },
                Err(e) => tracing::warn!("Invalid APP_LOCALE_STRICT '{}': {}", strict, e),
            }
        }
    }

    /// Validate configuration
    ///
    /// Locale sources are checked when the locale service is built, so that
    /// every locale problem surfaces as a `ConfigError`.
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.locale.order.is_empty() {
            tracing::warn!("locale.order is empty; every request will get the default locale");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,request_locale=debug".to_string(), file: None }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            locales: Vec::new(),
            default: None,
            config_file: None,
            config_key: "locales".to_string(),
            scan: ScanConfig::default(),
            name_of: NameOf::default(),
            order: ["path", "cookie", "query", "header"].map(String::from).to_vec(),
            reject_on_missing_path_locale: true,
            strict: false,
            hooks: HooksConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            path: None,
            file_type: "json".to_string(),
            directories: true,
            exclude: vec!["templates".to_string()],
        }
    }
}

impl Default for NameOf {
    fn default() -> Self {
        Self {
            path: "lang".to_string(),
            query: "lang".to_string(),
            header: "accept-language".to_string(),
            cookie: "lang".to_string(),
            cookie_key: "lang".to_string(),
        }
    }
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self { accessor: true, create_if_missing: true, callback: None, event: HookPoint::default() }
    }
}

fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
