use crate::error::{config_error, env_error, CalendarResult};
use crate::model::FieldNaming;
use crate::utils::color::{is_hex_color, DEFAULT_FALLBACK_COLOR};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::info;

/// File name offered on export when the document was not imported from a file
pub const DEFAULT_EXPORT_NAME: &str = "naptar.json";

/// Default location of the optional config file
pub const DEFAULT_CONFIG_PATH: &str = "config/editor.toml";

/// Main configuration structure for the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IP address the editor API binds to
    pub bind_address: IpAddr,
    /// Port the editor API listens on
    pub port: u16,
    /// Directory with the browser front-end
    pub static_dir: String,
    /// Export file name when none was imported
    pub default_export_name: String,
    /// Color for events without a known category
    pub fallback_color: String,
    /// Locale for user-visible notices
    pub locale: String,
    /// Open the editor in a browser once the server is up
    pub open_browser: bool,
    /// Document to load on startup
    pub initial_document: Option<String>,
    /// Upper limit for uploaded documents
    pub max_upload_bytes: usize,
    /// Key naming for documents that were not imported from a file
    pub default_field_naming: FieldNaming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            static_dir: "assets".to_string(),
            default_export_name: DEFAULT_EXPORT_NAME.to_string(),
            fallback_color: DEFAULT_FALLBACK_COLOR.to_string(),
            locale: "hu".to_string(),
            open_browser: false,
            initial_document: None,
            max_upload_bytes: 10 * 1024 * 1024,
            default_field_naming: FieldNaming::DateEndDate,
        }
    }
}

/// Optional settings read from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub bind_address: Option<IpAddr>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub default_export_name: Option<String>,
    pub fallback_color: Option<String>,
    pub locale: Option<String>,
    pub open_browser: Option<bool>,
    pub initial_document: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub default_field_naming: Option<FieldNaming>,
}

impl Config {
    /// Load configuration from defaults, the config file and the environment
    pub fn load() -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let path = env::var("CALENDAR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = if Path::new(&path).exists() {
            info!("Reading config file {}", path);
            Some(toml::from_str::<ConfigFile>(&fs::read_to_string(&path)?)?)
        } else {
            None
        };

        Self::from_sources(file, |name| env::var(name).ok())
    }

    /// Build a config from an optional file and an environment lookup.
    ///
    /// Environment values override file values, which override defaults.
    pub fn from_sources<F>(file: Option<ConfigFile>, lookup: F) -> CalendarResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(file) = file {
            config.merge_file(file);
        }

        if let Some(value) = lookup("CALENDAR_BIND") {
            config.bind_address = value.parse().map_err(|_| env_error("CALENDAR_BIND"))?;
        }
        if let Some(value) = lookup("PORT") {
            config.port = value.parse().map_err(|_| env_error("PORT"))?;
        }
        if let Some(value) = lookup("CALENDAR_STATIC_DIR") {
            config.static_dir = value;
        }
        if let Some(value) = lookup("CALENDAR_EXPORT_NAME") {
            config.default_export_name = value;
        }
        if let Some(value) = lookup("CALENDAR_FALLBACK_COLOR") {
            config.fallback_color = value;
        }
        if let Some(value) = lookup("CALENDAR_LOCALE") {
            config.locale = value;
        }
        if let Some(value) = lookup("CALENDAR_OPEN_BROWSER") {
            config.open_browser = parse_flag(&value).ok_or_else(|| env_error("CALENDAR_OPEN_BROWSER"))?;
        }
        if let Some(value) = lookup("CALENDAR_DOCUMENT") {
            config.initial_document = Some(value).filter(|path| !path.trim().is_empty());
        }
        if let Some(value) = lookup("CALENDAR_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = value
                .parse()
                .map_err(|_| env_error("CALENDAR_MAX_UPLOAD_BYTES"))?;
        }
        if let Some(value) = lookup("CALENDAR_FIELD_NAMING") {
            config.default_field_naming = value.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    fn merge_file(&mut self, file: ConfigFile) {
        if let Some(value) = file.bind_address {
            self.bind_address = value;
        }
        if let Some(value) = file.port {
            self.port = value;
        }
        if let Some(value) = file.static_dir {
            self.static_dir = value;
        }
        if let Some(value) = file.default_export_name {
            self.default_export_name = value;
        }
        if let Some(value) = file.fallback_color {
            self.fallback_color = value;
        }
        if let Some(value) = file.locale {
            self.locale = value;
        }
        if let Some(value) = file.open_browser {
            self.open_browser = value;
        }
        if file.initial_document.is_some() {
            self.initial_document = file.initial_document;
        }
        if let Some(value) = file.max_upload_bytes {
            self.max_upload_bytes = value;
        }
        if let Some(value) = file.default_field_naming {
            self.default_field_naming = value;
        }
    }

    fn validate(&self) -> CalendarResult<()> {
        if !is_hex_color(&self.fallback_color) {
            return Err(config_error(&format!(
                "fallback color must look like #rrggbb, got {:?}",
                self.fallback_color
            )));
        }
        if self.default_export_name.trim().is_empty() {
            return Err(config_error("default export name cannot be empty"));
        }
        if self.max_upload_bytes == 0 {
            return Err(config_error("upload limit must be greater than zero"));
        }
        Ok(())
    }

    /// Address the editor API listens on
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// URL of the editor front-end
    pub fn editor_url(&self) -> String {
        format!("http://{}/", self.socket_addr())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
