//! CLI configuration: resolver settings, aliases and request defaults

use anyhow::{Context, Result};
use pimctl_resolver::ResolverConfig;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Alias name prefixes, one per command family
pub const ALIAS_PREFIXES: [&str; 3] = ["res", "entra", "groups"];

/// Default configuration directory under the home directory
const CONFIG_DIR: &str = ".pimctl";
const CONFIG_FILE: &str = "config.yml";

/// Complete CLI configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PimConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub aliases: BTreeMap<String, Alias>,

    #[serde(default)]
    pub defaults: DefaultsSection,

    /// Where the configuration was loaded from and is saved to
    #[serde(skip)]
    path: PathBuf,
}

/// Named activation shortcut
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Alias {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Alias {
    /// Activation length in hours, if the alias sets one
    pub fn duration_hours(&self) -> Option<f64> {
        self.duration.as_deref().and_then(parse_duration_hours)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DefaultsSection {
    #[serde(default = "default_duration", deserialize_with = "duration")]
    pub duration: String,
    #[serde(default = "default_justification")]
    pub justification: String,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            justification: default_justification(),
        }
    }
}

/// YAML duration: `PT8H` or a bare number of hours
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Text(String),
    Hours(f64),
}

impl From<RawDuration> for String {
    fn from(raw: RawDuration) -> Self {
        match raw {
            RawDuration::Text(text) => text,
            RawDuration::Hours(hours) => hours.to_string(),
        }
    }
}

fn duration<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    RawDuration::deserialize(deserializer).map(String::from)
}

fn optional_duration<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Option::<RawDuration>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

// Default value functions
fn default_duration() -> String { "PT8H".to_string() }
fn default_justification() -> String { "Requested via pimctl".to_string() }

impl PimConfig {
    /// `~/.pimctl/config.yml`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Built-in configuration used when no file exists yet
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        let mut aliases = BTreeMap::new();
        aliases.insert(
            "entra:example".to_string(),
            Alias {
                role: Some("Global Administrator".to_string()),
                duration: Some("PT8H".to_string()),
                justification: Some("Administrative tasks".to_string()),
                scope: Some("directory".to_string()),
                ..Default::default()
            },
        );
        aliases.insert(
            "res:example".to_string(),
            Alias {
                role: Some("Owner".to_string()),
                duration: Some("PT4H".to_string()),
                justification: Some("Production deployment".to_string()),
                scope: Some("subscriptions/YOUR_SUBSCRIPTION_ID".to_string()),
                ..Default::default()
            },
        );

        Self {
            resolver: ResolverConfig::default(),
            aliases,
            defaults: DefaultsSection::default(),
            path: path.into(),
        }
    }

    /// Load configuration from a YAML file, or the built-in defaults if it does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No configuration at {:?}, using defaults", path);
            return Ok(Self::with_defaults(path));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;

        // An empty file is a valid, empty configuration
        let mut config: PimConfig = if contents.trim().is_empty() {
            serde_yaml::from_str("{}")
        } else {
            serde_yaml::from_str(&contents)
        }
        .with_context(|| format!("Failed to parse configuration file {:?}", path))?;

        config.path = path.to_path_buf();
        config.normalize_durations();
        Ok(config)
    }

    /// Write the configuration back to where it was loaded from
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create configuration directory {:?}", dir))?;
        }

        let contents = serde_yaml::to_string(self).context("Failed to serialize configuration")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write configuration file {:?}", self.path))?;

        debug!("Saved configuration to {:?}", self.path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.resolver.validate()?;

        // Bad durations only warn so `alias remove` can still repair the file
        if parse_duration_hours(&self.defaults.duration).is_none() {
            warn!(
                "Default duration '{}' is not an ISO 8601 duration (PT8H, PT2H30M)",
                self.defaults.duration
            );
        }

        for (name, alias) in &self.aliases {
            if let Some(duration) = &alias.duration {
                if parse_duration_hours(duration).is_none() {
                    warn!("Alias '{}' has invalid duration '{}'", name, duration);
                }
            }
            if alias_prefix(name).is_none() {
                warn!(
                    "Alias '{}' has no command prefix ({}:)",
                    name,
                    ALIAS_PREFIXES.join(":, ")
                );
            }
        }

        Ok(())
    }

    /// Rewrites bare hour counts (`8`) as ISO 8601 durations (`PT8H`)
    fn normalize_durations(&mut self) {
        if let Some(duration) = normalize_duration(&self.defaults.duration) {
            self.defaults.duration = duration;
        }
        for alias in self.aliases.values_mut() {
            if let Some(duration) = alias.duration.as_deref().and_then(normalize_duration) {
                alias.duration = Some(duration);
            }
        }
    }

    /// Configuration file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Add or replace an alias and persist the configuration
    pub fn add_alias(&mut self, name: impl Into<String>, alias: Alias) -> Result<()> {
        self.aliases.insert(name.into(), alias);
        self.save()
    }

    /// Remove an alias and persist the configuration
    ///
    /// Returns `false` (and writes nothing) if the alias did not exist.
    pub fn remove_alias(&mut self, name: &str) -> Result<bool> {
        if self.aliases.remove(name).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Aliases for one command family, keyed by name without the prefix
    pub fn aliases_with_prefix(&self, prefix: &str) -> BTreeMap<&str, &Alias> {
        let prefix = format!("{}:", prefix.trim_end_matches(':'));
        self.aliases
            .iter()
            .filter_map(|(name, alias)| name.strip_prefix(prefix.as_str()).map(|short| (short, alias)))
            .collect()
    }
}

/// Returns the known command prefix of an alias name
pub fn alias_prefix(name: &str) -> Option<&'static str> {
    let (prefix, rest) = name.split_once(':')?;
    if rest.is_empty() {
        return None;
    }
    ALIAS_PREFIXES.iter().copied().find(|p| *p == prefix)
}

/// Parses an ISO 8601 time duration (`PT8H`, `PT1.5H`, `PT2H30M`, `PT30M`) into hours
pub fn parse_duration_hours(duration: &str) -> Option<f64> {
    let mut rest = duration.trim().strip_prefix("PT")?;
    if rest.is_empty() {
        return None;
    }

    let mut hours = 0.0;
    if let Some((h, tail)) = rest.split_once('H') {
        hours += parse_component(h)?;
        rest = tail;
    }
    if !rest.is_empty() {
        hours += parse_component(rest.strip_suffix('M')?)? / 60.0;
    }

    (hours > 0.0).then_some(hours)
}

fn parse_component(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Formats hours as an ISO 8601 duration, rounded to the minute; `None`
/// means the 8 hour default
pub fn duration_string(hours: Option<f64>) -> String {
    let Some(hours) = hours else {
        return default_duration();
    };

    let minutes = (hours * 60.0).round() as u64;
    match (minutes / 60, minutes % 60) {
        (h, 0) => format!("PT{}H", h),
        (0, m) => format!("PT{}M", m),
        (h, m) => format!("PT{}H{}M", h, m),
    }
}

/// Accepts an ISO 8601 duration as is, or a bare hour count (`8`, `0.5`)
///
/// Returns `None` for anything that does not denote a positive duration.
pub fn normalize_duration(value: &str) -> Option<String> {
    let value = value.trim();
    if parse_duration_hours(value).is_some() {
        return Some(value.to_string());
    }

    let hours = parse_component(value)?;
    Some(duration_string(Some(hours))).filter(|d| parse_duration_hours(d).is_some())
}
