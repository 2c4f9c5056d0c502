/// All error types that can occur while configuring or running scenes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A numeric parameter is outside its physical legal range.
    #[error("invalid value {value} for {field}: expected {range}")]
    InvalidParameter {
        field: String,
        range: String,
        value: String,
    },

    /// A scene was given a property its variant does not declare.
    #[error("property \"{property}\" is not allowed for scene {scene}")]
    InvalidProperty { scene: String, property: String },

    /// A cross-field invariant of a scene configuration is violated.
    #[error("invalid scene configuration: {0}")]
    Configuration(String),

    /// No scene implementation matches the requested name.
    #[error("unknown scene \"{0}\"")]
    UnknownSceneVariant(String),

    /// A scene config entry of a launcher batch is malformed.
    #[error("scene config \"{title}\": {source}")]
    InvalidSceneConfig {
        title: String,
        #[source]
        source: Box<Error>,
    },

    /// An HTTP request to the bridge failed.
    #[error("bridge {action} error: {err}")]
    Http { action: String, err: reqwest::Error },

    /// The bridge answered with an error object.
    #[error("bridge error at {address}: {description}")]
    Bridge {
        address: String,
        description: String,
    },

    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0}")]
    JsonLoad(serde_json::Error),

    /// Failed to deserialize TOML data.
    #[error("failed to load toml: {0}")]
    TomlLoad(toml::de::Error),

    /// Attempted to send a [`crate::LightState`] with no attributes set.
    #[error("invalid light state; no attributes set")]
    NoAttribute,

    /// A local I/O operation failed.
    #[error("{action} error: {err}")]
    Io { action: String, err: std::io::Error },

    /// A configuration value was neither in the environment nor in the file.
    #[error("configuration value could not be found (section \"{section}\" key \"{key}\")")]
    MissingConfigValue { section: String, key: String },
}

impl Error {
    /// Create a new invalid parameter error
    pub fn invalid_parameter(field: &str, range: &str, value: impl std::fmt::Display) -> Self {
        Error::InvalidParameter {
            field: field.to_string(),
            range: range.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a new invalid property error
    pub fn invalid_property(scene: &str, property: &str) -> Self {
        Error::InvalidProperty {
            scene: scene.to_string(),
            property: property.to_string(),
        }
    }

    /// Create a new HTTP error
    pub fn http(action: &str, err: reqwest::Error) -> Self {
        Error::Http {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new I/O error
    pub fn io(action: &str, err: std::io::Error) -> Self {
        Error::Io {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new missing configuration value error
    pub fn missing_config(section: &str, key: &str) -> Self {
        Error::MissingConfigValue {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// Attach the title of the scene config an error originated from.
    pub fn in_scene_config(self, title: &str) -> Self {
        Error::InvalidSceneConfig {
            title: title.to_string(),
            source: Box::new(self),
        }
    }

    /// Whether this error comes from talking to the bridge rather than from
    /// the configuration.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::Bridge { .. })
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
