use thiserror::Error;

/// Rejected configuration. Gameplay itself never fails; only the tuning and
/// level data handed to `Engine::new` can.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("no levels configured")]
    NoLevels,

    #[error("level '{level}' has a lane pattern without keys")]
    EmptyPattern { level: String },

    #[error("level '{level}' needs a beat interval above zero")]
    NonPositiveInterval { level: String },

    #[error("level '{level}' needs a duration above zero")]
    NonPositiveDuration { level: String },

    /// A lane key collides with the restart key, or the restart key is not a
    /// single character.
    #[error("key '{0}' is reserved or invalid")]
    ReservedKey(String),

    #[error("invalid judging thresholds: {0}")]
    InvalidThresholds(String),

    #[error("config parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_level() {
        let e = ConfigError::EmptyPattern { level: "Cross Rhythm".into() };
        assert_eq!(e.to_string(), "level 'Cross Rhythm' has a lane pattern without keys");
        assert_eq!(ConfigError::ReservedKey("r".into()).to_string(), "key 'r' is reserved or invalid");
        let boxed: Box<dyn std::error::Error> = Box::new(ConfigError::NoLevels);
        assert_eq!(boxed.to_string(), "no levels configured");
    }
}
