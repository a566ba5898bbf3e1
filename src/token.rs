use std::fmt;
use std::str::FromStr;

/// A single token produced by the tokenizer.
///
/// Positions are byte offsets into the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Raw text between tags, after whitespace trimming.
    Literal { text: String, position: usize },
    /// Primary expression of a `{{ ... }}` tag.
    Tag { body: String, position: usize },
    /// One `|>` pipeline stage of the preceding tag.
    Filter { body: String },
    /// Content of a `{{# ... #}}` comment.
    Comment { body: String, position: usize },
}

impl Token {
    /// Text carried by the token, whatever its kind.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Literal { text, .. } => text,
            Self::Tag { body, .. } | Self::Filter { body } | Self::Comment { body, .. } => body,
        }
    }

    /// Source offset of the token. Filters have none of their own.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::Literal { position, .. }
            | Self::Tag { position, .. }
            | Self::Comment { position, .. } => Some(*position),
            Self::Filter { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    #[must_use]
    pub const fn is_tag(&self) -> bool {
        matches!(self, Self::Tag { .. })
    }
}

/// Whitespace trimming policy for one side of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimMode {
    /// Only an explicit `-` marker trims.
    #[default]
    Off,
    /// Trim unless the tag carries an explicit `+` marker.
    Auto,
}

impl fmt::Display for TrimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Error returned when a string is not a known trim mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trim mode '{0}', expected 'off' or 'auto'")]
pub struct ParseTrimModeError(pub String);

impl FromStr for TrimMode {
    type Err = ParseTrimModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "false" => Ok(Self::Off),
            "auto" | "all" | "true" => Ok(Self::Auto),
            _ => Err(ParseTrimModeError(s.to_string())),
        }
    }
}

/// Trim configuration for one tokenizer invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrimConfig {
    pub left: TrimMode,
    pub right: TrimMode,
}

impl TrimConfig {
    /// No automatic trimming on either side.
    #[must_use]
    pub const fn off() -> Self {
        Self {
            left: TrimMode::Off,
            right: TrimMode::Off,
        }
    }

    /// Automatic trimming on both sides.
    #[must_use]
    pub const fn auto() -> Self {
        Self {
            left: TrimMode::Auto,
            right: TrimMode::Auto,
        }
    }

    #[must_use]
    pub const fn new(left: TrimMode, right: TrimMode) -> Self {
        Self { left, right }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_mode_from_str() {
        assert_eq!("auto".parse::<TrimMode>(), Ok(TrimMode::Auto));
        assert_eq!("all".parse::<TrimMode>(), Ok(TrimMode::Auto));
        assert_eq!(" OFF ".parse::<TrimMode>(), Ok(TrimMode::Off));
        assert_eq!("false".parse::<TrimMode>(), Ok(TrimMode::Off));
        assert!("sometimes".parse::<TrimMode>().is_err());
    }

    #[test]
    fn trim_mode_display_roundtrip() {
        for mode in [TrimMode::Off, TrimMode::Auto] {
            assert_eq!(mode.to_string().parse::<TrimMode>(), Ok(mode));
        }
    }

    #[test]
    fn default_config_is_off() {
        assert_eq!(TrimConfig::default(), TrimConfig::off());
    }

    #[test]
    fn filter_has_no_position() {
        let token = Token::Filter {
            body: "upper".to_string(),
        };
        assert_eq!(token.position(), None);
        assert_eq!(token.body(), "upper");
    }
}
