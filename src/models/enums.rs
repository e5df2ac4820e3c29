use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Parsing is case-insensitive; serde goes through the string form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(TestStatus {
    Normal => "normal",
    High => "high",
    Low => "low",
});

str_enum!(Trend {
    Up => "up",
    Down => "down",
    Stable => "stable",
    None => "none",
});

impl Default for TestStatus {
    fn default() -> Self {
        Self::Normal
    }
}

impl TestStatus {
    /// Lenient reading of model-produced flags ("H", "critical_low", "↑", ...).
    /// Anything unrecognised counts as normal.
    pub fn from_lenient(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "high" | "h" | "hi" | "critical_high" | "above" | "elevated" | "↑" => Self::High,
            "low" | "l" | "lo" | "critical_low" | "below" | "decreased" | "↓" => Self::Low,
            _ => Self::Normal,
        }
    }

    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Arrow appended to abnormal values in exports.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::High => Some("↑"),
            Self::Low => Some("↓"),
        }
    }
}

impl Trend {
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::Stable => "→",
            Self::None => "",
        }
    }
}
