use serde::{Deserialize, Serialize};

use crate::inference::InferenceError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
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
    };
}

str_enum!(Disease {
    Diabetes => "diabetes",
    Heart => "heart",
    Cancer => "cancer",
});

str_enum!(ReportStyle {
    Positive => "positive",
    Negative => "negative",
});

impl Disease {
    /// Every supported disease, in sidebar order.
    pub const ALL: [Disease; 3] = [Disease::Diabetes, Disease::Heart, Disease::Cancer];

    /// Human-facing name shown in the disease selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::Heart => "Heart",
            Self::Cancer => "Breast Cancer",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Diabetes => "🩸",
            Self::Heart => "❤️",
            Self::Cancer => "🎗️",
        }
    }
}

impl std::str::FromStr for Disease {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diabetes" => Ok(Self::Diabetes),
            "heart" => Ok(Self::Heart),
            "cancer" => Ok(Self::Cancer),
            other => Err(InferenceError::UnknownDisease(other.to_string())),
        }
    }
}
