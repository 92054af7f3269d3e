use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind} value: '{value}'")]
pub struct UnknownVariant {
    pub kind: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same literal as `as_str`, so wire values match the vocabulary.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
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
            type Err = $crate::models::enums::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err($crate::models::enums::UnknownVariant {
                        kind: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

pub(crate) use str_enum;

str_enum!(
    /// Lead-generation partner that produced a message.
    Provider {
        AssurProspect => "assurprospect",
        Assurlead => "assurlead",
        Unknown => "unknown",
    }
);

str_enum!(
    /// Strength of a provider classification.
    Confidence {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

impl Confidence {
    /// Numeric rank, higher is stronger.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

str_enum!(MessageFormat {
    Text => "text",
    Html => "html",
});

str_enum!(Civilite {
    Monsieur => "monsieur",
    Madame => "madame",
});

str_enum!(
    /// How a lead was obtained.
    ExtractionMethod {
        Deterministic => "deterministic",
        Fallback => "fallback",
    }
);

str_enum!(
    /// Logical section of a lead message.
    Section {
        Contact => "contact",
        Souscripteur => "souscripteur",
        Conjoint => "conjoint",
        Enfants => "enfants",
        Besoin => "besoin",
    }
);

str_enum!(
    /// Target insurer product.
    Platform {
        AlptisSanteSelect => "alptis_sante_select",
        SwissLifeOne => "swisslife_one",
    }
);
