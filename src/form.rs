use crate::normalizer::NormalizationError;
use std::{fmt, str::FromStr};

/// The normalization form requested from [`Normalizer`](crate::Normalizer).
///
/// `C` is the default. The legacy numbering (`NONE = 1` … `KC = 5`) is
/// available through `TryFrom<u8>` for callers that persist form ids.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizationForm {
    /// Leave text untouched (after validation).
    None,
    /// Canonical decomposition.
    D,
    /// Compatibility decomposition.
    KD,
    /// Canonical decomposition followed by canonical composition.
    #[default]
    C,
    /// Compatibility decomposition followed by canonical composition.
    KC,
}

impl NormalizationForm {
    pub const ALL: [Self; 5] = [Self::None, Self::D, Self::KD, Self::C, Self::KC];

    /// The four forms that actually rewrite text.
    pub const REWRITING: [Self; 4] = [Self::D, Self::KD, Self::C, Self::KC];

    #[inline(always)]
    pub const fn uses_compatibility(self) -> bool {
        matches!(self, Self::KD | Self::KC)
    }

    #[inline(always)]
    pub const fn recomposes(self) -> bool {
        matches!(self, Self::C | Self::KC)
    }

    /// Legacy numeric identifier.
    pub const fn id(self) -> u8 {
        match self {
            Self::None => 1,
            Self::D => 2,
            Self::KD => 3,
            Self::C => 4,
            Self::KC => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::D => "NFD",
            Self::KD => "NFKD",
            Self::C => "NFC",
            Self::KC => "NFKC",
        }
    }
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for NormalizationForm {
    type Error = NormalizationError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|form| form.id() == id)
            .ok_or_else(|| NormalizationError::unsupported(id.to_string()))
    }
}

impl FromStr for NormalizationForm {
    type Err = NormalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("FORM_").unwrap_or(&upper);
        match bare {
            "NONE" => Ok(Self::None),
            "D" | "NFD" => Ok(Self::D),
            "KD" | "NFKD" => Ok(Self::KD),
            "C" | "NFC" => Ok(Self::C),
            "KC" | "NFKC" => Ok(Self::KC),
            _ => Err(NormalizationError::unsupported(s)),
        }
    }
}
