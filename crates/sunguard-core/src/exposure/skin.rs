use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Fitzpatrick skin classification, I (burns easily) through VI (rarely burns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitzpatrickType {
    I,
    II,
    III,
    IV,
    V,
    VI,
}

impl FitzpatrickType {
    pub const ALL: [FitzpatrickType; 6] = [
        FitzpatrickType::I,
        FitzpatrickType::II,
        FitzpatrickType::III,
        FitzpatrickType::IV,
        FitzpatrickType::V,
        FitzpatrickType::VI,
    ];

    /// Numeric value (1-6).
    pub fn as_u8(self) -> u8 {
        match self {
            FitzpatrickType::I => 1,
            FitzpatrickType::II => 2,
            FitzpatrickType::III => 3,
            FitzpatrickType::IV => 4,
            FitzpatrickType::V => 5,
            FitzpatrickType::VI => 6,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(FitzpatrickType::I),
            2 => Some(FitzpatrickType::II),
            3 => Some(FitzpatrickType::III),
            4 => Some(FitzpatrickType::IV),
            5 => Some(FitzpatrickType::V),
            6 => Some(FitzpatrickType::VI),
            _ => None,
        }
    }

    /// Short description shown next to the type in profile pickers.
    pub fn description(self) -> &'static str {
        match self {
            FitzpatrickType::I => "Pale, always burns, never tans",
            FitzpatrickType::II => "Fair, usually burns, tans minimally",
            FitzpatrickType::III => "Medium, sometimes burns, tans gradually",
            FitzpatrickType::IV => "Olive, rarely burns, tans easily",
            FitzpatrickType::V => "Brown, very rarely burns",
            FitzpatrickType::VI => "Deeply pigmented, almost never burns",
        }
    }
}

impl Default for FitzpatrickType {
    /// Mid-range type used whenever the user has no profile yet.
    fn default() -> Self {
        FitzpatrickType::III
    }
}

impl fmt::Display for FitzpatrickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roman = match self {
            FitzpatrickType::I => "I",
            FitzpatrickType::II => "II",
            FitzpatrickType::III => "III",
            FitzpatrickType::IV => "IV",
            FitzpatrickType::V => "V",
            FitzpatrickType::VI => "VI",
        };
        f.write_str(roman)
    }
}

impl FromStr for FitzpatrickType {
    type Err = ValidationError;

    /// Accepts `1`-`6` or roman numerals in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u8>() {
            return Self::from_u8(n).ok_or_else(|| ValidationError::SkinType(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::SkinType(s.to_string()))
    }
}

/// A user's skin profile. Several may exist; the newest one is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinProfile {
    pub id: Uuid,
    pub skin_type: FitzpatrickType,
    pub created_at: DateTime<Utc>,
}

impl SkinProfile {
    pub fn new(skin_type: FitzpatrickType, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            skin_type,
            created_at,
        }
    }

    /// Pick the most recently created profile.
    pub fn current(profiles: &[SkinProfile]) -> Option<&SkinProfile> {
        profiles
            .iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
    }
}
