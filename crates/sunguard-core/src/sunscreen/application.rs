use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// How much sunscreen was applied, relative to the SPF testing thickness.
///
/// Quantity changes how well the layer protects, never how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Light,
    Normal,
    Heavy,
}

impl Quantity {
    pub fn as_str(self) -> &'static str {
        match self {
            Quantity::Light => "light",
            Quantity::Normal => "normal",
            Quantity::Heavy => "heavy",
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Normal
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Quantity::Light),
            "normal" => Ok(Quantity::Normal),
            "heavy" => Ok(Quantity::Heavy),
            other => Err(ValidationError::InvalidValue {
                field: "quantity".into(),
                message: format!("expected light, normal or heavy, got '{other}'"),
            }),
        }
    }
}

/// What the user is doing while protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Normal,
    /// Swimming, sweating, toweling off.
    Active,
}

impl ActivityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Normal => "normal",
            ActivityLevel::Active => "active",
        }
    }
}

impl Default for ActivityLevel {
    fn default() -> Self {
        ActivityLevel::Normal
    }
}

impl FromStr for ActivityLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "normal" => Ok(ActivityLevel::Normal),
            "active" => Ok(ActivityLevel::Active),
            other => Err(ValidationError::InvalidValue {
                field: "activity".into(),
                message: format!("expected sedentary, normal or active, got '{other}'"),
            }),
        }
    }
}

/// One logged sunscreen application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunscreenApplication {
    pub id: Uuid,
    /// Nominal SPF printed on the bottle.
    pub spf: f64,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub activity: ActivityLevel,
    pub applied_at: DateTime<Utc>,
}

impl SunscreenApplication {
    pub fn new(
        spf: f64,
        quantity: Quantity,
        activity: ActivityLevel,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            spf,
            quantity,
            activity,
            applied_at,
        }
    }

    /// A fresh record with the same product, amount and activity, applied at `now`.
    pub fn quick_reapply(&self, now: DateTime<Utc>) -> Self {
        Self::new(self.spf, self.quantity, self.activity, now)
    }
}
