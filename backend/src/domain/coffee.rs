//! Coffee vocabulary and the caffeine calculator.
//!
//! Caffeine is always derived on the server from the drink and its size; the
//! client never supplies it. Fixed drinks use the reference table below, user
//! defined drinks scale their medium-size base by a per-size multiplier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raised when a string does not name a known coffee type or size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Closed set of fixed coffee drinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoffeeType {
    Espresso,
    DoubleEspresso,
    Americano,
    Latte,
    Cappuccino,
    FlatWhite,
    Macchiato,
    Mocha,
    Cortado,
    Drip,
    ColdBrew,
    Other,
}

impl CoffeeType {
    /// Every variant in declaration order.
    pub const ALL: [CoffeeType; 12] = [
        Self::Espresso,
        Self::DoubleEspresso,
        Self::Americano,
        Self::Latte,
        Self::Cappuccino,
        Self::FlatWhite,
        Self::Macchiato,
        Self::Mocha,
        Self::Cortado,
        Self::Drip,
        Self::ColdBrew,
        Self::Other,
    ];

    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Espresso => "ESPRESSO",
            Self::DoubleEspresso => "DOUBLE_ESPRESSO",
            Self::Americano => "AMERICANO",
            Self::Latte => "LATTE",
            Self::Cappuccino => "CAPPUCCINO",
            Self::FlatWhite => "FLAT_WHITE",
            Self::Macchiato => "MACCHIATO",
            Self::Mocha => "MOCHA",
            Self::Cortado => "CORTADO",
            Self::Drip => "DRIP",
            Self::ColdBrew => "COLD_BREW",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for CoffeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoffeeType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "coffee type",
                value: s.to_owned(),
            })
    }
}

/// Closed set of serving sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoffeeSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl CoffeeSize {
    /// Every variant from smallest to largest.
    pub const ALL: [CoffeeSize; 4] = [Self::Small, Self::Medium, Self::Large, Self::ExtraLarge];

    /// Wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "SMALL",
            Self::Medium => "MEDIUM",
            Self::Large => "LARGE",
            Self::ExtraLarge => "EXTRA_LARGE",
        }
    }

    /// Scaling applied to a custom drink's medium base, in percent.
    fn multiplier_percent(self) -> u32 {
        match self {
            Self::Small => 67,
            Self::Medium => 100,
            Self::Large => 150,
            Self::ExtraLarge => 200,
        }
    }

    fn column(self) -> usize {
        match self {
            Self::Small => 0,
            Self::Medium => 1,
            Self::Large => 2,
            Self::ExtraLarge => 3,
        }
    }
}

impl fmt::Display for CoffeeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoffeeSize {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "coffee size",
                value: s.to_owned(),
            })
    }
}

/// Reference caffeine content in milligrams, indexed by size column
/// (small, medium, large, extra large).
fn caffeine_row(coffee_type: CoffeeType) -> [u32; 4] {
    match coffee_type {
        CoffeeType::Espresso => [63, 63, 126, 189],
        CoffeeType::DoubleEspresso => [126, 126, 189, 252],
        CoffeeType::Americano => [63, 126, 189, 252],
        CoffeeType::Latte => [75, 150, 225, 300],
        CoffeeType::Cappuccino => [75, 150, 225, 300],
        CoffeeType::FlatWhite => [130, 130, 195, 260],
        CoffeeType::Macchiato => [63, 126, 189, 252],
        CoffeeType::Mocha => [90, 175, 260, 350],
        CoffeeType::Cortado => [63, 126, 126, 189],
        CoffeeType::Drip => [95, 165, 235, 310],
        CoffeeType::ColdBrew => [155, 205, 310, 410],
        CoffeeType::Other => [50, 100, 150, 200],
    }
}

/// Caffeine in milligrams for a fixed drink.
///
/// # Examples
/// ```
/// use brewlog::domain::{calculate_caffeine, CoffeeSize, CoffeeType};
///
/// assert_eq!(calculate_caffeine(CoffeeType::Latte, CoffeeSize::Medium), 150);
/// ```
pub fn calculate_caffeine(coffee_type: CoffeeType, size: CoffeeSize) -> u32 {
    caffeine_row(coffee_type)[size.column()]
}

/// Caffeine in milligrams for a user-defined drink.
///
/// `base_medium` is the drink's caffeine at medium size; it is scaled by the
/// size multiplier and rounded half away from zero. Without a base the
/// `OTHER` row of the reference table applies.
///
/// # Examples
/// ```
/// use brewlog::domain::{calculate_custom_caffeine, CoffeeSize};
///
/// assert_eq!(calculate_custom_caffeine(Some(100), CoffeeSize::Small), 67);
/// assert_eq!(calculate_custom_caffeine(None, CoffeeSize::Large), 150);
/// ```
pub fn calculate_custom_caffeine(base_medium: Option<u32>, size: CoffeeSize) -> u32 {
    match base_medium {
        Some(base) => (base * size.multiplier_percent() + 50) / 100,
        None => calculate_caffeine(CoffeeType::Other, size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CoffeeType::Espresso, CoffeeSize::Small, 63)]
    #[case(CoffeeType::Espresso, CoffeeSize::ExtraLarge, 189)]
    #[case(CoffeeType::DoubleEspresso, CoffeeSize::Medium, 126)]
    #[case(CoffeeType::Americano, CoffeeSize::Large, 189)]
    #[case(CoffeeType::Latte, CoffeeSize::Medium, 150)]
    #[case(CoffeeType::Cappuccino, CoffeeSize::Small, 75)]
    #[case(CoffeeType::FlatWhite, CoffeeSize::ExtraLarge, 260)]
    #[case(CoffeeType::Macchiato, CoffeeSize::Medium, 126)]
    #[case(CoffeeType::Mocha, CoffeeSize::Large, 260)]
    #[case(CoffeeType::Cortado, CoffeeSize::Large, 126)]
    #[case(CoffeeType::Drip, CoffeeSize::Medium, 165)]
    #[case(CoffeeType::ColdBrew, CoffeeSize::ExtraLarge, 410)]
    #[case(CoffeeType::Other, CoffeeSize::Medium, 100)]
    fn fixed_drinks_use_reference_table(
        #[case] coffee_type: CoffeeType,
        #[case] size: CoffeeSize,
        #[case] expected: u32,
    ) {
        assert_eq!(calculate_caffeine(coffee_type, size), expected);
    }

    #[rstest]
    fn table_grows_with_size() {
        for coffee_type in CoffeeType::ALL {
            let values: Vec<u32> = CoffeeSize::ALL
                .into_iter()
                .map(|size| calculate_caffeine(coffee_type, size))
                .collect();
            assert!(values.windows(2).all(|pair| pair[0] <= pair[1]), "{coffee_type}");
        }
    }

    #[rstest]
    #[case(CoffeeSize::Small, 67)]
    #[case(CoffeeSize::Medium, 100)]
    #[case(CoffeeSize::Large, 150)]
    #[case(CoffeeSize::ExtraLarge, 200)]
    fn custom_base_scales_by_size(#[case] size: CoffeeSize, #[case] expected: u32) {
        assert_eq!(calculate_custom_caffeine(Some(100), size), expected);
    }

    #[rstest]
    #[case(50, CoffeeSize::Small, 34)]
    #[case(3, CoffeeSize::Large, 5)]
    #[case(0, CoffeeSize::ExtraLarge, 0)]
    #[case(1000, CoffeeSize::ExtraLarge, 2000)]
    fn custom_base_rounds_half_away_from_zero(
        #[case] base: u32,
        #[case] size: CoffeeSize,
        #[case] expected: u32,
    ) {
        assert_eq!(calculate_custom_caffeine(Some(base), size), expected);
    }

    #[rstest]
    fn custom_without_base_falls_back_to_other_row() {
        for size in CoffeeSize::ALL {
            assert_eq!(
                calculate_custom_caffeine(None, size),
                calculate_caffeine(CoffeeType::Other, size)
            );
        }
    }

    #[rstest]
    fn string_forms_round_trip() {
        for coffee_type in CoffeeType::ALL {
            assert_eq!(coffee_type.as_str().parse::<CoffeeType>(), Ok(coffee_type));
            let json = serde_json::to_value(coffee_type).expect("serialise");
            assert_eq!(json, serde_json::json!(coffee_type.as_str()));
        }
        assert!("FRAPPE".parse::<CoffeeType>().is_err());
        assert!("medium".parse::<CoffeeSize>().is_err());
    }
}
