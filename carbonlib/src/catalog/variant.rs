use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::QuantityType;

/// Construction material categories, each independently blendable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Concrete,
    Steel,
    Timber,
    Insulation,
    Glass,
}

impl MaterialCategory {
    /// Quantity type material volumes for this category are measured in
    pub fn quantity_type(&self) -> QuantityType {
        match self {
            MaterialCategory::Concrete => QuantityType::Volume,
            MaterialCategory::Steel => QuantityType::Mass,
            MaterialCategory::Timber => QuantityType::Volume,
            MaterialCategory::Insulation => QuantityType::Area,
            MaterialCategory::Glass => QuantityType::Area,
        }
    }

    /// All material categories
    pub fn all() -> &'static [MaterialCategory] {
        &[
            MaterialCategory::Concrete,
            MaterialCategory::Steel,
            MaterialCategory::Timber,
            MaterialCategory::Insulation,
            MaterialCategory::Glass,
        ]
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialCategory::Concrete => write!(f, "concrete"),
            MaterialCategory::Steel => write!(f, "steel"),
            MaterialCategory::Timber => write!(f, "timber"),
            MaterialCategory::Insulation => write!(f, "insulation"),
            MaterialCategory::Glass => write!(f, "glass"),
        }
    }
}

/// Category of selectable variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantCategory {
    /// Livestock feed type
    Feed,
    /// Dietary energy profile of the ration
    DietaryEnergyProfile,
    /// Supplementation regime
    Supplementation,
    /// Manure management system
    ManureSystem,
    /// Grazing practice
    GrazingPractice,
    /// Climate region the herd operates in
    ClimateRegion,
    /// Emission-reduction feed additive
    Additive,
    /// Seasonal variation pattern
    SeasonalPattern,
    /// Construction material category
    Material(MaterialCategory),
}

impl fmt::Display for VariantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantCategory::Feed => write!(f, "feed"),
            VariantCategory::DietaryEnergyProfile => write!(f, "dietary_energy_profile"),
            VariantCategory::Supplementation => write!(f, "supplementation"),
            VariantCategory::ManureSystem => write!(f, "manure_system"),
            VariantCategory::GrazingPractice => write!(f, "grazing_practice"),
            VariantCategory::ClimateRegion => write!(f, "climate_region"),
            VariantCategory::Additive => write!(f, "additive"),
            VariantCategory::SeasonalPattern => write!(f, "seasonal_pattern"),
            VariantCategory::Material(material) => write!(f, "material:{}", material),
        }
    }
}

/// Identifier of a catalog variant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantId(pub String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VariantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VariantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A selectable option within a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Unique identifier within the catalog
    pub id: VariantId,
    /// Category this variant belongs to
    pub category: VariantCategory,
    /// Display name
    pub name: String,
    /// Emission factor in kg CO2e per canonical unit of the category's
    /// quantity type (0 for categories that only contribute a relative
    /// multiplier)
    pub emission_factor: f64,
    /// Dimensionless multiplier relative to the category's standard
    /// variant
    pub relative_factor: f64,
    /// Optional cost per canonical unit
    pub unit_cost: Option<f64>,
    /// Whether the variant was sourced from a marketplace product
    pub is_external: bool,
    /// Whether this is the category's standard (baseline) variant
    pub is_standard: bool,
}

impl Variant {
    /// Construct a built-in (non-marketplace) variant
    pub fn builtin(
        id: &str,
        category: VariantCategory,
        name: &str,
        emission_factor: f64,
        relative_factor: f64,
    ) -> Self {
        Self {
            id: VariantId::from(id),
            category,
            name: name.to_string(),
            emission_factor,
            relative_factor,
            unit_cost: None,
            is_external: false,
            is_standard: false,
        }
    }

    /// Construct the standard (baseline) variant of a category
    pub fn standard(id: &str, category: VariantCategory, name: &str, emission_factor: f64) -> Self {
        Self {
            is_standard: true,
            relative_factor: 1.0,
            ..Self::builtin(id, category, name, emission_factor, 1.0)
        }
    }

    /// Attach a unit cost
    pub fn with_unit_cost(mut self, unit_cost: f64) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_quantity_types() {
        assert_eq!(
            MaterialCategory::Steel.quantity_type(),
            QuantityType::Mass
        );
        assert_eq!(
            MaterialCategory::Concrete.quantity_type(),
            QuantityType::Volume
        );
        assert_eq!(
            MaterialCategory::Glass.quantity_type(),
            QuantityType::Area
        );
    }

    #[test]
    fn test_standard_variant_is_neutral() {
        let variant = Variant::standard("concrete-standard",
            VariantCategory::Material(MaterialCategory::Concrete), "Standard concrete", 320.0);
        assert!(variant.is_standard);
        assert_eq!(variant.relative_factor, 1.0);
        assert!(!variant.is_external);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(
            VariantCategory::Material(MaterialCategory::Timber).to_string(),
            "material:timber"
        );
        assert_eq!(VariantCategory::Feed.to_string(), "feed");
    }
}
