use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::catalog::blend::Selection;
use crate::catalog::variant::{MaterialCategory, Variant, VariantCategory, VariantId};

/// Error types for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unknown variant {id} in category {category}")]
    UnknownVariant {
        category: VariantCategory,
        id: VariantId,
    },

    #[error("category {0} has no standard variant")]
    MissingStandard(VariantCategory),

    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Serialized catalog document (TOML)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    variants: Vec<Variant>,
}

/// Immutable library of selectable variants, indexed by category.
///
/// Built once from the built-in defaults or a TOML document and passed by
/// reference into the calculators; treated as read-only for the duration
/// of a calculation.
#[derive(Debug, Clone, Default)]
pub struct VariantLibrary {
    variants: HashMap<VariantCategory, Vec<Variant>>,
}

impl VariantLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with the built-in default catalog
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for variant in default_catalog() {
            library.insert(variant);
        }
        library
    }

    /// Parse a library from a TOML catalog document
    pub fn from_toml_str(document: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(document)?;
        let mut library = Self::new();
        for variant in file.variants {
            library.insert(variant);
        }
        Ok(library)
    }

    fn insert(&mut self, variant: Variant) {
        self.variants
            .entry(variant.category)
            .or_default()
            .push(variant);
    }

    /// Variants available in a category
    pub fn variants(&self, category: VariantCategory) -> &[Variant] {
        self.variants
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a variant by category and id
    pub fn get(&self, category: VariantCategory, id: &VariantId) -> Option<&Variant> {
        self.variants(category)
            .iter()
            .find(|variant| &variant.id == id)
    }

    /// The category's standard (baseline) variant
    pub fn standard(&self, category: VariantCategory) -> Option<&Variant> {
        self.variants(category)
            .iter()
            .find(|variant| variant.is_standard)
    }

    /// Emission factor of the category's standard variant, 0 when the
    /// category is absent
    pub fn standard_emission_factor(&self, category: VariantCategory) -> f64 {
        self.standard(category)
            .map(|variant| variant.emission_factor)
            .unwrap_or(0.0)
    }

    /// Resolve the effective dimensionless factor of a selection.
    ///
    /// A single selection resolves to that variant's `relative_factor`; a
    /// blend resolves to the percentage-weighted average of its entries'
    /// factors, normalized by total percentage. Unknown variant ids are an
    /// error at this layer; callers that must stay total use
    /// [`resolve_or_standard`](Self::resolve_or_standard).
    pub fn resolve_effective_factor(
        &self,
        category: VariantCategory,
        selection: &Selection,
    ) -> Result<f64, CatalogError> {
        for id in selection.variant_ids() {
            if self.get(category, id).is_none() {
                return Err(CatalogError::UnknownVariant {
                    category,
                    id: id.clone(),
                });
            }
        }
        Ok(match selection {
            Selection::Single(id) => {
                self.get(category, id)
                    .map(|variant| variant.relative_factor)
                    // ids were checked above
                    .unwrap_or(1.0)
            }
            Selection::Blend(blend) => blend.weighted_factor(|id| {
                self.get(category, id)
                    .map(|variant| variant.relative_factor)
                    .unwrap_or(1.0)
            }),
        })
    }

    /// Resolve a selection, degrading to the neutral standard factor 1.0
    /// (with a warning) when a referenced variant is unknown.
    pub fn resolve_or_standard(&self, category: VariantCategory, selection: &Selection) -> f64 {
        match self.resolve_effective_factor(category, selection) {
            Ok(factor) => factor,
            Err(err) => {
                warn!("factor resolution degraded to standard: {}", err);
                1.0
            }
        }
    }

    /// Whether the selection references any marketplace-sourced variant
    pub fn selection_references_external(
        &self,
        category: VariantCategory,
        selection: &Selection,
    ) -> bool {
        selection
            .variant_ids()
            .into_iter()
            .any(|id| self.get(category, id).is_some_and(|variant| variant.is_external))
    }

    /// Emission quantity in tonnes CO2e for a category: the resolved
    /// factor times the standard variant's emission factor (kg CO2e per
    /// canonical unit) times the converted volume, divided by 1000 to
    /// report tonnes.
    pub fn emission_quantity_tonnes(
        &self,
        category: VariantCategory,
        selection: &Selection,
        converted_volume: f64,
    ) -> f64 {
        let factor = self.resolve_or_standard(category, selection);
        factor * self.standard_emission_factor(category) * converted_volume / 1000.0
    }

    /// Functional extension: a copy of this library with one extra
    /// variant in its category's candidate list. Other categories are
    /// untouched.
    pub fn with_variant(&self, variant: Variant) -> Self {
        let mut library = self.clone();
        library.insert(variant);
        library
    }
}

/// Built-in default catalog.
///
/// Factor values follow published emission-factor ranges for each
/// category; the standard variant of every category carries
/// `relative_factor = 1.0` and serves as the baseline reference.
fn default_catalog() -> Vec<Variant> {
    use MaterialCategory::*;
    use VariantCategory::*;

    vec![
        // Livestock feed
        Variant::standard("feed-grain", Feed, "Grain-based ration", 0.0),
        Variant::builtin("feed-mixed", Feed, "Mixed ration", 0.0, 0.92),
        Variant::builtin("feed-forage-high", Feed, "High-quality forage", 0.0, 0.85),
        Variant::builtin("feed-forage-low", Feed, "Low-quality forage", 0.0, 1.10),
        // Dietary energy profile
        Variant::standard(
            "energy-moderate",
            DietaryEnergyProfile,
            "Moderate energy density",
            0.0,
        ),
        Variant::builtin(
            "energy-high",
            DietaryEnergyProfile,
            "High energy density",
            0.0,
            0.93,
        ),
        Variant::builtin(
            "energy-low",
            DietaryEnergyProfile,
            "Low energy density",
            0.0,
            1.07,
        ),
        // Supplementation
        Variant::standard("supp-none", Supplementation, "No supplementation", 0.0),
        Variant::builtin("supp-lipid", Supplementation, "Lipid supplement", 0.0, 0.88),
        Variant::builtin(
            "supp-nitrate",
            Supplementation,
            "Nitrate supplement",
            0.0,
            0.90,
        ),
        Variant::builtin(
            "supp-protein",
            Supplementation,
            "Protein supplement",
            0.0,
            0.97,
        ),
        // Manure management
        Variant::standard("manure-standard", ManureSystem, "Standard storage", 0.0),
        Variant::builtin(
            "manure-digester",
            ManureSystem,
            "Anaerobic digester",
            0.0,
            0.55,
        ),
        Variant::builtin("manure-compost", ManureSystem, "Composting", 0.0, 0.80),
        Variant::builtin(
            "manure-daily-spread",
            ManureSystem,
            "Daily spread",
            0.0,
            0.90,
        ),
        // Grazing practice
        Variant::standard(
            "grazing-continuous",
            GrazingPractice,
            "Continuous grazing",
            0.0,
        ),
        Variant::builtin(
            "grazing-rotational",
            GrazingPractice,
            "Rotational grazing",
            0.0,
            0.90,
        ),
        Variant::builtin(
            "grazing-amp",
            GrazingPractice,
            "Adaptive multi-paddock",
            0.0,
            0.82,
        ),
        // Climate region
        Variant::standard("climate-temperate", ClimateRegion, "Temperate", 0.0),
        Variant::builtin("climate-tropical", ClimateRegion, "Tropical", 0.0, 1.08),
        Variant::builtin("climate-arid", ClimateRegion, "Arid", 0.0, 0.95),
        Variant::builtin("climate-cold", ClimateRegion, "Cold", 0.0, 1.03),
        // Feed additives
        Variant::standard("additive-none", Additive, "No additive", 0.0),
        Variant::builtin("additive-3nop", Additive, "3-NOP inhibitor", 0.0, 0.70),
        Variant::builtin("additive-seaweed", Additive, "Asparagopsis extract", 0.0, 0.60),
        // Seasonal patterns
        Variant::standard("seasonal-none", SeasonalPattern, "No seasonal pattern", 0.0),
        Variant::builtin(
            "seasonal-wet-dry",
            SeasonalPattern,
            "Wet/dry season split",
            0.0,
            0.94,
        ),
        Variant::builtin(
            "seasonal-housing",
            SeasonalPattern,
            "Winter housing",
            0.0,
            0.97,
        ),
        // Construction materials: emission factors are kg CO2e per
        // canonical unit of the category's quantity type.
        Variant::standard(
            "concrete-standard",
            Material(Concrete),
            "Portland cement concrete",
            320.0,
        )
        .with_unit_cost(110.0),
        Variant::builtin(
            "concrete-low-carbon",
            Material(Concrete),
            "Low-carbon mix",
            320.0,
            0.75,
        )
        .with_unit_cost(125.0),
        Variant::builtin(
            "concrete-geopolymer",
            Material(Concrete),
            "Geopolymer concrete",
            320.0,
            0.55,
        )
        .with_unit_cost(150.0),
        Variant::standard("steel-virgin", Material(Steel), "Virgin steel", 1.85).with_unit_cost(0.9),
        Variant::builtin("steel-recycled", Material(Steel), "Recycled steel", 1.85, 0.45)
            .with_unit_cost(1.0),
        Variant::builtin(
            "steel-eaf",
            Material(Steel),
            "Electric-arc furnace steel",
            1.85,
            0.60,
        )
        .with_unit_cost(1.05),
        Variant::standard("timber-sawn", Material(Timber), "Sawn timber", 110.0)
            .with_unit_cost(450.0),
        Variant::builtin(
            "timber-clt",
            Material(Timber),
            "Cross-laminated timber",
            110.0,
            0.85,
        )
        .with_unit_cost(600.0),
        Variant::builtin(
            "timber-reclaimed",
            Material(Timber),
            "Reclaimed timber",
            110.0,
            0.30,
        )
        .with_unit_cost(380.0),
        Variant::standard(
            "insulation-mineral-wool",
            Material(Insulation),
            "Mineral wool",
            1.2,
        )
        .with_unit_cost(14.0),
        Variant::builtin(
            "insulation-cellulose",
            Material(Insulation),
            "Cellulose fibre",
            1.2,
            0.45,
        )
        .with_unit_cost(12.0),
        Variant::builtin(
            "insulation-eps",
            Material(Insulation),
            "Expanded polystyrene",
            1.2,
            1.35,
        )
        .with_unit_cost(10.0),
        Variant::standard("glass-float", Material(Glass), "Float glass", 25.0).with_unit_cost(60.0),
        Variant::builtin("glass-low-e", Material(Glass), "Low-emissivity glass", 25.0, 1.10)
            .with_unit_cost(85.0),
        Variant::builtin("glass-recycled", Material(Glass), "Recycled-content glass", 25.0, 0.75)
            .with_unit_cost(70.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::blend::{Blend, BlendEntry};

    #[test]
    fn test_builtin_catalog_has_one_standard_per_category() {
        let library = VariantLibrary::builtin();
        for (category, variants) in &library.variants {
            let standards = variants.iter().filter(|variant| variant.is_standard).count();
            assert_eq!(standards, 1, "category {} has {} standards", category, standards);
        }
    }

    #[test]
    fn test_single_selection_resolves_relative_factor() {
        let library = VariantLibrary::builtin();
        let factor = library
            .resolve_effective_factor(
                VariantCategory::Feed,
                &Selection::single("feed-mixed"),
            )
            .unwrap();
        assert_eq!(factor, 0.92);
    }

    #[test]
    fn test_blend_selection_resolves_weighted_average() {
        let library = VariantLibrary::builtin();
        let selection = Selection::Blend(Blend::new(vec![
            BlendEntry::new("feed-grain", 50),
            BlendEntry::new("feed-forage-high", 50),
        ]));
        let factor = library
            .resolve_effective_factor(VariantCategory::Feed, &selection)
            .unwrap();
        assert!((factor - 0.925).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_variant_is_error() {
        let library = VariantLibrary::builtin();
        let result = library.resolve_effective_factor(
            VariantCategory::Feed,
            &Selection::single("feed-imaginary"),
        );
        assert!(matches!(result, Err(CatalogError::UnknownVariant { .. })));
    }

    #[test]
    fn test_lenient_resolution_degrades_to_standard() {
        let library = VariantLibrary::builtin();
        let factor = library.resolve_or_standard(
            VariantCategory::Feed,
            &Selection::single("feed-imaginary"),
        );
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn test_with_variant_leaves_other_categories_untouched() {
        let library = VariantLibrary::builtin();
        let extended = library.with_variant(Variant {
            is_external: true,
            ..Variant::builtin("mk-feed", VariantCategory::Feed, "Marketplace feed", 0.0, 0.8)
        });
        assert!(extended
            .get(VariantCategory::Feed, &VariantId::from("mk-feed"))
            .is_some());
        assert_eq!(
            extended.variants(VariantCategory::ManureSystem).len(),
            library.variants(VariantCategory::ManureSystem).len()
        );
        // Original is untouched.
        assert!(library
            .get(VariantCategory::Feed, &VariantId::from("mk-feed"))
            .is_none());
    }

    #[test]
    fn test_external_detection() {
        let library = VariantLibrary::builtin().with_variant(Variant {
            is_external: true,
            ..Variant::builtin("mk-manure", VariantCategory::ManureSystem, "Digester kit", 0.0, 0.5)
        });
        assert!(library.selection_references_external(
            VariantCategory::ManureSystem,
            &Selection::single("mk-manure")
        ));
        assert!(!library.selection_references_external(
            VariantCategory::ManureSystem,
            &Selection::single("manure-standard")
        ));
    }

    #[test]
    fn test_emission_quantity_uses_standard_factor() {
        let library = VariantLibrary::builtin();
        let category = VariantCategory::Material(MaterialCategory::Concrete);
        // 100 m3 of standard concrete at 320 kg CO2e/m3 = 32 tonnes.
        let tonnes = library.emission_quantity_tonnes(
            category,
            &Selection::single("concrete-standard"),
            100.0,
        );
        assert!((tonnes - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_catalog_round_trip_through_toml() {
        let document = r#"
            [[variants]]
            id = "feed-test"
            category = "feed"
            name = "Test feed"
            emission_factor = 0.0
            relative_factor = 0.9
            is_external = false
            is_standard = true

            [[variants]]
            id = "concrete-test"
            category = { material = "concrete" }
            name = "Test concrete"
            emission_factor = 300.0
            relative_factor = 1.0
            unit_cost = 100.0
            is_external = false
            is_standard = true
        "#;
        let library = VariantLibrary::from_toml_str(document).unwrap();
        assert!(library
            .get(VariantCategory::Feed, &VariantId::from("feed-test"))
            .is_some());
        assert_eq!(
            library.standard_emission_factor(VariantCategory::Material(MaterialCategory::Concrete)),
            300.0
        );
    }
}
