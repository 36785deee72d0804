// Marketplace effect applier.
//
// External product records either extend a category's candidate list with
// a marketplace-sourced variant, or discount an already-computed material
// category total. Both paths are purely functional: callers receive
// updated copies and the shared library is never mutated in place.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{MaterialCategory, Variant, VariantCategory, VariantId, VariantLibrary};
use crate::emissions::construction::ConstructionAssessment;
use crate::util::finite_or;

/// External marketplace product record.
///
/// The engine only reads these fields; fetching and persisting the
/// records is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceProduct {
    pub id: String,
    pub name: String,
    pub company_name: String,
    /// Project kinds the product advertises itself for
    pub project_types: Vec<String>,
    /// Fractional emissions reduction in [0, 1]
    pub emissions_reduction_factor: f64,
    #[serde(default)]
    pub integration: IntegrationDetails,
}

impl MarketplaceProduct {
    /// Reduction factor clamped into [0, 1]; malformed values degrade
    /// to 0 (no effect).
    pub fn clamped_reduction(&self) -> f64 {
        finite_or(self.emissions_reduction_factor, 0.0).clamp(0.0, 1.0)
    }
}

/// Category-specific integration metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegrationDetails {
    #[serde(default)]
    pub construction: Option<ConstructionIntegration>,
    #[serde(default)]
    pub livestock: Option<LivestockIntegration>,
}

/// How a product integrates into a livestock scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockIntegration {
    /// Category whose candidate list the product joins
    pub target_category: VariantCategory,
    #[serde(default)]
    pub unit_cost: Option<f64>,
}

/// How a product integrates into a construction scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionIntegration {
    pub material: MaterialCategory,
    pub mode: ConstructionIntegrationMode,
    #[serde(default)]
    pub unit_cost: Option<f64>,
}

/// Integration mode for construction products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionIntegrationMode {
    /// Join the material category's candidate list as a selectable
    /// variant
    InjectVariant,
    /// Discount the category's already-computed embodied totals
    DiscountCategoryTotal,
}

/// A source of emissions reduction that may supersede another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionSource {
    MarketplaceVariant,
    ManualAdditive,
}

/// Ordered precedence of reduction sources.
///
/// The first listed source that is active wins; sources ranked below an
/// active one are suppressed. The default ranks marketplace variants
/// above the manual additive so the two are never double-counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedencePolicy {
    pub order: Vec<ReductionSource>,
}

impl Default for PrecedencePolicy {
    fn default() -> Self {
        Self {
            order: vec![
                ReductionSource::MarketplaceVariant,
                ReductionSource::ManualAdditive,
            ],
        }
    }
}

impl PrecedencePolicy {
    /// Whether the manual additive may apply given marketplace activity
    pub fn manual_additive_applies(&self, marketplace_active: bool) -> bool {
        for source in &self.order {
            match source {
                ReductionSource::MarketplaceVariant if marketplace_active => return false,
                ReductionSource::ManualAdditive => return true,
                _ => {}
            }
        }
        false
    }
}

/// Extend a library with variants contributed by marketplace products.
///
/// Injected variants carry `relative_factor = 1 - reduction_factor`,
/// inherit the target category's standard emission factor, and are marked
/// external. Categories no product targets are untouched.
pub fn inject_into_library(
    library: &VariantLibrary,
    products: &[MarketplaceProduct],
) -> VariantLibrary {
    let mut extended = library.clone();
    for product in products {
        let reduction = product.clamped_reduction();

        if let Some(livestock) = &product.integration.livestock {
            extended = extended.with_variant(marketplace_variant(
                &extended,
                product,
                livestock.target_category,
                reduction,
                livestock.unit_cost,
            ));
            debug!(
                "injected marketplace variant {} into {}",
                product.id, livestock.target_category
            );
        }

        if let Some(construction) = &product.integration.construction {
            if construction.mode == ConstructionIntegrationMode::InjectVariant {
                let category = VariantCategory::Material(construction.material);
                extended = extended.with_variant(marketplace_variant(
                    &extended,
                    product,
                    category,
                    reduction,
                    construction.unit_cost,
                ));
                debug!("injected marketplace variant {} into {}", product.id, category);
            }
        }
    }
    extended
}

fn marketplace_variant(
    library: &VariantLibrary,
    product: &MarketplaceProduct,
    category: VariantCategory,
    reduction: f64,
    unit_cost: Option<f64>,
) -> Variant {
    Variant {
        id: VariantId::new(product.id.clone()),
        category,
        name: product.name.clone(),
        emission_factor: library.standard_emission_factor(category),
        relative_factor: 1.0 - reduction,
        unit_cost,
        is_external: true,
        is_standard: false,
    }
}

/// Apply direct category-total discounts to a computed construction
/// assessment.
///
/// Each discounting product scales its target category's baseline and
/// adjusted embodied quantities by `(1 - reduction_factor)`; dependent
/// percentages and lifetime aggregates are then recomputed. The input
/// assessment is left untouched.
pub fn apply_quantity_discounts(
    assessment: &ConstructionAssessment,
    products: &[MarketplaceProduct],
) -> ConstructionAssessment {
    let mut updated = assessment.clone();
    let mut touched = false;

    for product in products {
        let Some(construction) = &product.integration.construction else {
            continue;
        };
        if construction.mode != ConstructionIntegrationMode::DiscountCategoryTotal {
            continue;
        }
        let reduction = product.clamped_reduction();
        if let Some(material) = updated
            .materials
            .iter_mut()
            .find(|material| material.category == construction.material)
        {
            material.baseline_tonnes -= material.baseline_tonnes * reduction;
            material.adjusted_tonnes -= material.adjusted_tonnes * reduction;
            touched = true;
            debug!(
                "discounted {} embodied totals by {:.0}% via product {}",
                construction.material,
                reduction * 100.0,
                product.id
            );
        }
    }

    if touched {
        updated.recompute_aggregates();
    }
    updated
}
