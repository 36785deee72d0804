// Carbonlib
// Emissions and financial modeling engine for carbon-project assessment

// Public modules
pub mod catalog;
pub mod config;
pub mod emissions;
pub mod errors;
pub mod financial;
pub mod marketplace;
pub mod reporting;
pub mod units;
pub mod util;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use crate::catalog::{
    balance, Blend, BlendEntry, CatalogError, MaterialCategory, Selection, Variant,
    VariantCategory, VariantId, VariantLibrary,
};
pub use crate::config::EngineConfig;
pub use crate::emissions::construction::{
    BuildingInputs, ConstructionAssessment, ConstructionCalculator, EfficiencyMeasure,
    MaterialSpec, MeasureCategory, ProjectType,
};
pub use crate::emissions::livestock::{
    AnimalArchetype, HerdProfile, LivestockAssessment, LivestockCalculator, LivestockInputs,
    LivestockSelections, ReproductionInputs,
};
pub use crate::errors::{CarbonError, CarbonResult};
pub use crate::financial::{
    internal_rate_of_return, npv_at_percent, project, CarbonPriceSchedule, CostEntry, CostKind,
    FinancialInputs, ProjectResult, YearPrice, YearlyRecord,
};
pub use crate::marketplace::{
    apply_quantity_discounts, inject_into_library, ConstructionIntegration,
    ConstructionIntegrationMode, IntegrationDetails, LivestockIntegration, MarketplaceProduct,
    PrecedencePolicy, ReductionSource,
};
pub use crate::reporting::{
    construction_emissions_breakdown, cost_breakdown, livestock_emissions_breakdown,
    render_summary, CostBreakdown, EmissionsBreakdown,
};
pub use crate::units::{
    convert, convert_or_keep, convert_with_policy, ConversionPolicy, QuantityType, Unit, UnitError,
};
