use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::catalog::{MaterialCategory, Selection, VariantCategory, VariantLibrary};
use crate::config::EngineConfig;
use crate::units::{convert_with_policy, Unit, UnitError};
use crate::util::{clamp_percent, finite_or, ratio_or_zero, reduction_percent};

/// Aggregate efficiency-measure savings cap, percent
const EFFICIENCY_SAVINGS_CAP_PERCENT: f64 = 80.0;

/// Renovation retains 65% of in-place materials
const RENOVATION_REUSE_FACTOR: f64 = 0.35;

/// Construction project type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    NewConstruction,
    Renovation,
}

impl ProjectType {
    /// Share of embodied carbon actually incurred (materials reuse)
    pub fn materials_reuse_factor(&self) -> f64 {
        match self {
            ProjectType::NewConstruction => 1.0,
            ProjectType::Renovation => RENOVATION_REUSE_FACTOR,
        }
    }

    /// Green cost premium applied to the construction cost
    pub fn cost_premium_rate(&self) -> f64 {
        match self {
            ProjectType::NewConstruction => 0.10,
            ProjectType::Renovation => 0.08,
        }
    }

    /// Multiplier on the base construction cost
    pub fn construction_cost_multiplier(&self) -> f64 {
        match self {
            ProjectType::NewConstruction => 1.0,
            ProjectType::Renovation => 0.6,
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectType::NewConstruction => write!(f, "new construction"),
            ProjectType::Renovation => write!(f, "renovation"),
        }
    }
}

/// Energy-efficiency measure category with its influence weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureCategory {
    Hvac,
    Envelope,
    Lighting,
}

impl MeasureCategory {
    /// Weight of this category's savings in the aggregate reduction
    pub fn influence_weight(&self) -> f64 {
        match self {
            MeasureCategory::Hvac => 0.30,
            MeasureCategory::Envelope => 0.30,
            MeasureCategory::Lighting => 0.20,
        }
    }
}

/// One energy-efficiency measure applied to the building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMeasure {
    pub name: String,
    pub category: MeasureCategory,
    /// Claimed savings on operational energy, percent
    pub savings_percent: f64,
}

/// Quantity of one material category, with its selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub category: MaterialCategory,
    pub selection: Selection,
    pub volume: f64,
    pub unit: Unit,
}

/// Building scenario input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInputs {
    pub project_type: ProjectType,
    pub building_size: f64,
    /// Unit the building size is measured in (converted to square metres)
    pub size_unit: Unit,
    /// Operational emissions rate, kg CO2e per square metre per year
    pub operational_rate_kg_per_m2: f64,
    pub lifespan_years: u32,
    pub materials: Vec<MaterialSpec>,
    pub measures: Vec<EfficiencyMeasure>,
    /// Annual on-site renewable generation, kWh
    pub onsite_generation_kwh: f64,
    /// Grid carbon intensity displaced by on-site generation,
    /// kg CO2e per kWh
    pub grid_intensity_kg_per_kwh: f64,
    /// Base construction cost per square metre
    pub base_construction_cost_per_m2: f64,
}

/// Embodied emissions of one material category, tonnes CO2e
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEmissions {
    pub category: MaterialCategory,
    pub baseline_tonnes: f64,
    pub adjusted_tonnes: f64,
    pub reduction_percent: f64,
}

/// Cost parameters derived from the scenario, consumed by the financial
/// projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionCosts {
    /// Base construction cost after the project-type multiplier
    pub construction_cost: f64,
    /// Green cost premium on top of the construction cost
    pub green_premium: f64,
}

/// Result of a construction emissions assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionAssessment {
    pub project_type: ProjectType,
    pub building_size_m2: f64,
    pub lifespan_years: u32,
    /// Per-category embodied detail
    pub materials: Vec<MaterialEmissions>,
    pub embodied_baseline_tonnes: f64,
    pub embodied_adjusted_tonnes: f64,
    /// Operational emissions before measures and offsets, tonnes/year
    pub operational_baseline_tonnes_per_year: f64,
    /// Operational emissions after measures and offsets, tonnes/year
    pub operational_adjusted_tonnes_per_year: f64,
    /// Aggregate efficiency savings actually applied, percent (capped)
    pub efficiency_savings_percent: f64,
    /// On-site generation offset, tonnes/year
    pub onsite_offset_tonnes_per_year: f64,
    pub lifetime_baseline_tonnes: f64,
    pub lifetime_adjusted_tonnes: f64,
    /// Lifetime emissions-reduction percentage vs. baseline
    pub reduction_percent: f64,
    pub costs: ConstructionCosts,
    pub calculation_time: DateTime<Utc>,
}

impl ConstructionAssessment {
    /// Annual reduction amortized over the building lifespan, tonnes
    pub fn annual_reduction_tonnes(&self) -> f64 {
        ratio_or_zero(
            self.lifetime_baseline_tonnes - self.lifetime_adjusted_tonnes,
            self.lifespan_years as f64,
        )
    }

    /// Recompute embodied/lifetime aggregates and percentages from the
    /// per-material detail and operational figures. Used after external
    /// effects rewrite individual material quantities.
    pub fn recompute_aggregates(&mut self) {
        self.embodied_baseline_tonnes = self
            .materials
            .iter()
            .map(|material| material.baseline_tonnes)
            .sum();
        self.embodied_adjusted_tonnes = self
            .materials
            .iter()
            .map(|material| material.adjusted_tonnes)
            .sum();
        for material in &mut self.materials {
            material.reduction_percent =
                reduction_percent(material.baseline_tonnes, material.adjusted_tonnes);
        }
        let lifespan = self.lifespan_years as f64;
        self.lifetime_baseline_tonnes = self.embodied_baseline_tonnes
            + self.operational_baseline_tonnes_per_year * lifespan;
        self.lifetime_adjusted_tonnes = self.embodied_adjusted_tonnes
            + self.operational_adjusted_tonnes_per_year * lifespan;
        self.reduction_percent =
            reduction_percent(self.lifetime_baseline_tonnes, self.lifetime_adjusted_tonnes);
    }
}

/// Construction emissions calculator over an injected catalog
pub struct ConstructionCalculator<'a> {
    library: &'a VariantLibrary,
    config: &'a EngineConfig,
}

impl<'a> ConstructionCalculator<'a> {
    pub fn new(library: &'a VariantLibrary, config: &'a EngineConfig) -> Self {
        Self { library, config }
    }

    /// Assess a building scenario.
    ///
    /// Infallible under the lenient conversion policy; under the strict
    /// policy an undefined unit conversion propagates as an error.
    pub fn assess(&self, inputs: &BuildingInputs) -> Result<ConstructionAssessment, UnitError> {
        let policy = self.config.conversion_policy;
        let size_m2 = finite_or(
            convert_with_policy(
                inputs.building_size,
                inputs.size_unit,
                Unit::SquareMetre,
                crate::units::QuantityType::Area,
                policy,
            )?,
            0.0,
        );

        // Embodied carbon, per material category.
        let reuse = inputs.project_type.materials_reuse_factor();
        let mut materials = Vec::with_capacity(inputs.materials.len());
        for spec in &inputs.materials {
            let category = VariantCategory::Material(spec.category);
            let quantity = spec.category.quantity_type();
            let canonical = quantity.canonical_unit();
            let volume = finite_or(
                convert_with_policy(spec.volume, spec.unit, canonical, quantity, policy)?,
                0.0,
            );

            let standard_factor = self.library.standard_emission_factor(category);
            let baseline_tonnes = standard_factor * volume / 1000.0 * reuse;
            let adjusted_tonnes = self
                .library
                .emission_quantity_tonnes(category, &spec.selection, volume)
                * reuse;

            materials.push(MaterialEmissions {
                category: spec.category,
                baseline_tonnes,
                adjusted_tonnes,
                reduction_percent: reduction_percent(baseline_tonnes, adjusted_tonnes),
            });
        }

        // Operational carbon with weighted, capped efficiency savings.
        let operational_baseline_kg = size_m2 * finite_or(inputs.operational_rate_kg_per_m2, 0.0);
        let weighted_savings: f64 = inputs
            .measures
            .iter()
            .map(|measure| {
                clamp_percent(measure.savings_percent) * measure.category.influence_weight()
            })
            .sum();
        let savings_percent = weighted_savings.min(EFFICIENCY_SAVINGS_CAP_PERCENT);
        let after_measures_kg = operational_baseline_kg * (1.0 - savings_percent / 100.0);

        let offset_kg = finite_or(inputs.onsite_generation_kwh, 0.0)
            * finite_or(inputs.grid_intensity_kg_per_kwh, 0.0);
        let operational_adjusted_kg = (after_measures_kg - offset_kg).max(0.0);

        debug!(
            "construction assessment: {:.1} m2, savings {:.1}%, offset {:.1} kg/yr",
            size_m2, savings_percent, offset_kg
        );

        let costs = ConstructionCosts {
            construction_cost: size_m2
                * finite_or(inputs.base_construction_cost_per_m2, 0.0)
                * inputs.project_type.construction_cost_multiplier(),
            green_premium: size_m2
                * finite_or(inputs.base_construction_cost_per_m2, 0.0)
                * inputs.project_type.construction_cost_multiplier()
                * inputs.project_type.cost_premium_rate(),
        };

        let mut assessment = ConstructionAssessment {
            project_type: inputs.project_type,
            building_size_m2: size_m2,
            lifespan_years: inputs.lifespan_years,
            materials,
            embodied_baseline_tonnes: 0.0,
            embodied_adjusted_tonnes: 0.0,
            operational_baseline_tonnes_per_year: operational_baseline_kg / 1000.0,
            operational_adjusted_tonnes_per_year: operational_adjusted_kg / 1000.0,
            efficiency_savings_percent: savings_percent,
            onsite_offset_tonnes_per_year: offset_kg / 1000.0,
            lifetime_baseline_tonnes: 0.0,
            lifetime_adjusted_tonnes: 0.0,
            reduction_percent: 0.0,
            costs,
            calculation_time: Utc::now(),
        };
        assessment.recompute_aggregates();
        Ok(assessment)
    }
}
