use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::catalog::{Selection, VariantCategory, VariantLibrary};
use crate::config::EngineConfig;
use crate::util::{clamp_percent, finite_or, reduction_percent};

/// Buffalo emit 15% more than the cattle baseline
const BUFFALO_SPECIES_MULTIPLIER: f64 = 1.15;

/// Baseline per-head annual emissions, kg CO2e
const DAIRY_CATTLE_BASELINE_KG: f64 = 120.0;
const BEEF_CATTLE_BASELINE_KG: f64 = 99.0;

/// The reproductive channel alone can never account for more than a 20%
/// reduction
const REPRODUCTIVE_FACTOR_FLOOR: f64 = 0.8;

/// Animal archetype for a herd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalArchetype {
    DairyCattle,
    BeefCattle,
    Buffalo,
}

impl AnimalArchetype {
    /// Baseline per-head annual emission rate in kg CO2e
    pub fn baseline_rate_kg(&self) -> f64 {
        match self {
            AnimalArchetype::DairyCattle => DAIRY_CATTLE_BASELINE_KG,
            AnimalArchetype::BeefCattle => BEEF_CATTLE_BASELINE_KG,
            AnimalArchetype::Buffalo => DAIRY_CATTLE_BASELINE_KG * BUFFALO_SPECIES_MULTIPLIER,
        }
    }
}

impl fmt::Display for AnimalArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimalArchetype::DairyCattle => write!(f, "dairy cattle"),
            AnimalArchetype::BeefCattle => write!(f, "beef cattle"),
            AnimalArchetype::Buffalo => write!(f, "buffalo"),
        }
    }
}

/// Herd being assessed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerdProfile {
    pub archetype: AnimalArchetype,
    pub head_count: u32,
}

/// Category selections for a livestock scenario.
///
/// Each field selects a single catalog variant or a weighted blend within
/// its category. Defaults select every category's standard variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockSelections {
    pub feed: Selection,
    pub dietary_energy: Selection,
    pub supplementation: Selection,
    pub manure: Selection,
    pub grazing: Selection,
    pub climate: Selection,
    /// Optional catalog additive (marketplace products inject here)
    pub additive: Option<Selection>,
    /// Optional seasonal variation pattern
    pub seasonal_pattern: Option<Selection>,
}

impl Default for LivestockSelections {
    fn default() -> Self {
        Self {
            feed: Selection::single("feed-grain"),
            dietary_energy: Selection::single("energy-moderate"),
            supplementation: Selection::single("supp-none"),
            manure: Selection::single("manure-standard"),
            grazing: Selection::single("grazing-continuous"),
            climate: Selection::single("climate-temperate"),
            additive: None,
            seasonal_pattern: None,
        }
    }
}

impl LivestockSelections {
    /// The factor-chain categories and their selections, in application
    /// order
    fn chain(&self) -> Vec<(VariantCategory, LivestockFactor, &Selection)> {
        let mut chain = vec![
            (VariantCategory::Feed, LivestockFactor::Feed, &self.feed),
            (
                VariantCategory::DietaryEnergyProfile,
                LivestockFactor::DietaryEnergy,
                &self.dietary_energy,
            ),
            (
                VariantCategory::Supplementation,
                LivestockFactor::Supplementation,
                &self.supplementation,
            ),
            (
                VariantCategory::ManureSystem,
                LivestockFactor::Manure,
                &self.manure,
            ),
            (
                VariantCategory::GrazingPractice,
                LivestockFactor::Grazing,
                &self.grazing,
            ),
            (
                VariantCategory::ClimateRegion,
                LivestockFactor::Climate,
                &self.climate,
            ),
        ];
        if let Some(additive) = &self.additive {
            chain.push((VariantCategory::Additive, LivestockFactor::Additive, additive));
        }
        chain
    }
}

/// Reproductive performance before and after the intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReproductionInputs {
    /// Calving rate without supplementation, percent
    pub baseline_calving_rate_percent: f64,
    /// Supplementation-adjusted calving rate, percent
    pub adjusted_calving_rate_percent: f64,
    /// Time to calf before the intervention, months
    pub time_to_calf_before_months: f64,
    /// Time to calf after the intervention, months
    pub time_to_calf_after_months: f64,
}

/// Complete livestock scenario input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockInputs {
    pub herd: HerdProfile,
    pub selections: LivestockSelections,
    /// Manual emission-reduction additive efficiency, percent. Applies
    /// only when the precedence policy allows it (a marketplace-sourced
    /// variant in any chain category supersedes it).
    pub manual_additive_percent: Option<f64>,
    pub reproduction: Option<ReproductionInputs>,
}

impl LivestockInputs {
    pub fn new(herd: HerdProfile) -> Self {
        Self {
            herd,
            selections: LivestockSelections::default(),
            manual_additive_percent: None,
            reproduction: None,
        }
    }
}

/// Source of one multiplicative stage in the factor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivestockFactor {
    Feed,
    DietaryEnergy,
    Supplementation,
    Manure,
    Grazing,
    Climate,
    Additive,
    ManualAdditive,
    Seasonal,
    Reproduction,
}

impl fmt::Display for LivestockFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LivestockFactor::Feed => write!(f, "feed"),
            LivestockFactor::DietaryEnergy => write!(f, "dietary energy"),
            LivestockFactor::Supplementation => write!(f, "supplementation"),
            LivestockFactor::Manure => write!(f, "manure management"),
            LivestockFactor::Grazing => write!(f, "grazing practice"),
            LivestockFactor::Climate => write!(f, "climate region"),
            LivestockFactor::Additive => write!(f, "additive"),
            LivestockFactor::ManualAdditive => write!(f, "manual additive"),
            LivestockFactor::Seasonal => write!(f, "seasonal pattern"),
            LivestockFactor::Reproduction => write!(f, "reproductive efficiency"),
        }
    }
}

/// One applied stage of the factor chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorStage {
    pub source: LivestockFactor,
    /// Multiplier applied at this stage
    pub factor: f64,
    /// Per-head rate after the stage, kg CO2e
    pub rate_after_kg: f64,
}

/// Result of a livestock emissions assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockAssessment {
    /// Baseline per-head annual rate, kg CO2e
    pub baseline_rate_kg: f64,
    /// Adjusted per-head annual rate, kg CO2e
    pub adjusted_rate_kg: f64,
    /// Emissions-reduction percentage vs. baseline
    pub reduction_percent: f64,
    pub head_count: u32,
    /// Annual herd emissions at the baseline rate, tonnes CO2e
    pub baseline_herd_tonnes: f64,
    /// Annual herd emissions at the adjusted rate, tonnes CO2e
    pub adjusted_herd_tonnes: f64,
    /// Annual herd reduction, tonnes CO2e
    pub reduction_herd_tonnes: f64,
    /// Factor chain in application order
    pub stages: Vec<FactorStage>,
    pub calculation_time: DateTime<Utc>,
}

/// Reproductive-efficiency factor.
///
/// Only a genuine improvement (shorter time to calf, or a
/// supplementation-adjusted calving rate above baseline) has any effect;
/// unchanged inputs yield exactly 1.0. The factor is floored at 0.8.
pub fn reproductive_efficiency_factor(inputs: &ReproductionInputs) -> f64 {
    let calving_baseline = clamp_percent(inputs.baseline_calving_rate_percent);
    let calving_adjusted = clamp_percent(inputs.adjusted_calving_rate_percent);
    let time_before = finite_or(inputs.time_to_calf_before_months, 0.0);
    let time_after = finite_or(inputs.time_to_calf_after_months, 0.0);

    let improved = time_before > time_after || calving_adjusted > calving_baseline;
    if !improved {
        return 1.0;
    }

    let factor =
        1.0 - (100.0 - calving_adjusted) / 200.0 - (time_before - time_after) / 60.0;
    factor.max(REPRODUCTIVE_FACTOR_FLOOR)
}

/// Livestock emissions calculator over an injected catalog
pub struct LivestockCalculator<'a> {
    library: &'a VariantLibrary,
    config: &'a EngineConfig,
}

impl<'a> LivestockCalculator<'a> {
    pub fn new(library: &'a VariantLibrary, config: &'a EngineConfig) -> Self {
        Self { library, config }
    }

    /// Assess a livestock scenario.
    ///
    /// Pure function of the inputs and the injected catalog; malformed
    /// numeric inputs degrade to neutral values rather than failing.
    pub fn assess(&self, inputs: &LivestockInputs) -> LivestockAssessment {
        let baseline = inputs.herd.archetype.baseline_rate_kg();
        let mut rate = baseline;
        let mut stages = Vec::new();

        let chain = inputs.selections.chain();
        for (category, source, selection) in &chain {
            let factor = finite_or(self.library.resolve_or_standard(*category, selection), 1.0);
            rate *= factor;
            stages.push(FactorStage {
                source: *source,
                factor,
                rate_after_kg: rate,
            });
        }

        // Manual additive, gated by the precedence policy: a
        // marketplace-sourced variant anywhere in the chain supersedes it.
        if let Some(efficiency) = inputs.manual_additive_percent {
            let marketplace_active = chain.iter().any(|(category, _, selection)| {
                self.library
                    .selection_references_external(*category, selection)
            });
            if self
                .config
                .precedence
                .manual_additive_applies(marketplace_active)
            {
                let factor = 1.0 - clamp_percent(efficiency) / 100.0;
                rate *= factor;
                stages.push(FactorStage {
                    source: LivestockFactor::ManualAdditive,
                    factor,
                    rate_after_kg: rate,
                });
            } else {
                debug!("manual additive superseded by marketplace variant");
            }
        }

        if let Some(seasonal) = &inputs.selections.seasonal_pattern {
            let factor = finite_or(
                self.library
                    .resolve_or_standard(VariantCategory::SeasonalPattern, seasonal),
                1.0,
            );
            rate *= factor;
            stages.push(FactorStage {
                source: LivestockFactor::Seasonal,
                factor,
                rate_after_kg: rate,
            });
        }

        if let Some(reproduction) = &inputs.reproduction {
            let factor = reproductive_efficiency_factor(reproduction);
            rate *= factor;
            stages.push(FactorStage {
                source: LivestockFactor::Reproduction,
                factor,
                rate_after_kg: rate,
            });
        }

        let head_count = inputs.herd.head_count;
        let heads = head_count as f64;
        let baseline_herd_tonnes = baseline * heads / 1000.0;
        let adjusted_herd_tonnes = rate * heads / 1000.0;

        debug!(
            "livestock assessment: baseline {:.2} kg/head, adjusted {:.2} kg/head",
            baseline, rate
        );

        LivestockAssessment {
            baseline_rate_kg: baseline,
            adjusted_rate_kg: rate,
            reduction_percent: reduction_percent(baseline, rate),
            head_count,
            baseline_herd_tonnes,
            adjusted_herd_tonnes,
            reduction_herd_tonnes: baseline_herd_tonnes - adjusted_herd_tonnes,
            stages,
            calculation_time: Utc::now(),
        }
    }
}
