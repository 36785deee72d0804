// Chart-ready breakdown objects and a plain-text projection summary.
//
// Consumed by the presentation layer; the engine only shapes the data.

use serde::{Deserialize, Serialize};

use crate::emissions::construction::ConstructionAssessment;
use crate::emissions::livestock::LivestockAssessment;
use crate::financial::projection::{FinancialInputs, ProjectResult};
use crate::financial::schedule::CostKind;
use crate::util::ratio_or_zero;

/// One slice of a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub value: f64,
    pub share_percent: f64,
}

/// Emissions contributions by source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsBreakdown {
    pub entries: Vec<BreakdownEntry>,
    pub total: f64,
}

/// Cost contributions by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub entries: Vec<BreakdownEntry>,
    pub total: f64,
}

/// Per-source reduction contributions of a livestock assessment, herd
/// tonnes per year.
///
/// Each factor stage contributes the drop in the per-head rate it caused,
/// scaled to the herd.
pub fn livestock_emissions_breakdown(assessment: &LivestockAssessment) -> EmissionsBreakdown {
    let heads = assessment.head_count as f64;
    let total = assessment.reduction_herd_tonnes;

    let mut entries = Vec::with_capacity(assessment.stages.len());
    let mut rate_before = assessment.baseline_rate_kg;
    for stage in &assessment.stages {
        let contribution_tonnes = (rate_before - stage.rate_after_kg) * heads / 1000.0;
        entries.push(BreakdownEntry {
            label: stage.source.to_string(),
            value: contribution_tonnes,
            share_percent: ratio_or_zero(contribution_tonnes, total) * 100.0,
        });
        rate_before = stage.rate_after_kg;
    }

    EmissionsBreakdown { entries, total }
}

/// Adjusted lifetime emissions of a construction assessment by source:
/// one entry per material category plus the operational share.
pub fn construction_emissions_breakdown(assessment: &ConstructionAssessment) -> EmissionsBreakdown {
    let total = assessment.lifetime_adjusted_tonnes;
    let mut entries: Vec<BreakdownEntry> = assessment
        .materials
        .iter()
        .map(|material| BreakdownEntry {
            label: material.category.to_string(),
            value: material.adjusted_tonnes,
            share_percent: ratio_or_zero(material.adjusted_tonnes, total) * 100.0,
        })
        .collect();

    let operational_lifetime =
        assessment.operational_adjusted_tonnes_per_year * assessment.lifespan_years as f64;
    entries.push(BreakdownEntry {
        label: "operational".to_string(),
        value: operational_lifetime,
        share_percent: ratio_or_zero(operational_lifetime, total) * 100.0,
    });

    EmissionsBreakdown { entries, total }
}

/// Total cost by category over the projection horizon
pub fn cost_breakdown(inputs: &FinancialInputs) -> CostBreakdown {
    let horizon = inputs.horizon_years as f64;
    let mut entries = Vec::new();

    let mut push = |label: &str, value: f64| {
        if value != 0.0 {
            entries.push(BreakdownEntry {
                label: label.to_string(),
                value,
                share_percent: 0.0,
            });
        }
    };

    push("upfront", inputs.upfront_cost);
    push("implementation", inputs.implementation_cost);
    push("maintenance", inputs.annual_maintenance_cost * horizon);

    for (kind, label) in [
        (CostKind::Fixed, "fixed"),
        (CostKind::Annual, "annual"),
        (CostKind::PerUnit, "per_unit"),
        (CostKind::AnnualPerUnit, "annual_per_unit"),
    ] {
        let value: f64 = inputs
            .cost_entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| {
                let once = entry.amount(inputs.unit_count);
                match kind {
                    CostKind::Annual | CostKind::AnnualPerUnit => once * horizon,
                    CostKind::Fixed | CostKind::PerUnit => once,
                }
            })
            .sum();
        push(label, value);
    }

    let total: f64 = entries.iter().map(|entry| entry.value).sum();
    for entry in &mut entries {
        entry.share_percent = ratio_or_zero(entry.value, total) * 100.0;
    }

    CostBreakdown { entries, total }
}

/// Human-readable projection summary
pub fn render_summary(result: &ProjectResult) -> String {
    let mut out = String::new();
    out.push_str("=== Project Financial Summary ===\n");
    out.push_str(&format!("Total revenue:   {:>14.2}\n", result.total_revenue));
    out.push_str(&format!("Total cost:      {:>14.2}\n", result.total_cost));
    out.push_str(&format!("Total profit:    {:>14.2}\n", result.total_profit));
    out.push_str(&format!("NPV:             {:>14.2}\n", result.npv));
    match result.irr_percent {
        Some(irr) => out.push_str(&format!("IRR:             {:>13.1}%\n", irr)),
        None => out.push_str("IRR:               unavailable\n"),
    }
    match result.roi_percent {
        Some(roi) => out.push_str(&format!("ROI:             {:>13.1}%\n", roi)),
        None => out.push_str("ROI:               undefined (zero cost)\n"),
    }
    match result.break_even_year {
        Some(year) => out.push_str(&format!("Break-even year: {:>14}\n", year)),
        None => out.push_str("Break-even year:    not reached\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Selection, VariantLibrary};
    use crate::config::EngineConfig;
    use crate::emissions::livestock::{
        AnimalArchetype, HerdProfile, LivestockCalculator, LivestockInputs,
    };
    use crate::financial::projection::project;
    use crate::financial::schedule::{CarbonPriceSchedule, CostEntry};

    fn livestock_assessment() -> LivestockAssessment {
        let library = VariantLibrary::builtin();
        let config = EngineConfig::default();
        let calculator = LivestockCalculator::new(&library, &config);
        let mut inputs = LivestockInputs::new(HerdProfile {
            archetype: AnimalArchetype::DairyCattle,
            head_count: 1000,
        });
        inputs.selections.feed = Selection::single("feed-mixed");
        inputs.selections.manure = Selection::single("manure-compost");
        calculator.assess(&inputs)
    }

    #[test]
    fn test_livestock_breakdown_sums_to_total_reduction() {
        let assessment = livestock_assessment();
        let breakdown = livestock_emissions_breakdown(&assessment);
        let contribution_sum: f64 = breakdown.entries.iter().map(|entry| entry.value).sum();
        assert!((contribution_sum - assessment.reduction_herd_tonnes).abs() < 1e-9);

        let share_sum: f64 = breakdown
            .entries
            .iter()
            .map(|entry| entry.share_percent)
            .sum();
        assert!((share_sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_cost_breakdown_shares() {
        let inputs = FinancialInputs {
            horizon_years: 10,
            implementation_cost: 5000.0,
            annual_maintenance_cost: 500.0,
            cost_entries: vec![CostEntry::fixed(1000.0, 3)],
            ..FinancialInputs::default()
        };
        let breakdown = cost_breakdown(&inputs);
        assert_eq!(breakdown.total, 11_000.0);
        let share_sum: f64 = breakdown
            .entries
            .iter()
            .map(|entry| entry.share_percent)
            .sum();
        assert!((share_sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_mentions_sentinels() {
        let inputs = FinancialInputs {
            horizon_years: 3,
            price: CarbonPriceSchedule::Flat(25.0),
            annual_reduction_tonnes: 10.0,
            ..FinancialInputs::default()
        };
        let summary = render_summary(&project(&inputs));
        assert!(summary.contains("unavailable"));
        assert!(summary.contains("undefined (zero cost)"));
        assert!(summary.contains("Break-even year"));
    }
}
