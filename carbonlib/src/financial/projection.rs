use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::emissions::construction::ConstructionAssessment;
use crate::emissions::livestock::LivestockAssessment;
use crate::financial::schedule::{CarbonPriceSchedule, CostEntry};
use crate::util::{finite_or, ratio_or_zero};

/// Candidate IRR rates are scanned from 0% upward in fixed steps
const IRR_STEP_PERCENT: f64 = 0.1;

/// Upper bound of the IRR scan: 1,000 steps of 0.1% cover 0%..100%
const IRR_MAX_ITERATIONS: u32 = 1000;

/// Complete input payload for a financial projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputs {
    /// Projection horizon, years
    pub horizon_years: u32,
    /// Discount rate, percent
    pub discount_rate_percent: f64,
    pub price: CarbonPriceSchedule,
    /// Carbon-linked emissions reduction, tonnes per year
    pub annual_reduction_tonnes: f64,
    /// Annual baseline emissions, tonnes (reported per year)
    pub annual_baseline_tonnes: f64,
    /// Annual adjusted emissions, tonnes (reported per year)
    pub annual_adjusted_tonnes: f64,
    /// Production or operational-savings revenue, per year
    pub annual_savings_revenue: f64,
    /// One-time implementation cost, charged in year 1
    pub implementation_cost: f64,
    /// Recurring maintenance cost, every year
    pub annual_maintenance_cost: f64,
    /// Upfront cost charged in year 0 when positive
    pub upfront_cost: f64,
    /// Unit count multiplying per-unit cost entries (head of livestock,
    /// square metres of building)
    pub unit_count: f64,
    pub cost_entries: Vec<CostEntry>,
}

impl Default for FinancialInputs {
    fn default() -> Self {
        Self {
            horizon_years: 10,
            discount_rate_percent: 0.0,
            price: CarbonPriceSchedule::default(),
            annual_reduction_tonnes: 0.0,
            annual_baseline_tonnes: 0.0,
            annual_adjusted_tonnes: 0.0,
            annual_savings_revenue: 0.0,
            implementation_cost: 0.0,
            annual_maintenance_cost: 0.0,
            upfront_cost: 0.0,
            unit_count: 0.0,
            cost_entries: Vec::new(),
        }
    }
}

impl FinancialInputs {
    /// Projection inputs seeded from a livestock assessment
    pub fn from_livestock(
        assessment: &LivestockAssessment,
        horizon_years: u32,
        discount_rate_percent: f64,
        price: CarbonPriceSchedule,
    ) -> Self {
        Self {
            horizon_years,
            discount_rate_percent,
            price,
            annual_reduction_tonnes: assessment.reduction_herd_tonnes,
            annual_baseline_tonnes: assessment.baseline_herd_tonnes,
            annual_adjusted_tonnes: assessment.adjusted_herd_tonnes,
            unit_count: assessment.head_count as f64,
            ..Self::default()
        }
    }

    /// Projection inputs seeded from a construction assessment.
    ///
    /// The lifetime emissions delta is amortized over the lifespan; the
    /// green cost premium lands as the year-0 upfront cost.
    pub fn from_construction(
        assessment: &ConstructionAssessment,
        horizon_years: u32,
        discount_rate_percent: f64,
        price: CarbonPriceSchedule,
    ) -> Self {
        let lifespan = assessment.lifespan_years as f64;
        Self {
            horizon_years,
            discount_rate_percent,
            price,
            annual_reduction_tonnes: assessment.annual_reduction_tonnes(),
            annual_baseline_tonnes: ratio_or_zero(assessment.lifetime_baseline_tonnes, lifespan),
            annual_adjusted_tonnes: ratio_or_zero(assessment.lifetime_adjusted_tonnes, lifespan),
            upfront_cost: assessment.costs.green_premium,
            unit_count: assessment.building_size_m2,
            ..Self::default()
        }
    }
}

/// One year of the projection ledger. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    pub year: u32,
    pub revenue: f64,
    pub cost: f64,
    pub net_cash_flow: f64,
    pub cumulative_net_cash_flow: f64,
    pub present_value: f64,
    pub cumulative_npv: f64,
    pub emissions_baseline: f64,
    pub emissions_adjusted: f64,
    pub emissions_reduction: f64,
}

/// Summary of a financial projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResult {
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub npv: f64,
    /// Internal rate of return, percent; None when NPV never crosses
    /// zero inside the scanned range
    pub irr_percent: Option<f64>,
    /// Return on investment, percent; None when total cost is zero
    pub roi_percent: Option<f64>,
    /// First year cumulative net cash flow is non-negative; None when
    /// never reached inside the horizon
    pub break_even_year: Option<u32>,
    pub years: Vec<YearlyRecord>,
    pub calculation_time: DateTime<Utc>,
}

/// Run a financial projection over the given inputs.
///
/// Generates one record per year `1..=horizon`, preceded by a year-0
/// record when upfront costs apply. Returns a fresh result each call;
/// no state is retained.
pub fn project(inputs: &FinancialInputs) -> ProjectResult {
    let discount = finite_or(inputs.discount_rate_percent, 0.0) / 100.0;
    let reduction = finite_or(inputs.annual_reduction_tonnes, 0.0);
    let savings_revenue = finite_or(inputs.annual_savings_revenue, 0.0);
    let maintenance = finite_or(inputs.annual_maintenance_cost, 0.0);
    let implementation = finite_or(inputs.implementation_cost, 0.0);
    let upfront = finite_or(inputs.upfront_cost, 0.0);

    let mut years = Vec::with_capacity(inputs.horizon_years as usize + 1);
    let mut cumulative_cash = 0.0;
    let mut cumulative_npv = 0.0;

    let year_zero_entry_cost: f64 = inputs
        .cost_entries
        .iter()
        .filter(|entry| entry.applies_in(0))
        .map(|entry| entry.amount(inputs.unit_count))
        .sum();
    if upfront > 0.0 || year_zero_entry_cost > 0.0 {
        let cost = upfront + year_zero_entry_cost;
        cumulative_cash -= cost;
        cumulative_npv -= cost;
        years.push(YearlyRecord {
            year: 0,
            revenue: 0.0,
            cost,
            net_cash_flow: -cost,
            cumulative_net_cash_flow: cumulative_cash,
            // Year 0 is not discounted.
            present_value: -cost,
            cumulative_npv,
            emissions_baseline: 0.0,
            emissions_adjusted: 0.0,
            emissions_reduction: 0.0,
        });
    }

    for year in 1..=inputs.horizon_years {
        let price = inputs.price.price_for(year);
        let revenue = reduction * price + savings_revenue;

        let mut cost: f64 = inputs
            .cost_entries
            .iter()
            .filter(|entry| entry.applies_in(year))
            .map(|entry| entry.amount(inputs.unit_count))
            .sum();
        cost += maintenance;
        if year == 1 {
            cost += implementation;
        }

        let net_cash_flow = revenue - cost;
        cumulative_cash += net_cash_flow;
        let present_value = net_cash_flow / (1.0 + discount).powi(year as i32 - 1);
        cumulative_npv += present_value;

        years.push(YearlyRecord {
            year,
            revenue,
            cost,
            net_cash_flow,
            cumulative_net_cash_flow: cumulative_cash,
            present_value,
            cumulative_npv,
            emissions_baseline: finite_or(inputs.annual_baseline_tonnes, 0.0),
            emissions_adjusted: finite_or(inputs.annual_adjusted_tonnes, 0.0),
            emissions_reduction: reduction,
        });
    }

    let total_revenue: f64 = years.iter().map(|record| record.revenue).sum();
    let total_cost: f64 = years.iter().map(|record| record.cost).sum();
    let total_profit = total_revenue - total_cost;

    let break_even_year = years
        .iter()
        .find(|record| record.cumulative_net_cash_flow >= 0.0)
        .map(|record| record.year);

    let irr_percent = internal_rate_of_return(&years);
    let roi_percent = if total_cost == 0.0 {
        None
    } else {
        Some(total_profit / total_cost * 100.0)
    };

    debug!(
        "projection over {} years: npv {:.2}, break-even {:?}",
        inputs.horizon_years, cumulative_npv, break_even_year
    );

    ProjectResult {
        total_revenue,
        total_cost,
        total_profit,
        npv: cumulative_npv,
        irr_percent,
        roi_percent,
        break_even_year,
        years,
        calculation_time: Utc::now(),
    }
}

/// Net present value of a generated ledger at an arbitrary discount
/// rate, percent. Year 0 is not discounted; year `n` is discounted by
/// `(1 + rate)^(n-1)`.
pub fn npv_at_percent(years: &[YearlyRecord], rate_percent: f64) -> f64 {
    let rate = finite_or(rate_percent, 0.0) / 100.0;
    years
        .iter()
        .map(|record| {
            record.net_cash_flow / (1.0 + rate).powi(record.year.saturating_sub(1) as i32)
        })
        .sum()
}

/// Internal rate of return as a coarse linear scan.
///
/// Candidate rates run from 0% to 100% in 0.1% steps; the result is the
/// last rate before NPV becomes non-positive. None when NPV never
/// crosses zero inside the range, including when it is non-positive at
/// the very first candidate.
pub fn internal_rate_of_return(years: &[YearlyRecord]) -> Option<f64> {
    let mut last_positive = None;
    for step in 0..=IRR_MAX_ITERATIONS {
        let rate_percent = step as f64 * IRR_STEP_PERCENT;
        if npv_at_percent(years, rate_percent) <= 0.0 {
            return last_positive;
        }
        last_positive = Some(rate_percent);
    }
    None
}
