use serde::{Deserialize, Serialize};

use crate::util::finite_or;

/// Kind of cost entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    /// One-time cost in a specific year
    Fixed,
    /// Recurring cost, every year of the horizon
    Annual,
    /// One-time cost per unit in a specific year
    PerUnit,
    /// Recurring cost per unit, every year
    AnnualPerUnit,
}

/// One entry in a cost schedule.
///
/// `year` is required only for the one-time kinds; entries missing it
/// default to year 1 rather than being rejected. Annual kinds recur every
/// year and ignore `year`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub kind: CostKind,
    pub value: f64,
    #[serde(default)]
    pub year: Option<u32>,
}

impl CostEntry {
    pub fn fixed(value: f64, year: u32) -> Self {
        Self {
            kind: CostKind::Fixed,
            value,
            year: Some(year),
        }
    }

    pub fn annual(value: f64) -> Self {
        Self {
            kind: CostKind::Annual,
            value,
            year: None,
        }
    }

    pub fn per_unit(value: f64, year: u32) -> Self {
        Self {
            kind: CostKind::PerUnit,
            value,
            year: Some(year),
        }
    }

    pub fn annual_per_unit(value: f64) -> Self {
        Self {
            kind: CostKind::AnnualPerUnit,
            value,
            year: None,
        }
    }

    /// Whether this entry contributes cost in the given projection year
    pub fn applies_in(&self, year: u32) -> bool {
        match self.kind {
            CostKind::Annual | CostKind::AnnualPerUnit => year >= 1,
            CostKind::Fixed | CostKind::PerUnit => self.year.unwrap_or(1) == year,
        }
    }

    /// Cost amount for one applicable year, scaled by the scenario's unit
    /// count for the per-unit kinds
    pub fn amount(&self, unit_count: f64) -> f64 {
        let value = finite_or(self.value, 0.0);
        match self.kind {
            CostKind::Fixed | CostKind::Annual => value,
            CostKind::PerUnit | CostKind::AnnualPerUnit => value * finite_or(unit_count, 0.0),
        }
    }
}

/// Price for one projection year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPrice {
    pub year: u32,
    pub price: f64,
}

/// Carbon price: flat, or an ordered 1-indexed contiguous schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbonPriceSchedule {
    Flat(f64),
    ByYear(Vec<YearPrice>),
}

impl CarbonPriceSchedule {
    /// Resolve the price for a projection year.
    ///
    /// Years past the end of an explicit schedule resolve to the final
    /// listed price; an empty schedule resolves to 0.
    pub fn price_for(&self, year: u32) -> f64 {
        match self {
            CarbonPriceSchedule::Flat(price) => finite_or(*price, 0.0),
            CarbonPriceSchedule::ByYear(entries) => entries
                .iter()
                .find(|entry| entry.year == year)
                .or_else(|| entries.last())
                .map(|entry| finite_or(entry.price, 0.0))
                .unwrap_or(0.0),
        }
    }
}

impl Default for CarbonPriceSchedule {
    fn default() -> Self {
        CarbonPriceSchedule::Flat(0.0)
    }
}
