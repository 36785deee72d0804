// Financial projection engine.
//
// Turns an emissions delta, a carbon price schedule, and a cost schedule
// into a year-by-year ledger with NPV, IRR, ROI, and break-even summary
// metrics. All computation is bounded: the IRR search is the only loop
// and is capped at a fixed iteration count.

pub mod projection;
pub mod schedule;

pub use projection::{
    internal_rate_of_return, npv_at_percent, project, FinancialInputs, ProjectResult, YearlyRecord,
};
pub use schedule::{CarbonPriceSchedule, CostEntry, CostKind, YearPrice};
