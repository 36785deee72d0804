use criterion::{black_box, criterion_group, criterion_main, Criterion};

use carbonlib::{
    project, AnimalArchetype, CarbonPriceSchedule, CostEntry, EngineConfig, FinancialInputs,
    HerdProfile, LivestockCalculator, LivestockInputs, Selection, VariantLibrary,
};

fn projection_inputs() -> FinancialInputs {
    FinancialInputs {
        horizon_years: 30,
        discount_rate_percent: 5.0,
        price: CarbonPriceSchedule::Flat(25.0),
        annual_reduction_tonnes: 120.0,
        annual_baseline_tonnes: 500.0,
        annual_adjusted_tonnes: 380.0,
        implementation_cost: 40_000.0,
        annual_maintenance_cost: 2_500.0,
        unit_count: 1000.0,
        cost_entries: vec![
            CostEntry::fixed(5_000.0, 3),
            CostEntry::annual_per_unit(0.75),
        ],
        ..FinancialInputs::default()
    }
}

fn bench_projection_with_irr(c: &mut Criterion) {
    let inputs = projection_inputs();
    c.bench_function("project_30_years_with_irr_scan", |b| {
        b.iter(|| project(black_box(&inputs)))
    });
}

fn bench_livestock_assessment(c: &mut Criterion) {
    let library = VariantLibrary::builtin();
    let config = EngineConfig::default();
    let calculator = LivestockCalculator::new(&library, &config);
    let mut inputs = LivestockInputs::new(HerdProfile {
        archetype: AnimalArchetype::DairyCattle,
        head_count: 1000,
    });
    inputs.selections.feed = Selection::single("feed-mixed");

    c.bench_function("livestock_assessment", |b| {
        b.iter(|| calculator.assess(black_box(&inputs)))
    });
}

criterion_group!(benches, bench_projection_with_irr, bench_livestock_assessment);
criterion_main!(benches);
