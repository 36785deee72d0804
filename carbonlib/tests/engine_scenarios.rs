// End-to-end scenarios across the full calculation pipeline:
// catalog -> emissions assessment -> marketplace effects -> financial
// projection.

use approx::assert_relative_eq;
use carbonlib::{
    apply_quantity_discounts, balance, inject_into_library, AnimalArchetype, Blend, BlendEntry,
    BuildingInputs, CarbonPriceSchedule, ConstructionCalculator, ConstructionIntegration,
    ConstructionIntegrationMode, EngineConfig, FinancialInputs, HerdProfile, IntegrationDetails,
    LivestockCalculator, LivestockInputs, LivestockIntegration, MarketplaceProduct,
    MaterialCategory, MaterialSpec, ProjectType, Selection, Unit, VariantCategory, VariantId,
    VariantLibrary,
};

fn engine_fixture() -> (VariantLibrary, EngineConfig) {
    init_tracing();
    (VariantLibrary::builtin(), EngineConfig::default())
}

/// Surface engine warnings (degraded conversions, unknown variants) in
/// test output when RUST_LOG asks for them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[test]
fn dairy_herd_with_mixed_feed_reduces_eight_percent() {
    let (library, config) = engine_fixture();
    let calculator = LivestockCalculator::new(&library, &config);

    let mut inputs = LivestockInputs::new(HerdProfile {
        archetype: AnimalArchetype::DairyCattle,
        head_count: 1000,
    });
    inputs.selections.feed = Selection::single("feed-mixed");

    let assessment = calculator.assess(&inputs);
    assert_relative_eq!(assessment.baseline_rate_kg, 120.0);
    assert_relative_eq!(assessment.adjusted_rate_kg, 110.4, max_relative = 1e-12);
    assert_relative_eq!(assessment.reduction_percent, 8.0, max_relative = 1e-12);
    // 1000 head at 9.6 kg/head reduction = 9.6 t/yr.
    assert_relative_eq!(assessment.reduction_herd_tonnes, 9.6, max_relative = 1e-9);
}

#[test]
fn flat_price_zero_cost_projection_breaks_even_immediately() {
    let inputs = FinancialInputs {
        horizon_years: 5,
        discount_rate_percent: 0.0,
        price: CarbonPriceSchedule::Flat(25.0),
        annual_reduction_tonnes: 50.0,
        ..FinancialInputs::default()
    };
    let result = carbonlib::project(&inputs);

    assert_eq!(result.total_revenue, 6250.0);
    assert_eq!(result.npv, 6250.0);
    assert_eq!(result.break_even_year, Some(1));
    assert_eq!(result.roi_percent, None);
    assert_eq!(result.irr_percent, None);
}

#[test]
fn unbalanced_blend_is_corrected_not_rejected() {
    let unbalanced = Blend::new(vec![
        BlendEntry::new("feed-grain", 70),
        BlendEntry::new("feed-mixed", 50),
    ]);
    let balanced = balance(&unbalanced);

    assert_eq!(balanced.total_percentage(), 100);
    assert_eq!(balanced.entries[0].percentage, 58);
    assert_eq!(balanced.entries[1].percentage, 42);

    // The resolver accepts the unbalanced blend directly and normalizes.
    let (library, config) = engine_fixture();
    let calculator = LivestockCalculator::new(&library, &config);
    let mut inputs = LivestockInputs::new(HerdProfile {
        archetype: AnimalArchetype::DairyCattle,
        head_count: 100,
    });
    inputs.selections.feed = Selection::Blend(unbalanced);
    let assessment = calculator.assess(&inputs);

    let expected_factor = (70.0 * 1.0 + 50.0 * 0.92) / 120.0;
    assert!((assessment.adjusted_rate_kg - 120.0 * expected_factor).abs() < 1e-9);
}

#[test]
fn livestock_scenario_to_financial_projection() {
    let (library, config) = engine_fixture();
    let calculator = LivestockCalculator::new(&library, &config);

    let mut inputs = LivestockInputs::new(HerdProfile {
        archetype: AnimalArchetype::DairyCattle,
        head_count: 1000,
    });
    inputs.selections.feed = Selection::single("feed-mixed");
    inputs.selections.manure = Selection::single("manure-digester");

    let assessment = calculator.assess(&inputs);
    let mut financial = FinancialInputs::from_livestock(
        &assessment,
        10,
        config.default_discount_rate_percent,
        CarbonPriceSchedule::Flat(config.default_carbon_price),
    );
    financial.implementation_cost = 20_000.0;
    financial.annual_maintenance_cost = 1_000.0;

    let result = carbonlib::project(&financial);
    assert_eq!(result.years.len(), 10);
    // Revenue each year: reduction t/yr * $25.
    let expected_annual_revenue = assessment.reduction_herd_tonnes * 25.0;
    assert!((result.years[0].revenue - expected_annual_revenue).abs() < 1e-9);
    assert_eq!(result.years[0].emissions_reduction, assessment.reduction_herd_tonnes);
    assert!(result.total_cost > 0.0);
    assert!(result.roi_percent.is_some());
}

#[test]
fn marketplace_product_supersedes_manual_additive_end_to_end() {
    let (library, config) = engine_fixture();

    let products = vec![MarketplaceProduct {
        id: "mk-methane-blocker".to_string(),
        name: "Methane Blocker".to_string(),
        company_name: "Acme Climate".to_string(),
        project_types: vec!["livestock".to_string()],
        emissions_reduction_factor: 0.30,
        integration: IntegrationDetails {
            livestock: Some(LivestockIntegration {
                target_category: VariantCategory::Additive,
                unit_cost: Some(4.0),
            }),
            construction: None,
        },
    }];
    let extended = inject_into_library(&library, &products);

    // The injected variant is selectable like any built-in one.
    let variant = extended
        .get(
            VariantCategory::Additive,
            &VariantId::from("mk-methane-blocker"),
        )
        .expect("marketplace variant present");
    assert!((variant.relative_factor - 0.70).abs() < 1e-12);

    let calculator = LivestockCalculator::new(&extended, &config);
    let mut inputs = LivestockInputs::new(HerdProfile {
        archetype: AnimalArchetype::DairyCattle,
        head_count: 100,
    });
    inputs.selections.additive = Some(Selection::single("mk-methane-blocker"));
    // A manual additive is also enabled, but the marketplace variant
    // supersedes it.
    inputs.manual_additive_percent = Some(50.0);

    let assessment = calculator.assess(&inputs);
    assert!((assessment.adjusted_rate_kg - 120.0 * 0.70).abs() < 1e-9);
}

#[test]
fn construction_scenario_with_marketplace_discount() {
    let (library, config) = engine_fixture();
    let calculator = ConstructionCalculator::new(&library, &config);

    let assessment = calculator
        .assess(&BuildingInputs {
            project_type: ProjectType::NewConstruction,
            building_size: 2000.0,
            size_unit: Unit::SquareMetre,
            operational_rate_kg_per_m2: 35.0,
            lifespan_years: 40,
            materials: vec![
                MaterialSpec {
                    category: MaterialCategory::Concrete,
                    selection: Selection::single("concrete-low-carbon"),
                    volume: 800.0,
                    unit: Unit::CubicMetre,
                },
                MaterialSpec {
                    category: MaterialCategory::Steel,
                    selection: Selection::single("steel-recycled"),
                    volume: 150.0,
                    unit: Unit::Tonne,
                },
            ],
            measures: vec![],
            onsite_generation_kwh: 0.0,
            grid_intensity_kg_per_kwh: 0.0,
            base_construction_cost_per_m2: 1800.0,
        })
        .unwrap();

    let products = vec![MarketplaceProduct {
        id: "mk-carbon-cure".to_string(),
        name: "Carbon Cure".to_string(),
        company_name: "Acme Climate".to_string(),
        project_types: vec!["construction".to_string()],
        emissions_reduction_factor: 0.20,
        integration: IntegrationDetails {
            construction: Some(ConstructionIntegration {
                material: MaterialCategory::Concrete,
                mode: ConstructionIntegrationMode::DiscountCategoryTotal,
                unit_cost: None,
            }),
            livestock: None,
        },
    }];
    let discounted = apply_quantity_discounts(&assessment, &products);

    let concrete = discounted
        .materials
        .iter()
        .find(|material| material.category == MaterialCategory::Concrete)
        .unwrap();
    let original_concrete = assessment
        .materials
        .iter()
        .find(|material| material.category == MaterialCategory::Concrete)
        .unwrap();
    assert!(
        (concrete.baseline_tonnes - original_concrete.baseline_tonnes * 0.8).abs() < 1e-9
    );
    assert!(discounted.lifetime_adjusted_tonnes < assessment.lifetime_adjusted_tonnes);

    // Projection seeded from the discounted assessment: the green
    // premium shows up as a year-0 record.
    let financial = FinancialInputs::from_construction(
        &discounted,
        20,
        5.0,
        CarbonPriceSchedule::Flat(30.0),
    );
    let result = carbonlib::project(&financial);
    assert_eq!(result.years[0].year, 0);
    assert!(result.years[0].net_cash_flow < 0.0);
    assert_eq!(result.years.len(), 21);
}

#[test]
fn renovation_uses_reduced_cost_and_embodied_parameters() {
    let (library, config) = engine_fixture();
    let calculator = ConstructionCalculator::new(&library, &config);

    let base = BuildingInputs {
        project_type: ProjectType::NewConstruction,
        building_size: 1000.0,
        size_unit: Unit::SquareMetre,
        operational_rate_kg_per_m2: 40.0,
        lifespan_years: 50,
        materials: vec![MaterialSpec {
            category: MaterialCategory::Timber,
            selection: Selection::single("timber-clt"),
            volume: 300.0,
            unit: Unit::CubicMetre,
        }],
        measures: vec![],
        onsite_generation_kwh: 0.0,
        grid_intensity_kg_per_kwh: 0.0,
        base_construction_cost_per_m2: 2000.0,
    };
    let new_build = calculator.assess(&base).unwrap();
    let renovation = calculator
        .assess(&BuildingInputs {
            project_type: ProjectType::Renovation,
            ..base
        })
        .unwrap();

    assert!(
        (renovation.embodied_adjusted_tonnes - new_build.embodied_adjusted_tonnes * 0.35).abs()
            < 1e-9
    );
    assert!(
        (renovation.costs.construction_cost - new_build.costs.construction_cost * 0.6).abs()
            < 1e-6
    );
    // 8% premium vs 10%.
    let renovation_rate = renovation.costs.green_premium / renovation.costs.construction_cost;
    let new_rate = new_build.costs.green_premium / new_build.costs.construction_cost;
    assert!((renovation_rate - 0.08).abs() < 1e-9);
    assert!((new_rate - 0.10).abs() < 1e-9);
}

#[test]
fn alternate_catalog_is_injectable() {
    let document = r#"
        [[variants]]
        id = "feed-custom-standard"
        category = "feed"
        name = "Custom standard"
        emission_factor = 0.0
        relative_factor = 1.0
        is_external = false
        is_standard = true

        [[variants]]
        id = "feed-custom-improved"
        category = "feed"
        name = "Custom improved"
        emission_factor = 0.0
        relative_factor = 0.5
        is_external = false
        is_standard = false
    "#;
    let library = VariantLibrary::from_toml_str(document).unwrap();
    let config = EngineConfig::default();
    let calculator = LivestockCalculator::new(&library, &config);

    let mut inputs = LivestockInputs::new(HerdProfile {
        archetype: AnimalArchetype::BeefCattle,
        head_count: 10,
    });
    inputs.selections = carbonlib::LivestockSelections {
        feed: Selection::single("feed-custom-improved"),
        ..Default::default()
    };

    let assessment = calculator.assess(&inputs);
    // Unknown selections in the sparse catalog degrade to 1.0; the feed
    // factor comes from the injected catalog.
    assert!((assessment.adjusted_rate_kg - 99.0 * 0.5).abs() < 1e-9);
}
