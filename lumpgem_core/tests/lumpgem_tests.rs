//! End to end runs of LumpGEM on a toy network
//!
//! The network takes up A, converts it to B through either R1 or R2 and turns B
//! into biomass through B1:
//!
//! ```text
//! EX_A: -> A          (0 to 50)
//! R1:   A -> B
//! R2:   A -> B
//! B1:   B -> biomass  (biomass reaction)
//! EX_biomass: biomass ->
//! ```
//!
//! The toy thermodynamic database makes A -> B strongly unfavourable, so R1 and R2
//! can only carry flux while their thermodynamic constraints are switched off.
#![cfg(feature = "microlp")]

use std::path::PathBuf;

use indexmap::IndexMap;
use lumpgem_core::configuration::{LumpGemConfig, LumpGemConfigBuilder, SolverBackend};
use lumpgem_core::metabolic_model::model::Model;
use lumpgem_core::metabolic_model::reaction::ReactionBuilder;
use lumpgem_core::optimize::OptimizationStatus;
use lumpgem_core::thermo::database::ThermoDatabase;
use lumpgem_core::thermo::engine::{GibbsEnergyEngine, ThermoEngine, ThermoSettings};
use lumpgem_core::{LumpGem, OptimizationStage};

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn toy_model() -> Model {
    let mut model = Model::new_empty();
    for (id, mets, upper_bound) in [
        ("EX_A", vec![("A", 1.0)], 50.0),
        ("R1", vec![("A", -1.0), ("B", 1.0)], 1000.0),
        ("R2", vec![("A", -1.0), ("B", 1.0)], 1000.0),
        ("B1", vec![("B", -1.0), ("biomass", 1.0)], 1000.0),
        ("EX_biomass", vec![("biomass", -1.0)], 1000.0),
    ] {
        model.add_reaction(
            ReactionBuilder::default()
                .id(id.to_string())
                .metabolites(
                    mets.into_iter()
                        .map(|(m, s)| (m.to_string(), s))
                        .collect::<IndexMap<_, _>>(),
                )
                .lower_bound(0.)
                .upper_bound(upper_bound)
                .build()
                .unwrap(),
        );
    }
    model
}

fn toy_config(core: &[&str]) -> LumpGemConfig {
    LumpGemConfigBuilder::default()
        .biomass_rxns(vec!["B1".to_string()])
        .core_subsystems(vec![core.iter().map(|id| id.to_string()).collect::<Vec<_>>()])
        .carbon_uptake(10.0)
        .growth_rate(0.1)
        .thermo_data_path(data_path("toy_thermodb.json"))
        .solver(SolverBackend::Microlp)
        .build()
        .unwrap()
}

/// Every lumping indicator must appear in its own carbon uptake constraint and
/// nowhere else
fn assert_indicators_in_one_constraint<E: ThermoEngine>(lumpgem: &LumpGem<E>) {
    let problem = lumpgem.thermo_model().problem();
    for indicator in lumpgem.indicators().values() {
        let containing = problem
            .constraints()
            .values()
            .filter(|c| c.contains_variable(&indicator.variable_id))
            .map(|c| c.get_id().to_string())
            .collect::<Vec<_>>();
        assert_eq!(containing, vec![indicator.constraint_id.clone()]);
    }
}

#[test]
fn unfavourable_core_is_infeasible() {
    let config = toy_config(&["EX_A", "R1", "R2", "EX_biomass"]);
    let mut lumpgem = LumpGem::new(toy_model(), &config).unwrap();
    assert!(lumpgem.indicators().is_empty());

    let solution = lumpgem.run_optimisation().unwrap();
    assert_eq!(solution.status, OptimizationStatus::Infeasible);
    assert!(solution.objective_value.is_none());
    assert!(lumpgem.retained_reactions(&solution).is_empty());
    assert_eq!(lumpgem.stage(), OptimizationStage::Solved);
}

#[test]
fn non_core_reactions_skip_thermodynamics() {
    let config = toy_config(&["EX_A", "EX_biomass"]);
    let mut lumpgem = LumpGem::new(toy_model(), &config).unwrap();
    assert_eq!(lumpgem.indicators().len(), 2);

    let solution = lumpgem.run_optimisation().unwrap();
    assert!(solution.is_optimal());
    assert_indicators_in_one_constraint(&lumpgem);
    // No thermodynamic constraints were generated for the gated reactions
    let problem = lumpgem.thermo_model().problem();
    assert!(problem.get_variable("DG_R1").is_none());
    assert!(problem.get_variable("DG_R2").is_none());

    // Each non-core reaction is capped at the carbon uptake
    let biomass = lumpgem.reaction_flux(&solution, "B1").unwrap();
    assert!((biomass - 20.0).abs() < 1e-6, "biomass flux {}", biomass);
    assert!(biomass >= lumpgem.growth_rate());
    assert!((solution.objective_value.unwrap() - 20.0).abs() < 1e-6);
    assert_eq!(
        lumpgem.retained_reactions(&solution),
        vec!["R1".to_string(), "R2".to_string()]
    );
}

#[test]
fn reward_lumps_redundant_reaction() {
    let mut config = toy_config(&["EX_A", "EX_biomass"]);
    config.indicator_reward = 1000.0;
    let mut lumpgem = LumpGem::new(toy_model(), &config).unwrap();
    let solution = lumpgem.run_optimisation().unwrap();
    assert!(solution.is_optimal());

    // Switching both reactions off would leave the biomass reaction below the growth rate
    let retained = lumpgem.retained_reactions(&solution);
    assert_eq!(retained.len(), 1);
    let biomass = lumpgem.reaction_flux(&solution, "B1").unwrap();
    assert!((biomass - 10.0).abs() < 1e-6, "biomass flux {}", biomass);
    let lumped = if retained[0] == "R1" { "R2" } else { "R1" };
    assert!(lumpgem.reaction_flux(&solution, lumped).unwrap().abs() < 1e-6);
    assert!((solution.objective_value.unwrap() - 1010.0).abs() < 1e-6);
}

#[test]
fn favourable_core_reaction() {
    let database = ThermoDatabase::from_json_str(
        r#"{"metabolites": {"A": {"delta_gf": 0.0}, "B": {"delta_gf": -50.0}}}"#,
    )
    .unwrap();
    let engine = GibbsEnergyEngine::new(database, ThermoSettings::default()).unwrap();
    let config = toy_config(&["EX_A", "R1", "EX_biomass"]);
    let mut lumpgem = LumpGem::with_engine(toy_model(), &config, engine).unwrap();
    let solution = lumpgem.run_optimisation().unwrap();
    assert!(solution.is_optimal());
    assert_eq!(lumpgem.indicators().len(), 1);
    assert_indicators_in_one_constraint(&lumpgem);

    let problem = lumpgem.thermo_model().problem();
    assert!(problem.get_variable("DG_R1").is_some());
    assert!(problem.get_variable("DG_R2").is_none());
    assert!(lumpgem.thermo_model().thermo_computed("R1").unwrap());
    assert!(!lumpgem.thermo_model().thermo_computed("R2").unwrap());

    // All of the uptake reaches biomass, R1 in the forward direction
    let biomass = lumpgem.reaction_flux(&solution, "B1").unwrap();
    assert!((biomass - 50.0).abs() < 1e-6, "biomass flux {}", biomass);
    assert!(solution.value("DG_R1").unwrap() < 0.0);
    assert!((solution.value("FU_R1").unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn run_from_config_file() {
    let mut config = LumpGemConfig::from_json_file(data_path("toy_config.json")).unwrap();
    assert_eq!(config.thermo.temperature, 310.15);
    assert_eq!(
        config.thermo.max_concentration,
        ThermoSettings::default().max_concentration
    );
    assert_eq!(config.indicator_reward, 0.0);
    config.thermo_data_path = data_path("toy_thermodb.json");

    let mut lumpgem = LumpGem::new(toy_model(), &config).unwrap();
    assert_eq!(lumpgem.solver(), SolverBackend::Microlp);
    assert_eq!(
        lumpgem.thermo_model().engine().database().name.as_deref(),
        Some("toy")
    );
    let solution = lumpgem.run_optimisation().unwrap();
    assert!(solution.is_optimal());
    assert!(lumpgem.reaction_flux(&solution, "B1").unwrap() >= config.growth_rate);
}
