//! Turn planner against built-in content.

mod common;

use combat_core::{
    ActionId, CombatConfig, CombatantId, Command, ConditionDuration, ConditionInstance,
    ConditionKind, GridPosition,
};
use combat_runtime::scoring::{BaseValueCache, ScoringEngine};
use combat_runtime::{PlanStep, TurnPlanner};

use common::{encounter, oracles, spawn};

const ORC: CombatantId = CombatantId(1);
const GOBLIN: CombatantId = CombatantId(2);
const WIZARD: CombatantId = CombatantId(3);

#[test]
fn test_melee_actor_closes_in_and_attacks() {
    let oracles = oracles();
    let state = encounter(
        oracles.catalog(),
        11,
        &[spawn("orc", 1, 1, (0, 0)), spawn("goblin", 2, 2, (7, 0))],
    );
    let mut cache = BaseValueCache::new();

    let plan = TurnPlanner::new(oracles.config())
        .plan(ORC, &state, oracles.as_combat_env(), &mut cache)
        .unwrap();
    let commands = plan.commands();

    assert_eq!(commands.len(), 2, "unexpected plan: {commands:?}");
    let Command::Move { to } = commands[0] else {
        panic!("expected a move first, got {:?}", commands[0]);
    };
    assert_eq!(to.distance(GridPosition::new(7, 0)), 1);
    assert_eq!(
        commands[1],
        Command::Act {
            action: ActionId::new("greataxe"),
            target: Some(GOBLIN),
        }
    );
    assert_eq!(plan.steps.last(), Some(&PlanStep::Pass));
    assert!(!plan.budget_exhausted);
}

#[test]
fn test_moves_earn_only_net_progress() {
    let oracles = oracles();
    let state = encounter(
        oracles.catalog(),
        11,
        &[spawn("orc", 1, 1, (0, 0)), spawn("goblin", 2, 2, (7, 0))],
    );
    let weights = oracles.config().scoring.clone();
    let mut cache = BaseValueCache::new();
    let orc = state.combatant(ORC).unwrap().clone();

    let plan = TurnPlanner::new(oracles.config())
        .plan(ORC, &state, oracles.as_combat_env(), &mut cache)
        .unwrap();

    let mut walked = 0.0;
    let mut end = orc.position;
    for step in &plan.steps {
        if let PlanStep::Move { to, score } = step {
            walked += score.movement;
            end = *to;
        }
    }
    let mut scorer = ScoringEngine::new(&state, oracles.as_combat_env(), &weights, &mut cache);
    let desire = scorer.desire(&orc).unwrap();
    assert!((walked - desire.alignment(end)).abs() < 1e-9);

    let dashed = plan
        .steps
        .iter()
        .any(|step| matches!(step, PlanStep::Act { action, .. } if action.as_str() == "dash"));
    assert!(!dashed, "dashed instead of attacking: {:?}", plan.commands());
    assert!(end.distance(GridPosition::new(7, 0)) <= 1);
}

#[test]
fn test_budget_never_grows_along_a_plan() {
    let oracles = oracles();
    let state = encounter(
        oracles.catalog(),
        5,
        &[
            spawn("rogue", 1, 1, (0, 0)),
            spawn("goblin", 2, 2, (4, 0)),
            spawn("orc", 3, 2, (4, 3)),
        ],
    );
    let mut cache = BaseValueCache::new();

    let plan = TurnPlanner::new(oracles.config())
        .plan(CombatantId(1), &state, oracles.as_combat_env(), &mut cache)
        .unwrap();

    assert_eq!(plan.trail.len(), plan.steps.len() + 1);
    for pair in plan.trail.windows(2) {
        assert!(pair[1] <= pair[0], "budget grew: {:?} -> {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_planning_leaves_state_untouched() {
    let oracles = oracles();
    let state = encounter(
        oracles.catalog(),
        3,
        &[
            spawn("cleric", 1, 1, (0, 0)),
            spawn("fighter", 2, 1, (1, 1)),
            spawn("orc", 3, 2, (5, 0)),
        ],
    );
    let before = state.digest();
    let snapshot = state.clone();
    let mut cache = BaseValueCache::new();

    let planner = TurnPlanner::new(oracles.config());
    for actor in [CombatantId(1), CombatantId(2), CombatantId(3)] {
        planner.plan(actor, &state, oracles.as_combat_env(), &mut cache).unwrap();
    }

    assert_eq!(
        hex::encode(state.digest()),
        hex::encode(before),
        "planning changed the state digest"
    );
    assert_eq!(state, snapshot);
}

#[test]
fn test_incapacitated_actor_only_passes() {
    let oracles = oracles();
    let mut state = encounter(
        oracles.catalog(),
        9,
        &[spawn("goblin", 2, 2, (1, 0))],
    );
    let orc = oracles
        .catalog()
        .spawn(
            &combat_core::CreatureKind::new("orc"),
            ORC,
            combat_core::GroupId(1),
            GridPosition::ORIGIN,
        )
        .unwrap()
        .with_condition(ConditionInstance::new(
            ConditionKind::Paralyzed,
            ConditionDuration::Rounds(1),
        ));
    state.add_combatant(orc).unwrap();
    state.set_initiative(vec![ORC, GOBLIN]).unwrap();
    let mut cache = BaseValueCache::new();

    let plan = TurnPlanner::new(oracles.config())
        .plan(ORC, &state, oracles.as_combat_env(), &mut cache)
        .unwrap();

    assert!(plan.commands().is_empty());
    assert_eq!(plan.steps, vec![PlanStep::Pass]);
    assert_eq!(plan.value, 0.0);
}

#[test]
fn test_unknown_actor_is_rejected() {
    let oracles = oracles();
    let state = encounter(oracles.catalog(), 1, &[spawn("orc", 1, 1, (0, 0))]);
    let mut cache = BaseValueCache::new();

    let result = TurnPlanner::new(oracles.config()).plan(
        CombatantId(42),
        &state,
        oracles.as_combat_env(),
        &mut cache,
    );
    assert!(matches!(
        result,
        Err(combat_runtime::RuntimeError::UnknownCombatant(CombatantId(42)))
    ));
}

#[test]
fn test_ranged_actor_wants_out_of_melee_reach() {
    let oracles = oracles();
    let state = encounter(
        oracles.catalog(),
        4,
        &[spawn("wizard", 3, 1, (0, 0)), spawn("orc", 1, 2, (1, 0))],
    );
    let weights = oracles.config().scoring.clone();
    let mut cache = BaseValueCache::new();
    let wizard = state.combatant(WIZARD).unwrap().clone();

    let mut scorer = ScoringEngine::new(&state, oracles.as_combat_env(), &weights, &mut cache);
    let desire = scorer.desire(&wizard).unwrap();
    assert!(desire.resultant().x < 0.0);
    assert!(desire.alignment(GridPosition::new(-2, 0)) > desire.alignment(GridPosition::new(0, 1)));

    let plan = TurnPlanner::new(oracles.config())
        .plan(WIZARD, &state, oracles.as_combat_env(), &mut cache)
        .unwrap();
    let attacks_orc = plan
        .steps
        .iter()
        .any(|step| matches!(step, PlanStep::Act { target, .. } if *target == ORC));
    assert!(attacks_orc, "wizard never targeted the orc: {:?}", plan.commands());
}

#[test]
fn test_exhausted_search_falls_back_to_best_so_far() {
    let oracles = oracles();
    let state = encounter(
        oracles.catalog(),
        2,
        &[spawn("orc", 1, 1, (0, 0)), spawn("goblin", 2, 2, (7, 0))],
    );
    let config = CombatConfig::default().with_search(combat_core::SearchConfig {
        max_expansion_rounds: 1,
        ..combat_core::SearchConfig::default()
    });
    let mut cache = BaseValueCache::new();

    let plan = TurnPlanner::new(&config)
        .plan(ORC, &state, oracles.as_combat_env(), &mut cache)
        .unwrap();

    assert!(plan.budget_exhausted);
    assert_eq!(plan.expansion_rounds, 1);
    assert_eq!(plan.steps.len(), 1);
    assert!(plan.steps[0].is_move());
}
