//! Tests for the battle engine: scheduling, selection, resolution,
//! cancellation, history and victory.

use hecs::World;
use proptest::prelude::*;

use partbreak_core::commands::BattleCommand;
use partbreak_core::components::*;
use partbreak_core::config::{BattleConfig, PersonalityOverride, RoutineDef};
use partbreak_core::constants::TICK_INTERVAL_MS;
use partbreak_core::enums::*;
use partbreak_core::error::SelectionError;
use partbreak_core::events::{ActionResult, BattleEvent, DiagnosticKind, OutcomeKind, TickReport};
use partbreak_core::loadout::{CombatantLoadout, PartLoadout};
use partbreak_core::types::{CombatantId, TargetRef};

use crate::context::TurnContext;
use crate::engine::BattleEngine;
use crate::systems::{cancellation, execution, victory};
use crate::world_setup;

const A: CombatantId = CombatantId(1);
const B: CombatantId = CombatantId(2);
const E1: CombatantId = CombatantId(3);
const E2: CombatantId = CombatantId(4);

// ---- Fixtures ----

fn loadout(name: &str, team: TeamId, personality: Personality) -> CombatantLoadout {
    CombatantLoadout {
        name: name.into(),
        team,
        is_leader: false,
        control: ControlMode::Player,
        personality,
        head: PartLoadout::new(50, ActionStats::new(AttackType::Shoot, 10, 30)),
        right_arm: PartLoadout::new(60, ActionStats::new(AttackType::Strike, 20, 40)),
        left_arm: PartLoadout::new(60, ActionStats::new(AttackType::Shoot, 15, 45)),
        legs: PartLoadout::new(
            70,
            LegStats {
                mobility: 0,
                armor: 0,
                propulsion: 30,
                stability: 0,
            },
        ),
    }
}

fn with_hp(mut l: CombatantLoadout, hp: [i32; 4]) -> CombatantLoadout {
    l.head.hp = hp[0];
    l.right_arm.hp = hp[1];
    l.left_arm.hp = hp[2];
    l.legs.hp = hp[3];
    l
}

fn leader(mut l: CombatantLoadout) -> CombatantLoadout {
    l.is_leader = true;
    l
}

/// A can one-shot any head: success 200 against zero mobility always crits.
fn roster() -> Vec<CombatantLoadout> {
    let mut a = leader(loadout("A", TeamId::Team1, Personality::Hunter));
    a.left_arm.stats = ActionStats::new(AttackType::Shoot, 500, 200);
    vec![
        a,
        loadout("B", TeamId::Team1, Personality::Hunter),
        leader(loadout("E1", TeamId::Team2, Personality::Hunter)),
        loadout("E2", TeamId::Team2, Personality::Hunter),
    ]
}

fn started(roster: Vec<CombatantLoadout>) -> BattleEngine {
    started_with(
        BattleConfig {
            seed: 7,
            ..Default::default()
        },
        roster,
    )
}

fn started_with(config: BattleConfig, roster: Vec<CombatantLoadout>) -> BattleEngine {
    let mut engine = BattleEngine::new(config);
    engine.queue_commands([
        BattleCommand::LoadRoster { roster },
        BattleCommand::StartBattle,
    ]);
    engine.update(TICK_INTERVAL_MS);
    engine
}

fn step(engine: &mut BattleEngine) -> TickReport {
    engine.update(TICK_INTERVAL_MS)
}

fn set_state(engine: &mut BattleEngine, id: CombatantId, state: CombatantState) {
    let entity = engine.entity(id).unwrap();
    *engine
        .world_mut()
        .get::<&mut CombatantState>(entity)
        .unwrap() = state;
}

fn set_gauge(engine: &mut BattleEngine, id: CombatantId, value: f64) {
    let entity = engine.entity(id).unwrap();
    engine.world_mut().get::<&mut Gauge>(entity).unwrap().value = value;
}

fn gauge_of(engine: &BattleEngine, id: CombatantId) -> f64 {
    engine.snapshot().combatant(id).unwrap().gauge.value
}

/// Stage `id` with a selected action and a full gauge, so it executes next.
fn arm(engine: &mut BattleEngine, id: CombatantId, part: PartKey, target: Option<TargetRef>) {
    set_state(engine, id, CombatantState::ReadyToSelect);
    engine.select_action(id, part, target).unwrap();
    set_gauge(engine, id, 100.0);
}

fn resolved(report: &TickReport) -> Vec<&ActionResult> {
    report
        .events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::ActionResolved(result) => Some(result),
            _ => None,
        })
        .collect()
}

fn cancelled(report: &TickReport) -> Vec<&ActionResult> {
    report
        .events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::ActionCancelled(result) => Some(result),
            _ => None,
        })
        .collect()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = BattleEngine::new(BattleConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut engine_b = BattleEngine::new(BattleConfig {
        seed: 12345,
        ..Default::default()
    });
    engine_a.queue_command(BattleCommand::StartBattle);
    engine_b.queue_command(BattleCommand::StartBattle);

    for _ in 0..3000 {
        let report_a = step(&mut engine_a);
        let report_b = step(&mut engine_b);
        assert_eq!(
            serde_json::to_string(&report_a).unwrap(),
            serde_json::to_string(&report_b).unwrap(),
            "Reports diverged with same seed"
        );
        assert_eq!(
            serde_json::to_string(&engine_a.snapshot()).unwrap(),
            serde_json::to_string(&engine_b.snapshot()).unwrap(),
            "Snapshots diverged with same seed"
        );
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = BattleEngine::new(BattleConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = BattleEngine::new(BattleConfig {
        seed: 222,
        ..Default::default()
    });
    engine_a.queue_command(BattleCommand::StartBattle);
    engine_b.queue_command(BattleCommand::StartBattle);

    let mut diverged = false;
    for _ in 0..5000 {
        step(&mut engine_a);
        step(&mut engine_b);
        if serde_json::to_string(&engine_a.snapshot()).unwrap()
            != serde_json::to_string(&engine_b.snapshot()).unwrap()
        {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent rolls");
}

// ---- Phase machine ----

#[test]
fn test_start_battle_enters_selection() {
    let mut engine = BattleEngine::default();
    assert_eq!(engine.phase(), BattlePhase::Idle);

    engine.queue_command(BattleCommand::StartBattle);
    let report = step(&mut engine);

    let phases: Vec<BattlePhase> = report
        .events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::PhaseChanged { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            BattlePhase::BattleStart,
            BattlePhase::TurnStart,
            BattlePhase::ActionSelection
        ]
    );
    assert_eq!(report.phase, BattlePhase::ActionSelection);
    assert_eq!(report.turn_number, 1);

    let snap = engine.snapshot();
    assert_eq!(snap.combatants.len(), 6, "default scenario is a 3v3 skirmish");
    assert!(snap
        .combatants
        .iter()
        .all(|c| c.state == CombatantState::CooldownCharging && c.gauge.value > 0.0));
}

#[test]
fn test_invalid_roster_stays_idle() {
    let mut engine = BattleEngine::default();
    engine.queue_commands([
        BattleCommand::LoadRoster {
            roster: vec![loadout("Solo", TeamId::Team1, Personality::Hunter)],
        },
        BattleCommand::StartBattle,
    ]);
    let report = step(&mut engine);
    assert_eq!(report.phase, BattlePhase::Idle);
    assert!(engine.snapshot().combatants.is_empty());
}

#[test]
fn test_pause_freezes_battle() {
    let mut engine = started(roster());
    let before = engine.snapshot();

    engine.queue_command(BattleCommand::Pause);
    for _ in 0..10 {
        step(&mut engine);
    }
    assert!(engine.is_paused());
    let paused = engine.snapshot();
    assert_eq!(paused.time.tick, before.time.tick);
    assert_eq!(gauge_of(&engine, A), before.combatant(A).unwrap().gauge.value);

    engine.queue_command(BattleCommand::Resume);
    step(&mut engine);
    assert!(gauge_of(&engine, A) > before.combatant(A).unwrap().gauge.value);
}

#[test]
fn test_reset_returns_to_idle_and_restarts() {
    let mut engine = started(roster());
    for _ in 0..50 {
        step(&mut engine);
    }

    engine.queue_command(BattleCommand::Reset);
    let report = step(&mut engine);
    assert_eq!(report.phase, BattlePhase::Idle);
    assert_eq!(engine.world().len(), 0);
    assert!(engine.snapshot().combatants.is_empty());

    // The loaded roster is kept.
    engine.queue_command(BattleCommand::StartBattle);
    step(&mut engine);
    assert_eq!(engine.phase(), BattlePhase::ActionSelection);
    assert_eq!(engine.snapshot().combatants.len(), 4);
}

// ---- Gauges ----

#[test]
fn test_players_wait_at_full_gauge() {
    let mut engine = started(roster());
    let mut prompted = Vec::new();
    for _ in 0..1000 {
        for event in step(&mut engine).events {
            if let BattleEvent::AwaitingInput { combatant_id } = event {
                prompted.push(combatant_id);
            }
        }
    }
    prompted.sort();
    assert_eq!(prompted, vec![A, B, E1, E2], "each player prompted exactly once");

    let snap = engine.snapshot();
    for c in &snap.combatants {
        assert_eq!(c.state, CombatantState::ReadyToSelect);
        assert_eq!(c.gauge.value, c.gauge.max);
    }
    assert_eq!(
        engine.context().turn.action_queue.iter().copied().collect::<Vec<_>>(),
        vec![A, B, E1, E2]
    );
}

proptest! {
    #[test]
    fn prop_gauge_monotonic_while_charging(dts in proptest::collection::vec(0.0f64..80.0, 1..150)) {
        let mut engine = started(roster());
        let mut last = engine.snapshot();
        for dt in dts {
            engine.update(dt);
            let now = engine.snapshot();
            for (before, after) in last.combatants.iter().zip(&now.combatants) {
                prop_assert!(after.gauge.value >= before.gauge.value);
                prop_assert!(after.gauge.value <= after.gauge.max);
            }
            last = now;
        }
    }
}

#[test]
fn test_heavier_part_charges_slower() {
    let mut engine = started(roster());
    set_state(&mut engine, A, CombatantState::ReadyToSelect);
    set_state(&mut engine, B, CombatantState::ReadyToSelect);
    engine
        .select_action(A, PartKey::LeftArm, Some(TargetRef::new(E1, PartKey::Head)))
        .unwrap();
    engine
        .select_action(B, PartKey::LeftArm, Some(TargetRef::new(E1, PartKey::Head)))
        .unwrap();

    let snap = engine.snapshot();
    let a = snap.combatant(A).unwrap();
    let b = snap.combatant(B).unwrap();
    assert_eq!(a.state, CombatantState::SelectedCharging);
    assert_eq!(a.gauge.value, 0.0);
    assert!(a.gauge.speed_multiplier > b.gauge.speed_multiplier);

    for _ in 0..20 {
        step(&mut engine);
    }
    assert!(gauge_of(&engine, A) < gauge_of(&engine, B));
}

// ---- Scheduling ----

#[test]
fn test_execution_order_by_propulsion_then_id() {
    let mut world = World::new();
    let mut slow = loadout("slow", TeamId::Team1, Personality::Hunter);
    slow.legs.stats.propulsion = 30;
    let mut fast = loadout("fast", TeamId::Team1, Personality::Hunter);
    fast.legs.stats.propulsion = 50;
    let tied = fast.clone();
    let roster = vec![slow, fast, tied, loadout("idle", TeamId::Team2, Personality::Hunter)];
    let index = world_setup::spawn_roster(&mut world, &roster, &BattleConfig::default().gauge);

    for id in [A, B, E1] {
        *world.get::<&mut CombatantState>(index[&id]).unwrap() = CombatantState::ReadyToExecute;
    }
    let queue: Vec<CombatantId> = execution::build_queue(&world).into_iter().collect();
    assert_eq!(queue, vec![B, E1, A]);
}

#[test]
fn test_one_actor_per_update() {
    let mut engine = started(roster());
    arm(&mut engine, A, PartKey::Head, Some(TargetRef::new(E2, PartKey::Legs)));
    arm(&mut engine, B, PartKey::Head, Some(TargetRef::new(E2, PartKey::Legs)));

    let report = step(&mut engine);
    assert_eq!(report.phase, BattlePhase::ActionExecution);
    assert_eq!(engine.context().turn.execution_queue.len(), 2);

    let first = step(&mut engine);
    assert_eq!(resolved(&first).len(), 1);
    assert_eq!(first.phase, BattlePhase::ActionExecution);

    let second = step(&mut engine);
    assert_eq!(resolved(&second).len(), 1);
    assert_eq!(second.phase, BattlePhase::TurnEnd);
}

#[test]
fn test_turn_ends_once_selections_resolve() {
    let mut engine = started(roster());
    arm(&mut engine, A, PartKey::Head, Some(TargetRef::new(E2, PartKey::Legs)));
    set_state(&mut engine, B, CombatantState::ReadyToSelect);
    engine
        .select_action(B, PartKey::Head, Some(TargetRef::new(E2, PartKey::Legs)))
        .unwrap();

    // B's selection is still charging, so the turn stays open.
    step(&mut engine);
    let report = step(&mut engine);
    assert_eq!(resolved(&report).len(), 1);
    assert_eq!(report.phase, BattlePhase::ActionSelection);
    assert_eq!(report.turn_number, 1);

    set_gauge(&mut engine, B, 100.0);
    step(&mut engine);
    let report = step(&mut engine);
    assert_eq!(resolved(&report).len(), 1);
    assert!(report.events.contains(&BattleEvent::PhaseChanged {
        phase: BattlePhase::TurnEnd,
        turn_number: 1,
    }));
    assert_eq!(engine.context().turn.resolved_actions.len(), 2);

    let next = step(&mut engine);
    assert_eq!(next.turn_number, 2);
    assert_eq!(next.phase, BattlePhase::ActionSelection);
    assert!(next.events.contains(&BattleEvent::PhaseChanged {
        phase: BattlePhase::TurnStart,
        turn_number: 2,
    }));
    assert!(engine.context().turn.resolved_actions.is_empty());
}

// ---- Selection ----

#[test]
fn test_rejected_selection_keeps_actor_queued() {
    let mut engine = started(roster());
    while engine.snapshot().combatant(A).unwrap().state != CombatantState::ReadyToSelect {
        step(&mut engine);
    }

    let err = engine.select_action(A, PartKey::LeftArm, None).unwrap_err();
    assert_eq!(err, SelectionError::TargetRequired(A, PartKey::LeftArm));
    assert_eq!(
        engine.select_action(A, PartKey::Legs, None).unwrap_err(),
        SelectionError::PartHasNoAction(A, PartKey::Legs)
    );
    assert_eq!(
        engine
            .select_action(A, PartKey::LeftArm, Some(TargetRef::new(B, PartKey::Head)))
            .unwrap_err(),
        SelectionError::TargetOutOfScope(B)
    );
    assert_eq!(
        engine.select_action(CombatantId(99), PartKey::Head, None).unwrap_err(),
        SelectionError::UnknownCombatant(CombatantId(99))
    );
    assert!(engine.context().turn.action_queue.contains(&A));

    set_state(&mut engine, E1, CombatantState::Broken);
    assert_eq!(
        engine.select_action(E1, PartKey::Head, None).unwrap_err(),
        SelectionError::NotReadyToSelect(E1)
    );

    let report = step(&mut engine);
    let rejections = report
        .events
        .iter()
        .filter(|e| matches!(e, BattleEvent::SelectionRejected { .. }))
        .count();
    assert_eq!(rejections, 5);

    engine
        .select_action(A, PartKey::LeftArm, Some(TargetRef::new(E1, PartKey::Head)))
        .unwrap();
    assert!(!engine.context().turn.action_queue.contains(&A));
    assert_eq!(
        engine.snapshot().combatant(A).unwrap().state,
        CombatantState::SelectedCharging
    );
}

#[test]
fn test_post_timing_selection_drops_target() {
    let mut engine = started(roster());
    set_state(&mut engine, A, CombatantState::ReadyToSelect);
    engine
        .select_action(A, PartKey::RightArm, Some(TargetRef::new(E1, PartKey::Head)))
        .unwrap();
    let action = engine.snapshot().combatant(A).unwrap().action;
    assert_eq!(action.part_key, Some(PartKey::RightArm));
    assert_eq!(action.target_id, None);
}

#[test]
fn test_selection_through_command() {
    let mut engine = started(roster());
    set_state(&mut engine, B, CombatantState::ReadyToSelect);
    engine.queue_command(BattleCommand::SelectAction {
        combatant_id: B,
        part_key: PartKey::Head,
        target: Some(TargetRef::new(E1, PartKey::Legs)),
    });
    let report = step(&mut engine);
    assert!(report.events.iter().any(|e| matches!(
        e,
        BattleEvent::ActionSelected { combatant_id, .. } if *combatant_id == B
    )));
}

// ---- Resolution, history, cancellation ----

#[test]
fn test_cancel_on_target_lost_inverts_gauge() {
    let mut engine = started(roster());
    arm(&mut engine, A, PartKey::LeftArm, Some(TargetRef::new(E2, PartKey::Head)));
    set_state(&mut engine, B, CombatantState::ReadyToSelect);
    engine
        .select_action(B, PartKey::Head, Some(TargetRef::new(E2, PartKey::LeftArm)))
        .unwrap();

    step(&mut engine); // A becomes ready, execution begins
    let b_gauge = gauge_of(&engine, B);
    assert!(b_gauge > 0.0);

    let report = step(&mut engine);
    let hits = resolved(&report);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].outcome.kind, OutcomeKind::Hit);
    assert!(hits[0].outcome.is_critical);
    assert!(hits[0].applied_effects[0].is_player_broken);

    let cancels = cancelled(&report);
    assert_eq!(cancels.len(), 1);
    assert_eq!(cancels[0].attacker_id, B);
    assert!(cancels[0].cancelled);
    assert_eq!(cancels[0].cancel_reason, Some(CancelReason::TargetLost));

    let snap = engine.snapshot();
    let b = snap.combatant(B).unwrap();
    assert_eq!(b.state, CombatantState::CooldownCharging);
    assert!(b.action.is_empty());
    assert!((b.gauge.value - (b.gauge.max - b_gauge)).abs() < 1e-9);
    assert_eq!(snap.combatant(E2).unwrap().state, CombatantState::Broken);
    assert_eq!(snap.phase, BattlePhase::TurnEnd, "E1 still leads team 2");
}

#[test]
fn test_cancellation_pass_on_broken_part() {
    let mut world = World::new();
    let index = world_setup::spawn_roster(&mut world, &roster(), &BattleConfig::default().gauge);
    let mut turn = TurnContext::default();

    {
        let (state, gauge, action) = world
            .query_one_mut::<(&mut CombatantState, &mut Gauge, &mut Action)>(index[&B])
            .unwrap();
        *state = CombatantState::ReadyToExecute;
        gauge.value = 100.0;
        *action = Action {
            part_key: Some(PartKey::RightArm),
            target_id: None,
            target_part_key: None,
        };
    }
    turn.execution_queue.push_back(B);
    world.get::<&mut Parts>(index[&B]).unwrap().right_arm.is_broken = true;

    let results = cancellation::run(&mut world, &index, &mut turn);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].cancel_reason, Some(CancelReason::PartBroken));
    assert!(turn.execution_queue.is_empty());
    assert_eq!(world.get::<&Gauge>(index[&B]).unwrap().value, 0.0);
}

#[test]
fn test_hit_records_history() {
    let mut engine = started(roster());
    arm(&mut engine, A, PartKey::LeftArm, Some(TargetRef::new(E2, PartKey::Legs)));
    step(&mut engine);
    step(&mut engine);

    let snap = engine.snapshot();
    let hit = TargetRef::new(E2, PartKey::Legs);
    assert_eq!(snap.combatant(A).unwrap().battle_log.last_attack, Some(hit));
    assert_eq!(snap.combatant(E2).unwrap().battle_log.last_attacked_by, Some(A));
    assert_eq!(snap.team_history.team1.last_attack, Some(hit));
    assert_eq!(snap.team_history.team2.leader_last_attacked_by, None);
    assert!(snap.combatant(E2).unwrap().parts.legs.is_broken);

    let hints = engine.recommend_targets(E2, PartKey::LeftArm);
    assert!(!hints.is_empty());
}

/// Attack with A until `done` accepts a result, aiming at `aim(i)` on try `i`.
fn attack_until(
    engine: &mut BattleEngine,
    part: PartKey,
    aim: impl Fn(usize) -> TargetRef,
    done: impl Fn(&ActionResult) -> bool,
) -> Option<(TargetRef, ActionResult)> {
    for i in 0..40 {
        let target = aim(i);
        arm(engine, A, part, Some(target));
        step(engine);
        let report = step(engine);
        let result = resolved(&report)[0].clone();
        if done(&result) {
            return Some((target, result));
        }
    }
    None
}

#[test]
fn test_evaded_attack_records_history() {
    let mut roster = roster();
    roster[3] = with_hp(roster[3].clone(), [500, 500, 500, 500]);
    roster[3].legs.stats.mobility = 10_000;
    let mut engine = started(roster);

    let (aimed, result) = attack_until(
        &mut engine,
        PartKey::Head,
        |i| TargetRef::new(E2, PartKey::ALL[i % 4]),
        |r| r.outcome.kind == OutcomeKind::Evaded,
    )
    .expect("near-certain evasion never happened");

    assert!(result.applied_effects.is_empty());
    assert!(!result.outcome.is_critical);
    assert_eq!(result.outcome.struck_part, Some(aimed.part_key));
    assert_eq!(result.intended_target_id, Some(E2));

    let snap = engine.snapshot();
    assert_eq!(snap.combatant(A).unwrap().battle_log.last_attack, Some(aimed));
    assert_eq!(snap.combatant(E2).unwrap().battle_log.last_attacked_by, Some(A));
    assert_eq!(snap.team_history.team1.last_attack, Some(aimed));
}

#[test]
fn test_defense_redirects_to_sturdiest_limb() {
    let mut roster = roster();
    roster[0].head.stats = ActionStats::new(AttackType::Shoot, 1, 0);
    roster[3] = with_hp(roster[3].clone(), [50, 60, 90, 70]);
    roster[3].legs.stats.armor = 10_000;
    let mut engine = started(roster);

    let (_, result) = attack_until(
        &mut engine,
        PartKey::Head,
        |_| TargetRef::new(E2, PartKey::Head),
        |r| r.outcome.is_defended,
    )
    .expect("near-certain defense never happened");

    assert_eq!(result.outcome.kind, OutcomeKind::Hit);
    assert!(!result.outcome.is_critical);
    assert_eq!(result.outcome.struck_part, Some(PartKey::LeftArm));
    let damage = &result.applied_effects[0];
    assert_eq!(damage.part_key, Some(PartKey::LeftArm));
    assert_eq!(damage.new_value, damage.old_value - 1);
    assert_eq!(
        engine.snapshot().combatant(A).unwrap().battle_log.last_attack,
        Some(TargetRef::new(E2, PartKey::LeftArm))
    );
}

#[test]
fn test_defend_buff_raises_defense() {
    let mut roster = roster();
    roster[0].head.stats = ActionStats::new(AttackType::Shoot, 1, 0);
    roster[3].head.stats = ActionStats::new(AttackType::Defend, 10_000, 0);
    let mut engine = started(roster);

    arm(&mut engine, E2, PartKey::Head, None);
    step(&mut engine);
    let report = step(&mut engine);
    let effect = resolved(&report)[0].applied_effects[0].clone();
    assert_eq!(effect.effect_type, EffectType::ApplyDefend);
    assert_eq!((effect.target_id, effect.new_value), (E2, 10_000));

    // Bare armor 0 defends 5% of the time; the buff takes it to the cap.
    let mut defended = 0;
    for _ in 0..20 {
        arm(&mut engine, A, PartKey::Head, Some(TargetRef::new(E2, PartKey::RightArm)));
        step(&mut engine);
        let report = step(&mut engine);
        if resolved(&report)[0].outcome.is_defended {
            defended += 1;
        }
    }
    assert!(defended >= 12, "only {defended} of 20 attacks defended");
    assert!(engine
        .snapshot()
        .combatant(E2)
        .unwrap()
        .active_effects
        .has(EffectType::ApplyDefend));
}

#[test]
fn test_leader_falls_game_over() {
    let mut engine = started(roster());
    arm(&mut engine, A, PartKey::LeftArm, Some(TargetRef::new(E1, PartKey::Head)));
    set_state(&mut engine, B, CombatantState::ReadyToSelect);
    engine
        .select_action(B, PartKey::Head, Some(TargetRef::new(E2, PartKey::Head)))
        .unwrap();
    step(&mut engine);
    let report = step(&mut engine);

    assert_eq!(report.phase, BattlePhase::GameOver);
    assert!(report.events.iter().any(|e| matches!(
        e,
        BattleEvent::GameOver {
            winning_team: Some(TeamId::Team1)
        }
    )));
    let snap = engine.snapshot();
    assert_eq!(snap.winning_team, Some(TeamId::Team1));
    assert_eq!(snap.team_history.team2.leader_last_attacked_by, Some(A));
    assert!(snap.combatants.iter().all(|c| c.action.is_empty()));
    assert!(engine.context().turn.execution_queue.is_empty());
    assert!(engine.context().turn.action_queue.is_empty());

    // Terminal: nothing moves any more.
    let frozen = serde_json::to_string(&engine.snapshot()).unwrap();
    for _ in 0..10 {
        assert!(step(&mut engine).events.is_empty());
    }
    assert_eq!(serde_json::to_string(&engine.snapshot()).unwrap(), frozen);
}

#[test]
fn test_disrupt_interrupts_charging_target() {
    let mut roster = roster();
    roster[0].right_arm.stats = ActionStats::new(AttackType::Disrupt, 1, 200);
    roster[2] = with_hp(roster[2].clone(), [500, 500, 500, 500]);
    roster[3] = with_hp(roster[3].clone(), [300, 400, 400, 400]);
    let mut engine = started(roster);

    arm(&mut engine, A, PartKey::RightArm, None);
    set_state(&mut engine, E2, CombatantState::ReadyToSelect);
    engine
        .select_action(E2, PartKey::Head, Some(TargetRef::new(B, PartKey::Head)))
        .unwrap();

    step(&mut engine);
    let e2_gauge = gauge_of(&engine, E2);
    let report = step(&mut engine);

    let hits = resolved(&report);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].intended_target_id, Some(E2), "post-timing retarget to lowest HP");
    let effects: Vec<EffectType> = hits[0].applied_effects.iter().map(|e| e.effect_type).collect();
    assert_eq!(effects, vec![EffectType::Damage, EffectType::Interrupt]);

    let cancels = cancelled(&report);
    assert_eq!(cancels.len(), 1);
    assert_eq!(cancels[0].attacker_id, E2);
    assert_eq!(cancels[0].cancel_reason, Some(CancelReason::Interrupted));

    let e2 = engine.snapshot().combatant(E2).unwrap().clone();
    assert_eq!(e2.state, CombatantState::CooldownCharging);
    assert!((e2.gauge.value - (e2.gauge.max - e2_gauge)).abs() < 1e-9);
    assert_eq!(e2.parts.head.hp, 300 - (200 / 4 + 1));
}

#[test]
fn test_scan_buffs_team_and_expires() {
    let mut roster = roster();
    roster[1].head.stats = ActionStats::new(AttackType::Scan, 20, 0);
    let mut engine = started(roster);

    arm(&mut engine, B, PartKey::Head, None);
    step(&mut engine);
    let report = step(&mut engine);
    let result = resolved(&report)[0].clone();
    assert_eq!(result.outcome.kind, OutcomeKind::Supported);
    let buffed: Vec<CombatantId> = result.applied_effects.iter().map(|e| e.target_id).collect();
    assert_eq!(buffed, vec![A, B]);

    let snap = engine.snapshot();
    let scan = snap.combatant(A).unwrap().active_effects.effects[0];
    assert_eq!(scan.effect_type, EffectType::ApplyScan);
    assert_eq!(scan.value, 10);
    assert_eq!(scan.duration, 3);
    assert_eq!(
        snap.combatant(B).unwrap().active_effects.effects[0].duration,
        3,
        "effects gained by an action are not charged for it"
    );

    // Each of B's later actions wears its scan down.
    for remaining in [2, 1] {
        arm(&mut engine, B, PartKey::LeftArm, Some(TargetRef::new(E2, PartKey::Legs)));
        step(&mut engine);
        step(&mut engine);
        let effects = engine.snapshot().combatant(B).unwrap().active_effects.clone();
        assert_eq!(effects.effects[0].duration, remaining);
    }
    arm(&mut engine, B, PartKey::LeftArm, Some(TargetRef::new(E2, PartKey::RightArm)));
    step(&mut engine);
    step(&mut engine);
    assert!(engine.snapshot().combatant(B).unwrap().active_effects.effects.is_empty());
}

#[test]
fn test_heal_restores_most_damaged_part() {
    let mut roster = roster();
    roster[1].right_arm.stats = ActionStats::new(AttackType::Heal, 25, 0);
    let mut engine = started(roster);
    {
        let entity = engine.entity(A).unwrap();
        let mut parts = engine.world_mut().get::<&mut Parts>(entity).unwrap();
        parts.right_arm.hp = 50;
        parts.legs.hp = 20;
    }

    arm(&mut engine, B, PartKey::RightArm, Some(TargetRef::new(A, PartKey::Head)));
    step(&mut engine);
    let report = step(&mut engine);
    let effect = resolved(&report)[0].applied_effects[0].clone();
    assert_eq!(effect.effect_type, EffectType::Heal);
    assert_eq!(effect.part_key, Some(PartKey::Legs));
    assert_eq!((effect.old_value, effect.new_value), (20, 45));
}

#[test]
fn test_missing_component_drops_action() {
    let mut engine = started(roster());
    arm(&mut engine, B, PartKey::Head, Some(TargetRef::new(E1, PartKey::Legs)));
    step(&mut engine);
    let entity = engine.entity(B).unwrap();
    engine.world_mut().remove_one::<Profile>(entity).unwrap();

    let report = step(&mut engine);
    let results = resolved(&report);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome.kind, OutcomeKind::Dropped);

    let world = engine.world();
    assert_eq!(
        *world.get::<&CombatantState>(entity).unwrap(),
        CombatantState::CooldownCharging
    );
    assert_eq!(world.get::<&Gauge>(entity).unwrap().value, 0.0);
    assert!(world.get::<&Action>(entity).unwrap().is_empty());
    assert!(!report
        .events
        .iter()
        .any(|e| matches!(e, BattleEvent::GameOver { .. })));
    assert_eq!(report.phase, BattlePhase::TurnEnd);
}

#[test]
fn test_decision_diagnostics_are_reported() {
    let config = BattleConfig {
        seed: 3,
        personalities: vec![PersonalityOverride {
            personality: Personality::Hunter,
            routines: vec![RoutineDef {
                condition: None,
                part: "PowerfulAttack".into(),
                target: "Sniper".into(),
            }],
            fallback: "RandomEnemy".into(),
        }],
        ..Default::default()
    };
    let mut roster = roster();
    roster[0].control = ControlMode::Ai;
    let mut engine = started_with(config, roster);

    let mut seen = Vec::new();
    for _ in 0..500 {
        for event in step(&mut engine).events {
            if let BattleEvent::Diagnostic(diagnostic) = event {
                seen.push(diagnostic);
            }
        }
        if !seen.is_empty() {
            break;
        }
    }
    let diagnostic = seen.first().expect("A never decided");
    assert_eq!(diagnostic.personality, Personality::Hunter);
    assert_eq!(diagnostic.routine_index, Some(0));
    assert_eq!(
        diagnostic.kind,
        DiagnosticKind::UnknownTargetStrategy("Sniper".into())
    );
    // The fallback still produced an action.
    assert_ne!(
        engine.snapshot().combatant(A).unwrap().state,
        CombatantState::ReadyToSelect
    );
}

// ---- Configuration ----

#[test]
fn test_invalid_tuning_is_replaced() {
    let mut config = BattleConfig {
        seed: 5,
        ..Default::default()
    };
    config.combat.evasion_max = 1.0;
    config.combat.damage_divisor = 0;

    assert!(BattleEngine::try_new(config.clone()).is_err());
    let engine = BattleEngine::new(config);
    assert_eq!(engine.config().combat, BattleConfig::default().combat);
    assert_eq!(engine.config().seed, 5);
    assert!(BattleEngine::try_new(BattleConfig::default()).is_ok());
}

// ---- Victory ----

#[test]
fn test_victory_rules() {
    let mut world = World::new();
    let index = world_setup::spawn_roster(&mut world, &roster(), &BattleConfig::default().gauge);
    assert_eq!(victory::check(&world, TeamId::Team1), None);

    // Non-leader down: nothing decided.
    world.get::<&mut Parts>(index[&E2]).unwrap().head.is_broken = true;
    assert_eq!(victory::check(&world, TeamId::Team1), None);

    // Both leaders down at once: the acting side wins.
    world.get::<&mut Parts>(index[&A]).unwrap().head.is_broken = true;
    world.get::<&mut Parts>(index[&E1]).unwrap().head.is_broken = true;
    assert_eq!(victory::check(&world, TeamId::Team2), Some(TeamId::Team2));
}

#[test]
fn test_leaderless_team_loses_when_wiped() {
    let mut roster = roster();
    roster[0].is_leader = false;
    let mut world = World::new();
    let index = world_setup::spawn_roster(&mut world, &roster, &BattleConfig::default().gauge);

    world.get::<&mut Parts>(index[&A]).unwrap().head.is_broken = true;
    assert_eq!(victory::check(&world, TeamId::Team2), None);
    world.get::<&mut Parts>(index[&B]).unwrap().head.is_broken = true;
    assert_eq!(victory::check(&world, TeamId::Team2), Some(TeamId::Team2));
}

#[test]
fn test_ai_duel_runs_to_game_over() {
    let mut engine = BattleEngine::new(BattleConfig {
        seed: 99,
        ..Default::default()
    });
    engine.queue_commands([
        BattleCommand::SelectScenario {
            scenario: ScenarioId::Duel,
        },
        BattleCommand::StartBattle,
    ]);

    let mut resolved_count = 0;
    let mut turn_ends = 0;
    for _ in 0..200_000 {
        let report = step(&mut engine);
        resolved_count += resolved(&report).len();
        turn_ends += report
            .events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BattleEvent::PhaseChanged {
                        phase: BattlePhase::TurnEnd,
                        ..
                    }
                )
            })
            .count();
        if report.phase == BattlePhase::GameOver {
            break;
        }
    }
    assert_eq!(engine.phase(), BattlePhase::GameOver);
    assert!(engine.snapshot().winning_team.is_some());
    assert!(resolved_count > 0);
    assert!(turn_ends > 0);
    assert!(engine.snapshot().turn_number > 1);
}
