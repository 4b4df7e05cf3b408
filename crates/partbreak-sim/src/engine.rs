//! Battle engine: the core of the game.
//!
//! `BattleEngine` owns the hecs ECS world, the battle context and the seeded
//! RNG. It processes commands, steps the phase machine and produces
//! `BattleSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use partbreak_ai::decision::{determine_action, retarget};
use partbreak_ai::hints::{recommend_targets, TargetHint};
use partbreak_ai::personalities::PersonalityRegistry;
use partbreak_core::commands::BattleCommand;
use partbreak_core::components::{Action, Parts, Profile};
use partbreak_core::config::BattleConfig;
use partbreak_core::enums::*;
use partbreak_core::error::{ConfigError, ResolveError, SelectionError};
use partbreak_core::events::{ActionOutcome, ActionResult, BattleEvent, OutcomeKind, TickReport};
use partbreak_core::loadout::CombatantLoadout;
use partbreak_core::state::BattleSnapshot;
use partbreak_core::types::{CombatantId, SimTime, TargetRef};

use crate::context::BattleContext;
use crate::scenario;
use crate::systems;
use crate::world_setup;

/// The battle engine. Owns the ECS world and all battle state.
pub struct BattleEngine {
    world: World,
    index: BTreeMap<CombatantId, Entity>,
    context: BattleContext,
    time: SimTime,
    paused: bool,
    rng: ChaCha8Rng,
    config: BattleConfig,
    registry: PersonalityRegistry,
    scenario: ScenarioId,
    roster: Option<Vec<CombatantLoadout>>,
    command_queue: VecDeque<BattleCommand>,
    /// Player combatants already told to pick an action.
    awaiting: BTreeSet<CombatantId>,
    events: Vec<BattleEvent>,
}

impl Default for BattleEngine {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

impl BattleEngine {
    /// Create a new engine. Personality overrides in `config` replace the
    /// built-in strategy sets. Invalid tuning is logged and replaced by the
    /// defaults; the seed and personalities are kept. Use `try_new` to
    /// reject it instead.
    pub fn new(config: BattleConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                error!(%err, "invalid battle config, using default tuning");
                BattleConfig {
                    seed: config.seed,
                    personalities: config.personalities,
                    ..BattleConfig::default()
                }
            }
        };
        Self::with_valid_config(config)
    }

    /// Create a new engine, refusing a config that fails validation.
    pub fn try_new(config: BattleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: BattleConfig) -> Self {
        Self {
            world: World::new(),
            index: BTreeMap::new(),
            context: BattleContext::default(),
            time: SimTime::default(),
            paused: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            registry: PersonalityRegistry::with_overrides(&config.personalities),
            config,
            scenario: ScenarioId::default(),
            roster: None,
            command_queue: VecDeque::new(),
            awaiting: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    /// Queue a command for processing at the start of the next update.
    pub fn queue_command(&mut self, command: BattleCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = BattleCommand>) {
        self.command_queue.extend(commands);
    }

    /// Process queued commands, then advance the battle by `dt_ms`.
    ///
    /// In the execution phase exactly one actor is resolved per call, and it
    /// is fully committed (effects, history, cancellations, victory) before
    /// this returns.
    pub fn update(&mut self, dt_ms: f64) -> TickReport {
        self.process_commands();

        if !self.paused && self.is_running() {
            self.run_systems(dt_ms);
            self.time.advance(dt_ms);
        }

        TickReport {
            phase: self.context.phase,
            turn_number: self.context.turn.number,
            events: std::mem::take(&mut self.events),
        }
    }

    /// Full view of the battle. This is also what the AI reads.
    pub fn snapshot(&self) -> BattleSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.context, &self.time)
    }

    /// Choose the action of a combatant that is ready to select. Used for
    /// both AI output and player input. A rejected selection leaves the
    /// combatant queued and reports `SelectionRejected`.
    pub fn select_action(
        &mut self,
        combatant_id: CombatantId,
        part_key: PartKey,
        target: Option<TargetRef>,
    ) -> Result<(), SelectionError> {
        let validated = if self.is_running() {
            systems::selection::validate(
                &self.world,
                &self.index,
                &self.config.gauge,
                combatant_id,
                part_key,
                target,
            )
        } else {
            Err(SelectionError::NotReadyToSelect(combatant_id))
        };

        match validated {
            Ok(selection) => {
                let action = selection.action;
                systems::selection::commit(&mut self.world, selection);
                self.context
                    .turn
                    .action_queue
                    .retain(|&queued| queued != combatant_id);
                self.awaiting.remove(&combatant_id);

                let target = action
                    .target_id
                    .zip(action.target_part_key)
                    .map(|(id, key)| TargetRef::new(id, key));
                debug!(actor = %combatant_id, part = %part_key, ?target, "action selected");
                self.events.push(BattleEvent::ActionSelected {
                    combatant_id,
                    part_key,
                    target,
                });
                Ok(())
            }
            Err(err) => {
                warn!(actor = %combatant_id, %err, "selection rejected");
                self.events.push(BattleEvent::SelectionRejected {
                    combatant_id,
                    reason: err.to_string(),
                });
                if self.state_of(combatant_id) == Some(CombatantState::ReadyToSelect) {
                    self.context.turn.enqueue_selection(combatant_id);
                }
                Err(err)
            }
        }
    }

    /// Player-assist target recommendations for `combatant_id` using
    /// `part_key`, drawn from the combatant's own personality.
    pub fn recommend_targets(&self, combatant_id: CombatantId, part_key: PartKey) -> Vec<TargetHint> {
        recommend_targets(&self.snapshot(), combatant_id, part_key, &self.registry)
    }

    /// Get the current battle phase.
    pub fn phase(&self) -> BattlePhase {
        self.context.phase
    }

    /// Get the current battle time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get a mutable reference to the ECS world (for tests that stage states).
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub fn context(&self) -> &BattleContext {
        &self.context
    }

    /// Entity of a combatant (for tests that stage states).
    #[cfg(test)]
    pub fn entity(&self, id: CombatantId) -> Option<Entity> {
        self.index.get(&id).copied()
    }

    fn is_running(&self) -> bool {
        !matches!(self.context.phase, BattlePhase::Idle | BattlePhase::GameOver)
    }

    fn state_of(&self, id: CombatantId) -> Option<CombatantState> {
        let entity = *self.index.get(&id)?;
        self.world
            .get::<&CombatantState>(entity)
            .ok()
            .map(|state| *state)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: BattleCommand) {
        match command {
            BattleCommand::SelectScenario { scenario } => {
                if self.context.phase == BattlePhase::Idle {
                    self.scenario = scenario;
                    self.roster = None;
                } else {
                    warn!(?scenario, "scenario can only change while idle");
                }
            }
            BattleCommand::LoadRoster { roster } => {
                if self.context.phase == BattlePhase::Idle {
                    self.roster = Some(roster);
                } else {
                    warn!("roster can only change while idle");
                }
            }
            BattleCommand::StartBattle => self.start_battle(),
            BattleCommand::SelectAction {
                combatant_id,
                part_key,
                target,
            } => {
                // Rejections are reported as events.
                let _ = self.select_action(combatant_id, part_key, target);
            }
            BattleCommand::Pause => {
                if self.is_running() {
                    self.paused = true;
                }
            }
            BattleCommand::Resume => {
                self.paused = false;
            }
            BattleCommand::Reset => self.reset(),
        }
    }

    fn start_battle(&mut self) {
        if self.context.phase != BattlePhase::Idle {
            warn!(phase = ?self.context.phase, "battle already started");
            return;
        }
        let roster = self
            .roster
            .clone()
            .unwrap_or_else(|| scenario::build_roster(self.scenario));
        if let Err(err) = world_setup::validate_roster(&roster) {
            warn!(%err, "cannot start battle");
            return;
        }

        self.index = world_setup::spawn_roster(&mut self.world, &roster, &self.config.gauge);
        self.context = BattleContext::default();
        self.context.turn.number = 1;
        self.time = SimTime::default();
        info!(
            combatants = roster.len(),
            seed = self.config.seed,
            "battle started"
        );

        for diagnostic in self.registry.validate() {
            warn!(
                personality = %diagnostic.personality,
                routine = ?diagnostic.routine_index,
                kind = ?diagnostic.kind,
                "unknown strategy key in personality table"
            );
            self.events.push(BattleEvent::Diagnostic(diagnostic));
        }
        self.set_phase(BattlePhase::BattleStart);
    }

    /// Tear everything down and return to idle. The chosen roster is kept.
    fn reset(&mut self) {
        self.world.clear();
        self.index.clear();
        let phase_changed = self.context.phase != BattlePhase::Idle;
        self.context = BattleContext::default();
        self.time = SimTime::default();
        self.paused = false;
        self.awaiting.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        if phase_changed {
            self.events.push(BattleEvent::PhaseChanged {
                phase: BattlePhase::Idle,
                turn_number: 0,
            });
        }
        info!("battle reset");
    }

    fn set_phase(&mut self, phase: BattlePhase) {
        if self.context.phase == phase {
            return;
        }
        debug!(from = ?self.context.phase, to = ?phase, turn = self.context.turn.number, "phase change");
        self.context.phase = phase;
        self.events.push(BattleEvent::PhaseChanged {
            phase,
            turn_number: self.context.turn.number,
        });
    }

    /// Step the phase machine once.
    fn run_systems(&mut self, dt_ms: f64) {
        if self.context.phase == BattlePhase::BattleStart {
            systems::gauge::reset_all(&mut self.world, &self.config.gauge);
            self.set_phase(BattlePhase::TurnStart);
        }
        if self.context.phase == BattlePhase::TurnEnd {
            self.context.turn.number += 1;
            self.context.turn.resolved_actions.clear();
            self.set_phase(BattlePhase::TurnStart);
        }
        if self.context.phase == BattlePhase::TurnStart {
            self.set_phase(BattlePhase::ActionSelection);
        }

        match self.context.phase {
            BattlePhase::ActionSelection => {
                // 1. Gauges
                systems::gauge::run(
                    &mut self.world,
                    &self.config.gauge,
                    dt_ms,
                    &mut self.context.turn,
                );
                // 2. Selection (AI decides, players are prompted)
                self.run_selection();
                // 3. Preempt into execution
                if systems::execution::any_ready(&self.world) {
                    self.context.turn.execution_queue =
                        systems::execution::build_queue(&self.world);
                    self.set_phase(BattlePhase::ActionExecution);
                }
            }
            BattlePhase::ActionExecution => self.execute_next(),
            _ => {}
        }
    }

    /// Let every queued AI combatant choose, and prompt queued players once.
    fn run_selection(&mut self) {
        let queued: Vec<CombatantId> = self.context.turn.action_queue.iter().copied().collect();
        for id in queued {
            if self.state_of(id) != Some(CombatantState::ReadyToSelect) {
                self.context.turn.dequeue(id);
                continue;
            }
            let Some(control) = self
                .index
                .get(&id)
                .and_then(|&entity| self.world.get::<&Profile>(entity).ok())
                .map(|profile| profile.control)
            else {
                continue;
            };

            match control {
                ControlMode::Player => {
                    if self.awaiting.insert(id) {
                        self.events
                            .push(BattleEvent::AwaitingInput { combatant_id: id });
                    }
                }
                ControlMode::Ai => {
                    let snapshot = self.snapshot();
                    match determine_action(&snapshot, id, &self.registry, &mut self.rng) {
                        Some(decision) => {
                            self.events.extend(
                                decision.diagnostics.into_iter().map(BattleEvent::Diagnostic),
                            );
                            // A rejection re-queues the actor and is reported as an event.
                            let _ = self.select_action(id, decision.part_key, Some(decision.target));
                        }
                        None => debug!(actor = %id, "no action available"),
                    }
                }
            }
        }
    }

    /// Execute the head of the execution queue.
    fn execute_next(&mut self) {
        if let Some(actor_id) = self.context.turn.execution_queue.pop_front() {
            self.context.turn.current_actor = Some(actor_id);
            self.execute(actor_id);
            self.context.turn.current_actor = None;
        }

        if self.context.phase == BattlePhase::ActionExecution
            && self.context.turn.execution_queue.is_empty()
        {
            if systems::execution::any_pending(&self.world) {
                self.set_phase(BattlePhase::ActionSelection);
            } else {
                self.set_phase(BattlePhase::TurnEnd);
            }
        }
    }

    fn execute(&mut self, actor_id: CombatantId) {
        let Some(&entity) = self.index.get(&actor_id) else {
            self.drop_action(actor_id, None, ResolveError::UnknownCombatant(actor_id));
            return;
        };
        if self.state_of(actor_id) != Some(CombatantState::ReadyToExecute) {
            return;
        }

        if let Some(reason) = systems::cancellation::check(&self.world, &self.index, actor_id) {
            self.cancel(actor_id, reason);
            return;
        }
        let target = match self.execution_target(actor_id, entity) {
            Ok(target) => target,
            Err(reason) => {
                self.cancel(actor_id, reason);
                return;
            }
        };

        let carried = systems::effects::count(&self.world, entity);
        let resolved = systems::resolution::resolve(
            &mut self.world,
            &self.index,
            &self.config,
            &mut self.rng,
            &mut self.context.turn,
            actor_id,
            target,
        );
        let resolution = match resolved {
            Ok(resolution) => resolution,
            Err(err) => {
                self.drop_action(actor_id, Some(entity), err);
                return;
            }
        };

        systems::effects::expire_after_action(&mut self.world, entity, carried);
        let multiplier = systems::gauge::speed_multiplier(&resolution.stats, &self.config.gauge);
        systems::execution::begin_cooldown(&self.world, entity, Some(multiplier));
        systems::history::record(
            &mut self.context.history,
            &self.world,
            &self.index,
            &resolution.result,
        );

        self.context
            .turn
            .resolved_actions
            .push(resolution.result.clone());
        self.events
            .push(BattleEvent::ActionResolved(resolution.result));
        if let Some(interrupted) = resolution.interrupted {
            self.events.push(BattleEvent::ActionCancelled(interrupted));
        }
        for cancelled in
            systems::cancellation::run(&mut self.world, &self.index, &mut self.context.turn)
        {
            self.events.push(BattleEvent::ActionCancelled(cancelled));
        }

        if let Some(winner) = systems::victory::check(&self.world, resolution.attacker_team) {
            self.game_over(Some(winner));
        }
    }

    /// Target for the executing action. Pre-timing parts use the stored
    /// selection; post-timing parts re-run the actor's targeting against the
    /// current battlefield.
    fn execution_target(
        &mut self,
        actor_id: CombatantId,
        entity: Entity,
    ) -> Result<Option<TargetRef>, CancelReason> {
        let (action, stats) = {
            let Ok(action) = self.world.get::<&Action>(entity) else {
                return Ok(None);
            };
            let Ok(parts) = self.world.get::<&Parts>(entity) else {
                return Ok(None);
            };
            let stats = action
                .part_key
                .and_then(|key| parts.get(key).action().copied());
            (*action, stats)
        };
        let (Some(part_key), Some(stats)) = (action.part_key, stats) else {
            return Ok(None);
        };
        if !stats.target_scope.requires_target() {
            return Ok(None);
        }

        match stats.target_timing {
            TargetTiming::Pre => Ok(action
                .target_id
                .zip(action.target_part_key)
                .map(|(id, key)| TargetRef::new(id, key))),
            TargetTiming::Post => {
                let snapshot = self.snapshot();
                retarget(&snapshot, actor_id, part_key, &self.registry, &mut self.rng)
                    .map(Some)
                    .ok_or(CancelReason::TargetLost)
            }
        }
    }

    fn cancel(&mut self, actor_id: CombatantId, reason: CancelReason) {
        if let Some(result) = systems::cancellation::cancel(
            &mut self.world,
            &self.index,
            &mut self.context.turn,
            actor_id,
            reason,
        ) {
            self.events.push(BattleEvent::ActionCancelled(result));
        }
    }

    /// Discard an action that hit an invariant violation and make the actor safe.
    fn drop_action(&mut self, actor_id: CombatantId, entity: Option<Entity>, err: ResolveError) {
        error!(actor = %actor_id, %err, "dropping action");
        let part_key = entity
            .and_then(|entity| self.world.get::<&Action>(entity).ok())
            .and_then(|action| action.part_key);
        if let Some(entity) = entity {
            systems::execution::begin_cooldown(&self.world, entity, None);
        }
        self.context.turn.dequeue(actor_id);

        self.events.push(BattleEvent::ActionResolved(ActionResult {
            attacker_id: actor_id,
            part_key,
            intended_target_id: None,
            outcome: ActionOutcome::of(OutcomeKind::Dropped),
            applied_effects: Vec::new(),
            cancelled: false,
            cancel_reason: None,
        }));
    }

    /// Terminal: clear every queue and pending action.
    fn game_over(&mut self, winning_team: Option<TeamId>) {
        self.context.winning_team = winning_team;
        self.context.turn.clear_queues();
        self.awaiting.clear();
        for (_entity, action) in self.world.query_mut::<&mut Action>() {
            action.clear();
        }
        self.set_phase(BattlePhase::GameOver);
        info!(
            winner = ?winning_team,
            turn = self.context.turn.number,
            "game over"
        );
        self.events.push(BattleEvent::GameOver { winning_team });
    }
}
