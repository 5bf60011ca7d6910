//! A single fighter and the capabilities the host drives it through.
//!
//! A [`Fighter`] is plain data plus behavior: resources, the combat state
//! machine, attack usage flags, input history, and configured commands.
//! It never holds a reference to its opponent; the owning
//! [`Duel`](crate::duel::Duel) pairs fighters by [`FighterId`].

use serde::{Deserialize, Serialize};

use crate::attack::{AttackFlags, AttackTier, MeterTuning};
use crate::command::{CommandMatcher, CommandTrigger};
use crate::config::FighterConfig;
use crate::error::Result;
use crate::events::DuelEvent;
use crate::input::{InputBuffer, InputToken};
use crate::math::{clamp_unit, fixed_serde, Fixed};
use crate::roster::CharacterClass;
use crate::separation::SeparationPolicy;
use crate::state::{FighterState, StateMachine, StateTrigger};
use crate::timer::{Scheduler, TimerHandle};

/// Slot handle for one of the two fighters in a duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FighterId {
    /// Player one.
    One,
    /// Player two.
    Two,
}

impl FighterId {
    /// Both slots, in order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// The other slot. `id.opponent().opponent() == id`.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Deferred work owned by the duel's scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterTimer {
    /// Leave stun and unlock movement.
    ExitStun(FighterId),
}

/// The duel's timer queue.
pub type DuelTimers = Scheduler<FighterTimer>;

/// Horizontal intent relative to the opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisIntent {
    /// Inside the deadzone.
    Neutral,
    /// Toward the opponent.
    Forward,
    /// Away from the opponent.
    Back,
}

/// Walking, jumping, and landing.
pub trait Movable {
    /// Feed horizontal axis input. Returns the transition, if any.
    fn move_axis(&mut self, axis: Fixed) -> Option<(FighterState, FighterState)>;

    /// Jump pressed.
    fn jump(&mut self) -> Option<(FighterState, FighterState)>;

    /// Jump released.
    fn stop_jumping(&mut self) -> Option<(FighterState, FighterState)>;

    /// Touched down after a jump or launch.
    fn landed(&mut self) -> Option<(FighterState, FighterState)>;

    /// Position on the fight axis.
    fn position(&self) -> Fixed;
}

/// Receiving hits.
pub trait Attackable {
    /// Remaining health in `[0, 1]`.
    fn health(&self) -> Fixed;

    /// Whether the fighter is guarding.
    fn is_guarding(&self) -> bool;

    /// Whether health is exhausted.
    fn is_defeated(&self) -> bool {
        self.health() <= Fixed::ZERO
    }
}

/// Reacting to recognized commands.
pub trait CommandListener {
    /// Run the special action for a matched command.
    fn start_command(&mut self, name: &str);
}

/// One fighter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fighter {
    id: FighterId,
    class: CharacterClass,
    #[serde(with = "fixed_serde")]
    health: Fixed,
    #[serde(with = "fixed_serde")]
    super_meter: Fixed,
    machine: StateMachine,
    attacks: AttackFlags,
    facing_flipped: bool,
    #[serde(with = "fixed_serde")]
    position: Fixed,
    input: InputBuffer,
    commands: CommandMatcher,
    landed_hit: bool,
    damaged_shown: bool,
    last_command: Option<String>,
    axis_intent: AxisIntent,
    stun_timer: Option<TimerHandle>,
    separation: SeparationPolicy,
    tuning: MeterTuning,
    #[serde(with = "fixed_serde")]
    walk_speed: Fixed,
    #[serde(with = "fixed_serde")]
    launch_gravity_factor: Fixed,
}

impl Fighter {
    /// Create a fighter at full health with an empty meter.
    #[must_use]
    pub fn new(id: FighterId, config: &FighterConfig, position: Fixed) -> Self {
        Self {
            id,
            class: config.class,
            health: Fixed::ONE,
            super_meter: Fixed::ZERO,
            machine: StateMachine::new(config.base_gravity_scale),
            attacks: AttackFlags::default(),
            facing_flipped: false,
            position,
            input: InputBuffer::new(config.input_window, config.input_capacity),
            commands: CommandMatcher::new(config.commands.iter().cloned()),
            landed_hit: false,
            damaged_shown: false,
            last_command: None,
            axis_intent: AxisIntent::Neutral,
            stun_timer: None,
            separation: SeparationPolicy::new(config.max_separation),
            tuning: config.meter,
            walk_speed: config.walk_speed.max(Fixed::ZERO),
            launch_gravity_factor: config.launch_gravity_factor,
        }
    }

    // ------------------------------------------------------------------
    // Read-only views for the host
    // ------------------------------------------------------------------

    /// Slot of this fighter.
    #[must_use]
    pub const fn id(&self) -> FighterId {
        self.id
    }

    /// Character model.
    #[must_use]
    pub const fn class(&self) -> CharacterClass {
        self.class
    }

    /// Super meter in `[0, 1]`.
    #[must_use]
    pub const fn super_meter(&self) -> Fixed {
        self.super_meter
    }

    /// Current combat state.
    #[must_use]
    pub const fn state(&self) -> FighterState {
        self.machine.state()
    }

    /// Whether movement input is accepted.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        self.machine.can_move()
    }

    /// Seconds of stun left.
    #[must_use]
    pub const fn stun_remaining(&self) -> Fixed {
        self.machine.stun_remaining()
    }

    /// Gravity scale the physics collaborator should apply.
    #[must_use]
    pub const fn gravity_scale(&self) -> Fixed {
        self.machine.gravity_scale()
    }

    /// True when the opponent is on the positive side of the fight axis.
    #[must_use]
    pub const fn facing_flipped(&self) -> bool {
        self.facing_flipped
    }

    /// Attack usage flags.
    #[must_use]
    pub const fn attacks(&self) -> &AttackFlags {
        &self.attacks
    }

    /// Whether the last attack connected unblocked.
    #[must_use]
    pub const fn landed_hit(&self) -> bool {
        self.landed_hit
    }

    /// Input history.
    #[must_use]
    pub const fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Configured commands.
    #[must_use]
    pub const fn commands(&self) -> &CommandMatcher {
        &self.commands
    }

    /// Most recent command started.
    #[must_use]
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Walking clamp.
    #[must_use]
    pub const fn separation(&self) -> &SeparationPolicy {
        &self.separation
    }

    /// Meter tuning.
    #[must_use]
    pub const fn tuning(&self) -> &MeterTuning {
        &self.tuning
    }

    /// Walk speed in units per second.
    #[must_use]
    pub const fn walk_speed(&self) -> Fixed {
        self.walk_speed
    }

    /// Pending stun expiry, if any.
    #[must_use]
    pub const fn stun_timer(&self) -> Option<TimerHandle> {
        self.stun_timer
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// Apply a state trigger using this fighter's facing.
    pub fn apply(&mut self, trigger: StateTrigger) -> Option<DuelEvent> {
        let transition = self.machine.apply(trigger, self.facing_flipped);
        DuelEvent::from_transition(self.id, transition)
    }

    /// Overwrite the position reported by the physics collaborator.
    pub fn set_position(&mut self, position: Fixed) {
        self.position = position;
    }

    /// Move by `step` along the fight axis.
    pub fn displace(&mut self, step: Fixed) {
        self.position = self.position.saturating_add(step);
    }

    /// Recompute facing from the opponent's position.
    ///
    /// Returns the new facing if it flipped. Equal positions keep the
    /// current facing since the opponent has not crossed.
    pub fn update_facing(&mut self, opponent_position: Fixed) -> Option<bool> {
        let flipped = if opponent_position > self.position {
            true
        } else if opponent_position < self.position {
            false
        } else {
            return None;
        };

        if flipped == self.facing_flipped {
            return None;
        }
        self.facing_flipped = flipped;
        Some(flipped)
    }

    /// Classify horizontal input relative to the opponent.
    #[must_use]
    pub fn axis_intent(&self, axis: Fixed) -> AxisIntent {
        match crate::state::walking_state(axis) {
            FighterState::MovingRight if self.facing_flipped => AxisIntent::Forward,
            FighterState::MovingLeft if !self.facing_flipped => AxisIntent::Forward,
            FighterState::MovingRight | FighterState::MovingLeft => AxisIntent::Back,
            _ => AxisIntent::Neutral,
        }
    }

    /// Remember the latest axis intent. Returns it if it changed.
    pub fn track_axis_intent(&mut self, intent: AxisIntent) -> Option<AxisIntent> {
        if intent == self.axis_intent {
            return None;
        }
        self.axis_intent = intent;
        Some(intent)
    }

    /// Whether walking input currently translates into displacement.
    ///
    /// Airborne fighters keep drift control; crouching, guarding, and
    /// stunned fighters stay planted.
    #[must_use]
    pub fn accepts_walk(&self) -> bool {
        self.can_move()
            && !matches!(
                self.state(),
                FighterState::Crouching | FighterState::Blocking | FighterState::Stunned
            )
    }

    // ------------------------------------------------------------------
    // Stun
    // ------------------------------------------------------------------

    /// Enter stun for `duration` seconds, replacing any pending expiry.
    pub fn stun(&mut self, duration: Fixed, timers: &mut DuelTimers) -> Vec<DuelEvent> {
        if let Some(previous) = self.stun_timer.take() {
            timers.cancel(previous);
        }

        let transition = self.machine.begin_stun(duration);
        self.stun_timer = Some(timers.schedule(duration, FighterTimer::ExitStun(self.id)));
        tracing::debug!("Fighter {:?} stunned for {}s", self.id, duration);

        DuelEvent::from_transition(self.id, transition)
            .into_iter()
            .collect()
    }

    /// Handle a fired stun timer. Stale handles are ignored.
    pub fn expire_stun(&mut self, handle: TimerHandle) -> Vec<DuelEvent> {
        if self.stun_timer != Some(handle) {
            return Vec::new();
        }
        self.stun_timer = None;

        let mut events = vec![DuelEvent::StunEnded { fighter: self.id }];
        events.extend(DuelEvent::from_transition(self.id, self.machine.exit_stun()));
        events
    }

    /// Cancel any pending stun expiry without firing it.
    pub fn cancel_stun(&mut self, timers: &mut DuelTimers) {
        if let Some(handle) = self.stun_timer.take() {
            timers.cancel(handle);
        }
    }

    /// Knock airborne with reduced gravity.
    pub fn launch(&mut self) -> Option<DuelEvent> {
        DuelEvent::from_transition(self.id, self.machine.launch(self.launch_gravity_factor))
    }

    /// Advance per-frame countdowns.
    pub fn tick(&mut self, dt: Fixed) {
        self.machine.tick(dt);
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Remove health, clamping at zero.
    ///
    /// Emits the damaged cosmetic once when health first drops below the
    /// threshold, and `Defeated` when it reaches zero.
    pub fn apply_damage(&mut self, amount: Fixed) -> Vec<DuelEvent> {
        let before = self.health;
        self.health = clamp_unit(self.health.saturating_sub(amount.max(Fixed::ZERO)));

        let mut events = Vec::new();
        let threshold = self.tuning.damaged_threshold;
        if !self.damaged_shown && before >= threshold && self.health < threshold {
            self.damaged_shown = true;
            events.push(DuelEvent::DamagedThreshold { fighter: self.id });
        }
        if before > Fixed::ZERO && self.health == Fixed::ZERO {
            tracing::debug!("Fighter {:?} defeated", self.id);
            events.push(DuelEvent::Defeated { fighter: self.id });
        }
        events
    }

    /// Add (or with a negative amount, remove) meter, clamped to `[0, 1]`.
    pub fn gain_meter(&mut self, amount: Fixed) {
        self.super_meter = clamp_unit(self.super_meter.saturating_add(amount));
    }

    /// Record that an attack connected.
    pub fn mark_landed_hit(&mut self) {
        self.landed_hit = true;
    }

    // ------------------------------------------------------------------
    // Attacks
    // ------------------------------------------------------------------

    /// Start an attack. Returns whether it activated.
    ///
    /// Base tiers always activate while the fighter can move. A super also
    /// needs a full meter and spends all of it.
    pub fn start_attack(&mut self, tier: AttackTier) -> bool {
        if !self.can_move() {
            return false;
        }

        if tier == AttackTier::Super {
            if self.super_meter < self.tuning.super_threshold {
                return false;
            }
            self.super_meter = Fixed::ZERO;
        }

        self.attacks.set_used(tier, true);
        self.landed_hit = false;
        true
    }

    /// Spend meter on the follow-up of the first used base tier.
    ///
    /// Light takes priority over medium, medium over heavy. The base flag
    /// is consumed so each base use buys one follow-up. Meter never drops
    /// below zero.
    pub fn start_exceptional_attack(&mut self) -> Option<AttackTier> {
        if !self.can_move() {
            return None;
        }

        let tier = self.attacks.exceptional_candidate()?;
        self.attacks.mark_ex_used(tier);
        self.attacks.set_used(tier, false);
        self.gain_meter(-self.tuning.exceptional_cost(tier));
        tracing::debug!("Fighter {:?} used {:?} exceptional", self.id, tier);
        Some(tier)
    }

    /// Clear attack usage flags.
    pub fn reset_attack_flags(&mut self) {
        self.attacks.reset();
    }

    // ------------------------------------------------------------------
    // Input and commands
    // ------------------------------------------------------------------

    /// Record an input and scan for commands.
    ///
    /// Matched commands are started on this fighter and returned.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::NonMonotonicTimestamp`](crate::error::FightError::NonMonotonicTimestamp)
    /// if `timestamp` is older than the newest buffered input.
    pub fn record_input(
        &mut self,
        token: impl Into<InputToken>,
        timestamp: Fixed,
    ) -> Result<Vec<CommandTrigger>> {
        self.input.push(token, timestamp)?;

        let triggered = self.commands.scan(&self.input);
        for trigger in &triggered {
            self.start_command(&trigger.name);
        }
        Ok(triggered)
    }

    /// Forget inputs older than the window.
    pub fn evict_inputs(&mut self, now: Fixed) {
        self.input.evict(now);
    }

    /// Re-arm one command.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::UnknownCommand`](crate::error::FightError::UnknownCommand)
    /// if no command has this name.
    pub fn reset_command(&mut self, name: &str) -> Result<()> {
        self.commands.reset(name)
    }

    /// Re-arm every command.
    pub fn reset_commands(&mut self) {
        self.commands.reset_all();
    }

    // ------------------------------------------------------------------
    // Round lifecycle
    // ------------------------------------------------------------------

    /// Restore round-start state at `position`, cancelling pending stun.
    pub fn reset(&mut self, position: Fixed, timers: &mut DuelTimers) {
        self.cancel_stun(timers);
        self.health = Fixed::ONE;
        self.super_meter = Fixed::ZERO;
        self.machine.reset();
        self.attacks.reset();
        self.position = position;
        self.input.clear();
        self.commands.reset_all();
        self.landed_hit = false;
        self.damaged_shown = false;
        self.last_command = None;
        self.axis_intent = AxisIntent::Neutral;
    }
}

impl Movable for Fighter {
    fn move_axis(&mut self, axis: Fixed) -> Option<(FighterState, FighterState)> {
        self.machine
            .apply(StateTrigger::MoveAxis(axis), self.facing_flipped)
    }

    fn jump(&mut self) -> Option<(FighterState, FighterState)> {
        self.machine.apply(StateTrigger::JumpPressed, self.facing_flipped)
    }

    fn stop_jumping(&mut self) -> Option<(FighterState, FighterState)> {
        self.machine.apply(StateTrigger::JumpReleased, self.facing_flipped)
    }

    fn landed(&mut self) -> Option<(FighterState, FighterState)> {
        self.machine.land()
    }

    fn position(&self) -> Fixed {
        self.position
    }
}

impl Attackable for Fighter {
    fn health(&self) -> Fixed {
        self.health
    }

    fn is_guarding(&self) -> bool {
        self.state() == FighterState::Blocking
    }
}

impl CommandListener for Fighter {
    fn start_command(&mut self, name: &str) {
        tracing::debug!("Fighter {:?} starting command '{}'", self.id, name);
        self.last_command = Some(name.to_string());
    }
}
