//! The duel: two fighters, one clock.
//!
//! [`Duel`] owns both fighters in a two-slot arena indexed by [`FighterId`].
//! The opponent link is just `id.opponent()`, so either fighter can be
//! reset or replaced without dangling references.
//!
//! # Frame model
//!
//! The host drives the duel synchronously:
//!
//! 1. Device events are routed with [`Duel::route_device_action`] and fed
//!    through [`Duel::press`], [`Duel::release`], and [`Duel::move_axis`].
//! 2. The collision layer reports overlaps via [`Duel::hitbox_overlap`] or
//!    calls [`Duel::resolve_hit`] directly.
//! 3. The physics layer reports positions with [`Duel::set_position`] and
//!    landings with [`Duel::landed`].
//! 4. Once per frame the host calls [`Duel::tick`], which fires due stun
//!    timers, recomputes facing, and ages out old inputs.
//!
//! Every operation returns the [`DuelEvent`]s it produced.
//!
//! # Determinism
//!
//! All state is fixed-point and iteration order is fixed, so two duels fed
//! the same calls end with the same [`Duel::state_hash`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::attack::AttackSpec;
use crate::bindings::{ControlAction, InputBindings};
use crate::command::CommandTrigger;
use crate::config::DuelConfig;
use crate::damage::{self, HitReport};
use crate::error::{FightError, Result};
use crate::events::DuelEvent;
use crate::fighter::{
    Attackable, AxisIntent, DuelTimers, Fighter, FighterId, FighterTimer, Movable,
};
use crate::hitbox::{Hitbox, HitboxKind};
use crate::input::{tokens, InputToken};
use crate::math::{fixed_serde, Fixed};
use crate::state::{walking_state, FighterState, StateTrigger};

/// Two fighters, their bindings, and the shared clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duel {
    fighters: [Fighter; 2],
    bindings: [InputBindings; 2],
    #[serde(with = "fixed_serde")]
    spawn_one: Fixed,
    #[serde(with = "fixed_serde")]
    spawn_two: Fixed,
    timers: DuelTimers,
    round: u32,
}

impl Duel {
    /// Build a duel from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new(config: &DuelConfig) -> Result<Self> {
        config.validate()?;

        let fighters = FighterId::ALL
            .map(|id| Fighter::new(id, config.fighter(id), config.spawn(id)));
        let bindings = FighterId::ALL.map(|id| config.fighter(id).bindings_for(id));

        let mut duel = Self {
            fighters,
            bindings,
            spawn_one: config.spawn_one,
            spawn_two: config.spawn_two,
            timers: DuelTimers::new(),
            round: 1,
        };
        duel.refresh_facing();

        tracing::debug!(
            "Duel created: {} vs {}",
            duel.fighters[0].class().display_name(),
            duel.fighters[1].class().display_name()
        );
        Ok(duel)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// One fighter.
    #[must_use]
    pub const fn fighter(&self, id: FighterId) -> &Fighter {
        &self.fighters[id.index()]
    }

    /// The opponent of `id`.
    #[must_use]
    pub const fn opponent(&self, id: FighterId) -> &Fighter {
        self.fighter(id.opponent())
    }

    /// Both fighters, player one first.
    pub fn fighters(&self) -> impl Iterator<Item = &Fighter> {
        self.fighters.iter()
    }

    /// Bindings for one fighter.
    #[must_use]
    pub const fn bindings(&self, id: FighterId) -> &InputBindings {
        &self.bindings[id.index()]
    }

    /// Duel clock in seconds.
    #[must_use]
    pub const fn now(&self) -> Fixed {
        self.timers.now()
    }

    /// Current round, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Pending timers.
    #[must_use]
    pub const fn timers(&self) -> &DuelTimers {
        &self.timers
    }

    /// Spawn position of one slot.
    #[must_use]
    pub const fn spawn(&self, id: FighterId) -> Fixed {
        match id {
            FighterId::One => self.spawn_one,
            FighterId::Two => self.spawn_two,
        }
    }

    /// The surviving fighter once the other is defeated.
    #[must_use]
    pub fn winner(&self) -> Option<FighterId> {
        FighterId::ALL
            .into_iter()
            .find(|id| self.opponent(*id).is_defeated() && !self.fighter(*id).is_defeated())
    }

    fn fighter_mut(&mut self, id: FighterId) -> &mut Fighter {
        &mut self.fighters[id.index()]
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advance the duel by `dt` seconds.
    ///
    /// Counts stun down, fires due stun timers, recomputes facing, and
    /// evicts inputs older than each fighter's window. Negative `dt` is
    /// treated as zero.
    pub fn tick(&mut self, dt: Fixed) -> Vec<DuelEvent> {
        let dt = dt.max(Fixed::ZERO);
        for fighter in &mut self.fighters {
            fighter.tick(dt);
        }

        let mut events = Vec::new();
        for (handle, timer) in self.timers.advance(dt) {
            match timer {
                FighterTimer::ExitStun(id) => {
                    tracing::debug!("Stun timer fired for {:?} at {}", id, handle.due());
                    events.extend(self.fighter_mut(id).expire_stun(handle));
                }
            }
        }

        events.extend(self.refresh_facing());

        let now = self.timers.now();
        for fighter in &mut self.fighters {
            fighter.evict_inputs(now);
        }

        #[cfg(feature = "debug-validation")]
        self.debug_validate();

        events
    }

    #[cfg(feature = "debug-validation")]
    fn debug_validate(&self) {
        for fighter in &self.fighters {
            debug_assert!(
                fighter.health() >= Fixed::ZERO && fighter.health() <= Fixed::ONE,
                "{:?} health out of range: {}",
                fighter.id(),
                fighter.health()
            );
            debug_assert!(
                fighter.super_meter() >= Fixed::ZERO && fighter.super_meter() <= Fixed::ONE,
                "{:?} meter out of range: {}",
                fighter.id(),
                fighter.super_meter()
            );
            debug_assert_eq!(fighter.can_move(), fighter.stun_timer().is_none());
        }
    }

    fn refresh_facing(&mut self) -> Vec<DuelEvent> {
        let positions = [self.fighters[0].position(), self.fighters[1].position()];
        let mut events = Vec::new();
        for id in FighterId::ALL {
            let opponent_position = positions[id.opponent().index()];
            if let Some(flipped) = self.fighter_mut(id).update_facing(opponent_position) {
                events.push(DuelEvent::FacingChanged {
                    fighter: id,
                    flipped,
                });
            }
        }
        events
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Which fighter a device action drives, and as what.
    #[must_use]
    pub fn route_device_action(&self, action: &str) -> Option<(FighterId, ControlAction)> {
        FighterId::ALL.into_iter().find_map(|id| {
            self.bindings(id)
                .resolve(action)
                .map(|control| (id, control))
        })
    }

    /// Which fighter a device axis drives.
    #[must_use]
    pub fn route_device_axis(&self, axis: &str) -> Option<FighterId> {
        FighterId::ALL
            .into_iter()
            .find(|id| self.bindings(*id).owns_axis(axis))
    }

    /// Route a device action and press or release it. Unbound names are ignored.
    pub fn device_action(&mut self, action: &str, pressed: bool) -> Vec<DuelEvent> {
        let Some((id, control)) = self.route_device_action(action) else {
            tracing::debug!("Ignoring unbound device action '{}'", action);
            return Vec::new();
        };
        if pressed {
            self.press(id, control)
        } else {
            self.release(id, control)
        }
    }

    /// Route a device axis and apply it. Unbound axes are ignored.
    pub fn device_axis(&mut self, axis: &str, value: Fixed, dt: Fixed) -> Vec<DuelEvent> {
        match self.route_device_axis(axis) {
            Some(id) => self.move_axis(id, value, dt),
            None => {
                tracing::debug!("Ignoring unbound device axis '{}'", axis);
                Vec::new()
            }
        }
    }

    /// Press a control. Records its token, then runs the action.
    pub fn press(&mut self, id: FighterId, action: ControlAction) -> Vec<DuelEvent> {
        let mut events = self.record_token(id, action.token());
        let fighter = self.fighter_mut(id);

        match action {
            ControlAction::Jump => {
                events.extend(DuelEvent::from_transition(id, fighter.jump()));
            }
            ControlAction::Crouch => events.extend(fighter.apply(StateTrigger::CrouchPressed)),
            ControlAction::Block => events.extend(fighter.apply(StateTrigger::BlockPressed)),
            ControlAction::Attack(tier) => {
                if !fighter.start_attack(tier) {
                    tracing::debug!("{:?} attack {:?} suppressed", id, tier);
                }
            }
            ControlAction::ExceptionalAttack => {
                if fighter.start_exceptional_attack().is_none() {
                    tracing::debug!("{:?} has no exceptional follow-up available", id);
                }
            }
        }
        events
    }

    /// Release a control. Attacks have no release behavior.
    pub fn release(&mut self, id: FighterId, action: ControlAction) -> Vec<DuelEvent> {
        let fighter = self.fighter_mut(id);
        let event = match action {
            ControlAction::Jump => DuelEvent::from_transition(id, fighter.stop_jumping()),
            ControlAction::Crouch => fighter.apply(StateTrigger::CrouchReleased),
            ControlAction::Block => fighter.apply(StateTrigger::BlockReleased),
            ControlAction::Attack(_) | ControlAction::ExceptionalAttack => None,
        };
        event.into_iter().collect()
    }

    /// Feed horizontal axis input for `dt` seconds.
    ///
    /// The axis is clamped to `[-1, 1]`. Entering a new direction relative
    /// to the opponent records `Forward` or `Back`. Outside the deadzone a
    /// mobile, upright fighter walks, limited by its separation policy.
    pub fn move_axis(&mut self, id: FighterId, axis: Fixed, dt: Fixed) -> Vec<DuelEvent> {
        let axis = axis.clamp(-Fixed::ONE, Fixed::ONE);
        let dt = dt.max(Fixed::ZERO);
        let mut events = Vec::new();

        let intent = self.fighter(id).axis_intent(axis);
        match self.fighter_mut(id).track_axis_intent(intent) {
            Some(AxisIntent::Forward) => events.extend(self.record_token(id, tokens::FORWARD)),
            Some(AxisIntent::Back) => events.extend(self.record_token(id, tokens::BACK)),
            Some(AxisIntent::Neutral) | None => {}
        }

        let anchor = self.opponent(id).position();
        let fighter = self.fighter_mut(id);
        events.extend(DuelEvent::from_transition(id, fighter.move_axis(axis)));

        if fighter.accepts_walk() && walking_state(axis) != FighterState::Idle {
            let step = axis.saturating_mul(fighter.walk_speed()).saturating_mul(dt);
            let permitted = fighter
                .separation()
                .permitted_step(fighter.position(), anchor, step);
            fighter.displace(permitted);
        }
        events
    }

    /// Record a raw token at an explicit timestamp and scan for commands.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::NonMonotonicTimestamp`] if `timestamp` is
    /// older than the fighter's newest input. The buffer is unchanged.
    pub fn record_input(
        &mut self,
        id: FighterId,
        token: impl Into<InputToken>,
        timestamp: Fixed,
    ) -> Result<Vec<DuelEvent>> {
        let triggered = self.fighter_mut(id).record_input(token, timestamp)?;
        Ok(command_events(id, triggered))
    }

    /// Record a token stamped with the duel clock.
    fn record_token(&mut self, id: FighterId, token: &str) -> Vec<DuelEvent> {
        let now = self.timers.now();
        let fighter = self.fighter_mut(id);
        let stamp = fighter
            .input()
            .newest_timestamp()
            .map_or(now, |newest| newest.max(now));

        match fighter.record_input(token, stamp) {
            Ok(triggered) => command_events(id, triggered),
            Err(e) => {
                tracing::warn!("Dropping {:?} input '{}': {}", id, token, e);
                Vec::new()
            }
        }
    }

    /// Re-arm one command.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::UnknownCommand`] if the fighter has no command
    /// with this name.
    pub fn reset_command(&mut self, id: FighterId, name: &str) -> Result<()> {
        self.fighter_mut(id).reset_command(name)
    }

    /// Re-arm every command of one fighter.
    pub fn reset_commands(&mut self, id: FighterId) {
        self.fighter_mut(id).reset_commands();
    }

    /// Clear one fighter's attack usage flags.
    pub fn reset_attack_flags(&mut self, id: FighterId) {
        self.fighter_mut(id).reset_attack_flags();
    }

    // ========================================================================
    // Physics and collision feedback
    // ========================================================================

    /// Position reported by the physics layer.
    pub fn set_position(&mut self, id: FighterId, position: Fixed) {
        self.fighter_mut(id).set_position(position);
    }

    /// The physics layer saw this fighter touch down.
    pub fn landed(&mut self, id: FighterId) -> Vec<DuelEvent> {
        let transition = self.fighter_mut(id).landed();
        DuelEvent::from_transition(id, transition)
            .into_iter()
            .collect()
    }

    /// This fighter entered its opponent's proximity zone.
    pub fn proximity_contact(&mut self, id: FighterId) -> Vec<DuelEvent> {
        self.fighter_mut(id)
            .apply(StateTrigger::ProximityContact)
            .into_iter()
            .collect()
    }

    /// Resolve a hit from `attacker` on its opponent.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::AlreadyDefeated`] if the opponent has no
    /// health left.
    pub fn resolve_hit(&mut self, attacker: FighterId, spec: AttackSpec) -> Result<HitReport> {
        let [one, two] = &mut self.fighters;
        let (attacking, defending) = match attacker {
            FighterId::One => (one, two),
            FighterId::Two => (two, one),
        };
        damage::resolve(attacking, defending, spec, &mut self.timers)
    }

    /// One of `owner`'s volumes overlapped the opponent.
    ///
    /// # Errors
    ///
    /// Propagates [`Duel::resolve_hit`] errors for strikes.
    pub fn hitbox_overlap(&mut self, owner: FighterId, hitbox: &Hitbox) -> Result<Vec<DuelEvent>> {
        match hitbox.kind {
            HitboxKind::Proximity => Ok(self.proximity_contact(owner.opponent())),
            HitboxKind::Strike => Ok(self.resolve_hit(owner, hitbox.attack)?.events),
            HitboxKind::Hurtbox => Ok(Vec::new()),
        }
    }

    // ========================================================================
    // Round lifecycle
    // ========================================================================

    /// Start the next round.
    ///
    /// Restores both fighters, cancels pending stun timers, and returns
    /// them to their spawn positions. The clock keeps running.
    pub fn reset_round(&mut self) -> Vec<DuelEvent> {
        for id in FighterId::ALL {
            let spawn = self.spawn(id);
            self.fighters[id.index()].reset(spawn, &mut self.timers);
        }
        self.round = self.round.saturating_add(1);
        tracing::debug!("Round {} begins", self.round);
        self.refresh_facing()
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Hash of the full duel state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.round.hash(&mut hasher);
        self.timers.hash(&mut hasher);
        for fighter in &self.fighters {
            fighter.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Serialize the duel to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::InvalidState`] if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| FightError::InvalidState(format!("Failed to serialize duel: {e}")))
    }

    /// Restore a duel from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::InvalidState`] if the bytes are not a duel.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| FightError::InvalidState(format!("Failed to deserialize duel: {e}")))
    }
}

fn command_events(id: FighterId, triggered: Vec<CommandTrigger>) -> Vec<DuelEvent> {
    triggered
        .into_iter()
        .map(|trigger| DuelEvent::CommandTriggered {
            fighter: id,
            name: trigger.name,
        })
        .collect()
}
