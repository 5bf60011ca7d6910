//! Per-fighter combat state machine.
//!
//! A fighter is always in exactly one [`FighterState`]. Transitions are a
//! pure function of the current state, the trigger, and two guards
//! (`can_move` and facing); anything the table does not name leaves the
//! state untouched. Nothing here ever fails.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Horizontal axis magnitude needed before a fighter starts walking.
pub const AXIS_DEADZONE: Fixed = Fixed::lit("0.2");

/// Combat state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FighterState {
    /// Standing still.
    #[default]
    Idle,
    /// Walking toward negative axis.
    MovingLeft,
    /// Walking toward positive axis.
    MovingRight,
    /// Airborne from a jump.
    Jumping,
    /// Airborne from an opponent's launcher, reduced gravity.
    Launched,
    /// Crouching.
    Crouching,
    /// Guarding.
    Blocking,
    /// Hitstun or blockstun.
    Stunned,
}

impl FighterState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Idle,
        Self::MovingLeft,
        Self::MovingRight,
        Self::Jumping,
        Self::Launched,
        Self::Crouching,
        Self::Blocking,
        Self::Stunned,
    ];

    /// Standing or walking: the states that accept new actions.
    #[must_use]
    pub const fn is_grounded_neutral(self) -> bool {
        matches!(self, Self::Idle | Self::MovingLeft | Self::MovingRight)
    }

    /// In the air.
    #[must_use]
    pub const fn is_airborne(self) -> bool {
        matches!(self, Self::Jumping | Self::Launched)
    }
}

/// Something that may move the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTrigger {
    /// Horizontal axis input, in `[-1, 1]`.
    MoveAxis(Fixed),
    /// Jump button pressed.
    JumpPressed,
    /// Jump button released.
    JumpReleased,
    /// Touched the ground.
    Landed,
    /// Crouch button pressed.
    CrouchPressed,
    /// Crouch button released.
    CrouchReleased,
    /// Block button pressed.
    BlockPressed,
    /// Block button released.
    BlockReleased,
    /// Overlapped the opponent's proximity hitbox.
    ProximityContact,
    /// A hit or block produced a positive stun.
    Stun,
    /// An unblocked hit carried launch.
    Launch,
    /// The pending stun timer fired.
    StunExpired,
    /// A blocked hit produced no blockstun.
    GuardRecovered,
}

/// Guards consulted by the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionGuards {
    /// False while stunned.
    pub can_move: bool,
    /// True when the opponent is on the positive side of the fight axis.
    pub facing_flipped: bool,
}

/// Map a horizontal axis value to a walking state.
#[must_use]
pub fn walking_state(axis: Fixed) -> FighterState {
    if axis > AXIS_DEADZONE {
        FighterState::MovingRight
    } else if axis < -AXIS_DEADZONE {
        FighterState::MovingLeft
    } else {
        FighterState::Idle
    }
}

/// The transition table.
#[must_use]
pub fn next_state(
    current: FighterState,
    trigger: StateTrigger,
    guards: TransitionGuards,
) -> FighterState {
    use FighterState::*;
    use StateTrigger::*;

    match (current, trigger) {
        (Idle | MovingLeft | MovingRight, MoveAxis(axis)) if guards.can_move => walking_state(axis),
        (Idle | MovingLeft | MovingRight, JumpPressed) if guards.can_move => Jumping,
        (Jumping, JumpReleased) => Idle,
        (Jumping | Launched, Landed) => Idle,
        (Idle | MovingLeft | MovingRight, CrouchPressed) => Crouching,
        (Crouching, CrouchReleased) => Idle,
        (Idle | MovingLeft | MovingRight, BlockPressed) => Blocking,
        (Blocking, BlockReleased) => Idle,
        (MovingLeft, ProximityContact) if !guards.facing_flipped => Blocking,
        (MovingRight, ProximityContact) if guards.facing_flipped => Blocking,
        (Launched, Stun) => Launched,
        (_, Stun) => Stunned,
        (_, Launch) => Launched,
        (Stunned, StunExpired) => Idle,
        (Blocking, GuardRecovered) => Idle,
        (state, _) => state,
    }
}

/// Mutable state machine for one fighter.
///
/// Besides the state itself this tracks the movement lock, the stun
/// countdown, and the gravity scale the physics collaborator should use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateMachine {
    state: FighterState,
    can_move: bool,
    #[serde(with = "fixed_serde")]
    stun_remaining: Fixed,
    #[serde(with = "fixed_serde")]
    gravity_scale: Fixed,
    #[serde(with = "fixed_serde")]
    baseline_gravity: Fixed,
}

impl StateMachine {
    /// Create an idle, mobile state machine.
    #[must_use]
    pub fn new(gravity_scale: Fixed) -> Self {
        Self {
            state: FighterState::Idle,
            can_move: true,
            stun_remaining: Fixed::ZERO,
            gravity_scale,
            baseline_gravity: gravity_scale,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> FighterState {
        self.state
    }

    /// Whether movement input is accepted.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        self.can_move
    }

    /// Seconds of stun left.
    #[must_use]
    pub const fn stun_remaining(&self) -> Fixed {
        self.stun_remaining
    }

    /// Gravity scale for the physics collaborator.
    #[must_use]
    pub const fn gravity_scale(&self) -> Fixed {
        self.gravity_scale
    }

    /// Apply a trigger. Returns `(from, to)` if the state changed.
    pub fn apply(
        &mut self,
        trigger: StateTrigger,
        facing_flipped: bool,
    ) -> Option<(FighterState, FighterState)> {
        let guards = TransitionGuards {
            can_move: self.can_move,
            facing_flipped,
        };
        let from = self.state;
        let to = next_state(from, trigger, guards);
        if from == to {
            return None;
        }

        tracing::debug!("State {:?} -> {:?} on {:?}", from, to, trigger);
        self.state = to;
        Some((from, to))
    }

    /// Lock movement and enter stun for `duration` seconds.
    ///
    /// Scheduling the expiry is the caller's job.
    pub fn begin_stun(&mut self, duration: Fixed) -> Option<(FighterState, FighterState)> {
        self.can_move = false;
        self.stun_remaining = duration.max(Fixed::ZERO);
        self.apply(StateTrigger::Stun, false)
    }

    /// Release the movement lock when the stun timer fires.
    ///
    /// A launched fighter stays airborne; landing returns it to idle.
    pub fn exit_stun(&mut self) -> Option<(FighterState, FighterState)> {
        self.can_move = true;
        self.stun_remaining = Fixed::ZERO;
        self.apply(StateTrigger::StunExpired, false)
    }

    /// Knock the fighter airborne with gravity scaled by `gravity_factor`.
    pub fn launch(&mut self, gravity_factor: Fixed) -> Option<(FighterState, FighterState)> {
        if self.state != FighterState::Launched {
            self.baseline_gravity = self.gravity_scale;
        }
        self.gravity_scale = self.baseline_gravity.saturating_mul(gravity_factor);
        self.apply(StateTrigger::Launch, false)
    }

    /// Touch down. Restores gravity if the fighter was launched.
    pub fn land(&mut self) -> Option<(FighterState, FighterState)> {
        if self.state == FighterState::Launched {
            self.gravity_scale = self.baseline_gravity;
        }
        self.apply(StateTrigger::Landed, false)
    }

    /// Count the stun display down by `dt` seconds.
    pub fn tick(&mut self, dt: Fixed) {
        self.stun_remaining = self
            .stun_remaining
            .saturating_sub(dt.max(Fixed::ZERO))
            .max(Fixed::ZERO);
    }

    /// Return to a fresh idle state with baseline gravity.
    pub fn reset(&mut self) {
        *self = Self::new(self.baseline_gravity);
    }
}
