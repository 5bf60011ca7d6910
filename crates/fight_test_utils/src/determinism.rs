//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a duel produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Fighting games replay and roll back frames, so the combat core must be
//! 100% deterministic. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`fight_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Timers live in an ordered map and fighters in a fixed two-slot array.
//!
//! - **Wall-clock time**: The duel has its own clock, advanced only by
//!   `tick`.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual module behavior (state table, resolver, timers)
//! 2. **Property tests**: Random action scripts must still replay identically
//! 3. **Snapshot tests**: Serialize/deserialize preserves the state hash

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use fight_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic duel).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the duel was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Duel is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step (receives the step index)
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use fight_test_utils::determinism::verify_determinism;
/// use fight_test_utils::fixtures::{fixed, standard_duel};
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     120, // 120 frames each
///     standard_duel,
///     |duel, _| { duel.tick(fixed(1) / 60); },
///     |duel| duel.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for index in 0..steps {
            step(&mut state, index);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Replay the same action script on two fresh duels and compare hashes.
///
/// Each action is followed by one 60 Hz tick.
pub fn verify_script_determinism<F>(setup_fn: F, script: &[DuelAction]) -> bool
where
    F: Fn() -> Duel,
{
    let result = verify_determinism(
        2,
        script.len() as u64,
        &setup_fn,
        |duel, index| {
            if let Some(action) = usize::try_from(index).ok().and_then(|i| script.get(i)) {
                action.apply(duel);
            }
            duel.tick(frame());
        },
        Duel::state_hash,
    );
    result.is_deterministic
}

/// Replay a script on several threads at once and collect final hashes.
///
/// Catches non-determinism that only shows up under different thread
/// scheduling or memory layout.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_scripts<F>(setup_fn: F, script: &[DuelAction], num_runs: usize) -> Vec<u64>
where
    F: Fn() -> Duel + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let mut duel = setup_fn();
                    for action in script {
                        action.apply(&mut duel);
                        duel.tick(frame());
                    }
                    duel.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

/// Compare two duels step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the duels stay identical, `Some(step)` if they diverge after
/// that many actions (0 means they differed before any action).
pub fn find_first_divergence<F>(setup_fn: F, script: &[DuelAction]) -> Option<usize>
where
    F: Fn() -> Duel,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (index, action) in script.iter().enumerate() {
        action.apply(&mut first);
        action.apply(&mut second);
        first.tick(frame());
        second.tick(frame());

        if first.state_hash() != second.state_hash() {
            return Some(index + 1);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves the duel exactly.
pub fn verify_serialization_determinism<F>(setup_fn: F, script: &[DuelAction]) -> bool
where
    F: Fn() -> Duel,
{
    let mut duel = setup_fn();
    for action in script {
        action.apply(&mut duel);
        duel.tick(frame());
    }

    let hash_before = duel.state_hash();

    let Ok(bytes) = duel.serialize() else {
        return false;
    };
    let Ok(restored) = Duel::deserialize(&bytes) else {
        return false;
    };

    restored.state_hash() == hash_before && restored == duel
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// One 60 Hz frame in seconds.
#[must_use]
pub fn frame() -> Fixed {
    Fixed::ONE / 60
}

/// A host call that can be scripted against a duel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuelAction {
    /// Press a control.
    Press(FighterId, ControlAction),
    /// Release a control.
    Release(FighterId, ControlAction),
    /// Hold the horizontal axis for one frame.
    Axis(FighterId, Fixed),
    /// Resolve a hit from this attacker.
    Hit(FighterId, AttackSpec),
    /// Report a landing.
    Land(FighterId),
    /// Report proximity contact.
    Proximity(FighterId),
    /// Start a new round.
    ResetRound,
}

impl DuelAction {
    /// Apply the action, discarding events and expected errors.
    pub fn apply(&self, duel: &mut Duel) {
        match self {
            Self::Press(id, action) => {
                duel.press(*id, *action);
            }
            Self::Release(id, action) => {
                duel.release(*id, *action);
            }
            Self::Axis(id, value) => {
                duel.move_axis(*id, *value, frame());
            }
            Self::Hit(id, spec) => {
                // Hits on a defeated fighter are rejected
                let _ = duel.resolve_hit(*id, *spec);
            }
            Self::Land(id) => {
                duel.landed(*id);
            }
            Self::Proximity(id) => {
                duel.proximity_contact(*id);
            }
            Self::ResetRound => {
                duel.reset_round();
            }
        }
    }
}

/// Proptest strategies for determinism and invariant testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the combat core.
pub mod strategies {
    use fight_core::prelude::*;
    use proptest::prelude::*;

    use super::DuelAction;

    /// Either fighter.
    pub fn arb_fighter() -> impl Strategy<Value = FighterId> {
        prop_oneof![Just(FighterId::One), Just(FighterId::Two)]
    }

    /// A scalar in thousandths between -1000 and 1000.
    pub fn arb_scalar() -> impl Strategy<Value = Fixed> {
        (-1_000_000i64..1_000_000i64).prop_map(|n| Fixed::from_num(n) / 1000)
    }

    /// A scalar that also hits the representable extremes.
    pub fn arb_hostile_scalar() -> impl Strategy<Value = Fixed> {
        prop_oneof![
            8 => arb_scalar(),
            1 => Just(Fixed::MAX),
            1 => Just(Fixed::MIN),
        ]
    }

    /// Horizontal axis value, including out-of-range input.
    pub fn arb_axis() -> impl Strategy<Value = Fixed> {
        (-1500i32..1500i32).prop_map(|n| Fixed::from_num(n) / 1000)
    }

    /// Hit parameters with hostile values.
    pub fn arb_attack_spec() -> impl Strategy<Value = AttackSpec> {
        (
            arb_hostile_scalar(),
            arb_hostile_scalar(),
            arb_hostile_scalar(),
            arb_scalar(),
            arb_scalar(),
        )
            .prop_map(|(damage, hitstun, blockstun, pushback, launch)| AttackSpec {
                damage,
                hitstun,
                blockstun,
                pushback,
                launch,
            })
    }

    /// Any attack tier.
    pub fn arb_attack_tier() -> impl Strategy<Value = AttackTier> {
        prop_oneof![
            Just(AttackTier::Light),
            Just(AttackTier::Medium),
            Just(AttackTier::Heavy),
            Just(AttackTier::Super),
        ]
    }

    /// Any control action.
    pub fn arb_control_action() -> impl Strategy<Value = ControlAction> {
        prop_oneof![
            Just(ControlAction::Jump),
            Just(ControlAction::Crouch),
            Just(ControlAction::Block),
            Just(ControlAction::ExceptionalAttack),
            arb_attack_tier().prop_map(ControlAction::Attack),
        ]
    }

    /// Any scripted host call.
    pub fn arb_duel_action() -> impl Strategy<Value = DuelAction> {
        prop_oneof![
            4 => (arb_fighter(), arb_control_action()).prop_map(|(id, a)| DuelAction::Press(id, a)),
            3 => (arb_fighter(), arb_control_action()).prop_map(|(id, a)| DuelAction::Release(id, a)),
            4 => (arb_fighter(), arb_axis()).prop_map(|(id, v)| DuelAction::Axis(id, v)),
            3 => (arb_fighter(), arb_attack_spec()).prop_map(|(id, s)| DuelAction::Hit(id, s)),
            1 => arb_fighter().prop_map(DuelAction::Land),
            1 => arb_fighter().prop_map(DuelAction::Proximity),
            1 => Just(DuelAction::ResetRound),
        ]
    }

    /// A script of host calls.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<DuelAction>> {
        proptest::collection::vec(arb_duel_action(), 0..max_len)
    }
}
