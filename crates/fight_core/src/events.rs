//! Events emitted toward the host.
//!
//! Operations on a [`Duel`](crate::duel::Duel) return the events they
//! produced so the rendering and audio layers can react (swap materials,
//! flip meshes, play hit sparks) without polling.

use serde::{Deserialize, Serialize};

use crate::fighter::FighterId;
use crate::math::{decimal_serde, Fixed};
use crate::state::FighterState;

/// Something observable happened to a fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DuelEvent {
    /// A configured command was recognized in the input history.
    CommandTriggered {
        /// Fighter whose buffer matched.
        fighter: FighterId,
        /// Command name.
        name: String,
    },
    /// A hit connected.
    HitLanded {
        /// Fighter that attacked.
        attacker: FighterId,
        /// Fighter that was hit.
        defender: FighterId,
        /// Health actually removed.
        #[serde(with = "decimal_serde")]
        damage: Fixed,
        /// Whether the defender was guarding.
        blocked: bool,
    },
    /// Health dropped below the damaged threshold.
    DamagedThreshold {
        /// Fighter to swap to damaged materials.
        fighter: FighterId,
    },
    /// Health reached zero.
    Defeated {
        /// Defeated fighter.
        fighter: FighterId,
    },
    /// The stun timer fired and movement is unlocked.
    StunEnded {
        /// Recovered fighter.
        fighter: FighterId,
    },
    /// The opponent crossed sides.
    FacingChanged {
        /// Fighter whose facing flipped.
        fighter: FighterId,
        /// New facing.
        flipped: bool,
    },
    /// Impulse for the physics collaborator along the fight axis.
    Pushback {
        /// Fighter to push.
        fighter: FighterId,
        /// Signed impulse.
        #[serde(with = "decimal_serde")]
        impulse: Fixed,
    },
    /// State machine transition.
    StateChanged {
        /// Fighter that transitioned.
        fighter: FighterId,
        /// Previous state.
        from: FighterState,
        /// New state.
        to: FighterState,
    },
}

impl DuelEvent {
    /// Build a `StateChanged` event from a state machine transition.
    #[must_use]
    pub fn from_transition(
        fighter: FighterId,
        transition: Option<(FighterState, FighterState)>,
    ) -> Option<Self> {
        transition.map(|(from, to)| Self::StateChanged { fighter, from, to })
    }
}
