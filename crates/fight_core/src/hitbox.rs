//! Collision volumes reported by the host's collision layer.
//!
//! The core never tests geometry. The collision collaborator tells the duel
//! which of a fighter's volumes touched the opponent, and the duel decides
//! what that means (see [`Duel::hitbox_overlap`](crate::duel::Duel::hitbox_overlap)).

use serde::{Deserialize, Serialize};

use crate::attack::AttackSpec;

/// What a collision volume is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitboxKind {
    /// Zone around a fighter that triggers the opponent's auto-guard.
    Proximity,
    /// Active part of an attack.
    Strike,
    /// Body volume that receives strikes.
    Hurtbox,
}

/// A collision volume owned by one fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hitbox {
    /// Role of the volume.
    pub kind: HitboxKind,
    /// Hit parameters, only meaningful for strikes.
    #[serde(default)]
    pub attack: AttackSpec,
}

impl Hitbox {
    /// Proximity zone.
    #[must_use]
    pub fn proximity() -> Self {
        Self {
            kind: HitboxKind::Proximity,
            attack: AttackSpec::default(),
        }
    }

    /// Strike carrying `attack`.
    #[must_use]
    pub const fn strike(attack: AttackSpec) -> Self {
        Self {
            kind: HitboxKind::Strike,
            attack,
        }
    }

    /// Body volume.
    #[must_use]
    pub fn hurtbox() -> Self {
        Self {
            kind: HitboxKind::Hurtbox,
            attack: AttackSpec::default(),
        }
    }
}
