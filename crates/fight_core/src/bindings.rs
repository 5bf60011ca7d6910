//! Device action names to control actions.
//!
//! Which device action drives which fighter is plain configuration handed
//! to the duel at construction. Two fighters can share one keyboard by
//! giving them disjoint action names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attack::AttackTier;
use crate::input::tokens;

/// A discrete control a fighter can press and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlAction {
    /// Jump.
    Jump,
    /// Crouch.
    Crouch,
    /// Guard.
    Block,
    /// Base or super attack.
    Attack(AttackTier),
    /// Meter-spending follow-up.
    ExceptionalAttack,
}

impl ControlAction {
    /// Input token recorded when this action is pressed.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Jump => tokens::JUMP,
            Self::Crouch => tokens::CROUCH,
            Self::Block => tokens::BLOCK,
            Self::Attack(tier) => tier.token(),
            Self::ExceptionalAttack => tokens::EXCEPTIONAL_ATTACK,
        }
    }
}

/// Binding table for one fighter.
///
/// # Example RON
///
/// ```ron
/// InputBindings(
///     axis: "MoveRightP2",
///     actions: {
///         "JumpP2": Jump,
///         "Attack1P2": Attack(Light),
///     },
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputBindings {
    /// Name of the horizontal movement axis.
    pub axis: String,
    /// Device action name to control.
    pub actions: BTreeMap<String, ControlAction>,
}

impl InputBindings {
    /// Build a table where every action name carries `suffix`.
    fn with_suffix(axis: &str, plain_movement: bool, suffix: &str) -> Self {
        let movement_suffix = if plain_movement { "" } else { suffix };
        let mut actions = BTreeMap::new();

        actions.insert(format!("Jump{movement_suffix}"), ControlAction::Jump);
        actions.insert(format!("Crouch{movement_suffix}"), ControlAction::Crouch);
        actions.insert(format!("Block{movement_suffix}"), ControlAction::Block);

        let tiers = [
            AttackTier::Light,
            AttackTier::Medium,
            AttackTier::Heavy,
            AttackTier::Super,
        ];
        for (slot, tier) in tiers.into_iter().enumerate() {
            actions.insert(
                format!("Attack{}{suffix}", slot + 1),
                ControlAction::Attack(tier),
            );
        }
        actions.insert(
            format!("ExceptionalAttack{suffix}"),
            ControlAction::ExceptionalAttack,
        );

        Self {
            axis: axis.to_string(),
            actions,
        }
    }

    /// Default bindings for the first player.
    ///
    /// Movement actions use bare names; attacks carry a `P1` suffix.
    #[must_use]
    pub fn player_one() -> Self {
        Self::with_suffix("MoveRight", true, "P1")
    }

    /// Default bindings for the second player. Every name carries `P2`.
    #[must_use]
    pub fn player_two() -> Self {
        Self::with_suffix("MoveRightP2", false, "P2")
    }

    /// Look up the control bound to a device action name.
    #[must_use]
    pub fn resolve(&self, action: &str) -> Option<ControlAction> {
        self.actions.get(action).copied()
    }

    /// Bind (or rebind) a device action name.
    pub fn bind(&mut self, action: impl Into<String>, control: ControlAction) {
        self.actions.insert(action.into(), control);
    }

    /// Whether this table owns the axis name.
    #[must_use]
    pub fn owns_axis(&self, axis: &str) -> bool {
        self.axis == axis
    }

    /// Names bound in both tables.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> Vec<String> {
        let mut conflicts: Vec<String> = self
            .actions
            .keys()
            .filter(|name| other.actions.contains_key(*name))
            .cloned()
            .collect();
        if self.axis == other.axis {
            conflicts.push(self.axis.clone());
        }
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_disjoint() {
        let one = InputBindings::player_one();
        let two = InputBindings::player_two();
        assert!(one.conflicts_with(&two).is_empty());
    }

    #[test]
    fn test_resolve_player_two() {
        let two = InputBindings::player_two();
        assert_eq!(two.resolve("JumpP2"), Some(ControlAction::Jump));
        assert_eq!(
            two.resolve("Attack3P2"),
            Some(ControlAction::Attack(AttackTier::Heavy))
        );
        assert_eq!(two.resolve("Jump"), None);
        assert!(two.owns_axis("MoveRightP2"));
    }

    #[test]
    fn test_rebinding_creates_conflict() {
        let one = InputBindings::player_one();
        let mut two = InputBindings::player_two();
        two.bind("Jump", ControlAction::Jump);
        assert_eq!(one.conflicts_with(&two), vec!["Jump".to_string()]);
    }

    #[test]
    fn test_action_tokens() {
        assert_eq!(ControlAction::Attack(AttackTier::Super).token(), "Attack4");
        assert_eq!(ControlAction::ExceptionalAttack.token(), "ExceptionalAttack");
    }
}
