//! Selectable character classes.

use serde::{Deserialize, Serialize};

/// Character model a player picked on the select screen.
///
/// Purely cosmetic inside the core; the rendering collaborator uses it to
/// pick meshes and animation sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CharacterClass {
    /// The stock mannequin.
    #[default]
    Mannequin,
    /// The Y Bot.
    YBot,
}

impl CharacterClass {
    /// Get the display name for this class.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Mannequin => "Mannequin",
            Self::YBot => "YBot",
        }
    }
}
