//! # Fight Core
//!
//! Deterministic combat core for a two-player 3D fighting game.
//!
//! This crate contains **only** combat logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! The host engine owns animation, physics, collision, and audio. It feeds
//! abstract input, positions, and hit reports in, and reads state, health,
//! meter, facing, and events back out.
//!
//! ## Crate Structure
//!
//! - [`duel`] - The two-fighter arena and per-frame update
//! - [`fighter`] - A single fighter and its capability traits
//! - [`state`] - Combat state machine and transition table
//! - [`damage`] - Hit resolution
//! - [`input`] / [`command`] - Input history and command recognition
//! - [`timer`] - Cancellable one-shot timers
//! - [`config`] - Plain-data configuration loaded from RON
//! - [`math`] - Fixed-point helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod attack;
pub mod bindings;
pub mod command;
pub mod config;
pub mod damage;
pub mod duel;
pub mod error;
pub mod events;
pub mod fighter;
pub mod hitbox;
pub mod input;
pub mod math;
pub mod roster;
pub mod separation;
pub mod state;
pub mod timer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::attack::{AttackFlags, AttackSpec, AttackTier, MeterTuning};
    pub use crate::bindings::{ControlAction, InputBindings};
    pub use crate::command::{Command, CommandMatcher, CommandTrigger};
    pub use crate::config::{DuelConfig, FighterConfig};
    pub use crate::damage::HitReport;
    pub use crate::duel::Duel;
    pub use crate::error::{FightError, Result};
    pub use crate::events::DuelEvent;
    pub use crate::fighter::{Attackable, CommandListener, Fighter, FighterId, Movable};
    pub use crate::hitbox::{Hitbox, HitboxKind};
    pub use crate::input::{InputBuffer, InputEvent, InputToken};
    pub use crate::math::Fixed;
    pub use crate::roster::CharacterClass;
    pub use crate::state::{FighterState, StateTrigger};
}
