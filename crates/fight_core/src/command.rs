//! Command recognition over the input history.
//!
//! A command is a named token sequence. When the sequence shows up as a
//! contiguous run in a fighter's [`InputBuffer`], the command fires once
//! and latches until it is explicitly reset. Inputs spent on a firing are
//! never reused: after a reset only a run that starts later can fire it.

use serde::{Deserialize, Serialize};

use crate::error::{FightError, Result};
use crate::input::{InputBuffer, InputToken};

/// A named input sequence.
///
/// # Example RON
///
/// ```ron
/// Command(
///     name: "Fireball",
///     sequence: ["Back", "Forward", "Attack1"],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Unique identifier reported when the command fires.
    pub name: String,
    /// Tokens that must appear back to back, in order.
    pub sequence: Vec<InputToken>,
    /// Latched once fired.
    #[serde(default)]
    pub used: bool,
    /// Arrival number of the last input consumed by a firing.
    #[serde(default)]
    pub consumed_through: Option<u64>,
}

impl Command {
    /// Create an armed command.
    #[must_use]
    pub fn new<I, T>(name: impl Into<String>, sequence: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<InputToken>,
    {
        Self {
            name: name.into(),
            sequence: sequence.into_iter().map(Into::into).collect(),
            used: false,
            consumed_through: None,
        }
    }

    /// Whether the command can still fire.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        !self.used
    }
}

/// A command that fired during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTrigger {
    /// Name of the command.
    pub name: String,
    /// Buffer index where the matching run starts.
    pub start: usize,
}

/// The set of commands configured for one fighter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandMatcher {
    commands: Vec<Command>,
}

impl CommandMatcher {
    /// Create a matcher from command definitions. All commands start armed.
    #[must_use]
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands
                .into_iter()
                .map(|command| Command {
                    used: false,
                    consumed_through: None,
                    ..command
                })
                .collect(),
        }
    }

    /// Check every armed command against the full buffer.
    ///
    /// Each command is evaluated independently; overlapping sequences can
    /// both fire from the same scan. Fired commands are latched.
    pub fn scan(&mut self, buffer: &InputBuffer) -> Vec<CommandTrigger> {
        let mut triggered = Vec::new();

        for command in self.commands.iter_mut().filter(|c| c.is_armed()) {
            let found = buffer.find_sequence_after(&command.sequence, command.consumed_through);
            if let Some(start) = found {
                let last = start + command.sequence.len() - 1;
                command.used = true;
                command.consumed_through = buffer.get(last).map(|event| event.seq);
                tracing::debug!("Command '{}' matched at buffer index {}", command.name, start);
                triggered.push(CommandTrigger {
                    name: command.name.clone(),
                    start,
                });
            }
        }

        triggered
    }

    /// Re-arm a single command. Inputs it already consumed stay spent.
    ///
    /// # Errors
    ///
    /// Returns [`FightError::UnknownCommand`] if no command has this name.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let command = self
            .commands
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| FightError::UnknownCommand(name.to_string()))?;
        command.used = false;
        Ok(())
    }

    /// Re-arm every command.
    pub fn reset_all(&mut self) {
        for command in &mut self.commands {
            command.used = false;
        }
    }

    /// Look up a command by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Iterate over all commands.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Number of configured commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if no commands are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    fn buffer_of(entries: &[(&str, f64)]) -> InputBuffer {
        let mut buffer = InputBuffer::new(Fixed::from_num(10), 64);
        for (token, at) in entries {
            buffer.push(*token, Fixed::from_num(*at)).unwrap();
        }
        buffer
    }

    fn abc_matcher() -> CommandMatcher {
        CommandMatcher::new([Command::new("Temp Command", ["A", "B", "C"])])
    }

    #[test]
    fn test_contiguous_sequence_fires_once() {
        let mut matcher = abc_matcher();
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("C", 0.2)]);

        let fired = matcher.scan(&buffer);
        assert_eq!(
            fired,
            vec![CommandTrigger {
                name: "Temp Command".to_string(),
                start: 0,
            }]
        );
        assert!(matcher.get("Temp Command").unwrap().used);
    }

    #[test]
    fn test_interrupted_sequence_does_not_fire() {
        let mut matcher = abc_matcher();
        let buffer = buffer_of(&[("A", 0.0), ("X", 0.1), ("B", 0.2), ("C", 0.3)]);

        assert!(matcher.scan(&buffer).is_empty());
        assert!(matcher.get("Temp Command").unwrap().is_armed());
    }

    #[test]
    fn test_used_command_never_refires_without_reset() {
        let mut matcher = abc_matcher();
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("C", 0.2)]);

        assert_eq!(matcher.scan(&buffer).len(), 1);
        assert!(matcher.scan(&buffer).is_empty());
        assert!(matcher.scan(&buffer).is_empty());
    }

    #[test]
    fn test_reset_command_needs_fresh_inputs() {
        let mut matcher = abc_matcher();
        let mut buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("C", 0.2)]);
        assert_eq!(matcher.scan(&buffer).len(), 1);

        matcher.reset("Temp Command").unwrap();
        buffer.push("X", Fixed::from_num(0.3)).unwrap();
        assert!(matcher.scan(&buffer).is_empty());
        assert!(matcher.get("Temp Command").unwrap().is_armed());

        for (token, at) in [("A", 0.4), ("B", 0.5), ("C", 0.6)] {
            buffer.push(token, Fixed::from_num(at)).unwrap();
        }
        assert_eq!(
            matcher.scan(&buffer),
            vec![CommandTrigger {
                name: "Temp Command".to_string(),
                start: 4,
            }]
        );
        assert_eq!(matcher.get("Temp Command").unwrap().consumed_through, Some(6));
    }

    #[test]
    fn test_overlapping_commands_evaluate_independently() {
        let mut matcher = CommandMatcher::new([
            Command::new("Short", ["B", "C"]),
            Command::new("Long", ["A", "B", "C"]),
        ]);
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1), ("C", 0.2)]);

        let names: Vec<String> = matcher.scan(&buffer).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Short".to_string(), "Long".to_string()]);
    }

    #[test]
    fn test_reset_unknown_command() {
        let mut matcher = abc_matcher();
        assert_eq!(
            matcher.reset("Nope"),
            Err(FightError::UnknownCommand("Nope".to_string()))
        );
    }

    #[test]
    fn test_new_arms_every_command() {
        let mut preused = Command::new("X", ["A"]);
        preused.used = true;
        let matcher = CommandMatcher::new([preused]);
        assert!(matcher.get("X").unwrap().is_armed());
    }

    #[test]
    fn test_reset_all() {
        let mut matcher = CommandMatcher::new([
            Command::new("One", ["A"]),
            Command::new("Two", ["B"]),
        ]);
        let buffer = buffer_of(&[("A", 0.0), ("B", 0.1)]);
        assert_eq!(matcher.scan(&buffer).len(), 2);

        matcher.reset_all();
        assert!(matcher.iter().all(Command::is_armed));
        assert!(matcher.scan(&buffer).is_empty());
    }
}
