//! Replay scripts: a seeded world plus a tick-stamped stream of host events.
//!
//! ```yaml
//! tick_interval_ms: 50
//! run_ticks: 400
//! soil:
//!   - { x: 0, y: 63, z: 0 }
//! events:
//!   - { tick: 0, event: join, actor: 0190..., name: Steve }
//!   - { tick: 1, event: place, actor: 0190..., name: Steve, pos: { x: 0, y: 64, z: 0 }, block: wheat }
//!   - { tick: 5, event: grow, pos: { x: 0, y: 64, z: 0 }, age: 7 }
//!   - { tick: 6, event: break, actor: 0190..., name: Steve, pos: { x: 0, y: 64, z: 0 } }
//! ```

use std::path::Path;

use furrow_types::{ActorId, BlockKind, BlockPos, ToolKind};
use serde::Deserialize;

/// Errors that can occur when loading a replay script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Failed to read the script file.
    #[error("failed to read replay script: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse the script YAML.
    #[error("failed to parse replay script: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ScriptError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A complete replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplayScript {
    /// Real-time milliseconds per tick (0 runs as fast as possible).
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Total ticks to run. Defaults to the last event tick.
    #[serde(default)]
    pub run_ticks: Option<u64>,

    /// Positions seeded with farmland before the replay starts.
    #[serde(default)]
    pub soil: Vec<BlockPos>,

    /// Positions seeded with soul sand before the replay starts.
    #[serde(default)]
    pub soul_sand: Vec<BlockPos>,

    /// Host events, applied at the start of their tick in file order.
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl ReplayScript {
    /// Load a script from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Io`] if the file cannot be read, or
    /// [`ScriptError::Yaml`] if it is not a valid script.
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a script from a YAML string.
    ///
    /// Events are sorted by tick; events sharing a tick keep file order.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Yaml`] if the string is not a valid script.
    pub fn parse(yaml: &str) -> Result<Self, ScriptError> {
        let mut script: Self = serde_yml::from_str(yaml)?;
        script.events.sort_by_key(|event| event.tick);
        Ok(script)
    }

    /// The tick at which the replay stops.
    pub fn last_tick(&self) -> u64 {
        self.run_ticks
            .unwrap_or_else(|| self.events.iter().map(|e| e.tick).max().unwrap_or(0))
    }
}

/// One host event at a given tick.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptEvent {
    /// Tick at which the event happens.
    pub tick: u64,
    /// What happens.
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// Host event payloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptAction {
    /// An actor connects.
    Join {
        /// Who.
        actor: ActorId,
        /// Display name.
        name: String,
    },
    /// An actor disconnects.
    Quit {
        /// Who.
        actor: ActorId,
        /// Display name.
        name: String,
    },
    /// An actor places a block.
    Place {
        /// Who.
        actor: ActorId,
        /// Display name.
        name: String,
        /// Where.
        pos: BlockPos,
        /// What.
        block: BlockKind,
    },
    /// An actor breaks the block at a position.
    Break {
        /// Who.
        actor: ActorId,
        /// Display name.
        name: String,
        /// Where.
        pos: BlockPos,
        /// Item in hand.
        #[serde(default = "bare_hand")]
        tool: ToolKind,
    },
    /// The host's ambient simulation grows a crop.
    Grow {
        /// Where.
        pos: BlockPos,
        /// New growth stage.
        age: u8,
    },
    /// Something outside the farming rules changes a block.
    Set {
        /// Where.
        pos: BlockPos,
        /// The new block (`air` clears it).
        block: BlockKind,
    },
}

fn bare_hand() -> ToolKind {
    ToolKind::new("air")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const ACTOR: &str = "0190c6a2-7b1e-7cc0-8a3e-4f2d9b6c1a00";

    #[test]
    fn parses_every_event_kind() {
        let yaml = format!(
            r"
tick_interval_ms: 10
soil:
  - {{ x: 0, y: 63, z: 0 }}
events:
  - {{ tick: 9, event: quit, actor: {ACTOR}, name: Steve }}
  - {{ tick: 0, event: join, actor: {ACTOR}, name: Steve }}
  - {{ tick: 1, event: place, actor: {ACTOR}, name: Steve, pos: {{ x: 0, y: 64, z: 0 }}, block: WHEAT }}
  - {{ tick: 4, event: grow, pos: {{ x: 0, y: 64, z: 0 }}, age: 7 }}
  - {{ tick: 5, event: break, actor: {ACTOR}, name: Steve, pos: {{ x: 0, y: 64, z: 0 }} }}
  - {{ tick: 6, event: set, pos: {{ x: 0, y: 64, z: 0 }}, block: torch }}
"
        );
        let script = ReplayScript::parse(&yaml).unwrap();
        assert_eq!(script.tick_interval_ms, 10);
        assert_eq!(script.soil, vec![BlockPos::new(0, 63, 0)]);
        assert_eq!(script.events.len(), 6);
        assert_eq!(script.last_tick(), 9);

        let ticks: Vec<u64> = script.events.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![0, 1, 4, 5, 6, 9]);
        assert!(matches!(
            &script.events[1].action,
            ScriptAction::Place { block, .. } if *block == BlockKind::WHEAT
        ));
        assert!(matches!(
            &script.events[3].action,
            ScriptAction::Break { tool, .. } if tool.as_str() == "air"
        ));
    }

    #[test]
    fn run_ticks_overrides_last_event() {
        let script = ReplayScript::parse("run_ticks: 250\n").unwrap();
        assert_eq!(script.last_tick(), 250);
        assert_eq!(ReplayScript::default().last_tick(), 0);
    }

    #[test]
    fn unknown_event_is_an_error() {
        let yaml = "events:\n  - { tick: 1, event: explode }\n";
        assert!(matches!(
            ReplayScript::parse(yaml),
            Err(ScriptError::Yaml { .. })
        ));
    }
}
