//! JSON-lines command scripts replayed against a session.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use lanecraft_system_input::RawCommand;
use serde::Deserialize;

/// Command scheduled before a given tick.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct ScriptEntry {
    /// Zero-based tick the command is dispatched before.
    pub(crate) tick: u64,
    /// Command handed to the input pipeline.
    #[serde(flatten)]
    pub(crate) command: RawCommand,
}

/// Commands ordered by the tick they are dispatched before.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Script {
    entries: Vec<ScriptEntry>,
}

impl Script {
    /// Reads a script file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse script {}", path.display()))
    }

    /// Parses one JSON command per line. Blank lines are ignored.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry: ScriptEntry = serde_json::from_str(line)
                .with_context(|| format!("line {} is not a scripted command", index + 1))?;
            entries.push(entry);
        }
        entries.sort_by_key(|entry| entry.tick);
        Ok(Self { entries })
    }

    /// Commands due before `tick`, in script order.
    pub(crate) fn due(&self, tick: u64) -> impl Iterator<Item = &RawCommand> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.tick == tick)
            .map(|entry| &entry.command)
    }

    /// All entries, earliest tick first.
    pub(crate) fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::Script;

    #[test]
    fn entries_are_ordered_by_tick_and_keep_file_order_within_a_tick() {
        let script = Script::parse(
            r#"
{"tick": 5, "type": "play-card", "payload": {"playerId": "player1", "slot": 0}}

{"tick": 0, "type": "spawn-unit", "payload": {"playerId": "player1", "x": 2, "y": 3.5}}
{"tick": 5, "type": "spawn-unit", "payload": {"playerId": "player2", "x": 8, "y": 3.5}}
"#,
        )
        .expect("script");

        let ticks: Vec<u64> = script.entries().iter().map(|entry| entry.tick).collect();
        assert_eq!(ticks, vec![0, 5, 5]);
        let due: Vec<&str> = script.due(5).map(|command| command.kind.as_str()).collect();
        assert_eq!(due, vec!["play-card", "spawn-unit"]);
        assert_eq!(script.due(1).count(), 0);
    }

    #[test]
    fn malformed_lines_are_reported_with_their_number() {
        let error = Script::parse("{\"tick\": 0, \"type\": \"spawn-unit\"}\nnot json\n")
            .expect_err("second line");
        assert!(error.to_string().contains("line 2"));
    }
}
