use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A line marked to pause execution, optionally gated by a condition
/// expression evaluated against the live context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub enabled: bool,
}

impl Breakpoint {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            condition: None,
            enabled: true,
        }
    }

    pub fn with_condition(line: usize, condition: impl Into<String>) -> Self {
        Self {
            line,
            condition: Some(condition.into()),
            enabled: true,
        }
    }
}

/// Line-keyed breakpoint store; at most one breakpoint per line.
#[derive(Debug, Clone, Default)]
pub struct BreakpointTable {
    points: BTreeMap<usize, Breakpoint>,
}

impl BreakpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the breakpoint for its line.
    pub fn set(&mut self, breakpoint: Breakpoint) {
        debug!("breakpoint set at line {}", breakpoint.line);
        self.points.insert(breakpoint.line, breakpoint);
    }

    pub fn remove(&mut self, line: usize) -> bool {
        let removed = self.points.remove(&line).is_some();
        if removed {
            debug!("breakpoint removed from line {line}");
        }
        removed
    }

    pub fn get(&self, line: usize) -> Option<&Breakpoint> {
        self.points.get(&line)
    }

    /// Flip the enabled flag if the line has a breakpoint; returns the new
    /// state, or `None` when there is nothing to toggle.
    pub fn toggle(&mut self, line: usize) -> Option<bool> {
        self.points.get_mut(&line).map(|bp| {
            bp.enabled = !bp.enabled;
            bp.enabled
        })
    }

    /// Lines with an enabled breakpoint, ascending.
    pub fn enabled_lines(&self) -> Vec<usize> {
        self.points
            .values()
            .filter(|bp| bp.enabled)
            .map(|bp| bp.line)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.points.values()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
