//! Symbol tables for one assembly run
//!
//! [`Labels`] are declared while lines are classified and receive their
//! address during the resolve pass, so a declared-but-unresolved label is a
//! forward reference rather than an error. [`Variables`] hold the literal
//! operand text assigned with `NAME=value`; substitution happens on use.

use std::collections::BTreeMap;

use crate::assembler::Symbol;

#[derive(Debug, Clone)]
struct LabelEntry {
    address: Option<u16>,
    defined_at: usize,
}

/// Label name to address, `None` until the resolve pass reaches the label.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    entries: BTreeMap<String, LabelEntry>,
}

impl Labels {
    /// Create a new empty label table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a label without an address.
    ///
    /// Returns the line of the earlier definition if the name is taken.
    pub fn declare(&mut self, name: &str, defined_at: usize) -> Result<(), usize> {
        if let Some(existing) = self.entries.get(name) {
            return Err(existing.defined_at);
        }
        self.entries.insert(
            name.to_string(),
            LabelEntry {
                address: None,
                defined_at,
            },
        );
        Ok(())
    }

    /// Records the address of a declared label.
    pub fn resolve(&mut self, name: &str, address: u16) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.address = Some(address);
        }
    }

    /// `None` if undeclared, `Some(None)` if declared but not yet resolved.
    pub fn get(&self, name: &str) -> Option<Option<u16>> {
        self.entries.get(name).map(|entry| entry.address)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resolved labels, sorted by name.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.entries
            .iter()
            .filter_map(|(name, entry)| {
                entry.address.map(|address| Symbol {
                    name: name.clone(),
                    address,
                    defined_at: entry.defined_at,
                })
            })
            .collect()
    }
}

/// Variable name to the operand text it stands for.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    entries: BTreeMap<String, (String, usize)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the line of the earlier definition if the name is taken.
    pub fn define(&mut self, name: &str, value: &str, defined_at: usize) -> Result<(), usize> {
        if let Some((_, line)) = self.entries.get(name) {
            return Err(*line);
        }
        self.entries
            .insert(name.to_string(), (value.to_string(), defined_at));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|(value, _)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}
