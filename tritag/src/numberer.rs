use std::collections::HashMap;

use bincode::{Decode, Encode};

/// Bijection between tag labels and dense numbers.
///
/// Numbers are assigned in first-seen order, starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Decode, Encode)]
pub struct TagNumberer {
    ids: HashMap<String, u32>,
    labels: Vec<String>,
}

impl TagNumberer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of `label`, assigning a new one if the label is unseen.
    pub fn number(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.ids.get(label) {
            id
        } else {
            // Tag sets stay far below u32::MAX.
            let id = self.labels.len() as u32;
            self.labels.push(label.to_string());
            self.ids.insert(label.to_string(), id);
            id
        }
    }

    /// Returns the number of `label` without modifying the bijection.
    pub fn get(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    /// Returns the label of the number `id`.
    pub fn label(&self, id: u32) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels, indexed by their numbers.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
