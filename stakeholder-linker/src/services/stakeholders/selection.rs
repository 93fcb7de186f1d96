//! Multi-select tracking over the rendered list
//!
//! Rows are identified by their position in the display list, not by record
//! id, so the selection only means something for the list it was made on.
//! The owner calls [`SelectionTracker::invalidate`] whenever that list is
//! replaced.

use std::collections::BTreeSet;

use super::models::Stakeholder;

#[derive(Debug, Clone)]
pub struct SelectionTracker {
    rows: BTreeSet<usize>,
    preserve_on_empty_click: bool,
}

impl SelectionTracker {
    pub fn new(preserve_on_empty_click: bool) -> Self {
        Self {
            rows: BTreeSet::new(),
            preserve_on_empty_click,
        }
    }

    /// Replace the selection; rows outside `0..display_len` are ignored
    pub fn set_rows(&mut self, rows: impl IntoIterator<Item = usize>, display_len: usize) {
        self.rows = rows.into_iter().filter(|row| *row < display_len).collect();
    }

    pub fn toggle(&mut self, row: usize, display_len: usize) {
        if row >= display_len {
            return;
        }
        if !self.rows.remove(&row) {
            self.rows.insert(row);
        }
    }

    pub fn select_all(&mut self, display_len: usize) {
        self.rows = (0..display_len).collect();
    }

    /// Click outside any row
    pub fn empty_area_click(&mut self) {
        if !self.preserve_on_empty_click {
            self.rows.clear();
        }
    }

    /// The display list was replaced; row positions no longer apply
    pub fn invalidate(&mut self) {
        self.rows.clear();
    }

    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Selected stakeholders in display order
    pub fn current_selection(&self, display: &[Stakeholder]) -> Vec<Stakeholder> {
        self.rows
            .iter()
            .filter_map(|row| display.get(*row).cloned())
            .collect()
    }
}
