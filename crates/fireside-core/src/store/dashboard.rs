// ── Dashboard layout ──
//
// Partition of the fixed section set into an ordered visible list and a
// hidden set. Every section is in exactly one of the two; operations that
// would break that are no-ops.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A dashboard card. Default visible order follows declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DashboardSection {
    NetWorth,
    Accounts,
    Budgets,
    Bills,
    PiggyBanks,
    Recurring,
    Spending,
    RecentTransactions,
}

impl DashboardSection {
    pub fn title(self) -> &'static str {
        match self {
            Self::NetWorth => "Net worth",
            Self::Accounts => "Accounts",
            Self::Budgets => "Budgets",
            Self::Bills => "Bills",
            Self::PiggyBanks => "Piggy banks",
            Self::Recurring => "Recurring",
            Self::Spending => "Spending",
            Self::RecentTransactions => "Recent transactions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLayout {
    visible: Vec<DashboardSection>,
    hidden: IndexSet<DashboardSection>,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            visible: DashboardSection::iter().collect(),
            hidden: IndexSet::new(),
        }
    }
}

impl DashboardLayout {
    pub fn visible(&self) -> &[DashboardSection] {
        &self.visible
    }

    pub fn hidden(&self) -> &IndexSet<DashboardSection> {
        &self.hidden
    }

    pub fn is_visible(&self, section: DashboardSection) -> bool {
        self.visible.contains(&section)
    }

    /// Remove from the visible list and add to the hidden set.
    /// Returns `false` (and changes nothing) if it was already hidden.
    pub fn move_to_hidden(&mut self, section: DashboardSection) -> bool {
        let Some(pos) = self.visible.iter().position(|s| *s == section) else {
            return false;
        };
        self.visible.remove(pos);
        self.hidden.insert(section);
        true
    }

    /// Remove from the hidden set and append to the end of the visible list.
    pub fn move_to_visible(&mut self, section: DashboardSection) -> bool {
        if !self.hidden.shift_remove(&section) {
            return false;
        }
        self.visible.push(section);
        true
    }

    /// Move the visible item at `from` to index `to`.
    /// Out-of-range indices leave the order untouched.
    pub fn reorder_visible(&mut self, from: usize, to: usize) -> bool {
        let len = self.visible.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }
        let section = self.visible.remove(from);
        self.visible.insert(to, section);
        true
    }

    /// Replace the whole visible order, e.g. after a drag-and-drop.
    /// Rejected unless `order` is a permutation of the current visible list.
    pub fn set_visible_order(&mut self, order: Vec<DashboardSection>) -> bool {
        let current: IndexSet<_> = self.visible.iter().copied().collect();
        let proposed: IndexSet<_> = order.iter().copied().collect();
        if order.len() != self.visible.len() || proposed.len() != order.len() || current != proposed
        {
            return false;
        }
        self.visible = order;
        true
    }

    /// Repair a layout read from storage: drop duplicates and sections
    /// present in both lists (visible wins), and append any section missing
    /// from both to the visible list.
    pub(crate) fn sanitized(self) -> Self {
        let mut seen = IndexSet::new();
        let visible: Vec<_> = self
            .visible
            .into_iter()
            .filter(|s| seen.insert(*s))
            .collect();
        let hidden: IndexSet<_> = self
            .hidden
            .into_iter()
            .filter(|s| seen.insert(*s))
            .collect();

        let mut layout = Self { visible, hidden };
        for section in DashboardSection::iter() {
            if !seen.contains(&section) {
                layout.visible.push(section);
            }
        }
        layout
    }
}
