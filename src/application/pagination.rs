use std::collections::HashMap;

use crate::domain::order::{Cursor, OrderTab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    LoadingInitial,
    Loaded,
    LoadingMore,
}

/// Where a tab's paginated query stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub cursor: Option<Cursor>,
    pub has_more: bool,
    pub phase: LoadPhase,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            cursor: None,
            has_more: true,
            phase: LoadPhase::Idle,
        }
    }
}

impl PaginationState {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, LoadPhase::LoadingInitial | LoadPhase::LoadingMore)
    }

    /// Whether the driver may ask for the next page right now.
    pub fn can_load_more(&self) -> bool {
        self.phase == LoadPhase::Loaded && self.has_more && self.cursor.is_some()
    }

    pub fn begin_initial(&self) -> Self {
        Self {
            phase: LoadPhase::LoadingInitial,
            ..self.clone()
        }
    }

    pub fn begin_more(&self) -> Self {
        Self {
            phase: LoadPhase::LoadingMore,
            ..self.clone()
        }
    }

    pub fn loaded(cursor: Option<Cursor>, has_more: bool) -> Self {
        Self {
            cursor,
            has_more,
            phase: LoadPhase::Loaded,
        }
    }

    /// State to fall back to when the in-flight request failed. Cursor and
    /// `has_more` are kept so the same request can be retried.
    pub fn failed(&self) -> Self {
        let phase = match self.phase {
            LoadPhase::LoadingInitial | LoadPhase::Idle => LoadPhase::Idle,
            LoadPhase::LoadingMore | LoadPhase::Loaded => LoadPhase::Loaded,
        };
        Self {
            phase,
            ..self.clone()
        }
    }
}

/// Per-tab pagination states plus a generation counter per tab.
///
/// `reset` bumps the generation; results tagged with an older generation
/// belong to a request the board has lost interest in.
#[derive(Debug, Default)]
pub struct PaginationStore {
    states: HashMap<OrderTab, PaginationState>,
    generations: HashMap<OrderTab, u64>,
}

impl PaginationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tab: OrderTab) -> PaginationState {
        self.states.get(&tab).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, tab: OrderTab, state: PaginationState) {
        self.states.insert(tab, state);
    }

    pub fn reset(&mut self, tab: OrderTab) {
        self.states.remove(&tab);
        *self.generations.entry(tab).or_insert(0) += 1;
    }

    pub fn generation(&self, tab: OrderTab) -> u64 {
        self.generations.get(&tab).copied().unwrap_or(0)
    }

    pub fn is_current(&self, tab: OrderTab, generation: u64) -> bool {
        self.generation(tab) == generation
    }
}
