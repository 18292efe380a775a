/// Result of recording one player's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Another player still has to go; holds their index.
    Next(usize),
    /// The last player just went. The index is back at 0.
    PhaseComplete,
}

/// Walks player-list order for both answering and voting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSequencer {
    current: usize,
}

impl TurnSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Called after the current player submitted.
    pub fn advance(&mut self, player_count: usize) -> TurnOutcome {
        if self.current + 1 >= player_count {
            self.current = 0;
            TurnOutcome::PhaseComplete
        } else {
            self.current += 1;
            TurnOutcome::Next(self.current)
        }
    }
}
