//! Plain-text rendering of a [`Trellis`] for inspection.

use crate::labels::Alphabet;
use crate::viterbi::Trellis;
use std::fmt;

pub struct TrellisReport<'a> {
    trellis: &'a Trellis,
    states: Option<&'a Alphabet>,
}

impl<'a> TrellisReport<'a> {
    pub fn new(trellis: &'a Trellis) -> Self {
        Self {
            trellis,
            states: None,
        }
    }

    /// Prefix rows (and name backpointers) with state labels instead of indices.
    pub fn with_states(mut self, states: &'a Alphabet) -> Self {
        self.states = Some(states);
        self
    }

    fn state_name(&self, state: usize) -> String {
        self.states
            .and_then(|a| a.label_of(state))
            .map_or_else(|| state.to_string(), str::to_string)
    }
}

impl fmt::Display for TrellisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.trellis.n_states();
        let width = (0..n)
            .map(|s| self.state_name(s).len())
            .max()
            .unwrap_or(1);

        writeln!(f, "Viterbi Matrix")?;
        for s in 0..n {
            write!(f, "\t{:<width$}", self.state_name(s))?;
            for t in 0..self.trellis.len() {
                write!(f, " {:>10.4}", self.trellis.score(s, t))?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Previous State Matrix")?;
        for s in 0..n {
            write!(f, "\t{:<width$}", self.state_name(s))?;
            for t in 0..self.trellis.len() {
                let prev = self
                    .trellis
                    .backpointer(s, t)
                    .map_or_else(|| "-".to_string(), |p| self.state_name(p));
                write!(f, " {:>10}", prev)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
