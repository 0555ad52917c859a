use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::grammar::{Lookahead, NonTerminal, ProductionId};
use super::items::StateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{state}"),
            Action::Reduce(production) => write!(f, "r{production}"),
            Action::Accept => f.write_str("acc"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    Other,
}

/// A resolved table collision, kept for diagnostics. `kept` is what the
/// table ended up holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    pub symbol: Lookahead,
    pub kept: Action,
    pub dropped: Action,
    pub kind: ConflictKind,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            ConflictKind::ShiftReduce => "shift/reduce",
            ConflictKind::ReduceReduce => "reduce/reduce",
            ConflictKind::Other => "action",
        };
        write!(
            f,
            "{label} conflict in state {} on `{}`: kept {}, dropped {}",
            self.state, self.symbol, self.kept, self.dropped
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("goto conflict in state {state} on `{symbol}`: {existing} vs {incoming}")]
    GotoConflict {
        state: StateId,
        symbol: NonTerminal,
        existing: StateId,
        incoming: StateId,
    },
}

/// ACTION and GOTO, one sparse row per state. Missing ACTION entries mean
/// syntax error; a missing GOTO entry consulted at parse time is a generator
/// bug.
pub struct ParseTable {
    actions: Vec<HashMap<Lookahead, Action>>,
    gotos: Vec<HashMap<NonTerminal, StateId>>,
    conflicts: Vec<Conflict>,
}

impl ParseTable {
    pub(crate) fn new(n_states: usize) -> ParseTable {
        ParseTable {
            actions: vec![HashMap::new(); n_states],
            gotos: vec![HashMap::new(); n_states],
            conflicts: Vec::new(),
        }
    }

    /// Inserts an ACTION entry, resolving collisions by the fixed policy:
    /// shift wins over reduce, the lower production id wins among reduces,
    /// anything else keeps the existing entry. Every collision is recorded.
    pub(crate) fn insert_action(&mut self, state: StateId, symbol: Lookahead, action: Action) {
        let row = &mut self.actions[state.index()];
        let existing = match row.get(&symbol) {
            None => {
                row.insert(symbol, action);
                return;
            }
            Some(&existing) => existing,
        };
        if existing == action {
            return;
        }

        let (kept, dropped, kind) = match (existing, action) {
            (Action::Shift(_), Action::Reduce(_)) => {
                (existing, action, ConflictKind::ShiftReduce)
            }
            (Action::Reduce(_), Action::Shift(_)) => {
                (action, existing, ConflictKind::ShiftReduce)
            }
            (Action::Reduce(a), Action::Reduce(b)) => {
                if b.index() < a.index() {
                    (action, existing, ConflictKind::ReduceReduce)
                } else {
                    (existing, action, ConflictKind::ReduceReduce)
                }
            }
            _ => (existing, action, ConflictKind::Other),
        };
        row.insert(symbol, kept);
        self.conflicts.push(Conflict {
            state,
            symbol,
            kept,
            dropped,
            kind,
        });
    }

    /// GOTO must be single-valued; a differing target is fatal.
    pub(crate) fn insert_goto(
        &mut self,
        state: StateId,
        symbol: NonTerminal,
        target: StateId,
    ) -> Result<(), TableError> {
        let row = &mut self.gotos[state.index()];
        if let Some(&existing) = row.get(&symbol) {
            if existing != target {
                return Err(TableError::GotoConflict {
                    state,
                    symbol,
                    existing,
                    incoming: target,
                });
            }
            return Ok(());
        }
        row.insert(symbol, target);
        Ok(())
    }

    pub fn action(&self, state: StateId, symbol: Lookahead) -> Option<Action> {
        self.actions.get(state.index())?.get(&symbol).copied()
    }

    pub fn goto(&self, state: StateId, symbol: NonTerminal) -> Option<StateId> {
        self.gotos.get(state.index())?.get(&symbol).copied()
    }

    pub fn n_states(&self) -> usize {
        self.actions.len()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn iter_actions(&self) -> impl Iterator<Item = (StateId, Lookahead, Action)> + '_ {
        self.actions.iter().enumerate().flat_map(|(state, row)| {
            row.iter()
                .map(move |(&symbol, &action)| (StateId::new(state as u32), symbol, action))
        })
    }

    pub fn iter_gotos(&self) -> impl Iterator<Item = (StateId, NonTerminal, StateId)> + '_ {
        self.gotos.iter().enumerate().flat_map(|(state, row)| {
            row.iter()
                .map(move |(&symbol, &target)| (StateId::new(state as u32), symbol, target))
        })
    }
}
