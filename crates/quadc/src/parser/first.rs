use std::collections::HashMap;

use bit_set::BitSet;

use super::grammar::{Grammar, Lookahead, NonTerminal, Symbol, Terminal};

// Slot layout: one bit per terminal, then end-of-input, then ε.
const EOF_SLOT: usize = Terminal::COUNT;
const EPSILON_SLOT: usize = Terminal::COUNT + 1;

/// A set of terminals plus the two pseudo-members $ and ε, backed by a
/// fixed-width bitset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSet {
    bits: BitSet,
}

impl TerminalSet {
    pub fn new() -> TerminalSet {
        TerminalSet {
            bits: BitSet::with_capacity(Terminal::COUNT + 2),
        }
    }

    pub fn insert(&mut self, terminal: Terminal) -> bool {
        self.bits.insert(terminal.slot())
    }

    pub fn insert_eof(&mut self) -> bool {
        self.bits.insert(EOF_SLOT)
    }

    pub fn insert_epsilon(&mut self) -> bool {
        self.bits.insert(EPSILON_SLOT)
    }

    pub fn insert_lookahead(&mut self, lookahead: Lookahead) -> bool {
        match lookahead {
            Lookahead::Terminal(t) => self.insert(t),
            Lookahead::Eof => self.insert_eof(),
        }
    }

    pub fn contains(&self, terminal: Terminal) -> bool {
        self.bits.contains(terminal.slot())
    }

    pub fn contains_eof(&self) -> bool {
        self.bits.contains(EOF_SLOT)
    }

    pub fn contains_epsilon(&self) -> bool {
        self.bits.contains(EPSILON_SLOT)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Adds every member of `other` except ε, leaving this set's own ε bit
    /// untouched. Returns true if this set grew.
    pub fn union_without_epsilon(&mut self, other: &TerminalSet) -> bool {
        let mut grew = false;
        for slot in other.bits.iter() {
            if slot != EPSILON_SLOT && self.bits.insert(slot) {
                grew = true;
            }
        }
        grew
    }

    pub fn terminals(&self) -> impl Iterator<Item = Terminal> + '_ {
        self.bits
            .iter()
            .filter(|&slot| slot < Terminal::COUNT)
            .map(|slot| Terminal::ALL[slot])
    }

    /// Members viewed as lookaheads: terminals and $, never ε.
    pub fn lookaheads(&self) -> impl Iterator<Item = Lookahead> + '_ {
        self.terminals()
            .map(Lookahead::Terminal)
            .chain(self.contains_eof().then_some(Lookahead::Eof))
    }
}

impl Default for TerminalSet {
    fn default() -> Self {
        TerminalSet::new()
    }
}

/// FIRST sets for every non-terminal, computed once by Kleene iteration, plus
/// a memoised FIRST(βa) for symbol strings with a concrete lookahead.
pub struct FirstSets {
    per_nonterminal: Vec<TerminalSet>,
    seq_cache: HashMap<(Vec<Symbol>, Lookahead), TerminalSet>,
}

impl FirstSets {
    pub fn compute(grammar: &Grammar) -> FirstSets {
        let mut sets = vec![TerminalSet::new(); NonTerminal::COUNT];

        // Iterate until no FIRST set grows. Sets only ever grow, so the
        // fixpoint is reached in finitely many rounds.
        let mut changed = true;
        while changed {
            changed = false;
            for &nt in NonTerminal::ALL.iter() {
                let before = sets[nt.slot()].len();
                for &pid in grammar.productions_of(nt) {
                    let production = grammar.production(pid);
                    let contribution = first_of_rhs(&production.rhs, &sets);
                    let target = &mut sets[nt.slot()];
                    target.union_without_epsilon(&contribution);
                    if contribution.contains_epsilon() {
                        target.insert_epsilon();
                    }
                }
                if sets[nt.slot()].len() > before {
                    changed = true;
                }
            }
        }

        FirstSets {
            per_nonterminal: sets,
            seq_cache: HashMap::new(),
        }
    }

    pub fn first(&self, nt: NonTerminal) -> &TerminalSet {
        &self.per_nonterminal[nt.slot()]
    }

    /// FIRST(βa): the terminals that can begin β, with the lookahead `a`
    /// included exactly when all of β derives ε. The result never contains ε.
    pub fn first_of_seq(&mut self, beta: &[Symbol], lookahead: Lookahead) -> TerminalSet {
        let key = (beta.to_vec(), lookahead);
        if let Some(cached) = self.seq_cache.get(&key) {
            return cached.clone();
        }

        let mut result = TerminalSet::new();
        let mut all_nullable = true;
        for &symbol in beta {
            match symbol {
                Symbol::Terminal(t) => {
                    result.insert(t);
                    all_nullable = false;
                }
                Symbol::NonTerminal(nt) => {
                    let first = &self.per_nonterminal[nt.slot()];
                    result.union_without_epsilon(first);
                    if !first.contains_epsilon() {
                        all_nullable = false;
                    }
                }
                // ε in a right-hand side derives nothing; keep scanning.
                Symbol::Epsilon => continue,
                Symbol::Eof => {
                    result.insert_eof();
                    all_nullable = false;
                }
            }
            if !all_nullable {
                break;
            }
        }
        if all_nullable {
            result.insert_lookahead(lookahead);
        }

        self.seq_cache.insert(key, result.clone());
        result
    }
}

/// FIRST of one production right-hand side under the current (possibly still
/// growing) per-non-terminal sets. ε membership means the whole rhs derives ε.
fn first_of_rhs(rhs: &[Symbol], sets: &[TerminalSet]) -> TerminalSet {
    let mut result = TerminalSet::new();
    let mut all_nullable = true;
    for &symbol in rhs {
        match symbol {
            Symbol::Terminal(t) => {
                result.insert(t);
                all_nullable = false;
            }
            Symbol::NonTerminal(nt) => {
                result.union_without_epsilon(&sets[nt.slot()]);
                if !sets[nt.slot()].contains_epsilon() {
                    all_nullable = false;
                }
            }
            Symbol::Epsilon => continue,
            Symbol::Eof => {
                result.insert_eof();
                all_nullable = false;
            }
        }
        if !all_nullable {
            break;
        }
    }
    if all_nullable {
        result.insert_epsilon();
    }
    result
}
