use std::collections::{BTreeSet, HashMap};
use std::fmt;

use quadc_util::make_type_idx;

use super::grammar::{Grammar, Lookahead, ProductionId, Symbol};

make_type_idx!(pub StateId, ItemSet);

/// One LR(1) item: a production, a dot position, and a lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub production: ProductionId,
    pub dot: usize,
    pub lookahead: Lookahead,
}

impl Item {
    pub fn new(production: ProductionId, dot: usize, lookahead: Lookahead) -> Item {
        Item {
            production,
            dot,
            lookahead,
        }
    }

    /// The symbol just past the dot, if any.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.production(self.production).rhs.get(self.dot).copied()
    }

    /// Complete means the dot is past the last rhs symbol, or the production
    /// is an ε-production (whose dot never moves off position 0).
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        let production = grammar.production(self.production);
        self.dot >= production.rhs.len() || production.is_epsilon()
    }

    pub fn advanced(&self) -> Item {
        Item {
            dot: self.dot + 1,
            ..*self
        }
    }

    /// `[A -> α . β, a]` for diagnostics and the automaton dump.
    pub fn render(&self, grammar: &Grammar) -> String {
        let production = grammar.production(self.production);
        let mut out = format!("[{} ->", production.lhs);
        for (i, sym) in production.rhs.iter().enumerate() {
            if i == self.dot {
                out.push_str(" .");
            }
            out.push(' ');
            out.push_str(&sym.to_string());
        }
        if self.dot >= production.rhs.len() {
            out.push_str(" .");
        }
        out.push_str(&format!(", {}]", self.lookahead));
        out
    }
}

/// One state of the canonical LR(1) collection. Two item sets are the same
/// state exactly when they hold the same items; id and transitions are
/// bookkeeping assigned on insertion.
#[derive(Debug, Clone)]
pub struct ItemSet {
    pub id: StateId,
    pub items: BTreeSet<Item>,
    pub transitions: HashMap<Symbol, StateId>,
}

impl ItemSet {
    pub fn new(id: StateId, items: BTreeSet<Item>) -> ItemSet {
        ItemSet {
            id,
            items,
            transitions: HashMap::new(),
        }
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.items.contains(item)
    }
}

impl PartialEq for ItemSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ItemSet {}

impl fmt::Display for ItemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state {} ({} items)", self.id, self.items.len())
    }
}
