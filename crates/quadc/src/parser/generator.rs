use std::collections::{BTreeSet, HashMap, VecDeque};

use petgraph::graph::DiGraph;

use super::first::FirstSets;
use super::grammar::{Grammar, Lookahead, Symbol};
use super::items::{Item, ItemSet, StateId};
use super::tables::{Action, ParseTable, TableError};

/// Builds the canonical LR(1) collection for a grammar and synthesises the
/// ACTION/GOTO tables from it.
pub struct LrGenerator {
    grammar: Grammar,
    firsts: FirstSets,
    states: Vec<ItemSet>,
}

impl LrGenerator {
    pub fn new(grammar: Grammar) -> LrGenerator {
        let firsts = FirstSets::compute(&grammar);
        let mut generator = LrGenerator {
            grammar,
            firsts,
            states: Vec::new(),
        };
        generator.build_states();
        generator
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.firsts
    }

    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }

    /// Closure of an item set: for every `[A -> α . B β, a]` and every
    /// B-production `B -> γ`, add `[B -> . γ, b]` for each b in FIRST(βa),
    /// until nothing new appears.
    fn closure(&mut self, seed: BTreeSet<Item>) -> BTreeSet<Item> {
        let mut items = seed;
        let mut queue: VecDeque<Item> = items.iter().copied().collect();

        while let Some(item) = queue.pop_front() {
            let nt = match item.next_symbol(&self.grammar) {
                Some(Symbol::NonTerminal(nt)) => nt,
                _ => continue,
            };
            let beta: Vec<Symbol> = self.grammar.production(item.production).rhs
                [item.dot + 1..]
                .to_vec();
            let first = self.firsts.first_of_seq(&beta, item.lookahead);

            for &pid in self.grammar.productions_of(nt) {
                for lookahead in first.lookaheads() {
                    let new_item = Item::new(pid, 0, lookahead);
                    if items.insert(new_item) {
                        queue.push_back(new_item);
                    }
                }
            }
        }
        items
    }

    /// goto(I, X): advance the dot over X in every item that allows it, then
    /// close the kernel. Empty kernel means no transition.
    fn goto_set(&mut self, items: &BTreeSet<Item>, symbol: Symbol) -> BTreeSet<Item> {
        let mut kernel = BTreeSet::new();
        for item in items {
            if item.next_symbol(&self.grammar) == Some(symbol) {
                kernel.insert(item.advanced());
            }
        }
        if kernel.is_empty() {
            kernel
        } else {
            self.closure(kernel)
        }
    }

    /// The canonical collection: seed with closure({[S' -> . program, $]}),
    /// then keep taking gotos until no new item set appears. Deduplication is
    /// by item-set equality, ignoring ids and transitions.
    fn build_states(&mut self) {
        let start = Item::new(self.grammar.augmentation().id, 0, Lookahead::Eof);
        let initial = self.closure(BTreeSet::from([start]));

        let mut seen: HashMap<BTreeSet<Item>, StateId> = HashMap::new();
        let id0 = StateId::new(0);
        seen.insert(initial.clone(), id0);
        self.states.push(ItemSet::new(id0, initial));

        let mut i = 0;
        while i < self.states.len() {
            let current = self.states[i].items.clone();
            for symbol in Grammar::transition_symbols() {
                let next = self.goto_set(&current, symbol);
                if next.is_empty() {
                    continue;
                }
                let target = match seen.get(&next) {
                    Some(&id) => id,
                    None => {
                        let id = StateId::new(self.states.len() as u32);
                        seen.insert(next.clone(), id);
                        self.states.push(ItemSet::new(id, next));
                        id
                    }
                };
                self.states[i].transitions.insert(symbol, target);
            }
            i += 1;
        }
    }

    /// ACTION/GOTO synthesis. Terminal transitions become shifts,
    /// non-terminal transitions become gotos, complete items become reduces,
    /// and the complete augmentation item on $ becomes Accept.
    pub fn build_table(&self) -> Result<ParseTable, TableError> {
        let mut table = ParseTable::new(self.states.len());

        for state in &self.states {
            for (&symbol, &target) in &state.transitions {
                match symbol {
                    Symbol::Terminal(t) => {
                        table.insert_action(state.id, Lookahead::Terminal(t), Action::Shift(target));
                    }
                    Symbol::NonTerminal(nt) => {
                        table.insert_goto(state.id, nt, target)?;
                    }
                    Symbol::Epsilon | Symbol::Eof => {}
                }
            }

            for item in &state.items {
                if !item.is_complete(&self.grammar) {
                    continue;
                }
                if item.production.index() == 0 {
                    if item.lookahead == Lookahead::Eof {
                        table.insert_action(state.id, Lookahead::Eof, Action::Accept);
                    }
                } else {
                    table.insert_action(state.id, item.lookahead, Action::Reduce(item.production));
                }
            }
        }
        Ok(table)
    }

    /// The LR(1) automaton as a graph, for Graphviz dumps.
    pub fn automaton_graph(&self) -> DiGraph<String, String> {
        let mut graph = DiGraph::new();
        let nodes: Vec<_> = self
            .states
            .iter()
            .map(|state| graph.add_node(state.to_string()))
            .collect();
        for state in &self.states {
            for (&symbol, &target) in &state.transitions {
                graph.add_edge(
                    nodes[state.id.index()],
                    nodes[target.index()],
                    symbol.to_string(),
                );
            }
        }
        graph
    }
}
