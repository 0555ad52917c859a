use super::grammar::*;

#[test]
fn production_ids_are_dense_and_stable() {
    let grammar = Grammar::object_language();
    for (i, production) in grammar.productions().iter().enumerate() {
        assert_eq!(production.id.index(), i);
    }
}

#[test]
fn production_zero_is_the_augmentation() {
    let grammar = Grammar::object_language();
    let augmentation = grammar.augmentation();
    assert_eq!(augmentation.id.index(), 0);
    assert_eq!(augmentation.lhs, NonTerminal::AugmentedStart);
    assert_eq!(
        augmentation.rhs,
        vec![Symbol::NonTerminal(NonTerminal::Program)]
    );
}

#[test]
fn grammar_has_the_expected_production_count() {
    // 51 object-language productions plus the augmentation.
    assert_eq!(Grammar::object_language().productions().len(), 52);
}

#[test]
fn epsilon_productions_are_detected() {
    let grammar = Grammar::object_language();
    let epsilon_lhs: Vec<NonTerminal> = grammar
        .productions()
        .iter()
        .filter(|p| p.is_epsilon())
        .map(|p| p.lhs)
        .collect();
    assert_eq!(epsilon_lhs, vec![NonTerminal::Decls, NonTerminal::Stmts]);
    for production in grammar.productions().iter().filter(|p| p.is_epsilon()) {
        assert_eq!(production.rhs_len(), 0);
    }
}

#[test]
fn productions_are_indexed_by_left_hand_side() {
    let grammar = Grammar::object_language();
    assert_eq!(grammar.productions_of(NonTerminal::Decl).len(), 2);
    assert_eq!(grammar.productions_of(NonTerminal::MatchedStmt).len(), 6);
    assert_eq!(grammar.productions_of(NonTerminal::UnmatchedStmt).len(), 3);
    assert_eq!(grammar.productions_of(NonTerminal::Factor).len(), 6);
    for (lhs, pid) in NonTerminal::ALL
        .iter()
        .flat_map(|&nt| grammar.productions_of(nt).iter().map(move |&p| (nt, p)))
    {
        assert_eq!(grammar.production(pid).lhs, lhs);
    }
}

#[test]
fn productions_render_readably() {
    let grammar = Grammar::object_language();
    assert_eq!(
        grammar.production(ProductionId::new(5)).to_string(),
        "decl -> type id ;"
    );
    assert_eq!(
        grammar.production(ProductionId::new(4)).to_string(),
        "decls -> ε"
    );
}

#[test]
fn transition_symbols_exclude_epsilon() {
    assert!(Grammar::transition_symbols().all(|s| s != Symbol::Epsilon && s != Symbol::Eof));
    assert_eq!(
        Grammar::transition_symbols().count(),
        Terminal::COUNT + NonTerminal::COUNT
    );
}

#[test]
fn terminal_slots_match_the_all_table() {
    for (i, &terminal) in Terminal::ALL.iter().enumerate() {
        assert_eq!(terminal.slot(), i);
    }
    for (i, &nt) in NonTerminal::ALL.iter().enumerate() {
        assert_eq!(nt.slot(), i);
    }
}
