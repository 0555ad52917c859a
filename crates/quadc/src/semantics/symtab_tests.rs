use super::symtab::*;

fn entry(name: &str, ty: &str) -> SymbolEntry {
    SymbolEntry::new(name, ty, SymbolKind::Variable)
}

#[test]
fn primitive_sizes() {
    let mut table = SymbolTable::new();
    assert_eq!(table.size_of("int"), 4);
    assert_eq!(table.size_of("bool"), 4);
    assert_eq!(table.size_of("float"), 8);
    assert_eq!(table.size_of("void"), 0);
    assert_eq!(table.size_of(""), 0);
    assert_eq!(table.size_of("  "), 0);
    assert!(table.warnings().is_empty());
}

#[test]
fn array_sizes_multiply_out() {
    let mut table = SymbolTable::new();
    assert_eq!(table.size_of("array(int, 10)"), 40);
    assert_eq!(table.size_of("array(float, 3)"), 24);
    assert_eq!(table.size_of("array(array(int, 5), 3)"), 60);
    assert!(table.warnings().is_empty());
}

#[test]
fn unknown_types_default_to_a_word_with_a_warning() {
    let mut table = SymbolTable::new();
    assert_eq!(table.size_of("boolean"), 4);
    assert_eq!(table.warnings().len(), 1);
    assert!(table.warnings()[0].contains("boolean"));
}

#[test]
fn malformed_array_rendering_warns() {
    let mut table = SymbolTable::new();
    assert_eq!(table.size_of("array(int, lots)"), 4);
    assert_eq!(table.warnings().len(), 1);
}

#[test]
fn parse_array_type_splits_at_depth_zero() {
    assert_eq!(parse_array_type("array(int, 10)"), Some(("int", "10")));
    assert_eq!(
        parse_array_type("array(array(int, 5), 3)"),
        Some(("array(int, 5)", "3"))
    );
    assert_eq!(parse_array_type("int"), None);
    assert_eq!(parse_array_type("array(int)"), None);
}

#[test]
fn global_scope_exists_at_level_zero() {
    let table = SymbolTable::new();
    assert_eq!(table.current_level(), 0);
}

#[test]
fn add_assigns_level_and_offset() {
    let mut table = SymbolTable::new();
    table.enter_scope();
    let a = table.add(entry("a", "int")).expect("add a");
    let b = table.add(entry("b", "float")).expect("add b");
    let c = table.add(entry("c", "int")).expect("add c");
    assert_eq!(a.scope_level, 1);
    assert_eq!(a.offset, Some(0));
    assert_eq!(b.offset, Some(4));
    assert_eq!(c.offset, Some(12));
    assert_eq!(a.mangled_name(), "a_scope1");
}

#[test]
fn arrays_consume_their_full_footprint() {
    let mut table = SymbolTable::new();
    table.enter_scope();
    let a = table.add(entry("a", "array(int, 10)")).expect("add a");
    let next = table.add(entry("next", "int")).expect("add next");
    assert_eq!(a.offset, Some(0));
    assert_eq!(next.offset, Some(40));
}

#[test]
fn zero_sized_entries_get_no_offset() {
    let mut table = SymbolTable::new();
    let entry = table
        .add(SymbolEntry::new("f", "void", SymbolKind::Function))
        .expect("add f");
    assert_eq!(entry.offset, None);
}

#[test]
fn redeclaration_in_the_same_scope_fails() {
    let mut table = SymbolTable::new();
    table.enter_scope();
    table.add(entry("x", "int")).expect("first x");
    assert_eq!(
        table.add(entry("x", "float")),
        Err(SymtabError::AlreadyDeclared("x".to_string()))
    );
}

#[test]
fn shadowing_across_scopes_resolves_innermost_first() {
    let mut table = SymbolTable::new();
    table.enter_scope();
    table.add(entry("x", "int")).expect("outer x");
    table.enter_scope();
    table.add(entry("x", "float")).expect("inner x");

    let hit = table.lookup("x").expect("inner lookup");
    assert_eq!(hit.type_string, "float");
    assert_eq!(hit.scope_level, 2);
    assert_eq!(hit.mangled_name(), "x_scope2");

    table.leave_scope();
    let hit = table.lookup("x").expect("outer lookup");
    assert_eq!(hit.type_string, "int");
    assert_eq!(hit.mangled_name(), "x_scope1");
}

#[test]
fn lookup_misses_return_none() {
    let table = SymbolTable::new();
    assert!(table.lookup("ghost").is_none());
}

#[test]
fn offsets_restart_per_scope() {
    let mut table = SymbolTable::new();
    table.enter_scope();
    table.add(entry("a", "int")).expect("a");
    table.enter_scope();
    let inner = table.add(entry("b", "int")).expect("b");
    assert_eq!(inner.offset, Some(0));
}

#[test]
fn leaving_the_global_scope_is_refused() {
    let mut table = SymbolTable::new();
    table.leave_scope();
    assert_eq!(table.current_level(), 0);
    assert_eq!(table.warnings().len(), 1);
}

#[test]
fn dump_lists_every_entry_ever_added() {
    let mut table = SymbolTable::new();
    table.enter_scope();
    table.add(entry("x", "int")).expect("x");
    table.enter_scope();
    table.add(entry("x", "array(int, 10)")).expect("shadow x");
    table.leave_scope();
    table.leave_scope();

    assert_eq!(table.all_entries().len(), 2);
    let dump = table.dump();
    assert!(dump.contains("Scope 1:"));
    assert!(dump.contains("Scope 2:"));
    assert!(dump.contains("Variable: x, Type: int"));
    assert!(dump.contains("Variable: x, Type: array(int, 10)"));
    assert!(dump.contains("Array Size: 10, Element Size: 4"));
}
