pub mod symtab;

#[cfg(test)]
mod symtab_tests;

pub use symtab::{parse_array_type, SymbolEntry, SymbolKind, SymbolTable, SymtabError};
