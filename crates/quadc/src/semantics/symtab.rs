use std::collections::HashMap;
use std::fmt::Write as _;

use thiserror::Error;

use crate::tac::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Constant,
    TypeDef,
}

impl SymbolKind {
    fn label(self) -> &'static str {
        match self {
            SymbolKind::Variable => "Variable",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::Function => "Function",
            SymbolKind::Constant => "Constant",
            SymbolKind::TypeDef => "TypeDef",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub name: String,
    pub type_string: String,
    pub kind: SymbolKind,
    pub scope_level: u32,
    pub offset: Option<u32>,
    pub address: Address,
}

impl SymbolEntry {
    pub fn new(name: impl Into<String>, type_string: impl Into<String>, kind: SymbolKind) -> SymbolEntry {
        let name = name.into();
        let address = Address::Name(name.clone());
        SymbolEntry {
            name,
            type_string: type_string.into(),
            kind,
            scope_level: 0,
            offset: None,
            address,
        }
    }

    /// The flat TAC spelling of this symbol: `x_scope1`. Shadowed variables
    /// stay distinct because the scope level is baked into the name.
    pub fn mangled_name(&self) -> String {
        format!("{}_scope{}", self.name, self.scope_level)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymtabError {
    #[error("symbol `{0}` already declared in the current scope")]
    AlreadyDeclared(String),
}

struct Scope {
    symbols: HashMap<String, SymbolEntry>,
    next_offset: u32,
}

impl Scope {
    fn new() -> Scope {
        Scope {
            symbols: HashMap::new(),
            next_offset: 0,
        }
    }
}

/// Stack-of-scopes symbol table with per-scope byte-offset allocation. The
/// global scope (level 0) is pushed at construction. Every entry ever added
/// is also recorded in an append-only log for the diagnostic dump.
pub struct SymbolTable {
    scopes: Vec<Scope>,
    log: Vec<SymbolEntry>,
    warnings: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            scopes: vec![Scope::new()],
            log: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn current_level(&self) -> u32 {
        (self.scopes.len() - 1) as u32
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn leave_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        } else {
            self.warnings
                .push("attempted to leave the global scope".to_string());
        }
    }

    /// Adds an entry to the innermost scope. The entry's scope level is set
    /// here, and a byte offset is assigned when its type occupies storage.
    /// Redeclaring a name within one scope fails; shadowing an outer scope
    /// does not.
    pub fn add(&mut self, mut entry: SymbolEntry) -> Result<SymbolEntry, SymtabError> {
        entry.scope_level = self.current_level();

        let size = self.size_of(&entry.type_string.clone());
        let scope = self
            .scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("the global scope is never popped"));
        if scope.symbols.contains_key(&entry.name) {
            return Err(SymtabError::AlreadyDeclared(entry.name));
        }
        if size > 0 {
            entry.offset = Some(scope.next_offset);
            scope.next_offset += size;
        }

        scope.symbols.insert(entry.name.clone(), entry.clone());
        self.log.push(entry.clone());
        Ok(entry)
    }

    /// Innermost-to-outermost lookup; the first hit wins.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    /// Byte size of a rendered type string. Unknown types fall back to a
    /// machine word with a recorded warning.
    pub fn size_of(&mut self, type_string: &str) -> u32 {
        let type_string = type_string.trim();
        if type_string.is_empty() || type_string.eq_ignore_ascii_case("void") {
            return 0;
        }
        match type_string {
            "int" | "bool" => 4,
            "float" => 8,
            _ if type_string.starts_with("array(") => {
                match parse_array_type(type_string) {
                    Some((elem, count_text)) => match count_text.trim().parse::<u32>() {
                        Ok(count) => {
                            let elem = elem.to_string();
                            count * self.size_of(&elem)
                        }
                        Err(_) => {
                            self.warnings.push(format!(
                                "cannot compute size of array type `{type_string}`"
                            ));
                            4
                        }
                    },
                    None => {
                        self.warnings.push(format!(
                            "cannot compute size of array type `{type_string}`"
                        ));
                        4
                    }
                }
            }
            other => {
                self.warnings
                    .push(format!("unknown type `{other}`, assuming 4 bytes"));
                4
            }
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn all_entries(&self) -> &[SymbolEntry] {
        &self.log
    }

    /// Every entry ever added, grouped by scope level in insertion order.
    pub fn dump(&mut self) -> String {
        let mut out = String::new();
        if self.log.is_empty() {
            out.push_str("symbol table: no symbols were recorded\n");
            return out;
        }

        let mut levels: Vec<u32> = self.log.iter().map(|e| e.scope_level).collect();
        levels.sort_unstable();
        levels.dedup();

        out.push_str("--- symbol table ---\n");
        let entries = self.log.clone();
        for level in levels {
            let _ = writeln!(out, "Scope {level}:");
            for entry in entries.iter().filter(|e| e.scope_level == level) {
                let _ = write!(out, "  {}: {}, Type: {}", entry.kind.label(), entry.name, entry.type_string);
                if let Some(offset) = entry.offset {
                    let _ = write!(out, ", Offset: {offset:#x}");
                }
                out.push('\n');
                if entry.type_string.starts_with("array(") {
                    if let Some((elem, count)) = parse_array_type(&entry.type_string) {
                        let elem = elem.to_string();
                        let elem_size = self.size_of(&elem);
                        let _ = writeln!(
                            out,
                            "    Array Size: {}, Element Size: {elem_size}",
                            count.trim()
                        );
                    }
                }
            }
        }
        out.push_str("--------------------\n");
        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

/// Splits `array(ELEM, COUNT)` into its element type and count at paren
/// depth 0, so nested element types like `array(array(int, 5), 3)` parse
/// correctly. Returns `None` when the string is not an array rendering.
pub fn parse_array_type(type_string: &str) -> Option<(&str, &str)> {
    let inner = type_string
        .strip_prefix("array(")?
        .strip_suffix(')')?;
    let mut depth = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                return Some((inner[..i].trim(), inner[i + 1..].trim()));
            }
            _ => {}
        }
    }
    None
}
