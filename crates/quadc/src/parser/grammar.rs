use std::fmt;

use quadc_util::make_type_idx;

make_type_idx!(pub ProductionId, Production);

/// Terminal symbols of the object language. `as usize` is the bitset slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terminal {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Assign,
    If,
    Else,
    While,
    Do,
    Break,
    OrOr,
    AndAnd,
    EqEq,
    Ne,
    Lt,
    Le,
    Ge,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Not,
    LParen,
    RParen,
    Id,
    Num,
    Real,
    True,
    False,
    Basic,
}

impl Terminal {
    pub const COUNT: usize = 32;

    pub const ALL: [Terminal; Terminal::COUNT] = [
        Terminal::LBrace,
        Terminal::RBrace,
        Terminal::LBracket,
        Terminal::RBracket,
        Terminal::Semi,
        Terminal::Assign,
        Terminal::If,
        Terminal::Else,
        Terminal::While,
        Terminal::Do,
        Terminal::Break,
        Terminal::OrOr,
        Terminal::AndAnd,
        Terminal::EqEq,
        Terminal::Ne,
        Terminal::Lt,
        Terminal::Le,
        Terminal::Ge,
        Terminal::Gt,
        Terminal::Plus,
        Terminal::Minus,
        Terminal::Star,
        Terminal::Slash,
        Terminal::Not,
        Terminal::LParen,
        Terminal::RParen,
        Terminal::Id,
        Terminal::Num,
        Terminal::Real,
        Terminal::True,
        Terminal::False,
        Terminal::Basic,
    ];

    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn text(self) -> &'static str {
        match self {
            Terminal::LBrace => "{",
            Terminal::RBrace => "}",
            Terminal::LBracket => "[",
            Terminal::RBracket => "]",
            Terminal::Semi => ";",
            Terminal::Assign => "=",
            Terminal::If => "if",
            Terminal::Else => "else",
            Terminal::While => "while",
            Terminal::Do => "do",
            Terminal::Break => "break",
            Terminal::OrOr => "||",
            Terminal::AndAnd => "&&",
            Terminal::EqEq => "==",
            Terminal::Ne => "!=",
            Terminal::Lt => "<",
            Terminal::Le => "<=",
            Terminal::Ge => ">=",
            Terminal::Gt => ">",
            Terminal::Plus => "+",
            Terminal::Minus => "-",
            Terminal::Star => "*",
            Terminal::Slash => "/",
            Terminal::Not => "!",
            Terminal::LParen => "(",
            Terminal::RParen => ")",
            Terminal::Id => "id",
            Terminal::Num => "num",
            Terminal::Real => "real",
            Terminal::True => "true",
            Terminal::False => "false",
            Terminal::Basic => "basic",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    AugmentedStart,
    Program,
    Block,
    Decls,
    Decl,
    Type,
    Stmts,
    Stmt,
    MatchedStmt,
    UnmatchedStmt,
    Loc,
    Bool,
    BoolTail,
    Join,
    Equality,
    Rel,
    Expr,
    Term,
    Unary,
    Factor,
}

impl NonTerminal {
    pub const COUNT: usize = 20;

    pub const ALL: [NonTerminal; NonTerminal::COUNT] = [
        NonTerminal::AugmentedStart,
        NonTerminal::Program,
        NonTerminal::Block,
        NonTerminal::Decls,
        NonTerminal::Decl,
        NonTerminal::Type,
        NonTerminal::Stmts,
        NonTerminal::Stmt,
        NonTerminal::MatchedStmt,
        NonTerminal::UnmatchedStmt,
        NonTerminal::Loc,
        NonTerminal::Bool,
        NonTerminal::BoolTail,
        NonTerminal::Join,
        NonTerminal::Equality,
        NonTerminal::Rel,
        NonTerminal::Expr,
        NonTerminal::Term,
        NonTerminal::Unary,
        NonTerminal::Factor,
    ];

    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            NonTerminal::AugmentedStart => "S'",
            NonTerminal::Program => "program",
            NonTerminal::Block => "block",
            NonTerminal::Decls => "decls",
            NonTerminal::Decl => "decl",
            NonTerminal::Type => "type",
            NonTerminal::Stmts => "stmts",
            NonTerminal::Stmt => "stmt",
            NonTerminal::MatchedStmt => "matched_stmt",
            NonTerminal::UnmatchedStmt => "unmatched_stmt",
            NonTerminal::Loc => "loc",
            NonTerminal::Bool => "bool",
            NonTerminal::BoolTail => "bool'",
            NonTerminal::Join => "join",
            NonTerminal::Equality => "equality",
            NonTerminal::Rel => "rel",
            NonTerminal::Expr => "expr",
            NonTerminal::Term => "term",
            NonTerminal::Unary => "unary",
            NonTerminal::Factor => "factor",
        }
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One grammar symbol. `Epsilon` may only appear as the sole right-hand-side
/// element of an ε-production; `Eof` never appears in a production at all,
/// it exists for transition maps and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
    Epsilon,
    Eof,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{t}"),
            Symbol::NonTerminal(nt) => write!(f, "{nt}"),
            Symbol::Epsilon => f.write_str("ε"),
            Symbol::Eof => f.write_str("$"),
        }
    }
}

/// A parse-time lookahead: a real terminal or end of input. ε is not
/// representable here, which keeps it out of ACTION columns by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lookahead {
    Terminal(Terminal),
    Eof,
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookahead::Terminal(t) => write!(f, "{t}"),
            Lookahead::Eof => f.write_str("$"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
    pub id: ProductionId,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty() || (self.rhs.len() == 1 && self.rhs[0] == Symbol::Epsilon)
    }

    /// Number of stack entries a reduction by this production pops.
    pub fn rhs_len(&self) -> usize {
        if self.is_epsilon() {
            0
        } else {
            self.rhs.len()
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

pub struct Grammar {
    productions: Vec<Production>,
    by_lhs: Vec<Vec<ProductionId>>,
}

impl Grammar {
    /// The block-structured object language, augmented with `S' -> program`
    /// at id 0. Ids are dense insertion indices.
    pub fn object_language() -> Grammar {
        use NonTerminal::*;
        use Terminal::*;

        fn t(term: Terminal) -> Symbol {
            Symbol::Terminal(term)
        }
        fn n(nt: NonTerminal) -> Symbol {
            Symbol::NonTerminal(nt)
        }

        let mut g = Grammar {
            productions: Vec::new(),
            by_lhs: vec![Vec::new(); NonTerminal::COUNT],
        };

        // 0: augmentation
        g.add(AugmentedStart, vec![n(Program)]);
        // 1
        g.add(Program, vec![n(Block)]);
        // 2
        g.add(Block, vec![t(LBrace), n(Decls), n(Stmts), t(RBrace)]);
        // 3-4
        g.add(Decls, vec![n(Decls), n(Decl)]);
        g.add(Decls, vec![Symbol::Epsilon]);
        // 5
        g.add(Decl, vec![n(Type), t(Id), t(Semi)]);
        // 6-7
        g.add(Type, vec![n(Type), t(LBracket), t(Num), t(RBracket)]);
        g.add(Type, vec![t(Basic)]);
        // 8-9
        g.add(Stmts, vec![n(Stmts), n(Stmt)]);
        g.add(Stmts, vec![Symbol::Epsilon]);
        // 10-11: the matched/unmatched split resolves the dangling else
        g.add(Stmt, vec![n(MatchedStmt)]);
        g.add(Stmt, vec![n(UnmatchedStmt)]);
        // 12-14
        g.add(
            UnmatchedStmt,
            vec![t(If), t(LParen), n(Bool), t(RParen), n(UnmatchedStmt)],
        );
        g.add(
            UnmatchedStmt,
            vec![t(If), t(LParen), n(Bool), t(RParen), n(MatchedStmt)],
        );
        g.add(
            UnmatchedStmt,
            vec![
                t(If),
                t(LParen),
                n(Bool),
                t(RParen),
                n(MatchedStmt),
                t(Else),
                n(UnmatchedStmt),
            ],
        );
        // 15-20
        g.add(MatchedStmt, vec![n(Loc), t(Assign), n(Bool), t(Semi)]);
        g.add(
            MatchedStmt,
            vec![
                t(If),
                t(LParen),
                n(Bool),
                t(RParen),
                n(MatchedStmt),
                t(Else),
                n(MatchedStmt),
            ],
        );
        g.add(
            MatchedStmt,
            vec![t(While), t(LParen), n(Bool), t(RParen), n(MatchedStmt)],
        );
        g.add(
            MatchedStmt,
            vec![
                t(Do),
                n(MatchedStmt),
                t(While),
                t(LParen),
                n(Bool),
                t(RParen),
                t(Semi),
            ],
        );
        g.add(MatchedStmt, vec![t(Break), t(Semi)]);
        g.add(MatchedStmt, vec![n(Block)]);
        // 21-22
        g.add(Loc, vec![n(Loc), t(LBracket), t(Num), t(RBracket)]);
        g.add(Loc, vec![t(Id)]);
        // 23-25: bool delegates to a left-recursive tail for the `||` chain
        g.add(Bool, vec![n(BoolTail)]);
        g.add(BoolTail, vec![n(BoolTail), t(OrOr), n(Join)]);
        g.add(BoolTail, vec![n(Join)]);
        // 26-27
        g.add(Join, vec![n(Join), t(AndAnd), n(Equality)]);
        g.add(Join, vec![n(Equality)]);
        // 28-30
        g.add(Equality, vec![n(Equality), t(EqEq), n(Rel)]);
        g.add(Equality, vec![n(Equality), t(Ne), n(Rel)]);
        g.add(Equality, vec![n(Rel)]);
        // 31-35
        g.add(Rel, vec![n(Expr), t(Lt), n(Expr)]);
        g.add(Rel, vec![n(Expr), t(Le), n(Expr)]);
        g.add(Rel, vec![n(Expr), t(Ge), n(Expr)]);
        g.add(Rel, vec![n(Expr), t(Gt), n(Expr)]);
        g.add(Rel, vec![n(Expr)]);
        // 36-38
        g.add(Expr, vec![n(Expr), t(Plus), n(Term)]);
        g.add(Expr, vec![n(Expr), t(Minus), n(Term)]);
        g.add(Expr, vec![n(Term)]);
        // 39-41
        g.add(Term, vec![n(Term), t(Star), n(Unary)]);
        g.add(Term, vec![n(Term), t(Slash), n(Unary)]);
        g.add(Term, vec![n(Unary)]);
        // 42-44
        g.add(Unary, vec![t(Not), n(Unary)]);
        g.add(Unary, vec![t(Minus), n(Unary)]);
        g.add(Unary, vec![n(Factor)]);
        // 45-50
        g.add(Factor, vec![t(LParen), n(Bool), t(RParen)]);
        g.add(Factor, vec![n(Loc)]);
        g.add(Factor, vec![t(Num)]);
        g.add(Factor, vec![t(Real)]);
        g.add(Factor, vec![t(True)]);
        g.add(Factor, vec![t(False)]);
        // 51: trailing array bound on a declaration (`int a[10];`)
        g.add(
            Decl,
            vec![n(Type), t(Id), t(LBracket), t(Num), t(RBracket), t(Semi)],
        );

        g
    }

    fn add(&mut self, lhs: NonTerminal, rhs: Vec<Symbol>) {
        let id = ProductionId::new(self.productions.len() as u32);
        self.productions.push(Production { lhs, rhs, id });
        self.by_lhs[lhs.slot()].push(id);
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id]
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn productions_of(&self, lhs: NonTerminal) -> &[ProductionId] {
        &self.by_lhs[lhs.slot()]
    }

    pub fn augmentation(&self) -> &Production {
        &self.productions[0]
    }

    /// Every symbol a state can transition on: terminals then non-terminals,
    /// ε excluded.
    pub fn transition_symbols() -> impl Iterator<Item = Symbol> {
        Terminal::ALL
            .iter()
            .map(|&t| Symbol::Terminal(t))
            .chain(NonTerminal::ALL.iter().map(|&nt| Symbol::NonTerminal(nt)))
    }
}
