//! Table-driven LR(1) shift/reduce driver. Reductions build the AST; ACTION
//! misses go through panic-mode recovery.

pub mod ast;
pub mod classifier;
pub mod first;
pub mod generator;
pub mod grammar;
pub mod items;
pub mod tables;

#[cfg(test)]
mod grammar_tests;

use std::collections::VecDeque;
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::lexer::Token;

use ast::{BinOp, Block, Decl, Expr, LiteralValue, Loc, Program, ShortCircuitOp, Stmt, TypeSpec};
use classifier::{classify, TokenClass};
use generator::LrGenerator;
use grammar::{Grammar, Lookahead, NonTerminal, Production, Terminal};
use items::StateId;
use tables::{Action, ParseTable, TableError};

/// A recoverable syntax error, reported and then recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: u32,
    pub col: u32,
    pub lexeme: String,
    pub message: String,
}

impl SyntaxError {
    fn new(token: &Token, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: token.line,
            col: token.col,
            lexeme: token.lexeme.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syntax error at {}:{} near `{}`: {}",
            self.line, self.col, self.lexeme, self.message
        )
    }
}

/// Fatal driver failures. Everything here either means the input could not
/// be recovered at all or that an internal invariant broke.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unrecoverable syntax error at {line}:{col} near `{lexeme}`")]
    Unrecoverable { line: u32, col: u32, lexeme: String },
    #[error("invalid token at end of input ({line}:{col})")]
    InvalidTokenAtEof { line: u32, col: u32 },
    #[error("parse stacks underflowed while reducing `{production}`")]
    StackUnderflow { production: String },
    #[error("no goto entry for state {state} on `{nonterminal}`")]
    MissingGoto {
        state: StateId,
        nonterminal: NonTerminal,
    },
    #[error("semantic stack holds the wrong kind of value ({context})")]
    MalformedStack { context: String },
    #[error("invalid integer literal `{lexeme}`")]
    BadIntLiteral {
        lexeme: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid float literal `{lexeme}`")]
    BadFloatLiteral {
        lexeme: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("invalid array bound `{lexeme}`")]
    BadArrayBound {
        lexeme: String,
        #[source]
        source: ParseIntError,
    },
}

/// What the semantic stack holds between reductions: a shifted token or an
/// AST fragment tagged by the non-terminal family that produced it.
#[derive(Debug, Clone)]
enum StackEntry {
    Token(Token),
    Node(Fragment),
}

#[derive(Debug, Clone)]
enum Fragment {
    Program(Program),
    Block(Block),
    Decls(Vec<Decl>),
    Decl(Decl),
    Type(TypeSpec),
    Stmts(Vec<Stmt>),
    Stmt(Stmt),
    Loc(Loc),
    Expr(Expr),
}

impl Fragment {
    fn kind_name(&self) -> &'static str {
        match self {
            Fragment::Program(_) => "program",
            Fragment::Block(_) => "block",
            Fragment::Decls(_) => "decls",
            Fragment::Decl(_) => "decl",
            Fragment::Type(_) => "type",
            Fragment::Stmts(_) => "stmts",
            Fragment::Stmt(_) => "stmt",
            Fragment::Loc(_) => "loc",
            Fragment::Expr(_) => "expr",
        }
    }

    fn position(&self) -> Option<(u32, u32)> {
        match self {
            Fragment::Program(p) => Some((p.line, p.col)),
            Fragment::Block(b) => Some((b.line, b.col)),
            Fragment::Decls(list) => list.first().map(|d| (d.line, d.col)),
            Fragment::Decl(d) => Some((d.line, d.col)),
            Fragment::Type(t) => Some(t.position()),
            Fragment::Stmts(list) => list.first().map(Stmt::position),
            Fragment::Stmt(s) => Some(s.position()),
            Fragment::Loc(l) => Some(l.position()),
            Fragment::Expr(e) => Some(e.position()),
        }
    }
}

pub struct Parser {
    grammar: Grammar,
    table: ParseTable,
    trace: bool,
    syntax_errors: Vec<SyntaxError>,
}

impl Parser {
    pub fn new(grammar: Grammar, table: ParseTable) -> Parser {
        Parser {
            grammar,
            table,
            trace: false,
            syntax_errors: Vec::new(),
        }
    }

    /// Generates tables for the built-in grammar and wraps them in a parser.
    pub fn for_object_language() -> Result<Parser, TableError> {
        let generator = LrGenerator::new(Grammar::object_language());
        let table = generator.build_table()?;
        Ok(Parser::new(generator.into_grammar(), table))
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.syntax_errors
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn parse(&mut self, tokens: &[Token]) -> Result<Program, DriverError> {
        self.syntax_errors.clear();
        let eof_fallback = Token::eof(tokens.last().map(|t| t.line).unwrap_or(1), 0);

        let mut states: Vec<StateId> = vec![StateId::new(0)];
        let mut symbols: Vec<StackEntry> = Vec::new();
        let mut cursor = 0usize;
        let mut step = 1u32;

        loop {
            let state = match states.last() {
                Some(&state) => state,
                None => {
                    return Err(DriverError::StackUnderflow {
                        production: "<empty state stack>".into(),
                    })
                }
            };
            let token = tokens.get(cursor).unwrap_or(&eof_fallback);

            let lookahead = match classify(token) {
                TokenClass::Terminal(t) => Lookahead::Terminal(t),
                TokenClass::Eof => Lookahead::Eof,
                TokenClass::Error => {
                    self.syntax_errors
                        .push(SyntaxError::new(token, "token has no terminal mapping"));
                    if cursor + 1 < tokens.len() {
                        cursor += 1;
                        continue;
                    }
                    return Err(DriverError::InvalidTokenAtEof {
                        line: token.line,
                        col: token.col,
                    });
                }
            };

            let Some(action) = self.table.action(state, lookahead) else {
                self.syntax_errors.push(SyntaxError::new(
                    token,
                    format!("no action in state {state} on `{lookahead}`"),
                ));
                if !self.recover(&mut cursor, tokens, state) {
                    return Err(DriverError::Unrecoverable {
                        line: token.line,
                        col: token.col,
                        lexeme: token.lexeme.clone(),
                    });
                }
                continue;
            };

            if self.trace {
                self.print_step(step, &states, &symbols, token, action);
                step += 1;
            }

            match action {
                Action::Shift(next) => {
                    states.push(next);
                    symbols.push(StackEntry::Token(token.clone()));
                    cursor += 1;
                }
                Action::Reduce(pid) => {
                    let production = self.grammar.production(pid);
                    let count = production.rhs_len();
                    if states.len() <= count || symbols.len() < count {
                        return Err(DriverError::StackUnderflow {
                            production: production.to_string(),
                        });
                    }
                    let rhs: VecDeque<StackEntry> =
                        symbols.split_off(symbols.len() - count).into();
                    states.truncate(states.len() - count);

                    let fragment = build_fragment(production, rhs, (token.line, token.col))?;

                    let top = match states.last() {
                        Some(&top) => top,
                        None => {
                            return Err(DriverError::StackUnderflow {
                                production: production.to_string(),
                            })
                        }
                    };
                    let next = self.table.goto(top, production.lhs).ok_or(
                        DriverError::MissingGoto {
                            state: top,
                            nonterminal: production.lhs,
                        },
                    )?;
                    states.push(next);
                    symbols.push(StackEntry::Node(fragment));
                }
                Action::Accept => {
                    return match symbols.pop() {
                        Some(StackEntry::Node(Fragment::Program(program)))
                            if symbols.is_empty() =>
                        {
                            Ok(program)
                        }
                        _ => Err(DriverError::MalformedStack {
                            context: "accept expects a lone program node".into(),
                        }),
                    };
                }
            }
        }
    }

    /// Panic mode: advance past the offending token until either the current
    /// state has an action for the upcoming terminal or a synchronisation
    /// point (`;` or `}`) is reached. End of input means no recovery.
    fn recover(&mut self, cursor: &mut usize, tokens: &[Token], state: StateId) -> bool {
        while *cursor + 1 < tokens.len() {
            *cursor += 1;
            let next = &tokens[*cursor];
            let lookahead = match classify(next) {
                TokenClass::Error => continue,
                TokenClass::Eof => break,
                TokenClass::Terminal(t) => Lookahead::Terminal(t),
            };
            if self.table.action(state, lookahead).is_some() {
                if self.trace {
                    println!("recovery: resuming at `{}`", next.lexeme);
                }
                return true;
            }
            if matches!(
                lookahead,
                Lookahead::Terminal(Terminal::Semi) | Lookahead::Terminal(Terminal::RBrace)
            ) {
                if self.trace {
                    println!("recovery: skipped to sync token `{}`", next.lexeme);
                }
                return true;
            }
        }
        false
    }

    fn print_step(
        &self,
        step: u32,
        states: &[StateId],
        symbols: &[StackEntry],
        token: &Token,
        action: Action,
    ) {
        let state_line = states
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let symbol_line = symbols
            .iter()
            .map(|entry| match entry {
                StackEntry::Token(t) => t.lexeme.clone(),
                StackEntry::Node(f) => f.kind_name().to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        let action_line = match action {
            Action::Shift(next) => format!("shift {next}"),
            Action::Reduce(pid) => {
                format!("reduce {} ({})", pid, self.grammar.production(pid))
            }
            Action::Accept => "accept".to_string(),
        };
        println!("step {step}");
        println!("  states : {state_line}");
        println!("  symbols: {symbol_line}");
        println!("  input  : `{}` at {}:{}", token.lexeme, token.line, token.col);
        println!("  action : {action_line}");
    }
}

fn rhs_position(rhs: &VecDeque<StackEntry>) -> Option<(u32, u32)> {
    rhs.iter().find_map(|entry| match entry {
        StackEntry::Token(t) => Some((t.line, t.col)),
        StackEntry::Node(f) => f.position(),
    })
}

fn malformed(context: &str) -> DriverError {
    DriverError::MalformedStack {
        context: context.to_string(),
    }
}

fn take_token(rhs: &mut VecDeque<StackEntry>, what: &str) -> Result<Token, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Token(t)) => Ok(t),
        _ => Err(malformed(what)),
    }
}

fn take_expr(rhs: &mut VecDeque<StackEntry>) -> Result<Expr, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Expr(e))) => Ok(e),
        _ => Err(malformed("expected expression fragment")),
    }
}

fn take_loc(rhs: &mut VecDeque<StackEntry>) -> Result<Loc, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Loc(l))) => Ok(l),
        _ => Err(malformed("expected loc fragment")),
    }
}

fn take_stmt(rhs: &mut VecDeque<StackEntry>) -> Result<Stmt, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Stmt(s))) => Ok(s),
        _ => Err(malformed("expected statement fragment")),
    }
}

fn take_block(rhs: &mut VecDeque<StackEntry>) -> Result<Block, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Block(b))) => Ok(b),
        _ => Err(malformed("expected block fragment")),
    }
}

fn take_decls(rhs: &mut VecDeque<StackEntry>) -> Result<Vec<Decl>, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Decls(d))) => Ok(d),
        _ => Err(malformed("expected declaration list fragment")),
    }
}

fn take_decl(rhs: &mut VecDeque<StackEntry>) -> Result<Decl, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Decl(d))) => Ok(d),
        _ => Err(malformed("expected declaration fragment")),
    }
}

fn take_stmts(rhs: &mut VecDeque<StackEntry>) -> Result<Vec<Stmt>, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Stmts(s))) => Ok(s),
        _ => Err(malformed("expected statement list fragment")),
    }
}

fn take_type(rhs: &mut VecDeque<StackEntry>) -> Result<TypeSpec, DriverError> {
    match rhs.pop_front() {
        Some(StackEntry::Node(Fragment::Type(t))) => Ok(t),
        _ => Err(malformed("expected type fragment")),
    }
}

fn parse_bound(token: &Token) -> Result<u64, DriverError> {
    token
        .lexeme
        .parse::<u64>()
        .map_err(|source| DriverError::BadArrayBound {
            lexeme: token.lexeme.clone(),
            source,
        })
}

fn int_literal(token: &Token) -> Result<Expr, DriverError> {
    let value = token
        .lexeme
        .parse::<i64>()
        .map_err(|source| DriverError::BadIntLiteral {
            lexeme: token.lexeme.clone(),
            source,
        })?;
    Ok(Expr::Literal {
        value: LiteralValue::Int(value),
        line: token.line,
        col: token.col,
    })
}

fn binary(
    rhs: &mut VecDeque<StackEntry>,
    op: BinOp,
    line: u32,
    col: u32,
) -> Result<Fragment, DriverError> {
    let lhs = take_expr(rhs)?;
    take_token(rhs, "expected operator token")?;
    let right = take_expr(rhs)?;
    Ok(Fragment::Expr(Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(right),
        line,
        col,
    }))
}

fn short_circuit(
    rhs: &mut VecDeque<StackEntry>,
    op: ShortCircuitOp,
    line: u32,
    col: u32,
) -> Result<Fragment, DriverError> {
    let lhs = take_expr(rhs)?;
    take_token(rhs, "expected operator token")?;
    let right = take_expr(rhs)?;
    Ok(Fragment::Expr(Expr::ShortCircuit {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(right),
        line,
        col,
    }))
}

fn if_stmt(
    rhs: &mut VecDeque<StackEntry>,
    with_else: bool,
    line: u32,
    col: u32,
) -> Result<Fragment, DriverError> {
    take_token(rhs, "expected `if`")?;
    take_token(rhs, "expected `(`")?;
    let cond = take_expr(rhs)?;
    take_token(rhs, "expected `)`")?;
    let then_branch = take_stmt(rhs)?;
    let else_branch = if with_else {
        take_token(rhs, "expected `else`")?;
        Some(Box::new(take_stmt(rhs)?))
    } else {
        None
    };
    Ok(Fragment::Stmt(Stmt::If {
        cond,
        then_branch: Box::new(then_branch),
        else_branch,
        line,
        col,
    }))
}

/// One builder per production, dispatched on the production id. Pass-through
/// productions return the popped child fragment unchanged.
fn build_fragment(
    production: &Production,
    mut rhs: VecDeque<StackEntry>,
    fallback: (u32, u32),
) -> Result<Fragment, DriverError> {
    let (line, col) = rhs_position(&rhs).unwrap_or(fallback);

    match production.id.index() {
        // S' -> program (only ever reduced implicitly via Accept)
        0 => match rhs.pop_front() {
            Some(StackEntry::Node(fragment)) => Ok(fragment),
            _ => Err(malformed("augmentation expects a node")),
        },
        // program -> block
        1 => {
            let block = take_block(&mut rhs)?;
            Ok(Fragment::Program(Program { block, line, col }))
        }
        // block -> { decls stmts }
        2 => {
            take_token(&mut rhs, "expected `{`")?;
            let decls = take_decls(&mut rhs)?;
            let stmts = take_stmts(&mut rhs)?;
            Ok(Fragment::Block(Block {
                decls,
                stmts,
                line,
                col,
            }))
        }
        // decls -> decls decl | ε
        3 => {
            let mut decls = take_decls(&mut rhs)?;
            decls.push(take_decl(&mut rhs)?);
            Ok(Fragment::Decls(decls))
        }
        4 => Ok(Fragment::Decls(Vec::new())),
        // decl -> type id ;
        5 => {
            let ty = take_type(&mut rhs)?;
            let name = take_token(&mut rhs, "expected identifier")?;
            Ok(Fragment::Decl(Decl {
                ty,
                name: name.lexeme,
                line,
                col,
            }))
        }
        // type -> type [ num ] | basic
        6 => {
            let elem = take_type(&mut rhs)?;
            take_token(&mut rhs, "expected `[`")?;
            let bound = take_token(&mut rhs, "expected array bound")?;
            let size = parse_bound(&bound)?;
            Ok(Fragment::Type(TypeSpec::Array {
                elem: Box::new(elem),
                size,
                line,
                col,
            }))
        }
        7 => {
            let basic = take_token(&mut rhs, "expected basic type")?;
            Ok(Fragment::Type(TypeSpec::Basic {
                name: basic.lexeme,
                line,
                col,
            }))
        }
        // stmts -> stmts stmt | ε
        8 => {
            let mut stmts = take_stmts(&mut rhs)?;
            stmts.push(take_stmt(&mut rhs)?);
            Ok(Fragment::Stmts(stmts))
        }
        9 => Ok(Fragment::Stmts(Vec::new())),
        // stmt -> matched | unmatched
        10 | 11 => Ok(Fragment::Stmt(take_stmt(&mut rhs)?)),
        // if without else (both nesting flavours)
        12 | 13 => if_stmt(&mut rhs, false, line, col),
        // if with else
        14 | 16 => if_stmt(&mut rhs, true, line, col),
        // matched -> loc = bool ;
        15 => {
            let target = take_loc(&mut rhs)?;
            take_token(&mut rhs, "expected `=`")?;
            let value = take_expr(&mut rhs)?;
            Ok(Fragment::Stmt(Stmt::Assign {
                target,
                value,
                line,
                col,
            }))
        }
        // matched -> while ( bool ) matched
        17 => {
            take_token(&mut rhs, "expected `while`")?;
            take_token(&mut rhs, "expected `(`")?;
            let cond = take_expr(&mut rhs)?;
            take_token(&mut rhs, "expected `)`")?;
            let body = take_stmt(&mut rhs)?;
            Ok(Fragment::Stmt(Stmt::While {
                cond,
                body: Box::new(body),
                line,
                col,
            }))
        }
        // matched -> do matched while ( bool ) ;
        18 => {
            take_token(&mut rhs, "expected `do`")?;
            let body = take_stmt(&mut rhs)?;
            take_token(&mut rhs, "expected `while`")?;
            take_token(&mut rhs, "expected `(`")?;
            let cond = take_expr(&mut rhs)?;
            Ok(Fragment::Stmt(Stmt::DoWhile {
                body: Box::new(body),
                cond,
                line,
                col,
            }))
        }
        // matched -> break ;
        19 => Ok(Fragment::Stmt(Stmt::Break { line, col })),
        // matched -> block
        20 => Ok(Fragment::Stmt(Stmt::Block(take_block(&mut rhs)?))),
        // loc -> loc [ num ]
        21 => {
            let base = take_loc(&mut rhs)?;
            take_token(&mut rhs, "expected `[`")?;
            let index_token = take_token(&mut rhs, "expected subscript")?;
            let index = int_literal(&index_token)?;
            Ok(Fragment::Loc(Loc::Index {
                base: Box::new(base),
                index: Box::new(index),
                line,
                col,
            }))
        }
        // loc -> id
        22 => {
            let name = take_token(&mut rhs, "expected identifier")?;
            Ok(Fragment::Loc(Loc::Name {
                name: name.lexeme,
                line,
                col,
            }))
        }
        // single-child expression pass-throughs
        23 | 25 | 27 | 30 | 35 | 38 | 41 | 44 => Ok(Fragment::Expr(take_expr(&mut rhs)?)),
        // bool' -> bool' || join, join -> join && equality
        24 => short_circuit(&mut rhs, ShortCircuitOp::Or, line, col),
        26 => short_circuit(&mut rhs, ShortCircuitOp::And, line, col),
        // comparisons and arithmetic
        28 => binary(&mut rhs, BinOp::Eq, line, col),
        29 => binary(&mut rhs, BinOp::Ne, line, col),
        31 => binary(&mut rhs, BinOp::Lt, line, col),
        32 => binary(&mut rhs, BinOp::Le, line, col),
        33 => binary(&mut rhs, BinOp::Ge, line, col),
        34 => binary(&mut rhs, BinOp::Gt, line, col),
        36 => binary(&mut rhs, BinOp::Add, line, col),
        37 => binary(&mut rhs, BinOp::Sub, line, col),
        39 => binary(&mut rhs, BinOp::Mul, line, col),
        40 => binary(&mut rhs, BinOp::Div, line, col),
        // unary -> ! unary | - unary
        42 | 43 => {
            let op_token = take_token(&mut rhs, "expected unary operator")?;
            let op = if production.id.index() == 42 {
                ast::UnaryOp::Not
            } else {
                ast::UnaryOp::Neg
            };
            let operand = take_expr(&mut rhs)?;
            Ok(Fragment::Expr(Expr::Unary {
                op,
                operand: Box::new(operand),
                line: op_token.line,
                col: op_token.col,
            }))
        }
        // factor -> ( bool )
        45 => {
            take_token(&mut rhs, "expected `(`")?;
            let inner = take_expr(&mut rhs)?;
            Ok(Fragment::Expr(Expr::Paren {
                inner: Box::new(inner),
                line,
                col,
            }))
        }
        // factor -> loc (loc used as rvalue)
        46 => Ok(Fragment::Expr(Expr::Loc(take_loc(&mut rhs)?))),
        // literals
        47 => {
            let token = take_token(&mut rhs, "expected integer literal")?;
            Ok(Fragment::Expr(int_literal(&token)?))
        }
        48 => {
            let token = take_token(&mut rhs, "expected float literal")?;
            let value =
                token
                    .lexeme
                    .parse::<f64>()
                    .map_err(|source| DriverError::BadFloatLiteral {
                        lexeme: token.lexeme.clone(),
                        source,
                    })?;
            Ok(Fragment::Expr(Expr::Literal {
                value: LiteralValue::Float(value),
                line: token.line,
                col: token.col,
            }))
        }
        49 | 50 => {
            let token = take_token(&mut rhs, "expected boolean literal")?;
            Ok(Fragment::Expr(Expr::Literal {
                value: LiteralValue::Bool(production.id.index() == 49),
                line: token.line,
                col: token.col,
            }))
        }
        // decl -> type id [ num ] ;
        51 => {
            let ty = take_type(&mut rhs)?;
            let name = take_token(&mut rhs, "expected identifier")?;
            take_token(&mut rhs, "expected `[`")?;
            let bound = take_token(&mut rhs, "expected array bound")?;
            let size = parse_bound(&bound)?;
            let (ty_line, ty_col) = ty.position();
            Ok(Fragment::Decl(Decl {
                ty: TypeSpec::Array {
                    elem: Box::new(ty),
                    size,
                    line: ty_line,
                    col: ty_col,
                },
                name: name.lexeme,
                line,
                col,
            }))
        }
        other => Err(DriverError::MalformedStack {
            context: format!("no builder for production {other}"),
        }),
    }
}
