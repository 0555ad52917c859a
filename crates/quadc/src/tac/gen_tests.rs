use super::address::Address;
use super::gen::TacGen;
use super::instruction::Instruction;
use crate::parser::ast::*;

fn program(decls: Vec<Decl>, stmts: Vec<Stmt>) -> Program {
    Program {
        block: Block {
            decls,
            stmts,
            line: 1,
            col: 1,
        },
        line: 1,
        col: 1,
    }
}

fn int_decl(name: &str) -> Decl {
    Decl {
        ty: TypeSpec::Basic {
            name: "int".to_string(),
            line: 1,
            col: 1,
        },
        name: name.to_string(),
        line: 1,
        col: 1,
    }
}

fn int_lit(value: i64) -> Expr {
    Expr::Literal {
        value: LiteralValue::Int(value),
        line: 1,
        col: 1,
    }
}

fn name_loc(name: &str) -> Loc {
    Loc::Name {
        name: name.to_string(),
        line: 1,
        col: 1,
    }
}

fn lower(program: &Program) -> TacGen {
    let mut gen = TacGen::new();
    gen.lower_program(program);
    gen
}

#[test]
fn empty_block_emits_only_the_brackets() {
    let gen = lower(&program(vec![], vec![]));
    assert_eq!(
        gen.instructions(),
        &[
            Instruction::BeginBlock { line: 1 },
            Instruction::EndBlock { line: 1 },
        ]
    );
    assert!(gen.errors().is_empty());
}

#[test]
fn literals_emit_nothing() {
    let gen = lower(&program(
        vec![int_decl("x")],
        vec![Stmt::Assign {
            target: name_loc("x"),
            value: int_lit(7),
            line: 1,
            col: 1,
        }],
    ));
    // begin, declare, copy, end: the literal itself adds no instruction.
    assert_eq!(gen.instructions().len(), 4);
    assert_eq!(
        gen.instructions()[2],
        Instruction::Assign {
            dst: Address::name("x_scope1"),
            src: Address::Constant(super::Constant::Int(7)),
        }
    );
}

#[test]
fn undefined_symbols_get_a_placeholder_and_a_diagnostic() {
    let gen = lower(&program(
        vec![],
        vec![Stmt::Assign {
            target: name_loc("ghost"),
            value: int_lit(1),
            line: 3,
            col: 7,
        }],
    ));
    assert_eq!(gen.errors().len(), 1);
    assert_eq!((gen.errors()[0].line, gen.errors()[0].col), (3, 7));
    assert!(gen
        .instructions()
        .iter()
        .any(|i| matches!(i, Instruction::Assign { dst, .. } if *dst == Address::name("UNDEFINED_VAR_ghost"))));
}

#[test]
fn duplicate_declarations_report_and_continue() {
    let gen = lower(&program(vec![int_decl("x"), int_decl("x")], vec![]));
    assert_eq!(gen.errors().len(), 1);
    let declares = gen
        .instructions()
        .iter()
        .filter(|i| matches!(i, Instruction::DeclareSymbol { .. }))
        .count();
    assert_eq!(declares, 1);
}

#[test]
fn break_outside_a_loop_is_reported_not_fatal() {
    let gen = lower(&program(
        vec![],
        vec![Stmt::Break { line: 2, col: 3 }],
    ));
    assert_eq!(gen.errors().len(), 1);
    assert!(gen.errors()[0].message.contains("break"));
    assert!(gen
        .instructions()
        .iter()
        .any(|i| matches!(i, Instruction::Comment { text } if text.starts_with("ERROR:"))));
    // No goto was emitted for the dangling break.
    assert!(!gen
        .instructions()
        .iter()
        .any(|i| matches!(i, Instruction::Goto { .. })));
}

#[test]
fn an_inner_break_targets_the_innermost_loop_exit() {
    // while (i) { while (i) { break; } }
    let inner = Stmt::While {
        cond: Expr::Loc(name_loc("i")),
        body: Box::new(Stmt::Block(Block {
            decls: vec![],
            stmts: vec![Stmt::Break { line: 1, col: 1 }],
            line: 1,
            col: 1,
        })),
        line: 1,
        col: 1,
    };
    let gen = lower(&program(
        vec![int_decl("i")],
        vec![Stmt::While {
            cond: Expr::Loc(name_loc("i")),
            body: Box::new(Stmt::Block(Block {
                decls: vec![],
                stmts: vec![inner],
                line: 1,
                col: 1,
            })),
            line: 1,
            col: 1,
        }],
    ));
    assert!(gen.errors().is_empty());

    // Outer loop labels are L0/L1, inner loop labels are L2/L3; the break
    // must jump to L3, the inner exit.
    let break_target = gen
        .instructions()
        .iter()
        .find_map(|i| match i {
            Instruction::Goto { target } if target.label_name() == Some("L3") => Some(target),
            _ => None,
        });
    assert!(break_target.is_some(), "break should target the inner exit label");
}

#[test]
fn negating_a_boolean_is_a_type_error() {
    let gen = lower(&program(
        vec![int_decl("x")],
        vec![Stmt::Assign {
            target: name_loc("x"),
            value: Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(Expr::Literal {
                    value: LiteralValue::Bool(true),
                    line: 1,
                    col: 1,
                }),
                line: 1,
                col: 9,
            },
            line: 1,
            col: 1,
        }],
    ));
    assert_eq!(gen.errors().len(), 1);
    assert!(gen.errors()[0].message.contains("negate"));
}

#[test]
fn logical_not_requires_bool() {
    let gen = lower(&program(
        vec![int_decl("x")],
        vec![Stmt::Assign {
            target: name_loc("x"),
            value: Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(int_lit(3)),
                line: 1,
                col: 9,
            },
            line: 1,
            col: 1,
        }],
    ));
    assert_eq!(gen.errors().len(), 1);
    assert!(gen.errors()[0].message.contains("!"));
}

#[test]
fn incompatible_arithmetic_operands_are_reported_with_a_comment() {
    let gen = lower(&program(
        vec![int_decl("x")],
        vec![Stmt::Assign {
            target: name_loc("x"),
            value: Expr::Binary {
                op: BinOp::Add,
                lhs: Box::new(int_lit(1)),
                rhs: Box::new(Expr::Literal {
                    value: LiteralValue::Bool(true),
                    line: 1,
                    col: 1,
                }),
                line: 1,
                col: 5,
            },
            line: 1,
            col: 1,
        }],
    ));
    assert_eq!(gen.errors().len(), 1);
    assert!(gen
        .instructions()
        .iter()
        .any(|i| matches!(i, Instruction::Comment { text } if text.contains("incompatible"))));
}

#[test]
fn elseless_if_uses_one_label_and_one_iffalse() {
    let gen = lower(&program(
        vec![int_decl("x")],
        vec![Stmt::If {
            cond: Expr::Loc(name_loc("x")),
            then_branch: Box::new(Stmt::Assign {
                target: name_loc("x"),
                value: int_lit(1),
                line: 1,
                col: 1,
            }),
            else_branch: None,
            line: 1,
            col: 1,
        }],
    ));
    let labels = gen
        .instructions()
        .iter()
        .filter(|i| matches!(i, Instruction::Label { .. }))
        .count();
    let iffalses = gen
        .instructions()
        .iter()
        .filter(|i| matches!(i, Instruction::IfFalse { .. }))
        .count();
    assert_eq!((labels, iffalses), (1, 1));
}

#[test]
fn parenthesised_expressions_adopt_the_inner_place() {
    let gen = lower(&program(
        vec![int_decl("x")],
        vec![Stmt::Assign {
            target: name_loc("x"),
            value: Expr::Paren {
                inner: Box::new(int_lit(9)),
                line: 1,
                col: 1,
            },
            line: 1,
            col: 1,
        }],
    ));
    assert_eq!(
        gen.instructions()[2],
        Instruction::Assign {
            dst: Address::name("x_scope1"),
            src: Address::Constant(super::Constant::Int(9)),
        }
    );
}

#[test]
fn temporaries_count_up_from_zero() {
    // x = (1 + 2) * 3 allocates t0 for the sum, then t1 for the product.
    let gen = lower(&program(
        vec![int_decl("x")],
        vec![Stmt::Assign {
            target: name_loc("x"),
            value: Expr::Binary {
                op: BinOp::Mul,
                lhs: Box::new(Expr::Paren {
                    inner: Box::new(Expr::Binary {
                        op: BinOp::Add,
                        lhs: Box::new(int_lit(1)),
                        rhs: Box::new(int_lit(2)),
                        line: 1,
                        col: 1,
                    }),
                    line: 1,
                    col: 1,
                }),
                rhs: Box::new(int_lit(3)),
                line: 1,
                col: 1,
            },
            line: 1,
            col: 1,
        }],
    ));
    let destinations: Vec<String> = gen
        .instructions()
        .iter()
        .filter_map(|i| match i {
            Instruction::Binary { dst, .. } => Some(dst.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(destinations, vec!["t0", "t1"]);
}
