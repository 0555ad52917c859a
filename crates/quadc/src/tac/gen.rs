use std::fmt;

use crate::parser::ast::{
    BinOp, Block, Decl, Expr, LiteralValue, Loc, Program, ShortCircuitOp, Stmt, UnaryOp,
};
use crate::semantics::{parse_array_type, SymbolEntry, SymbolKind, SymbolTable};

use super::address::{Address, Constant};
use super::instruction::{Instruction, OpCode};

/// A collected lowering diagnostic. Lowering never aborts on these; the
/// offending expression is tagged `error_type` and emission continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub line: u32,
    pub col: u32,
    pub message: String,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "semantic error at {}:{}: {}", self.line, self.col, self.message)
    }
}

const ERROR_TYPE: &str = "error_type";

/// Syntax-directed TAC generator: one post-order walk of the AST, emitting
/// into an ordered instruction list. Owns the temp/label counters, the
/// break-label stack and the scoped symbol table.
pub struct TacGen {
    instructions: Vec<Instruction>,
    temp_count: u32,
    label_count: u32,
    break_labels: Vec<Address>,
    symtab: SymbolTable,
    errors: Vec<SemanticError>,
}

impl TacGen {
    pub fn new() -> TacGen {
        TacGen {
            instructions: Vec::new(),
            temp_count: 0,
            label_count: 0,
            break_labels: Vec::new(),
            symtab: SymbolTable::new(),
            errors: Vec::new(),
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn symtab(&self) -> &SymbolTable {
        &self.symtab
    }

    pub fn symtab_mut(&mut self) -> &mut SymbolTable {
        &mut self.symtab
    }

    fn new_temp(&mut self) -> Address {
        let temp = Address::Name(format!("t{}", self.temp_count));
        self.temp_count += 1;
        temp
    }

    fn new_label(&mut self, description: Option<&str>) -> Address {
        let label = Address::Label {
            name: format!("L{}", self.label_count),
            description: description.map(str::to_string),
        };
        self.label_count += 1;
        label
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn error(&mut self, line: u32, col: u32, message: impl Into<String>) {
        self.errors.push(SemanticError {
            line,
            col,
            message: message.into(),
        });
    }

    pub fn lower_program(&mut self, program: &Program) {
        self.lower_block(&program.block);
    }

    /// Blocks bracket their instructions with BEGIN_BLOCK/END_BLOCK and live
    /// in their own scope. Blocks produce no place.
    fn lower_block(&mut self, block: &Block) {
        self.emit(Instruction::BeginBlock { line: block.line });
        self.symtab.enter_scope();
        for decl in &block.decls {
            self.lower_decl(decl);
        }
        for stmt in &block.stmts {
            self.lower_stmt(stmt);
        }
        self.emit(Instruction::EndBlock { line: block.line });
        self.symtab.leave_scope();
    }

    fn lower_decl(&mut self, decl: &Decl) {
        let type_string = decl.ty.type_string();
        let entry = SymbolEntry::new(decl.name.clone(), type_string.clone(), SymbolKind::Variable);
        match self.symtab.add(entry) {
            Ok(_) => {
                self.emit(Instruction::DeclareSymbol {
                    name: decl.name.clone(),
                    type_string,
                    line: decl.line,
                });
            }
            Err(err) => {
                self.error(decl.line, decl.col, err.to_string());
            }
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let (value_place, _value_type) = self.lower_expr(value);
                let (target_place, _target_type) = self.lower_loc(target);
                if matches!(target, Loc::Index { .. }) {
                    // The loc's place is a computed element address.
                    self.emit(Instruction::Store {
                        addr: target_place,
                        value: value_place,
                    });
                } else {
                    self.emit(Instruction::Assign {
                        dst: target_place,
                        src: value_place,
                    });
                }
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                let (cond_place, _) = self.lower_expr(cond);
                match else_branch {
                    None => {
                        let end = self.new_label(Some("if end"));
                        self.emit(Instruction::IfFalse {
                            cond: cond_place,
                            target: end.clone(),
                        });
                        self.lower_stmt(then_branch);
                        self.emit(Instruction::Label { label: end });
                    }
                    Some(else_branch) => {
                        let else_label = self.new_label(Some("else branch"));
                        let end = self.new_label(Some("if-else end"));
                        self.emit(Instruction::IfFalse {
                            cond: cond_place,
                            target: else_label.clone(),
                        });
                        self.lower_stmt(then_branch);
                        self.emit(Instruction::Goto {
                            target: end.clone(),
                        });
                        self.emit(Instruction::Label { label: else_label });
                        self.lower_stmt(else_branch);
                        self.emit(Instruction::Label { label: end });
                    }
                }
            }
            Stmt::While { cond, body, .. } => {
                let cond_label = self.new_label(Some("while condition"));
                let exit_label = self.new_label(Some("while exit"));
                self.break_labels.push(exit_label.clone());
                self.emit(Instruction::Label {
                    label: cond_label.clone(),
                });
                let (cond_place, _) = self.lower_expr(cond);
                self.emit(Instruction::IfFalse {
                    cond: cond_place,
                    target: exit_label.clone(),
                });
                self.lower_stmt(body);
                self.emit(Instruction::Goto { target: cond_label });
                self.emit(Instruction::Label { label: exit_label });
                self.break_labels.pop();
            }
            Stmt::DoWhile { body, cond, .. } => {
                let start_label = self.new_label(Some("do-while body"));
                let exit_label = self.new_label(Some("do-while exit"));
                self.break_labels.push(exit_label.clone());
                self.emit(Instruction::Label {
                    label: start_label.clone(),
                });
                self.lower_stmt(body);
                let (cond_place, _) = self.lower_expr(cond);
                self.emit(Instruction::IfTrue {
                    cond: cond_place,
                    target: start_label,
                });
                self.emit(Instruction::Label { label: exit_label });
                self.break_labels.pop();
            }
            Stmt::Break { line, col } => match self.break_labels.last() {
                Some(target) => {
                    let target = target.clone();
                    self.emit(Instruction::Goto { target });
                }
                None => {
                    self.error(*line, *col, "break statement outside of any loop");
                    self.emit(Instruction::Comment {
                        text: "ERROR: break outside of any loop".to_string(),
                    });
                }
            },
            Stmt::Block(block) => self.lower_block(block),
        }
    }

    /// Lowers an expression, returning its place and type string.
    fn lower_expr(&mut self, expr: &Expr) -> (Address, String) {
        match expr {
            Expr::Literal { value, .. } => (
                Address::Constant(literal_constant(*value)),
                value.type_string().to_string(),
            ),
            Expr::Loc(loc) => self.lower_loc(loc),
            Expr::Paren { inner, .. } => self.lower_expr(inner),
            Expr::Unary {
                op,
                operand,
                line,
                col,
            } => self.lower_unary(*op, operand, *line, *col),
            Expr::Binary {
                op,
                lhs,
                rhs,
                line,
                col,
            } => self.lower_binary(*op, lhs, rhs, *line, *col),
            Expr::ShortCircuit { op, lhs, rhs, .. } => self.lower_short_circuit(*op, lhs, rhs),
        }
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Expr, line: u32, col: u32) -> (Address, String) {
        let (operand_place, operand_type) = self.lower_expr(operand);
        let result = self.new_temp();
        match op {
            UnaryOp::Neg => {
                self.emit(Instruction::Unary {
                    op: OpCode::Neg,
                    a: operand_place,
                    dst: result.clone(),
                });
                if operand_type == "int" || operand_type == "float" {
                    (result, operand_type)
                } else {
                    self.error(
                        line,
                        col,
                        format!("cannot negate a value of type `{operand_type}`"),
                    );
                    (result, ERROR_TYPE.to_string())
                }
            }
            UnaryOp::Not => {
                self.emit(Instruction::Unary {
                    op: OpCode::Not,
                    a: operand_place,
                    dst: result.clone(),
                });
                if operand_type == "bool" {
                    (result, "bool".to_string())
                } else {
                    self.error(
                        line,
                        col,
                        format!("cannot apply `!` to a value of type `{operand_type}`"),
                    );
                    (result, ERROR_TYPE.to_string())
                }
            }
        }
    }

    fn lower_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        line: u32,
        col: u32,
    ) -> (Address, String) {
        let (lhs_place, lhs_type) = self.lower_expr(lhs);
        let (rhs_place, rhs_type) = self.lower_expr(rhs);
        let result = self.new_temp();
        self.emit(Instruction::Binary {
            op: opcode_of(op),
            a: lhs_place,
            b: rhs_place,
            dst: result.clone(),
        });

        let result_type = if op.is_comparison() {
            "bool".to_string()
        } else {
            arithmetic_result_type(&lhs_type, &rhs_type).unwrap_or_else(|| {
                self.error(
                    line,
                    col,
                    format!("incompatible operand types `{lhs_type}` and `{rhs_type}` for `{}`", opcode_of(op)),
                );
                self.emit(Instruction::Comment {
                    text: format!(
                        "ERROR: incompatible operand types `{lhs_type}` and `{rhs_type}`"
                    ),
                });
                ERROR_TYPE.to_string()
            })
        };
        (result, result_type)
    }

    /// Short-circuit lowering via jumps around a result temporary: the right
    /// operand is only evaluated when the left does not already decide the
    /// outcome.
    fn lower_short_circuit(
        &mut self,
        op: ShortCircuitOp,
        lhs: &Expr,
        rhs: &Expr,
    ) -> (Address, String) {
        let (lhs_place, _) = self.lower_expr(lhs);
        let result = self.new_temp();
        let true_label = self.new_label(None);
        let false_label = self.new_label(None);
        let end_label = self.new_label(None);

        match op {
            ShortCircuitOp::And => {
                self.emit(Instruction::IfFalse {
                    cond: lhs_place,
                    target: false_label.clone(),
                });
                let (rhs_place, _) = self.lower_expr(rhs);
                self.emit(Instruction::IfFalse {
                    cond: rhs_place,
                    target: false_label.clone(),
                });
                self.emit(Instruction::Assign {
                    dst: result.clone(),
                    src: Address::Constant(Constant::Bool(true)),
                });
                self.emit(Instruction::Goto {
                    target: end_label.clone(),
                });
                self.emit(Instruction::Label { label: false_label });
                self.emit(Instruction::Assign {
                    dst: result.clone(),
                    src: Address::Constant(Constant::Bool(false)),
                });
            }
            ShortCircuitOp::Or => {
                self.emit(Instruction::IfTrue {
                    cond: lhs_place,
                    target: true_label.clone(),
                });
                let (rhs_place, _) = self.lower_expr(rhs);
                self.emit(Instruction::IfTrue {
                    cond: rhs_place,
                    target: true_label.clone(),
                });
                self.emit(Instruction::Assign {
                    dst: result.clone(),
                    src: Address::Constant(Constant::Bool(false)),
                });
                self.emit(Instruction::Goto {
                    target: end_label.clone(),
                });
                self.emit(Instruction::Label { label: true_label });
                self.emit(Instruction::Assign {
                    dst: result.clone(),
                    src: Address::Constant(Constant::Bool(true)),
                });
            }
        }
        self.emit(Instruction::Label { label: end_label });
        (result, "bool".to_string())
    }

    /// Lowers an l-value (also usable as an rvalue factor). Simple names
    /// resolve through the symbol table to their scope-mangled spelling;
    /// array accesses compute the element address into a temporary.
    fn lower_loc(&mut self, loc: &Loc) -> (Address, String) {
        match loc {
            Loc::Name { name, line, col } => match self.symtab.lookup(name) {
                Some(entry) => (Address::Name(entry.mangled_name()), entry.type_string.clone()),
                None => {
                    self.error(*line, *col, format!("undefined symbol `{name}`"));
                    (
                        Address::Name(format!("UNDEFINED_VAR_{name}")),
                        ERROR_TYPE.to_string(),
                    )
                }
            },
            Loc::Index {
                base,
                index,
                line,
                col,
            } => {
                let (base_place, base_type) = self.lower_loc(base);
                let (index_place, _index_type) = self.lower_expr(index);

                let Some((elem_type, _count)) = parse_array_type(&base_type) else {
                    self.error(
                        *line,
                        *col,
                        format!("subscripted value has non-array type `{base_type}`"),
                    );
                    return (
                        Address::Name("ERROR_ARRAY_ADDR".to_string()),
                        ERROR_TYPE.to_string(),
                    );
                };
                let elem_type = elem_type.to_string();
                let elem_size = self.symtab.size_of(&elem_type);

                let offset = self.new_temp();
                self.emit(Instruction::Binary {
                    op: OpCode::Mul,
                    a: index_place,
                    b: Address::Constant(Constant::Int(elem_size as i64)),
                    dst: offset.clone(),
                });
                let element_address = self.new_temp();
                self.emit(Instruction::Binary {
                    op: OpCode::Add,
                    a: base_place,
                    b: offset,
                    dst: element_address.clone(),
                });
                (element_address, elem_type)
            }
        }
    }
}

impl Default for TacGen {
    fn default() -> Self {
        TacGen::new()
    }
}

fn literal_constant(value: LiteralValue) -> Constant {
    match value {
        LiteralValue::Int(v) => Constant::Int(v),
        LiteralValue::Float(v) => Constant::Float(v),
        LiteralValue::Bool(v) => Constant::Bool(v),
    }
}

fn opcode_of(op: BinOp) -> OpCode {
    match op {
        BinOp::Add => OpCode::Add,
        BinOp::Sub => OpCode::Sub,
        BinOp::Mul => OpCode::Mul,
        BinOp::Div => OpCode::Div,
        BinOp::Eq => OpCode::Eq,
        BinOp::Ne => OpCode::Ne,
        BinOp::Lt => OpCode::Lt,
        BinOp::Le => OpCode::Le,
        BinOp::Gt => OpCode::Gt,
        BinOp::Ge => OpCode::Ge,
    }
}

/// Numeric promotion for arithmetic: float absorbs int, int stays int,
/// anything else has no arithmetic result.
fn arithmetic_result_type(lhs: &str, rhs: &str) -> Option<String> {
    match (lhs, rhs) {
        ("int", "int") => Some("int".to_string()),
        ("float", "float") | ("float", "int") | ("int", "float") => Some("float".to_string()),
        _ => None,
    }
}
