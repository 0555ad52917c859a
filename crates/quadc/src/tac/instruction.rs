use std::fmt;

use super::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OpCode::Add => "+",
            OpCode::Sub | OpCode::Neg => "-",
            OpCode::Mul => "*",
            OpCode::Div => "/",
            OpCode::Mod => "%",
            OpCode::Not => "!",
            OpCode::Eq => "==",
            OpCode::Ne => "!=",
            OpCode::Lt => "<",
            OpCode::Le => "<=",
            OpCode::Gt => ">",
            OpCode::Ge => ">=",
        };
        f.write_str(text)
    }
}

/// One TAC instruction. Rendering is the canonical four-field quadruple
/// `(op, a, b, c)` with `_` in unused slots, except for labels, comments and
/// the block/declare markers, which have their own line forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Assign {
        dst: Address,
        src: Address,
    },
    Binary {
        op: OpCode,
        a: Address,
        b: Address,
        dst: Address,
    },
    Unary {
        op: OpCode,
        a: Address,
        dst: Address,
    },
    Store {
        addr: Address,
        value: Address,
    },
    Goto {
        target: Address,
    },
    IfTrue {
        cond: Address,
        target: Address,
    },
    IfFalse {
        cond: Address,
        target: Address,
    },
    Label {
        label: Address,
    },
    DeclareSymbol {
        name: String,
        type_string: String,
        line: u32,
    },
    BeginBlock {
        line: u32,
    },
    EndBlock {
        line: u32,
    },
    Comment {
        text: String,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dst, src } => write!(f, "(=, {src}, _, {dst})"),
            Instruction::Binary { op, a, b, dst } => write!(f, "({op}, {a}, {b}, {dst})"),
            Instruction::Unary { op, a, dst } => write!(f, "({op}, {a}, _, {dst})"),
            Instruction::Store { addr, value } => write!(f, "(store, {addr}, {value}, _)"),
            Instruction::Goto { target } => write!(f, "(goto, _, _, {target})"),
            Instruction::IfTrue { cond, target } => write!(f, "(iftrue, {cond}, _, {target})"),
            Instruction::IfFalse { cond, target } => write!(f, "(iffalse, {cond}, _, {target})"),
            Instruction::Label { label } => match label {
                Address::Label {
                    name,
                    description: Some(description),
                } => write!(f, "{name}:\t# {description}"),
                other => write!(f, "{other}:"),
            },
            Instruction::DeclareSymbol {
                name,
                type_string,
                line,
            } => write!(f, "DECLARE {name} : {type_string} (Line: {line})"),
            Instruction::BeginBlock { line } => write!(f, "BEGIN_BLOCK (Line: {line})"),
            Instruction::EndBlock { line } => write!(f, "END_BLOCK (Line: {line})"),
            Instruction::Comment { text } => write!(f, "# {text}"),
        }
    }
}

/// Renders a whole instruction sequence, one instruction per line.
pub fn render_listing(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}
