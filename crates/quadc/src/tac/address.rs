use std::fmt;

/// A literal operand value. Floats render through `Display`, so `2.5` stays
/// `2.5` and whole values drop the fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Float(v) => write!(f, "{v}"),
            Constant::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// A TAC operand: a named location (variable or temporary), a constant, or a
/// jump label. Label descriptions surface only where the label is defined,
/// never at use sites.
#[derive(Debug, Clone, PartialEq)]
pub enum Address {
    Name(String),
    Constant(Constant),
    Label {
        name: String,
        description: Option<String>,
    },
}

impl Address {
    pub fn name(text: impl Into<String>) -> Address {
        Address::Name(text.into())
    }

    pub fn label_name(&self) -> Option<&str> {
        match self {
            Address::Label { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Name(name) => f.write_str(name),
            Address::Constant(value) => write!(f, "{value}"),
            Address::Label { name, .. } => f.write_str(name),
        }
    }
}
