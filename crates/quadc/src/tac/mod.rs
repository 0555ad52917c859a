pub mod address;
pub mod gen;
pub mod instruction;

#[cfg(test)]
mod gen_tests;

pub use address::{Address, Constant};
pub use gen::{SemanticError, TacGen};
pub use instruction::{render_listing, Instruction, OpCode};
