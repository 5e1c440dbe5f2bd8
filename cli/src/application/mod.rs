pub mod commands;
pub mod document;
pub mod repl;
pub mod share;
pub mod terminal;
