pub mod ports;

pub use ports::UserPrompt;
