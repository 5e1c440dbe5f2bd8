pub mod bindings;
pub mod entities;

pub use bindings::{ActionBinding, ActionTable};
pub use entities::*;
