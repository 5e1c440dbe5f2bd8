pub mod clarification;
pub mod common;
pub mod feed;
pub mod feedback;
pub mod interaction;
pub mod meal;
pub mod render;
pub mod session;
pub mod share;
