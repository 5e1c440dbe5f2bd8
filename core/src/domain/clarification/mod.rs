pub mod entities;

pub use entities::PendingClarification;
