pub mod analyze;
pub mod mortgage;
