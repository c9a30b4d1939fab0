pub mod distribution;
pub mod registration;
