pub mod dump;
pub mod unittest;
pub mod validate;
