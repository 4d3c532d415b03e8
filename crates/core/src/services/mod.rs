pub mod backends;
pub mod resolution;
