pub mod decode;
pub mod resolvers;

pub use decode::*;
pub use resolvers::*;
