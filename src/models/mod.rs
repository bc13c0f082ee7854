pub mod machine;
pub mod prediction;

pub use machine::*;
pub use prediction::*;
