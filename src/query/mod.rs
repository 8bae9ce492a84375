pub mod plan;
pub mod range_join;

pub use plan::*;
pub use range_join::*;
