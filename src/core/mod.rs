pub mod bound;
pub mod row;
pub mod temp;

pub use bound::*;
pub use row::*;
pub use temp::*;
