pub mod contribution;
pub mod data;
pub mod errors;

pub use contribution::*;
pub use data::*; // Re-export common data types
pub use errors::*;
