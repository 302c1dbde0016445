pub mod errors;
pub mod todo;

pub use errors::*;
pub use todo::*;
