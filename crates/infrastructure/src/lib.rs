pub mod dynamodb;
pub mod errors;
pub mod memory;
pub mod models;
pub mod repositories;

pub use dynamodb::*;
pub use errors::*;
pub use memory::*;
pub use models::*;
pub use repositories::*;
