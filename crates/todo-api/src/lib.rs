pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod router;

pub use error::*;
pub use handlers::*;
pub use request::*;
pub use response::*;
pub use router::*;
