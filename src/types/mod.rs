pub mod error;
pub mod models;

pub use error::{CsbError, GatewayError};
pub use models::{AuthContext, EchoParameter, EchoResponse, ErrorBody};
