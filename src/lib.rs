// Library exports for the CLI and integration tests
pub mod app_state;
pub mod auth;
pub mod client;
pub mod config;
pub mod decode;
pub mod handlers;
pub mod request;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use app_state::AppState;
pub use auth::{Credentials, CredentialsStore, SignedHeaders, canonicalize, sign, sign_at};
pub use client::{CsbClient, CsbResponse};
pub use config::RequestConfig;
pub use decode::{Decoded, ResponseFormat};
pub use request::{CsbRequest, Method};
pub use types::{CsbError, EchoParameter, EchoResponse};

// Re-export gateway creation function
pub use server::create_app;
