mod canonical;
mod credentials;
mod middleware;
mod signature;

pub use canonical::canonicalize;
pub use credentials::{ACCESS_KEY_ENV, Credentials, CredentialsStore, SECRET_KEY_ENV};
pub use middleware::auth_middleware;
pub use signature::{
    ACCESS_KEY_FIELD, API_NAME_FIELD, API_VERSION_FIELD, SDK_VERSION, SECRET_KEY_FIELD,
    SIGNATURE_FIELD, SignatureClaims, SignedHeaders, TIMESTAMP_FIELD, compute_signature, sign,
    sign_at, validate_timestamp, verify_signature,
};
