//! External collaborators of the token store.
//!
//! - `transport`: form submission to the token endpoint (reqwest by default)
//! - `oauth2`: the refresh-token grant and its response decoding
//! - `env`: fallback credential / scope lookup

pub mod env;
pub mod oauth2;
pub mod transport;

pub use env::{EnvSource, ProcessEnv, StaticEnv};
pub use oauth2::{RefreshGrant, TokenGrant};
pub use transport::{FormResponse, FormTransport, ReqwestTransport};
