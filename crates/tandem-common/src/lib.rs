//! Types shared by the tandem relay crates: error taxonomy, connection ids,
//! roles and session codes.

pub mod errors;
pub mod id;
pub mod types;

pub use errors::{ConfigError, ProtocolError, TandemError};
pub use id::ConnectionId;
pub use types::{Role, SessionCode};

pub type Result<T> = std::result::Result<T, TandemError>;
