pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::SessionClaims;
pub use codec::TokenCodec;
pub use codec::SEPARATOR;
pub use errors::AuthError;
pub use errors::IssueError;
