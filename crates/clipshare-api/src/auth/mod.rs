pub mod middleware;
pub mod models;
pub mod policy;
pub mod verifier;

pub use middleware::{auth_middleware, AuthState};
pub use models::{PrincipalContext, VerifiedProfile};
pub use policy::AccessPolicy;
pub use verifier::{AccessTokenVerifier, IdTokenVerifier, TokenVerifier, VerifierChain};
