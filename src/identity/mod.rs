//! Caller identity for the directory: credential issue/verify, resolution of
//! claims to an admin or mentor, the moderation gate and the per-request
//! access controller built from them.
//! Keep the public surface thin and split implementation across sub-modules.

mod authorizer;
pub mod gate;
mod principal;
mod provider;
mod resolver;
mod token;

pub use authorizer::AccessController;
pub use principal::{Principal, RequiredKind, MENTOR_ROLE};
pub use provider::{LoginError, LoginRequest, LoginResponse, LoginService, ProviderVerifier, TrustedSubject};
pub use resolver::IdentityResolver;
pub use token::{Claims, TokenError, TokenService};
