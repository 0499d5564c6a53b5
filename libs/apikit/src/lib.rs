//! HTTP toolkit shared by every PetCare module: RFC 9457 problem responses,
//! request-id plumbing, bearer-token verification with an axum extractor,
//! an audit middleware for mutating requests, a traced outbound client, and
//! the best-effort directory client used for display enrichment.

pub mod audit;
pub mod auth;
pub mod client;
pub mod directory;
pub mod problem;
pub mod request_id;

pub use auth::{Claims, Identity, JwtConfig, Role, TokenSigner, TokenVerifier};
pub use client::TracedClient;
pub use directory::{DirectoryClient, DirectoryConfig, DirectoryEntry};
pub use problem::{Problem, ProblemResponse};
pub use request_id::XRequestId;
