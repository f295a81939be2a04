//! Authentication & Authorization
//! Mission: JWT issuance, verification, revocation checks, and route policy

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod validator;

pub use jwt::TokenProvider;
pub use models::{Claims, Principal, Role};
