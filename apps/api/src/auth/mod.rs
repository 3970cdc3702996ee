//! Account verification and session issuance.
//!
//! `verification` holds the pure state-machine checks, `store` the guarded
//! persistence, `code`/`password`/`session` the supporting primitives, and
//! `handlers` the HTTP surface.

pub mod code;
pub mod handlers;
pub mod password;
pub mod session;
pub mod store;
pub mod verification;
