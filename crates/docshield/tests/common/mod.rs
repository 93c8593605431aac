//! Shared test utilities for docshield integration tests.
//!
//! - `FakeGateway`: scripted in-memory `ApiGateway` that counts calls
//! - Builders for backend response bodies
//! - `spawn_server`: a local axum server for exercising `HttpGateway`

pub mod builders;
pub mod gateway;
pub mod server;

#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use gateway::FakeGateway;
#[allow(unused_imports)]
pub use server::spawn_server;
