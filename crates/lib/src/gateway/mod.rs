//! Gateway: HTTP surface for the relay.
//!
//! One port serves the liveness route and the LINE webhook callback. Handlers
//! share read-only state (credentials and the echo dispatcher); nothing is
//! mutated across requests.

mod server;

pub use server::{router, run_gateway, run_relay, GatewayState, HEALTH_TEXT};
