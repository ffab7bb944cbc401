//! # docgate-server
//!
//! HTTP server for the docgate document portal. Wires the access control
//! core (`docgate-auth`) to axum endpoints: link signing, verified document
//! downloads with watermarking, session login/logout, and the administrative
//! revocation interface.

pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;
pub mod state;
pub mod watermark;

pub use config::AppConfig;
pub use server::{build_app, build_router, run};
pub use state::AppState;
pub use watermark::{PassthroughWatermarker, Watermarker, provenance_marker};
