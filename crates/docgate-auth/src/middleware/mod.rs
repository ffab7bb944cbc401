//! HTTP middleware: session extractors and error responses.

mod error;
mod session;

pub use session::{AdminAuth, AuthState, SessionAuth, session_cookie_value};
