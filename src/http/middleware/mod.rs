//! Guard middleware applied to protected routes.
//!
//! Order matters and is fixed by the router: rate limit (global)
//! → CSRF guard (mutating verbs) → session guard → handler. Every
//! rejection short-circuits; no handler code runs after a guard says
//! no.

pub mod csrf_guard;
pub mod session_guard;

pub use csrf_guard::csrf_guard;
pub use session_guard::{session_guard, AuthContext};
