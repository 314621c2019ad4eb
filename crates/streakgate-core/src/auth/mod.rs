//! Password and biometric login for a single local account
//!
//! Every login goes through [`LoginGuard`]:
//!
//! - Failures are counted per sanitized identity
//! - Reaching the attempt limit opens a fixed lockout window
//! - A successful login resets the counter, scores the login and writes the
//!   session marker

mod attempts;
mod guard;
mod lockout;
mod session;

pub use attempts::AttemptTracker;
pub use guard::LoginGuard;
pub use lockout::{Lockout, LockoutPolicy, LOCKOUT_DURATION, MAX_ATTEMPTS};
pub use session::{Session, SessionMarker};
