//! Mock email/code authentication.
//!
//! The server side is [`CodeService`], an in-memory store of one pending
//! code per email exposed over HTTP by [`crate::routes::auth`]. The client
//! side is [`LoginFlow`], which validates input, checks the email against a
//! [`UserDirectory`], requests and verifies codes through a
//! [`CodeChallenge`], and logs the session in.

mod challenge;
mod codes;
mod countdown;
mod directory;
mod error;
mod flow;

pub use challenge::{CodeChallenge, CodeDelivery, HttpCodeChallenge};
pub use codes::{CodeService, generate_code};
pub use countdown::{Countdown, RESEND_COOLDOWN_SECS};
pub use directory::{StaticDirectory, UserDirectory};
pub use error::AuthError;
pub use flow::{LoginFlow, LoginStep};
