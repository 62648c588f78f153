//! Translation between the Messages protocol and the Gemini `generateContent`
//! API.
//!
//! Everything in this crate is synchronous and free of I/O. The interception
//! layer owns the network call and decides when to translate.

mod error;
pub mod protocol;
pub mod provider;
pub mod stream;

pub use error::TranslationError;
