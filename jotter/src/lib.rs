//! The Jotter notes library.
//!
//! Shared types used by the server and the admin tool: note slugs and
//! their derivation from titles, usernames, and field validation.

#![deny(
    asm_sub_register,
    deprecated,
    missing_abi,
    unsafe_code,
    unused_macros,
    unused_must_use,
    unused_unsafe
)]
#![deny(clippy::from_str_radix_10, clippy::let_underscore_future)]

pub mod error;
pub mod note;
pub mod slug;
pub mod user;

pub use error::{JotterError, JotterResult};
