//! The Dockyard Library.
//!
//! Types shared between the director and anything that triggers or
//! reports on its maintenance passes.

#![deny(
    asm_sub_register,
    deprecated,
    missing_abi,
    unsafe_code,
    unused_macros,
    unused_must_use,
    unused_unsafe
)]
#![deny(clippy::from_over_into, clippy::needless_question_mark)]
#![cfg_attr(
    not(debug_assertions),
    deny(unused_imports, unused_mut, unused_variables,)
)]

pub mod api;
pub mod artifact;
pub mod error;
pub mod version;

pub use error::{DockyardError, DockyardResult};
