//! WebAssembly bindings.
//!
//! JavaScript-callable wrapper around a [`Machine`](crate::Machine), built
//! with the `wasm` feature.

#[cfg(feature = "wasm")]
pub mod api;

#[cfg(feature = "wasm")]
pub use api::Emulator6502;
