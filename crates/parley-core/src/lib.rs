//! Backend-agnostic building blocks of the **parley** chat SDK.
//!
//! * [`generic`] – `Message` / `Role`
//! * [`payload`] – the request shapes a backend accepts
//! * [`provider`] – the single trait a backend crate implements
//! * [`stream`] – the fragment adapter every turn goes through
//! * [`sink`], [`conversation`] – caller-side helpers for driving turns
//! * [`config`], [`error`]
pub mod config;
pub mod conversation;
pub mod error;
pub mod generic;
pub mod payload;
pub mod provider;
pub mod sink;
pub mod stream;

pub use error::{ParleyError, Result};
