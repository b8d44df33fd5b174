//! Pipeline stages for icon conversion.
//!
//! Each submodule implements exactly one transformation step, so every
//! stage is testable on its own and the rasterizer can be swapped out (tests
//! inject failing ones) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ render ──▶ postprocess ──▶ encode
//! (dir)    (resvg)    (resample,      (PNG files,
//!                      sharpen)        favicon.ico)
//! ```
//!
//! 1. [`scan`]: create the directories and list the sources
//! 2. [`render`]: rasterise one source at one size; CPU-bound, run on
//!    blocking threads by [`crate::convert`]
//! 3. [`postprocess`]: exact-size resample and small-icon sharpening
//! 4. [`encode`]: PNG and ICO encoding with atomic writes

pub mod encode;
pub mod postprocess;
pub mod render;
pub mod scan;
