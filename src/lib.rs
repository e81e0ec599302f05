//! # Brand Assets
//!
//! Turns arbitrary source images into two fixed brand assets for a website:
//!
//! | Asset | Size | Budget |
//! |-------|------|--------|
//! | `logo.png` | 1000x1000 | none |
//! | `social-share.png` | 1280x640 | strictly under 1,000,000 bytes |
//!
//! Each asset is produced by the same flow: read the source's pixel size, take
//! the largest centered region with the target's aspect ratio, crop it into a
//! scratch workspace, convert and resize it to the exact target as PNG, then
//! check the result. Nothing is ever padded or stretched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Stage machine for one asset run, error taxonomy, run report |
//! | [`imaging`] | Backend trait, crop geometry, `sips` and pure-Rust backends |
//! | [`target`] | The fixed size and byte contracts per asset kind |
//! | [`validate`] | Post-condition check of a finished output |
//! | [`workspace`] | Scratch directories that clean up on every exit path |
//! | [`config`] | Layered `brand-assets.toml` loading and validation |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Backend Behind a Trait
//!
//! Pixel work goes through [`imaging::ImageBackend`]. The default backend
//! shells out to macOS `sips`; [`imaging::RustBackend`] does the same four
//! operations with the `image` crate for machines without it. Pipeline tests
//! use a recording mock, so the stage ordering and cleanup rules are checked
//! without any image tool installed.
//!
//! ## Fixed Contracts
//!
//! Target sizes are constants, not config. The config file only controls how
//! the work is done (which backend, where scratch files go, whether a failed
//! output is kept).
//!
//! ## One Attempt, No Retry
//!
//! A run either produces a validated asset or reports exactly one error. An
//! oversize social image is not recompressed; the caller supplies a simpler
//! source instead.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod target;
pub mod validate;
pub mod workspace;
