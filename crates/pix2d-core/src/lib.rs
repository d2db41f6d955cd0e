#![no_std]
//! Platform-agnostic asynchronous 2D pixel-processing engine.
//!
//! A high-level call (alpha-blend a tile into a region, fill a rect,
//! blit) is resolved to one or more work rectangles by [`geometry`],
//! turned into sub-tasks drawn from [`pool`], ordered by [`fifo`], routed
//! to a hardware backend or a [`kernel`] fallback by [`dispatch`], and
//! finally reported back through [`op`]'s completion bookkeeping. The
//! [`facade`] module ties these together into the entry points an
//! application actually calls.
//!
//! The engine never allocates on the hot path: sub-task storage is a
//! fixed-capacity pool sized by the integrator (`Engine<B, N>`'s `N`).

pub mod config;
pub mod dispatch;
pub mod facade;
pub mod fifo;
pub mod geometry;
pub mod kernel;
pub mod op;
pub mod pool;
pub mod status;

pub use config::RuntimeConfig;
pub use dispatch::Preference;
pub use facade::Engine;
pub use geometry::{Location, Region, Tile};
pub use op::OperationCore;
pub use status::StatusCode;
