//! # easel
//!
//! A retained-mode widget engine that paints into a single 2D canvas surface.
//!
//! easel keeps a tree of widgets, turns raw platform input into pointer, key
//! and wheel events, routes them through hit testing and pointer grabs, keeps
//! a per-widget interaction state, and repaints on a coalesced frame schedule.
//! Drawing goes through the [`Surface`](render::Surface) trait, so the same
//! tree can target a browser canvas, a software rasterizer or a test
//! recorder.
//!
//! ## Core Systems
//!
//! - **[`tree`]**: Slotmap-backed widget arena with parent/child/target links
//! - **[`widget`]**: State machine, hit testing, dispatch, scroll bar and scroll view
//! - **[`window`]**: Window click detection and grab, the window manager
//! - **[`event`]**: Raw input, crossterm conversion, the events manager
//! - **[`render`]**: Surface contract, images, redraw scheduler, paint pipeline, async driver
//! - **[`text`]**: Word wrap and justification over a measurement trait
//! - **[`theme`]**: Style records keyed by theme key and state
//! - **[`app`]**: Application struct tying everything together
//! - **[`testing`]**: Pilot, recording surface and manual frames for headless tests
//! - **[`geometry`]**: Point, Size, Rect primitives

// Foundation
pub mod error;
pub mod geometry;

// Widget system
pub mod tree;
pub mod widget;
pub mod window;

// Input
pub mod event;

// Rendering
pub mod render;
pub mod text;
pub mod theme;

// Application
pub mod app;
pub mod testing;

pub use error::{CallbackError, Error, Result};
