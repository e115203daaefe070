//! # scene-driver
//!
//! Client-side orchestration for a remote, path-addressed scene store that is
//! only reachable through GET / PUT / PATCH / DELETE.
//!
//! It covers two jobs the store cannot do for itself:
//!
//! * **Construction.** [`planner`] expands pile and fence parameters into a
//!   [`BuildPlan`]; [`BuildOrchestrator`] writes it in one batch or object by
//!   object with cooperative cancellation, then fits the floor, keeps the cursor
//!   valid and deletes surplus objects from a previous build.
//! * **Motion control.** [`MotionControl`] moves, stops, reads and sets a single
//!   value through its own animation slot; [`ControlPanel`] keeps each control's
//!   hover and input affordances mutually exclusive; [`CursorTarget`] wraps
//!   cursor selection around the objects and the floor.
//!
//! The store is abstracted by [`SceneStore`]; [`HttpStore`] talks to a live
//! server and [`MemoryStore`] keeps everything in process.

pub mod activation;
pub mod animation;
pub mod cancel;
pub mod config;
pub mod control;
pub mod cursor;
pub mod error;
pub mod http;
pub mod memory;
pub mod orchestrator;
pub mod path;
pub mod plan;
pub mod planner;
pub mod store;
pub mod turtle;

pub use activation::*;
pub use animation::*;
pub use cancel::*;
pub use config::*;
pub use control::*;
pub use cursor::*;
pub use error::*;
pub use http::*;
pub use memory::*;
pub use orchestrator::*;
pub use path::*;
pub use plan::*;
pub use planner::*;
pub use store::*;
pub use turtle::*;
