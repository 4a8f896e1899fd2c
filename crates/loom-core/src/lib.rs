//! # Operations, layout and routing
//!
//! Loom is immediate-mode: every frame the application walks its widgets and
//! records what they draw and which input they want into an [`Ops`] buffer.
//! Nothing survives the frame except the application's own widget state.
//!
//! ```rust,ignore
//! use loom_core::*;
//!
//! let mut ops = Ops::new();
//! let mut router = Router::new();
//! let mut button = Click::new();
//!
//! loop {
//!     ops.reset();
//!     let mut gtx = Context::new(&mut ops, &mut router, Config::default(), size);
//!     for e in button.events(gtx.queue) {
//!         log::info!("{:?}", e.kind);
//!     }
//!     let area = StackOp::push(gtx.ops);
//!     AreaOp::rect(Rect::new(0.0, 0.0, 100.0, 40.0)).add(gtx.ops);
//!     button.add(gtx.ops);
//!     area.pop(gtx.ops);
//!
//!     router.frame(&ops)?;
//!     let scene = Scene::from_ops(&ops)?;
//!     // present `scene`, feed input into `router.add(..)`
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`ops`]: the byte-encoded operation buffer, macros and the reader.
//! - [`paint`], [`pointer`], [`key`]: typed operations.
//! - [`stack`]: transform/clip/area tracking while replaying a buffer.
//! - [`scene`]: flattens a buffer into device-space drawing primitives.
//! - [`layout`]: constraints, dimensions and the stock containers.
//! - [`router`]: hit testing, pointer capture and keyboard focus.
//! - [`gesture`]: click and scroll detectors on top of routed events.
//!
//! Frames are single-threaded. The buffer itself is `Send` so a finished
//! frame can be handed to a presenting thread.

pub mod color;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod key;
pub mod layout;
pub mod ops;
pub mod paint;
pub mod pointer;
pub mod prelude;
pub mod router;
pub mod scene;
pub mod stack;
pub mod tag;
pub mod unit;


pub use prelude::*;
