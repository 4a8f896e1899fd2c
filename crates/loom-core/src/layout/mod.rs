//! # Layout
//!
//! Layout is a single top-down pass. A parent hands a child [`Constraints`],
//! the child writes its operations into the shared [`Ops`] buffer and reports
//! [`Dimensions`]; the parent then decides where it goes. Containers that
//! must measure before positioning record the child into a macro and replay
//! it at the final offset.
//!
//! Widgets are plain closures:
//!
//! ```rust,ignore
//! let dims = Inset::uniform(dp(8.0)).layout(gtx, |gtx| {
//!     Flex::row().layout(gtx, vec![
//!         FlexChild::rigid(|gtx| label.layout(gtx)),
//!         FlexChild::flexed(1.0, |gtx| editor.layout(gtx)),
//!     ])
//! });
//! ```
//!
//! Sizes a child reports outside its constraints are clamped by
//! [`Context::layout`] rather than rejected.

mod flex;
mod inset;
mod list;
mod stack;

pub use flex::{Flex, FlexChild, Spacing};
pub use inset::Inset;
pub use list::{List, Position};
pub use stack::{Stack, StackChild};

use web_time::Instant;

use crate::geometry::{Point, Vec2};
use crate::input::{Event, Queue};
use crate::ops::{MacroOp, Ops, StackOp, TransformOp};
use crate::tag::Tag;
use crate::unit::{Config, Value};

/// Stand-in for an unbounded maximum.
pub const INFINITE: i32 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub min: i32,
    pub max: i32,
}

impl Constraint {
    pub fn exact(v: i32) -> Self {
        Constraint { min: v, max: v }
    }

    pub fn constrain(&self, v: i32) -> i32 {
        v.max(self.min).min(self.max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraints {
    pub width: Constraint,
    pub height: Constraint,
}

impl Constraints {
    pub fn exact(size: Point) -> Self {
        Constraints {
            width: Constraint::exact(size.x),
            height: Constraint::exact(size.y),
        }
    }

    /// Zero minimum, `size` maximum.
    pub fn loose(size: Point) -> Self {
        Constraints {
            width: Constraint { min: 0, max: size.x },
            height: Constraint { min: 0, max: size.y },
        }
    }

    pub fn constrain(&self, size: Point) -> Point {
        Point::new(self.width.constrain(size.x), self.height.constrain(size.y))
    }

    pub fn min(&self) -> Point {
        Point::new(self.width.min, self.height.min)
    }

    pub fn max(&self) -> Point {
        Point::new(self.width.max, self.height.max)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub size: Point,
    /// Distance from the top edge to the text baseline.
    pub baseline: i32,
}

impl Dimensions {
    pub fn new(size: Point) -> Self {
        Dimensions {
            size,
            baseline: size.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn main(self, p: Point) -> i32 {
        match self {
            Axis::Horizontal => p.x,
            Axis::Vertical => p.y,
        }
    }

    pub fn cross(self, p: Point) -> i32 {
        match self {
            Axis::Horizontal => p.y,
            Axis::Vertical => p.x,
        }
    }

    /// Builds a point from main and cross components.
    pub fn point(self, main: i32, cross: i32) -> Point {
        match self {
            Axis::Horizontal => Point::new(main, cross),
            Axis::Vertical => Point::new(cross, main),
        }
    }

    pub fn main_constraint(self, cs: &Constraints) -> Constraint {
        match self {
            Axis::Horizontal => cs.width,
            Axis::Vertical => cs.height,
        }
    }

    pub fn cross_constraint(self, cs: &Constraints) -> Constraint {
        match self {
            Axis::Horizontal => cs.height,
            Axis::Vertical => cs.width,
        }
    }

    pub fn constraints(self, main: Constraint, cross: Constraint) -> Constraints {
        match self {
            Axis::Horizontal => Constraints {
                width: main,
                height: cross,
            },
            Axis::Vertical => Constraints {
                width: cross,
                height: main,
            },
        }
    }
}

/// Cross-axis alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Start,
    End,
    Middle,
    Baseline,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    NW,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    Center,
}

impl Direction {
    /// Offset of a `child` sized box inside `container`.
    pub fn position(self, child: Point, container: Point) -> Point {
        let free = container - child;
        let x = match self {
            Direction::NW | Direction::W | Direction::SW => 0,
            Direction::N | Direction::Center | Direction::S => free.x / 2,
            Direction::NE | Direction::E | Direction::SE => free.x,
        };
        let y = match self {
            Direction::NW | Direction::N | Direction::NE => 0,
            Direction::W | Direction::Center | Direction::E => free.y / 2,
            Direction::SW | Direction::S | Direction::SE => free.y,
        };
        Point::new(x, y)
    }

    /// Lays out `w` with the minimum constraints dropped, then positions it
    /// within the minimum box.
    pub fn layout(
        self,
        gtx: &mut Context<'_>,
        w: impl FnOnce(&mut Context<'_>) -> Dimensions,
    ) -> Dimensions {
        let cs = gtx.constraints;
        let rec = MacroOp::record(gtx.ops);
        let dims = gtx.layout(Constraints::loose(cs.max()), w);
        let call = rec.stop(gtx.ops);

        let sz = Point::new(dims.size.x.max(cs.width.min), dims.size.y.max(cs.height.min));
        let p = self.position(dims.size, sz);
        let stack = StackOp::push(gtx.ops);
        TransformOp::offset(p.to_vec2()).add(gtx.ops);
        call.add(gtx.ops);
        stack.pop(gtx.ops);
        Dimensions {
            size: sz,
            baseline: dims.baseline + p.y,
        }
    }
}

/// Everything a widget needs while laying out.
pub struct Context<'a> {
    pub constraints: Constraints,
    pub config: Config,
    pub ops: &'a mut Ops,
    pub queue: &'a mut dyn Queue,
}

impl<'a> Context<'a> {
    /// Starts a frame with exact constraints for a window of `size`.
    pub fn new(ops: &'a mut Ops, queue: &'a mut dyn Queue, config: Config, size: Point) -> Self {
        Context {
            constraints: Constraints::exact(size),
            config,
            ops,
            queue,
        }
    }

    pub fn px(&self, v: Value) -> i32 {
        self.config.px(v)
    }

    pub fn now(&self) -> Instant {
        self.config.now()
    }

    pub fn events(&mut self, tag: Tag) -> Vec<Event> {
        self.queue.events(tag)
    }

    /// Runs `w` under `cs`, restoring the current constraints afterwards.
    /// The reported size is clamped to `cs`.
    pub fn layout(
        &mut self,
        cs: Constraints,
        w: impl FnOnce(&mut Context<'_>) -> Dimensions,
    ) -> Dimensions {
        let saved = self.constraints;
        self.constraints = cs;
        let mut dims = w(self);
        self.constraints = saved;
        let clamped = cs.constrain(dims.size);
        if clamped != dims.size {
            log::trace!("layout: clamped {:?} to {:?}", dims.size, clamped);
            dims.size = clamped;
        }
        dims
    }
}

/// Offsets everything written by `f` by `p`.
pub(crate) fn offset_scope(ops: &mut Ops, p: Point, f: impl FnOnce(&mut Ops)) {
    let stack = StackOp::push(ops);
    if p != Point::default() {
        TransformOp::offset(Vec2::new(p.x as f32, p.y as f32)).add(ops);
    }
    f(ops);
    stack.pop(ops);
}

/// Lays out nothing and takes exactly `size`, constrained.
pub fn spacer(gtx: &mut Context<'_>, size: Point) -> Dimensions {
    Dimensions::new(gtx.constraints.constrain(size))
}
