pub use crate::color::Color;
pub use crate::error::OpsError;
pub use crate::geometry::{Point, Rect, Transform, Vec2};
pub use crate::gesture::{Click, ClickEvent, ClickKind, ClickState, Scroll};
pub use crate::input::*;
pub use crate::key::{HideInputOp, KeyInputOp};
pub use crate::layout::{
    Alignment, Axis, Constraint, Constraints, Context, Dimensions, Direction, Flex, FlexChild,
    INFINITE, Inset, List, Position, Spacing, Stack, StackChild,
};
pub use crate::ops::{InvalidateOp, MacroOp, Ops, StackOp, TransformOp};
pub use crate::paint::{ClipOp, ColorOp, ImageHandle, ImageOp, PaintOp, TextOp, fill, fill_rounded};
pub use crate::pointer::{AreaOp, AreaShape, PointerInputOp};
pub use crate::router::{Router, TextInputState};
pub use crate::scene::{Scene, SceneNode};
pub use crate::tag::Tag;
pub use crate::unit::{Config, Unit, Value, dp, px, sp};
