use super::{Constraint, Constraints, Context, Dimensions};
use crate::geometry::Point;
use crate::ops::{StackOp, TransformOp};
use crate::unit::Value;

/// Adds margins around a widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inset {
    pub top: Value,
    pub right: Value,
    pub bottom: Value,
    pub left: Value,
}

impl Inset {
    pub fn uniform(v: Value) -> Self {
        Inset {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn layout(
        &self,
        gtx: &mut Context<'_>,
        w: impl FnOnce(&mut Context<'_>) -> Dimensions,
    ) -> Dimensions {
        let top = gtx.px(self.top);
        let right = gtx.px(self.right);
        let bottom = gtx.px(self.bottom);
        let left = gtx.px(self.left);
        let cs = gtx.constraints;

        let shrink = |c: Constraint, by: i32| {
            let max = (c.max - by).max(0);
            Constraint {
                min: (c.min - by).max(0).min(max),
                max,
            }
        };
        let inner = Constraints {
            width: shrink(cs.width, left + right),
            height: shrink(cs.height, top + bottom),
        };

        let stack = StackOp::push(gtx.ops);
        TransformOp::offset(Point::new(left, top).to_vec2()).add(gtx.ops);
        let dims = gtx.layout(inner, w);
        stack.pop(gtx.ops);
        Dimensions {
            size: cs.constrain(dims.size + Point::new(left + right, top + bottom)),
            baseline: dims.baseline + top,
        }
    }
}
