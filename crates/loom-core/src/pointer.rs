use crate::geometry::{Rect, Vec2};
use crate::input::PointerTypes;
use crate::ops::{EncodedOp, OpKind, OpRef, Ops};
use crate::paint::{get_rect, put_rect};
use crate::tag::Tag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AreaShape {
    #[default]
    Rect,
    Ellipse,
}

/// Sets the hit area for pointer handlers declared later in the same scope.
///
/// Areas nest: a handler only sees a position if it is inside its own area
/// and every enclosing one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaOp {
    pub shape: AreaShape,
    pub rect: Rect,
}

impl AreaOp {
    pub fn rect(rect: Rect) -> Self {
        AreaOp {
            shape: AreaShape::Rect,
            rect,
        }
    }

    pub fn ellipse(rect: Rect) -> Self {
        AreaOp {
            shape: AreaShape::Ellipse,
            rect,
        }
    }

    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(OpKind::Area, OpKind::Area.payload_len(), []);
        data[0] = match self.shape {
            AreaShape::Rect => 0,
            AreaShape::Ellipse => 1,
        };
        put_rect(&mut data[1..], self.rect);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Self {
        AreaOp {
            shape: if op.payload[0] == 1 {
                AreaShape::Ellipse
            } else {
                AreaShape::Rect
            },
            rect: get_rect(&op.payload[1..]),
        }
    }

    /// Tests a point in the area's own coordinate space.
    pub fn contains(&self, p: Vec2) -> bool {
        match self.shape {
            AreaShape::Rect => self.rect.contains(p),
            AreaShape::Ellipse => {
                if self.rect.is_empty() {
                    return false;
                }
                let c = self.rect.center();
                let rx = self.rect.w * 0.5;
                let ry = self.rect.h * 0.5;
                let dx = (p.x - c.x) / rx;
                let dy = (p.y - c.y) / ry;
                dx * dx + dy * dy <= 1.0
            }
        }
    }
}

/// Declares a pointer handler over the current area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInputOp {
    pub tag: Tag,
    /// Take over pointers already captured by another handler once they
    /// move past the grab slop inside this handler's area.
    pub grab: bool,
    pub types: PointerTypes,
}

impl PointerInputOp {
    pub fn new(tag: Tag, types: PointerTypes) -> Self {
        PointerInputOp {
            tag,
            grab: false,
            types,
        }
    }

    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(
            OpKind::PointerInput,
            OpKind::PointerInput.payload_len(),
            [OpRef::Tag(self.tag)],
        );
        data[0] = self.types.bits();
        data[1] = self.grab as u8;
    }

    pub fn decode(op: &EncodedOp<'_>) -> Option<Self> {
        match op.refs.first() {
            Some(OpRef::Tag(tag)) => Some(PointerInputOp {
                tag: *tag,
                types: PointerTypes::from_bits_truncate(op.payload[0]),
                grab: op.payload[1] != 0,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_excludes_corners() {
        let area = AreaOp::ellipse(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(area.contains(Vec2::new(5.0, 5.0)));
        assert!(area.contains(Vec2::new(5.0, 0.5)));
        assert!(!area.contains(Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn pointer_input_decodes() {
        let mut ops = Ops::new();
        let tag = Tag::new();
        PointerInputOp {
            tag,
            grab: true,
            types: PointerTypes::DOWN | PointerTypes::UP,
        }
        .add(&mut ops);
        let op = ops.reader().next().unwrap().unwrap();
        let decoded = PointerInputOp::decode(&op).unwrap();
        assert_eq!(decoded.tag, tag);
        assert!(decoded.grab);
        assert_eq!(decoded.types, PointerTypes::DOWN | PointerTypes::UP);
    }
}
