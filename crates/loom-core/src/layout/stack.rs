use super::{Constraints, Context, Dimensions, Direction, offset_scope};
use crate::geometry::Point;
use crate::ops::MacroOp;

type Widget<'w> = Box<dyn FnOnce(&mut Context<'_>) -> Dimensions + 'w>;

/// Overlays children on top of each other, in list order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    pub alignment: Direction,
}

pub struct StackChild<'w> {
    expanded: bool,
    widget: Widget<'w>,
}

impl<'w> StackChild<'w> {
    /// Sized by its own content.
    pub fn rigid(w: impl FnOnce(&mut Context<'_>) -> Dimensions + 'w) -> Self {
        StackChild {
            expanded: false,
            widget: Box::new(w),
        }
    }

    /// Laid out exactly at the size of the largest rigid child.
    pub fn expanded(w: impl FnOnce(&mut Context<'_>) -> Dimensions + 'w) -> Self {
        StackChild {
            expanded: true,
            widget: Box::new(w),
        }
    }
}

struct Laid {
    rigid: bool,
    call: MacroOp,
    dims: Dimensions,
}

impl Stack {
    pub fn new(alignment: Direction) -> Self {
        Stack { alignment }
    }

    pub fn layout(&self, gtx: &mut Context<'_>, children: Vec<StackChild<'_>>) -> Dimensions {
        let cs = gtx.constraints;
        let mut max = Point::default();
        let mut laid: Vec<Option<Laid>> = Vec::with_capacity(children.len());
        let mut expanded = Vec::new();

        for child in children {
            if child.expanded {
                laid.push(None);
                expanded.push(child.widget);
                continue;
            }
            let rec = MacroOp::record(gtx.ops);
            let dims = gtx.layout(cs, child.widget);
            let call = rec.stop(gtx.ops);
            max.x = max.x.max(dims.size.x);
            max.y = max.y.max(dims.size.y);
            laid.push(Some(Laid {
                rigid: true,
                call,
                dims,
            }));
        }

        let sz = cs.constrain(max);
        let mut expanded = expanded.into_iter();
        for slot in laid.iter_mut().filter(|s| s.is_none()) {
            let Some(w) = expanded.next() else { break };
            let rec = MacroOp::record(gtx.ops);
            let dims = gtx.layout(Constraints::exact(sz), w);
            let call = rec.stop(gtx.ops);
            *slot = Some(Laid {
                rigid: false,
                call,
                dims,
            });
        }

        let mut baseline = 0;
        for laid in laid.iter().flatten() {
            let p = self.alignment.position(laid.dims.size, sz);
            offset_scope(gtx.ops, p, |ops| laid.call.add(ops));
            if laid.rigid && baseline == 0 && laid.dims.baseline != laid.dims.size.y {
                baseline = laid.dims.baseline + p.y;
            }
        }
        if baseline == 0 {
            baseline = sz.y;
        }
        Dimensions { size: sz, baseline }
    }
}
