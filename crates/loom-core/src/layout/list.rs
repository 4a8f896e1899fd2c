use std::collections::{HashMap, VecDeque};

use super::{Alignment, Axis, Constraint, Context, Dimensions, INFINITE, offset_scope};
use crate::geometry::Rect;
use crate::gesture::Scroll;
use crate::ops::{MacroOp, StackOp};
use crate::paint::ClipOp;
use crate::pointer::AreaOp;

/// Scroll position of a [`List`], kept between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// Index of the first visible item.
    pub first: usize,
    /// Pixels of the first item hidden before the viewport start.
    pub offset: i32,
    /// More content follows the viewport end.
    pub before_end: bool,
    /// Items laid out in the last frame.
    pub count: usize,
}

/// A scrollable, virtualized list.
///
/// Only items overlapping the viewport are laid out. Wheel and drag input
/// over the viewport move the position before each layout; the position
/// stops at the first item's start and the last item's end.
///
/// Items scrolled past are skipped by their size from earlier frames, or
/// by the mean of the sizes seen so far, without being laid out.
#[derive(Debug, Default)]
pub struct List {
    pub axis: Axis,
    pub alignment: Alignment,
    pub position: Position,
    scroll: Scroll,
    sizes: Sizes,
}

/// Main axis sizes of items laid out in earlier frames.
#[derive(Debug, Default)]
struct Sizes {
    known: HashMap<usize, i32>,
    total: i64,
    len: usize,
}

impl Sizes {
    fn resize(&mut self, len: usize) {
        if len < self.len {
            self.known.retain(|i, _| *i < len);
            self.total = self.known.values().map(|&m| i64::from(m)).sum();
        }
        self.len = len;
    }

    fn insert(&mut self, i: usize, m: i32) {
        if let Some(old) = self.known.insert(i, m) {
            self.total -= i64::from(old);
        }
        self.total += i64::from(m);
    }

    /// Size of item `i`, estimated when it was never laid out. `None` until
    /// some item has been measured.
    fn get(&self, i: usize) -> Option<i32> {
        if let Some(&m) = self.known.get(&i) {
            return Some(m);
        }
        let n = self.known.len() as i64;
        (n > 0).then(|| (self.total / n) as i32)
    }
}

struct Item {
    call: MacroOp,
    dims: Dimensions,
}

impl List {
    pub fn vertical() -> Self {
        List {
            axis: Axis::Vertical,
            ..List::default()
        }
    }

    pub fn horizontal() -> Self {
        List::default()
    }

    pub fn dragging(&self) -> bool {
        self.scroll.dragging()
    }

    /// Scrolls so that `index` is the first item.
    pub fn scroll_to(&mut self, index: usize) {
        self.position.first = index;
        self.position.offset = 0;
    }

    pub fn layout(
        &mut self,
        gtx: &mut Context<'_>,
        len: usize,
        mut item: impl FnMut(&mut Context<'_>, usize) -> Dimensions,
    ) -> Dimensions {
        let cs = gtx.constraints;
        let axis = self.axis;
        let main_max = axis.main_constraint(&cs).max;
        let cross = Constraint {
            min: 0,
            max: axis.cross_constraint(&cs).max,
        };
        let ics = axis.constraints(Constraint { min: 0, max: INFINITE }, cross);

        let d = self.scroll.scroll(gtx.queue, axis);
        let sizes = &mut self.sizes;
        sizes.resize(len);
        let pos = &mut self.position;
        pos.offset += d;
        if pos.first > len {
            log::warn!("list: position {} past the end ({len} items)", pos.first);
            pos.first = len;
            pos.offset = 0;
        }

        let mut laid: VecDeque<Item> = VecDeque::new();
        let mut lay = |gtx: &mut Context<'_>, sizes: &mut Sizes, i: usize| {
            let rec = MacroOp::record(gtx.ops);
            let dims = gtx.layout(ics, |gtx| item(gtx, i));
            let call = rec.stop(gtx.ops);
            sizes.insert(i, axis.main(dims.size));
            Item { call, dims }
        };

        while pos.offset < 0 && pos.first > 0 {
            pos.first -= 1;
            if laid.is_empty()
                && let Some(m) = sizes.get(pos.first)
                && pos.offset + m <= 0
            {
                pos.offset += m;
                continue;
            }
            let it = lay(gtx, sizes, pos.first);
            pos.offset += axis.main(it.dims.size);
            laid.push_front(it);
        }
        if pos.offset < 0 {
            pos.offset = 0;
        }

        let mut end = pos.first + laid.len();
        let mut main = -pos.offset;
        for it in &laid {
            main += axis.main(it.dims.size);
        }
        while end < len && main < main_max {
            if laid.is_empty()
                && let Some(m) = sizes.get(end)
                && m <= pos.offset
            {
                pos.first += 1;
                pos.offset -= m;
                main += m;
                end += 1;
                continue;
            }
            let it = lay(gtx, sizes, end);
            let m = axis.main(it.dims.size);
            end += 1;
            if laid.is_empty() && main + m <= 0 {
                // scrolled past an item of unknown size
                pos.first += 1;
                pos.offset -= m;
                main += m;
                continue;
            }
            main += m;
            laid.push_back(it);
        }

        // Pull back when the end of content is inside the viewport.
        let mut deficit = main_max - main;
        while deficit > 0 && end == len {
            if pos.offset > 0 {
                let take = pos.offset.min(deficit);
                pos.offset -= take;
                main += take;
                deficit -= take;
            } else if pos.first > 0 {
                pos.first -= 1;
                let it = lay(gtx, sizes, pos.first);
                pos.offset += axis.main(it.dims.size);
                laid.push_front(it);
            } else {
                break;
            }
        }

        pos.before_end = end < len || main > main_max;
        pos.count = laid.len();

        let cross_size = laid
            .iter()
            .map(|it| axis.cross(it.dims.size))
            .max()
            .unwrap_or(0);
        let size = cs.constrain(axis.point(main.min(main_max).max(0), cross_size));
        let cross_size = axis.cross(size);

        let stack = StackOp::push(gtx.ops);
        let viewport = Rect::from_size(size);
        ClipOp::rect(viewport).add(gtx.ops);
        AreaOp::rect(viewport).add(gtx.ops);
        self.scroll.add(gtx.ops);
        let mut at = -pos.offset;
        for it in &laid {
            let c = axis.cross(it.dims.size);
            let cross_off = match self.alignment {
                Alignment::End => cross_size - c,
                Alignment::Middle => (cross_size - c) / 2,
                _ => 0,
            };
            offset_scope(gtx.ops, axis.point(at, cross_off), |ops| it.call.add(ops));
            at += axis.main(it.dims.size);
        }
        stack.pop(gtx.ops);

        Dimensions::new(size)
    }
}
