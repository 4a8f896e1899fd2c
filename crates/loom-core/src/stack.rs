//! Transform, clip and area bookkeeping for replaying an [`Ops`] buffer.
//!
//! [`StateTracker`] is the bare save/restore machine; [`Replay`] drives one
//! over a buffer and pairs every record with the state it executes under.

use smallvec::SmallVec;

use crate::error::OpsError;
use crate::geometry::{Rect, Transform, Vec2};
use crate::ops::{EncodedOp, OpKind, Ops, Reader, get_u32};
use crate::paint::ClipOp;
use crate::pointer::AreaOp;

/// Device-space clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clip {
    pub rect: Rect,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct State {
    pub transform: Transform,
    pub clip: Option<Clip>,
    /// Index into the replay's area list.
    pub area: Option<usize>,
}

/// Checkpoint returned by [`StateTracker::push`].
#[derive(Debug, PartialEq, Eq)]
pub struct StackToken {
    id: u32,
    depth: usize,
}

#[derive(Debug, Default)]
pub struct StateTracker {
    current: State,
    saved: SmallVec<[(u32, State); 16]>,
    next_id: u32,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &State {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) -> StackToken {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.push_with(id)
    }

    /// Pushes a checkpoint labelled with a caller-chosen id.
    pub fn push_with(&mut self, id: u32) -> StackToken {
        self.saved.push((id, self.current));
        StackToken {
            id,
            depth: self.saved.len(),
        }
    }

    /// Restores the state saved by `token`.
    ///
    /// # Panics
    ///
    /// If `token` is not the innermost checkpoint.
    pub fn pop(&mut self, token: StackToken) {
        if let Err(e) = self.try_pop(token.id) {
            panic!("state tracker: {e}");
        }
        debug_assert_eq!(self.saved.len() + 1, token.depth);
    }

    /// Restores the innermost checkpoint if its id is `id`.
    pub fn try_pop(&mut self, id: u32) -> Result<(), OpsError> {
        match self.saved.last() {
            None => Err(OpsError::StackUnderflow(id)),
            Some(&(top, _)) if top != id => Err(OpsError::UnbalancedStack {
                expected: top,
                found: id,
            }),
            Some(&(_, state)) => {
                self.current = state;
                self.saved.pop();
                Ok(())
            }
        }
    }

    /// Composes a translation into the current scope.
    pub fn offset(&mut self, delta: Vec2) {
        self.current.transform = self.current.transform.then(Transform::translate(delta));
    }

    pub fn transform(&mut self, t: Transform) {
        self.current.transform = self.current.transform.then(t);
    }

    /// Intersects the current clip with `rect`, given in local coordinates.
    pub fn clip(&mut self, rect: Rect, radius: f32) {
        let dev = self.current.transform.apply_rect(rect);
        self.current.clip = Some(match self.current.clip {
            Some(c) => Clip {
                rect: c.rect.intersect(&dev),
                radius: radius.max(c.radius),
            },
            None => Clip { rect: dev, radius },
        });
    }

    pub fn set_area(&mut self, area: usize) {
        self.current.area = Some(area);
    }
}

/// A declared input area, resolved during replay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaNode {
    pub area: AreaOp,
    /// Maps area-local coordinates to device coordinates.
    pub transform: Transform,
    pub parent: Option<usize>,
}

impl AreaNode {
    /// Tests a device position against this area only.
    pub fn hit(&self, device: Vec2) -> bool {
        self.area.contains(self.transform.invert().apply(device))
    }
}

/// Tests `device` against `area` and every enclosing area.
pub fn hit_chain(areas: &[AreaNode], mut area: Option<usize>, device: Vec2) -> bool {
    while let Some(i) = area {
        let Some(node) = areas.get(i) else {
            return false;
        };
        if !node.hit(device) {
            return false;
        }
        area = node.parent;
    }
    true
}

/// A record together with the state in effect just before it executes.
#[derive(Clone, Copy, Debug)]
pub struct Replayed<'a> {
    pub op: EncodedOp<'a>,
    pub state: State,
}

/// Walks a buffer, applying structural records to a [`StateTracker`].
pub struct Replay<'a> {
    reader: Reader<'a>,
    tracker: StateTracker,
    areas: Vec<AreaNode>,
    done: bool,
}

impl<'a> Replay<'a> {
    pub fn new(ops: &'a Ops) -> Self {
        Self {
            reader: ops.reader(),
            tracker: StateTracker::new(),
            areas: Vec::new(),
            done: false,
        }
    }

    pub fn areas(&self) -> &[AreaNode] {
        &self.areas
    }

    pub fn into_areas(self) -> Vec<AreaNode> {
        self.areas
    }

    fn apply(&mut self, op: &EncodedOp<'_>) -> Result<(), OpsError> {
        match op.kind {
            OpKind::Push => {
                self.tracker.push_with(get_u32(op.payload));
            }
            OpKind::Pop => self.tracker.try_pop(get_u32(op.payload))?,
            OpKind::Transform => {
                let t = crate::ops::TransformOp::decode(op);
                self.tracker.transform(t.transform);
            }
            OpKind::Clip => {
                let c = ClipOp::decode(op);
                self.tracker.clip(c.rect, c.radius);
            }
            OpKind::Area => {
                let area = AreaOp::decode(op);
                let state = self.tracker.state();
                self.areas.push(AreaNode {
                    area,
                    transform: state.transform,
                    parent: state.area,
                });
                let idx = self.areas.len() - 1;
                self.tracker.set_area(idx);
            }
            _ => {}
        }
        Ok(())
    }
}

impl<'a> Iterator for Replay<'a> {
    type Item = Result<Replayed<'a>, OpsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next() {
            None => {
                self.done = true;
                let open = self.tracker.depth();
                (open > 0).then_some(Err(OpsError::UnclosedStack(open)))
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            Some(Ok(op)) => {
                let state = *self.tracker.state();
                if let Err(e) = self.apply(&op) {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(Replayed { op, state }))
            }
        }
    }
}

impl Ops {
    /// Replays the buffer, reporting the first structural error.
    pub fn validate(&self) -> Result<(), OpsError> {
        Replay::new(self).try_for_each(|r| r.map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{OpKind, StackOp, TransformOp};
    use crate::paint::{ColorOp, PaintOp};
    use crate::Color;

    #[test]
    fn pop_restores_checkpoint() {
        let mut t = StateTracker::new();
        t.offset(Vec2::new(1.0, 1.0));
        let tok = t.push();
        t.offset(Vec2::new(5.0, 0.0));
        t.clip(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0);
        assert_eq!(t.state().transform.offset, Vec2::new(6.0, 1.0));
        assert_eq!(
            t.state().clip.unwrap().rect,
            Rect::new(6.0, 1.0, 10.0, 10.0)
        );
        t.pop(tok);
        assert_eq!(t.state().transform.offset, Vec2::new(1.0, 1.0));
        assert!(t.state().clip.is_none());
    }

    #[test]
    #[should_panic(expected = "unbalanced stack")]
    fn out_of_order_token_is_fatal() {
        let mut t = StateTracker::new();
        let outer = t.push();
        let _inner = t.push();
        t.pop(outer);
    }

    #[test]
    fn nested_clips_intersect_in_device_space() {
        let mut t = StateTracker::new();
        t.clip(Rect::new(0.0, 0.0, 20.0, 20.0), 0.0);
        t.offset(Vec2::new(10.0, 10.0));
        t.clip(Rect::new(0.0, 0.0, 20.0, 20.0), 0.0);
        assert_eq!(
            t.state().clip.unwrap().rect,
            Rect::new(10.0, 10.0, 10.0, 10.0)
        );
    }

    #[test]
    fn replay_pairs_paint_with_its_transform() {
        let mut ops = Ops::new();
        let s = StackOp::push(&mut ops);
        TransformOp::offset(Vec2::new(3.0, 4.0)).add(&mut ops);
        ColorOp { color: Color::BLACK }.add(&mut ops);
        PaintOp {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        }
        .add(&mut ops);
        s.pop(&mut ops);
        PaintOp {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
        }
        .add(&mut ops);

        let offsets: Vec<Vec2> = Replay::new(&ops)
            .map(|r| r.unwrap())
            .filter(|r| r.op.kind == OpKind::Paint)
            .map(|r| r.state.transform.offset)
            .collect();
        assert_eq!(offsets, vec![Vec2::new(3.0, 4.0), Vec2::ZERO]);
    }

    #[test]
    fn unclosed_push_is_reported_at_end() {
        let mut ops = Ops::new();
        std::mem::forget(StackOp::push(&mut ops));
        assert_eq!(ops.validate(), Err(OpsError::UnclosedStack(1)));
    }

    #[test]
    fn areas_chain_to_their_parent() {
        let mut ops = Ops::new();
        let s = StackOp::push(&mut ops);
        AreaOp::rect(Rect::new(0.0, 0.0, 50.0, 50.0)).add(&mut ops);
        TransformOp::offset(Vec2::new(40.0, 0.0)).add(&mut ops);
        AreaOp::rect(Rect::new(0.0, 0.0, 50.0, 50.0)).add(&mut ops);
        s.pop(&mut ops);

        let mut replay = Replay::new(&ops);
        replay.by_ref().for_each(|r| {
            r.unwrap();
        });
        let areas = replay.into_areas();
        assert_eq!(areas[1].parent, Some(0));
        // inside the child, outside the parent
        assert!(!hit_chain(&areas, Some(1), Vec2::new(60.0, 10.0)));
        assert!(hit_chain(&areas, Some(1), Vec2::new(45.0, 10.0)));
    }
}
