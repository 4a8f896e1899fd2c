//! Gesture detectors built from raw pointer events.
//!
//! A detector owns a [`Tag`], declares a pointer handler with `add` while
//! laying out, and interprets the events routed to that tag on the next
//! frame.

use web_time::Instant;

use crate::geometry::Vec2;
use crate::input::{
    Event, Modifiers, PointerEvent, PointerEventKind, PointerId, PointerKind, PointerTypes, Queue,
};
use crate::layout::Axis;
use crate::ops::Ops;
use crate::pointer::PointerInputOp;
use crate::tag::Tag;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClickState {
    #[default]
    Idle,
    Pressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickKind {
    /// Pressed inside the area.
    Press,
    /// Released inside the area after a press.
    Click,
    /// Released outside, or the pointer was cancelled.
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickEvent {
    pub kind: ClickKind,
    /// Handler-local position.
    pub position: Vec2,
    pub time: Instant,
    pub modifiers: Modifiers,
    pub source: PointerKind,
}

#[derive(Debug, Default)]
pub struct Click {
    tag: Tag,
    state: ClickState,
}

impl Click {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    pub fn pressed(&self) -> bool {
        self.state == ClickState::Pressed
    }

    /// Declares the handler over the current area.
    pub fn add(&self, ops: &mut Ops) {
        PointerInputOp::new(self.tag, PointerTypes::DOWN | PointerTypes::UP).add(ops);
    }

    /// Drains the queue for this detector and returns what happened.
    pub fn events(&mut self, q: &mut dyn Queue) -> Vec<ClickEvent> {
        let mut out = Vec::new();
        for e in q.events(self.tag) {
            let Event::Pointer(e) = e else {
                continue;
            };
            let kind = match (e.event, self.state) {
                (PointerEventKind::Down, ClickState::Idle) => {
                    self.state = ClickState::Pressed;
                    ClickKind::Press
                }
                (PointerEventKind::Up, ClickState::Pressed) => {
                    self.state = ClickState::Idle;
                    if e.hit {
                        ClickKind::Click
                    } else {
                        ClickKind::Cancel
                    }
                }
                (PointerEventKind::Cancel, ClickState::Pressed) => {
                    self.state = ClickState::Idle;
                    ClickKind::Cancel
                }
                _ => continue,
            };
            out.push(ClickEvent {
                kind,
                position: e.position,
                time: e.time,
                modifiers: e.modifiers,
                source: e.kind,
            });
        }
        out
    }
}

/// Turns wheel and drag input into a pixel scroll distance.
#[derive(Debug, Default)]
pub struct Scroll {
    tag: Tag,
    drag: Option<(PointerId, f32)>,
    remainder: f32,
}

impl Scroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Declares the scroll handler. Drags that start over other handlers
    /// are taken over once they pass the grab slop.
    pub fn add(&self, ops: &mut Ops) {
        PointerInputOp {
            tag: self.tag,
            grab: true,
            types: PointerTypes::DOWN
                | PointerTypes::UP
                | PointerTypes::MOVE
                | PointerTypes::SCROLL,
        }
        .add(ops);
    }

    pub fn dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Returns the distance to scroll along `axis` since the last call.
    /// Positive values move content towards the start.
    pub fn scroll(&mut self, q: &mut dyn Queue, axis: Axis) -> i32 {
        let along = |v: Vec2| match axis {
            Axis::Horizontal => v.x,
            Axis::Vertical => v.y,
        };
        let mut total = self.remainder;
        for e in q.events(self.tag) {
            let Event::Pointer(PointerEvent {
                id,
                event,
                position,
                scroll,
                ..
            }) = e
            else {
                continue;
            };
            match event {
                PointerEventKind::Scroll => total += along(scroll),
                PointerEventKind::Down => self.drag = Some((id, along(position))),
                PointerEventKind::Move => {
                    if let Some((drag_id, last)) = self.drag
                        && drag_id == id
                    {
                        let p = along(position);
                        total += last - p;
                        self.drag = Some((id, p));
                    }
                }
                PointerEventKind::Up | PointerEventKind::Cancel => {
                    if self.drag.is_some_and(|(d, _)| d == id) {
                        self.drag = None;
                    }
                }
            }
        }
        let whole = total.trunc();
        self.remainder = total - whole;
        whole as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeQueue(HashMap<Tag, Vec<Event>>);

    impl Queue for FakeQueue {
        fn events(&mut self, tag: Tag) -> Vec<Event> {
            self.0.remove(&tag).unwrap_or_default()
        }
    }

    fn pointer(kind: PointerEventKind, y: f32, hit: bool) -> Event {
        let mut e = PointerEvent::new(kind, Vec2::new(0.0, y), Instant::now());
        e.hit = hit;
        Event::Pointer(e)
    }

    #[test]
    fn release_outside_cancels() {
        let mut click = Click::new();
        let mut q = FakeQueue::default();
        q.0.insert(
            click.tag(),
            vec![
                pointer(PointerEventKind::Down, 0.0, true),
                pointer(PointerEventKind::Up, 0.0, false),
            ],
        );
        let kinds: Vec<_> = click.events(&mut q).into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ClickKind::Press, ClickKind::Cancel]);
        assert_eq!(click.state(), ClickState::Idle);
    }

    #[test]
    fn drag_accumulates_fractional_distance() {
        let mut s = Scroll::new();
        let mut q = FakeQueue::default();
        q.0.insert(
            s.tag(),
            vec![
                pointer(PointerEventKind::Down, 50.0, true),
                pointer(PointerEventKind::Move, 49.5, true),
            ],
        );
        assert_eq!(s.scroll(&mut q, Axis::Vertical), 0);
        q.0.insert(s.tag(), vec![pointer(PointerEventKind::Move, 47.0, true)]);
        assert_eq!(s.scroll(&mut q, Axis::Vertical), 3);
        assert!(s.dragging());
    }
}
