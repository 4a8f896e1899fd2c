//! # Event routing
//!
//! A [`Router`] learns the frame's handlers by replaying its operations, then
//! hands incoming input to them:
//!
//! - Pointer events go to the topmost handler whose area chain contains the
//!   position and that declared interest in the event kind. A `Down` captures
//!   the pointer; until the matching `Up` or `Cancel`, the rest of the
//!   sequence goes to the capturing handler regardless of position.
//!   A handler declared with `grab` takes over a captured pointer that has
//!   moved more than [`GRAB_SLOP`] pixels from where it went down inside the
//!   grabber's area. The old holder gets `Cancel`; the grabber gets a `Down`
//!   at the original position followed by the rest of the sequence.
//! - Key and edit events go to the focused key handler only.
//!
//! Events wait in per-handler queues until the widget drains them through
//! [`Queue::events`], normally during the next layout.

use std::collections::{HashMap, HashSet};

use web_time::Instant;

use crate::error::OpsError;
use crate::geometry::{Transform, Vec2};
use crate::input::{
    Event, FocusEvent, InputEvent, PointerEvent, PointerEventKind, PointerId, PointerTypes, Queue,
};
use crate::key::KeyInputOp;
use crate::ops::{OpKind, Ops};
use crate::pointer::PointerInputOp;
use crate::stack::{AreaNode, Replay, hit_chain};
use crate::tag::Tag;

/// Distance in pixels a captured pointer must travel before a grabbing
/// handler may take it over.
pub const GRAB_SLOP: f32 = 8.0;

/// Soft keyboard request for the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextInputState {
    #[default]
    Keep,
    Open,
    Close,
}

#[derive(Clone, Copy, Debug)]
struct PointerHandler {
    tag: Tag,
    area: Option<usize>,
    transform: Transform,
    types: PointerTypes,
    grab: bool,
}

#[derive(Clone, Copy, Debug)]
struct Capture {
    tag: Tag,
    /// Device position of the `Down`.
    start: Vec2,
    last: Vec2,
    /// Time of the latest event in the sequence.
    time: Instant,
}

#[derive(Debug, Default)]
struct PointerQueue {
    areas: Vec<AreaNode>,
    handlers: Vec<PointerHandler>,
    captures: HashMap<PointerId, Capture>,
}

impl PointerQueue {
    fn handler(&self, tag: Tag) -> Option<&PointerHandler> {
        self.handlers.iter().rev().find(|h| h.tag == tag)
    }

    fn hits(&self, h: &PointerHandler, pos: Vec2) -> bool {
        hit_chain(&self.areas, h.area, pos)
    }

    /// Topmost handler accepting `types` at `pos`.
    fn hit_test(&self, pos: Vec2, types: PointerTypes) -> Option<PointerHandler> {
        self.handlers
            .iter()
            .rev()
            .find(|h| h.types.contains(types) && self.hits(h, pos))
            .copied()
    }

    /// Topmost grabbing handler entitled to take `c` over. Captures held by
    /// a grabber are final.
    fn grabber(&self, c: &Capture) -> Option<PointerHandler> {
        let d = c.last - c.start;
        if (d.x * d.x + d.y * d.y).sqrt() <= GRAB_SLOP {
            return None;
        }
        if self.handler(c.tag).is_some_and(|h| h.grab) {
            return None;
        }
        self.handlers
            .iter()
            .rev()
            .find(|h| h.grab && h.tag != c.tag && self.hits(h, c.last))
            .copied()
    }
}

#[derive(Debug, Default)]
struct KeyQueue {
    focus: Option<Tag>,
    text_input: TextInputState,
}

#[derive(Debug, Default)]
pub struct Router {
    pointer: PointerQueue,
    key: KeyQueue,
    handlers: HashMap<Tag, Vec<Event>>,
    wakeup: bool,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the handlers declared in `ops`. Nothing changes if the
    /// buffer is malformed.
    pub fn frame(&mut self, ops: &Ops) -> Result<(), OpsError> {
        let mut pointers = Vec::new();
        let mut keys: Vec<KeyInputOp> = Vec::new();
        let mut wakeup = false;
        let mut hide = false;

        let mut replay = Replay::new(ops);
        for r in replay.by_ref() {
            let r = r?;
            match r.op.kind {
                OpKind::PointerInput => {
                    if let Some(p) = PointerInputOp::decode(&r.op) {
                        pointers.push(PointerHandler {
                            tag: p.tag,
                            area: r.state.area,
                            transform: r.state.transform,
                            types: p.types,
                            grab: p.grab,
                        });
                    }
                }
                OpKind::KeyInput => keys.extend(KeyInputOp::decode(&r.op)),
                OpKind::Invalidate => wakeup = true,
                OpKind::HideInput => hide = true,
                _ => {}
            }
        }
        let areas = replay.into_areas();

        let active: HashSet<Tag> = pointers
            .iter()
            .map(|h| h.tag)
            .chain(keys.iter().map(|k| k.tag))
            .collect();
        self.handlers.retain(|tag, _| active.contains(tag));
        self.pointer.areas = areas;
        self.pointer.handlers = pointers;
        self.wakeup = wakeup;

        let vanished: Vec<PointerId> = self
            .pointer
            .captures
            .iter()
            .filter(|(_, c)| self.pointer.handler(c.tag).is_none())
            .map(|(id, _)| *id)
            .collect();
        for id in vanished {
            if let Some(c) = self.pointer.captures.remove(&id) {
                log::trace!("router: capture of {:?} by {:?} cancelled", id, c.tag);
                self.queue(c.tag, Event::Pointer(cancel(id, &c)));
            }
        }
        self.grab();

        let requested = keys.iter().rev().find(|k| k.focus).map(|k| k.tag);
        let kept = self
            .key
            .focus
            .filter(|f| keys.iter().any(|k| k.tag == *f));
        self.set_focus(requested.or(kept));
        if hide {
            self.key.text_input = TextInputState::Close;
        }

        log::debug!(
            "router: frame with {} pointer handlers, {} key handlers, {} areas",
            self.pointer.handlers.len(),
            keys.len(),
            self.pointer.areas.len()
        );
        Ok(())
    }

    /// Hands every capture that moved far enough to its grabber.
    fn grab(&mut self) {
        let ids: Vec<PointerId> = self.pointer.captures.keys().copied().collect();
        for id in ids {
            self.grab_pointer(id);
        }
    }

    fn grab_pointer(&mut self, id: PointerId) {
        let Some(c) = self.pointer.captures.get(&id).copied() else {
            return;
        };
        let Some(g) = self.pointer.grabber(&c) else {
            return;
        };
        log::trace!("router: {:?} grabbed {:?} from {:?}", g.tag, id, c.tag);
        self.queue(c.tag, Event::Pointer(cancel(id, &c)));
        self.pointer
            .captures
            .insert(id, Capture { tag: g.tag, ..c });
        if g.types.contains(PointerTypes::DOWN) {
            let down = PointerEvent {
                id,
                ..PointerEvent::new(PointerEventKind::Down, c.start, c.time)
            };
            self.deliver(&g, down);
        }
    }

    fn set_focus(&mut self, focus: Option<Tag>) {
        let old = self.key.focus;
        if old == focus {
            return;
        }
        log::debug!("router: focus {:?} -> {:?}", old, focus);
        if let Some(old) = old {
            self.queue(old, Event::Focus(FocusEvent { focus: false }));
        }
        if let Some(new) = focus {
            self.queue(new, Event::Focus(FocusEvent { focus: true }));
            self.key.text_input = TextInputState::Open;
        } else {
            self.key.text_input = TextInputState::Close;
        }
        self.key.focus = focus;
    }

    /// Removes keyboard focus.
    pub fn blur(&mut self) {
        self.set_focus(None);
    }

    pub fn focused(&self) -> Option<Tag> {
        self.key.focus
    }

    /// Returns and resets the pending soft keyboard request.
    pub fn take_text_input(&mut self) -> TextInputState {
        std::mem::take(&mut self.key.text_input)
    }

    /// Whether the last frame asked to be redrawn.
    pub fn wakeup(&self) -> bool {
        self.wakeup
    }

    fn queue(&mut self, tag: Tag, e: Event) {
        self.handlers.entry(tag).or_default().push(e);
    }

    fn deliver(&mut self, h: &PointerHandler, mut e: PointerEvent) {
        let device = e.position;
        e.hit = self.pointer.hits(h, device);
        e.position = h.transform.invert().apply(device);
        log::trace!("router: {:?} {:?} at {:?}", h.tag, e.event, e.position);
        self.queue(h.tag, Event::Pointer(e));
    }

    /// Routes one input event. Returns whether some handler received it.
    pub fn add(&mut self, e: InputEvent) -> bool {
        match e {
            InputEvent::Pointer(e) => self.add_pointer(e),
            InputEvent::Key(k) => self.add_focused(Event::Key(k)),
            InputEvent::Edit(t) => self.add_focused(Event::Edit(t)),
        }
    }

    fn add_focused(&mut self, e: Event) -> bool {
        match self.key.focus {
            Some(tag) => {
                self.queue(tag, e);
                true
            }
            None => {
                log::trace!("router: no focus, dropped {:?}", e);
                false
            }
        }
    }

    fn add_pointer(&mut self, e: PointerEvent) -> bool {
        let pos = e.position;
        let captured = self.pointer.captures.get(&e.id).copied();
        match (e.event, captured) {
            (PointerEventKind::Down, _) => {
                let Some(h) = self.pointer.hit_test(pos, PointerTypes::DOWN) else {
                    log::trace!("router: down at {:?} hit nothing", pos);
                    return false;
                };
                self.pointer.captures.insert(
                    e.id,
                    Capture {
                        tag: h.tag,
                        start: pos,
                        last: pos,
                        time: e.time,
                    },
                );
                self.deliver(&h, e);
                true
            }
            (PointerEventKind::Scroll, _) => {
                let Some(h) = self.pointer.hit_test(pos, PointerTypes::SCROLL) else {
                    return false;
                };
                self.deliver(&h, e);
                true
            }
            (kind, Some(mut c)) => {
                if matches!(kind, PointerEventKind::Up | PointerEventKind::Cancel) {
                    self.pointer.captures.remove(&e.id);
                } else if let Some(held) = self.pointer.captures.get_mut(&e.id) {
                    held.last = pos;
                    held.time = e.time;
                    if kind == PointerEventKind::Move {
                        self.grab_pointer(e.id);
                        if let Some(held) = self.pointer.captures.get(&e.id) {
                            c = *held;
                        }
                    }
                }
                let Some(h) = self.pointer.handler(c.tag).copied() else {
                    self.pointer.captures.remove(&e.id);
                    return false;
                };
                if !h.types.contains(kind.types()) {
                    return false;
                }
                self.deliver(&h, e);
                true
            }
            (PointerEventKind::Cancel, None) => false,
            (kind, None) => {
                let Some(h) = self.pointer.hit_test(pos, kind.types()) else {
                    return false;
                };
                self.deliver(&h, e);
                true
            }
        }
    }
}

/// A `Cancel` ending the sequence held by `c`, stamped with its latest time.
fn cancel(id: PointerId, c: &Capture) -> PointerEvent {
    PointerEvent {
        id,
        ..PointerEvent::new(PointerEventKind::Cancel, c.last, c.time)
    }
}

impl Queue for Router {
    fn events(&mut self, tag: Tag) -> Vec<Event> {
        self.handlers.remove(&tag).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::input::{EditEvent, KeyEvent, Key};
    use crate::ops::{StackOp, TransformOp};
    use crate::pointer::AreaOp;
    use web_time::Instant;

    fn handler(ops: &mut Ops, tag: Tag, rect: Rect) {
        let s = StackOp::push(ops);
        AreaOp::rect(rect).add(ops);
        PointerInputOp::new(tag, PointerTypes::DOWN | PointerTypes::UP | PointerTypes::MOVE)
            .add(ops);
        s.pop(ops);
    }

    fn ptr(kind: PointerEventKind, x: f32, y: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent::new(kind, Vec2::new(x, y), Instant::now()))
    }

    fn kinds(r: &mut Router, tag: Tag) -> Vec<PointerEventKind> {
        r.events(tag)
            .into_iter()
            .filter_map(|e| match e {
                Event::Pointer(p) => Some(p.event),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn topmost_area_wins() {
        let (a, b) = (Tag::new(), Tag::new());
        let mut ops = Ops::new();
        handler(&mut ops, a, Rect::new(0.0, 0.0, 100.0, 100.0));
        handler(&mut ops, b, Rect::new(50.0, 50.0, 100.0, 100.0));
        let mut r = Router::new();
        r.frame(&ops).unwrap();

        assert!(r.add(ptr(PointerEventKind::Down, 75.0, 75.0)));
        assert!(r.events(a).is_empty());
        assert_eq!(kinds(&mut r, b), vec![PointerEventKind::Down]);

        assert!(r.add(ptr(PointerEventKind::Up, 75.0, 75.0)));
        assert!(r.add(ptr(PointerEventKind::Down, 10.0, 10.0)));
        assert_eq!(kinds(&mut r, a), vec![PointerEventKind::Down]);
    }

    #[test]
    fn position_is_mapped_to_handler_space() {
        let tag = Tag::new();
        let mut ops = Ops::new();
        let s = StackOp::push(&mut ops);
        TransformOp::offset(Vec2::new(20.0, 30.0)).add(&mut ops);
        handler(&mut ops, tag, Rect::new(0.0, 0.0, 10.0, 10.0));
        s.pop(&mut ops);
        let mut r = Router::new();
        r.frame(&ops).unwrap();

        assert!(!r.add(ptr(PointerEventKind::Down, 5.0, 5.0)));
        assert!(r.add(ptr(PointerEventKind::Down, 25.0, 35.0)));
        let Event::Pointer(p) = r.events(tag).remove(0) else {
            panic!("expected pointer event");
        };
        assert_eq!(p.position, Vec2::new(5.0, 5.0));
        assert!(p.hit);
    }

    #[test]
    fn capture_follows_pointer_outside_area() {
        let tag = Tag::new();
        let mut ops = Ops::new();
        handler(&mut ops, tag, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut r = Router::new();
        r.frame(&ops).unwrap();

        r.add(ptr(PointerEventKind::Down, 5.0, 5.0));
        assert!(r.add(ptr(PointerEventKind::Move, 50.0, 50.0)));
        assert!(r.add(ptr(PointerEventKind::Up, 50.0, 50.0)));
        let hits: Vec<bool> = r
            .events(tag)
            .into_iter()
            .filter_map(|e| match e {
                Event::Pointer(p) => Some(p.hit),
                _ => None,
            })
            .collect();
        assert_eq!(hits, vec![true, false, false]);
        // released
        assert!(!r.add(ptr(PointerEventKind::Move, 50.0, 50.0)));
    }

    #[test]
    fn vanished_capture_receives_cancel() {
        let tag = Tag::new();
        let mut ops = Ops::new();
        handler(&mut ops, tag, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut r = Router::new();
        r.frame(&ops).unwrap();
        r.add(ptr(PointerEventKind::Down, 5.0, 5.0));
        r.events(tag);

        ops.reset();
        r.frame(&ops).unwrap();
        assert_eq!(kinds(&mut r, tag), vec![PointerEventKind::Cancel]);
        assert!(!r.add(ptr(PointerEventKind::Up, 5.0, 5.0)));
    }

    fn grab_frame(ops: &mut Ops, button: Tag, scroller: Tag) {
        ops.reset();
        let s = StackOp::push(ops);
        AreaOp::rect(Rect::new(0.0, 0.0, 100.0, 100.0)).add(ops);
        PointerInputOp {
            tag: scroller,
            grab: true,
            types: PointerTypes::DOWN | PointerTypes::MOVE | PointerTypes::UP,
        }
        .add(ops);
        handler(ops, button, Rect::new(0.0, 0.0, 10.0, 10.0));
        s.pop(ops);
    }

    #[test]
    fn grab_takes_over_a_moving_capture() {
        let (button, scroller) = (Tag::new(), Tag::new());
        let mut ops = Ops::new();
        grab_frame(&mut ops, button, scroller);
        let mut r = Router::new();
        r.frame(&ops).unwrap();

        r.add(ptr(PointerEventKind::Down, 5.0, 5.0));
        r.add(ptr(PointerEventKind::Move, 7.0, 7.0));
        r.frame(&ops).unwrap();
        assert_eq!(
            kinds(&mut r, button),
            vec![PointerEventKind::Down, PointerEventKind::Move]
        );
        assert!(r.events(scroller).is_empty());

        r.add(ptr(PointerEventKind::Move, 5.0, 40.0));
        r.add(ptr(PointerEventKind::Up, 5.0, 60.0));
        assert_eq!(kinds(&mut r, button), vec![PointerEventKind::Cancel]);
        let Some(Event::Pointer(down)) = r.events(scroller).into_iter().next() else {
            panic!("expected pointer event");
        };
        assert_eq!(down.event, PointerEventKind::Down);
        assert_eq!(down.position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn grabbed_sequence_continues_at_the_grabber() {
        let (button, scroller) = (Tag::new(), Tag::new());
        let mut ops = Ops::new();
        grab_frame(&mut ops, button, scroller);
        let mut r = Router::new();
        r.frame(&ops).unwrap();

        r.add(ptr(PointerEventKind::Down, 5.0, 5.0));
        r.add(ptr(PointerEventKind::Move, 5.0, 40.0));
        r.add(ptr(PointerEventKind::Up, 5.0, 60.0));
        assert_eq!(
            kinds(&mut r, scroller),
            vec![
                PointerEventKind::Down,
                PointerEventKind::Move,
                PointerEventKind::Up
            ]
        );
        assert_eq!(
            kinds(&mut r, button),
            vec![PointerEventKind::Down, PointerEventKind::Cancel]
        );
    }

    #[test]
    fn cancel_keeps_the_time_of_the_last_event() {
        let tag = Tag::new();
        let mut ops = Ops::new();
        handler(&mut ops, tag, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut r = Router::new();
        r.frame(&ops).unwrap();
        let t0 = Instant::now();
        let moved = t0 + std::time::Duration::from_millis(30);
        r.add(InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Down,
            Vec2::new(5.0, 5.0),
            t0,
        )));
        r.add(InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Move,
            Vec2::new(6.0, 5.0),
            moved,
        )));
        r.events(tag);

        ops.reset();
        r.frame(&ops).unwrap();
        let Some(Event::Pointer(cancel)) = r.events(tag).into_iter().next() else {
            panic!("expected pointer event");
        };
        assert_eq!(cancel.event, PointerEventKind::Cancel);
        assert_eq!(cancel.time, moved);
        assert_eq!(cancel.position, Vec2::new(6.0, 5.0));
    }

    #[test]
    fn undeclared_kinds_are_not_delivered() {
        let tag = Tag::new();
        let mut ops = Ops::new();
        PointerInputOp::new(tag, PointerTypes::SCROLL).add(&mut ops);
        let mut r = Router::new();
        r.frame(&ops).unwrap();
        assert!(!r.add(ptr(PointerEventKind::Down, 1.0, 1.0)));
        assert!(r.add(InputEvent::Pointer(PointerEvent::scroll(
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 3.0),
            Instant::now()
        ))));
    }

    #[test]
    fn key_without_focus_is_dropped() {
        let tag = Tag::new();
        let mut ops = Ops::new();
        KeyInputOp { tag, focus: false }.add(&mut ops);
        let mut r = Router::new();
        r.frame(&ops).unwrap();
        assert!(!r.add(InputEvent::Key(KeyEvent::press(Key::Enter, Instant::now()))));
        assert!(!r.add(InputEvent::Edit(EditEvent { text: "x".into() })));
        assert!(r.events(tag).is_empty());
    }

    #[test]
    fn malformed_frame_changes_nothing() {
        let tag = Tag::new();
        let mut ops = Ops::new();
        handler(&mut ops, tag, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut r = Router::new();
        r.frame(&ops).unwrap();

        let mut bad = Ops::new();
        std::mem::forget(StackOp::push(&mut bad));
        assert_eq!(r.frame(&bad), Err(OpsError::UnclosedStack(1)));
        assert!(r.add(ptr(PointerEventKind::Down, 5.0, 5.0)));
    }

    #[test]
    fn hide_input_closes_keyboard() {
        let mut ops = Ops::new();
        crate::key::HideInputOp.add(&mut ops);
        let mut r = Router::new();
        r.frame(&ops).unwrap();
        assert_eq!(r.take_text_input(), TextInputState::Close);
        assert_eq!(r.take_text_input(), TextInputState::Keep);
    }
}
