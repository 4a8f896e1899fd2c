use std::collections::VecDeque;

use loom_core::{Click, ClickKind, Context, Dimensions, Vec2};
use web_time::Instant;

/// Clicks kept for drawing ink.
pub const HISTORY_LEN: usize = 16;

/// A completed click, timestamped at release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickRecord {
    pub position: Vec2,
    pub time: Instant,
}

/// Clickable state. Declare it over an area every frame with
/// [`Button::layout`] and ask [`Button::clicked`] what happened.
#[derive(Debug, Default)]
pub struct Button {
    click: Click,
    pending: usize,
    history: VecDeque<ClickRecord>,
}

impl Button {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes queued events.
    pub fn update(&mut self, gtx: &mut Context<'_>) {
        for e in self.click.events(gtx.queue) {
            if e.kind != ClickKind::Click {
                continue;
            }
            self.pending += 1;
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(ClickRecord {
                position: e.position,
                time: e.time,
            });
        }
    }

    /// Reports one pending click per call.
    pub fn clicked(&mut self) -> bool {
        if self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
    }

    /// Takes all pending clicks.
    pub fn clicks(&mut self) -> usize {
        std::mem::take(&mut self.pending)
    }

    /// Whether the button is held down.
    pub fn active(&self) -> bool {
        self.click.pressed()
    }

    /// Recent clicks, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ClickRecord> {
        self.history.iter()
    }

    /// Processes events and declares the click handler over the current area.
    pub fn layout(&mut self, gtx: &mut Context<'_>) -> Dimensions {
        self.update(gtx);
        self.click.add(gtx.ops);
        Dimensions::new(gtx.constraints.min())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::{
        AreaOp, ClickState, Config, InputEvent, Ops, Point, PointerEvent, PointerEventKind, Rect,
        Router, StackOp,
    };
    use std::time::Duration;

    fn frame(button: &mut Button, router: &mut Router, ops: &mut Ops, now: Instant) {
        ops.reset();
        let mut gtx = Context::new(ops, router, Config::new(1.0, now), Point::new(100, 40));
        let s = StackOp::push(gtx.ops);
        AreaOp::rect(Rect::new(0.0, 0.0, 100.0, 40.0)).add(gtx.ops);
        button.layout(&mut gtx);
        s.pop(gtx.ops);
        router.frame(ops).unwrap();
    }

    fn press(kind: PointerEventKind, x: f32, at: Instant) -> InputEvent {
        InputEvent::Pointer(PointerEvent::new(kind, Vec2::new(x, 10.0), at))
    }

    #[test]
    fn press_and_release_inside_records_one_click() {
        let t0 = Instant::now();
        let release = t0 + Duration::from_millis(120);
        let mut button = Button::new();
        let mut router = Router::new();
        let mut ops = Ops::new();

        frame(&mut button, &mut router, &mut ops, t0);
        assert_eq!(button.click.state(), ClickState::Idle);

        router.add(press(PointerEventKind::Down, 10.0, t0));
        frame(&mut button, &mut router, &mut ops, t0);
        assert_eq!(button.click.state(), ClickState::Pressed);
        assert!(button.active());
        assert!(!button.clicked());

        router.add(press(PointerEventKind::Up, 12.0, release));
        frame(&mut button, &mut router, &mut ops, release);
        assert_eq!(button.click.state(), ClickState::Idle);
        assert!(button.clicked());
        assert!(!button.clicked());
        let history: Vec<_> = button.history().copied().collect();
        assert_eq!(
            history,
            vec![ClickRecord {
                position: Vec2::new(12.0, 10.0),
                time: release,
            }]
        );
    }

    #[test]
    fn release_outside_is_not_a_click() {
        let t0 = Instant::now();
        let mut button = Button::new();
        let mut router = Router::new();
        let mut ops = Ops::new();
        frame(&mut button, &mut router, &mut ops, t0);
        router.add(press(PointerEventKind::Down, 10.0, t0));
        router.add(press(PointerEventKind::Up, 500.0, t0));
        frame(&mut button, &mut router, &mut ops, t0);
        assert_eq!(button.clicks(), 0);
        assert_eq!(button.history().count(), 0);
        assert!(!button.active());
    }

    #[test]
    fn history_keeps_the_newest_clicks() {
        let t0 = Instant::now();
        let mut button = Button::new();
        let mut router = Router::new();
        let mut ops = Ops::new();
        frame(&mut button, &mut router, &mut ops, t0);
        for i in 0..20 {
            router.add(press(PointerEventKind::Down, i as f32, t0));
            router.add(press(PointerEventKind::Up, i as f32, t0));
        }
        frame(&mut button, &mut router, &mut ops, t0);
        assert_eq!(button.clicks(), 20);
        assert_eq!(button.history().count(), HISTORY_LEN);
        assert_eq!(button.history().next().map(|c| c.position.x), Some(4.0));
    }
}
