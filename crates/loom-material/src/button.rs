use std::rc::Rc;
use std::time::Duration;

use loom_core::{
    AreaOp, ClipOp, Color, ColorOp, Context, Dimensions, Direction, InvalidateOp, Inset, PaintOp,
    Point, Rect, Stack, StackChild, StackOp, TransformOp, Value, Vec2, dp, fill_rounded, px,
};
use loom_ui::{Button, ClickRecord, Label, Shaper};

use crate::icon::Icon;

/// How long a click ripple lasts.
pub const INK_DURATION: Duration = Duration::from_millis(500);

/// A text button. Built by [`Theme::button`](crate::Theme::button).
#[derive(Clone)]
pub struct ButtonStyle {
    pub text: String,
    /// Text color.
    pub color: Color,
    pub background: Color,
    /// Background while disabled.
    pub inactive: Color,
    /// Disabled buttons ignore input.
    pub enabled: bool,
    pub text_size: Value,
    pub corner_radius: Value,
    pub inset: Value,
    pub(crate) shaper: Rc<dyn Shaper>,
}

#[derive(Clone, Debug)]
pub struct IconButtonStyle {
    pub background: Color,
    pub icon: Option<Icon>,
    pub size: Value,
    pub padding: Value,
}

fn background(base: Color, button: &Button) -> Color {
    if button.active() {
        base.darken(0.8)
    } else {
        base
    }
}

/// Draws a growing, fading circle for a click younger than [`INK_DURATION`]
/// and asks for another frame.
pub fn draw_ink(gtx: &mut Context<'_>, click: &ClickRecord) {
    let age = gtx.now().saturating_duration_since(click.time);
    if age > INK_DURATION {
        return;
    }
    let t = age.as_secs_f32() / INK_DURATION.as_secs_f32();
    let size = gtx.px(dp(700.0)) as f32 * t;
    let r = size * 0.5;
    let alpha = (0xaa as f32 * (1.0 - t * t)) as u8;
    log::trace!("ink: at {:?}, {:.2} through", click.position, t);

    let stack = StackOp::push(gtx.ops);
    TransformOp::offset(click.position - Vec2::new(r, r)).add(gtx.ops);
    fill_rounded(
        gtx.ops,
        Rect::new(0.0, 0.0, size, size),
        r,
        Color::WHITE.with_alpha(alpha),
    );
    stack.pop(gtx.ops);
    InvalidateOp.add(gtx.ops);
}

/// Fills the clip with `color` and draws the ink of `history` on top.
fn background_with_ink(
    gtx: &mut Context<'_>,
    rect: Rect,
    radius: f32,
    color: Color,
    history: &[ClickRecord],
) {
    let stack = StackOp::push(gtx.ops);
    ClipOp { rect, radius }.add(gtx.ops);
    ColorOp { color }.add(gtx.ops);
    PaintOp { rect }.add(gtx.ops);
    for click in history {
        draw_ink(gtx, click);
    }
    stack.pop(gtx.ops);
}

impl ButtonStyle {
    pub fn layout(&self, gtx: &mut Context<'_>, button: &mut Button) -> Dimensions {
        button.update(gtx);
        let bg = if self.enabled {
            background(self.background, button)
        } else {
            self.inactive
        };
        let history: Vec<ClickRecord> = button.history().copied().collect();

        let dims = Stack::new(Direction::Center).layout(
            gtx,
            vec![
                StackChild::expanded(|gtx| {
                    let size = gtx.constraints.min();
                    let radius = gtx.px(self.corner_radius) as f32;
                    let rect = Rect::from_size(size);
                    let radius = radius.min(rect.w.min(rect.h) * 0.5);
                    background_with_ink(gtx, rect, radius, bg, &history);
                    Dimensions::new(size)
                }),
                StackChild::rigid(|gtx| {
                    Direction::Center.layout(gtx, |gtx| {
                        Inset::uniform(self.inset).layout(gtx, |gtx| {
                            let stack = StackOp::push(gtx.ops);
                            ColorOp { color: self.color }.add(gtx.ops);
                            let dims = Label::default().layout(
                                gtx,
                                &*self.shaper,
                                self.text_size,
                                &self.text,
                            );
                            stack.pop(gtx.ops);
                            dims
                        })
                    })
                }),
            ],
        );

        if self.enabled {
            let stack = StackOp::push(gtx.ops);
            AreaOp::rect(Rect::from_size(dims.size)).add(gtx.ops);
            button.layout(gtx);
            stack.pop(gtx.ops);
        }
        dims
    }
}

impl IconButtonStyle {
    pub fn layout(&self, gtx: &mut Context<'_>, button: &mut Button) -> Dimensions {
        button.update(gtx);
        let bg = background(self.background, button);
        let history: Vec<ClickRecord> = button.history().copied().collect();
        let inner = (gtx.px(self.size) - 2 * gtx.px(self.padding)).max(0);

        let dims = Stack::new(Direction::NW).layout(
            gtx,
            vec![
                StackChild::expanded(|gtx| {
                    let size = gtx.constraints.min();
                    let rect = Rect::from_size(size);
                    background_with_ink(gtx, rect, rect.w.min(rect.h) * 0.5, bg, &history);
                    Dimensions::new(size)
                }),
                StackChild::rigid(|gtx| {
                    Inset::uniform(self.padding).layout(gtx, |gtx| {
                        if let Some(icon) = &self.icon {
                            icon.layout(gtx, px(inner as f32));
                        }
                        Dimensions::new(gtx.constraints.constrain(Point::new(inner, inner)))
                    })
                }),
            ],
        );

        let stack = StackOp::push(gtx.ops);
        AreaOp::ellipse(Rect::from_size(dims.size)).add(gtx.ops);
        button.layout(gtx);
        stack.pop(gtx.ops);
        dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Theme;
    use loom_core::{
        Config, Constraints, InputEvent, Ops, PointerEvent, PointerEventKind, Router, Scene,
        SceneNode, ops::OpKind,
    };
    use loom_ui::MonospaceShaper;
    use web_time::Instant;

    struct Harness {
        router: Router,
        ops: Ops,
        theme: Theme,
    }

    impl Harness {
        fn new() -> Self {
            Harness {
                router: Router::new(),
                ops: Ops::new(),
                theme: Theme::new(Rc::new(MonospaceShaper::default())),
            }
        }

        fn frame(&mut self, button: &mut Button, now: Instant) -> Dimensions {
            self.ops.reset();
            let mut gtx = Context::new(
                &mut self.ops,
                &mut self.router,
                Config::new(1.0, now),
                Point::new(400, 400),
            );
            gtx.constraints = Constraints::loose(Point::new(400, 400));
            let dims = self.theme.button("Click me!").layout(&mut gtx, button);
            self.router.frame(&self.ops).unwrap();
            dims
        }

        fn pointer(&mut self, kind: PointerEventKind, at: Vec2, time: Instant) {
            self.router
                .add(InputEvent::Pointer(PointerEvent::new(kind, at, time)));
        }
    }

    #[test]
    fn button_is_label_plus_insets() {
        let mut h = Harness::new();
        let mut button = Button::new();
        let dims = h.frame(&mut button, Instant::now());
        // 9 graphemes at 7px each, 14px text with 17.5px lines, 16px inset.
        assert_eq!(dims.size, Point::new(63 + 32, 18 + 32));
        let scene = Scene::from_ops(&h.ops).unwrap();
        assert!(matches!(
            scene.nodes.first(),
            Some(SceneNode::Fill { color, .. }) if *color == Color::rgb(0x3f51b5)
        ));
        assert!(!scene.redraw);
    }

    #[test]
    fn click_draws_ink_and_invalidates() {
        let mut h = Harness::new();
        let mut button = Button::new();
        let t0 = Instant::now();
        h.frame(&mut button, t0);
        h.pointer(PointerEventKind::Down, Vec2::new(20.0, 20.0), t0);
        h.pointer(PointerEventKind::Up, Vec2::new(20.0, 20.0), t0);
        h.frame(&mut button, t0 + Duration::from_millis(100));
        assert!(button.clicked());

        let has_invalidate = h
            .ops
            .reader()
            .any(|op| matches!(op, Ok(op) if op.kind == OpKind::Invalidate));
        assert!(has_invalidate);
        let scene = Scene::from_ops(&h.ops).unwrap();
        assert!(scene.redraw);
        let ink = scene.nodes.iter().any(|n| {
            matches!(n, SceneNode::Fill { color, .. } if color.0 == 255 && color.3 < 0xaa)
        });
        assert!(ink);

        h.frame(&mut button, t0 + Duration::from_secs(1));
        assert!(!Scene::from_ops(&h.ops).unwrap().redraw);
    }

    #[test]
    fn pressed_background_is_darker() {
        let mut h = Harness::new();
        let mut button = Button::new();
        let t0 = Instant::now();
        h.frame(&mut button, t0);
        h.pointer(PointerEventKind::Down, Vec2::new(5.0, 5.0), t0);
        h.frame(&mut button, t0);
        assert!(button.active());
        let scene = Scene::from_ops(&h.ops).unwrap();
        assert!(matches!(
            scene.nodes.first(),
            Some(SceneNode::Fill { color, .. }) if *color == Color::rgb(0x3f51b5).darken(0.8)
        ));
    }

    #[test]
    fn disabled_button_ignores_input() {
        let mut h = Harness::new();
        let mut button = Button::new();
        let t0 = Instant::now();
        let mut style = h.theme.button("Disabled");
        style.enabled = false;
        let frame = |h: &mut Harness, button: &mut Button| {
            h.ops.reset();
            let mut gtx =
                Context::new(&mut h.ops, &mut h.router, Config::new(1.0, t0), Point::new(400, 400));
            gtx.constraints = Constraints::loose(Point::new(400, 400));
            style.layout(&mut gtx, button);
            h.router.frame(&h.ops).unwrap();
        };
        frame(&mut h, &mut button);
        h.pointer(PointerEventKind::Down, Vec2::new(5.0, 5.0), t0);
        h.pointer(PointerEventKind::Up, Vec2::new(5.0, 5.0), t0);
        frame(&mut h, &mut button);
        assert!(!button.clicked());
        let scene = Scene::from_ops(&h.ops).unwrap();
        assert!(matches!(
            scene.nodes.first(),
            Some(SceneNode::Fill { color, .. }) if *color == Color::rgb(0xcccccc)
        ));
    }

    #[test]
    fn icon_button_is_round() {
        let mut router = Router::new();
        let mut ops = Ops::new();
        let theme = Theme::new(Rc::new(MonospaceShaper::default()));
        let icon = Icon::from_rgba(Point::new(2, 2), vec![255; 16]).unwrap();
        let mut button = Button::new();
        let t0 = Instant::now();

        let frame = |button: &mut Button, ops: &mut Ops, router: &mut Router| {
            ops.reset();
            let mut gtx = Context::new(ops, router, Config::new(1.0, t0), Point::new(400, 400));
            gtx.constraints = Constraints::loose(Point::new(400, 400));
            let dims = theme.icon_button(Some(icon.clone())).layout(&mut gtx, button);
            router.frame(ops).unwrap();
            dims
        };
        let dims = frame(&mut button, &mut ops, &mut router);
        assert_eq!(dims.size, Point::new(56, 56));

        // Inside the bounding box but outside the circle.
        router.add(InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Down,
            Vec2::new(2.0, 2.0),
            t0,
        )));
        router.add(InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Up,
            Vec2::new(2.0, 2.0),
            t0,
        )));
        frame(&mut button, &mut ops, &mut router);
        assert!(!button.clicked());

        router.add(InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Down,
            Vec2::new(28.0, 28.0),
            t0,
        )));
        router.add(InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Up,
            Vec2::new(28.0, 28.0),
            t0,
        )));
        frame(&mut button, &mut ops, &mut router);
        assert!(button.clicked());

        let scene = Scene::from_ops(&ops).unwrap();
        assert!(scene.nodes.iter().any(|n| matches!(n, SceneNode::Image { .. })));
    }
}
