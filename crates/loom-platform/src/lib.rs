//! Windows and the frame loop.
//!
//! [`Window::new`] returns the application half and the [`Driver`] half of
//! a window, joined by channels. The application pulls one [`Event`] at a
//! time; input never surfaces as an event, it is routed to handlers
//! internally and answered with a redraw request.
//!
//! ```rust,ignore
//! let (window, driver) = Window::new();
//! std::thread::spawn(move || backend_loop(driver));
//! loom_platform::run(window, |gtx| kitchen(gtx, &mut state))?;
//! ```

mod driver;

use crossbeam_channel::{Sender, unbounded};
use loom_core::{
    Config, Context, Event as HandlerEvent, Ops, Point, Queue, Router, Scene, Tag,
    TextInputState,
};

use crate::driver::Message;
pub use crate::driver::{Driver, PresentedFrame, Request};

/// The application half of a window.
#[derive(Debug)]
pub struct Window {
    rx: crossbeam_channel::Receiver<Message>,
    tx: Sender<Request>,
    queue: WindowQueue,
}

/// Routed events of a window, drained by widgets during layout.
#[derive(Debug, Default)]
pub struct WindowQueue {
    router: Router,
}

impl Queue for WindowQueue {
    fn events(&mut self, tag: Tag) -> Vec<HandlerEvent> {
        self.router.events(tag)
    }
}

#[derive(Debug)]
pub enum Event<'a> {
    Frame(FrameEvent<'a>),
    Destroy(DestroyEvent),
}

/// Time to lay out a frame. Lay out against [`FrameEvent::queue`], then
/// hand the ops to [`FrameEvent::frame`].
#[derive(Debug)]
pub struct FrameEvent<'a> {
    pub config: Config,
    pub size: Point,
    queue: &'a mut WindowQueue,
    tx: &'a Sender<Request>,
}

/// The window is gone. `err` is why, if it did not close normally.
#[derive(Debug)]
pub struct DestroyEvent {
    pub err: Option<anyhow::Error>,
}

impl Window {
    pub fn new() -> (Window, Driver) {
        let (msg_tx, msg_rx) = unbounded();
        let (req_tx, req_rx) = unbounded();
        log::info!("window: created");
        (
            Window {
                rx: msg_rx,
                tx: req_tx,
                queue: WindowQueue::default(),
            },
            Driver {
                tx: msg_tx,
                rx: req_rx,
            },
        )
    }

    /// Blocks until the next frame or the end of the window. A dropped
    /// driver reads as a normal close.
    pub fn next_event(&mut self) -> Event<'_> {
        loop {
            match self.rx.recv() {
                Ok(Message::Frame { size, config }) => {
                    log::trace!("window: frame {:?}", size);
                    return Event::Frame(FrameEvent {
                        config,
                        size,
                        queue: &mut self.queue,
                        tx: &self.tx,
                    });
                }
                Ok(Message::Input(e)) => {
                    if self.queue.router.add(e) {
                        self.request(Request::Redraw);
                    }
                }
                Ok(Message::Destroy(err)) => {
                    match &err {
                        Some(e) => log::info!("window: destroyed: {e:#}"),
                        None => log::info!("window: destroyed"),
                    }
                    return Event::Destroy(DestroyEvent { err });
                }
                Err(_) => {
                    log::info!("window: driver dropped");
                    return Event::Destroy(DestroyEvent { err: None });
                }
            }
        }
    }

    /// Asks the driver for another frame.
    pub fn invalidate(&self) {
        self.request(Request::Redraw);
    }

    fn request(&self, r: Request) {
        if self.tx.send(r).is_err() {
            log::debug!("window: driver gone, request dropped");
        }
    }
}

impl FrameEvent<'_> {
    pub fn queue(&mut self) -> &mut dyn Queue {
        &mut *self.queue
    }

    /// Routes the handlers declared in `ops` and presents the frame.
    ///
    /// # Panics
    ///
    /// If `ops` is malformed, e.g. a stack left open.
    pub fn frame(self, ops: &Ops) {
        let router = &mut self.queue.router;
        let scene = match router.frame(ops).and_then(|()| Scene::from_ops(ops)) {
            Ok(scene) => scene,
            Err(e) => panic!("window: invalid frame: {e}"),
        };
        let redraw = router.wakeup();
        let text_input = router.take_text_input();
        let send = |r: Request| {
            if self.tx.send(r).is_err() {
                log::debug!("window: driver gone, frame dropped");
            }
        };
        if text_input != TextInputState::Keep {
            log::debug!("window: text input {:?}", text_input);
            send(Request::TextInput(text_input));
        }
        send(Request::Present(PresentedFrame {
            size: self.size,
            scene,
            redraw,
        }));
    }
}

/// Runs `f` for every frame of `window` until it is destroyed. Returns the
/// destroy error, if any.
pub fn run(mut window: Window, mut f: impl FnMut(&mut Context<'_>)) -> anyhow::Result<()> {
    let mut ops = Ops::new();
    loop {
        match window.next_event() {
            Event::Destroy(e) => return e.err.map_or(Ok(()), Err),
            Event::Frame(mut e) => {
                ops.reset();
                let (config, size) = (e.config, e.size);
                let mut gtx = Context::new(&mut ops, e.queue(), config, size);
                f(&mut gtx);
                e.frame(&ops);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use loom_core::{
        AreaOp, Click, ClickKind, InputEvent, KeyInputOp, PointerEvent, PointerEventKind, Rect,
        StackOp, Vec2,
    };
    use web_time::Instant;

    fn config() -> Config {
        Config::new(1.0, Instant::now())
    }

    fn pointer(kind: PointerEventKind, x: f32) -> InputEvent {
        InputEvent::Pointer(PointerEvent::new(kind, Vec2::new(x, 5.0), Instant::now()))
    }

    #[test]
    fn destroy_error_comes_out_of_run() {
        let (window, driver) = Window::new();
        driver.frame(Point::new(10, 10), config()).unwrap();
        driver.destroy(Some(anyhow!("surface lost"))).unwrap();
        let mut frames = 0;
        let err = run(window, |_| frames += 1).unwrap_err();
        assert_eq!(err.to_string(), "surface lost");
        assert_eq!(frames, 1);
    }

    #[test]
    fn dropped_driver_ends_the_loop() {
        let (window, driver) = Window::new();
        drop(driver);
        assert!(run(window, |_| {}).is_ok());
    }

    #[test]
    fn input_is_routed_between_frames() {
        let (window, driver) = Window::new();
        let size = Point::new(100, 20);
        driver.frame(size, config()).unwrap();
        driver.input(pointer(PointerEventKind::Down, 10.0)).unwrap();
        driver.input(pointer(PointerEventKind::Up, 10.0)).unwrap();
        driver.input(pointer(PointerEventKind::Down, 500.0)).unwrap();
        driver.frame(size, config()).unwrap();
        driver.destroy(None).unwrap();

        let mut click = Click::new();
        let mut clicks = 0;
        run(window, |gtx| {
            clicks += click
                .events(gtx.queue)
                .iter()
                .filter(|e| e.kind == ClickKind::Click)
                .count();
            let stack = StackOp::push(gtx.ops);
            AreaOp::rect(Rect::new(0.0, 0.0, 100.0, 20.0)).add(gtx.ops);
            click.add(gtx.ops);
            stack.pop(gtx.ops);
        })
        .unwrap();
        assert_eq!(clicks, 1);

        let requests = driver.pending();
        let kinds: Vec<&str> = requests
            .iter()
            .map(|r| match r {
                Request::Present(_) => "present",
                Request::Redraw => "redraw",
                Request::TextInput(_) => "text",
            })
            .collect();
        assert_eq!(kinds, vec!["present", "redraw", "redraw", "present"]);
    }

    #[test]
    fn focus_opens_the_soft_keyboard() {
        let (window, driver) = Window::new();
        driver.frame(Point::new(10, 10), config()).unwrap();
        driver.destroy(None).unwrap();
        let tag = Tag::new();
        run(window, |gtx| KeyInputOp { tag, focus: true }.add(gtx.ops)).unwrap();
        assert_eq!(
            driver.try_recv(),
            Some(Request::TextInput(TextInputState::Open))
        );
        assert!(matches!(driver.try_recv(), Some(Request::Present(_))));
    }

    #[test]
    #[should_panic(expected = "invalid frame")]
    fn unbalanced_frame_panics() {
        let (window, driver) = Window::new();
        driver.frame(Point::new(10, 10), config()).unwrap();
        run(window, |gtx| {
            let _open = StackOp::push(gtx.ops);
        })
        .unwrap();
    }
}
