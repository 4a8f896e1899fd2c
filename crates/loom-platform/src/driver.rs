//! The backend side of a window.
//!
//! A windowing backend (or a test) owns the [`Driver`]: it reports sizes,
//! input and the end of the window, and receives presented frames and
//! requests in return.

use anyhow::anyhow;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use loom_core::{Config, InputEvent, Point, Scene, TextInputState};

/// Driver to window.
#[derive(Debug)]
pub(crate) enum Message {
    Frame { size: Point, config: Config },
    Input(InputEvent),
    Destroy(Option<anyhow::Error>),
}

/// A frame handed back by the application.
#[derive(Clone, Debug, PartialEq)]
pub struct PresentedFrame {
    pub size: Point,
    pub scene: Scene,
    /// The frame asked to be redrawn soon.
    pub redraw: bool,
}

/// Window to driver.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Present(PresentedFrame),
    /// Input changed some handler's queue; a new frame should follow.
    Redraw,
    /// Show or hide the soft keyboard.
    TextInput(TextInputState),
}

#[derive(Debug)]
pub struct Driver {
    pub(crate) tx: Sender<Message>,
    pub(crate) rx: Receiver<Request>,
}

impl Driver {
    fn send(&self, m: Message) -> anyhow::Result<()> {
        self.tx.send(m).map_err(|_| anyhow!("window is gone"))
    }

    /// Asks for a frame of `size` pixels.
    pub fn frame(&self, size: Point, config: Config) -> anyhow::Result<()> {
        self.send(Message::Frame { size, config })
    }

    pub fn input(&self, e: InputEvent) -> anyhow::Result<()> {
        self.send(Message::Input(e))
    }

    /// Ends the window's event loop. `err` comes back out of `run`.
    pub fn destroy(&self, err: Option<anyhow::Error>) -> anyhow::Result<()> {
        self.send(Message::Destroy(err))
    }

    /// Blocks for the next request. `None` once the window is dropped.
    pub fn recv(&self) -> Option<Request> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Request> {
        match self.rx.try_recv() {
            Ok(r) => Some(r),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains the requests sent so far.
    pub fn pending(&self) -> Vec<Request> {
        self.rx.try_iter().collect()
    }
}
