//! Stands in for a windowing backend: asks for frames and plays a short
//! scripted session against what it sees.

use anyhow::{Context as _, bail};
use loom_core::{
    Config, EditEvent, InputEvent, Key, KeyEvent, Point, PointerEvent, PointerEventKind, Scene,
    SceneNode, Vec2,
};
use loom_platform::{Driver, Request};
use web_time::Instant;

const SIZE: Point = Point::new(800, 600);

fn frame(driver: &Driver) -> anyhow::Result<Scene> {
    driver.frame(SIZE, Config::new(1.0, Instant::now()))?;
    loop {
        match driver.recv() {
            Some(Request::Present(f)) => {
                log::info!(
                    "driver: presented {} nodes{}",
                    f.scene.nodes.len(),
                    if f.redraw { ", redraw" } else { "" }
                );
                return Ok(f.scene);
            }
            Some(r) => log::debug!("driver: {:?}", r),
            None => bail!("window closed before presenting"),
        }
    }
}

/// Baseline origin of the first text run reading `text`.
fn find(scene: &Scene, text: &str) -> anyhow::Result<Vec2> {
    scene
        .nodes
        .iter()
        .find_map(|n| match n {
            SceneNode::Text {
                origin, text: t, ..
            } if &**t == text => Some(*origin),
            _ => None,
        })
        .with_context(|| format!("no text {text:?} on screen"))
}

fn tap(driver: &Driver, at: Vec2) -> anyhow::Result<()> {
    let at = at + Vec2::new(2.0, -2.0);
    driver.input(InputEvent::Pointer(PointerEvent::new(
        PointerEventKind::Down,
        at,
        Instant::now(),
    )))?;
    driver.input(InputEvent::Pointer(PointerEvent::new(
        PointerEventKind::Up,
        at,
        Instant::now(),
    )))
}

pub fn play(driver: Driver) -> anyhow::Result<()> {
    let scene = frame(&driver)?;
    let heading = find(&scene, "Hello, Loom")?;

    tap(&driver, find(&scene, "Click me!")?)?;
    let scene = frame(&driver)?;
    find(&scene, "Enabled")?;

    tap(&driver, find(&scene, "Hint")?)?;
    frame(&driver)?;
    driver.input(InputEvent::Edit(EditEvent {
        text: "Hi from the driver".into(),
    }))?;
    driver.input(InputEvent::Key(KeyEvent::press(Key::Enter, Instant::now())))?;
    frame(&driver)?;
    let scene = frame(&driver)?;
    find(&scene, "Hi from the driver")?;

    driver.input(InputEvent::Pointer(PointerEvent::scroll(
        heading,
        Vec2::new(0.0, 40.0),
        Instant::now(),
    )))?;
    let scene = frame(&driver)?;
    if let Ok(p) = find(&scene, "Hi from the driver") {
        log::info!("driver: heading moved from {} to {}", heading.y, p.y);
    }

    driver.destroy(None)
}
