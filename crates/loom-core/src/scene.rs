use std::fmt;
use std::sync::Arc;

use crate::color::Color;
use crate::error::OpsError;
use crate::geometry::{Rect, Vec2};
use crate::ops::{OpKind, Ops};
use crate::paint::{ColorOp, ImageHandle, ImageOp, PaintOp, TextOp};
use crate::stack::{Clip, Replay};

#[derive(Clone, Debug, PartialEq)]
enum Brush {
    Color(Color),
    Image(ImageHandle),
}

/// A flattened drawing primitive in device coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    Fill {
        rect: Rect,
        color: Color,
        clip: Option<Clip>,
    },
    Image {
        rect: Rect,
        image: ImageHandle,
        clip: Option<Clip>,
    },
    Text {
        origin: Vec2,
        text: Arc<str>,
        size: f32,
        color: Color,
        clip: Option<Clip>,
    },
}

/// What a renderer needs from one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    /// The frame contained an `InvalidateOp`.
    pub redraw: bool,
}

impl Scene {
    pub fn from_ops(ops: &Ops) -> Result<Scene, OpsError> {
        let mut scene = Scene::default();
        let mut brush = Brush::Color(Color::BLACK);
        let mut text: Option<(Vec2, TextOp)> = None;
        let mut saved = Vec::new();

        for r in Replay::new(ops) {
            let r = r?;
            let st = r.state;
            match r.op.kind {
                OpKind::Push => saved.push((brush.clone(), text.clone())),
                OpKind::Pop => {
                    if let Some((b, t)) = saved.pop() {
                        brush = b;
                        text = t;
                    }
                }
                OpKind::Color => brush = Brush::Color(ColorOp::decode(&r.op).color),
                OpKind::Image => {
                    if let Some(img) = ImageOp::decode(&r.op) {
                        brush = Brush::Image(img.handle);
                    }
                }
                OpKind::Text => {
                    text = TextOp::decode(&r.op).map(|t| (st.transform.apply(Vec2::ZERO), t));
                }
                OpKind::Paint => {
                    let rect = st.transform.apply_rect(PaintOp::decode(&r.op).rect);
                    if st.clip.is_some_and(|c| c.rect.intersect(&rect).is_empty()) {
                        continue;
                    }
                    scene.nodes.push(match (&text, &brush) {
                        (Some((origin, t)), brush) => SceneNode::Text {
                            origin: *origin,
                            text: t.text.clone(),
                            size: t.size,
                            color: match brush {
                                Brush::Color(c) => *c,
                                Brush::Image(_) => Color::BLACK,
                            },
                            clip: st.clip,
                        },
                        (None, Brush::Color(color)) => SceneNode::Fill {
                            rect,
                            color: *color,
                            clip: st.clip,
                        },
                        (None, Brush::Image(image)) => SceneNode::Image {
                            rect,
                            image: image.clone(),
                            clip: st.clip,
                        },
                    });
                }
                OpKind::Invalidate => scene.redraw = true,
                _ => {}
            }
        }
        Ok(scene)
    }
}

fn write_clip(f: &mut fmt::Formatter<'_>, clip: &Option<Clip>) -> fmt::Result {
    if let Some(c) = clip {
        write!(f, " clip {}", c.rect)?;
        if c.radius > 0.0 {
            write!(f, " r{}", c.radius)?;
        }
    }
    Ok(())
}

impl fmt::Display for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneNode::Fill { rect, color, clip } => {
                write!(f, "fill {rect} {color}")?;
                write_clip(f, clip)
            }
            SceneNode::Image { rect, image, clip } => {
                let s = image.size();
                write!(f, "image {rect} src {}x{}", s.x, s.y)?;
                write_clip(f, clip)
            }
            SceneNode::Text {
                origin,
                text,
                size,
                color,
                clip,
            } => {
                write!(f, "text {},{} {size}px {color} {text:?}", origin.x, origin.y)?;
                write_clip(f, clip)
            }
        }
    }
}

/// One node per line.
impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.nodes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{n}")?;
        }
        if self.redraw {
            if !self.nodes.is_empty() {
                writeln!(f)?;
            }
            write!(f, "redraw")?;
        }
        Ok(())
    }
}
