//! Drawing operations.
//!
//! `ColorOp` and `ImageOp` set the current brush, `PaintOp` fills a rectangle
//! with it, or the glyphs of the current `TextOp`. Brush and text, like the
//! transform, are scoped by `StackOp`.

use std::fmt;
use std::sync::Arc;

use crate::color::Color;
use crate::geometry::{Point, Rect};
use crate::ops::{EncodedOp, OpKind, OpRef, Ops, get_f32, put_f32};

#[derive(Debug, PartialEq, Eq)]
struct ImageData {
    size: Point,
    rgba: Vec<u8>,
}

/// Shared handle to decoded RGBA8 pixels.
///
/// Handles compare by identity: two handles are equal only if they refer to
/// the same upload.
#[derive(Clone)]
pub struct ImageHandle(Arc<ImageData>);

impl ImageHandle {
    /// Wraps `rgba` pixels of `size`. Returns `None` when the buffer length
    /// does not match.
    pub fn new(size: Point, rgba: Vec<u8>) -> Option<Self> {
        let expected = size.x.max(0) as usize * size.y.max(0) as usize * 4;
        (rgba.len() == expected).then(|| ImageHandle(Arc::new(ImageData { size, rgba })))
    }

    pub fn size(&self) -> Point {
        self.0.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.0.rgba
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageHandle({}x{})", self.0.size.x, self.0.size.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorOp {
    pub color: Color,
}

impl ColorOp {
    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(OpKind::Color, OpKind::Color.payload_len(), []);
        data.copy_from_slice(&self.color.to_bytes());
    }

    pub fn decode(op: &EncodedOp<'_>) -> Self {
        let d = op.payload;
        ColorOp {
            color: Color::from_bytes([d[0], d[1], d[2], d[3]]),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageOp {
    pub handle: ImageHandle,
}

impl ImageOp {
    pub fn add(&self, ops: &mut Ops) {
        ops.write(OpKind::Image, 0, [OpRef::Image(self.handle.clone())]);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Option<Self> {
        match op.refs.first() {
            Some(OpRef::Image(handle)) => Some(ImageOp {
                handle: handle.clone(),
            }),
            _ => None,
        }
    }
}

/// Fills `rect` with the current brush.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintOp {
    pub rect: Rect,
}

impl PaintOp {
    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(OpKind::Paint, OpKind::Paint.payload_len(), []);
        put_rect(data, self.rect);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Self {
        PaintOp {
            rect: get_rect(op.payload),
        }
    }
}

/// Restricts drawing in the current scope to a rounded rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipOp {
    pub rect: Rect,
    pub radius: f32,
}

impl ClipOp {
    pub fn rect(rect: Rect) -> Self {
        ClipOp { rect, radius: 0.0 }
    }

    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(OpKind::Clip, OpKind::Clip.payload_len(), []);
        put_rect(data, self.rect);
        put_f32(&mut data[16..], self.radius);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Self {
        ClipOp {
            rect: get_rect(op.payload),
            radius: get_f32(&op.payload[16..]),
        }
    }
}

/// Restricts the following `PaintOp`s in the current scope to the glyphs of
/// a text run. The baseline origin is the current transform's origin; glyph
/// rendering is up to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub text: Arc<str>,
    /// Pixel size.
    pub size: f32,
}

impl TextOp {
    pub fn new(text: impl Into<Arc<str>>, size: f32) -> Self {
        TextOp {
            text: text.into(),
            size,
        }
    }

    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(
            OpKind::Text,
            OpKind::Text.payload_len(),
            [OpRef::Text(self.text.clone())],
        );
        put_f32(data, self.size);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Option<Self> {
        match op.refs.first() {
            Some(OpRef::Text(text)) => Some(TextOp {
                text: text.clone(),
                size: get_f32(op.payload),
            }),
            _ => None,
        }
    }
}

pub(crate) fn put_rect(b: &mut [u8], r: Rect) {
    put_f32(&mut b[0..], r.x);
    put_f32(&mut b[4..], r.y);
    put_f32(&mut b[8..], r.w);
    put_f32(&mut b[12..], r.h);
}

pub(crate) fn get_rect(b: &[u8]) -> Rect {
    Rect::new(
        get_f32(&b[0..]),
        get_f32(&b[4..]),
        get_f32(&b[8..]),
        get_f32(&b[12..]),
    )
}

/// Fills `rect` with `color` in its own scope.
pub fn fill(ops: &mut Ops, rect: Rect, color: Color) {
    let stack = crate::ops::StackOp::push(ops);
    ColorOp { color }.add(ops);
    PaintOp { rect }.add(ops);
    stack.pop(ops);
}

/// Fills a rounded rectangle; `radius` is clamped to half the shorter side.
pub fn fill_rounded(ops: &mut Ops, rect: Rect, radius: f32, color: Color) {
    let stack = crate::ops::StackOp::push(ops);
    ClipOp {
        rect,
        radius: radius.clamp(0.0, rect.w.min(rect.h) * 0.5),
    }
    .add(ops);
    ColorOp { color }.add(ops);
    PaintOp { rect }.add(ops);
    stack.pop(ops);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_handles_compare_by_identity() {
        let a = ImageHandle::new(Point::new(1, 1), vec![0; 4]).unwrap();
        let b = ImageHandle::new(Point::new(1, 1), vec![0; 4]).unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn image_handle_rejects_short_buffer() {
        assert!(ImageHandle::new(Point::new(2, 2), vec![0; 15]).is_none());
    }

    #[test]
    fn text_and_clip_decode() {
        let mut ops = Ops::new();
        TextOp::new("héllo", 14.0).add(&mut ops);
        ClipOp {
            rect: Rect::new(0.0, 0.0, 8.0, 8.0),
            radius: 2.5,
        }
        .add(&mut ops);

        let mut r = ops.reader();
        let text = TextOp::decode(&r.next().unwrap().unwrap()).unwrap();
        assert_eq!(&*text.text, "héllo");
        assert_eq!(text.size, 14.0);
        let clip = ClipOp::decode(&r.next().unwrap().unwrap());
        assert_eq!(clip.radius, 2.5);
        assert_eq!(clip.rect, Rect::new(0.0, 0.0, 8.0, 8.0));
    }
}
