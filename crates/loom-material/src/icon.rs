use loom_core::{Context, Dimensions, ImageHandle, ImageOp, PaintOp, Point, Rect, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IconError {
    #[error("icon has no pixels ({0}x{1})")]
    Empty(i32, i32),
    #[error("expected {expected} bytes of RGBA, got {found}")]
    Length { expected: usize, found: usize },
}

/// An already rasterized image drawn as a square-ish icon.
#[derive(Clone, Debug, PartialEq)]
pub struct Icon {
    image: ImageHandle,
}

impl Icon {
    pub fn new(image: ImageHandle) -> Self {
        Icon { image }
    }

    pub fn from_rgba(size: Point, rgba: Vec<u8>) -> Result<Self, IconError> {
        if size.x <= 0 || size.y <= 0 {
            return Err(IconError::Empty(size.x, size.y));
        }
        let expected = size.x as usize * size.y as usize * 4;
        let found = rgba.len();
        ImageHandle::new(size, rgba)
            .map(Icon::new)
            .ok_or(IconError::Length { expected, found })
    }

    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    /// Draws the icon `size` wide, keeping the aspect ratio.
    pub fn layout(&self, gtx: &mut Context<'_>, size: Value) -> Dimensions {
        let w = gtx.px(size);
        let src = self.image.size();
        let h = (w as f32 * src.y as f32 / src.x.max(1) as f32).round() as i32;
        ImageOp {
            handle: self.image.clone(),
        }
        .add(gtx.ops);
        PaintOp {
            rect: Rect::new(0.0, 0.0, w as f32, h as f32),
        }
        .add(gtx.ops);
        Dimensions::new(gtx.constraints.constrain(Point::new(w, h)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_buffers() {
        assert_eq!(
            Icon::from_rgba(Point::new(0, 4), vec![]),
            Err(IconError::Empty(0, 4))
        );
        assert_eq!(
            Icon::from_rgba(Point::new(2, 2), vec![0; 12]),
            Err(IconError::Length {
                expected: 16,
                found: 12
            })
        );
        assert!(Icon::from_rgba(Point::new(2, 2), vec![0; 16]).is_ok());
    }
}
