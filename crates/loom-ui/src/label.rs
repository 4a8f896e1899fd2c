use loom_core::{Context, Dimensions, Ops, PaintOp, Rect, StackOp, TextOp, TransformOp, Value, Vec2};

use crate::text::{Shaper, TextLayout};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    Middle,
    End,
}

/// Lays out and draws text with the current color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Label {
    pub alignment: TextAlign,
    /// Zero means unlimited.
    pub max_lines: usize,
}

impl Label {
    pub fn layout(
        &self,
        gtx: &mut Context<'_>,
        shaper: &dyn Shaper,
        size: Value,
        text: &str,
    ) -> Dimensions {
        let px = gtx.px(size) as f32;
        let cs = gtx.constraints;
        let mut tl = shaper.layout(text, px, cs.width.max);
        if self.max_lines > 0 {
            tl.lines.truncate(self.max_lines);
        }
        let size = cs.constrain(tl.size());
        paint_lines(gtx.ops, &tl, text, px, self.alignment, size.x);
        log::trace!("label: {} lines in {:?}", tl.lines.len(), size);
        let baseline = tl
            .lines
            .first()
            .map(|l| l.ascent.round() as i32)
            .unwrap_or(size.y);
        Dimensions { size, baseline }
    }
}

/// Draws the lines of `tl`, aligned within `width`.
pub(crate) fn paint_lines(
    ops: &mut Ops,
    tl: &TextLayout,
    text: &str,
    px: f32,
    align: TextAlign,
    width: i32,
) {
    for (i, line) in tl.lines.iter().enumerate() {
        let Some(s) = text.get(line.range.clone()).filter(|s| !s.is_empty()) else {
            continue;
        };
        let free = width as f32 - line.width;
        let x = match align {
            TextAlign::Start => 0.0,
            TextAlign::Middle => (free * 0.5).floor(),
            TextAlign::End => free,
        };
        let y = i as f32 * tl.line_height + line.ascent;
        let stack = StackOp::push(ops);
        TransformOp::offset(Vec2::new(x, y)).add(ops);
        TextOp::new(s, px).add(ops);
        PaintOp {
            rect: Rect::new(0.0, -line.ascent, line.width, line.height()),
        }
        .add(ops);
        stack.pop(ops);
    }
}
