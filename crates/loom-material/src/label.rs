use std::rc::Rc;

use loom_core::{Color, ColorOp, Context, Dimensions, StackOp, Value};
use loom_ui::{Label, Shaper, TextAlign};

/// Colored text at a fixed size. Built by [`Theme`](crate::Theme).
#[derive(Clone)]
pub struct LabelStyle {
    pub text: String,
    pub color: Color,
    pub text_size: Value,
    pub alignment: TextAlign,
    /// Zero means unlimited.
    pub max_lines: usize,
    pub(crate) shaper: Rc<dyn Shaper>,
}

impl LabelStyle {
    pub fn layout(&self, gtx: &mut Context<'_>) -> Dimensions {
        let stack = StackOp::push(gtx.ops);
        ColorOp { color: self.color }.add(gtx.ops);
        let dims = Label {
            alignment: self.alignment,
            max_lines: self.max_lines,
        }
        .layout(gtx, &*self.shaper, self.text_size, &self.text);
        stack.pop(gtx.ops);
        dims
    }
}
