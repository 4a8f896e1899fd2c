use std::rc::Rc;

use loom_core::{Color, ColorOp, Context, Dimensions, MacroOp, StackOp, Value};
use loom_ui::{Editor, Label, Shaper};

/// Editor text with a hint shown while empty. Built by
/// [`Theme::editor`](crate::Theme::editor).
#[derive(Clone)]
pub struct EditorStyle {
    pub hint: String,
    pub color: Color,
    pub hint_color: Color,
    pub text_size: Value,
    pub(crate) shaper: Rc<dyn Shaper>,
}

impl EditorStyle {
    pub fn layout(&self, gtx: &mut Context<'_>, editor: &mut Editor) -> Dimensions {
        editor.update(gtx);

        let hint = editor.is_empty().then(|| {
            let rec = MacroOp::record(gtx.ops);
            ColorOp {
                color: self.hint_color,
            }
            .add(gtx.ops);
            let dims = Label::default().layout(gtx, &*self.shaper, self.text_size, &self.hint);
            (rec.stop(gtx.ops), dims)
        });

        let mut cs = gtx.constraints;
        if let Some((_, h)) = &hint {
            cs.width.min = h.size.x.clamp(cs.width.min, cs.width.max);
            cs.height.min = h.size.y.clamp(cs.height.min, cs.height.max);
        }

        let stack = StackOp::push(gtx.ops);
        if let Some((call, _)) = &hint {
            call.add(gtx.ops);
        }
        ColorOp { color: self.color }.add(gtx.ops);
        let dims = gtx.layout(cs, |gtx| editor.layout(gtx, &*self.shaper, self.text_size));
        stack.pop(gtx.ops);
        dims
    }
}
