//! Editable text.
//!
//! [`Editor`] keeps the text, the caret and the keyboard handler. Text
//! arrives as [`EditEvent`](loom_core::EditEvent)s or character key presses
//! routed to the focused handler; navigation and deletion come from the
//! other keys. Byte offsets handed out by the editor always sit on grapheme
//! cluster boundaries.

use std::collections::VecDeque;

use loom_core::{
    AreaOp, Axis, Click, ClickKind, ClipOp, Context, Dimensions, Event, Key, KeyInputOp, KeyState,
    Modifiers, PaintOp, Point, Rect, Scroll, StackOp, Tag, TransformOp, Value, Vec2,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::label::{TextAlign, paint_lines};
use crate::text::{Shaper, TextLayout};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitEvent {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// The text changed through user input.
    Change,
    /// Enter was pressed in a submitting editor.
    Submit(SubmitEvent),
}

#[derive(Debug, Default)]
pub struct Editor {
    /// Enter never inserts a line break and pasted breaks are dropped.
    pub single_line: bool,
    /// Enter emits [`EditorEvent::Submit`] and clears the text.
    pub submit: bool,
    pub alignment: TextAlign,

    text: String,
    caret: usize,
    tag: Tag,
    click: Click,
    scroll: Scroll,
    offset: i32,
    focused: bool,
    request_focus: bool,
    caret_moved: bool,
    events: VecDeque<EditorEvent>,
    /// Shaped by the last layout. Lags behind `text` while a batch of input
    /// is processed, so carets taken from it go through `set_caret`.
    lines: TextLayout,
}

fn prev_boundary(text: &str, byte: usize) -> usize {
    text.grapheme_indices(true)
        .map(|(i, _)| i)
        .take_while(|i| *i < byte)
        .last()
        .unwrap_or(0)
}

fn next_boundary(text: &str, byte: usize) -> usize {
    text.grapheme_indices(true)
        .map(|(i, _)| i)
        .find(|i| *i > byte)
        .unwrap_or(text.len())
}

/// Rounds `byte` down to a grapheme boundary.
fn snap(text: &str, byte: usize) -> usize {
    if byte >= text.len() {
        return text.len();
    }
    text.grapheme_indices(true)
        .map(|(i, _)| i)
        .take_while(|i| *i <= byte)
        .last()
        .unwrap_or(0)
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single_line() -> Self {
        Editor {
            single_line: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replaces the text and moves the caret to its end. Does not emit
    /// [`EditorEvent::Change`].
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if self.single_line {
            self.text.retain(|c| c != '\n');
        }
        self.caret = self.text.len();
        self.caret_moved = true;
    }

    /// Caret position as a byte offset.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Moves the caret to `byte`, rounded down to a grapheme boundary and
    /// clamped to the text.
    pub fn set_caret(&mut self, byte: usize) {
        self.caret = snap(&self.text, byte);
        self.caret_moved = true;
    }

    /// Inserts `s` at the caret as if typed.
    pub fn insert(&mut self, s: &str) {
        let s: String = if self.single_line {
            s.chars().filter(|c| *c != '\n').collect()
        } else {
            s.to_owned()
        };
        if s.is_empty() {
            return;
        }
        self.text.insert_str(self.caret, &s);
        self.caret += s.len();
        self.caret_moved = true;
        self.changed();
    }

    pub fn delete_backward(&mut self) {
        if self.caret == 0 {
            return;
        }
        let start = prev_boundary(&self.text, self.caret);
        self.text.replace_range(start..self.caret, "");
        self.caret = start;
        self.caret_moved = true;
        self.changed();
    }

    pub fn delete_forward(&mut self) {
        if self.caret >= self.text.len() {
            return;
        }
        let end = next_boundary(&self.text, self.caret);
        self.text.replace_range(self.caret..end, "");
        self.caret_moved = true;
        self.changed();
    }

    /// Moves the caret by `n` grapheme clusters; negative is backwards.
    pub fn move_caret(&mut self, n: i32) {
        for _ in 0..n.unsigned_abs() {
            self.caret = if n < 0 {
                prev_boundary(&self.text, self.caret)
            } else {
                next_boundary(&self.text, self.caret)
            };
        }
        self.caret_moved = true;
    }

    /// Asks for keyboard focus on the next layout.
    pub fn focus(&mut self) {
        self.request_focus = true;
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Takes the events since the last call.
    pub fn events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    fn changed(&mut self) {
        if self.events.back() != Some(&EditorEvent::Change) {
            self.events.push_back(EditorEvent::Change);
        }
    }

    fn move_line(&mut self, dir: i32) {
        let (line, pos) = self.lines.caret(self.caret);
        let target = line as i32 + dir;
        if target < 0 || target as usize >= self.lines.lines.len() {
            return;
        }
        let y = (target as f32 + 0.5) * self.lines.line_height;
        self.set_caret(self.lines.index_at(Vec2::new(pos.x, y)));
    }

    fn line_edge(&mut self, end: bool) {
        let (line, _) = self.lines.caret(self.caret);
        if let Some(l) = self.lines.lines.get(line) {
            let byte = if end { l.range.end } else { l.range.start };
            self.set_caret(byte);
        }
    }

    fn key(&mut self, key: &Key) {
        match key {
            Key::Backspace => self.delete_backward(),
            Key::Delete => self.delete_forward(),
            Key::ArrowLeft => self.move_caret(-1),
            Key::ArrowRight => self.move_caret(1),
            Key::ArrowUp => self.move_line(-1),
            Key::ArrowDown => self.move_line(1),
            Key::Home => self.line_edge(false),
            Key::End => self.line_edge(true),
            Key::Enter if self.submit => {
                let text = std::mem::take(&mut self.text);
                self.caret = 0;
                self.offset = 0;
                log::debug!("editor {:?}: submit {} bytes", self.tag, text.len());
                self.events.push_back(EditorEvent::Submit(SubmitEvent { text }));
            }
            Key::Enter if !self.single_line => self.insert("\n"),
            Key::Character(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            Key::Space => self.insert(" "),
            _ => {}
        }
    }

    /// Processes queued input. Called by [`Editor::layout`]; call it earlier
    /// to observe events before drawing.
    pub fn update(&mut self, gtx: &mut Context<'_>) {
        for c in self.click.events(gtx.queue) {
            if c.kind == ClickKind::Press {
                self.request_focus = true;
                let p = c.position + self.scroll_offset();
                self.set_caret(self.lines.index_at(p));
            }
        }
        for e in gtx.events(self.tag) {
            match e {
                Event::Focus(f) => self.focused = f.focus,
                Event::Key(k) if k.state == KeyState::Press => {
                    // Shortcuts are not text.
                    let shortcut = Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER;
                    if !(matches!(k.key, Key::Character(_)) && k.modifiers.intersects(shortcut)) {
                        self.key(&k.key);
                    }
                }
                Event::Edit(e) => self.insert(&e.text),
                _ => {}
            }
        }
    }

    fn axis(&self) -> Axis {
        if self.single_line {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    fn scroll_offset(&self) -> Vec2 {
        let p = self.axis().point(self.offset, 0);
        Vec2::new(p.x as f32, p.y as f32)
    }

    /// Lays out the text at `size`, declares the handlers and draws the
    /// text and, while focused, the caret.
    pub fn layout(&mut self, gtx: &mut Context<'_>, shaper: &dyn Shaper, size: Value) -> Dimensions {
        self.update(gtx);

        let px = gtx.px(size) as f32;
        let cs = gtx.constraints;
        let wrap = if self.single_line { 0 } else { cs.width.max };
        self.lines = shaper.layout(&self.text, px, wrap);
        let content = self.lines.size();
        let min_height = self.lines.line_height.ceil() as i32;
        let dims = cs.constrain(Point::new(content.x, content.y.max(min_height)));

        let axis = self.axis();
        let scrolled = self.scroll.scroll(gtx.queue, axis);
        let max_offset = (axis.main(content) - axis.main(dims)).max(0);
        self.offset = (self.offset + scrolled).clamp(0, max_offset);
        if std::mem::take(&mut self.caret_moved) {
            self.reveal_caret(dims, px);
            self.offset = self.offset.min(max_offset);
        }

        let bounds = Rect::new(0.0, 0.0, dims.x as f32, dims.y as f32);
        let stack = StackOp::push(gtx.ops);
        ClipOp::rect(bounds).add(gtx.ops);
        AreaOp::rect(bounds).add(gtx.ops);
        if !self.single_line {
            self.scroll.add(gtx.ops);
        }
        self.click.add(gtx.ops);
        KeyInputOp {
            tag: self.tag,
            focus: std::mem::take(&mut self.request_focus),
        }
        .add(gtx.ops);

        if self.offset > 0 {
            TransformOp::offset(-self.scroll_offset()).add(gtx.ops);
        }
        paint_lines(gtx.ops, &self.lines, &self.text, px, self.alignment, dims.x);
        if self.focused {
            let (_, pos) = self.lines.caret(self.caret);
            let width = (px / 16.0).max(1.0);
            PaintOp {
                rect: Rect::new(pos.x, pos.y, width, self.lines.line_height),
            }
            .add(gtx.ops);
        }
        stack.pop(gtx.ops);

        let baseline = self
            .lines
            .lines
            .first()
            .map(|l| l.ascent.round() as i32)
            .unwrap_or(dims.y);
        Dimensions {
            size: dims,
            baseline,
        }
    }

    /// Scrolls just enough to show the caret.
    fn reveal_caret(&mut self, dims: Point, px: f32) {
        let axis = self.axis();
        let (_, pos) = self.lines.caret(self.caret);
        let (start, extent) = match axis {
            Axis::Horizontal => (pos.x, (px / 16.0).max(1.0)),
            Axis::Vertical => (pos.y, self.lines.line_height),
        };
        let view = axis.main(dims) as f32;
        let off = self.offset as f32;
        if start < off {
            self.offset = start.floor() as i32;
        } else if start + extent > off + view {
            self.offset = (start + extent - view).ceil() as i32;
        }
        self.offset = self.offset.max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::MonospaceShaper;
    use loom_core::{
        Config, EditEvent, InputEvent, KeyEvent, Ops, PointerEvent, PointerEventKind, Router, sp,
    };
    use web_time::Instant;

    fn frame(editor: &mut Editor, router: &mut Router, ops: &mut Ops) {
        ops.reset();
        let mut gtx = Context::new(ops, router, Config::new(1.0, Instant::now()), Point::new(200, 100));
        editor.layout(&mut gtx, &MonospaceShaper::default(), sp(10.0));
        router.frame(ops).unwrap();
    }

    #[test]
    fn submit_clears_the_text() {
        let mut editor = Editor::single_line();
        editor.submit = true;
        let mut router = Router::new();
        let mut ops = Ops::new();

        editor.focus();
        frame(&mut editor, &mut router, &mut ops);
        assert_eq!(router.focused(), Some(editor.tag));

        for key in [Key::Character('h'), Key::Character('i'), Key::Enter] {
            router.add(InputEvent::Key(KeyEvent::press(key, Instant::now())));
        }
        frame(&mut editor, &mut router, &mut ops);

        assert!(editor.focused());
        assert_eq!(editor.text(), "");
        assert_eq!(editor.caret(), 0);
        let submits: Vec<_> = editor
            .events()
            .into_iter()
            .filter_map(|e| match e {
                EditorEvent::Submit(s) => Some(s.text),
                EditorEvent::Change => None,
            })
            .collect();
        assert_eq!(submits, vec!["hi".to_string()]);
    }

    #[test]
    fn edit_events_insert_at_the_caret() {
        let mut editor = Editor::new();
        let mut router = Router::new();
        let mut ops = Ops::new();
        editor.set_text("ac");
        editor.set_caret(1);
        editor.focus();
        frame(&mut editor, &mut router, &mut ops);
        router.add(InputEvent::Edit(EditEvent { text: "b".into() }));
        let mut copy = KeyEvent::press(Key::Character('c'), Instant::now());
        copy.modifiers = Modifiers::CTRL;
        router.add(InputEvent::Key(copy));
        frame(&mut editor, &mut router, &mut ops);
        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.caret(), 2);
        assert_eq!(editor.events(), vec![EditorEvent::Change]);
    }

    #[test]
    fn backspace_removes_a_whole_cluster() {
        let mut editor = Editor::new();
        editor.insert("a👍🏽");
        editor.delete_backward();
        assert_eq!(editor.text(), "a");
        assert_eq!(editor.caret(), 1);
        editor.move_caret(-5);
        assert_eq!(editor.caret(), 0);
        editor.delete_forward();
        assert_eq!(editor.text(), "");
        assert_eq!(editor.events(), vec![EditorEvent::Change]);
    }

    #[test]
    fn single_line_drops_line_breaks() {
        let mut editor = Editor::single_line();
        editor.insert("a\nb");
        assert_eq!(editor.text(), "ab");
        editor.set_text("x\ny");
        assert_eq!(editor.text(), "xy");
    }

    #[test]
    fn enter_breaks_lines_unless_single_line() {
        let mut multi = Editor::new();
        multi.insert("ab");
        multi.key(&Key::Enter);
        assert_eq!(multi.text(), "ab\n");

        let mut single = Editor::single_line();
        single.insert("ab");
        single.key(&Key::Enter);
        assert_eq!(single.text(), "ab");
    }

    #[test]
    fn press_focuses_and_places_the_caret() {
        let mut editor = Editor::new();
        editor.set_text("hello");
        let mut router = Router::new();
        let mut ops = Ops::new();
        frame(&mut editor, &mut router, &mut ops);
        assert_eq!(router.focused(), None);

        let at = Vec2::new(11.0, 4.0);
        router.add(InputEvent::Pointer(PointerEvent::new(
            PointerEventKind::Down,
            at,
            Instant::now(),
        )));
        frame(&mut editor, &mut router, &mut ops);
        assert_eq!(router.focused(), Some(editor.tag));
        assert_eq!(editor.caret(), 2);
    }

    #[test]
    fn keys_after_an_edit_in_one_batch_stay_in_the_text() {
        let mut editor = Editor::new();
        editor.set_text("abc");
        editor.focus();
        let mut router = Router::new();
        let mut ops = Ops::new();
        frame(&mut editor, &mut router, &mut ops);

        for key in [Key::Backspace, Key::End, Key::Character('x')] {
            router.add(InputEvent::Key(KeyEvent::press(key, Instant::now())));
        }
        frame(&mut editor, &mut router, &mut ops);
        assert_eq!(editor.text(), "abx");
        assert_eq!(editor.caret(), 3);

        for key in [Key::Backspace, Key::Backspace, Key::Home, Key::ArrowDown] {
            router.add(InputEvent::Key(KeyEvent::press(key, Instant::now())));
        }
        frame(&mut editor, &mut router, &mut ops);
        assert_eq!(editor.text(), "a");
        assert!(editor.caret() <= editor.len());
    }

    #[test]
    fn vertical_navigation_keeps_the_column() {
        let mut editor = Editor::new();
        editor.set_text("abc\ndef");
        let mut router = Router::new();
        let mut ops = Ops::new();
        frame(&mut editor, &mut router, &mut ops);
        editor.set_caret(6);
        editor.key(&Key::ArrowUp);
        assert_eq!(editor.caret(), 2);
        editor.key(&Key::End);
        assert_eq!(editor.caret(), 3);
    }
}
