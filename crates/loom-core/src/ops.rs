//! # Operation buffer
//!
//! Everything a frame draws or declares is appended to an [`Ops`] buffer as a
//! flat sequence of records: one kind byte followed by a fixed-size payload.
//! Values that do not fit in bytes (handler tags, images, text) travel in a
//! side table of [`OpRef`]s; every kind consumes a fixed number of them.
//!
//! Writing is two-phase: [`Ops::write`] reserves a record and hands back its
//! payload for the caller to fill. Reading goes through [`Reader`], a forward
//! cursor that skips recorded macro bodies and follows `Call` records into
//! them.
//!
//! ```rust,ignore
//! let mut ops = Ops::new();
//! let stack = StackOp::push(&mut ops);
//! TransformOp::offset(Vec2::new(10.0, 0.0)).add(&mut ops);
//! ColorOp { color: Color::BLACK }.add(&mut ops);
//! PaintOp { rect: Rect::new(0.0, 0.0, 20.0, 20.0) }.add(&mut ops);
//! stack.pop(&mut ops);
//! ```
//!
//! Structural mistakes that can be caught while writing (wrong payload size,
//! popping out of order, unbalanced macros) panic immediately. Everything
//! else is reported as [`OpsError`] during replay.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::OpsError;
use crate::geometry::{Transform, Vec2};
use crate::paint::ImageHandle;
use crate::tag::Tag;

const MAX_CALL_DEPTH: usize = 64;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Macro = 1,
    Call,
    Transform,
    Invalidate,
    Image,
    Paint,
    Color,
    Clip,
    Area,
    PointerInput,
    KeyInput,
    HideInput,
    Push,
    Pop,
    Text,
}

impl OpKind {
    const ALL: [OpKind; 15] = [
        OpKind::Macro,
        OpKind::Call,
        OpKind::Transform,
        OpKind::Invalidate,
        OpKind::Image,
        OpKind::Paint,
        OpKind::Color,
        OpKind::Clip,
        OpKind::Area,
        OpKind::PointerInput,
        OpKind::KeyInput,
        OpKind::HideInput,
        OpKind::Push,
        OpKind::Pop,
        OpKind::Text,
    ];

    pub const fn payload_len(self) -> usize {
        match self {
            OpKind::Macro => 8,
            OpKind::Call => 16,
            OpKind::Transform => 8,
            OpKind::Invalidate => 0,
            OpKind::Image => 0,
            OpKind::Paint => 16,
            OpKind::Color => 4,
            OpKind::Clip => 20,
            OpKind::Area => 17,
            OpKind::PointerInput => 2,
            OpKind::KeyInput => 1,
            OpKind::HideInput => 0,
            OpKind::Push => 4,
            OpKind::Pop => 4,
            OpKind::Text => 4,
        }
    }

    pub const fn num_refs(self) -> usize {
        match self {
            OpKind::Image | OpKind::PointerInput | OpKind::KeyInput | OpKind::Text => 1,
            _ => 0,
        }
    }

    /// Encoded size including the kind byte.
    pub const fn size(self) -> usize {
        1 + self.payload_len()
    }

    pub const fn name(self) -> &'static str {
        match self {
            OpKind::Macro => "macro",
            OpKind::Call => "call",
            OpKind::Transform => "transform",
            OpKind::Invalidate => "invalidate",
            OpKind::Image => "image",
            OpKind::Paint => "paint",
            OpKind::Color => "color",
            OpKind::Clip => "clip",
            OpKind::Area => "area",
            OpKind::PointerInput => "pointer input",
            OpKind::KeyInput => "key input",
            OpKind::HideInput => "hide input",
            OpKind::Push => "push",
            OpKind::Pop => "pop",
            OpKind::Text => "text",
        }
    }

    fn from_byte(b: u8) -> Option<OpKind> {
        OpKind::ALL.iter().copied().find(|k| *k as u8 == b)
    }
}

/// Out-of-band value referenced by a record.
#[derive(Clone, Debug)]
pub enum OpRef {
    Tag(Tag),
    Image(ImageHandle),
    Text(Arc<str>),
}

impl PartialEq for OpRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OpRef::Tag(a), OpRef::Tag(b)) => a == b,
            (OpRef::Image(a), OpRef::Image(b)) => a == b,
            (OpRef::Text(a), OpRef::Text(b)) => a == b,
            _ => false,
        }
    }
}

/// Position in both the byte log and the reference table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pc {
    data: u32,
    refs: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Ops {
    data: Vec<u8>,
    refs: Vec<OpRef>,
    stack_depth: u32,
    next_stack_id: u32,
    macro_depth: u32,
}

impl PartialEq for Ops {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.refs == other.refs
    }
}

impl Ops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the buffer for a new frame. Allocations are kept.
    pub fn reset(&mut self) {
        self.data.clear();
        self.refs.clear();
        self.stack_depth = 0;
        self.next_stack_id = 0;
        self.macro_depth = 0;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn refs(&self) -> &[OpRef] {
        &self.refs
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of open `StackOp` pushes.
    pub fn stack_depth(&self) -> u32 {
        self.stack_depth
    }

    /// Appends a record of `kind` and returns its zeroed payload.
    ///
    /// Panics when `payload_len` or the number of `refs` disagree with the
    /// fixed layout of `kind`; that means encoder and decoder are out of sync.
    pub fn write(
        &mut self,
        kind: OpKind,
        payload_len: usize,
        refs: impl IntoIterator<Item = OpRef>,
    ) -> &mut [u8] {
        assert_eq!(
            payload_len,
            kind.payload_len(),
            "ops: {} record payload must be {} bytes",
            kind.name(),
            kind.payload_len()
        );
        let before = self.refs.len();
        self.refs.extend(refs);
        assert_eq!(
            self.refs.len() - before,
            kind.num_refs(),
            "ops: {} record takes {} refs",
            kind.name(),
            kind.num_refs()
        );
        let start = self.data.len();
        self.data.push(kind as u8);
        self.data.resize(start + kind.size(), 0);
        &mut self.data[start + 1..]
    }

    pub(crate) fn pc(&self) -> Pc {
        Pc {
            data: self.data.len() as u32,
            refs: self.refs.len() as u32,
        }
    }

    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self)
    }
}

pub(crate) fn put_u32(b: &mut [u8], v: u32) {
    b[..4].copy_from_slice(&v.to_le_bytes());
}

pub(crate) fn get_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

pub(crate) fn put_f32(b: &mut [u8], v: f32) {
    put_u32(b, v.to_bits());
}

pub(crate) fn get_f32(b: &[u8]) -> f32 {
    f32::from_bits(get_u32(b))
}

/// Scoped save/restore of transform, clip and input area.
///
/// The token is consumed by [`StackOp::pop`], so a scope cannot be closed
/// twice.
#[must_use = "a pushed StackOp must be popped"]
#[derive(Debug)]
pub struct StackOp {
    id: u32,
    depth: u32,
}

impl StackOp {
    pub fn push(ops: &mut Ops) -> StackOp {
        ops.stack_depth += 1;
        let id = ops.next_stack_id;
        ops.next_stack_id += 1;
        let depth = ops.stack_depth;
        let data = ops.write(OpKind::Push, OpKind::Push.payload_len(), []);
        put_u32(data, id);
        StackOp { id, depth }
    }

    pub fn pop(self, ops: &mut Ops) {
        assert_eq!(
            ops.stack_depth, self.depth,
            "ops: stack {} popped out of order",
            self.id
        );
        ops.stack_depth -= 1;
        let data = ops.write(OpKind::Pop, OpKind::Pop.payload_len(), []);
        put_u32(data, self.id);
    }
}

/// An in-progress macro recording; see [`MacroOp::record`].
#[must_use = "a macro recording must be stopped"]
#[derive(Debug)]
pub struct MacroRecording {
    header: Pc,
    stack_depth: u32,
}

/// A recorded range of operations that can be replayed with [`MacroOp::add`].
///
/// Recorded operations are skipped where they were written; they only take
/// effect where the macro is added.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MacroOp {
    start: Pc,
    end: Pc,
}

impl MacroOp {
    pub fn record(ops: &mut Ops) -> MacroRecording {
        let header = ops.pc();
        ops.write(OpKind::Macro, OpKind::Macro.payload_len(), []);
        ops.macro_depth += 1;
        MacroRecording {
            header,
            stack_depth: ops.stack_depth,
        }
    }

    /// Writes a call replaying the recorded operations at this point.
    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(OpKind::Call, OpKind::Call.payload_len(), []);
        put_u32(&mut data[0..], self.start.data);
        put_u32(&mut data[4..], self.start.refs);
        put_u32(&mut data[8..], self.end.data);
        put_u32(&mut data[12..], self.end.refs);
    }
}

impl MacroRecording {
    pub fn stop(self, ops: &mut Ops) -> MacroOp {
        assert_eq!(
            ops.stack_depth, self.stack_depth,
            "ops: unbalanced stack inside macro"
        );
        ops.macro_depth -= 1;
        let end = ops.pc();
        let at = self.header.data as usize + 1;
        put_u32(&mut ops.data[at..], end.data);
        put_u32(&mut ops.data[at + 4..], end.refs);
        MacroOp {
            start: Pc {
                data: self.header.data + OpKind::Macro.size() as u32,
                refs: self.header.refs,
            },
            end,
        }
    }
}

/// Offsets everything after it in the current stack scope.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransformOp {
    pub transform: Transform,
}

impl TransformOp {
    pub fn offset(o: Vec2) -> Self {
        Self {
            transform: Transform::translate(o),
        }
    }

    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(OpKind::Transform, OpKind::Transform.payload_len(), []);
        put_f32(&mut data[0..], self.transform.offset.x);
        put_f32(&mut data[4..], self.transform.offset.y);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Self {
        debug_assert_eq!(op.kind, OpKind::Transform);
        let d = op.payload;
        Self::offset(Vec2::new(get_f32(&d[0..]), get_f32(&d[4..])))
    }
}

/// Asks the frame scheduler for another frame soon, e.g. while an animation
/// runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvalidateOp;

impl InvalidateOp {
    pub fn add(&self, ops: &mut Ops) {
        ops.write(OpKind::Invalidate, 0, []);
    }
}

/// A decoded record borrowed from an [`Ops`] buffer.
#[derive(Clone, Copy, Debug)]
pub struct EncodedOp<'a> {
    pub kind: OpKind,
    pub payload: &'a [u8],
    pub refs: &'a [OpRef],
}

/// Forward-only cursor over an [`Ops`] buffer.
pub struct Reader<'a> {
    ops: &'a Ops,
    pc: Pc,
    end: Pc,
    returns: SmallVec<[(Pc, Pc); 8]>,
}

impl<'a> Reader<'a> {
    pub fn new(ops: &'a Ops) -> Self {
        Self {
            ops,
            pc: Pc::default(),
            end: ops.pc(),
            returns: SmallVec::new(),
        }
    }

    fn fail(&mut self, e: OpsError) -> Option<Result<EncodedOp<'a>, OpsError>> {
        self.returns.clear();
        self.pc = self.end;
        Some(Err(e))
    }
}

impl<'a> Iterator for Reader<'a> {
    type Item = Result<EncodedOp<'a>, OpsError>;

    fn next(&mut self) -> Option<Self::Item> {
        let ops = self.ops;
        loop {
            if self.pc.data >= self.end.data {
                let (ret, end) = self.returns.pop()?;
                self.pc = ret;
                self.end = end;
                continue;
            }
            let at = self.pc.data as usize;
            let Some(kind) = OpKind::from_byte(ops.data[at]) else {
                return self.fail(OpsError::UnknownKind {
                    kind: ops.data[at],
                    pc: at,
                });
            };
            let refs_at = self.pc.refs as usize;
            if at + kind.size() > self.end.data as usize
                || refs_at + kind.num_refs() > self.end.refs as usize
            {
                return self.fail(OpsError::Truncated {
                    kind: kind.name(),
                    pc: at,
                });
            }
            let payload = &ops.data[at + 1..at + kind.size()];
            let refs = &ops.refs[refs_at..refs_at + kind.num_refs()];
            self.pc = Pc {
                data: (at + kind.size()) as u32,
                refs: (refs_at + kind.num_refs()) as u32,
            };
            match kind {
                OpKind::Macro => {
                    let end = Pc {
                        data: get_u32(&payload[0..]),
                        refs: get_u32(&payload[4..]),
                    };
                    if end.data < self.pc.data || end.data > self.end.data {
                        return self.fail(OpsError::BadMacro { pc: at });
                    }
                    self.pc = end;
                }
                OpKind::Call => {
                    let start = Pc {
                        data: get_u32(&payload[0..]),
                        refs: get_u32(&payload[4..]),
                    };
                    let end = Pc {
                        data: get_u32(&payload[8..]),
                        refs: get_u32(&payload[12..]),
                    };
                    if start.data > end.data
                        || end.data as usize > ops.data.len()
                        || start.refs > end.refs
                        || end.refs as usize > ops.refs.len()
                    {
                        return self.fail(OpsError::BadCall {
                            pc: at,
                            start: start.data as usize,
                            end: end.data as usize,
                        });
                    }
                    if self.returns.len() >= MAX_CALL_DEPTH {
                        return self.fail(OpsError::CallDepth(MAX_CALL_DEPTH));
                    }
                    self.returns.push((self.pc, self.end));
                    self.pc = start;
                    self.end = end;
                }
                _ => return Some(Ok(EncodedOp { kind, payload, refs })),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{ColorOp, PaintOp, TextOp};
    use crate::{Color, Rect};

    fn kinds(ops: &Ops) -> Vec<OpKind> {
        ops.reader().map(|op| op.unwrap().kind).collect()
    }

    #[test]
    fn write_then_read_round_trips_payload() {
        let mut ops = Ops::new();
        PaintOp {
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
        }
        .add(&mut ops);
        let expected = ops.data()[1..].to_vec();

        let op = ops.reader().next().unwrap().unwrap();
        assert_eq!(op.kind, OpKind::Paint);
        assert_eq!(op.payload, &expected[..]);
        assert_eq!(PaintOp::decode(&op).rect, Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    #[should_panic(expected = "payload must be")]
    fn mismatched_payload_length_panics() {
        let mut ops = Ops::new();
        ops.write(OpKind::Color, 3, []);
    }

    #[test]
    #[should_panic(expected = "popped out of order")]
    fn out_of_order_pop_panics() {
        let mut ops = Ops::new();
        let outer = StackOp::push(&mut ops);
        let _inner = StackOp::push(&mut ops);
        outer.pop(&mut ops);
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut ops = Ops::new();
        for _ in 0..32 {
            InvalidateOp.add(&mut ops);
        }
        let cap = ops.data.capacity();
        ops.reset();
        assert!(ops.is_empty());
        assert_eq!(ops.data.capacity(), cap);
    }

    #[test]
    fn macro_body_is_skipped_until_called() {
        let mut ops = Ops::new();
        let rec = MacroOp::record(&mut ops);
        ColorOp {
            color: Color::WHITE,
        }
        .add(&mut ops);
        let m = rec.stop(&mut ops);
        InvalidateOp.add(&mut ops);
        m.add(&mut ops);
        m.add(&mut ops);

        assert_eq!(
            kinds(&ops),
            vec![OpKind::Invalidate, OpKind::Color, OpKind::Color]
        );
    }

    #[test]
    fn unstopped_macro_is_reported() {
        let mut ops = Ops::new();
        let _rec = MacroOp::record(&mut ops);
        InvalidateOp.add(&mut ops);

        let err = ops.reader().find_map(|r| r.err()).unwrap();
        assert_eq!(err, OpsError::BadMacro { pc: 0 });
    }

    #[test]
    fn call_cannot_read_refs_past_its_range() {
        let mut ops = Ops::new();
        let rec = MacroOp::record(&mut ops);
        TextOp::new("inside", 10.0).add(&mut ops);
        let m = rec.stop(&mut ops);
        TextOp::new("outside", 10.0).add(&mut ops);

        // Same bytes, but the reference range stops short of the text.
        let short = MacroOp {
            end: Pc {
                refs: m.start.refs,
                ..m.end
            },
            ..m
        };
        let mut call = Ops::new();
        call.data = ops.data.clone();
        call.refs = ops.refs.clone();
        short.add(&mut call);

        let err = call.reader().find_map(|r| r.err()).unwrap();
        assert_eq!(
            err,
            OpsError::Truncated {
                kind: "text",
                pc: OpKind::Macro.size(),
            }
        );
    }

    #[test]
    fn unknown_kind_is_reported() {
        let mut ops = Ops::new();
        InvalidateOp.add(&mut ops);
        ops.data[0] = 0xee;
        let mut r = ops.reader();
        assert_eq!(
            r.next().unwrap().unwrap_err(),
            OpsError::UnknownKind { kind: 0xee, pc: 0 }
        );
        assert!(r.next().is_none());
    }
}
