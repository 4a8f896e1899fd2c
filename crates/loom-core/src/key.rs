use crate::ops::{EncodedOp, OpKind, OpRef, Ops};
use crate::tag::Tag;

/// Declares a key handler. With `focus` set the handler asks for keyboard
/// focus; the last request in a frame wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyInputOp {
    pub tag: Tag,
    pub focus: bool,
}

impl KeyInputOp {
    pub fn add(&self, ops: &mut Ops) {
        let data = ops.write(
            OpKind::KeyInput,
            OpKind::KeyInput.payload_len(),
            [OpRef::Tag(self.tag)],
        );
        data[0] = self.focus as u8;
    }

    pub fn decode(op: &EncodedOp<'_>) -> Option<Self> {
        match op.refs.first() {
            Some(OpRef::Tag(tag)) => Some(KeyInputOp {
                tag: *tag,
                focus: op.payload[0] != 0,
            }),
            _ => None,
        }
    }
}

/// Requests the soft keyboard to be hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HideInputOp;

impl HideInputOp {
    pub fn add(&self, ops: &mut Ops) {
        ops.write(OpKind::HideInput, 0, []);
    }
}
