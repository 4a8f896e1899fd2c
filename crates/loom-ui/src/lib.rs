//! Widget state for Loom: buttons, labels and text editors.
//!
//! Widgets here keep state between frames and draw with whatever color is
//! current; styling lives in `loom-material`.

pub mod button;
pub mod editor;
pub mod label;
pub mod text;

pub use button::{Button, ClickRecord, HISTORY_LEN};
pub use editor::{Editor, EditorEvent, SubmitEvent};
pub use label::{Label, TextAlign};
pub use text::{Line, MonospaceShaper, Shaper, TextLayout};
