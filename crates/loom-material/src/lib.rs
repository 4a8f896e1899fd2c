//! Material look for Loom widgets.
//!
//! A [`Theme`] holds the palette, the base text size and the shaper, and
//! builds short-lived style values that draw the state kept by `loom-ui`:
//!
//! ```rust,ignore
//! let th = Theme::new(Rc::new(MonospaceShaper::default()));
//! for _ in 0..button.clicks() {
//!     enabled = !enabled;
//! }
//! th.button("Click me!").layout(gtx, &mut button);
//! th.editor("Hint").layout(gtx, &mut editor);
//! ```

pub mod button;
pub mod editor;
pub mod icon;
pub mod label;
pub mod theme;

pub use button::{ButtonStyle, INK_DURATION, IconButtonStyle, draw_ink};
pub use editor::EditorStyle;
pub use icon::{Icon, IconError};
pub use label::LabelStyle;
pub use theme::{Palette, Theme};
