use std::rc::Rc;

use loom_core::{Color, Value, dp, sp};
use loom_ui::{Shaper, TextAlign};

use crate::button::{ButtonStyle, IconButtonStyle};
use crate::editor::EditorStyle;
use crate::icon::Icon;
use crate::label::LabelStyle;

/// Semantic colors shared by the styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Accent for buttons.
    pub primary: Color,
    pub text: Color,
    /// Placeholder text in empty editors.
    pub hint: Color,
    /// Text on top of `primary`.
    pub inv_text: Color,
    /// Background of disabled buttons.
    pub inactive: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            primary: Color::rgb(0x3f51b5),
            text: Color::BLACK,
            hint: Color::rgb(0xbbbbbb),
            inv_text: Color::WHITE,
            inactive: Color::rgb(0xcccccc),
        }
    }
}

/// Styling constants and the text shaper, handed to every style it builds.
#[derive(Clone)]
pub struct Theme {
    pub shaper: Rc<dyn Shaper>,
    pub color: Palette,
    /// Body text size; headings and buttons scale from it.
    pub text_size: Value,
}

impl std::fmt::Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme")
            .field("color", &self.color)
            .field("text_size", &self.text_size)
            .finish_non_exhaustive()
    }
}

impl Theme {
    pub fn new(shaper: Rc<dyn Shaper>) -> Self {
        Theme {
            shaper,
            color: Palette::default(),
            text_size: sp(16.0),
        }
    }

    /// A label at `size` in the text color.
    pub fn label(&self, size: Value, txt: impl Into<String>) -> LabelStyle {
        LabelStyle {
            text: txt.into(),
            color: self.color.text,
            text_size: size,
            alignment: TextAlign::Start,
            max_lines: 0,
            shaper: self.shaper.clone(),
        }
    }

    fn scaled(&self, num: f32, txt: impl Into<String>) -> LabelStyle {
        self.label(self.text_size.scale(num / 16.0), txt)
    }

    pub fn h1(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(96.0, txt)
    }

    pub fn h2(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(60.0, txt)
    }

    pub fn h3(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(48.0, txt)
    }

    pub fn h4(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(34.0, txt)
    }

    pub fn h5(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(24.0, txt)
    }

    pub fn h6(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(20.0, txt)
    }

    pub fn body1(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(16.0, txt)
    }

    pub fn body2(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(14.0, txt)
    }

    pub fn caption(&self, txt: impl Into<String>) -> LabelStyle {
        self.scaled(12.0, txt)
    }

    pub fn button(&self, txt: impl Into<String>) -> ButtonStyle {
        ButtonStyle {
            text: txt.into(),
            color: self.color.inv_text,
            background: self.color.primary,
            inactive: self.color.inactive,
            enabled: true,
            text_size: self.text_size.scale(14.0 / 16.0),
            corner_radius: dp(4.0),
            inset: dp(16.0),
            shaper: self.shaper.clone(),
        }
    }

    pub fn icon_button(&self, icon: Option<Icon>) -> IconButtonStyle {
        IconButtonStyle {
            background: self.color.primary,
            icon,
            size: dp(56.0),
            padding: dp(16.0),
        }
    }

    pub fn editor(&self, hint: impl Into<String>) -> EditorStyle {
        EditorStyle {
            hint: hint.into(),
            color: self.color.text,
            hint_color: self.color.hint,
            text_size: self.text_size,
            shaper: self.shaper.clone(),
        }
    }
}
