//! Text layout seam.
//!
//! Real shaping (fonts, bidi, kerning) lives outside the toolkit behind the
//! [`Shaper`] trait. [`MonospaceShaper`] gives every grapheme cluster the
//! same advance, which is enough for tests and headless use.

use std::ops::Range;

use loom_core::{Point, Vec2};
use unicode_segmentation::UnicodeSegmentation;

/// One laid out line.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Byte range in the source text, without the line break.
    pub range: Range<usize>,
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Caret stops: `(byte index, x)` for every grapheme boundary, including
    /// the line end.
    pub carets: Vec<(usize, f32)>,
}

impl Line {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    /// Nearest caret stop to `x`.
    pub fn index_at(&self, x: f32) -> usize {
        self.carets
            .iter()
            .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
            .map(|c| c.0)
            .unwrap_or(self.range.start)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<Line>,
    pub line_height: f32,
}

impl TextLayout {
    pub fn width(&self) -> f32 {
        self.lines.iter().map(|l| l.width).fold(0.0, f32::max)
    }

    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    /// Pixel size, rounded up.
    pub fn size(&self) -> Point {
        Point::new(self.width().ceil() as i32, self.height().ceil() as i32)
    }

    /// Line index and top-left position of the caret at byte `index`.
    pub fn caret(&self, index: usize) -> (usize, Vec2) {
        let li = self
            .lines
            .iter()
            .rposition(|l| l.range.start <= index)
            .unwrap_or(0);
        let Some(line) = self.lines.get(li) else {
            return (0, Vec2::ZERO);
        };
        let x = line
            .carets
            .iter()
            .rev()
            .find(|c| c.0 <= index)
            .map(|c| c.1)
            .unwrap_or(0.0);
        (li, Vec2::new(x, li as f32 * self.line_height))
    }

    /// Byte index of the caret stop closest to `p`.
    pub fn index_at(&self, p: Vec2) -> usize {
        if self.lines.is_empty() || self.line_height <= 0.0 {
            return 0;
        }
        let li = ((p.y / self.line_height).floor().max(0.0) as usize).min(self.lines.len() - 1);
        self.lines[li].index_at(p.x)
    }
}

pub trait Shaper {
    /// Breaks `text` into lines no wider than `max_width` pixels, at `size`
    /// pixels per em. A `max_width` of zero or less disables wrapping.
    fn layout(&self, text: &str, size: f32, max_width: i32) -> TextLayout;
}

/// Fixed-advance shaper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceShaper {
    /// Advance per grapheme, in ems.
    pub advance: f32,
    /// Line height, in ems.
    pub line_height: f32,
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        MonospaceShaper {
            advance: 0.5,
            line_height: 1.25,
        }
    }
}

impl MonospaceShaper {
    fn line(&self, graphemes: &[(usize, &str)], end: usize, size: f32) -> Line {
        let adv = size * self.advance;
        let start = graphemes.first().map(|g| g.0).unwrap_or(end);
        let mut carets: Vec<(usize, f32)> = graphemes
            .iter()
            .enumerate()
            .map(|(i, g)| (g.0, i as f32 * adv))
            .collect();
        let width = graphemes.len() as f32 * adv;
        carets.push((end, width));
        Line {
            range: start..end,
            width,
            ascent: (size * 0.8).round(),
            descent: (size * self.line_height - (size * 0.8).round()).max(0.0),
            carets,
        }
    }
}

impl Shaper for MonospaceShaper {
    fn layout(&self, text: &str, size: f32, max_width: i32) -> TextLayout {
        let adv = size * self.advance;
        let max = if max_width > 0 {
            max_width as f32
        } else {
            f32::INFINITY
        };
        let mut lines = Vec::new();
        let mut para_start = 0;
        for para in text.split('\n') {
            let gs: Vec<(usize, &str)> = para
                .grapheme_indices(true)
                .map(|(i, g)| (para_start + i, g))
                .collect();
            let end_of = |i: usize| gs.get(i).map(|g| g.0).unwrap_or(para_start + para.len());

            let mut start = 0;
            let mut wrap_at = None;
            let mut i = 0;
            while i < gs.len() {
                let width = (i - start + 1) as f32 * adv;
                if width > max && i > start {
                    let cut = wrap_at.filter(|w| *w > start).unwrap_or(i);
                    lines.push(self.line(&gs[start..cut], end_of(cut), size));
                    start = cut;
                    wrap_at = None;
                    continue;
                }
                if gs[i].1.chars().all(char::is_whitespace) {
                    wrap_at = Some(i + 1);
                }
                i += 1;
            }
            lines.push(self.line(&gs[start..], para_start + para.len(), size));
            para_start += para.len() + 1;
        }
        TextLayout {
            lines,
            line_height: size * self.line_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_whitespace() {
        let t = MonospaceShaper::default().layout("hello big world", 10.0, 60);
        let lines: Vec<&str> = t
            .lines
            .iter()
            .map(|l| &"hello big world"[l.range.clone()])
            .collect();
        assert_eq!(lines, vec!["hello big ", "world"]);
    }

    #[test]
    fn breaks_long_words_anywhere() {
        let t = MonospaceShaper::default().layout("abcdefgh", 10.0, 20);
        assert_eq!(t.lines.len(), 2);
        assert_eq!(t.lines[0].range, 0..4);
    }

    #[test]
    fn newline_starts_a_line_and_empty_lines_survive() {
        let text = "a\n\nb";
        let t = MonospaceShaper::default().layout(text, 10.0, 0);
        let ranges: Vec<_> = t.lines.iter().map(|l| l.range.clone()).collect();
        assert_eq!(ranges, vec![0..1, 2..2, 3..4]);
        assert_eq!(t.size(), Point::new(5, 38));
    }

    #[test]
    fn carets_sit_on_grapheme_boundaries() {
        let text = "A👍🏽B";
        let t = MonospaceShaper::default().layout(text, 10.0, 0);
        let stops: Vec<usize> = t.lines[0].carets.iter().map(|c| c.0).collect();
        assert_eq!(stops, vec![0, 1, 1 + "👍🏽".len(), text.len()]);
        assert_eq!(t.index_at(Vec2::new(9.0, 3.0)), 1 + "👍🏽".len());
    }

    #[test]
    fn caret_finds_line_and_x() {
        let text = "ab\ncd";
        let t = MonospaceShaper::default().layout(text, 10.0, 0);
        let (line, pos) = t.caret(4);
        assert_eq!(line, 1);
        assert_eq!(pos, Vec2::new(5.0, 12.5));
    }
}
