//! Cell styling types
//!
//! This module contains types for cell formatting:
//! - [`Style`] - The composite cell format (a `cellXfs` entry)
//! - [`Font`] - Font settings
//! - [`Border`] - Cell borders
//! - [`Color`] - Color representation
//! - [`HorizontalAlignment`] / [`VerticalAlignment`] - Text alignment

mod alignment;
mod border;
mod color;
mod font;

pub use alignment::{HorizontalAlignment, VerticalAlignment};
pub use border::{Border, BorderEdge, BorderLineStyle};
pub use color::Color;
pub use font::{Font, Underline};

/// Composite cell format
///
/// The ids are positions in the style registry's number format, font, fill,
/// border and cell style tables. Two styles are interchangeable exactly when
/// all fields compare equal, which is what the registry deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Number format id
    pub num_fmt_id: u32,
    /// Index into the font table
    pub font_id: u32,
    /// Index into the fill table
    pub fill_id: u32,
    /// Index into the border table
    pub border_id: u32,
    /// Index into the cell style (`cellStyleXfs`) table
    pub xf_id: u32,
    /// Horizontal alignment
    pub horizontal: Option<HorizontalAlignment>,
    /// Vertical alignment
    pub vertical: Option<VerticalAlignment>,
    /// Wrap text
    pub wrap_text: bool,
}

impl Style {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number format id
    pub fn with_num_fmt(mut self, id: u32) -> Self {
        self.num_fmt_id = id;
        self
    }

    /// Set the font index
    pub fn with_font(mut self, id: u32) -> Self {
        self.font_id = id;
        self
    }

    /// Set the fill index
    pub fn with_fill(mut self, id: u32) -> Self {
        self.fill_id = id;
        self
    }

    /// Set the border index
    pub fn with_border(mut self, id: u32) -> Self {
        self.border_id = id;
        self
    }

    /// Set horizontal alignment
    pub fn with_horizontal(mut self, align: HorizontalAlignment) -> Self {
        self.horizontal = Some(align);
        self
    }

    /// Set vertical alignment
    pub fn with_vertical(mut self, align: VerticalAlignment) -> Self {
        self.vertical = Some(align);
        self
    }

    /// Enable text wrapping
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }

    /// Whether an `<alignment>` element is needed to express this style
    pub fn has_alignment(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some() || self.wrap_text
    }

    /// Overlay every set field of `patch` onto this style
    ///
    /// Zero ids, `None` alignments and a false wrap flag leave the current
    /// value untouched, so a merge can never clear a field.
    pub fn merge(&mut self, patch: &Style) {
        if patch.num_fmt_id != 0 {
            self.num_fmt_id = patch.num_fmt_id;
        }
        if patch.font_id != 0 {
            self.font_id = patch.font_id;
        }
        if patch.fill_id != 0 {
            self.fill_id = patch.fill_id;
        }
        if patch.border_id != 0 {
            self.border_id = patch.border_id;
        }
        if patch.xf_id != 0 {
            self.xf_id = patch.xf_id;
        }
        if patch.horizontal.is_some() {
            self.horizontal = patch.horizontal;
        }
        if patch.vertical.is_some() {
            self.vertical = patch.vertical;
        }
        if patch.wrap_text {
            self.wrap_text = true;
        }
    }
}
