//! One `<c>` element of a worksheet

use crate::error::{XlsxError, XlsxResult};
use crate::parts::SharedParts;
use crate::xml::Tag;
use chrono::NaiveDateTime;
use sheetsplice_core::style::{Border, Color, Font, Style};
use sheetsplice_core::{format_date, CellRef, NumberValue, NUM_FMT_SHORT_DATE};

/// The value currently stored in a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// No value
    Empty,
    /// Number, as written in the part
    Number(String),
    /// Index into the shared string table
    SharedString(usize),
    /// Formula text, without the leading `=`
    Formula(String),
    /// ISO 8601 date-time text
    Date(String),
    /// Text stored inside the cell
    InlineString(String),
    /// Any other cell type (booleans, errors, formula string results)
    Other { kind: String, text: String },
}

/// A worksheet cell
///
/// Values are written straight into the underlying element. The style is
/// resolved from the registry on first use and only interned again at flush
/// time if it was changed.
#[derive(Debug)]
pub struct Cell {
    tag: Tag,
    address: CellRef,
    style_index: u32,
    style: Option<Style>,
    dirty: bool,
    parts: SharedParts,
}

impl Cell {
    /// Wrap a parsed `<c>` element
    pub(crate) fn from_tag(tag: Tag, parts: SharedParts) -> XlsxResult<Self> {
        let address = match tag.attr("r") {
            Some(r) => CellRef::parse(r)?,
            None => return Err(XlsxError::Malformed("cell without an r attribute".into())),
        };
        let style_index = tag.attr("s").and_then(|s| s.parse().ok()).unwrap_or(0);

        Ok(Self {
            tag,
            address,
            style_index,
            style: None,
            dirty: false,
            parts,
        })
    }

    /// A new empty cell
    pub(crate) fn new(address: CellRef, style_index: u32, parts: SharedParts) -> Self {
        let mut tag = Tag::new("c").with_attr("r", address.to_string());
        if style_index != 0 {
            tag.set_attr("s", style_index.to_string());
        }

        Self {
            tag,
            address,
            style_index,
            style: None,
            dirty: false,
            parts,
        }
    }

    /// Column number (1-based)
    pub fn column(&self) -> u32 {
        self.address.column
    }

    /// Row number (1-based)
    pub fn row(&self) -> u32 {
        self.address.row
    }

    pub fn address(&self) -> CellRef {
        self.address
    }

    /// Style index as last written to the element
    pub fn style_index(&self) -> u32 {
        self.style_index
    }

    /// Store `text` in the shared string table and reference it
    pub fn set_string(&mut self, text: &str) -> XlsxResult<&mut Self> {
        let index = self.parts.strings.borrow_mut().add_string(text)?;
        self.set_value(index.to_string());
        self.tag.set_attr("t", "s");
        Ok(self)
    }

    pub fn set_number<N: NumberValue>(&mut self, value: N) -> &mut Self {
        self.set_value(value.to_number_text());
        self.tag.delete_attr("t");
        self
    }

    /// Replace the value with a formula (without the leading `=`)
    pub fn set_formula(&mut self, formula: &str) -> &mut Self {
        self.tag.children = vec![Tag::new("f").with_text(formula).into()];
        self.tag.delete_attr("t");
        self
    }

    /// Store a date; a cell without a number format gets the short date format
    pub fn set_date(&mut self, value: &NaiveDateTime) -> &mut Self {
        self.set_value(format_date(value));
        self.tag.set_attr("t", "d");
        if self.style().num_fmt_id == 0 {
            self.set_style(&Style::new().with_num_fmt(NUM_FMT_SHORT_DATE));
        }
        self
    }

    fn set_value(&mut self, text: String) {
        self.tag.children = vec![Tag::new("v").with_text(text).into()];
    }

    /// The value stored in the element
    pub fn value(&self) -> CellValue {
        if let Some(formula) = self.tag.child("f") {
            return CellValue::Formula(formula.text());
        }

        let kind = self.tag.attr("t");
        if kind == Some("inlineStr") {
            let text = self.tag.child("is").map(Tag::text).unwrap_or_default();
            return CellValue::InlineString(text);
        }

        let Some(text) = self.tag.child("v").map(Tag::text) else {
            return CellValue::Empty;
        };
        match kind {
            None | Some("n") => CellValue::Number(text),
            Some("d") => CellValue::Date(text),
            Some("s") => match text.trim().parse() {
                Ok(index) => CellValue::SharedString(index),
                Err(_) => CellValue::Other {
                    kind: "s".into(),
                    text,
                },
            },
            Some(kind) => CellValue::Other {
                kind: kind.to_string(),
                text,
            },
        }
    }

    /// The value as text, resolving shared strings; `None` for formulas and
    /// empty cells
    ///
    /// Only strings present when the workbook was opened resolve. A string
    /// set in this session reads back after the workbook is saved and
    /// reopened.
    pub fn text(&self) -> Option<String> {
        match self.value() {
            CellValue::Empty | CellValue::Formula(_) => None,
            CellValue::SharedString(index) => self
                .parts
                .strings
                .borrow()
                .get(index)
                .map(str::to_string),
            CellValue::Number(text)
            | CellValue::Date(text)
            | CellValue::InlineString(text)
            | CellValue::Other { text, .. } => Some(text),
        }
    }

    /// The cell's style, resolved from the registry on first call
    pub fn style(&mut self) -> &Style {
        self.resolved()
    }

    /// Overlay the set fields of `patch` onto the cell's style
    pub fn set_style(&mut self, patch: &Style) -> &mut Self {
        self.update_style(|style| style.merge(patch))
    }

    /// Replace the cell's style entirely, clearing fields `patch` leaves unset
    pub fn replace_style(&mut self, style: Style) -> &mut Self {
        self.update_style(|current| *current = style)
    }

    pub fn set_font(&mut self, font: &Font) -> &mut Self {
        let id = self.parts.styles.borrow_mut().set_font(font);
        self.update_style(|style| style.font_id = id)
    }

    pub fn set_background_color(&mut self, color: &Color) -> &mut Self {
        let id = self.parts.styles.borrow_mut().set_background_color(color);
        self.update_style(|style| style.fill_id = id)
    }

    pub fn set_border(&mut self, border: &Border) -> &mut Self {
        let id = self.parts.styles.borrow_mut().set_border(border);
        self.update_style(|style| style.border_id = id)
    }

    pub fn set_num_fmt(&mut self, format_code: &str) -> &mut Self {
        let id = self.parts.styles.borrow_mut().set_num_fmt(format_code);
        self.update_style(|style| style.num_fmt_id = id)
    }

    fn resolved(&mut self) -> &mut Style {
        let index = self.style_index;
        let styles = &self.parts.styles;
        self.style
            .get_or_insert_with(|| styles.borrow().get_style(index).unwrap_or_default())
    }

    fn update_style<F: FnOnce(&mut Style)>(&mut self, f: F) -> &mut Self {
        f(self.resolved());
        self.dirty = true;
        self
    }

    /// Intern a changed style and point the element at it
    pub(crate) fn reset_style_index(&mut self) {
        if !self.dirty {
            return;
        }
        if let Some(style) = &self.style {
            let index = self.parts.styles.borrow_mut().set_style(style);
            self.style_index = index;
            self.tag.set_attr("s", index.to_string());
        }
        self.dirty = false;
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        self.tag.write_to(out);
    }
}
