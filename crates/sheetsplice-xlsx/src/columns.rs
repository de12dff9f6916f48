//! Column width and default style intervals (`<cols>`)

use crate::error::XlsxResult;
use crate::xml::{Attr, Tag};
use sheetsplice_core::{check_column, format_float};

/// One `<col>` element: columns `min..=max` share a width and default style
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInterval {
    pub min: u32,
    pub max: u32,
    pub style: Option<u32>,
    pub width: Option<f64>,
    pub custom_width: bool,
    /// Attributes carried through untouched (`hidden`, `bestFit`, ...)
    pub extra: Vec<Attr>,
}

impl ColumnInterval {
    pub fn contains(&self, column: u32) -> bool {
        self.min <= column && column <= self.max
    }

    fn from_tag(col: &Tag) -> Option<Self> {
        let mut interval = ColumnInterval {
            min: 0,
            max: 0,
            style: None,
            width: None,
            custom_width: false,
            extra: Vec::new(),
        };
        for attr in &col.attrs {
            match attr.name.as_str() {
                "min" => interval.min = attr.value.parse().ok()?,
                "max" => interval.max = attr.value.parse().ok()?,
                "style" => interval.style = attr.value.parse().ok(),
                "width" => interval.width = attr.value.parse().ok(),
                "customWidth" => interval.custom_width = matches!(attr.value.as_str(), "1" | "true"),
                _ => interval.extra.push(attr.clone()),
            }
        }
        (interval.min >= 1 && interval.min <= interval.max).then_some(interval)
    }

    fn to_tag(&self) -> Tag {
        let mut col = Tag::new("col")
            .with_attr("min", self.min.to_string())
            .with_attr("max", self.max.to_string());
        if let Some(style) = self.style {
            col.set_attr("style", style.to_string());
        }
        if let Some(width) = self.width {
            col.set_attr("width", format_float(width));
        }
        if self.custom_width {
            col.set_attr("customWidth", "1");
        }
        col.attrs.extend(self.extra.iter().cloned());
        col
    }
}

/// The intervals of a sheet, sorted by `min` and pairwise disjoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnIntervals {
    intervals: Vec<ColumnInterval>,
}

impl ColumnIntervals {
    /// Read the `<col>` children of a `<cols>` element
    ///
    /// Entries with unusable bounds, or overlapping an earlier entry, are
    /// dropped.
    pub fn from_tag(cols: &Tag) -> Self {
        let mut intervals: Vec<ColumnInterval> = cols
            .elements()
            .filter(|t| t.name == "col")
            .filter_map(|col| {
                let interval = ColumnInterval::from_tag(col);
                if interval.is_none() {
                    log::warn!("ignoring malformed column interval {}", col.to_xml());
                }
                interval
            })
            .collect();
        intervals.sort_by_key(|c| c.min);

        let mut disjoint: Vec<ColumnInterval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            match disjoint.last() {
                Some(last) if last.max >= interval.min => {
                    log::warn!(
                        "ignoring column interval {}:{} overlapping {}:{}",
                        interval.min,
                        interval.max,
                        last.min,
                        last.max
                    );
                }
                _ => disjoint.push(interval),
            }
        }

        Self {
            intervals: disjoint,
        }
    }

    pub fn as_slice(&self) -> &[ColumnInterval] {
        &self.intervals
    }

    /// Default style of `column`, if an interval covering it carries a nonzero one
    pub fn style_for(&self, column: u32) -> Option<u32> {
        self.intervals
            .iter()
            .find(|c| c.contains(column))
            .and_then(|c| c.style)
            .filter(|&style| style != 0)
    }

    /// Give `column` its own custom width, splitting the interval covering it
    pub fn set_width(&mut self, column: u32, width: f64) -> XlsxResult<()> {
        check_column(column)?;
        let i = self.intervals.partition_point(|c| c.max < column);

        let covering = match self.intervals.get_mut(i) {
            Some(c) if c.min <= column => c,
            _ => {
                self.intervals.insert(
                    i,
                    ColumnInterval {
                        min: column,
                        max: column,
                        style: None,
                        width: Some(width),
                        custom_width: true,
                        extra: Vec::new(),
                    },
                );
                return Ok(());
            }
        };

        let mut target = covering.clone();
        target.min = column;
        target.max = column;
        target.width = Some(width);
        target.custom_width = true;

        if covering.min == column && covering.max == column {
            *covering = target;
        } else if covering.min == column {
            covering.min += 1;
            self.intervals.insert(i, target);
        } else if covering.max == column {
            covering.max -= 1;
            self.intervals.insert(i + 1, target);
        } else {
            let mut after = covering.clone();
            after.min = column + 1;
            covering.max = column - 1;
            self.intervals.insert(i + 1, target);
            self.intervals.insert(i + 2, after);
        }
        Ok(())
    }

    /// The `<cols>` element, or `None` when there are no intervals
    pub fn to_tag(&self) -> Option<Tag> {
        if self.intervals.is_empty() {
            return None;
        }
        let mut cols = Tag::new("cols");
        for interval in &self.intervals {
            cols.children.push(interval.to_tag().into());
        }
        Some(cols)
    }
}
