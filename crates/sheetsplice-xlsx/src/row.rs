//! One `<row>` element and its cells

use crate::cell::Cell;
use crate::columns::ColumnIntervals;
use crate::error::{XlsxError, XlsxResult};
use crate::parts::SharedParts;
use crate::xml::Tag;
use chrono::NaiveDateTime;
use sheetsplice_core::{check_column, CellRef, NumberValue};
use std::rc::Rc;

/// A worksheet row holding its cells sorted by column
#[derive(Debug)]
pub struct Row {
    /// The element's attributes; cells are kept outside of it
    tag: Tag,
    number: u32,
    style: Option<u32>,
    cells: Vec<Cell>,
    columns: Rc<ColumnIntervals>,
    parts: SharedParts,
}

impl Row {
    pub(crate) fn from_tag(
        mut tag: Tag,
        columns: Rc<ColumnIntervals>,
        parts: SharedParts,
    ) -> XlsxResult<Self> {
        let number = tag
            .attr("r")
            .and_then(|r| r.parse::<u32>().ok())
            .filter(|&r| r >= 1)
            .ok_or_else(|| XlsxError::Malformed("row without a valid r attribute".into()))?;
        let style = tag.attr("s").and_then(|s| s.parse().ok());

        let mut cells = Vec::new();
        for child in std::mem::take(&mut tag.children) {
            if let crate::xml::Node::Element(c) = child {
                if c.name == "c" {
                    cells.push(Cell::from_tag(c, parts.clone())?);
                }
            }
        }
        cells.sort_by_key(Cell::column);

        Ok(Self {
            tag,
            number,
            style,
            cells,
            columns,
            parts,
        })
    }

    pub(crate) fn new(number: u32, columns: Rc<ColumnIntervals>, parts: SharedParts) -> Self {
        Self {
            tag: Tag::new("row").with_attr("r", number.to_string()),
            number,
            style: None,
            cells: Vec::new(),
            columns,
            parts,
        }
    }

    /// Row number (1-based)
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Cells present in the row, sorted by column
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell at `column`, created if the row has none there
    ///
    /// A new cell takes the row's default style, else the default style of
    /// the column.
    pub fn get_cell(&mut self, column: u32) -> XlsxResult<&mut Cell> {
        check_column(column)?;
        let index = match self.cells.last() {
            None => 0,
            Some(last) if last.column() < column => self.cells.len(),
            Some(_) => match self.cells.binary_search_by_key(&column, Cell::column) {
                Ok(i) => return Ok(&mut self.cells[i]),
                Err(i) => i,
            },
        };

        let cell = self.new_cell(column);
        self.cells.insert(index, cell);
        Ok(&mut self.cells[index])
    }

    /// Make sure every column in `from..=to` has a cell and return them
    ///
    /// Slot `i` of the result holds column `from + i`.
    pub fn create_cells(&mut self, from: u32, to: u32) -> XlsxResult<&mut [Cell]> {
        if from > to {
            return Ok(&mut []);
        }
        check_column(from)?;
        check_column(to)?;

        let start = self.cells.partition_point(|c| c.column() < from);
        let end = self.cells.partition_point(|c| c.column() <= to);
        let tail = self.cells.split_off(end);
        let mut existing = self.cells.split_off(start).into_iter().peekable();

        for column in from..=to {
            let cell = match existing.next_if(|c| c.column() == column) {
                Some(cell) => cell,
                None => self.new_cell(column),
            };
            self.cells.push(cell);
        }
        self.cells.extend(tail);

        let len = (to - from + 1) as usize;
        Ok(&mut self.cells[start..start + len])
    }

    fn new_cell(&self, column: u32) -> Cell {
        let style = self
            .style
            .or_else(|| self.columns.style_for(column))
            .unwrap_or(0);
        Cell::new(CellRef::new(column, self.number), style, self.parts.clone())
    }

    pub fn set_string(&mut self, column: u32, text: &str) -> XlsxResult<&mut Cell> {
        self.get_cell(column)?.set_string(text)
    }

    pub fn set_number<N: NumberValue>(&mut self, column: u32, value: N) -> XlsxResult<&mut Cell> {
        Ok(self.get_cell(column)?.set_number(value))
    }

    pub fn set_formula(&mut self, column: u32, formula: &str) -> XlsxResult<&mut Cell> {
        Ok(self.get_cell(column)?.set_formula(formula))
    }

    pub fn set_date(&mut self, column: u32, value: &NaiveDateTime) -> XlsxResult<&mut Cell> {
        Ok(self.get_cell(column)?.set_date(value))
    }

    /// Set a custom row height in points
    pub fn set_height(&mut self, height: f64) {
        self.tag.set_attr("customHeight", "1");
        self.tag.set_attr("ht", format!("{:.4}", height));
    }

    pub(crate) fn reset_style_index(&mut self) {
        for cell in &mut self.cells {
            cell.reset_style_index();
        }
    }

    pub(crate) fn write_to(&mut self, out: &mut String) {
        self.cells.sort_by_key(Cell::column);
        self.tag.write_start(out);
        for cell in &self.cells {
            cell.write_to(out);
        }
        self.tag.write_end(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::fixture;
    use pretty_assertions::assert_eq;

    fn columns(row: &Row) -> Vec<u32> {
        row.cells().iter().map(Cell::column).collect()
    }

    fn xml(row: &mut Row) -> String {
        let mut out = String::new();
        row.write_to(&mut out);
        out
    }

    fn parse(parts: &SharedParts, cols: ColumnIntervals, xml: &str) -> XlsxResult<Row> {
        Row::from_tag(Tag::parse_str(xml).unwrap(), Rc::new(cols), parts.clone())
    }

    #[test]
    fn test_from_tag() {
        let (_dir, parts) = fixture::parts();
        let row = parse(
            &parts,
            ColumnIntervals::default(),
            r#"<row r="3" spans="1:7"><c r="G3"></c><c r="B3"><v>2</v></c></row>"#,
        )
        .unwrap();
        assert_eq!(row.number(), 3);
        assert_eq!(columns(&row), vec![2, 7]);

        assert!(parse(&parts, ColumnIntervals::default(), r#"<row><c r="A1"></c></row>"#).is_err());
        assert!(parse(&parts, ColumnIntervals::default(), r#"<row r="1"><c r="1A"></c></row>"#).is_err());
    }

    #[test]
    fn test_get_cell_keeps_order() {
        let (_dir, parts) = fixture::parts();
        let mut row = parse(
            &parts,
            ColumnIntervals::default(),
            r#"<row r="1"><c r="B1"></c><c r="G1"></c></row>"#,
        )
        .unwrap();

        assert_eq!(row.get_cell(5).unwrap().column(), 5);
        assert_eq!(columns(&row), vec![2, 5, 7]);
        row.get_cell(1).unwrap();
        row.get_cell(9).unwrap();
        row.get_cell(5).unwrap();
        assert_eq!(columns(&row), vec![1, 2, 5, 7, 9]);
    }

    #[test]
    fn test_new_cell_default_style() {
        let (_dir, parts) = fixture::parts();
        let cols = ColumnIntervals::from_tag(
            &Tag::parse_str(r#"<cols><col min="2" max="4" style="6"></col></cols>"#).unwrap(),
        );

        let mut row = parse(&parts, cols.clone(), r#"<row r="1"></row>"#).unwrap();
        assert_eq!(row.get_cell(3).unwrap().style_index(), 6);
        assert_eq!(row.get_cell(5).unwrap().style_index(), 0);

        let mut row = parse(&parts, cols, r#"<row r="2" s="9" customFormat="1"></row>"#).unwrap();
        assert_eq!(row.get_cell(3).unwrap().style_index(), 9);
        assert_eq!(xml(&mut row), r#"<row r="2" s="9" customFormat="1"><c r="C2" s="9"></c></row>"#);
    }

    #[test]
    fn test_create_cells() {
        let (_dir, parts) = fixture::parts();
        let mut row = parse(
            &parts,
            ColumnIntervals::default(),
            r#"<row r="4"><c r="A4"><v>1</v></c><c r="C4"><v>3</v></c><c r="H4"></c></row>"#,
        )
        .unwrap();

        let cells = row.create_cells(2, 5).unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells.iter().map(Cell::column).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        cells[2].set_number(4);

        assert_eq!(columns(&row), vec![1, 2, 3, 4, 5, 8]);
        assert_eq!(row.cells()[2].text(), Some("3".into()));
        assert_eq!(row.cells()[3].text(), Some("4".into()));
        assert!(row.create_cells(3, 2).unwrap().is_empty());
    }

    #[test]
    fn test_setters_and_height() {
        let (_dir, parts) = fixture::parts();
        let mut row = Row::new(10, Rc::new(ColumnIntervals::default()), parts);
        row.set_string(10, "hello world").unwrap();
        row.set_number(2, 1.5).unwrap();
        row.set_formula(3, "B10*2").unwrap();
        row.set_height(20.5);

        assert_eq!(
            xml(&mut row),
            concat!(
                r#"<row r="10" customHeight="1" ht="20.5000">"#,
                r#"<c r="B10"><v>1.5</v></c><c r="C10"><f>B10*2</f></c>"#,
                r#"<c r="J10" t="s"><v>0</v></c></row>"#
            )
        );
    }

    #[test]
    fn test_column_out_of_range() {
        let (_dir, parts) = fixture::parts();
        let mut row = Row::new(1, Rc::new(ColumnIntervals::default()), parts);

        assert!(matches!(
            row.get_cell(0),
            Err(XlsxError::Core(sheetsplice_core::Error::InvalidAddress(_)))
        ));
        assert!(row.get_cell(sheetsplice_core::MAX_COLS + 1).is_err());
        assert!(row.create_cells(0, 3).is_err());
        assert!(row.create_cells(16_380, 16_385).is_err());
        assert!(row.set_string(0, "x").is_err());
        assert!(row.cells().is_empty());

        assert_eq!(row.get_cell(sheetsplice_core::MAX_COLS).unwrap().address().to_string(), "XFD1");
    }
}
