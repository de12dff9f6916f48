//! Worksheet stream rewriter
//!
//! A sheet is parsed once when opened. Its rows move out of the tree into
//! [`Row`] values; what remains is written out around them on the first
//! flush. Rows are then streamed to a scratch file in row order, and the
//! scratch file replaces the part on close.

use crate::columns::ColumnIntervals;
use crate::error::{XlsxError, XlsxResult};
use crate::parts::SharedParts;
use crate::row::Row;
use crate::templates;
use crate::xml::{read_part_expecting, Node, Tag, XML_DECLARATION};
use sheetsplice_core::{check_column, check_row};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One worksheet part
#[derive(Debug)]
pub struct Sheet {
    name: String,
    path: PathBuf,
    parts: SharedParts,
    open: Option<OpenSheet>,
}

#[derive(Debug)]
struct OpenSheet {
    /// Everything but the rows, until the first flush writes it out
    header: Option<Tag>,
    /// Text following the rows, known after the first flush
    after: String,
    out: BufWriter<File>,
    scratch_path: PathBuf,
    rows: Vec<Row>,
    columns: ColumnIntervals,
    /// Default styles seen by new cells; width edits never change them
    column_styles: Rc<ColumnIntervals>,
    flushed_through: u32,
}

impl Sheet {
    /// Write an empty worksheet to `path` and open it
    pub(crate) fn create(path: PathBuf, name: &str, parts: SharedParts) -> XlsxResult<Self> {
        fs::write(&path, format!("{}{}", XML_DECLARATION, templates::WORKSHEET))?;
        Self::open(path, name, parts)
    }

    /// Open the worksheet at `path`
    pub(crate) fn open(path: PathBuf, name: &str, parts: SharedParts) -> XlsxResult<Self> {
        let mut sheet = Self {
            name: name.to_string(),
            path,
            parts,
            open: None,
        };
        sheet.reopen()?;
        Ok(sheet)
    }

    /// Open the sheet again after [`Sheet::close`]; no-op while open
    pub(crate) fn reopen(&mut self) -> XlsxResult<()> {
        if self.open.is_none() {
            self.open = Some(OpenSheet::load(&self.path, &self.parts)?);
            log::debug!("opened sheet '{}' ({})", self.name, self.path.display());
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Location of the worksheet part
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Number of rows held in memory
    pub fn buffered_rows(&self) -> usize {
        self.open.as_ref().map_or(0, |s| s.rows.len())
    }

    fn state(&mut self) -> XlsxResult<&mut OpenSheet> {
        self.open
            .as_mut()
            .ok_or_else(|| XlsxError::Closed(format!("sheet '{}'", self.name)))
    }

    /// The row numbered `number`, created if the sheet has none
    ///
    /// Rows at or below a partial flush are gone from memory; asking for one
    /// again yields a new row that is written after the flushed ones.
    pub fn get_row(&mut self, number: u32) -> XlsxResult<&mut Row> {
        check_row(number)?;
        let parts = self.parts.clone();
        let state = self.state()?;
        if number <= state.flushed_through {
            log::warn!(
                "row {} requested after rows through {} were flushed",
                number,
                state.flushed_through
            );
        }

        let index = match state.rows.last() {
            None => 0,
            Some(last) if last.number() < number => state.rows.len(),
            Some(_) => match state.rows.binary_search_by_key(&number, Row::number) {
                Ok(i) => return Ok(&mut state.rows[i]),
                Err(i) => i,
            },
        };

        let row = Row::new(number, state.column_styles.clone(), parts);
        state.rows.insert(index, row);
        Ok(&mut state.rows[index])
    }

    /// Make sure every row in `from..=to` exists and return them
    ///
    /// Slot `i` of the result holds row `from + i`.
    pub fn create_rows(&mut self, from: u32, to: u32) -> XlsxResult<&mut [Row]> {
        let parts = self.parts.clone();
        let state = self.state()?;
        if from > to {
            return Ok(&mut []);
        }
        check_row(from)?;
        check_row(to)?;

        let start = state.rows.partition_point(|r| r.number() < from);
        let end = state.rows.partition_point(|r| r.number() <= to);
        let tail = state.rows.split_off(end);
        let mut existing = state.rows.split_off(start).into_iter().peekable();

        for number in from..=to {
            let row = match existing.next_if(|r| r.number() == number) {
                Some(row) => row,
                None => Row::new(number, state.column_styles.clone(), parts.clone()),
            };
            state.rows.push(row);
        }
        state.rows.extend(tail);

        let len = (to - from + 1) as usize;
        Ok(&mut state.rows[start..start + len])
    }

    /// Give `column` a custom width
    ///
    /// Ignored once the sheet header has been flushed.
    pub fn set_col_width(&mut self, column: u32, width: f64) -> XlsxResult<()> {
        check_column(column)?;
        let state = self.state()?;
        if state.header.is_none() {
            log::warn!("column {} width set after the sheet header was written", column);
            return Ok(());
        }
        state.columns.set_width(column, width)
    }

    /// Show or hide grid lines
    ///
    /// Ignored for sheets without a view element or once the sheet header has
    /// been flushed.
    pub fn show_gridlines(&mut self, show: bool) -> XlsxResult<()> {
        let state = self.state()?;
        let view = state
            .header
            .as_mut()
            .and_then(|ws| ws.child_mut("sheetViews"))
            .and_then(|views| views.elements_mut().filter(|t| t.name == "sheetView").last());

        match view {
            Some(view) => view.set_attr("showGridLines", if show { "1" } else { "0" }),
            None => log::warn!("sheet has no writable view settings, grid lines unchanged"),
        }
        Ok(())
    }

    /// Write every buffered row numbered `number` or lower
    pub fn output_through_row(&mut self, number: u32) -> XlsxResult<()> {
        let state = self.state()?;
        let count = state.rows.partition_point(|r| r.number() <= number);
        state.flush(count)?;
        state.flushed_through = state.flushed_through.max(number);
        Ok(())
    }

    /// Write every buffered row
    pub fn output_all(&mut self) -> XlsxResult<()> {
        let state = self.state()?;
        let count = state.rows.len();
        if let Some(last) = state.rows.last() {
            state.flushed_through = state.flushed_through.max(last.number());
        }
        state.flush(count)
    }

    /// Write all rows and the rest of the part, and replace the part with
    /// the result. Closing a closed sheet is a no-op.
    pub fn close(&mut self) -> XlsxResult<()> {
        let Some(mut state) = self.open.take() else {
            return Ok(());
        };

        let count = state.rows.len();
        state.flush(count)?;
        state.out.write_all(state.after.as_bytes())?;
        state.out.flush()?;
        drop(state.out);

        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        fs::rename(&state.scratch_path, &self.path)?;
        log::debug!("closed sheet '{}'", self.name);
        Ok(())
    }
}

impl OpenSheet {
    fn load(path: &Path, parts: &SharedParts) -> XlsxResult<Self> {
        let mut worksheet = read_part_expecting(path, "worksheet")?;
        let data_at = worksheet
            .position("sheetData")
            .ok_or_else(|| XlsxError::corrupt(path, "worksheet has no sheetData"))?;

        let cols_at = worksheet.children[..data_at]
            .iter()
            .position(|node| matches!(node, Node::Element(t) if t.name == "cols"));
        let columns = match cols_at {
            Some(i) => match &worksheet.children[i] {
                Node::Element(cols) => ColumnIntervals::from_tag(cols),
                _ => ColumnIntervals::default(),
            },
            None => ColumnIntervals::default(),
        };
        let column_styles = Rc::new(columns.clone());

        let mut rows = Vec::new();
        if let Some(Node::Element(data)) = worksheet.children.get_mut(data_at) {
            for node in std::mem::replace(&mut data.children, vec![Node::SplicePoint]) {
                if let Node::Element(tag) = node {
                    if tag.name == "row" {
                        let row = Row::from_tag(tag, column_styles.clone(), parts.clone())
                            .map_err(|e| XlsxError::corrupt(path, e.to_string()))?;
                        rows.push(row);
                    }
                }
            }
        }
        rows.sort_by_key(Row::number);

        match cols_at {
            Some(i) => worksheet.children[i] = Node::SplicePoint,
            None => worksheet.children.insert(data_at, Node::SplicePoint),
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let scratch_path = path.with_file_name(format!("__{}", file_name));
        let out = BufWriter::new(File::create(&scratch_path)?);

        log::debug!("loaded {} rows from {}", rows.len(), path.display());

        Ok(Self {
            header: Some(worksheet),
            after: String::new(),
            out,
            scratch_path,
            rows,
            columns,
            column_styles,
            flushed_through: 0,
        })
    }

    /// Write the header if still pending, then the first `count` rows
    fn flush(&mut self, count: usize) -> XlsxResult<()> {
        if let Some(worksheet) = self.header.take() {
            let mut fragments = worksheet.fragments().into_iter();
            let before = fragments.next().unwrap_or_default();
            let middle = fragments.next().unwrap_or_default();
            self.after = fragments.next().unwrap_or_default();

            self.out.write_all(XML_DECLARATION.as_bytes())?;
            self.out.write_all(before.as_bytes())?;
            if let Some(cols) = self.columns.to_tag() {
                self.out.write_all(cols.to_xml().as_bytes())?;
            }
            self.out.write_all(middle.as_bytes())?;
        }

        let mut buf = String::new();
        for mut row in self.rows.drain(..count) {
            row.reset_style_index();
            buf.clear();
            row.write_to(&mut buf);
            self.out.write_all(buf.as_bytes())?;
        }

        if count > 0 {
            log::debug!("flushed {} rows, {} still buffered", count, self.rows.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::fixture;
    use pretty_assertions::assert_eq;
    use sheetsplice_core::style::Style;

    fn sheet_path(dir: &Path) -> PathBuf {
        dir.join("xl/worksheets/sheet1.xml")
    }

    fn open_with(dir: &Path, parts: &SharedParts, xml: &str) -> XlsxResult<Sheet> {
        fs::write(sheet_path(dir), xml).unwrap();
        Sheet::open(sheet_path(dir), "Sheet1", parts.clone())
    }

    fn body(dir: &Path) -> String {
        let text = fs::read_to_string(sheet_path(dir)).unwrap();
        text.strip_prefix(XML_DECLARATION).unwrap().to_string()
    }

    #[test]
    fn test_untouched_sheet_round_trips() {
        let (dir, parts) = fixture::parts();
        let xml = r#"<worksheet><sheetData><row r="1"></row></sheetData><hoge></hoge></worksheet>"#;
        let mut sheet = open_with(dir.path(), &parts, xml).unwrap();
        sheet.close().unwrap();

        assert_eq!(body(dir.path()), xml);
        assert!(!dir.path().join("xl/worksheets/__sheet1.xml").exists());
    }

    #[test]
    fn test_create_and_write() {
        let (dir, parts) = fixture::parts();
        let mut sheet = Sheet::create(sheet_path(dir.path()), "Sheet1", parts.clone()).unwrap();
        sheet.get_row(10).unwrap().set_string(10, "hello world").unwrap();
        sheet.get_row(2).unwrap().set_number(1, 42).unwrap();
        sheet.close().unwrap();
        sheet.close().unwrap();

        assert_eq!(
            body(dir.path()),
            concat!(
                r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
                r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="x14ac" "#,
                r#"xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac">"#,
                r#"<sheetViews><sheetView workbookViewId="0"></sheetView></sheetViews>"#,
                r#"<sheetData><row r="2"><c r="A2"><v>42</v></c></row>"#,
                r#"<row r="10"><c r="J10" t="s"><v>0</v></c></row></sheetData>"#,
                "</worksheet>"
            )
        );
    }

    #[test]
    fn test_corrupt_parts() {
        let (dir, parts) = fixture::parts();
        let err = open_with(dir.path(), &parts, "<chartsheet></chartsheet>").unwrap_err();
        assert!(matches!(err, XlsxError::Corrupt { .. }));

        let err = open_with(dir.path(), &parts, "<worksheet><cols></cols></worksheet>").unwrap_err();
        assert!(matches!(err, XlsxError::Corrupt { .. }));

        let err = open_with(
            dir.path(),
            &parts,
            r#"<worksheet><sheetData><row r="1"><c r="one"></c></row></sheetData></worksheet>"#,
        )
        .unwrap_err();
        match err {
            XlsxError::Corrupt { path, .. } => assert_eq!(path, sheet_path(dir.path())),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_existing_rows_are_edited_in_place() {
        let (dir, parts) = fixture::parts();
        let mut sheet = open_with(
            dir.path(),
            &parts,
            concat!(
                r#"<worksheet><dimension ref="A1:B3"></dimension><sheetData>"#,
                r#"<row r="3"><c r="B3"><v>3</v></c></row>"#,
                r#"<row r="1" spans="1:2"><c r="A1"><v>1</v></c></row>"#,
                r#"</sheetData><pageMargins left="0.7"></pageMargins></worksheet>"#
            ),
        )
        .unwrap();
        assert_eq!(sheet.buffered_rows(), 2);

        sheet.get_row(1).unwrap().set_number(2, 2.5).unwrap();
        sheet.get_row(2).unwrap().set_formula(1, "A1+1").unwrap();
        sheet.close().unwrap();

        assert_eq!(
            body(dir.path()),
            concat!(
                r#"<worksheet><dimension ref="A1:B3"></dimension><sheetData>"#,
                r#"<row r="1" spans="1:2"><c r="A1"><v>1</v></c><c r="B1"><v>2.5</v></c></row>"#,
                r#"<row r="2"><c r="A2"><f>A1+1</f></c></row>"#,
                r#"<row r="3"><c r="B3"><v>3</v></c></row>"#,
                r#"</sheetData><pageMargins left="0.7"></pageMargins></worksheet>"#
            )
        );
    }

    #[test]
    fn test_partial_flush() {
        let (dir, parts) = fixture::parts();
        let mut sheet = Sheet::create(sheet_path(dir.path()), "Sheet1", parts).unwrap();

        for row in sheet.create_rows(1, 5).unwrap() {
            let n = row.number();
            row.set_number(1, n).unwrap();
        }
        sheet.output_through_row(3).unwrap();
        assert_eq!(sheet.buffered_rows(), 2);

        sheet.get_row(6).unwrap().set_number(1, 6).unwrap();
        sheet.output_all().unwrap();
        assert_eq!(sheet.buffered_rows(), 0);
        sheet.close().unwrap();

        let ws = Tag::parse_str(&body(dir.path())).unwrap();
        let numbers: Vec<&str> = ws
            .child("sheetData")
            .unwrap()
            .elements()
            .filter_map(|r| r.attr("r"))
            .collect();
        assert_eq!(numbers, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn test_create_rows_keeps_existing() {
        let (dir, parts) = fixture::parts();
        let mut sheet = open_with(
            dir.path(),
            &parts,
            r#"<worksheet><sheetData><row r="2" ht="30" customHeight="1"></row><row r="9"></row></sheetData></worksheet>"#,
        )
        .unwrap();

        let rows = sheet.create_rows(1, 4).unwrap();
        assert_eq!(rows.iter().map(Row::number).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(sheet.buffered_rows(), 5);
        sheet.close().unwrap();

        assert!(body(dir.path()).contains(r#"<row r="2" ht="30" customHeight="1"></row>"#));
    }

    #[test]
    fn test_col_width_without_cols() {
        let (dir, parts) = fixture::parts();
        let mut sheet = open_with(
            dir.path(),
            &parts,
            r#"<worksheet><sheetViews></sheetViews><sheetData></sheetData></worksheet>"#,
        )
        .unwrap();
        sheet.set_col_width(3, 20.0).unwrap();
        sheet.close().unwrap();

        assert_eq!(
            body(dir.path()),
            concat!(
                r#"<worksheet><sheetViews></sheetViews>"#,
                r#"<cols><col min="3" max="3" width="20" customWidth="1"></col></cols>"#,
                r#"<sheetData></sheetData></worksheet>"#
            )
        );
    }

    #[test]
    fn test_col_width_splits_existing_cols() {
        let (dir, parts) = fixture::parts();
        let mut sheet = open_with(
            dir.path(),
            &parts,
            r#"<worksheet><cols><col min="1" max="10" style="1"></col></cols><sheetData></sheetData></worksheet>"#,
        )
        .unwrap();
        sheet.set_col_width(5, 5.0).unwrap();
        sheet.get_row(1).unwrap().get_cell(5).unwrap().set_number(1);
        sheet.output_all().unwrap();
        sheet.set_col_width(7, 1.0).unwrap();
        sheet.close().unwrap();

        assert_eq!(
            body(dir.path()),
            concat!(
                r#"<worksheet><cols><col min="1" max="4" style="1"></col>"#,
                r#"<col min="5" max="5" style="1" width="5" customWidth="1"></col>"#,
                r#"<col min="6" max="10" style="1"></col></cols>"#,
                r#"<sheetData><row r="1"><c r="E1" s="1"><v>1</v></c></row></sheetData></worksheet>"#
            )
        );
    }

    #[test]
    fn test_show_gridlines() {
        let (dir, parts) = fixture::parts();
        let mut sheet = Sheet::create(sheet_path(dir.path()), "Sheet1", parts.clone()).unwrap();
        sheet.show_gridlines(false).unwrap();
        sheet.close().unwrap();
        assert!(body(dir.path()).contains(r#"<sheetView workbookViewId="0" showGridLines="0">"#));

        let mut sheet = open_with(dir.path(), &parts, "<worksheet><sheetData></sheetData></worksheet>").unwrap();
        sheet.show_gridlines(true).unwrap();
        sheet.close().unwrap();
        assert_eq!(body(dir.path()), "<worksheet><sheetData></sheetData></worksheet>");
    }

    #[test]
    fn test_styles_are_interned_on_flush() {
        let (dir, parts) = fixture::parts();
        let mut sheet = Sheet::create(sheet_path(dir.path()), "Sheet1", parts.clone()).unwrap();
        let row = sheet.get_row(1).unwrap();
        row.get_cell(1).unwrap().set_style(&Style::new().with_num_fmt(10));
        row.get_cell(2).unwrap().set_style(&Style::new().with_num_fmt(10));
        assert_eq!(parts.styles.borrow().style_count(), 1);

        sheet.close().unwrap();
        assert_eq!(parts.styles.borrow().style_count(), 2);
        assert!(body(dir.path()).contains(r#"<row r="1"><c r="A1" s="1"></c><c r="B1" s="1"></c></row>"#));
    }

    #[test]
    fn test_reopen_after_close() {
        let (dir, parts) = fixture::parts();
        let mut sheet = Sheet::create(sheet_path(dir.path()), "Sheet1", parts).unwrap();
        sheet.get_row(1).unwrap().set_number(1, 1).unwrap();
        sheet.close().unwrap();
        assert!(sheet.get_row(1).is_err());

        sheet.reopen().unwrap();
        assert_eq!(sheet.buffered_rows(), 1);
        sheet.get_row(1).unwrap().set_number(2, 2).unwrap();
        sheet.close().unwrap();
        assert!(body(dir.path()).contains(r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1"><v>2</v></c></row>"#));
        assert!(!dir.path().join("xl/worksheets/__sheet1.xml").exists());
    }

    #[test]
    fn test_out_of_range_addresses_are_rejected() {
        let (dir, parts) = fixture::parts();
        let mut sheet = Sheet::create(sheet_path(dir.path()), "Sheet1", parts).unwrap();
        assert!(sheet.get_row(0).is_err());
        assert!(sheet.get_row(sheetsplice_core::MAX_ROWS + 1).is_err());
        assert!(sheet.create_rows(0, 2).is_err());
        assert!(sheet.create_rows(1, sheetsplice_core::MAX_ROWS + 1).is_err());
        assert!(matches!(
            sheet.set_col_width(0, 4.0),
            Err(XlsxError::Core(sheetsplice_core::Error::InvalidAddress(_)))
        ));
        assert!(sheet.get_row(1).unwrap().get_cell(0).is_err());
        assert_eq!(sheet.buffered_rows(), 1);

        sheet.close().unwrap();
        let text = body(dir.path());
        assert!(!text.contains("<cols>"));
        assert!(text.contains(r#"<sheetData><row r="1"></row></sheetData>"#));
    }
}
