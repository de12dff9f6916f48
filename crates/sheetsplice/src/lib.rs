//! # sheetsplice
//!
//! Edit XLSX workbooks without loading them whole.
//!
//! Opening a workbook expands the package to a scratch directory. Sheets are
//! opened one at a time; rows are kept in memory only until they are flushed,
//! and every part of the file the library does not understand is written
//! back byte for byte as structured XML.
//!
//! ## Example
//!
//! ```rust
//! use sheetsplice::prelude::*;
//!
//! # fn main() -> sheetsplice::Result<()> {
//! let dir = tempfile::tempdir().unwrap();
//! let mut book = Workbook::create(WorkbookOptions::default())?;
//!
//! let sheet = book.open_sheet("Sheet1")?;
//! sheet.get_row(1)?.set_string(1, "Total")?;
//! sheet.get_row(1)?.set_formula(2, "SUM(B2:B100)")?;
//! for row in sheet.create_rows(2, 100)? {
//!     let n = row.number();
//!     row.set_number(2, n * 10)?;
//! }
//! sheet.output_through_row(50)?;
//!
//! book.save(dir.path().join("book.xlsx"))?;
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub use sheetsplice_core::{
    column_letters, column_number, format_date, format_float, Border, BorderEdge,
    BorderLineStyle, CellRef, Color, Font, HorizontalAlignment, NumberValue, Style, Underline,
    VerticalAlignment, FIRST_CUSTOM_NUM_FMT, MAX_COLS, MAX_ROWS, NUM_FMT_SHORT_DATE,
};
pub use sheetsplice_xlsx::{
    Cell, CellValue, ColumnInterval, ColumnIntervals, Row, SharedParts, SharedStrings, Sheet,
    Styles, Workbook, WorkbookOptions,
};

/// Errors from core value parsing or package handling
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Address, column or color parsing
    #[error(transparent)]
    Core(#[from] sheetsplice_core::Error),

    /// Reading, editing or saving a package
    #[error(transparent)]
    Xlsx(#[from] sheetsplice_xlsx::XlsxError),
}

/// Result type using the facade [`enum@Error`]
pub type Result<T> = std::result::Result<T, Error>;
