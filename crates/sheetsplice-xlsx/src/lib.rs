//! # sheetsplice-xlsx
//!
//! Streaming, incremental rewriting of XLSX (Office Open XML) packages.
//!
//! A [`Workbook`] expands a package into a scratch directory. Each opened
//! [`Sheet`] keeps its rows in memory until they are flushed in row order to
//! a scratch copy of the worksheet; everything else in the part is written
//! back as it was read. Strings and styles go to the workbook-wide
//! [`SharedStrings`] table and [`Styles`] registry.
//!
//! ```no_run
//! use sheetsplice_xlsx::{Workbook, WorkbookOptions};
//!
//! # fn main() -> sheetsplice_xlsx::XlsxResult<()> {
//! let mut book = Workbook::open("report.xlsx", WorkbookOptions::default())?;
//! let sheet = book.open_sheet("Summary")?;
//! sheet.get_row(10)?.set_string(10, "hello world")?;
//! book.save("report-out.xlsx")?;
//! # Ok(())
//! # }
//! ```

pub mod cell;
pub mod columns;
pub mod content_types;
pub mod error;
pub mod options;
pub mod package;
pub mod parts;
pub mod rels;
pub mod row;
pub mod shared_strings;
pub mod sheet;
pub mod styles;
pub mod templates;
pub mod workbook;
pub mod xml;

pub use cell::{Cell, CellValue};
pub use columns::{ColumnInterval, ColumnIntervals};
pub use error::{XlsxError, XlsxResult};
pub use options::WorkbookOptions;
pub use parts::SharedParts;
pub use row::Row;
pub use shared_strings::SharedStrings;
pub use sheet::Sheet;
pub use styles::Styles;
pub use workbook::Workbook;
