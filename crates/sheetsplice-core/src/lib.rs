//! # sheetsplice-core
//!
//! Value types shared by the sheetsplice xlsx rewriter.
//!
//! - [`column_letters`] / [`column_number`] - the bijective base-26 column codec
//! - [`CellRef`] - a parsed `B7`-style cell address
//! - [`Style`] - the composite cell format interned by the style registry,
//!   together with [`Font`], [`Border`] and [`Color`]
//! - [`NumberValue`] and [`format_date`] - the text forms written into `<v>` elements
//!
//! ## Example
//!
//! ```rust
//! use sheetsplice_core::{column_letters, column_number, CellRef};
//!
//! assert_eq!(column_letters(27), "AA");
//! assert_eq!(column_number("AZ").unwrap(), 52);
//!
//! let cell = CellRef::parse("J10").unwrap();
//! assert_eq!((cell.column, cell.row), (10, 10));
//! ```

pub mod address;
pub mod error;
pub mod format;
pub mod style;

pub use address::{check_column, check_row, column_letters, column_number, CellRef};
pub use error::{Error, Result};
pub use format::{format_date, format_float, NumberValue};
pub use style::{
    Border, BorderEdge, BorderLineStyle, Color, Font, HorizontalAlignment, Style, Underline,
    VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Number format id of the built-in short date format (`mm-dd-yy`)
pub const NUM_FMT_SHORT_DATE: u32 = 14;

/// First id handed out for custom number formats
pub const FIRST_CUSTOM_NUM_FMT: u32 = 200;
