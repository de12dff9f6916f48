//! Prelude module - common imports for sheetsplice users
//!
//! ```rust
//! use sheetsplice::prelude::*;
//! ```

pub use crate::{
    // Values and addresses
    CellRef,
    CellValue,
    NumberValue,

    // Styles
    Border,
    BorderEdge,
    BorderLineStyle,
    Color,
    Font,
    HorizontalAlignment,
    Style,
    Underline,
    VerticalAlignment,

    // Package
    Cell,
    Row,
    Sheet,
    Workbook,
    WorkbookOptions,

    // Errors
    Error,
    Result,
};
