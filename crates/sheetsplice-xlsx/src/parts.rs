//! Handles to the workbook-wide parts that cells write into

use crate::shared_strings::SharedStrings;
use crate::styles::Styles;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared access to the string table and style registry
///
/// Every row and cell of a workbook holds a clone. The parts never point back
/// at cells.
#[derive(Debug, Clone)]
pub struct SharedParts {
    pub strings: Rc<RefCell<SharedStrings>>,
    pub styles: Rc<RefCell<Styles>>,
}

impl SharedParts {
    pub fn new(strings: SharedStrings, styles: Styles) -> Self {
        Self {
            strings: Rc::new(RefCell::new(strings)),
            styles: Rc::new(RefCell::new(styles)),
        }
    }
}
