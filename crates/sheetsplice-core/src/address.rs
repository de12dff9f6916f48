//! Cell address and column letter types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use lazy_regex::regex_captures;
use std::fmt;
use std::str::FromStr;

/// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
///
/// Columns use a bijective base-26 numbering: there is no zero digit, so `Z`
/// is followed by `AA`.
///
/// # Panics
///
/// Panics if `column` is 0.
///
/// # Examples
/// ```
/// use sheetsplice_core::column_letters;
///
/// assert_eq!(column_letters(1), "A");
/// assert_eq!(column_letters(52), "AZ");
/// assert_eq!(column_letters(16384), "XFD");
/// ```
pub fn column_letters(column: u32) -> String {
    assert!(column >= 1, "column numbers start at 1");

    let mut letters = Vec::new();
    let mut n = column;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();

    letters.into_iter().map(char::from).collect()
}

/// Convert column letters to a 1-based column number (A = 1, Z = 26, AA = 27, etc.)
///
/// Letters are matched case-insensitively.
pub fn column_number(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidColumn("empty column letters".into()));
    }

    let mut column: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidColumn(format!(
                "invalid column letter '{}' in '{}'",
                c, letters
            )));
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        column = column
            .checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| Error::InvalidColumn(format!("'{}' is out of range", letters)))?;
    }

    Ok(column)
}

/// Check that `column` lies in `1..=MAX_COLS`
pub fn check_column(column: u32) -> Result<()> {
    if column == 0 || column > MAX_COLS {
        return Err(Error::InvalidAddress(format!(
            "column {} is outside 1..={}",
            column, MAX_COLS
        )));
    }
    Ok(())
}

/// Check that `row` lies in `1..=MAX_ROWS`
pub fn check_row(row: u32) -> Result<()> {
    if row == 0 || row > MAX_ROWS {
        return Err(Error::InvalidAddress(format!(
            "row {} is outside 1..={}",
            row, MAX_ROWS
        )));
    }
    Ok(())
}

/// A cell address as written in a `<c r="...">` attribute (e.g. `B7`)
///
/// Both coordinates are 1-based, matching the spreadsheet notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A = 1)
    pub column: u32,
}

impl CellRef {
    /// Create a new cell reference
    pub fn new(column: u32, row: u32) -> Self {
        Self { row, column }
    }

    /// Parse an address of the form `[A-Z]+[0-9]+`
    ///
    /// Absolute markers (`$`) and lowercase letters are rejected; worksheet
    /// parts never contain them.
    ///
    /// # Examples
    /// ```
    /// use sheetsplice_core::CellRef;
    ///
    /// let cell = CellRef::parse("B7").unwrap();
    /// assert_eq!(cell.column, 2);
    /// assert_eq!(cell.row, 7);
    /// assert!(CellRef::parse("b7").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (_, letters, digits) = regex_captures!(r"^([A-Z]+)([0-9]+)$", s)
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;

        let column = column_number(letters).map_err(|_| Error::InvalidAddress(s.to_string()))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row, column })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
