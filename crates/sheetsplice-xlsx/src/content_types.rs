//! Package content types (`[Content_Types].xml`)

use crate::error::XlsxResult;
use crate::xml::{read_part_expecting, write_part, Tag};
use std::path::{Path, PathBuf};

/// Location of the content types part inside the package
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
pub const SHARED_STRINGS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";

/// The `<Types>` table mapping part names to content types
#[derive(Debug)]
pub struct ContentTypes {
    path: PathBuf,
    root: Tag,
    closed: bool,
}

impl ContentTypes {
    pub fn open(dir: &Path) -> XlsxResult<Self> {
        let path = dir.join(CONTENT_TYPES_PART);
        let root = read_part_expecting(&path, "Types")?;
        Ok(Self {
            path,
            root,
            closed: false,
        })
    }

    fn overrides(&self) -> impl Iterator<Item = &Tag> {
        self.root.elements().filter(|t| t.name == "Override")
    }

    /// Whether `part_name` (e.g. `/xl/styles.xml`) has an override entry
    pub fn has_override(&self, part_name: &str) -> bool {
        self.overrides().any(|t| t.attr("PartName") == Some(part_name))
    }

    /// Register `part_name`; an existing entry is left alone
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        if self.has_override(part_name) {
            return;
        }
        self.root.children.push(
            Tag::new("Override")
                .with_attr("PartName", part_name)
                .with_attr("ContentType", content_type)
                .into(),
        );
    }

    /// Register a worksheet stored as `xl/worksheets/<file_name>`
    pub fn add_sheet(&mut self, file_name: &str) {
        self.add_override(&format!("/xl/worksheets/{}", file_name), WORKSHEET_CONTENT_TYPE);
    }

    /// Write the part back. Closing twice is a no-op.
    pub fn close(&mut self) -> XlsxResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        write_part(&self.path, &self.root)
    }
}
