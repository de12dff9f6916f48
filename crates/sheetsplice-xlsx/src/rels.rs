//! Workbook relationships (`xl/_rels/workbook.xml.rels`)

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{read_part_expecting, write_part, Tag};
use lazy_regex::regex_captures;
use std::path::{Component, Path, PathBuf};

pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

pub const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub const REL_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// Relationships from the workbook part to its sheets, styles and strings
#[derive(Debug)]
pub struct WorkbookRels {
    path: PathBuf,
    root: Tag,
    closed: bool,
}

impl WorkbookRels {
    pub fn open(dir: &Path) -> XlsxResult<Self> {
        let path = dir.join(WORKBOOK_RELS_PART);
        if !path.is_file() {
            return Err(XlsxError::MissingPart(WORKBOOK_RELS_PART.into()));
        }
        let root = read_part_expecting(&path, "Relationships")?;
        Ok(Self {
            path,
            root,
            closed: false,
        })
    }

    fn relationships(&self) -> impl Iterator<Item = &Tag> {
        self.root.elements().filter(|t| t.name == "Relationship")
    }

    /// Location of the part the relationship `id` points at, inside the
    /// package expanded at `dir`
    ///
    /// External targets and targets leaving the package resolve to `None`.
    pub fn part_path(&self, dir: &Path, id: &str) -> Option<PathBuf> {
        let rel = self.relationships().find(|t| t.attr("Id") == Some(id))?;
        if rel.attr("TargetMode") == Some("External") {
            return None;
        }
        let target = rel.attr("Target")?;
        let relative = match target.strip_prefix('/') {
            Some(absolute) => PathBuf::from(absolute),
            None => Path::new("xl").join(target),
        };
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            log::warn!("relationship {} has unsupported target '{}'", id, target);
            return None;
        }
        Some(dir.join(relative))
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.relationships().any(|t| t.attr("Target") == Some(target))
    }

    /// Add a relationship and return its id, one past the highest `rIdN` in use
    pub fn add(&mut self, kind: &str, target: &str) -> String {
        let next = self
            .relationships()
            .filter_map(|t| {
                let (_, n) = regex_captures!(r"^rId([0-9]+)$", t.attr("Id")?)?;
                n.parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{}", next);
        self.root.children.push(
            Tag::new("Relationship")
                .with_attr("Id", id.as_str())
                .with_attr("Type", kind)
                .with_attr("Target", target)
                .into(),
        );
        id
    }

    /// Reference `sharedStrings.xml` unless some relationship already does
    pub fn add_shared_strings(&mut self) {
        if !self.has_target("sharedStrings.xml") && !self.has_target("/xl/sharedStrings.xml") {
            self.add(REL_SHARED_STRINGS, "sharedStrings.xml");
        }
    }

    /// Reference the worksheet `xl/worksheets/<file_name>` and return the new id
    pub fn add_sheet(&mut self, file_name: &str) -> String {
        self.add(REL_WORKSHEET, &format!("worksheets/{}", file_name))
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
