//! Shared string table
//!
//! Existing `<si>` entries are written back untouched; entries appended during
//! the session are streamed through a scratch file so that memory use does
//! not grow with the number of strings written.

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{escape_value, read_part_expecting, Node, Tag, XML_DECLARATION};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Location of the shared strings part inside the package
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

const SCRATCH_PART: &str = "xl/__sharedStrings.xml";

const EMPTY_TABLE: &str =
    r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"></sst>"#;

/// Default number of buffered bytes that triggers a write to the scratch file
pub const DEFAULT_FLUSH_BYTES: usize = 1024;

/// Append-only table of strings referenced by index from cells
///
/// Every [`SharedStrings::add_string`] allocates a new index, even for text
/// already in the table.
#[derive(Debug)]
pub struct SharedStrings {
    count: usize,
    existing: Vec<String>,
    buffer: String,
    flush_bytes: usize,
    files: Option<Files>,
}

#[derive(Debug)]
struct Files {
    part: BufWriter<File>,
    scratch: File,
    scratch_path: PathBuf,
    after: String,
}

impl SharedStrings {
    /// Open the table of the package expanded at `dir`, creating an empty one
    /// if the package has none
    pub fn open(dir: &Path, flush_bytes: usize) -> XlsxResult<Self> {
        let path = dir.join(SHARED_STRINGS_PART);
        if !path.exists() {
            fs::write(&path, format!("{}{}", XML_DECLARATION, EMPTY_TABLE))?;
        }

        let mut sst = read_part_expecting(&path, "sst")?;
        sst.delete_attr("count");
        sst.delete_attr("uniqueCount");

        let existing: Vec<String> = sst.elements().filter(|t| t.name == "si").map(item_text).collect();
        let splice_at = sst
            .children
            .iter()
            .rposition(|node| matches!(node, Node::Element(t) if t.name == "si"))
            .map_or(0, |i| i + 1);
        sst.children.insert(splice_at, Node::SplicePoint);

        let mut fragments = sst.fragments().into_iter();
        let before = fragments.next().unwrap_or_default();
        let after = fragments.next().unwrap_or_default();

        let mut part = BufWriter::new(File::create(&path)?);
        part.write_all(XML_DECLARATION.as_bytes())?;
        part.write_all(before.as_bytes())?;

        let scratch_path = dir.join(SCRATCH_PART);
        let scratch = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&scratch_path)?;

        log::debug!("opened shared strings with {} entries", existing.len());

        Ok(Self {
            count: existing.len(),
            existing,
            buffer: String::new(),
            flush_bytes,
            files: Some(Files {
                part,
                scratch,
                scratch_path,
                after,
            }),
        })
    }

    /// Append `text` and return its index
    pub fn add_string(&mut self, text: &str) -> XlsxResult<usize> {
        let files = self
            .files
            .as_mut()
            .ok_or_else(|| XlsxError::Closed("shared strings table".into()))?;

        let preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
        self.buffer.push_str(if preserve {
            r#"<si><t xml:space="preserve">"#
        } else {
            "<si><t>"
        });
        escape_value(&mut self.buffer, text);
        self.buffer.push_str("</t></si>");

        if self.buffer.len() > self.flush_bytes {
            files.scratch.write_all(self.buffer.as_bytes())?;
            self.buffer.clear();
        }

        let index = self.count;
        self.count += 1;
        Ok(index)
    }

    /// Text of an entry that was in the table when it was opened
    ///
    /// Rich text runs are concatenated. Entries appended in this session are
    /// not kept in memory and return `None`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.existing.get(index).map(String::as_str)
    }

    /// Number of entries, including those appended in this session
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Write the appended entries and the rest of the part, then remove the
    /// scratch file. Closing twice is a no-op.
    pub fn close(&mut self) -> XlsxResult<()> {
        let Some(mut files) = self.files.take() else {
            return Ok(());
        };

        files.scratch.write_all(self.buffer.as_bytes())?;
        self.buffer.clear();

        files.scratch.seek(SeekFrom::Start(0))?;
        io::copy(&mut files.scratch, &mut files.part)?;
        files.part.write_all(files.after.as_bytes())?;
        files.part.flush()?;

        drop(files.scratch);
        fs::remove_file(&files.scratch_path)?;

        log::debug!("closed shared strings with {} entries", self.count);
        Ok(())
    }
}

/// Plain text of an `<si>` item, ignoring phonetic runs
fn item_text(item: &Tag) -> String {
    let mut text = String::new();
    for child in item.elements() {
        match child.name.as_str() {
            "t" => text.push_str(&child.text()),
            "r" => {
                for run in child.elements().filter(|t| t.name == "t") {
                    text.push_str(&run.text());
                }
            }
            _ => {}
        }
    }
    text
}
