//! Workbook: an expanded package and the parts shared by its sheets
//!
//! A workbook lives in a scratch directory for its whole session. Opening a
//! file expands it there; [`Workbook::save`] closes every part, zips the
//! directory into the output file and removes it. Dropping a workbook without
//! saving removes the directory too.

use crate::content_types::{ContentTypes, CONTENT_TYPES_PART, SHARED_STRINGS_CONTENT_TYPE};
use crate::error::{XlsxError, XlsxResult};
use crate::options::WorkbookOptions;
use crate::package;
use crate::parts::SharedParts;
use crate::rels::{WorkbookRels, WORKBOOK_RELS_PART};
use crate::shared_strings::{SharedStrings, SHARED_STRINGS_PART};
use crate::sheet::Sheet;
use crate::styles::{Styles, STYLES_PART};
use crate::templates;
use crate::xml::{read_part_expecting, Node, Tag, XML_DECLARATION};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use unicode_normalization::UnicodeNormalization;

pub const WORKBOOK_PART: &str = "xl/workbook.xml";

const ROOT_RELS_PART: &str = "_rels/.rels";
const WORKSHEETS_DIR: &str = "xl/worksheets";

/// Parts a package must contain to be opened
const REQUIRED_PARTS: [&str; 4] = [CONTENT_TYPES_PART, WORKBOOK_PART, WORKBOOK_RELS_PART, STYLES_PART];

/// `<workbook>` children that follow `calcPr` in schema order
const AFTER_CALC_PR: [&str; 9] = [
    "oleSize",
    "customWorkbookViews",
    "pivotCaches",
    "smartTagPr",
    "smartTagTypes",
    "webPublishing",
    "fileRecoveryPr",
    "webPublishObjects",
    "extLst",
];

/// An open xlsx package
#[derive(Debug)]
pub struct Workbook {
    dir: TempDir,
    options: WorkbookOptions,
    content_types: ContentTypes,
    rels: WorkbookRels,
    parts: SharedParts,
    /// `workbook.xml` with a splice point where `<sheets>` was
    root: Tag,
    sheets: Tag,
    /// One per `<sheet>` element of `sheets`, in the same order
    slots: Vec<SheetSlot>,
}

#[derive(Debug)]
struct SheetSlot {
    rel_id: Option<String>,
    sheet: Option<Sheet>,
}

impl Workbook {
    /// Start a new, empty workbook
    pub fn create(options: WorkbookOptions) -> XlsxResult<Self> {
        let dir = scratch_dir(&options)?;
        fs::create_dir_all(dir.path().join("_rels"))?;
        fs::create_dir_all(dir.path().join("xl/_rels"))?;
        fs::create_dir_all(dir.path().join(WORKSHEETS_DIR))?;

        for (part, content) in [
            (CONTENT_TYPES_PART, templates::CONTENT_TYPES),
            (ROOT_RELS_PART, templates::ROOT_RELS),
            (WORKBOOK_PART, templates::WORKBOOK),
            (WORKBOOK_RELS_PART, templates::WORKBOOK_RELS),
            (STYLES_PART, templates::STYLES),
        ] {
            fs::write(dir.path().join(part), format!("{}{}", XML_DECLARATION, content))?;
        }

        Self::load(dir, options)
    }

    /// Open the xlsx file at `path`
    pub fn open<P: AsRef<Path>>(path: P, options: WorkbookOptions) -> XlsxResult<Self> {
        let dir = scratch_dir(&options)?;
        package::extract(path.as_ref(), dir.path())?;

        for part in REQUIRED_PARTS {
            if !dir.path().join(part).is_file() {
                return Err(XlsxError::MissingPart(part.to_string()));
            }
        }

        Self::load(dir, options)
    }

    fn load(dir: TempDir, options: WorkbookOptions) -> XlsxResult<Self> {
        let mut content_types = ContentTypes::open(dir.path())?;
        let styles = Styles::open(dir.path())?;
        let mut rels = WorkbookRels::open(dir.path())?;
        let strings = SharedStrings::open(dir.path(), options.shared_strings_flush_bytes)?;

        rels.add_shared_strings();
        content_types.add_override(&format!("/{}", SHARED_STRINGS_PART), SHARED_STRINGS_CONTENT_TYPE);

        let workbook_path = dir.path().join(WORKBOOK_PART);
        let mut root = read_part_expecting(&workbook_path, "workbook")?;
        let sheets = match root.position("sheets") {
            Some(i) => match std::mem::replace(&mut root.children[i], Node::SplicePoint) {
                Node::Element(sheets) => sheets,
                _ => Tag::new("sheets"),
            },
            None => {
                return Err(XlsxError::corrupt(&workbook_path, "workbook has no sheets element"));
            }
        };

        let slots = sheets
            .elements()
            .filter(|t| t.name == "sheet")
            .map(|t| SheetSlot {
                rel_id: relationship_id(t).map(str::to_string),
                sheet: None,
            })
            .collect::<Vec<_>>();

        log::debug!(
            "workbook loaded in {} with {} sheets",
            dir.path().display(),
            slots.len()
        );

        Ok(Self {
            dir,
            options,
            content_types,
            rels,
            parts: SharedParts::new(strings, styles),
            root,
            sheets,
            slots,
        })
    }

    /// The scratch directory holding the expanded package
    pub fn scratch_dir(&self) -> &Path {
        self.dir.path()
    }

    /// The string table and style registry shared by every sheet
    pub fn parts(&self) -> &SharedParts {
        &self.parts
    }

    fn sheet_elements(&self) -> impl Iterator<Item = &Tag> {
        self.sheets.elements().filter(|t| t.name == "sheet")
    }

    fn sheet_elements_mut(&mut self) -> impl Iterator<Item = &mut Tag> {
        self.sheets.elements_mut().filter(|t| t.name == "sheet")
    }

    /// Names of all sheets in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheet_elements()
            .map(|t| t.attr("name").unwrap_or_default().to_string())
            .collect()
    }

    fn find_sheet(&self, name: &str) -> Option<usize> {
        let key = sheet_key(name);
        self.sheet_elements()
            .position(|t| t.attr("name").map(sheet_key).as_deref() == Some(key.as_str()))
    }

    fn sheet_element_mut(&mut self, name: &str) -> XlsxResult<&mut Tag> {
        let index = self
            .find_sheet(name)
            .ok_or_else(|| XlsxError::SheetNotFound(name.to_string()))?;
        self.sheet_elements_mut()
            .nth(index)
            .ok_or_else(|| XlsxError::SheetNotFound(name.to_string()))
    }

    /// Open the sheet called `name`, adding a new one if there is none
    ///
    /// Names match case-insensitively after NFKC normalization. Opening an
    /// open sheet returns it as it is; a closed sheet is read again.
    pub fn open_sheet(&mut self, name: &str) -> XlsxResult<&mut Sheet> {
        match self.find_sheet(name) {
            Some(index) => self.open_existing(index),
            None => self.add_sheet(name),
        }
    }

    fn open_existing(&mut self, index: usize) -> XlsxResult<&mut Sheet> {
        let name = self
            .sheet_elements()
            .nth(index)
            .and_then(|t| t.attr("name"))
            .unwrap_or_default()
            .to_string();
        let slot = &mut self.slots[index];

        let sheet = match slot.sheet.take() {
            Some(sheet) => sheet,
            None => {
                let workbook_path = self.dir.path().join(WORKBOOK_PART);
                let rel_id = slot.rel_id.as_deref().ok_or_else(|| {
                    XlsxError::corrupt(&workbook_path, format!("sheet '{}' has no relationship", name))
                })?;
                let path = self.rels.part_path(self.dir.path(), rel_id).ok_or_else(|| {
                    XlsxError::corrupt(
                        &workbook_path,
                        format!("sheet '{}' has no worksheet part ({})", name, rel_id),
                    )
                })?;
                if !path.is_file() {
                    return Err(XlsxError::MissingPart(path.display().to_string()));
                }
                Sheet::open(path, &name, self.parts.clone())?
            }
        };

        let sheet = slot.sheet.insert(sheet);
        sheet.reopen()?;
        Ok(sheet)
    }

    fn add_sheet(&mut self, name: &str) -> XlsxResult<&mut Sheet> {
        let worksheets = self.dir.path().join(WORKSHEETS_DIR);
        fs::create_dir_all(&worksheets)?;

        let file_name = (1u32..)
            .map(|n| format!("sheet{}.xml", n))
            .find(|f| {
                !worksheets.join(f).exists()
                    && !self.content_types.has_override(&format!("/{}/{}", WORKSHEETS_DIR, f))
            })
            .unwrap_or_default();

        let sheet = Sheet::create(worksheets.join(&file_name), name, self.parts.clone())?;
        self.content_types.add_sheet(&file_name);
        let rel_id = self.rels.add_sheet(&file_name);

        let sheet_id = self
            .sheet_elements()
            .filter_map(|t| t.attr("sheetId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id_attr = format!("{}:id", self.relationships_prefix());
        self.sheets.children.push(
            Tag::new("sheet")
                .with_attr("name", name)
                .with_attr("sheetId", sheet_id.to_string())
                .with_attr(id_attr, rel_id.as_str())
                .into(),
        );

        log::debug!("added sheet '{}' as {} ({})", name, file_name, rel_id);
        self.slots.push(SheetSlot {
            rel_id: Some(rel_id),
            sheet: None,
        });
        let slot = self.slots.len() - 1;
        Ok(self.slots[slot].sheet.insert(sheet))
    }

    /// Prefix bound to the relationships namespace on the root, declaring
    /// `r` if there is none
    fn relationships_prefix(&mut self) -> String {
        let bound = self.root.attrs.iter().find_map(|a| {
            a.name
                .strip_prefix("xmlns:")
                .filter(|_| a.value == templates::NS_RELATIONSHIPS)
        });
        match bound {
            Some(prefix) => prefix.to_string(),
            None => {
                self.root.set_attr("xmlns:r", templates::NS_RELATIONSHIPS);
                "r".to_string()
            }
        }
    }

    /// Give the sheet `name` a new name
    pub fn rename_sheet(&mut self, name: &str, new_name: &str) -> XlsxResult<()> {
        let index = self
            .find_sheet(name)
            .ok_or_else(|| XlsxError::SheetNotFound(name.to_string()))?;
        if matches!(self.find_sheet(new_name), Some(other) if other != index) {
            return Err(XlsxError::DuplicateSheet(new_name.to_string()));
        }

        self.sheet_element_mut(name)?.set_attr("name", new_name);
        if let Some(sheet) = self.slots.get_mut(index).and_then(|s| s.sheet.as_mut()) {
            sheet.set_name(new_name);
        }
        Ok(())
    }

    pub fn hide_sheet(&mut self, name: &str) -> XlsxResult<()> {
        self.sheet_element_mut(name)?.set_attr("state", "hidden");
        Ok(())
    }

    pub fn show_sheet(&mut self, name: &str) -> XlsxResult<()> {
        self.sheet_element_mut(name)?.delete_attr("state");
        Ok(())
    }

    /// Ask spreadsheet applications to recalculate every formula on load
    pub fn set_force_formula_recalculation(&mut self, force: bool) {
        if let Some(calc) = self.root.child_mut("calcPr") {
            if force {
                calc.set_attr("fullCalcOnLoad", "1");
            } else {
                calc.delete_attr("fullCalcOnLoad");
            }
            return;
        }
        if !force {
            return;
        }

        let calc = Tag::new("calcPr").with_attr("fullCalcOnLoad", "1");
        let at = self
            .root
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(t) if AFTER_CALC_PR.contains(&t.name.as_str())))
            .unwrap_or(self.root.children.len());
        self.root.children.insert(at, calc.into());
    }

    /// Close every part and write the package to `path`
    ///
    /// Every part is closed even when an earlier one fails; the first error
    /// is returned and nothing is written in that case.
    pub fn save<P: AsRef<Path>>(mut self, path: P) -> XlsxResult<()> {
        let mut first_error = None;
        let mut record = |result: XlsxResult<()>| {
            if let Err(e) = result {
                log::debug!("closing a part failed: {}", e);
                first_error.get_or_insert(e);
            }
        };

        for slot in &mut self.slots {
            if let Some(sheet) = slot.sheet.as_mut() {
                record(sheet.close());
            }
        }
        record(self.parts.strings.borrow_mut().close());
        record(self.rels.close());
        record(self.parts.styles.borrow_mut().close());
        record(self.content_types.close());

        if let Some(e) = first_error {
            return Err(e);
        }

        let mut fragments = self.root.fragments().into_iter();
        let mut out = String::from(XML_DECLARATION);
        out.push_str(&fragments.next().unwrap_or_default());
        self.sheets.write_to(&mut out);
        out.push_str(&fragments.next().unwrap_or_default());
        fs::write(self.dir.path().join(WORKBOOK_PART), out)?;

        package::pack(self.dir.path(), path.as_ref(), self.options.compression_level)?;
        self.dir.close()?;
        Ok(())
    }
}

fn scratch_dir(options: &WorkbookOptions) -> XlsxResult<TempDir> {
    let prefix = chrono::Local::now().format("TEMP_%Y%m%d%H%M%S%3f").to_string();
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix);
    let dir = match &options.scratch_root {
        Some(root) => builder.tempdir_in(root)?,
        None => builder.tempdir()?,
    };
    log::debug!("scratch directory {}", dir.path().display());
    Ok(dir)
}

/// The relationship id attribute of a `<sheet>` element
fn relationship_id(sheet: &Tag) -> Option<&str> {
    sheet
        .attrs
        .iter()
        .find(|a| a.name == "r:id" || a.name.ends_with(":id"))
        .map(|a| a.value.as_str())
}

/// Sheet names compare equal when their NFKC forms match ignoring case
fn sheet_key(name: &str) -> String {
    name.nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn options(root: &Path) -> WorkbookOptions {
        WorkbookOptions::default().with_scratch_root(root)
    }

    fn read_entry(archive: &Path, name: &str) -> String {
        let mut zip = zip::ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
        let mut text = String::new();
        zip.by_name(name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_create_registers_parts() {
        let tmp = tempfile::tempdir().unwrap();
        let mut book = Workbook::create(options(tmp.path())).unwrap();
        let scratch = book.scratch_dir().to_path_buf();
        assert!(scratch
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("TEMP_"));

        book.open_sheet("Sheet1").unwrap();
        let out = tmp.path().join("new.xlsx");
        book.save(&out).unwrap();
        assert!(!scratch.exists());

        let types = read_entry(&out, CONTENT_TYPES_PART);
        assert!(types.contains(r#"PartName="/xl/sharedStrings.xml""#));
        assert!(types.contains(r#"PartName="/xl/worksheets/sheet1.xml""#));

        let rels = read_entry(&out, WORKBOOK_RELS_PART);
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains(r#"Id="rId3""#));

        let workbook = read_entry(&out, WORKBOOK_PART);
        assert!(workbook.contains(r#"<sheets><sheet name="Sheet1" sheetId="1" r:id="rId3"></sheet></sheets>"#));
    }

    #[test]
    fn test_sheet_names_match_loosely() {
        let tmp = tempfile::tempdir().unwrap();
        let mut book = Workbook::create(options(tmp.path())).unwrap();
        book.open_sheet("Data").unwrap();
        book.open_sheet("ＤＡＴＡ").unwrap();
        book.open_sheet("data").unwrap();
        assert_eq!(book.sheet_names(), vec!["Data"]);

        book.open_sheet("Other").unwrap();
        assert_eq!(book.sheet_names(), vec!["Data", "Other"]);
        let path = book.open_sheet("other").unwrap().path().to_path_buf();
        assert_eq!(path, book.scratch_dir().join("xl/worksheets/sheet2.xml"));
    }

    #[test]
    fn test_rename_hide_show() {
        let tmp = tempfile::tempdir().unwrap();
        let mut book = Workbook::create(options(tmp.path())).unwrap();
        book.open_sheet("One").unwrap();
        book.open_sheet("Two").unwrap();

        assert!(matches!(
            book.rename_sheet("One", "two"),
            Err(XlsxError::DuplicateSheet(_))
        ));
        assert!(matches!(
            book.rename_sheet("Missing", "x"),
            Err(XlsxError::SheetNotFound(_))
        ));
        book.rename_sheet("one", "ONE").unwrap();
        book.rename_sheet("Two", "Summary").unwrap();
        assert_eq!(book.open_sheet("summary").unwrap().name(), "Summary");
        assert_eq!(book.sheet_names(), vec!["ONE", "Summary"]);

        book.hide_sheet("ONE").unwrap();
        assert_eq!(book.sheets.child("sheet").unwrap().attr("state"), Some("hidden"));
        book.show_sheet("ONE").unwrap();
        assert_eq!(book.sheets.child("sheet").unwrap().attr("state"), None);
        assert!(book.hide_sheet("nope").is_err());
    }

    #[test]
    fn test_force_formula_recalculation() {
        let tmp = tempfile::tempdir().unwrap();
        let mut book = Workbook::create(options(tmp.path())).unwrap();
        book.set_force_formula_recalculation(false);
        assert!(book.root.child("calcPr").is_none());

        book.root.children.push(Tag::new("extLst").into());
        book.set_force_formula_recalculation(true);
        let names: Vec<&str> = book.root.elements().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["bookViews", "calcPr", "extLst"]);

        book.set_force_formula_recalculation(false);
        assert_eq!(book.root.child("calcPr").unwrap().attr("fullCalcOnLoad"), None);
    }

    #[test]
    fn test_open_requires_parts() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("broken.xlsx");
        let src = tempfile::tempdir().unwrap();
        fs::write(src.path().join(CONTENT_TYPES_PART), templates::CONTENT_TYPES).unwrap();
        package::pack(src.path(), &archive, None).unwrap();

        match Workbook::open(&archive, options(tmp.path())) {
            Err(XlsxError::MissingPart(part)) => assert_eq!(part, WORKBOOK_PART),
            other => panic!("unexpected result {other:?}"),
        }
        let leftovers = fs::read_dir(tmp.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().is_dir())
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_drop_removes_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let book = Workbook::create(options(tmp.path())).unwrap();
        let scratch = book.scratch_dir().to_path_buf();
        assert!(scratch.join(STYLES_PART).is_file());
        drop(book);
        assert!(!scratch.exists());
    }
}
