use sheetsplice::WorkbookOptions;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Options keeping scratch directories inside the test's own temp dir
pub fn options(dir: &Path) -> WorkbookOptions {
    WorkbookOptions::default().with_scratch_root(dir)
}

/// Text of one entry of a saved package
pub fn read_part(archive: &Path, name: &str) -> String {
    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut text = String::new();
    zip.by_name(name).unwrap().read_to_string(&mut text).unwrap();
    text
}

/// Names of the entries of a saved package in archive order
pub fn entry_names(archive: &Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    zip.file_names().map(str::to_string).collect()
}
