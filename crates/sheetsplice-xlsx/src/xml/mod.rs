//! XML tree, escaping and part file helpers

mod escape;
mod namespace;
mod tag;

pub use escape::{escape_text, escape_value};
pub use namespace::Namespaces;
pub use tag::{Attr, Node, Tag};

use crate::error::{XlsxError, XlsxResult};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Declaration written at the top of every part
pub const XML_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Parse a part file; XML errors are reported as corruption of that part
pub fn read_part(path: &Path) -> XlsxResult<Tag> {
    let file = File::open(path)?;
    Tag::parse(BufReader::new(file)).map_err(|e| match e {
        XlsxError::Xml(_) | XlsxError::Malformed(_) => XlsxError::corrupt(path, e.to_string()),
        other => other,
    })
}

/// Parse a part file and check the name of its root element
pub fn read_part_expecting(path: &Path, root: &str) -> XlsxResult<Tag> {
    let tag = read_part(path)?;
    if tag.name != root {
        return Err(XlsxError::corrupt(
            path,
            format!("root element is <{}>, expected <{}>", tag.name, root),
        ));
    }
    Ok(tag)
}

/// Write a part file as the declaration followed by `tag`
pub fn write_part(path: &Path, tag: &Tag) -> XlsxResult<()> {
    let mut out = String::from(XML_DECLARATION);
    tag.write_to(&mut out);
    fs::write(path, out)?;
    Ok(())
}
