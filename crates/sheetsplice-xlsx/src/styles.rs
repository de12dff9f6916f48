//! XLSX style registry (styles.xml)
//!
//! Number formats, fonts, fills and borders are append-only tables: every
//! call adds an entry. Composite cell formats (`cellXfs`) are deduplicated on
//! structural equality of [`Style`].

use crate::error::XlsxResult;
use crate::xml::{read_part_expecting, write_part, Node, Tag};
use sheetsplice_core::style::{
    Border, BorderEdge, Color, Font, HorizontalAlignment, Style, VerticalAlignment,
};
use sheetsplice_core::{format_float, FIRST_CUSTOM_NUM_FMT};
use std::path::{Path, PathBuf};

/// Location of the styles part inside the package
pub const STYLES_PART: &str = "xl/styles.xml";

/// Children of `<styleSheet>` in schema order
const SECTIONS: [&str; 11] = [
    "numFmts",
    "fonts",
    "fills",
    "borders",
    "cellStyleXfs",
    "cellXfs",
    "cellStyles",
    "dxfs",
    "tableStyles",
    "colors",
    "extLst",
];

/// Workbook-wide registry of cell formats
#[derive(Debug)]
pub struct Styles {
    path: PathBuf,
    root: Tag,
    /// Parsed `cellXfs`, index = xf position
    styles: Vec<Style>,
    next_num_fmt_id: u32,
    closed: bool,
}

impl Styles {
    /// Open the styles part of the package expanded at `dir`
    pub fn open(dir: &Path) -> XlsxResult<Self> {
        let path = dir.join(STYLES_PART);
        let root = read_part_expecting(&path, "styleSheet")?;

        let max_num_fmt = root
            .child("numFmts")
            .into_iter()
            .flat_map(|t| t.elements())
            .filter(|t| t.name == "numFmt")
            .filter_map(|t| t.attr("numFmtId")?.parse::<u32>().ok())
            .max();
        let next_num_fmt_id = max_num_fmt.map_or(FIRST_CUSTOM_NUM_FMT, |id| {
            FIRST_CUSTOM_NUM_FMT.max(id + 1)
        });

        let styles: Vec<Style> = root
            .child("cellXfs")
            .into_iter()
            .flat_map(|t| t.elements())
            .filter(|t| t.name == "xf")
            .map(parse_xf)
            .collect();

        log::debug!(
            "opened styles with {} cell formats, next number format {}",
            styles.len(),
            next_num_fmt_id
        );

        Ok(Self {
            path,
            root,
            styles,
            next_num_fmt_id,
            closed: false,
        })
    }

    /// Add a custom number format and return its id
    pub fn set_num_fmt(&mut self, format_code: &str) -> u32 {
        let id = self.next_num_fmt_id;
        self.next_num_fmt_id += 1;
        self.append(
            "numFmts",
            "numFmt",
            Tag::new("numFmt")
                .with_attr("numFmtId", id.to_string())
                .with_attr("formatCode", format_code),
        );
        id
    }

    /// Add a font and return its index
    pub fn set_font(&mut self, font: &Font) -> u32 {
        self.append("fonts", "font", font_tag(font))
    }

    /// Add a solid background fill and return its index
    pub fn set_background_color(&mut self, color: &Color) -> u32 {
        let pattern = Tag::new("patternFill")
            .with_attr("patternType", "solid")
            .with_child(color_tag("fgColor", color))
            .with_child(Tag::new("bgColor").with_attr("indexed", "64"));
        self.append("fills", "fill", Tag::new("fill").with_child(pattern))
    }

    /// Add a border and return its index
    pub fn set_border(&mut self, border: &Border) -> u32 {
        let tag = Tag::new("border")
            .with_child(edge_tag("left", &border.left))
            .with_child(edge_tag("right", &border.right))
            .with_child(edge_tag("top", &border.top))
            .with_child(edge_tag("bottom", &border.bottom))
            .with_child(Tag::new("diagonal"));
        self.append("borders", "border", tag)
    }

    /// Index of the cell format equal to `style`, adding one if none exists
    pub fn set_style(&mut self, style: &Style) -> u32 {
        if let Some(index) = self.styles.iter().position(|s| s == style) {
            return index as u32;
        }
        self.styles.push(style.clone());
        self.append("cellXfs", "xf", xf_tag(style))
    }

    /// The cell format at `index`, `None` when out of range
    pub fn get_style(&self, index: u32) -> Option<Style> {
        self.styles.get(index as usize).cloned()
    }

    /// Number of cell formats
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Write the part back. Closing twice is a no-op.
    pub fn close(&mut self) -> XlsxResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        write_part(&self.path, &self.root)?;
        log::debug!("closed styles with {} cell formats", self.styles.len());
        Ok(())
    }

    /// Append `entry` to the table `section`, keeping its `count` in step,
    /// and return the entry's position among the `item` elements
    fn append(&mut self, section: &str, item: &str, entry: Tag) -> u32 {
        let index = self.section_index(section);
        let mut len = 0;
        if let Some(Node::Element(table)) = self.root.children.get_mut(index) {
            table.children.push(Node::Element(entry));
            len = table.count(item);
            table.set_attr("count", len.to_string());
        }
        len.saturating_sub(1) as u32
    }

    /// Position of `section` in the root, synthesizing it after the
    /// sections that precede it in schema order
    fn section_index(&mut self, section: &str) -> usize {
        if let Some(index) = self.root.position(section) {
            return index;
        }

        let rank = SECTIONS
            .iter()
            .position(|s| *s == section)
            .unwrap_or(SECTIONS.len());
        let earlier = &SECTIONS[..rank];
        let at = self
            .root
            .children
            .iter()
            .rposition(|node| matches!(node, Node::Element(t) if earlier.contains(&t.name.as_str())))
            .map_or(0, |i| i + 1);

        self.root
            .children
            .insert(at, Node::Element(Tag::new(section).with_attr("count", "0")));
        at
    }
}

fn parse_xf(xf: &Tag) -> Style {
    let id = |name: &str| {
        xf.attr(name)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0)
    };
    let alignment = xf.child("alignment");
    let align_attr = |name: &str| alignment.and_then(|a| a.attr(name));

    Style {
        num_fmt_id: id("numFmtId"),
        font_id: id("fontId"),
        fill_id: id("fillId"),
        border_id: id("borderId"),
        xf_id: id("xfId"),
        horizontal: align_attr("horizontal").and_then(HorizontalAlignment::parse),
        vertical: align_attr("vertical").and_then(VerticalAlignment::parse),
        wrap_text: matches!(align_attr("wrapText"), Some("1") | Some("true")),
    }
}

fn xf_tag(style: &Style) -> Tag {
    let mut xf = Tag::new("xf")
        .with_attr("numFmtId", style.num_fmt_id.to_string())
        .with_attr("fontId", style.font_id.to_string())
        .with_attr("fillId", style.fill_id.to_string())
        .with_attr("borderId", style.border_id.to_string())
        .with_attr("xfId", style.xf_id.to_string());

    for (id, flag) in [
        (style.num_fmt_id, "applyNumberFormat"),
        (style.font_id, "applyFont"),
        (style.fill_id, "applyFill"),
        (style.border_id, "applyBorder"),
    ] {
        if id != 0 {
            xf.set_attr(flag, "1");
        }
    }

    if style.has_alignment() {
        xf.set_attr("applyAlignment", "1");
        let mut alignment = Tag::new("alignment");
        if let Some(h) = style.horizontal {
            alignment.set_attr("horizontal", h.as_str());
        }
        if let Some(v) = style.vertical {
            alignment.set_attr("vertical", v.as_str());
        }
        if style.wrap_text {
            alignment.set_attr("wrapText", "1");
        }
        xf.children.push(Node::Element(alignment));
    }

    xf
}

fn font_tag(font: &Font) -> Tag {
    let mut tag = Tag::new("font");
    if font.bold {
        tag.children.push(Tag::new("b").into());
    }
    if font.italic {
        tag.children.push(Tag::new("i").into());
    }
    if font.strikethrough {
        tag.children.push(Tag::new("strike").into());
    }
    if let Some(val) = font.underline.as_str() {
        tag.children.push(Tag::new("u").with_attr("val", val).into());
    }
    if let Some(size) = font.size {
        tag.children
            .push(Tag::new("sz").with_attr("val", format_float(size)).into());
    }
    if let Some(color) = &font.color {
        tag.children.push(color_tag("color", color).into());
    }
    if let Some(name) = &font.name {
        tag.children
            .push(Tag::new("name").with_attr("val", name.as_str()).into());
    }
    tag
}

fn edge_tag(name: &str, edge: &Option<BorderEdge>) -> Tag {
    let mut tag = Tag::new(name);
    if let Some(edge) = edge {
        tag.set_attr("style", edge.style.as_str());
        if let Some(color) = &edge.color {
            tag.children.push(color_tag("color", color).into());
        }
    }
    tag
}

fn color_tag(name: &str, color: &Color) -> Tag {
    let tag = Tag::new(name);
    match color {
        Color::Auto => tag.with_attr("auto", "1"),
        Color::Theme(i) => tag.with_attr("theme", i.to_string()),
        Color::Indexed(i) => tag.with_attr("indexed", i.to_string()),
        Color::Rgb { .. } | Color::Argb { .. } => {
            tag.with_attr("rgb", color.to_argb_hex().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XML_DECLARATION;
    use pretty_assertions::assert_eq;
    use sheetsplice_core::style::BorderLineStyle;
    use std::fs;

    const STYLES: &str = concat!(
        r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<numFmts count="1"><numFmt numFmtId="164" formatCode="0.0%"></numFmt></numFmts>"#,
        r#"<fonts count="1"><font><sz val="11"></sz><name val="Calibri"></name></font></fonts>"#,
        r#"<fills count="2"><fill><patternFill patternType="none"></patternFill></fill>"#,
        r#"<fill><patternFill patternType="gray125"></patternFill></fill></fills>"#,
        r#"<borders count="1"><border><left></left><right></right><top></top><bottom></bottom><diagonal></diagonal></border></borders>"#,
        r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"></xf></cellStyleXfs>"#,
        r#"<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"></xf>"#,
        r#"<xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1">"#,
        r#"<alignment horizontal="center" wrapText="1"></alignment></xf></cellXfs>"#,
        r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"></cellStyle></cellStyles>"#,
        "</styleSheet>"
    );

    fn open(content: &str) -> (tempfile::TempDir, Styles) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("xl")).unwrap();
        fs::write(dir.path().join(STYLES_PART), content).unwrap();
        let styles = Styles::open(dir.path()).unwrap();
        (dir, styles)
    }

    fn saved(dir: &Path, styles: &mut Styles) -> Tag {
        styles.close().unwrap();
        let text = fs::read_to_string(dir.join(STYLES_PART)).unwrap();
        assert!(text.starts_with(XML_DECLARATION));
        Tag::parse_str(&text).unwrap()
    }

    #[test]
    fn test_reads_cell_formats() {
        let (_dir, styles) = open(STYLES);
        assert_eq!(styles.style_count(), 2);
        assert_eq!(styles.get_style(0), Some(Style::default()));
        assert_eq!(
            styles.get_style(1),
            Some(
                Style::new()
                    .with_num_fmt(14)
                    .with_horizontal(HorizontalAlignment::Center)
                    .with_wrap(true)
            )
        );
        assert_eq!(styles.get_style(2), None);
    }

    #[test]
    fn test_num_fmt_ids() {
        let (_dir, mut styles) = open(STYLES);
        assert_eq!(styles.set_num_fmt("0.000"), 200);
        assert_eq!(styles.set_num_fmt("0.000"), 201);

        let (_dir, mut styles) = open(&STYLES.replace("164", "250"));
        assert_eq!(styles.set_num_fmt("yyyy"), 251);
    }

    #[test]
    fn test_tables_append() {
        let (dir, mut styles) = open(STYLES);
        let font = Font::new().with_size(12.0).with_color(Color::rgb(255, 0, 255));
        assert_eq!(styles.set_font(&font), 1);
        assert_eq!(styles.set_font(&font), 2);
        assert_eq!(styles.set_background_color(&Color::rgb(255, 255, 0)), 2);
        assert_eq!(
            styles.set_border(&Border::new().with_bottom(BorderEdge::thin())),
            1
        );

        let root = saved(dir.path(), &mut styles);
        let fonts = root.child("fonts").unwrap();
        assert_eq!(fonts.attr("count"), Some("3"));
        assert_eq!(
            fonts.elements().nth(1).unwrap().to_xml(),
            r#"<font><sz val="12"></sz><color rgb="FFFF00FF"></color></font>"#
        );
        assert_eq!(
            root.child("fills").unwrap().elements().nth(2).unwrap().to_xml(),
            concat!(
                r#"<fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"></fgColor>"#,
                r#"<bgColor indexed="64"></bgColor></patternFill></fill>"#
            )
        );
        assert_eq!(
            root.child("borders").unwrap().elements().nth(1).unwrap().to_xml(),
            concat!(
                r#"<border><left></left><right></right><top></top>"#,
                r#"<bottom style="thin"><color rgb="FF000000"></color></bottom>"#,
                r#"<diagonal></diagonal></border>"#
            )
        );
    }

    #[test]
    fn test_style_dedup() {
        let (dir, mut styles) = open(STYLES);
        let style = Style::new().with_font(1).with_fill(2);

        let first = styles.set_style(&style);
        assert_eq!(first, 2);
        assert_eq!(styles.set_style(&style), first);
        assert_eq!(styles.set_style(&style.clone().with_border(1)), 3);
        assert_eq!(
            styles.set_style(&Style::new().with_num_fmt(14).with_horizontal(HorizontalAlignment::Center).with_wrap(true)),
            1
        );

        let root = saved(dir.path(), &mut styles);
        let xfs = root.child("cellXfs").unwrap();
        assert_eq!(xfs.attr("count"), Some("4"));
        assert_eq!(
            xfs.elements().nth(2).unwrap().to_xml(),
            r#"<xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"></xf>"#
        );
    }

    #[test]
    fn test_alignment_xf() {
        let (dir, mut styles) = open(STYLES);
        let style = Style::new().with_vertical(VerticalAlignment::Top);
        assert_eq!(styles.set_style(&style), 2);

        let root = saved(dir.path(), &mut styles);
        assert_eq!(
            root.child("cellXfs").unwrap().elements().nth(2).unwrap().to_xml(),
            concat!(
                r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" applyAlignment="1">"#,
                r#"<alignment vertical="top"></alignment></xf>"#
            )
        );
    }

    #[test]
    fn test_missing_sections_are_synthesized_in_order() {
        let (dir, mut styles) = open(concat!(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            r#"<fills count="1"><fill></fill></fills><cellStyles></cellStyles></styleSheet>"#
        ));
        assert_eq!(styles.style_count(), 0);
        assert_eq!(styles.set_num_fmt("0.0"), 200);
        assert_eq!(styles.set_border(&Border::all(BorderLineStyle::Thick, None)), 0);
        assert_eq!(styles.set_style(&Style::new().with_border(0)), 0);
        assert_eq!(styles.set_font(&Font::new().with_bold(true)), 0);

        let root = saved(dir.path(), &mut styles);
        let names: Vec<&str> = root.elements().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["numFmts", "fonts", "fills", "borders", "cellXfs", "cellStyles"]
        );
        assert_eq!(
            root.child("fonts").unwrap().to_xml(),
            r#"<fonts count="1"><font><b></b></font></fonts>"#
        );
    }

    #[test]
    fn test_close_is_idempotent() {
        let (_dir, mut styles) = open(STYLES);
        styles.close().unwrap();
        styles.close().unwrap();
    }

    #[test]
    fn test_wrong_root_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("xl")).unwrap();
        fs::write(dir.path().join(STYLES_PART), "<sst></sst>").unwrap();
        assert!(matches!(
            Styles::open(dir.path()),
            Err(crate::XlsxError::Corrupt { .. })
        ));
    }
}
