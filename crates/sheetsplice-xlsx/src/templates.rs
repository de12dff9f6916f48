//! Parts written into a newly created package

/// SpreadsheetML main namespace
pub const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
/// Office document relationships namespace (the `r:` prefix)
pub const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// Package relationships namespace (`.rels` parts)
pub const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
/// Content types namespace
pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const CONTENT_TYPES: &str = concat!(
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"></Default>"#,
    r#"<Default Extension="xml" ContentType="application/xml"></Default>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"></Override>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"></Override>"#,
    "</Types>"
);

pub const ROOT_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"></Relationship>"#,
    "</Relationships>"
);

pub const WORKBOOK: &str = concat!(
    r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    "<bookViews><workbookView></workbookView></bookViews>",
    "<sheets></sheets>",
    "</workbook>"
);

pub const WORKBOOK_RELS: &str = concat!(
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"></Relationship>"#,
    "</Relationships>"
);

pub const STYLES: &str = concat!(
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"></sz><name val="Calibri"></name><family val="2"></family></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"></patternFill></fill>"#,
    r#"<fill><patternFill patternType="gray125"></patternFill></fill></fills>"#,
    r#"<borders count="1"><border><left></left><right></right><top></top><bottom></bottom><diagonal></diagonal></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"></xf></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"></xf></cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"></cellStyle></cellStyles>"#,
    r#"<dxfs count="0"></dxfs>"#,
    r#"<tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"></tableStyles>"#,
    "</styleSheet>"
);

pub const WORKSHEET: &str = concat!(
    r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="x14ac" "#,
    r#"xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac">"#,
    r#"<sheetViews><sheetView workbookViewId="0"></sheetView></sheetViews>"#,
    "<sheetData></sheetData>",
    "</worksheet>"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Tag;

    #[test]
    fn test_templates_round_trip() {
        for xml in [CONTENT_TYPES, ROOT_RELS, WORKBOOK, WORKBOOK_RELS, STYLES, WORKSHEET] {
            assert_eq!(Tag::parse_str(xml).unwrap().to_xml(), xml);
        }
    }

    #[test]
    fn test_template_namespaces() {
        assert_eq!(Tag::parse_str(CONTENT_TYPES).unwrap().attr("xmlns"), Some(NS_CONTENT_TYPES));
        assert_eq!(Tag::parse_str(ROOT_RELS).unwrap().attr("xmlns"), Some(NS_PACKAGE_RELATIONSHIPS));
        let workbook = Tag::parse_str(WORKBOOK).unwrap();
        assert_eq!(workbook.attr("xmlns"), Some(NS_MAIN));
        assert_eq!(workbook.attr("xmlns:r"), Some(NS_RELATIONSHIPS));
    }
}
