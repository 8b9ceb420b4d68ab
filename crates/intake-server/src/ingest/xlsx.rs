//! Minimal XLSX workbook decoder
//!
//! An XLSX file is a ZIP container of XML parts. This module extracts
//! the first worksheet as an ordered sequence of rows of string cells,
//! which is all the ingestion pipeline consumes. Shared strings, inline
//! strings, and raw values are supported; formatting, formulas, and
//! styles are ignored.

use serde::Deserialize;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::error::ImportError;

// ---------------------------------------------------------------------------
// XML part structures
// ---------------------------------------------------------------------------

/// xl/workbook.xml
#[derive(Debug, Deserialize)]
struct WorkbookXml {
    sheets: SheetsXml,
}

#[derive(Debug, Deserialize)]
struct SheetsXml {
    #[serde(rename = "sheet", default)]
    sheets: Vec<SheetXml>,
}

#[derive(Debug, Deserialize)]
struct SheetXml {
    #[serde(rename = "@name")]
    #[allow(dead_code)]
    name: String,
    // quick-xml strips namespace prefixes from attribute names, so the
    // workbook's `r:id` attribute is exposed as `id`.
    #[serde(rename = "@id", default)]
    rel_id: Option<String>,
}

/// xl/_rels/workbook.xml.rels
#[derive(Debug, Deserialize)]
struct RelationshipsXml {
    #[serde(rename = "Relationship", default)]
    relationships: Vec<RelationshipXml>,
}

#[derive(Debug, Deserialize)]
struct RelationshipXml {
    #[serde(rename = "@Id")]
    id: String,
    #[serde(rename = "@Target")]
    target: String,
}

/// xl/sharedStrings.xml
#[derive(Debug, Deserialize)]
struct SstXml {
    #[serde(rename = "si", default)]
    items: Vec<SiXml>,
}

#[derive(Debug, Deserialize)]
struct SiXml {
    #[serde(default)]
    t: Option<String>,
    #[serde(rename = "r", default)]
    runs: Vec<RunXml>,
}

#[derive(Debug, Deserialize)]
struct RunXml {
    #[serde(default)]
    t: Option<String>,
}

impl SiXml {
    fn text(&self) -> String {
        if let Some(t) = &self.t {
            return t.clone();
        }
        self.runs
            .iter()
            .filter_map(|r| r.t.as_deref())
            .collect::<Vec<_>>()
            .concat()
    }
}

/// xl/worksheets/sheetN.xml
#[derive(Debug, Deserialize)]
struct WorksheetXml {
    #[serde(rename = "sheetData")]
    sheet_data: SheetDataXml,
}

#[derive(Debug, Deserialize)]
struct SheetDataXml {
    #[serde(rename = "row", default)]
    rows: Vec<RowXml>,
}

#[derive(Debug, Deserialize)]
struct RowXml {
    #[serde(rename = "c", default)]
    cells: Vec<CellXml>,
}

#[derive(Debug, Deserialize)]
struct CellXml {
    #[serde(rename = "@r", default)]
    cell_ref: Option<String>,
    #[serde(rename = "@t", default)]
    cell_type: Option<String>,
    #[serde(default)]
    v: Option<String>,
    #[serde(rename = "is", default)]
    inline: Option<InlineStrXml>,
}

#[derive(Debug, Deserialize)]
struct InlineStrXml {
    #[serde(default)]
    t: Option<String>,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode the first worksheet of an XLSX file into rows of string cells.
///
/// Rows are returned in document order; cells are placed by column
/// reference with gaps filled by empty strings, so absent cells read as
/// `""` downstream.
pub fn decode_first_sheet(content: &[u8]) -> Result<Vec<Vec<String>>, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(content))
        .map_err(|e| ImportError::InvalidWorkbook(e.to_string()))?;

    let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?
        .ok_or_else(|| ImportError::InvalidWorkbook("missing xl/workbook.xml".to_string()))?;
    let workbook: WorkbookXml = quick_xml::de::from_str(&workbook_xml)
        .map_err(|e| ImportError::InvalidWorkbook(e.to_string()))?;

    let first_sheet = workbook
        .sheets
        .sheets
        .first()
        .ok_or(ImportError::NoSheetsFound)?;

    let sheet_path = resolve_sheet_path(&mut archive, first_sheet.rel_id.as_deref())?;

    let shared_strings = match read_part(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => {
            let sst: SstXml = quick_xml::de::from_str(&xml)
                .map_err(|e| ImportError::InvalidWorkbook(e.to_string()))?;
            sst.items.iter().map(SiXml::text).collect()
        }
        None => Vec::new(),
    };

    let sheet_xml = read_part(&mut archive, &sheet_path)?.ok_or_else(|| {
        ImportError::InvalidWorkbook(format!("missing worksheet part {sheet_path}"))
    })?;
    let worksheet: WorksheetXml = quick_xml::de::from_str(&sheet_xml)
        .map_err(|e| ImportError::InvalidWorkbook(e.to_string()))?;

    Ok(extract_rows(&worksheet, &shared_strings))
}

/// Read a named part from the archive, `None` if absent.
fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, ImportError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)
                .map_err(|e| ImportError::InvalidWorkbook(e.to_string()))?;
            Ok(Some(content))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(ImportError::InvalidWorkbook(e.to_string())),
    }
}

/// Resolve the ZIP path of a worksheet from the workbook relationships.
///
/// Falls back to the conventional `xl/worksheets/sheet1.xml` when the
/// relationships part is absent or does not carry the sheet's id.
fn resolve_sheet_path<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    rel_id: Option<&str>,
) -> Result<String, ImportError> {
    const FALLBACK: &str = "xl/worksheets/sheet1.xml";

    let Some(rel_id) = rel_id else {
        return Ok(FALLBACK.to_string());
    };

    let Some(rels_xml) = read_part(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(FALLBACK.to_string());
    };

    let rels: RelationshipsXml = quick_xml::de::from_str(&rels_xml)
        .map_err(|e| ImportError::InvalidWorkbook(e.to_string()))?;

    let target = rels
        .relationships
        .iter()
        .find(|r| r.id == rel_id)
        .map(|r| r.target.as_str());

    Ok(match target {
        Some(t) => normalize_target(t),
        None => FALLBACK.to_string(),
    })
}

/// Relationship targets are relative to `xl/` unless absolute.
fn normalize_target(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("xl/") {
        trimmed.to_string()
    } else {
        format!("xl/{trimmed}")
    }
}

fn extract_rows(worksheet: &WorksheetXml, shared_strings: &[String]) -> Vec<Vec<String>> {
    worksheet
        .sheet_data
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = Vec::new();
            for cell in &row.cells {
                let col = cell
                    .cell_ref
                    .as_deref()
                    .and_then(column_index)
                    .unwrap_or(cells.len());
                if col >= cells.len() {
                    cells.resize(col + 1, String::new());
                }
                cells[col] = cell_value(cell, shared_strings);
            }
            cells
        })
        .collect()
}

fn cell_value(cell: &CellXml, shared_strings: &[String]) -> String {
    match cell.cell_type.as_deref() {
        Some("s") => cell
            .v
            .as_deref()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .and_then(|idx| shared_strings.get(idx))
            .cloned()
            .unwrap_or_default(),
        Some("inlineStr") => cell
            .inline
            .as_ref()
            .and_then(|is| is.t.clone())
            .unwrap_or_default(),
        _ => cell.v.clone().unwrap_or_default(),
    }
}

/// Column index from a cell reference, e.g. "A1" -> 0, "AB3" -> 27.
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: String = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for c in letters.chars() {
        index = index * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn build_xlsx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in parts {
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn workbook_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
            <sheets>
                <sheet name="Applications" sheetId="1" r:id="rId1"/>
            </sheets>
        </workbook>"#
    }

    #[test]
    fn test_decode_shared_and_inline_strings() {
        let content = build_xlsx(&[
            ("xl/workbook.xml", workbook_xml()),
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>Фамилия</t></si><si><t>Иванов</t></si></sst>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1" t="s"><v>0</v></c></row>
                    <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="inlineStr"><is><t>hello</t></is></c></row>
                </sheetData></worksheet>"#,
            ),
        ]);

        let rows = decode_first_sheet(&content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Фамилия"]);
        assert_eq!(rows[1], vec!["Иванов", "hello"]);
    }

    #[test]
    fn test_decode_fills_column_gaps() {
        let content = build_xlsx(&[
            ("xl/workbook.xml", workbook_xml()),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1" t="str"><v>a</v></c><c r="C1" t="str"><v>c</v></c></row>
                </sheetData></worksheet>"#,
            ),
        ]);

        let rows = decode_first_sheet(&content).unwrap();
        assert_eq!(rows, vec![vec!["a".to_string(), String::new(), "c".to_string()]]);
    }

    #[test]
    fn test_decode_numeric_cells_verbatim() {
        let content = build_xlsx(&[
            ("xl/workbook.xml", workbook_xml()),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1"><v>2001</v></c></row>
                </sheetData></worksheet>"#,
            ),
        ]);

        let rows = decode_first_sheet(&content).unwrap();
        assert_eq!(rows, vec![vec!["2001".to_string()]]);
    }

    #[test]
    fn test_decode_resolves_sheet_via_relationships() {
        let content = build_xlsx(&[
            ("xl/workbook.xml", workbook_xml()),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships>
                    <Relationship Id="rId1" Type="worksheet" Target="worksheets/data.xml"/>
                </Relationships>"#,
            ),
            (
                "xl/worksheets/data.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1" t="str"><v>via rels</v></c></row>
                </sheetData></worksheet>"#,
            ),
        ]);

        let rows = decode_first_sheet(&content).unwrap();
        assert_eq!(rows, vec![vec!["via rels".to_string()]]);
    }

    #[test]
    fn test_no_sheets() {
        let content = build_xlsx(&[(
            "xl/workbook.xml",
            r#"<workbook><sheets></sheets></workbook>"#,
        )]);

        assert!(matches!(
            decode_first_sheet(&content),
            Err(ImportError::NoSheetsFound)
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            decode_first_sheet(b"definitely not an xlsx"),
            Err(ImportError::InvalidWorkbook(_))
        ));
    }

    #[test]
    fn test_missing_workbook_part() {
        let content = build_xlsx(&[("other.txt", "nothing")]);
        assert!(matches!(
            decode_first_sheet(&content),
            Err(ImportError::InvalidWorkbook(_))
        ));
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("B2"), Some(1));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA1"), Some(26));
        assert_eq!(column_index("AB3"), Some(27));
        assert_eq!(column_index("7"), None);
    }
}
