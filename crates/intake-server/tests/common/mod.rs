//! Shared helpers for integration tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;

/// Build a small XLSX file in memory with the given rows, using inline
/// strings throughout. Columns are limited to A..Z, which is enough for
/// the test sheets.
pub fn build_xlsx(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet_data = String::new();
    for (i, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!("<row r=\"{}\">", i + 1));
        for (j, value) in row.iter().enumerate() {
            sheet_data.push_str(&format!(
                "<c r=\"{}{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                char::from(b'A' + j as u8),
                i + 1,
                value
            ));
        }
        sheet_data.push_str("</row>");
    }

    let workbook = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
        <sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
    </workbook>"#;
    let worksheet = format!("<worksheet><sheetData>{sheet_data}</sheetData></worksheet>");

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer.start_file("xl/workbook.xml", options).unwrap();
    writer.write_all(workbook.as_bytes()).unwrap();
    writer.start_file("xl/worksheets/sheet1.xml", options).unwrap();
    writer.write_all(worksheet.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
