//! Header mapping and row parsing
//!
//! The first sheet row is treated as column headers; each data row is
//! normalized into a [`ParsedRow`] or rejected with a row-level
//! diagnostic. Diagnostics never abort the batch — only an undecodable
//! workbook or a sheet with fewer than two rows is fatal.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;

use super::error::ImportError;
use super::models::{columns, ParsedRow};

/// Accepted layouts for the application date, first match wins.
/// Local time zone is assumed when no zone is present.
const APPLIED_AT_LAYOUTS: &[&str] = &["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M"];
const APPLIED_AT_DATE_LAYOUT: &str = "%d.%m.%Y";

/// Result of parsing one sheet: surviving rows, ordered diagnostics,
/// and the number of non-blank data rows examined.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub rows: Vec<ParsedRow>,
    pub diagnostics: Vec<String>,
    pub total_rows: usize,
}

/// Map non-blank header names to their column index.
///
/// The first occurrence wins when headers repeat; missing columns are
/// simply absent from the mapping.
pub fn index_columns(header: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(header.len());
    for (i, h) in header.iter().enumerate() {
        let h = h.trim();
        if h.is_empty() {
            continue;
        }
        map.entry(h.to_string()).or_insert(i);
    }
    map
}

/// Parse all data rows of a decoded sheet.
///
/// Row numbers in diagnostics are 1-based sheet rows (the header is
/// row 1, the first data row is row 2).
pub fn parse_sheet(sheet: &[Vec<String>]) -> Result<ParseOutcome, ImportError> {
    if sheet.len() < 2 {
        return Err(ImportError::NoDataRows);
    }

    let header = &sheet[0];
    let col = index_columns(header);

    let mut outcome = ParseOutcome::default();

    for (i, row) in sheet.iter().enumerate().skip(1) {
        if row.is_empty() || all_blank(row) {
            continue;
        }
        outcome.total_rows += 1;
        let row_number = i + 1;

        let get = |name: &str| -> &str {
            match col.get(name) {
                Some(&idx) if idx < row.len() => row[idx].trim(),
                _ => "",
            }
        };

        let last_name = get(columns::LAST_NAME).to_string();
        let first_name = get(columns::FIRST_NAME).to_string();
        let email = get(columns::EMAIL).trim().to_lowercase();
        let phone = normalize_phone(get(columns::CELLPHONE));
        let telegram = get(columns::TELEGRAM).to_string();

        if last_name.is_empty() && first_name.is_empty() {
            outcome
                .diagnostics
                .push(format!("row {row_number}: name is empty"));
            continue;
        }
        if email.is_empty() && phone.is_empty() {
            outcome
                .diagnostics
                .push(format!("row {row_number}: email and phone are both empty"));
            continue;
        }

        let applied_at_raw = get(columns::APPLICATION_DATE);
        let Some(applied_at) = parse_applied_at(applied_at_raw) else {
            outcome.diagnostics.push(format!(
                "row {row_number}: invalid application date: {applied_at_raw:?}"
            ));
            continue;
        };

        // Birth year is the one field whose invalid value does not
        // disqualify the row: record a diagnostic and leave it unset.
        let mut birth_year = None;
        let birth_year_raw = get(columns::YEAR_BORN);
        if !birth_year_raw.is_empty() {
            match parse_birth_year(birth_year_raw) {
                Some(year) => birth_year = Some(year),
                None => outcome.diagnostics.push(format!(
                    "row {row_number}: invalid birth year: {birth_year_raw:?}"
                )),
            }
        }

        // Every original header/value pair is retained verbatim, whether
        // or not the header maps to a known field.
        let mut raw_row = serde_json::Map::new();
        for (j, name) in header.iter().enumerate() {
            if name.is_empty() || j >= row.len() {
                continue;
            }
            raw_row.insert(name.clone(), serde_json::Value::String(row[j].clone()));
        }

        outcome.rows.push(ParsedRow {
            last_name,
            first_name,
            email,
            phone,
            telegram,
            resume_url: get(columns::RESUME_URL).to_string(),
            priority1: get(columns::FIRST_PRIORITY).to_string(),
            priority2: get(columns::SECOND_PRIORITY).to_string(),
            course: get(columns::COURSE).to_string(),
            specialty: get(columns::SPECIALTY).to_string(),
            specialty_other: get(columns::OTHER_SPECIALTY).to_string(),
            schedule: get(columns::SCHEDULE).to_string(),
            city: get(columns::CITY).to_string(),
            city_other: get(columns::OTHER_CITY).to_string(),
            source: get(columns::SOURCE).to_string(),
            birth_year,
            citizenship: get(columns::CITIZENSHIP).to_string(),
            university: get(columns::UNIVERSITY).to_string(),
            university_other: get(columns::OTHER_UNIVERSITY).to_string(),
            languages: get(columns::PROGRAMMING_LANGUAGES).to_string(),
            applied_at,
            raw_row,
        });
    }

    Ok(outcome)
}

fn all_blank(row: &[String]) -> bool {
    row.iter().all(|s| s.trim().is_empty())
}

/// Keep digits and a leading `+`, drop everything else.
pub fn normalize_phone(s: &str) -> String {
    let s = s.trim();
    let mut out = String::with_capacity(s.len());
    if s.starts_with('+') {
        out.push('+');
    }
    out.extend(s.chars().filter(|c| c.is_ascii_digit()));
    if out == "+" {
        return String::new();
    }
    out
}

/// Parse the application date against the accepted layouts.
///
/// Zoneless values are interpreted in the local time zone; a bare date
/// gets midnight.
pub fn parse_applied_at(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for layout in APPLIED_AT_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return local_to_utc(naive);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, APPLIED_AT_DATE_LAYOUT) {
        return local_to_utc(date.and_time(NaiveTime::MIN));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    // `earliest` resolves DST-fold ambiguity; a nonexistent local time
    // (spring-forward gap) yields None and the row is diagnosed.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a birth year from the leading digits of the cell.
///
/// The digit prefix must be a four-digit year; trailing non-digit text
/// (e.g. a unit suffix like "2001 г.") is tolerated.
pub fn parse_birth_year(s: &str) -> Option<i32> {
    let s = s.trim();
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_index_columns_first_occurrence_wins() {
        let header = s(&["Почта", " Телефон ", "", "Почта"]);
        let col = index_columns(&header);
        assert_eq!(col.get("Почта"), Some(&0));
        assert_eq!(col.get("Телефон"), Some(&1));
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn test_index_columns_missing_is_absent() {
        let col = index_columns(&s(&["Имя"]));
        assert!(col.get("Почта").is_none());
    }

    #[test]
    fn test_single_valid_row() {
        let sheet = vec![
            s(&["Фамилия", "Имя", "Почта", "Дата заявки"]),
            s(&["Иванов", "Пётр", "petrov@example.com", "01.03.2024"]),
        ];

        let outcome = parse_sheet(&sheet).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.total_rows, 1);

        let row = &outcome.rows[0];
        assert_eq!(row.last_name, "Иванов");
        assert_eq!(row.first_name, "Пётр");
        assert_eq!(row.email, "petrov@example.com");
        assert!(row.phone.is_empty());
    }

    #[test]
    fn test_email_is_lowercased() {
        let sheet = vec![
            s(&["Имя", "Почта", "Дата заявки"]),
            s(&["Анна", "  Anna.K@Example.COM ", "02.03.2024"]),
        ];
        let outcome = parse_sheet(&sheet).unwrap();
        assert_eq!(outcome.rows[0].email, "anna.k@example.com");
    }

    #[test]
    fn test_blank_rows_are_skipped_silently() {
        let sheet = vec![
            s(&["Имя", "Почта", "Дата заявки"]),
            s(&["", "  ", ""]),
            s(&["Анна", "a@b.c", "02.03.2024"]),
        ];
        let outcome = parse_sheet(&sheet).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.total_rows, 1);
    }

    #[test]
    fn test_row_isolation() {
        // Batch of 10 rows: row 5 (sheet numbering: data index 4) has a
        // blank name, row 7 an unparsable date. The batch continues.
        let mut sheet = vec![s(&["Имя", "Почта", "Дата заявки"])];
        for i in 0..10 {
            let sheet_row = i + 2;
            match sheet_row {
                5 => sheet.push(s(&["", "x@y.z", "01.03.2024"])),
                7 => sheet.push(s(&["Пётр", "x@y.z", "not a date"])),
                _ => sheet.push(vec![
                    "Пётр".to_string(),
                    format!("user{i}@example.com"),
                    "01.03.2024".to_string(),
                ]),
            }
        }

        let outcome = parse_sheet(&sheet).unwrap();
        assert_eq!(outcome.total_rows, 10);
        assert_eq!(outcome.diagnostics.len(), 2);
        assert_eq!(outcome.rows.len(), 8);
        assert!(outcome.diagnostics[0].starts_with("row 5:"));
        assert!(outcome.diagnostics[1].starts_with("row 7:"));
    }

    #[test]
    fn test_missing_contact_rejected() {
        let sheet = vec![
            s(&["Имя", "Почта", "Телефон", "Дата заявки"]),
            s(&["Анна", "", "  ", "01.03.2024"]),
        ];
        let outcome = parse_sheet(&sheet).unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].contains("email and phone"));
    }

    #[test]
    fn test_unparsable_birth_year_keeps_row() {
        let sheet = vec![
            s(&["Имя", "Почта", "Дата заявки", "Год рождения"]),
            s(&["Анна", "a@b.c", "01.03.2024", "19оо"]),
        ];
        let outcome = parse_sheet(&sheet).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].starts_with("row 2:"));
        assert!(outcome.rows[0].birth_year.is_none());
    }

    #[test]
    fn test_valid_birth_year_with_suffix() {
        let sheet = vec![
            s(&["Имя", "Почта", "Дата заявки", "Год рождения"]),
            s(&["Анна", "a@b.c", "01.03.2024", "2001 г."]),
        ];
        let outcome = parse_sheet(&sheet).unwrap();
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.rows[0].birth_year, Some(2001));
    }

    #[test]
    fn test_raw_row_keeps_unmapped_columns() {
        let sheet = vec![
            s(&["Имя", "Почта", "Дата заявки", "Неизвестная колонка"]),
            s(&["Анна", "a@b.c", "01.03.2024", "какое-то значение"]),
        ];
        let outcome = parse_sheet(&sheet).unwrap();
        let raw = &outcome.rows[0].raw_row;
        assert_eq!(
            raw.get("Неизвестная колонка").and_then(|v| v.as_str()),
            Some("какое-то значение")
        );
    }

    #[test]
    fn test_fewer_than_two_rows_is_fatal() {
        let sheet = vec![s(&["Имя", "Почта"])];
        assert!(matches!(
            parse_sheet(&sheet),
            Err(ImportError::NoDataRows)
        ));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+7 (999) 123-45-67"), "+79991234567");
        assert_eq!(normalize_phone("8 999 123 45 67"), "89991234567");
        assert_eq!(normalize_phone("  "), "");
        assert_eq!(normalize_phone("+"), "");
        assert_eq!(normalize_phone("ext. 12+34"), "1234");
    }

    #[test]
    fn test_parse_applied_at_layouts() {
        assert!(parse_applied_at("01.03.2024").is_some());
        assert!(parse_applied_at("01.03.2024 15:04").is_some());
        assert!(parse_applied_at("01.03.2024 15:04:05").is_some());
        assert!(parse_applied_at("2024-03-01T15:04:05+03:00").is_some());
        assert!(parse_applied_at("March 1, 2024").is_none());
        assert!(parse_applied_at("").is_none());
    }

    #[test]
    fn test_parse_applied_at_bare_date_is_midnight_local() {
        let dt = parse_applied_at("01.03.2024").unwrap();
        let local = dt.with_timezone(&Local);
        assert_eq!(local.year(), 2024);
        assert_eq!(local.month(), 3);
        assert_eq!(local.day(), 1);
    }

    #[test]
    fn test_parse_birth_year() {
        assert_eq!(parse_birth_year("2001"), Some(2001));
        assert_eq!(parse_birth_year("2001 г."), Some(2001));
        assert_eq!(parse_birth_year("1880"), Some(1880));
        assert_eq!(parse_birth_year("19оо"), None);
        assert_eq!(parse_birth_year("год 2001"), None);
        assert_eq!(parse_birth_year(""), None);
    }
}
