//! Domain models for the ingestion pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Spreadsheet column headers, as they appear in the export files.
pub mod columns {
    pub const LAST_NAME: &str = "Фамилия";
    pub const FIRST_NAME: &str = "Имя";
    pub const TELEGRAM: &str = "ТГ";
    pub const CELLPHONE: &str = "Телефон";
    pub const EMAIL: &str = "Почта";
    pub const RESUME_URL: &str = "Резюме";
    pub const FIRST_PRIORITY: &str = "Первый приоритет";
    pub const SECOND_PRIORITY: &str = "Второй приоритет";
    pub const COURSE: &str = "Курс";
    pub const SPECIALTY: &str = "Специальность";
    pub const OTHER_SPECIALTY: &str = "Другая специальность";
    pub const SCHEDULE: &str = "График";
    pub const CITY: &str = "Город";
    pub const OTHER_CITY: &str = "Другой город";
    pub const SOURCE: &str = "Откуда узнал";
    pub const YEAR_BORN: &str = "Год рождения";
    pub const CITIZENSHIP: &str = "Гражданство";
    pub const UNIVERSITY: &str = "ВУЗ";
    pub const OTHER_UNIVERSITY: &str = "Другой ВУЗ";
    pub const PROGRAMMING_LANGUAGES: &str = "Языки";
    pub const APPLICATION_DATE: &str = "Дата заявки";
}

/// Lifecycle status of an import.
///
/// `Created` is set when an upload is accepted, before any row is
/// parsed. `Parsed` and `Failed` are terminal; there is no transition
/// out of either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportStatus {
    Created,
    Parsed,
    Failed,
}

impl ImportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportStatus::Created => "CREATED",
            ImportStatus::Parsed => "PARSED",
            ImportStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spreadsheet submission and its processing outcome.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ImportRecord {
    pub import_id: Uuid,
    pub file_name: String,
    pub file_sha256: String,
    pub status: String,
    pub total_rows: i32,
    pub inserted_rows: i32,
    pub skipped_rows: i32,
}

impl ImportRecord {
    /// New record at upload acceptance, counters zeroed.
    pub fn new(file_name: String, file_sha256: String) -> Self {
        Self {
            import_id: Uuid::new_v4(),
            file_name,
            file_sha256,
            status: ImportStatus::Created.as_str().to_string(),
            total_rows: 0,
            inserted_rows: 0,
            skipped_rows: 0,
        }
    }
}

/// Normalized, validated representation of one spreadsheet data row.
///
/// Invariant: at least one of `last_name`/`first_name` is non-empty and
/// at least one of `email`/`phone` is non-empty after normalization;
/// rows violating this never leave the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub telegram: String,
    pub resume_url: String,
    pub priority1: String,
    pub priority2: String,
    pub course: String,
    pub specialty: String,
    pub specialty_other: String,
    pub schedule: String,
    pub city: String,
    pub city_other: String,
    pub source: String,
    pub birth_year: Option<i32>,
    pub citizenship: String,
    pub university: String,
    pub university_other: String,
    pub languages: String,
    pub applied_at: DateTime<Utc>,
    /// Original header -> value mapping, kept verbatim for audit. Holds
    /// every non-blank header of the sheet, mapped or not.
    pub raw_row: serde_json::Map<String, serde_json::Value>,
}
