//! Spanish date formatting for certificate variables.

use chrono::{Datelike, NaiveDate};

use super::VariableMap;

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Capitalized Spanish month name (1-based month).
pub fn month_name(month: u32) -> &'static str {
    MONTHS[(month.clamp(1, 12) - 1) as usize]
}

/// How a date is spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `16 de Septiembre de 2025`
    Long,
    /// `16 de septiembre`
    DayMonth,
    /// `20 de septiembre del 2025`
    WithDel,
    /// `30 días del mes de septiembre del 2025`
    Issue,
}

impl DateStyle {
    /// Format a date in this style.
    pub fn format(self, date: NaiveDate) -> String {
        let day = date.day();
        let month = month_name(date.month());
        let year = date.year();
        match self {
            DateStyle::Long => format!("{} de {} de {}", day, month, year),
            DateStyle::DayMonth => format!("{} de {}", day, month.to_lowercase()),
            DateStyle::WithDel => format!("{} de {} del {}", day, month.to_lowercase(), year),
            DateStyle::Issue => format!(
                "{} días del mes de {} del {}",
                day,
                month.to_lowercase(),
                year
            ),
        }
    }
}

impl VariableMap {
    /// Insert a formatted date. A missing date inserts an empty value.
    pub fn insert_date(&mut self, key: impl AsRef<str>, date: Option<NaiveDate>, style: DateStyle) {
        let value = date.map(|d| style.format(d)).unwrap_or_default();
        self.insert(key, value);
    }

    /// Insert the issue-date family of variables for `date`.
    pub fn insert_issue_date(&mut self, date: NaiveDate) {
        self.insert_date("FECHA_EMISION", Some(date), DateStyle::Long);
        self.insert_date("FECHA DE EMISION", Some(date), DateStyle::Issue);
        self.insert("DIA_EMISION", date.day().to_string());
        self.insert("MES_EMISION", month_name(date.month()).to_lowercase());
        self.insert("ANIO_EMISION", date.year().to_string());
        self.insert(
            "MES_ANIO_EMISION",
            format!("{} de {}", month_name(date.month()), date.year()),
        );
    }
}
