//! Filter state and its canonical request form
//!
//! The presentation layer mutates [`FilterState`] in whatever order the user
//! clicks. [`compile`] turns it into a [`CanonicalRequest`] where every
//! dimension is de-duplicated and sorted, so two states with the same
//! membership serialize to byte-identical query strings. An empty dimension
//! means "unconstrained" and is omitted from the query entirely.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

use gat_common::config::{DEFAULT_LOCALE, DEFAULT_PAGE_SIZE};

/// Raw multi-select filter state as held by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub school_ids: Vec<u64>,
    pub grades: Vec<u32>,
    pub sections: Vec<String>,
    pub subject_ids: Vec<u64>,
    /// Exam rounds, e.g. "gat1"
    pub exam_codes: Vec<String>,
    pub day_numbers: Vec<u32>,
    /// Requested page (1-indexed)
    pub page: u32,
    pub page_size: u32,
    pub locale: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            school_ids: Vec::new(),
            grades: Vec::new(),
            sections: Vec::new(),
            subject_ids: Vec::new(),
            exam_codes: Vec::new(),
            day_numbers: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

fn toggle<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if let Some(pos) = values.iter().position(|v| *v == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}

impl FilterState {
    pub fn new(page_size: u32, locale: impl Into<String>) -> Self {
        Self {
            page_size,
            locale: locale.into(),
            ..Default::default()
        }
    }

    pub fn toggle_school(&mut self, id: u64) {
        toggle(&mut self.school_ids, id);
    }

    pub fn toggle_grade(&mut self, grade: u32) {
        toggle(&mut self.grades, grade);
    }

    pub fn toggle_section(&mut self, section: &str) {
        toggle(&mut self.sections, section.to_string());
    }

    pub fn toggle_subject(&mut self, id: u64) {
        toggle(&mut self.subject_ids, id);
    }

    pub fn toggle_exam(&mut self, code: &str) {
        toggle(&mut self.exam_codes, code.to_string());
    }

    pub fn toggle_day(&mut self, day: u32) {
        toggle(&mut self.day_numbers, day);
    }

    /// Empty every dimension; page size and locale are kept
    pub fn clear_selections(&mut self) {
        self.school_ids.clear();
        self.grades.clear();
        self.sections.clear();
        self.subject_ids.clear();
        self.exam_codes.clear();
        self.day_numbers.clear();
        self.page = 1;
    }
}

/// Canonical, order-independent request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalRequest {
    pub page: u32,
    pub limit: u32,
    pub schools: Vec<u64>,
    pub grades: Vec<u32>,
    pub sections: Vec<String>,
    pub exams: Vec<String>,
    pub days: Vec<u32>,
    pub subjects: Vec<u64>,
    /// Sent as the `Accept-Language` header, not as a query parameter
    pub locale: String,
}

fn sorted_unique<T: Ord + Clone>(values: &[T]) -> Vec<T> {
    values.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

fn sorted_unique_text(values: &[String], lowercase: bool) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| if lowercase { v.to_lowercase() } else { v.to_string() })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn join<T: Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Normalize a filter state into its canonical request
pub fn compile(state: &FilterState) -> CanonicalRequest {
    let locale = state.locale.trim().to_lowercase();

    CanonicalRequest {
        page: state.page.max(1),
        limit: if state.page_size == 0 { DEFAULT_PAGE_SIZE } else { state.page_size },
        schools: sorted_unique(&state.school_ids),
        grades: sorted_unique(&state.grades),
        sections: sorted_unique_text(&state.sections, false),
        exams: sorted_unique_text(&state.exam_codes, true),
        days: sorted_unique(&state.day_numbers),
        subjects: sorted_unique(&state.subject_ids),
        locale: if locale.is_empty() { DEFAULT_LOCALE.to_string() } else { locale },
    }
}

impl CanonicalRequest {
    /// Query parameters in fixed order; unconstrained dimensions are omitted
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];

        if !self.schools.is_empty() {
            pairs.push(("schools", join(&self.schools)));
        }
        if !self.grades.is_empty() {
            pairs.push(("grades", join(&self.grades)));
        }
        if !self.sections.is_empty() {
            pairs.push(("sections", self.sections.join(",")));
        }
        if !self.exams.is_empty() {
            pairs.push(("exams", self.exams.join(",")));
        }
        if !self.days.is_empty() {
            pairs.push(("days", join(&self.days)));
        }
        if !self.subjects.is_empty() {
            pairs.push(("subjects", join(&self.subjects)));
        }

        pairs
    }

    /// Unencoded `key=value&...` form of [`Self::query_pairs`]
    pub fn query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Stable key covering the query and the locale
    pub fn cache_key(&self) -> String {
        format!("{}#lang={}", self.query_string(), self.locale)
    }

    /// Same filter and locale, ignoring page and page size
    pub fn same_filter(&self, other: &CanonicalRequest) -> bool {
        self.schools == other.schools
            && self.grades == other.grades
            && self.sections == other.sections
            && self.exams == other.exams
            && self.days == other.days
            && self.subjects == other.subjects
            && self.locale == other.locale
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }
}
