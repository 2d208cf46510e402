//! Filter-option metadata and the helpers that keep the filter UI consistent
//!
//! The provider returns, with every page, which grades, sections, exams and
//! subjects are selectable under the active filter, plus per-school class
//! information used to tint class options with the owning school's theme.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{null_default, string_or_number};
use crate::theme::{theme_of, Theme};

/// Sections offered when the provider lists none
pub const DEFAULT_SECTIONS: [&str; 5] = ["А", "Б", "В", "Г", "Д"];

/// Selectable subject
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubjectOption {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_default")]
    pub slug: String,
}

impl SubjectOption {
    /// Numeric id as used in `FilterState::subject_ids`; `None` when not numeric
    pub fn subject_id(&self) -> Option<u64> {
        self.id.trim().parse().ok()
    }
}

/// Class information for one school
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchoolClassInfo {
    #[serde(default, deserialize_with = "null_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default)]
    pub color_theme: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub grades: Vec<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub sections: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub all_classes: Vec<String>,
}

/// Filter options valid under the active filter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(default, deserialize_with = "null_default")]
    pub available_grades: Vec<u32>,
    #[serde(default, deserialize_with = "null_default")]
    pub available_sections: Vec<String>,
    /// Exam rounds, e.g. "gat1"
    #[serde(default, deserialize_with = "null_default")]
    pub available_gats: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub available_subjects: Vec<SubjectOption>,
    /// Keyed by school id as a string
    #[serde(default, deserialize_with = "null_default")]
    pub school_classes: BTreeMap<String, SchoolClassInfo>,
}

/// Class dimension a filter option belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOption<'a> {
    Grade(u32),
    Section(&'a str),
}

impl FilterOptions {
    /// Sections to offer, falling back to [`DEFAULT_SECTIONS`]
    pub fn sections_or_default(&self) -> Vec<String> {
        if self.available_sections.is_empty() {
            DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect()
        } else {
            self.available_sections.clone()
        }
    }

    pub fn school_info(&self, school_id: u64) -> Option<&SchoolClassInfo> {
        self.school_classes.get(&school_id.to_string())
    }

    /// Theme of a school option, using its declared theme and name when known
    pub fn school_theme(&self, school_id: u64) -> Theme {
        match self.school_info(school_id) {
            Some(info) => theme_of(school_id, info.color_theme.as_deref(), Some(info.name.as_str())),
            None => theme_of(school_id, None, None),
        }
    }

    /// First selected school (in selection order) that offers the class option
    pub fn owning_school(&self, option: ClassOption<'_>, selected_school_ids: &[u64]) -> Option<u64> {
        selected_school_ids.iter().copied().find(|id| {
            self.school_info(*id).is_some_and(|info| match option {
                ClassOption::Grade(grade) => info.grades.contains(&grade),
                ClassOption::Section(section) => info.sections.iter().any(|s| s == section),
            })
        })
    }

    /// Theme used to tint a class option, if a selected school owns it
    pub fn affiliated_theme(&self, option: ClassOption<'_>, selected_school_ids: &[u64]) -> Option<Theme> {
        self.owning_school(option, selected_school_ids)
            .map(|id| self.school_theme(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> FilterOptions {
        let mut school_classes = BTreeMap::new();
        school_classes.insert(
            "2".to_string(),
            SchoolClassInfo {
                id: 2,
                name: "School 2".to_string(),
                color_theme: Some("rose".to_string()),
                grades: vec![9, 10],
                sections: vec!["А".to_string()],
                all_classes: vec![],
            },
        );
        school_classes.insert(
            "5".to_string(),
            SchoolClassInfo {
                id: 5,
                name: "School 5".to_string(),
                color_theme: None,
                grades: vec![10, 11],
                sections: vec!["Б".to_string()],
                all_classes: vec![],
            },
        );
        FilterOptions {
            school_classes,
            ..Default::default()
        }
    }

    #[test]
    fn test_subject_id_from_string_or_number() {
        let options: FilterOptions = serde_json::from_value(serde_json::json!({
            "availableSubjects": [
                {"id": 4, "label": "Math", "slug": "math"},
                {"id": "12", "label": "English", "slug": "eng"},
                {"id": null, "label": "Unknown", "slug": ""}
            ]
        }))
        .unwrap();

        let ids: Vec<Option<u64>> = options.available_subjects.iter().map(|s| s.subject_id()).collect();
        assert_eq!(ids, vec![Some(4), Some(12), None]);

        let mut state = crate::filter::FilterState::default();
        if let Some(id) = options.available_subjects[1].subject_id() {
            state.toggle_subject(id);
        }
        assert_eq!(state.subject_ids, vec![12]);
    }

    #[test]
    fn test_sections_fallback() {
        let empty = FilterOptions::default();
        assert_eq!(empty.sections_or_default(), vec!["А", "Б", "В", "Г", "Д"]);

        let listed = FilterOptions {
            available_sections: vec!["В".to_string()],
            ..Default::default()
        };
        assert_eq!(listed.sections_or_default(), vec!["В"]);
    }

    #[test]
    fn test_owning_school_follows_selection_order() {
        let options = options();
        assert_eq!(options.owning_school(ClassOption::Grade(10), &[5, 2]), Some(5));
        assert_eq!(options.owning_school(ClassOption::Grade(10), &[2, 5]), Some(2));
        assert_eq!(options.owning_school(ClassOption::Section("Б"), &[2, 5]), Some(5));
        assert_eq!(options.owning_school(ClassOption::Grade(7), &[2, 5]), None);
        assert_eq!(options.owning_school(ClassOption::Grade(9), &[]), None);
    }

    #[test]
    fn test_affiliated_theme_uses_declared_theme() {
        let options = options();
        assert_eq!(options.affiliated_theme(ClassOption::Grade(9), &[2]), Some(Theme::Rose));
        // School 5 declares no theme: id fallback, 5 % 6 = 5 → cyan
        assert_eq!(options.affiliated_theme(ClassOption::Grade(11), &[5]), Some(Theme::Cyan));
    }

    #[test]
    fn test_school_theme_without_metadata_uses_id() {
        let options = FilterOptions::default();
        assert_eq!(options.school_theme(7), theme_of(7, None, None));
    }
}
