//! Type selection tables.
//!
//! Built once on first use and never modified.

use crate::vocab::{Iri, VIVO};
use std::collections::HashMap;
use std::sync::LazyLock;

/// A lookup table with an explicit default.
#[derive(Debug)]
pub struct TypeTable {
    entries: HashMap<&'static str, &'static str>,
    default: &'static str,
}

impl TypeTable {
    fn new(entries: &[(&'static str, &'static str)], default: &'static str) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
            default,
        }
    }

    /// Returns the mapped value, or the default.
    pub fn get(&self, key: &str) -> &'static str {
        self.entries.get(key).copied().unwrap_or(self.default)
    }
}

/// Organization aliases whose VIVO class differs from what their unit type implies.
const ORGANIZATION_ALIAS_TYPES: &[(&str, &str)] = &[(
    "independent-labs-institutes-and-centers-dean-of-research/stanford-neurosciences-institute",
    "Institute",
)];

/// VIVO class for units reported as departments (and unknown unit types).
pub static DEPARTMENT_TYPES: LazyLock<TypeTable> =
    LazyLock::new(|| TypeTable::new(ORGANIZATION_ALIAS_TYPES, "Department"));

/// VIVO class for units reported as divisions.
pub static DIVISION_TYPES: LazyLock<TypeTable> =
    LazyLock::new(|| TypeTable::new(ORGANIZATION_ALIAS_TYPES, "Division"));

/// Person affiliation flag to VIVO class.
pub static AFFILIATION_TYPES: LazyLock<Vec<(&'static str, Iri)>> = LazyLock::new(|| {
    vec![
        ("capFaculty", VIVO.iri("FacultyMember")),
        ("capStaff", VIVO.iri("NonAcademic")),
        ("capMdStudent", VIVO.iri("Student")),
        ("capMsStudent", VIVO.iri("Student")),
        ("capPhdStudent", VIVO.iri("Student")),
        ("capPostdoc", VIVO.iri("Postdoc")),
    ]
});

/// Unit names too generic to stand on their own as a label.
pub static NAMES_NEEDING_CONTEXT: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "External Relations",
        "Administration",
        "Dean's Office",
        "Financial Aid",
        "Financial Aid Office",
        "Research Centers",
    ]
});

/// Selects the VIVO class of an organization unit.
pub fn organization_type(unit_type: Option<&str>, alias: &str) -> Iri {
    let local = match unit_type {
        Some("ROOT") => "University",
        Some("SCHOOL") => "School",
        Some("DIVISION" | "SUB_DIVISION") => DIVISION_TYPES.get(alias),
        _ => DEPARTMENT_TYPES.get(alias),
    };
    VIVO.iri(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_types() {
        assert_eq!(organization_type(Some("ROOT"), "stanford").local(), "University");
        assert_eq!(organization_type(Some("SCHOOL"), "law").local(), "School");
        assert_eq!(organization_type(Some("SUB_DIVISION"), "x").local(), "Division");
        assert_eq!(organization_type(Some("DEPARTMENT"), "x").local(), "Department");
        assert_eq!(organization_type(None, "x").local(), "Department");
    }

    #[test]
    fn alias_overrides_default() {
        let alias =
            "independent-labs-institutes-and-centers-dean-of-research/stanford-neurosciences-institute";
        assert_eq!(organization_type(Some("DEPARTMENT"), alias).local(), "Institute");
        assert_eq!(organization_type(Some("DIVISION"), alias).local(), "Institute");
        assert_eq!(organization_type(Some("ROOT"), alias).local(), "University");
    }
}
