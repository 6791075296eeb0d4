//! Column dictionaries for each importable entity
//!
//! A schema lists the canonical field names of an entity's minimal form,
//! the spreadsheet header aliases known to map onto them, and which fields
//! need date, number or list treatment during normalization.

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSchema {
    /// Entity name used as the top-level key of JSON files
    pub base_name: String,
    /// Canonical field names, in export column order
    pub keys: Vec<String>,
    /// Header alias -> canonical field, in preference order
    pub key_map: Vec<(String, String)>,
    pub required_keys: Vec<String>,
    pub date_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    /// Cells holding `;`-separated lists
    pub list_columns: Vec<String>,
    /// Fields that only exist in JSON files (nested records)
    pub json_only_columns: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Fold a header for exact comparison: lowercase alphanumerics only
///
/// `"Last Name"`, `"last_name"` and `"LASTNAME"` all fold to `"lastname"`.
pub fn fold_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl ImportSchema {
    pub fn new(base_name: &str, keys: &[&str]) -> Self {
        Self {
            base_name: base_name.to_string(),
            keys: owned(keys),
            key_map: Vec::new(),
            required_keys: Vec::new(),
            date_columns: Vec::new(),
            numeric_columns: Vec::new(),
            list_columns: Vec::new(),
            json_only_columns: Vec::new(),
        }
    }

    pub fn alias(mut self, header: &str, key: &str) -> Self {
        self.key_map.push((header.to_string(), key.to_string()));
        self
    }

    pub fn required(mut self, keys: &[&str]) -> Self {
        self.required_keys = owned(keys);
        self
    }

    pub fn dates(mut self, keys: &[&str]) -> Self {
        self.date_columns = owned(keys);
        self
    }

    pub fn numeric(mut self, keys: &[&str]) -> Self {
        self.numeric_columns = owned(keys);
        self
    }

    pub fn lists(mut self, keys: &[&str]) -> Self {
        self.list_columns = owned(keys);
        self
    }

    pub fn json_only(mut self, keys: &[&str]) -> Self {
        self.json_only_columns = owned(keys);
        self
    }

    /// Add configured aliases; aliases naming an unknown field are skipped
    pub fn with_aliases<'a>(mut self, aliases: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (header, key) in aliases {
            if self.has_key(key) {
                self.key_map.push((header.to_string(), key.to_string()));
            } else {
                warn!(
                    "Ignoring alias \"{}\" for {}: no field named \"{}\"",
                    header, self.base_name, key
                );
            }
        }
        self
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Canonical field for a header that matches an alias or field name
    /// exactly (after folding case and punctuation)
    pub fn exact_key(&self, header: &str) -> Option<&str> {
        let folded = fold_header(header);
        if folded.is_empty() {
            return None;
        }
        self.key_map
            .iter()
            .find(|(alias, _)| fold_header(alias) == folded)
            .map(|(_, key)| key.as_str())
            .or_else(|| {
                self.keys
                    .iter()
                    .find(|k| fold_header(k) == folded)
                    .map(String::as_str)
            })
    }

    /// Every (candidate text, canonical field) pair for fuzzy matching
    pub fn candidates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.key_map
            .iter()
            .map(|(alias, key)| (alias.as_str(), key.as_str()))
            .chain(self.keys.iter().map(|k| (k.as_str(), k.as_str())))
    }

    /// Export header for a field: its first alias, or the field name
    pub fn header_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.key_map
            .iter()
            .find(|(_, k)| k == key)
            .map(|(alias, _)| alias.as_str())
            .unwrap_or(key)
    }

    /// Fields that appear as spreadsheet columns
    pub fn spreadsheet_keys(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|k| !self.json_only_columns.contains(k))
            .map(String::as_str)
    }

    pub fn is_date_column(&self, key: &str) -> bool {
        self.date_columns.iter().any(|k| k == key)
    }

    pub fn is_numeric_column(&self, key: &str) -> bool {
        self.numeric_columns.iter().any(|k| k == key)
    }

    pub fn is_list_column(&self, key: &str) -> bool {
        self.list_columns.iter().any(|k| k == key)
    }
}

pub fn instructors() -> ImportSchema {
    ImportSchema::new("instructors", &["last_name", "first_name", "utorid", "email"])
        .alias("Last Name", "last_name")
        .alias("Family Name", "last_name")
        .alias("Surname", "last_name")
        .alias("First Name", "first_name")
        .alias("Given Name", "first_name")
        .alias("UTORid", "utorid")
        .alias("Email", "email")
        .alias("Email Address", "email")
        .required(&["utorid"])
}

pub fn applicants() -> ImportSchema {
    ImportSchema::new(
        "applicants",
        &["last_name", "first_name", "utorid", "email", "student_number", "phone"],
    )
    .alias("Last Name", "last_name")
    .alias("Family Name", "last_name")
    .alias("Surname", "last_name")
    .alias("First Name", "first_name")
    .alias("Given Name", "first_name")
    .alias("UTORid", "utorid")
    .alias("Email", "email")
    .alias("Email Address", "email")
    .alias("Student Number", "student_number")
    .alias("Student ID", "student_number")
    .alias("Phone", "phone")
    .alias("Phone Number", "phone")
    .required(&["utorid"])
}

pub fn positions() -> ImportSchema {
    ImportSchema::new(
        "positions",
        &[
            "position_code",
            "position_title",
            "hours_per_assignment",
            "start_date",
            "end_date",
            "contract_template",
            "duties",
            "qualifications",
            "desired_num_assignments",
            "current_enrollment",
            "current_waitlisted",
            "instructors",
        ],
    )
    .alias("Position Code", "position_code")
    .alias("Course Code", "position_code")
    .alias("Position Title", "position_title")
    .alias("Course Title", "position_title")
    .alias("Hours per Assignment", "hours_per_assignment")
    .alias("Start Date", "start_date")
    .alias("End Date", "end_date")
    .alias("Contract Template", "contract_template")
    .alias("Duties", "duties")
    .alias("Qualifications", "qualifications")
    .alias("Desired Number of Assignments", "desired_num_assignments")
    .alias("Current Enrollment", "current_enrollment")
    .alias("Current Waitlist", "current_waitlisted")
    .alias("Instructors", "instructors")
    .required(&["position_code"])
    .dates(&["start_date", "end_date"])
    .numeric(&[
        "hours_per_assignment",
        "desired_num_assignments",
        "current_enrollment",
        "current_waitlisted",
    ])
    .lists(&["instructors"])
}

pub fn assignments() -> ImportSchema {
    ImportSchema::new(
        "assignments",
        &[
            "utorid",
            "position_code",
            "contract_override_pdf",
            "hours",
            "start_date",
            "end_date",
            "wage_chunks",
        ],
    )
    .alias("UTORid", "utorid")
    .alias("Position Code", "position_code")
    .alias("Course Code", "position_code")
    .alias("Contract Override PDF", "contract_override_pdf")
    .alias("Hours", "hours")
    .alias("Start Date", "start_date")
    .alias("End Date", "end_date")
    .required(&["utorid", "position_code"])
    .dates(&["start_date", "end_date"])
    .numeric(&["hours"])
    .json_only(&["wage_chunks"])
}

pub fn ddahs() -> ImportSchema {
    ImportSchema::new("ddahs", &["position_code", "applicant", "duties"])
        .alias("Position Code", "position_code")
        .alias("Course Code", "position_code")
        .alias("Applicant", "applicant")
        .alias("UTORid", "applicant")
        .alias("Duties", "duties")
        .required(&["position_code", "applicant"])
        .lists(&["duties"])
}
