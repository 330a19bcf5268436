//! Data models for ResumeForge
//!
//! Defines the resume document: personal info, experience and education
//! entries, and the free-text lists. Field names serialize in camelCase so a
//! document written by the web client loads unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of an experience or education entry
///
/// Assigned once when the entry is created and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Error returned when a field key is not recognised
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {kind} field '{key}'. Valid fields: {valid}")]
pub struct UnknownField {
    pub kind: &'static str,
    pub key: String,
    pub valid: String,
}

/// Generates a closed field-key enum with wire names and parsing.
///
/// Keys parse from the camelCase wire name or from snake_case.
macro_rules! field_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every key, in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The camelCase key used in the serialized document
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownField;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|field| field.as_str().eq_ignore_ascii_case(&normalized))
                    .ok_or_else(|| UnknownField {
                        kind: $kind,
                        key: s.to_string(),
                        valid: Self::ALL
                            .iter()
                            .map(|f| f.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

field_enum!(
    /// Keys of [`PersonalInfo`]
    PersonalField, "personal info" {
        Name => "name",
        Title => "title",
        Email => "email",
        Phone => "phone",
        Location => "location",
        Website => "website",
        Summary => "summary",
    }
);

field_enum!(
    /// Editable keys of [`Experience`] (the id is not editable)
    ExperienceField, "experience" {
        Title => "title",
        Company => "company",
        StartDate => "startDate",
        EndDate => "endDate",
        Description => "description",
    }
);

field_enum!(
    /// Editable keys of [`Education`] (the id is not editable)
    EducationField, "education" {
        Degree => "degree",
        School => "school",
        Field => "field",
        StartDate => "startDate",
        EndDate => "endDate",
    }
);

/// Contact details and summary
///
/// All fields are free text; an empty string means "not filled in".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub summary: String,
}

impl PersonalInfo {
    pub fn get(&self, field: PersonalField) -> &str {
        match field {
            PersonalField::Name => &self.name,
            PersonalField::Title => &self.title,
            PersonalField::Email => &self.email,
            PersonalField::Phone => &self.phone,
            PersonalField::Location => &self.location,
            PersonalField::Website => &self.website,
            PersonalField::Summary => &self.summary,
        }
    }

    pub fn set(&mut self, field: PersonalField, value: impl Into<String>) {
        let slot = match field {
            PersonalField::Name => &mut self.name,
            PersonalField::Title => &mut self.title,
            PersonalField::Email => &mut self.email,
            PersonalField::Phone => &mut self.phone,
            PersonalField::Location => &mut self.location,
            PersonalField::Website => &mut self.website,
            PersonalField::Summary => &mut self.summary,
        };
        *slot = value.into();
    }

    /// True when every field is empty
    pub fn is_empty(&self) -> bool {
        PersonalField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// A work experience entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: EntryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

impl Experience {
    /// Create an empty entry with a fresh id
    pub fn new() -> Self {
        Self::with_id(EntryId::new())
    }

    /// Create an empty entry with a specific id
    pub fn with_id(id: EntryId) -> Self {
        Self {
            id,
            title: String::new(),
            company: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            description: String::new(),
        }
    }

    pub fn get(&self, field: ExperienceField) -> &str {
        match field {
            ExperienceField::Title => &self.title,
            ExperienceField::Company => &self.company,
            ExperienceField::StartDate => &self.start_date,
            ExperienceField::EndDate => &self.end_date,
            ExperienceField::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: ExperienceField, value: impl Into<String>) {
        let slot = match field {
            ExperienceField::Title => &mut self.title,
            ExperienceField::Company => &mut self.company,
            ExperienceField::StartDate => &mut self.start_date,
            ExperienceField::EndDate => &mut self.end_date,
            ExperienceField::Description => &mut self.description,
        };
        *slot = value.into();
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::new()
    }
}

/// An education entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: EntryId,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl Education {
    /// Create an empty entry with a fresh id
    pub fn new() -> Self {
        Self::with_id(EntryId::new())
    }

    /// Create an empty entry with a specific id
    pub fn with_id(id: EntryId) -> Self {
        Self {
            id,
            degree: String::new(),
            school: String::new(),
            field: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }

    pub fn get(&self, field: EducationField) -> &str {
        match field {
            EducationField::Degree => &self.degree,
            EducationField::School => &self.school,
            EducationField::Field => &self.field,
            EducationField::StartDate => &self.start_date,
            EducationField::EndDate => &self.end_date,
        }
    }

    pub fn set(&mut self, field: EducationField, value: impl Into<String>) {
        let slot = match field {
            EducationField::Degree => &mut self.degree,
            EducationField::School => &mut self.school,
            EducationField::Field => &mut self.field,
            EducationField::StartDate => &mut self.start_date,
            EducationField::EndDate => &mut self.end_date,
        };
        *slot = value.into();
    }
}

impl Default for Education {
    fn default() -> Self {
        Self::new()
    }
}

/// Part of the resume the generator can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Experience,
    Summary,
    Skills,
    /// Rewrite supplied text
    Improve,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Experience,
        Section::Summary,
        Section::Skills,
        Section::Improve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Summary => "summary",
            Section::Skills => "skills",
            Section::Improve => "improve",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownField {
                kind: "section",
                key: s.to_string(),
                valid: "experience, summary, skills, improve".to_string(),
            })
    }
}

/// The resume being edited
///
/// Sequence order is display order. `languages` and `certifications` are
/// carried through persistence but no store operation changes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resume {
    pub personal_info: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
}

impl Resume {
    /// True when the document equals the all-empty default
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn experience(&self, id: EntryId) -> Option<&Experience> {
        self.experience.iter().find(|e| e.id == id)
    }

    pub fn education(&self, id: EntryId) -> Option<&Education> {
        self.education.iter().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ids_are_unique() {
        let a = EntryId::new();
        let b = EntryId::new();
        assert_ne!(a, b);
        assert!(!a.to_string().is_empty());
    }

    #[test]
    fn test_entry_id_parse() {
        let id = EntryId::new();
        let parsed: EntryId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_field_parse_accepts_wire_and_snake_case() {
        assert_eq!("startDate".parse::<ExperienceField>(), Ok(ExperienceField::StartDate));
        assert_eq!("start_date".parse::<ExperienceField>(), Ok(ExperienceField::StartDate));
        assert_eq!("end-date".parse::<EducationField>(), Ok(EducationField::EndDate));
        assert_eq!("Summary".parse::<PersonalField>(), Ok(PersonalField::Summary));
    }

    #[test]
    fn test_field_parse_rejects_id() {
        let err = "id".parse::<ExperienceField>().unwrap_err();
        assert_eq!(err.key, "id");
        assert!(err.to_string().contains("description"));
        assert!("id".parse::<EducationField>().is_err());
    }

    #[test]
    fn test_personal_info_get_set() {
        let mut info = PersonalInfo::default();
        assert!(info.is_empty());

        for field in PersonalField::ALL {
            info.set(*field, field.as_str());
        }
        for field in PersonalField::ALL {
            assert_eq!(info.get(*field), field.as_str());
        }
        assert!(!info.is_empty());
    }

    #[test]
    fn test_new_entries_are_blank() {
        let exp = Experience::new();
        assert!(ExperienceField::ALL.iter().all(|f| exp.get(*f).is_empty()));

        let edu = Education::new();
        assert!(EducationField::ALL.iter().all(|f| edu.get(*f).is_empty()));
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut resume = Resume::default();
        let mut exp = Experience::new();
        exp.set(ExperienceField::StartDate, "2020-01");
        resume.experience.push(exp);

        let json = serde_json::to_value(&resume).unwrap();
        assert!(json.get("personalInfo").is_some());
        assert_eq!(json["experience"][0]["startDate"], "2020-01");
        assert!(json.get("certifications").is_some());
    }

    #[test]
    fn test_deserializes_partial_document() {
        let json = r#"{"personalInfo": {"name": "Ada"}, "skills": ["Rust", "Rust"]}"#;
        let resume: Resume = serde_json::from_str(json).unwrap();

        assert_eq!(resume.personal_info.name, "Ada");
        assert_eq!(resume.personal_info.email, "");
        assert_eq!(resume.skills, vec!["Rust", "Rust"]);
        assert!(resume.experience.is_empty());
        assert!(resume.languages.is_empty());
    }
}
