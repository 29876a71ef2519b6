use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::candidates::CandidateProfile;

use super::RosterImportError;

pub(crate) fn parse_profiles<R: Read>(
    reader: R,
) -> Result<Vec<CandidateProfile>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut profiles = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        let row = record?;
        // header is line 1
        let line = index + 2;
        profiles.push(row.into_profile(line)?);
    }

    Ok(profiles)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Email", default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(rename = "Skills", default, deserialize_with = "empty_string_as_none")]
    skills: Option<String>,
    #[serde(rename = "Source", default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
    #[serde(
        rename = "Job Title",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    job_title: Option<String>,
}

impl RosterRow {
    fn into_profile(self, line: usize) -> Result<CandidateProfile, RosterImportError> {
        let name = self
            .name
            .ok_or(RosterImportError::MissingField { line, field: "Name" })?;
        let email = self
            .email
            .ok_or(RosterImportError::MissingField { line, field: "Email" })?;

        Ok(CandidateProfile {
            name,
            email,
            phone: self.phone,
            skills: split_skills(self.skills.as_deref()),
            source: self.source,
            job_title: self.job_title,
        })
    }
}

fn split_skills(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(';')
            .map(str::trim)
            .filter(|skill| !skill.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
