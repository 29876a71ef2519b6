//! CSV roster import used to seed the candidate pipeline.

mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::candidates::{
    CandidateProfile, CandidateRecord, CandidateRepository, CandidateWorkflowService,
    NotificationDispatcher, WorkflowServiceError,
};

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read candidate roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid candidate roster CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster line {line} is missing a value for '{field}'")]
    MissingField { line: usize, field: &'static str },
    #[error("could not register roster candidate: {0}")]
    Registration(#[from] WorkflowServiceError),
}

/// Reads `Name, Email, Phone, Skills, Source, Job Title` rows into candidate profiles.
pub struct CandidateRosterImporter;

impl CandidateRosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CandidateProfile>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CandidateProfile>, RosterImportError> {
        parser::parse_profiles(reader)
    }

    /// Register every roster profile as a new candidate, stopping at the first failure.
    pub fn seed<R, N>(
        service: &CandidateWorkflowService<R, N>,
        profiles: Vec<CandidateProfile>,
    ) -> Result<Vec<CandidateRecord>, RosterImportError>
    where
        R: CandidateRepository + 'static,
        N: NotificationDispatcher + 'static,
    {
        profiles
            .into_iter()
            .map(|profile| service.create(profile).map_err(RosterImportError::from))
            .collect()
    }
}
