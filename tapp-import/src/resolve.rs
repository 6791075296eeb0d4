//! Relation resolution: minimal records to full canonical records
//!
//! Minimal records refer to other entities by natural key (UTORid, position
//! code, template name, instructor name). Resolution looks those up in the
//! store and fails with [`Error::Resolution`] when a reference is unknown.

use crate::context::DataContext;
use crate::models::ddah::ordered_duties;
use crate::models::{
    Assignment, ContractTemplate, Ddah, Instructor, MinimalAssignment, MinimalDdah,
    MinimalPosition, Position, WageChunk,
};
use crate::wage_chunks::{split_at_boundary, total_hours};
use tapp_common::time::{parse_date_str, truncate_to_date};
use tapp_common::{Error, Result};

/// Default wage-chunk boundary: January 1st
pub const DEFAULT_BOUNDARY: (u32, u32) = (1, 1);

pub struct Resolver<'a> {
    data: &'a DataContext,
    wage_chunk_boundary: (u32, u32),
}

impl<'a> Resolver<'a> {
    pub fn new(data: &'a DataContext) -> Self {
        Self {
            data,
            wage_chunk_boundary: DEFAULT_BOUNDARY,
        }
    }

    pub fn with_wage_chunk_boundary(mut self, boundary: (u32, u32)) -> Self {
        self.wage_chunk_boundary = boundary;
        self
    }

    pub fn data(&self) -> &'a DataContext {
        self.data
    }

    /// Look up one instructor by UTORid, "Last, First" or "First Last"
    pub fn instructor(&self, entry: &str) -> Result<Instructor> {
        let entry = entry.trim();
        if let Some(found) = self.data.instructor_by_utorid(entry) {
            return Ok(found.clone());
        }

        let wanted = entry.to_lowercase();
        let by_name = |i: &&Instructor| {
            let last = i.last_name.as_deref().unwrap_or("").to_lowercase();
            let first = i.first_name.as_deref().unwrap_or("").to_lowercase();
            match wanted.split_once(',') {
                Some((l, f)) => l.trim() == last && f.trim() == first,
                None => wanted == format!("{} {}", first, last),
            }
        };

        self.data
            .instructors
            .iter()
            .find(by_name)
            .cloned()
            .ok_or_else(|| Error::Resolution(format!("Cannot find instructor \"{}\"", entry)))
    }

    pub fn instructors(&self, entries: &[String]) -> Result<Vec<Instructor>> {
        entries.iter().map(|e| self.instructor(e)).collect()
    }

    pub fn contract_template(&self, name: Option<&str>) -> Result<Option<ContractTemplate>> {
        name.map(|name| {
            self.data
                .contract_template_by_name(name)
                .cloned()
                .ok_or_else(|| {
                    Error::Resolution(format!("Cannot find contract template \"{}\"", name))
                })
        })
        .transpose()
    }

    pub fn position(&self, minimal: &MinimalPosition) -> Result<Position> {
        Ok(Position {
            id: None,
            position_code: minimal.position_code.clone(),
            position_title: minimal.position_title.clone(),
            hours_per_assignment: minimal.hours_per_assignment,
            start_date: minimal.start_date.clone(),
            end_date: minimal.end_date.clone(),
            contract_template: self.contract_template(minimal.contract_template.as_deref())?,
            duties: minimal.duties.clone(),
            qualifications: minimal.qualifications.clone(),
            desired_num_assignments: minimal.desired_num_assignments,
            current_enrollment: minimal.current_enrollment,
            current_waitlisted: minimal.current_waitlisted,
            instructors: self.instructors(&minimal.instructors)?,
        })
    }

    /// Resolve an assignment
    ///
    /// Dates and hours default to the position's. Without explicit wage
    /// chunks the hours are split at the configured calendar boundary.
    pub fn assignment(&self, minimal: &MinimalAssignment) -> Result<Assignment> {
        let position = self
            .data
            .position_by_code(&minimal.position_code)
            .cloned()
            .ok_or_else(|| {
                Error::Resolution(format!(
                    "Cannot find position \"{}\"",
                    minimal.position_code
                ))
            })?;
        let applicant = self
            .data
            .applicant_by_utorid(&minimal.utorid)
            .cloned()
            .ok_or_else(|| {
                Error::Resolution(format!("Cannot find applicant \"{}\"", minimal.utorid))
            })?;

        let position_date = |d: &Option<String>| d.as_deref().map(|d| truncate_to_date(d).to_string());
        let start_date = minimal
            .start_date
            .clone()
            .or_else(|| position_date(&position.start_date));
        let end_date = minimal
            .end_date
            .clone()
            .or_else(|| position_date(&position.end_date));

        let (hours, wage_chunks) = match minimal.explicit_wage_chunks() {
            Some(chunks) => {
                let chunks: Vec<WageChunk> = chunks
                    .iter()
                    .map(|c| WageChunk {
                        id: None,
                        start_date: c.start_date.clone(),
                        end_date: c.end_date.clone(),
                        hours: c.hours,
                        rate: c.rate,
                    })
                    .collect();
                (Some(total_hours(chunks.iter().map(|c| c.hours))), chunks)
            }
            None => {
                let hours = minimal.hours.or(position.hours_per_assignment);
                let chunks = match (hours, &start_date, &end_date) {
                    (Some(hours), Some(start), Some(end)) => split_at_boundary(
                        parse_date_str(start)?,
                        parse_date_str(end)?,
                        hours,
                        self.wage_chunk_boundary,
                    ),
                    _ => Vec::new(),
                };
                (hours, chunks)
            }
        };

        Ok(Assignment {
            id: None,
            position,
            applicant,
            hours,
            start_date,
            end_date,
            contract_override_pdf: minimal.contract_override_pdf.clone(),
            active_offer_status: None,
            wage_chunks,
        })
    }

    pub fn ddah(&self, minimal: &MinimalDdah) -> Result<Ddah> {
        let assignment = self
            .data
            .assignment_for(&minimal.position_code, &minimal.applicant)
            .cloned()
            .ok_or_else(|| {
                Error::Resolution(format!(
                    "Cannot find assignment of \"{}\" to \"{}\"",
                    minimal.applicant, minimal.position_code
                ))
            })?;

        Ok(Ddah {
            id: None,
            assignment,
            duties: ordered_duties(&minimal.duties),
            approved_date: None,
            accepted_date: None,
            revised_date: None,
            emailed_date: None,
            status: None,
        })
    }
}
