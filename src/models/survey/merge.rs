//! Officer fields are recorded twice: on the survey remarks of the
//! requirement identification and on each shortlist entry. Remarks win
//! field by field.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Remarks,
    Shortlist,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: Option<T>,
    pub source: FieldSource,
}

impl<T> Sourced<T> {
    fn pick(remarks: Option<T>, shortlist: Option<T>) -> Self {
        match (remarks, shortlist) {
            (Some(value), _) => Sourced { value: Some(value), source: FieldSource::Remarks },
            (None, Some(value)) => Sourced { value: Some(value), source: FieldSource::Shortlist },
            (None, None) => Sourced { value: None, source: FieldSource::Missing },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfficerFields {
    pub field_officer_id: Option<i64>,
    pub supervisor_id: Option<i64>,
    pub respondent_name: Option<String>,
    pub survey_date: Option<NaiveDate>,
    pub oversight_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedOfficerFields {
    pub field_officer_id: Sourced<i64>,
    pub supervisor_id: Sourced<i64>,
    pub respondent_name: Sourced<String>,
    pub survey_date: Sourced<NaiveDate>,
    pub oversight_date: Sourced<NaiveDate>,
}

pub fn merge_officer_fields(
    remarks: Option<&OfficerFields>,
    shortlist: &OfficerFields,
) -> MergedOfficerFields {
    let r = remarks.cloned().unwrap_or_default();
    MergedOfficerFields {
        field_officer_id: Sourced::pick(r.field_officer_id, shortlist.field_officer_id),
        supervisor_id: Sourced::pick(r.supervisor_id, shortlist.supervisor_id),
        respondent_name: Sourced::pick(r.respondent_name, shortlist.respondent_name.clone()),
        survey_date: Sourced::pick(r.survey_date, shortlist.survey_date),
        oversight_date: Sourced::pick(r.oversight_date, shortlist.oversight_date),
    }
}
