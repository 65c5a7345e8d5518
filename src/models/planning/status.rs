use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Workflow stages of a planning record, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlanningStatus {
    #[serde(rename = "pengumpulan")]
    Collecting,
    #[serde(rename = "pengisian petugas")]
    OfficerFilling,
    #[serde(rename = "verifikasi pengawas")]
    SupervisorVerifying,
    #[serde(rename = "entri data")]
    DataEntry,
    #[serde(rename = "pemeriksaan")]
    Examination,
}

impl PlanningStatus {
    pub const ALL: [PlanningStatus; 5] = [
        PlanningStatus::Collecting,
        PlanningStatus::OfficerFilling,
        PlanningStatus::SupervisorVerifying,
        PlanningStatus::DataEntry,
        PlanningStatus::Examination,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlanningStatus::Collecting => "pengumpulan",
            PlanningStatus::OfficerFilling => "pengisian petugas",
            PlanningStatus::SupervisorVerifying => "verifikasi pengawas",
            PlanningStatus::DataEntry => "entri data",
            PlanningStatus::Examination => "pemeriksaan",
        }
    }

    pub fn from_label(label: &str) -> Option<PlanningStatus> {
        let label = label.trim();
        PlanningStatus::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for PlanningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Moving forward (or staying put) is allowed; moving back is not.
pub fn check_transition(current: PlanningStatus, target: PlanningStatus) -> Result<(), AppError> {
    if target < current {
        return Err(AppError::Validation(format!(
            "cannot move a planning record back from '{current}' to '{target}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for status in PlanningStatus::ALL {
            assert_eq!(PlanningStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(PlanningStatus::from_label("selesai"), None);
    }

    #[test]
    fn pipeline_order() {
        assert!(PlanningStatus::Collecting < PlanningStatus::OfficerFilling);
        assert!(PlanningStatus::DataEntry < PlanningStatus::Examination);
    }

    #[test]
    fn forward_and_same_status_are_allowed() {
        assert!(check_transition(PlanningStatus::Collecting, PlanningStatus::DataEntry).is_ok());
        assert!(check_transition(PlanningStatus::OfficerFilling, PlanningStatus::OfficerFilling).is_ok());
        assert!(check_transition(PlanningStatus::Examination, PlanningStatus::Examination).is_ok());
    }

    #[test]
    fn backward_is_rejected() {
        let err = check_transition(PlanningStatus::DataEntry, PlanningStatus::OfficerFilling).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
