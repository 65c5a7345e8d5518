use serde::{Deserialize, Serialize};

/// Assignable personnel roles. The serialized form is the internal role
/// name, which is also what `planning_personnel.role_kind` stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    #[serde(rename = "pengawas")]
    Supervisor,
    #[serde(rename = "petugas lapangan")]
    FieldOfficer,
    #[serde(rename = "pengolah data")]
    DataProcessor,
    #[serde(rename = "tim teknis balai")]
    TechnicalTeam,
}

impl RoleKind {
    pub const ALL: [RoleKind; 4] = [
        RoleKind::Supervisor,
        RoleKind::FieldOfficer,
        RoleKind::DataProcessor,
        RoleKind::TechnicalTeam,
    ];

    pub fn role_name(self) -> &'static str {
        match self {
            RoleKind::Supervisor => "pengawas",
            RoleKind::FieldOfficer => "petugas lapangan",
            RoleKind::DataProcessor => "pengolah data",
            RoleKind::TechnicalTeam => "tim teknis balai",
        }
    }

    /// Accepts the role name as well as `_`/`-` separated forms
    /// (`petugas_lapangan`, `pengolah-data`).
    pub fn parse(raw: &str) -> Option<RoleKind> {
        let normalized = raw.trim().to_lowercase().replace(['_', '-'], " ");
        RoleKind::ALL
            .into_iter()
            .find(|kind| kind.role_name() == normalized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "ditugaskan")]
    Assigned,
    #[serde(rename = "tidak ditugaskan")]
    Unassigned,
}

impl AssignmentStatus {
    pub fn from_assigned(assigned: bool) -> Self {
        if assigned {
            AssignmentStatus::Assigned
        } else {
            AssignmentStatus::Unassigned
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonnelAssignment {
    pub role: RoleKind,
    #[serde(alias = "id_perencanaan")]
    pub planning_id: i64,
    pub user_ids: Vec<i64>,
    /// Relative path of the uploaded assignment letter.
    pub letter_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TechnicalTeamForm {
    #[serde(alias = "nama_team")]
    pub name: String,
    #[serde(alias = "ketua_team")]
    pub chair_id: i64,
    #[serde(alias = "sekretaris_team")]
    pub secretary_id: i64,
    #[serde(alias = "anggota")]
    pub member_ids: Vec<i64>,
    pub letter_path: String,
    #[serde(default)]
    pub planning_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TechnicalTeam {
    pub id: i64,
    pub name: String,
    pub chair_id: i64,
    pub secretary_id: i64,
    pub member_ids: Vec<i64>,
    pub letter_path: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachTeamForm {
    pub planning_id: i64,
    pub team_id: i64,
}

/// Every ordered personnel set of one planning record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanningPersonnel {
    pub supervisor_ids: Vec<i64>,
    pub field_officer_ids: Vec<i64>,
    pub data_processor_ids: Vec<i64>,
    pub technical_team_ids: Vec<i64>,
}

/// Result of an assignment: the ordered set now held by the planning record.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentSummary {
    pub planning_id: i64,
    pub role: RoleKind,
    pub user_ids: Vec<i64>,
    pub letter_url: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AssignableUser {
    pub user_id: i64,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserAssignment {
    pub user_id: i64,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    pub nrp: Option<String>,
    #[serde(rename = "satuan_kerja_name")]
    pub work_unit_name: Option<String>,
    #[serde(rename = "status_penugasan")]
    pub status: AssignmentStatus,
    #[serde(rename = "surat_penugasan")]
    pub assignment_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub roster_id: i64,
    pub user_id: i64,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    pub nrp: Option<String>,
    #[serde(rename = "satuan_kerja_nama")]
    pub work_unit_name: Option<String>,
    pub status: AssignmentStatus,
    #[serde(rename = "url_sk_penugasan")]
    pub letter_url: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GuestUser {
    pub user_id: i64,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    pub nrp: Option<String>,
    #[serde(rename = "satuan_kerja_name")]
    pub work_unit_name: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "surat_penugasan")]
    pub assignment_letter: Option<String>,
}
