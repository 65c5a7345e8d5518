use std::fmt;

use serde::{Deserialize, Serialize};

/// The three requirement categories a package is identified by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementKind {
    #[serde(rename = "material")]
    Material,
    #[serde(rename = "peralatan")]
    Equipment,
    #[serde(rename = "tenaga_kerja")]
    Labor,
}

impl RequirementKind {
    pub const ALL: [RequirementKind; 3] = [
        RequirementKind::Material,
        RequirementKind::Equipment,
        RequirementKind::Labor,
    ];

    /// Value stored in the `kind` columns.
    pub fn as_str(self) -> &'static str {
        match self {
            RequirementKind::Material => "material",
            RequirementKind::Equipment => "peralatan",
            RequirementKind::Labor => "tenaga_kerja",
        }
    }

    pub fn parse(raw: &str) -> Option<RequirementKind> {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "material" => Some(RequirementKind::Material),
            "peralatan" | "equipment" => Some(RequirementKind::Equipment),
            "tenaga_kerja" | "tenaga kerja" | "labor" => Some(RequirementKind::Labor),
            _ => None,
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per requirement kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ByKind<T> {
    pub material: T,
    #[serde(rename = "peralatan")]
    pub equipment: T,
    #[serde(rename = "tenaga_kerja")]
    pub labor: T,
}

impl<T> ByKind<T> {
    pub fn get(&self, kind: RequirementKind) -> &T {
        match kind {
            RequirementKind::Material => &self.material,
            RequirementKind::Equipment => &self.equipment,
            RequirementKind::Labor => &self.labor,
        }
    }

    pub fn get_mut(&mut self, kind: RequirementKind) -> &mut T {
        match kind {
            RequirementKind::Material => &mut self.material,
            RequirementKind::Equipment => &mut self.equipment,
            RequirementKind::Labor => &mut self.labor,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(RequirementKind, T) -> U) -> ByKind<U> {
        ByKind {
            material: f(RequirementKind::Material, self.material),
            equipment: f(RequirementKind::Equipment, self.equipment),
            labor: f(RequirementKind::Labor, self.labor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_column_and_english_names() {
        assert_eq!(RequirementKind::parse("tenaga-kerja"), Some(RequirementKind::Labor));
        assert_eq!(RequirementKind::parse("Peralatan"), Some(RequirementKind::Equipment));
        assert_eq!(RequirementKind::parse("alat"), None);
    }

    #[test]
    fn by_kind_serializes_with_column_names() {
        let counts = ByKind { material: 1, equipment: 2, labor: 3 };
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json, serde_json::json!({"material": 1, "peralatan": 2, "tenaga_kerja": 3}));
        assert_eq!(*counts.get(RequirementKind::Equipment), 2);
    }

    #[test]
    fn map_visits_every_kind() {
        let kinds = ByKind::<()>::default().map(|kind, _| kind.as_str());
        assert_eq!(kinds.labor, "tenaga_kerja");
    }
}
