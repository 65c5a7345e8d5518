use std::collections::HashSet;

use crate::errors::AppError;

/// Drop repeated ids, keeping the first occurrence.
pub fn dedup_preserving_order(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Chair and secretary may not double as ordinary members.
pub fn check_leadership_overlap(
    chair_id: i64,
    secretary_id: i64,
    member_ids: &[i64],
) -> Result<(), AppError> {
    if member_ids.iter().any(|id| *id == chair_id || *id == secretary_id) {
        return Err(AppError::Duplicate(
            "chair or secretary may not also be listed as a member".to_string(),
        ));
    }
    Ok(())
}

/// Everyone on a team in role order: chair, secretary, then members.
pub fn leadership_union(chair_id: i64, secretary_id: i64, member_ids: &[i64]) -> Vec<i64> {
    let mut all = Vec::with_capacity(member_ids.len() + 2);
    all.push(chair_id);
    all.push(secretary_id);
    all.extend_from_slice(member_ids);
    dedup_preserving_order(&all)
}
