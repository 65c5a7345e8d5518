//! Role mapping for identities synced from the external identity provider.

pub const ROLE_SUPERADMIN: &str = "superadmin";
pub const ROLE_PJ_BALAI: &str = "pj balai";
pub const ROLE_GUEST: &str = "guest";

/// Map the provider's role label onto an internal role name.
///
/// Session tokens carry `kepala-balai-*` slugs while the bulk directory
/// export uses `Kepala Balai ...`; both land on `pj balai`.
pub fn map_role_label(label: &str) -> &'static str {
    let raw = label.trim().to_lowercase();
    if raw.contains("kepala-balai") || raw.contains("kepala balai") {
        ROLE_PJ_BALAI
    } else if raw == ROLE_SUPERADMIN {
        ROLE_SUPERADMIN
    } else {
        ROLE_GUEST
    }
}

/// No-downgrade rule: a stored role other than guest is never replaced by
/// what the provider says.
pub fn resolve_role<'a>(current: Option<&'a str>, mapped: &'a str) -> &'a str {
    match current.map(str::trim) {
        Some(role) if !role.is_empty() && !role.eq_ignore_ascii_case(ROLE_GUEST) => role,
        _ => mapped,
    }
}
