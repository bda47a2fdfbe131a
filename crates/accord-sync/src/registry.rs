//! Field mapping registry.
//!
//! The single source of truth correlating personal-profile attribute
//! names with their employee-record counterparts, grouped by shareable
//! category. Every sync direction and the snapshot engine consult these
//! tables; adding a shareable field is one entry here, not a per-path
//! edit.

use accord_types::ShareGroup;

/// One personal-side / employee-side name correspondence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldMapping {
    pub personal: &'static str,
    pub employee: &'static str,
}

const BASIC_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        personal: "name",
        employee: "legal_name",
    },
    FieldMapping {
        personal: "name_en",
        employee: "legal_name_en",
    },
    FieldMapping {
        personal: "birth_date",
        employee: "birth_date",
    },
    FieldMapping {
        personal: "gender",
        employee: "gender",
    },
    FieldMapping {
        personal: "nationality",
        employee: "nationality",
    },
];

const CONTACT_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        personal: "email",
        employee: "personal_email",
    },
    FieldMapping {
        personal: "mobile_phone",
        employee: "mobile_phone",
    },
    FieldMapping {
        personal: "phone",
        employee: "home_phone",
    },
    FieldMapping {
        personal: "postal_code",
        employee: "postal_code",
    },
    FieldMapping {
        personal: "address",
        employee: "home_address",
    },
    FieldMapping {
        personal: "emergency_contact_name",
        employee: "emergency_contact_name",
    },
    FieldMapping {
        personal: "emergency_contact_phone",
        employee: "emergency_contact_phone",
    },
];

/// Groups that carry scalar field mappings; the remaining groups gate
/// relation collections handled by the relation engine.
pub const SCALAR_GROUPS: [ShareGroup; 2] = [ShareGroup::Basic, ShareGroup::Contact];

pub fn fields_for_group(group: ShareGroup) -> &'static [FieldMapping] {
    match group {
        ShareGroup::Basic => BASIC_FIELDS,
        ShareGroup::Contact => CONTACT_FIELDS,
        _ => &[],
    }
}

pub fn all_scalar_mappings() -> impl Iterator<Item = &'static FieldMapping> {
    BASIC_FIELDS.iter().chain(CONTACT_FIELDS.iter())
}

pub fn employee_field(personal: &str) -> Option<&'static str> {
    all_scalar_mappings()
        .find(|mapping| mapping.personal == personal)
        .map(|mapping| mapping.employee)
}

pub fn personal_field(employee: &str) -> Option<&'static str> {
    all_scalar_mappings()
        .find(|mapping| mapping.employee == employee)
        .map(|mapping| mapping.personal)
}

/// Which shareable group a personal-side field belongs to.
pub fn group_of(personal: &str) -> Option<ShareGroup> {
    for group in SCALAR_GROUPS {
        if fields_for_group(group)
            .iter()
            .any(|mapping| mapping.personal == personal)
        {
            return Some(group);
        }
    }
    None
}
