use crate::ids::ContractId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shareable categories a person can consent to, one flag each on the
/// contract's sharing settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareGroup {
    Basic,
    Contact,
    Education,
    Career,
    Certificates,
    Languages,
    Military,
}

/// Relation collection kinds moved by the relation sync engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Education,
    Career,
    Certificate,
    Language,
    Military,
    Family,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        RelationKind::Education,
        RelationKind::Career,
        RelationKind::Certificate,
        RelationKind::Language,
        RelationKind::Military,
        RelationKind::Family,
    ];

    /// The consent flag gating this relation. Family composition has no
    /// flag of its own and rides the basic-information consent.
    pub fn consent_group(self) -> ShareGroup {
        match self {
            RelationKind::Education => ShareGroup::Education,
            RelationKind::Career => ShareGroup::Career,
            RelationKind::Certificate => ShareGroup::Certificates,
            RelationKind::Language => ShareGroup::Languages,
            RelationKind::Military => ShareGroup::Military,
            RelationKind::Family => ShareGroup::Basic,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RelationKind::Education => "education",
            RelationKind::Career => "career",
            RelationKind::Certificate => "certificates",
            RelationKind::Language => "languages",
            RelationKind::Military => "military_service",
            RelationKind::Family => "family",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Per-contract consent state, 1:1 with the contract.
///
/// Provisioned with permissive defaults when the contract is approved and
/// forced all-false when it terminates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataSharingSettings {
    pub contract_id: ContractId,
    pub share_basic: bool,
    pub share_contact: bool,
    pub share_education: bool,
    pub share_career: bool,
    pub share_certificates: bool,
    pub share_languages: bool,
    pub share_military: bool,
    pub realtime_sync: bool,
    pub updated_at: DateTime<Utc>,
}

impl DataSharingSettings {
    /// Defaults provisioned at approval: basic and contact on, the rest
    /// off, realtime off.
    pub fn permissive_defaults(contract_id: ContractId) -> Self {
        Self {
            contract_id,
            share_basic: true,
            share_contact: true,
            share_education: false,
            share_career: false,
            share_certificates: false,
            share_languages: false,
            share_military: false,
            realtime_sync: false,
            updated_at: Utc::now(),
        }
    }

    pub fn all_revoked(contract_id: ContractId) -> Self {
        let mut settings = Self::permissive_defaults(contract_id);
        settings.revoke_all();
        settings
    }

    /// Termination path: every flag off, including realtime.
    pub fn revoke_all(&mut self) {
        self.share_basic = false;
        self.share_contact = false;
        self.share_education = false;
        self.share_career = false;
        self.share_certificates = false;
        self.share_languages = false;
        self.share_military = false;
        self.realtime_sync = false;
        self.updated_at = Utc::now();
    }

    pub fn allows(&self, group: ShareGroup) -> bool {
        match group {
            ShareGroup::Basic => self.share_basic,
            ShareGroup::Contact => self.share_contact,
            ShareGroup::Education => self.share_education,
            ShareGroup::Career => self.share_career,
            ShareGroup::Certificates => self.share_certificates,
            ShareGroup::Languages => self.share_languages,
            ShareGroup::Military => self.share_military,
        }
    }

    pub fn authorized_groups(&self) -> Vec<ShareGroup> {
        [
            ShareGroup::Basic,
            ShareGroup::Contact,
            ShareGroup::Education,
            ShareGroup::Career,
            ShareGroup::Certificates,
            ShareGroup::Languages,
            ShareGroup::Military,
        ]
        .into_iter()
        .filter(|group| self.allows(*group))
        .collect()
    }
}

/// Partial update applied to sharing settings; `None` leaves a flag as is.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConsentUpdate {
    pub share_basic: Option<bool>,
    pub share_contact: Option<bool>,
    pub share_education: Option<bool>,
    pub share_career: Option<bool>,
    pub share_certificates: Option<bool>,
    pub share_languages: Option<bool>,
    pub share_military: Option<bool>,
    pub realtime_sync: Option<bool>,
}

impl ConsentUpdate {
    pub fn realtime(enabled: bool) -> Self {
        Self {
            realtime_sync: Some(enabled),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, settings: &mut DataSharingSettings) {
        if let Some(value) = self.share_basic {
            settings.share_basic = value;
        }
        if let Some(value) = self.share_contact {
            settings.share_contact = value;
        }
        if let Some(value) = self.share_education {
            settings.share_education = value;
        }
        if let Some(value) = self.share_career {
            settings.share_career = value;
        }
        if let Some(value) = self.share_certificates {
            settings.share_certificates = value;
        }
        if let Some(value) = self.share_languages {
            settings.share_languages = value;
        }
        if let Some(value) = self.share_military {
            settings.share_military = value;
        }
        if let Some(value) = self.realtime_sync {
            settings.realtime_sync = value;
        }
        settings.updated_at = Utc::now();
    }
}
