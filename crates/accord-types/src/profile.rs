use crate::consent::RelationKind;
use crate::fields::{BasicFieldSink, BasicFieldSource, FieldValue};
use crate::ids::PersonAccountId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub school_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageSkillRecord {
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

/// Singleton per person; at most one service history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MilitaryServiceRecord {
    pub service_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyMemberRecord {
    pub relation: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    pub is_dependent: bool,
}

/// One relation collection in transit between the two sides, typed by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RelationRecords {
    Education(Vec<EducationRecord>),
    Career(Vec<CareerRecord>),
    Certificates(Vec<CertificateRecord>),
    Languages(Vec<LanguageSkillRecord>),
    Military(Option<MilitaryServiceRecord>),
    Family(Vec<FamilyMemberRecord>),
}

impl RelationRecords {
    pub fn kind(&self) -> RelationKind {
        match self {
            RelationRecords::Education(_) => RelationKind::Education,
            RelationRecords::Career(_) => RelationKind::Career,
            RelationRecords::Certificates(_) => RelationKind::Certificate,
            RelationRecords::Languages(_) => RelationKind::Language,
            RelationRecords::Military(_) => RelationKind::Military,
            RelationRecords::Family(_) => RelationKind::Family,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RelationRecords::Education(records) => records.len(),
            RelationRecords::Career(records) => records.len(),
            RelationRecords::Certificates(records) => records.len(),
            RelationRecords::Languages(records) => records.len(),
            RelationRecords::Military(record) => usize::from(record.is_some()),
            RelationRecords::Family(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The relation collections carried by both sides of the pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationSet {
    pub education: Vec<EducationRecord>,
    pub career: Vec<CareerRecord>,
    pub certificates: Vec<CertificateRecord>,
    pub languages: Vec<LanguageSkillRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub military: Option<MilitaryServiceRecord>,
    pub family: Vec<FamilyMemberRecord>,
}

impl RelationSet {
    pub fn records(&self, kind: RelationKind) -> RelationRecords {
        match kind {
            RelationKind::Education => RelationRecords::Education(self.education.clone()),
            RelationKind::Career => RelationRecords::Career(self.career.clone()),
            RelationKind::Certificate => RelationRecords::Certificates(self.certificates.clone()),
            RelationKind::Language => RelationRecords::Languages(self.languages.clone()),
            RelationKind::Military => RelationRecords::Military(self.military.clone()),
            RelationKind::Family => RelationRecords::Family(self.family.clone()),
        }
    }

    /// Full replace of one kind's collection.
    pub fn replace(&mut self, records: RelationRecords) {
        match records {
            RelationRecords::Education(records) => self.education = records,
            RelationRecords::Career(records) => self.career = records,
            RelationRecords::Certificates(records) => self.certificates = records,
            RelationRecords::Languages(records) => self.languages = records,
            RelationRecords::Military(record) => self.military = record,
            RelationRecords::Family(records) => self.family = records,
        }
    }

    pub fn count(&self, kind: RelationKind) -> usize {
        match kind {
            RelationKind::Education => self.education.len(),
            RelationKind::Career => self.career.len(),
            RelationKind::Certificate => self.certificates.len(),
            RelationKind::Language => self.languages.len(),
            RelationKind::Military => usize::from(self.military.is_some()),
            RelationKind::Family => self.family.len(),
        }
    }
}

/// The self-controlled representation of a person's HR data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonalProfile {
    pub person_account_id: PersonAccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    pub relations: RelationSet,
    pub updated_at: DateTime<Utc>,
}

impl PersonalProfile {
    pub fn new(person_account_id: PersonAccountId) -> Self {
        Self {
            person_account_id,
            name: None,
            name_en: None,
            birth_date: None,
            gender: None,
            nationality: None,
            email: None,
            mobile_phone: None,
            phone: None,
            postal_code: None,
            address: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            relations: RelationSet::default(),
            updated_at: Utc::now(),
        }
    }
}

impl BasicFieldSource for PersonalProfile {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => self.name.clone().map(FieldValue::Text),
            "name_en" => self.name_en.clone().map(FieldValue::Text),
            "birth_date" => self.birth_date.map(FieldValue::Date),
            "gender" => self.gender.clone().map(FieldValue::Text),
            "nationality" => self.nationality.clone().map(FieldValue::Text),
            "email" => self.email.clone().map(FieldValue::Text),
            "mobile_phone" => self.mobile_phone.clone().map(FieldValue::Text),
            "phone" => self.phone.clone().map(FieldValue::Text),
            "postal_code" => self.postal_code.clone().map(FieldValue::Text),
            "address" => self.address.clone().map(FieldValue::Text),
            "emergency_contact_name" => self.emergency_contact_name.clone().map(FieldValue::Text),
            "emergency_contact_phone" => self.emergency_contact_phone.clone().map(FieldValue::Text),
            _ => None,
        }
    }
}

impl BasicFieldSink for PersonalProfile {
    fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> bool {
        match name {
            "name" => self.name = value.and_then(FieldValue::into_text),
            "name_en" => self.name_en = value.and_then(FieldValue::into_text),
            "birth_date" => self.birth_date = value.and_then(FieldValue::into_date),
            "gender" => self.gender = value.and_then(FieldValue::into_text),
            "nationality" => self.nationality = value.and_then(FieldValue::into_text),
            "email" => self.email = value.and_then(FieldValue::into_text),
            "mobile_phone" => self.mobile_phone = value.and_then(FieldValue::into_text),
            "phone" => self.phone = value.and_then(FieldValue::into_text),
            "postal_code" => self.postal_code = value.and_then(FieldValue::into_text),
            "address" => self.address = value.and_then(FieldValue::into_text),
            "emergency_contact_name" => {
                self.emergency_contact_name = value.and_then(FieldValue::into_text)
            }
            "emergency_contact_phone" => {
                self.emergency_contact_phone = value.and_then(FieldValue::into_text)
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn military_relation_counts_as_singleton() {
        let mut relations = RelationSet::default();
        assert_eq!(relations.count(RelationKind::Military), 0);
        relations.military = Some(MilitaryServiceRecord {
            service_type: "army".to_string(),
            branch: None,
            rank: Some("sergeant".to_string()),
            start_date: None,
            end_date: None,
            discharge_type: None,
        });
        assert_eq!(relations.count(RelationKind::Military), 1);
        assert!(!relations.records(RelationKind::Military).is_empty());
    }

    #[test]
    fn unknown_field_is_not_writable() {
        let mut profile = PersonalProfile::new(PersonAccountId::new("p1"));
        assert!(!profile.set_field("salary", Some(FieldValue::text("1"))));
        assert!(profile.set_field("email", Some(FieldValue::text("a@b.c"))));
        assert_eq!(profile.field("email"), Some(FieldValue::text("a@b.c")));
    }
}
