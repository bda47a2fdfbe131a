use crate::fields::{BasicFieldSink, BasicFieldSource, FieldValue};
use crate::ids::{CompanyId, EmployeeId, EmployeeNumber, PersonAccountId};
use crate::profile::{PersonalProfile, RelationSet};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Created but not yet activated by the company.
    PreActive,
    Active,
    Resigned,
}

/// The employer-controlled representation of a person's HR data.
///
/// `company_id` is optional only because legacy rows exist without one;
/// the integrity validator reports such rows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<EmployeeNumber>,
    pub status: EmployeeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resignation_date: Option<NaiveDate>,
    pub relations: RelationSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn new(company_id: CompanyId) -> Self {
        let now = Utc::now();
        Self {
            id: EmployeeId::generate(),
            company_id: Some(company_id),
            employee_number: None,
            status: EmployeeStatus::PreActive,
            legal_name: None,
            legal_name_en: None,
            birth_date: None,
            gender: None,
            nationality: None,
            personal_email: None,
            work_email: None,
            mobile_phone: None,
            home_phone: None,
            postal_code: None,
            home_address: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            department: None,
            position: None,
            hire_date: None,
            resignation_date: None,
            relations: RelationSet::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Materialization seed: a new employee carrying a full-field copy of
    /// the profile's scalar attributes.
    pub fn from_profile(company_id: CompanyId, profile: &PersonalProfile) -> Self {
        let mut employee = Self::new(company_id);
        employee.legal_name = profile.name.clone();
        employee.legal_name_en = profile.name_en.clone();
        employee.birth_date = profile.birth_date;
        employee.gender = profile.gender.clone();
        employee.nationality = profile.nationality.clone();
        employee.personal_email = profile.email.clone();
        employee.mobile_phone = profile.mobile_phone.clone();
        employee.home_phone = profile.phone.clone();
        employee.postal_code = profile.postal_code.clone();
        employee.home_address = profile.address.clone();
        employee.emergency_contact_name = profile.emergency_contact_name.clone();
        employee.emergency_contact_phone = profile.emergency_contact_phone.clone();
        employee
    }
}

impl BasicFieldSource for Employee {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "legal_name" => self.legal_name.clone().map(FieldValue::Text),
            "legal_name_en" => self.legal_name_en.clone().map(FieldValue::Text),
            "birth_date" => self.birth_date.map(FieldValue::Date),
            "gender" => self.gender.clone().map(FieldValue::Text),
            "nationality" => self.nationality.clone().map(FieldValue::Text),
            "personal_email" => self.personal_email.clone().map(FieldValue::Text),
            "mobile_phone" => self.mobile_phone.clone().map(FieldValue::Text),
            "home_phone" => self.home_phone.clone().map(FieldValue::Text),
            "postal_code" => self.postal_code.clone().map(FieldValue::Text),
            "home_address" => self.home_address.clone().map(FieldValue::Text),
            "emergency_contact_name" => self.emergency_contact_name.clone().map(FieldValue::Text),
            "emergency_contact_phone" => self.emergency_contact_phone.clone().map(FieldValue::Text),
            _ => None,
        }
    }
}

impl BasicFieldSink for Employee {
    fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> bool {
        match name {
            "legal_name" => self.legal_name = value.and_then(FieldValue::into_text),
            "legal_name_en" => self.legal_name_en = value.and_then(FieldValue::into_text),
            "birth_date" => self.birth_date = value.and_then(FieldValue::into_date),
            "gender" => self.gender = value.and_then(FieldValue::into_text),
            "nationality" => self.nationality = value.and_then(FieldValue::into_text),
            "personal_email" => self.personal_email = value.and_then(FieldValue::into_text),
            "mobile_phone" => self.mobile_phone = value.and_then(FieldValue::into_text),
            "home_phone" => self.home_phone = value.and_then(FieldValue::into_text),
            "postal_code" => self.postal_code = value.and_then(FieldValue::into_text),
            "home_address" => self.home_address = value.and_then(FieldValue::into_text),
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyRoleKind {
    Admin,
    Manager,
    Staff,
}

impl CompanyRoleKind {
    /// Working roles must point at an employee record; admins need not.
    pub fn requires_employee(self) -> bool {
        matches!(self, CompanyRoleKind::Manager | CompanyRoleKind::Staff)
    }
}

/// A person's role within a company, held separately from the contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompanyRole {
    pub person_account_id: PersonAccountId,
    pub company_id: CompanyId,
    pub role: CompanyRoleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PersonAccountId;

    #[test]
    fn from_profile_copies_scalars() {
        let mut profile = PersonalProfile::new(PersonAccountId::new("p1"));
        profile.name = Some("Kim Jiwoo".to_string());
        profile.email = Some("jiwoo@example.com".to_string());
        profile.phone = Some("02-555-0100".to_string());

        let employee = Employee::from_profile(CompanyId::new("co1"), &profile);
        assert_eq!(employee.legal_name.as_deref(), Some("Kim Jiwoo"));
        assert_eq!(employee.personal_email.as_deref(), Some("jiwoo@example.com"));
        assert_eq!(employee.home_phone.as_deref(), Some("02-555-0100"));
        assert_eq!(employee.status, EmployeeStatus::PreActive);
    }

    #[test]
    fn working_roles_require_employee_link() {
        assert!(CompanyRoleKind::Staff.requires_employee());
        assert!(CompanyRoleKind::Manager.requires_employee());
        assert!(!CompanyRoleKind::Admin.requires_employee());
    }
}
