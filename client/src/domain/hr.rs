//! HR records: divisions, positions, and employees.
//!
//! Each record is normalized from whatever shape the API returned. Lookups
//! try the camelCase key, then the snake_case key, then the nested related
//! object, and finally a literal default, so every field is always
//! populated.

use serde::Serialize;
use serde_json::Value;

use super::ids::EntityId;
use super::normalize::RawRecord;

/// Default employee time zone.
pub const DEFAULT_TIMEZONE: &str = "WIB (+7)";
/// Default employment status.
pub const DEFAULT_EMPLOYEE_STATUS: &str = "Aktif";
/// Default division recruitment status.
pub const DEFAULT_RECRUITMENT_STATUS: &str = "Stabil";

/// Organisational division.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub recruitment_status: String,
    pub head_employee_id: Option<EntityId>,
    pub head_position_id: Option<EntityId>,
    /// Label of `head_employee_id`.
    pub head: String,
    /// Label of `head_position_id`.
    pub head_title: String,
}

impl Division {
    /// Normalize an API record.
    pub fn from_raw(value: &Value) -> Self {
        let raw = RawRecord::new(value);
        Self {
            id: raw.field("id").id(),
            name: raw.field("name").text(),
            description: raw.field("description").text(),
            recruitment_status: raw
                .field("recruitmentStatus")
                .or("recruitment_status")
                .text_or(DEFAULT_RECRUITMENT_STATUS),
            head_employee_id: raw
                .field("headEmployeeId")
                .or("head_employee_id")
                .or_nested("head_employee", "id")
                .id(),
            head_position_id: raw
                .field("headPositionId")
                .or("head_position_id")
                .or_nested("head_position", "id")
                .id(),
            head: raw
                .field("head")
                .or_nested("head_employee", "full_name")
                .text(),
            head_title: raw
                .field("headTitle")
                .or("head_title")
                .or_nested("head_position", "title")
                .text(),
        }
    }
}

/// Job position, optionally nested under a parent position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: Option<EntityId>,
    pub title: String,
    pub code: String,
    pub division_id: Option<EntityId>,
    /// Label of `division_id`.
    pub division_name: String,
    pub parent_id: Option<EntityId>,
    pub notes: String,
    pub grade: String,
    pub salary_range: String,
}

impl Position {
    /// Normalize an API record.
    pub fn from_raw(value: &Value) -> Self {
        let raw = RawRecord::new(value);
        Self {
            id: raw.field("id").id(),
            title: raw.field("title").text(),
            code: raw.field("code").text(),
            division_id: raw
                .field("divisionId")
                .or("division_id")
                .or_nested("division", "id")
                .id(),
            division_name: raw
                .field("divisionName")
                .or("division_name")
                .or_nested("division", "name")
                .text(),
            parent_id: raw
                .field("parentId")
                .or("parent_id")
                .or_nested("parent", "id")
                .id(),
            notes: raw.field("notes").text(),
            grade: raw.field("grade").text(),
            salary_range: raw.field("salaryRange").or("salary_range").text(),
        }
    }
}

/// Employee master record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Option<EntityId>,
    pub employee_code: String,
    pub nik: String,
    pub full_name: String,
    pub birth_place: String,
    pub birth_date: Option<String>,
    pub gender: String,
    pub blood_type: String,
    pub marital_status: String,
    pub religion: String,
    pub identity_type: String,
    pub identity_number: String,
    pub address_ktp: String,
    pub address_domicile: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub timezone: String,
    pub division_id: Option<EntityId>,
    /// Label of `division_id`.
    pub division_name: String,
    pub position_id: Option<EntityId>,
    /// Label of `position_id`.
    pub position_title: String,
    pub employment_type: String,
    pub status: String,
    pub join_date: Option<String>,
    pub photo: String,
}

impl Employee {
    /// Normalize an API record.
    ///
    /// `employee_code` and `nik` fall back to each other, as do `address`
    /// and `address_domicile`.
    pub fn from_raw(value: &Value) -> Self {
        let raw = RawRecord::new(value);
        Self {
            id: raw.field("id").id(),
            employee_code: raw
                .field("employeeCode")
                .or("employee_code")
                .or("nik")
                .text(),
            nik: raw
                .field("nik")
                .or("employeeCode")
                .or("employee_code")
                .text(),
            full_name: raw.field("fullName").or("full_name").text(),
            birth_place: raw.field("birthPlace").or("birth_place").text(),
            birth_date: raw
                .field("birthDate")
                .or("birth_date")
                .or("date_of_birth")
                .optional_text(),
            gender: raw.field("gender").text(),
            blood_type: raw.field("bloodType").or("blood_type").text(),
            marital_status: raw.field("maritalStatus").or("marital_status").text(),
            religion: raw.field("religion").text(),
            identity_type: raw.field("identityType").or("identity_type").text(),
            identity_number: raw.field("identityNumber").or("identity_number").text(),
            address_ktp: raw.field("addressKtp").or("address_ktp").text(),
            address_domicile: raw
                .field("addressDomicile")
                .or("address_domicile")
                .or("address")
                .text(),
            address: raw
                .field("address")
                .or("addressDomicile")
                .or("address_domicile")
                .text(),
            phone: raw.field("phone").text(),
            email: raw.field("email").text(),
            timezone: raw.field("timezone").text_or(DEFAULT_TIMEZONE),
            division_id: raw
                .field("divisionId")
                .or("division_id")
                .or_nested("division", "id")
                .id(),
            division_name: raw
                .field("divisionName")
                .or("division_name")
                .or_nested("division", "name")
                .text(),
            position_id: raw
                .field("positionId")
                .or("position_id")
                .or_nested("position", "id")
                .id(),
            position_title: raw
                .field("positionTitle")
                .or("position_title")
                .or_nested("position", "title")
                .text(),
            employment_type: raw.field("employmentType").or("employment_type").text(),
            status: raw.field("status").text_or(DEFAULT_EMPLOYEE_STATUS),
            join_date: raw.field("joinDate").or("join_date").optional_text(),
            photo: raw.field("photo").text(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn snake_case_employee_code_fills_both_identifiers() {
        let employee = Employee::from_raw(&json!({ "employee_code": "E1" }));
        assert_eq!(employee.employee_code, "E1");
        assert_eq!(employee.nik, "E1");
        assert_eq!(employee.timezone, DEFAULT_TIMEZONE);
        assert_eq!(employee.status, DEFAULT_EMPLOYEE_STATUS);
        assert_eq!(employee.division_id, None);
        assert_eq!(employee.division_name, "");
    }

    #[test]
    fn nested_relations_supply_labels() {
        let employee = Employee::from_raw(&json!({
            "id": 5,
            "full_name": "Dewi",
            "division_id": 2,
            "division": { "id": 2, "name": "Finance" },
            "position": { "id": 9, "title": "Analyst" },
            "date_of_birth": "1990-01-01T00:00:00Z",
        }));
        assert_eq!(employee.division_name, "Finance");
        assert_eq!(employee.position_id, EntityId::new(9));
        assert_eq!(employee.position_title, "Analyst");
        assert_eq!(employee.birth_date.as_deref(), Some("1990-01-01T00:00:00Z"));
    }

    #[rstest]
    #[case(json!({ "address": "Jl. A" }), "Jl. A", "Jl. A")]
    #[case(json!({ "address_domicile": "Jl. B" }), "Jl. B", "Jl. B")]
    #[case(json!({ "address": "Jl. A", "addressDomicile": "Jl. B" }), "Jl. B", "Jl. A")]
    fn addresses_fall_back_to_each_other(
        #[case] raw: Value,
        #[case] domicile: &str,
        #[case] address: &str,
    ) {
        let employee = Employee::from_raw(&raw);
        assert_eq!(employee.address_domicile, domicile);
        assert_eq!(employee.address, address);
    }

    #[test]
    fn division_defaults_recruitment_status() {
        let division = Division::from_raw(&json!({
            "id": 1,
            "name": "Ops",
            "head_employee_id": 4,
            "head_title": "Manager",
        }));
        assert_eq!(division.recruitment_status, DEFAULT_RECRUITMENT_STATUS);
        assert_eq!(division.head_employee_id, EntityId::new(4));
        assert_eq!(division.head_title, "Manager");
    }

    #[test]
    fn position_reads_parent_and_salary_range() {
        let position = Position::from_raw(&json!({
            "id": 3,
            "title": "Lead",
            "parent_id": 1,
            "salaryRange": "10-15",
            "division": { "id": 2, "name": "Engineering" },
        }));
        assert_eq!(position.parent_id, EntityId::new(1));
        assert_eq!(position.salary_range, "10-15");
        assert_eq!(position.division_id, EntityId::new(2));
        assert_eq!(position.division_name, "Engineering");
    }
}
