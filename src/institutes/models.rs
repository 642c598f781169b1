use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::models::trim_option;
use crate::auth::UserSummary;
use crate::validation::{validate_institute_code, validate_pincode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstituteType {
    School,
    College,
    University,
}

/// Institute record as stored
///
/// `faculty` and `head` are weak references to users; they are only resolved
/// on the single-record read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Institute {
    pub id: Uuid,
    #[schema(example = "IITB")]
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub institute_type: InstituteType,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub faculty: Vec<Uuid>,
    #[serde(rename = "head")]
    pub head_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInstitute {
    pub code: String,
    pub name: String,
    pub institute_type: InstituteType,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub faculty: Vec<Uuid>,
    pub head_id: Option<Uuid>,
    pub created_by: Uuid,
}

/// Request DTO for creating an institute
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstituteRequest {
    #[validate(custom = "validate_institute_code")]
    #[schema(example = "IITB")]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[serde(rename = "type")]
    pub institute_type: InstituteType,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(custom = "validate_pincode")]
    pub pincode: Option<String>,
    #[serde(default)]
    pub faculty: Vec<Uuid>,
    pub head: Option<Uuid>,
}

impl CreateInstituteRequest {
    /// Trim code and name so whitespace-only values fail validation
    pub fn trim_fields(&mut self) {
        self.code = self.code.trim().to_string();
        self.name = self.name.trim().to_string();
    }

    pub fn into_new(self, created_by: Uuid) -> NewInstitute {
        NewInstitute {
            code: self.code,
            name: self.name,
            institute_type: self.institute_type,
            address: self.address,
            city: self.city,
            state: self.state,
            pincode: self.pincode,
            faculty: self.faculty,
            head_id: self.head,
            created_by,
        }
    }
}

/// Request DTO for a partial institute update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstituteRequest {
    #[validate(custom = "validate_institute_code")]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub institute_type: Option<InstituteType>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[validate(custom = "validate_pincode")]
    pub pincode: Option<String>,
    pub faculty: Option<Vec<Uuid>>,
    pub head: Option<Uuid>,
}

impl UpdateInstituteRequest {
    pub fn trim_fields(&mut self) {
        trim_option(&mut self.code);
        trim_option(&mut self.name);
    }
}

/// Institute with faculty and head resolved to display fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstituteDetail {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub institute_type: InstituteType,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub faculty: Vec<UserSummary>,
    pub head: Option<UserSummary>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl InstituteDetail {
    pub fn new(institute: Institute, faculty: Vec<UserSummary>, head: Option<UserSummary>) -> Self {
        Self {
            id: institute.id,
            code: institute.code,
            name: institute.name,
            institute_type: institute.institute_type,
            address: institute.address,
            city: institute.city,
            state: institute.state,
            pincode: institute.pincode,
            faculty,
            head,
            created_by: institute.created_by,
            created_at: institute.created_at,
        }
    }
}

/// `{success, data}` envelope used by the institute endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    InstituteEnvelope = Envelope<Institute>,
    InstituteListEnvelope = Envelope<Vec<Institute>>,
    InstituteDetailEnvelope = Envelope<InstituteDetail>
)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_uses_type_key() {
        let json = r#"{
            "code": "IITB",
            "name": "Indian Institute of Technology Bombay",
            "type": "university",
            "pincode": "400076"
        }"#;
        let request: CreateInstituteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.institute_type, InstituteType::University);
        assert!(request.faculty.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_code_and_pincode() {
        let json = r#"{"code": "has space", "name": "X", "type": "college", "pincode": "12"}"#;
        let request: CreateInstituteRequest = serde_json::from_str(json).unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("code"));
        assert!(fields.contains_key("pincode"));
    }

    #[test]
    fn test_update_request_validates_present_code_only() {
        assert!(UpdateInstituteRequest::default().validate().is_ok());
        let bad = UpdateInstituteRequest {
            code: Some("!".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_whitespace_name_fails_after_trim() {
        let json = r#"{"code": " IITB ", "name": "   ", "type": "university"}"#;
        let mut request: CreateInstituteRequest = serde_json::from_str(json).unwrap();
        request.trim_fields();
        assert_eq!(request.code, "IITB");
        assert!(request.validate().unwrap_err().field_errors().contains_key("name"));

        let mut update = UpdateInstituteRequest {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        update.trim_fields();
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(Envelope::ok(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }
}
