use crate::error::{DecodeBodySnafu, StudentsResult, ValidationSnafu};
use email_address::{EmailAddress, Options};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{ResultExt, ensure};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub email: EmailAddress,
}

/// Body of `POST /students`. Any `id` sent by the client is ignored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StudentCreate {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub email: String,
}

impl StudentCreate {
    pub fn from_json(body: Value) -> StudentsResult<Self> {
        check_body(&body, true)?;
        serde_json::from_value(body).context(DecodeBodySnafu)
    }
}

/// Body of `PUT /students/{id}`.
///
/// Outer `None` means the field was left out, `Some(None)` means it was sent as `null`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct StudentUpdate {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub age: Option<Option<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub gender: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub email: Option<Option<String>>,
}

impl StudentUpdate {
    pub fn from_json(body: Value) -> StudentsResult<Self> {
        check_body(&body, false)?;
        serde_json::from_value(body).context(DecodeBodySnafu)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn new(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    fn null(field: &str) -> Self {
        Self::new(field, "Field may not be null", "null_value")
    }
}

#[derive(Copy, Clone, Debug)]
enum FieldType {
    String,
    Integer,
}

impl FieldType {
    fn check(self, field: &str, value: &Value) -> Option<FieldError> {
        match self {
            Self::String if !value.is_string() => Some(FieldError::new(
                field,
                "Input should be a valid string",
                "string_type",
            )),
            Self::Integer if value.as_i64().is_none() => Some(FieldError::new(
                field,
                "Input should be a valid integer",
                "int_type",
            )),
            _ => None,
        }
    }
}

const FIELDS: [(&str, FieldType); 4] = [
    ("name", FieldType::String),
    ("age", FieldType::Integer),
    ("gender", FieldType::String),
    ("email", FieldType::String),
];

///type-checks each student field of a raw body, so shape errors carry a field location.
///when `required` is false, missing fields and `null`s are left for the merge to deal with
fn check_body(body: &Value, required: bool) -> StudentsResult<()> {
    let Some(fields) = body.as_object() else {
        return ValidationSnafu {
            errors: vec![FieldError {
                loc: vec!["body".to_string()],
                msg: "Input should be a valid dictionary or object".to_string(),
                kind: "model_attributes_type".to_string(),
            }],
        }
        .fail();
    };

    let mut errors = vec![];
    for (field, expected) in FIELDS {
        match (fields.get(field), required) {
            (None, true) => errors.push(FieldError::new(field, "Field required", "missing")),
            (None | Some(Value::Null), false) => {}
            (Some(value), _) => errors.extend(expected.check(field, value)),
        }
    }

    ensure!(errors.is_empty(), ValidationSnafu { errors });
    Ok(())
}

/// Unvalidated set of student fields, where `None` is a field that was explicitly nulled.
#[derive(Debug, Clone)]
pub struct StudentDraft {
    name: Option<String>,
    age: Option<i64>,
    gender: Option<String>,
    email: Option<String>,
}

impl From<StudentCreate> for StudentDraft {
    fn from(StudentCreate { name, age, gender, email }: StudentCreate) -> Self {
        Self {
            name: Some(name),
            age: Some(age),
            gender: Some(gender),
            email: Some(email),
        }
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            name: Some(student.name.clone()),
            age: Some(i64::from(student.age)),
            gender: Some(student.gender.clone()),
            email: Some(student.email.as_str().to_string()),
        }
    }
}

impl StudentDraft {
    /// Overwrites only the fields present in `update`.
    #[must_use]
    pub fn merge(self, update: StudentUpdate) -> Self {
        let StudentUpdate {
            name,
            age,
            gender,
            email,
        } = update;

        Self {
            name: name.unwrap_or(self.name),
            age: age.unwrap_or(self.age),
            gender: gender.unwrap_or(self.gender),
            email: email.unwrap_or(self.email),
        }
    }

    /// Checks every field, reporting all failures at once.
    pub fn into_student(self, id: i64) -> StudentsResult<Student> {
        let mut errors = vec![];

        let name = match self.name {
            None => {
                errors.push(FieldError::null("name"));
                None
            }
            Some(name) if name.is_empty() => {
                errors.push(FieldError::new(
                    "name",
                    "String should have at least 1 character",
                    "string_too_short",
                ));
                None
            }
            Some(name) => Some(name),
        };
        let age = match self.age {
            None => {
                errors.push(FieldError::null("age"));
                None
            }
            Some(age) if age <= 0 => {
                errors.push(FieldError::new(
                    "age",
                    "Input should be greater than 0",
                    "greater_than",
                ));
                None
            }
            Some(age) => match u32::try_from(age) {
                Ok(age) => Some(age),
                Err(_) => {
                    errors.push(FieldError::new(
                        "age",
                        format!("Input should be less than or equal to {}", u32::MAX),
                        "less_than_equal",
                    ));
                    None
                }
            },
        };

        let gender = if let Some(gender) = self.gender {
            Some(gender)
        } else {
            errors.push(FieldError::null("gender"));
            None
        };

        let email = match self.email.as_deref().map(parse_email) {
            None => {
                errors.push(FieldError::null("email"));
                None
            }
            Some(Err(msg)) => {
                errors.push(FieldError::new(
                    "email",
                    format!("value is not a valid email address: {msg}"),
                    "value_error",
                ));
                None
            }
            Some(Ok(email)) => Some(email),
        };

        match (name, age, gender, email) {
            (Some(name), Some(age), Some(gender), Some(email)) if errors.is_empty() => {
                Ok(Student {
                    id,
                    name,
                    age,
                    gender,
                    email,
                })
            }
            _ => ValidationSnafu { errors }.fail(),
        }
    }
}

///bare `local@domain.tld` only: no display names, no `[ip]` domains
fn parse_email(raw: &str) -> Result<EmailAddress, String> {
    let options = Options::default()
        .without_display_text()
        .without_domain_literal();
    let email = EmailAddress::parse_with_options(raw, options).map_err(|e| e.to_string())?;
    if email.domain().contains('.') {
        Ok(email)
    } else {
        Err("the domain must contain a period".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudentsError;
    use serde_json::json;

    fn ana() -> StudentCreate {
        StudentCreate {
            name: "Ana".to_string(),
            age: 20,
            gender: "F".to_string(),
            email: "a@b.com".to_string(),
        }
    }

    fn failing_fields(result: StudentsResult<Student>) -> Vec<String> {
        match result {
            Err(StudentsError::Validation { errors }) => {
                errors.into_iter().map(|e| e.loc[1].clone()).collect()
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn valid_draft_becomes_student() {
        let student = StudentDraft::from(ana()).into_student(7).unwrap();
        assert_eq!(student.id, 7);
        assert_eq!(student.name, "Ana");
        assert_eq!(student.age, 20);
        assert_eq!(student.gender, "F");
        assert_eq!(student.email.as_str(), "a@b.com");
    }

    #[test]
    fn non_positive_age_is_rejected() {
        for age in [0, -5] {
            let form = StudentCreate { age, ..ana() };
            assert_eq!(
                failing_fields(StudentDraft::from(form).into_student(1)),
                ["age"]
            );
        }
    }

    #[test]
    fn huge_age_is_rejected() {
        let form = StudentCreate {
            age: i64::from(u32::MAX) + 1,
            ..ana()
        };
        assert_eq!(
            failing_fields(StudentDraft::from(form).into_student(1)),
            ["age"]
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in [
            "not-an-email",
            "a@localhost",
            "@b.com",
            "a@",
            "Ana <a@b.com>",
            "a@[1.2.3.4]",
        ] {
            let form = StudentCreate {
                email: email.to_string(),
                ..ana()
            };
            assert_eq!(
                failing_fields(StudentDraft::from(form).into_student(1)),
                ["email"],
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let form = StudentCreate {
            name: String::new(),
            ..ana()
        };
        assert_eq!(
            failing_fields(StudentDraft::from(form).into_student(1)),
            ["name"]
        );

        let form = StudentCreate {
            name: " ".to_string(),
            ..ana()
        };
        assert_eq!(
            StudentDraft::from(form).into_student(1).unwrap().name,
            " "
        );
    }

    fn body_errors(result: StudentsResult<impl std::fmt::Debug>) -> Vec<(Vec<String>, String)> {
        match result {
            Err(StudentsError::Validation { errors }) => {
                errors.into_iter().map(|e| (e.loc, e.kind)).collect()
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    fn loc(field: &str) -> Vec<String> {
        vec!["body".to_string(), field.to_string()]
    }

    #[test]
    fn create_body_shape_errors_name_the_field() {
        let missing_age = json!({"name": "Ana", "gender": "F", "email": "a@b.com"});
        assert_eq!(
            body_errors(StudentCreate::from_json(missing_age)),
            [(loc("age"), "missing".to_string())]
        );

        let wrong_types = json!({"name": 5, "age": "old", "gender": null, "email": "a@b.com"});
        assert_eq!(
            body_errors(StudentCreate::from_json(wrong_types)),
            [
                (loc("name"), "string_type".to_string()),
                (loc("age"), "int_type".to_string()),
                (loc("gender"), "string_type".to_string()),
            ]
        );

        assert_eq!(
            body_errors(StudentCreate::from_json(json!({"name": "Ana", "age": 20.5, "gender": "F", "email": "a@b.com"}))),
            [(loc("age"), "int_type".to_string())]
        );

        assert_eq!(
            body_errors(StudentCreate::from_json(json!([1, 2]))),
            [(vec!["body".to_string()], "model_attributes_type".to_string())]
        );
    }

    #[test]
    fn update_body_allows_missing_and_null_but_checks_types() {
        let update = StudentUpdate::from_json(json!({"age": null, "id": 9})).unwrap();
        assert_eq!(update.age, Some(None));
        assert!(update.name.is_none());

        assert_eq!(
            body_errors(StudentUpdate::from_json(json!({"age": "21"}))),
            [(loc("age"), "int_type".to_string())]
        );
    }

    #[test]
    fn every_bad_field_is_reported() {
        let form = StudentCreate {
            name: String::new(),
            age: -1,
            gender: "M".to_string(),
            email: "nope".to_string(),
        };
        assert_eq!(
            failing_fields(StudentDraft::from(form).into_student(1)),
            ["name", "age", "email"]
        );
    }

    #[test]
    fn merge_only_touches_provided_fields() {
        let current = StudentDraft::from(ana()).into_student(1).unwrap();
        let update = StudentUpdate {
            age: Some(Some(21)),
            ..StudentUpdate::default()
        };

        let merged = StudentDraft::from(&current)
            .merge(update)
            .into_student(current.id)
            .unwrap();
        assert_eq!(merged, Student { age: 21, ..current });
    }

    #[test]
    fn explicit_null_fails_revalidation() {
        let current = StudentDraft::from(ana()).into_student(1).unwrap();
        let update: StudentUpdate = serde_json::from_str(r#"{"gender": null}"#).unwrap();
        assert_eq!(update.gender, Some(None));
        assert_eq!(update.name, None);

        assert_eq!(
            failing_fields(StudentDraft::from(&current).merge(update).into_student(1)),
            ["gender"]
        );
    }

    #[test]
    fn omitted_update_fields_deserialize_as_absent() {
        let update: StudentUpdate = serde_json::from_str(r#"{"email": "c@d.org"}"#).unwrap();
        assert_eq!(update.email, Some(Some("c@d.org".to_string())));
        assert!(update.name.is_none() && update.age.is_none() && update.gender.is_none());
    }
}
