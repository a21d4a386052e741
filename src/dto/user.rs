use crate::domain;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for a user returned on the API. Password material never leaves the
/// persistence layer.
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug, PartialEq))]
pub struct UserData {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "jdoe@example.com")]
    pub email: String,
}

impl From<domain::user::TrackerUser> for UserData {
    fn from(value: domain::user::TrackerUser) -> Self {
        UserData {
            id: value.id,
            name: value.name,
            email: value.email,
        }
    }
}

/// DTO for signing up a user via the API. The Display impl deliberately
/// leaves the password out so the type is safe to log.
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{name} <{email}>")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

impl From<NewUser> for domain::user::CreateUser {
    fn from(value: NewUser) -> Self {
        domain::user::CreateUser {
            name: value.name,
            email: value.email,
            password: value.password,
        }
    }
}

/// DTO containing the ID of a user that was created via the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, Debug))]
pub struct InsertedUser {
    #[schema(example = 10)]
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_signup_data_gets_rejected() {
        let bad_user = NewUser {
            name: String::new(),
            email: "not-an-email".to_owned(),
            password: "short".to_owned(),
        };

        let validation_result = bad_user.validate();
        assert!(validation_result.is_err());
        let field_validations = validation_result.unwrap_err();
        assert!(field_validations.field_errors().contains_key("name"));
        assert!(field_validations.field_errors().contains_key("email"));
        assert!(field_validations.field_errors().contains_key("password"));
    }

    #[test]
    fn display_never_reveals_the_password() {
        let user = NewUser {
            name: "John Doe".to_owned(),
            email: "jdoe@example.com".to_owned(),
            password: "hunter2hunter2".to_owned(),
        };

        let rendered = format!("{user}");
        assert_eq!("John Doe <jdoe@example.com>", rendered);
    }
}
