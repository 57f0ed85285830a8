use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    /// Teacher account ("guru").
    #[serde(rename = "GURU")]
    #[strum(serialize = "GURU")]
    Teacher,
}

impl Role {
    pub fn id(self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::Teacher => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Teacher),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_ids_round_trip_through_claims() {
        assert_eq!(Role::from_id(Role::Admin.id()), Some(Role::Admin));
        assert_eq!(Role::from_id(Role::Teacher.id()), Some(Role::Teacher));
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn teacher_role_is_stored_as_guru() {
        assert_eq!(Role::Teacher.to_string(), "GURU");
        assert_eq!(Role::from_str("ADMIN").unwrap(), Role::Admin);
        assert!(Role::from_str("TEACHER").is_err());
    }
}
