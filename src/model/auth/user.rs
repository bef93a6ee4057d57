use std::fmt::Display;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::model::student::Student;

/// Something that can hold an [`AuthToken`](super::AuthToken).
pub trait User {
    /// The rights every token for this user type carries.
    const RIGHTS: Rights;

    /// The identifier stored in the token.
    fn id(&self) -> String;
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    Student = 0,
    Admin = 1,
}

impl Display for Rights {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Student => "student",
                Self::Admin => "admin",
            }
        )
    }
}

impl User for Student {
    const RIGHTS: Rights = Rights::Student;

    fn id(&self) -> String {
        self.admission.clone()
    }
}
