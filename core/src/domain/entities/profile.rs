//! User profile attributes relevant to delivery

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    /// E.164 number, only usable for delivery once verified
    pub phone_e164: Option<String>,
    pub phone_verified: bool,
    pub role: Role,
}

impl Profile {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id,
            email: None,
            phone_e164: None,
            phone_verified: false,
            role,
        }
    }

    /// Phone number usable as an SMS destination
    pub fn sms_destination(&self) -> Option<&str> {
        if self.phone_verified {
            self.phone_e164.as_deref().filter(|p| !p.is_empty())
        } else {
            None
        }
    }

    pub fn email_destination(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}
