use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub specialty: Option<String>,
    pub license_number: Option<String>,
    pub years_of_experience: Option<i32>,
    pub session_fee: Option<f64>,
    pub status: TherapistStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
    Therapist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
            Role::Therapist => "therapist",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "customer" => Some(Role::Customer),
            "therapist" => Some(Role::Therapist),
            _ => None,
        }
    }
}

/// Account status. Only therapists ever leave `Active`: they start `Pending`
/// until an admin approves them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TherapistStatus {
    Active,
    Pending,
    Suspended,
    Inactive,
}

impl TherapistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TherapistStatus::Active => "active",
            TherapistStatus::Pending => "pending",
            TherapistStatus::Suspended => "suspended",
            TherapistStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => TherapistStatus::Pending,
            "suspended" => TherapistStatus::Suspended,
            "inactive" => TherapistStatus::Inactive,
            _ => TherapistStatus::Active,
        }
    }
}
