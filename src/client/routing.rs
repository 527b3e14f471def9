/// Post-login navigation targets, keyed by the profile's role field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    AdminHome,
    CustomerHome,
    TherapistHome,
}

/// Unknown or missing roles fall through to the therapist screen. That
/// fallback is inherited behavior, not a deliberate choice; the warning
/// makes it visible when it happens.
pub fn destination_for_role(role: Option<&str>) -> Destination {
    match role {
        Some("admin") => Destination::AdminHome,
        Some("customer") => Destination::CustomerHome,
        Some("therapist") => Destination::TherapistHome,
        other => {
            tracing::warn!("unrecognized role {other:?}, routing to therapist screen");
            Destination::TherapistHome
        }
    }
}
