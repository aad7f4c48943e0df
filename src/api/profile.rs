//! Account profile returned by the session-validation endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user's profile.
///
/// Missing fields decode to their empty defaults. A field of the wrong type is
/// a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub subscription: Subscription,
    /// RFC 3339 account creation time.
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Returns the best available name for display: full name, then username,
    /// then email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        if !self.username.is_empty() {
            return self.username.clone();
        }
        self.email.clone()
    }
}

/// Subscription entitlement attached to a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub active: bool,
    #[serde(rename = "type")]
    pub kind: String,
    /// RFC 3339 expiry time.
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_decodes_full_payload() {
        let json = r#"{
            "id": "u-1",
            "email": "reader@example.com",
            "first_name": "Ada",
            "last_name": "Reader",
            "username": "ada",
            "subscription": {
                "active": true,
                "type": "individual",
                "expires_at": "2027-01-01T00:00:00Z"
            },
            "created_at": "2020-05-17T10:30:00+02:00"
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, "u-1");
        assert!(profile.subscription.active);
        assert_eq!(profile.subscription.kind, "individual");
        assert_eq!(
            profile.subscription.expires_at.unwrap().to_rfc3339(),
            "2027-01-01T00:00:00+00:00"
        );
        assert_eq!(
            profile.created_at.unwrap().to_rfc3339(),
            "2020-05-17T08:30:00+00:00"
        );
    }

    #[test]
    fn test_profile_missing_fields_use_defaults() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, UserProfile::default());
        assert!(!profile.subscription.active);
    }

    #[test]
    fn test_profile_wrong_type_is_decode_error() {
        let result = serde_json::from_str::<UserProfile>(r#"{"subscription": {"active": "yes"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_invalid_timestamp_is_decode_error() {
        let result = serde_json::from_str::<UserProfile>(r#"{"created_at": "yesterday"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut profile = UserProfile {
            email: "reader@example.com".to_string(),
            ..UserProfile::default()
        };
        assert_eq!(profile.display_name(), "reader@example.com");

        profile.username = "ada".to_string();
        assert_eq!(profile.display_name(), "ada");

        profile.first_name = "Ada".to_string();
        assert_eq!(profile.display_name(), "Ada");

        profile.last_name = "Reader".to_string();
        assert_eq!(profile.display_name(), "Ada Reader");
    }
}
