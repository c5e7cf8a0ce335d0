#[cfg(test)]
mod tests {
    use crate::errors::Error;
    use crate::users::{normalize_email, AuthEvent, NewUser, Session};
    use chrono::{Duration, Utc};

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: password.to_string(),
            display_name: None,
        }
    }

    #[test]
    fn test_email_normalized() {
        let user = new_user("  Jane.Doe@Example.COM ", "password1").validated().unwrap();
        assert_eq!(user.email, "jane.doe@example.com");
    }

    #[test]
    fn test_bad_email_rejected() {
        for email in ["", "jane", "jane@", "jane@example", "ja ne@example.com"] {
            assert!(normalize_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn test_short_password_rejected() {
        let result = new_user("jane@example.com", "short").validated();
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(new_user("jane@example.com", "12345678").validated().is_ok());
    }

    #[test]
    fn test_display_name_trimmed_and_bounded() {
        let mut input = new_user("jane@example.com", "password1");
        input.display_name = Some("  Jane  ".to_string());
        assert_eq!(input.clone().validated().unwrap().display_name.as_deref(), Some("Jane"));

        input.display_name = Some("   ".to_string());
        assert_eq!(input.clone().validated().unwrap().display_name, None);

        input.display_name = Some("x".repeat(51));
        assert!(input.validated().is_err());
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session {
            id: "s1".to_string(),
            user_id: "u1".to_string(),
            expires_at: now + Duration::minutes(5),
        };
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::minutes(5)));
    }

    #[test]
    fn test_auth_event_shape() {
        let event = AuthEvent::SignedIn {
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "signed_in");
        assert_eq!(json["userId"], "u1");
        assert_eq!(event.user_id(), "u1");
        assert_eq!(event.name(), "signed_in");
    }
}
