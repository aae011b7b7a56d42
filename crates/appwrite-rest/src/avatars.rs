//! Placeholder avatar generation.

/// Build a generated placeholder avatar URL keyed by a display name.
///
/// Used when a new user has no avatar from their OAuth provider profile.
pub fn initials_avatar_url(name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("https://ui-avatars.com/api/?name={}&background=random", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_simple_name() {
        assert_eq!(
            initials_avatar_url("Jane"),
            "https://ui-avatars.com/api/?name=Jane&background=random"
        );
    }

    #[test]
    fn encodes_spaces_and_specials() {
        let url = initials_avatar_url("Jane Doe & Co");
        assert!(url.starts_with("https://ui-avatars.com/api/?name="));
        assert!(!url.contains(' '));
        assert!(!url.contains('&') || url.contains("&background=random"));
        assert!(url.ends_with("&background=random"));
    }
}
