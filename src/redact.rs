/// Credential redaction utilities for logging
///
/// Booking accounts belong to real club members; log lines keep enough
/// of a username to tell attempts apart without leaking the credential.

/// Redact a username, keeping the first character visible.
/// Example: "alexhicks" -> "a********"
pub fn username(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let hidden = chars.count();
            if hidden == 0 {
                "*".to_string()
            } else {
                format!("{}{}", first, "*".repeat(hidden))
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// redaction never panics
        #[test]
        fn username_never_panics(s in ".*") {
            let _ = username(&s);
        }

        /// output never contains more than one character of the input
        #[test]
        fn username_leaks_at_most_one_char(s in "[a-z]{2,30}") {
            let redacted = username(&s);
            let leaked: usize = redacted.chars().filter(|c| *c != '*').count();
            prop_assert!(leaked <= 1);
        }

        /// character count is preserved so logs stay distinguishable
        #[test]
        fn username_length_preserved(s in "[a-zA-Z0-9]{1,40}") {
            prop_assert_eq!(username(&s).chars().count(), s.chars().count());
        }
    }
}
