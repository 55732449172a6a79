//! Directory user records and the email match over an accumulated set.

use super::role::Role;

/// One user decoded from a directory listing page.
///
/// ## Invariants
/// - Immutable once decoded; fields are only reachable through accessors.
/// - `roles` keeps the order the directory returned them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    user_name: String,
    first_name: String,
    last_name: String,
    roles: Vec<Role>,
}

impl UserRecord {
    /// Build a record from decoded attributes.
    ///
    /// # Examples
    /// ```
    /// use directory_lookup::domain::{Role, UserRecord};
    ///
    /// let user = UserRecord::new("a@x.com", "A", "X", vec![Role::Developer]);
    /// assert_eq!(user.user_name(), "a@x.com");
    /// assert_eq!(user.roles(), &[Role::Developer]);
    /// ```
    #[must_use]
    pub fn new(
        user_name: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        roles: Vec<Role>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            roles,
        }
    }

    /// Directory user name; the directory uses the email address here.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Given name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Assigned roles in directory order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Whether `email` names this user, ignoring case.
    #[must_use]
    pub fn matches_email(&self, email: &str) -> bool {
        eq_ignore_case(&self.user_name, email)
    }
}

/// Find the first user whose user name equals `email`, ignoring case.
///
/// Comparison lowercases both sides with Unicode's locale-independent
/// mapping and then requires exact equality; no trimming or partial matching
/// is applied. Duplicates are not collapsed: the first record in
/// accumulation order wins. `None` is the normal not-found outcome.
///
/// # Examples
/// ```
/// use directory_lookup::domain::{UserRecord, find_user_by_email};
///
/// let users = vec![UserRecord::new("jane.doe@example.com", "Jane", "Doe", vec![])];
/// let found = find_user_by_email(&users, "Jane.Doe@Example.com");
/// assert_eq!(found.map(UserRecord::first_name), Some("Jane"));
/// assert!(find_user_by_email(&users, "john@example.com").is_none());
/// ```
#[must_use]
pub fn find_user_by_email<'a>(users: &'a [UserRecord], email: &str) -> Option<&'a UserRecord> {
    users.iter().find(|user| user.matches_email(email))
}

fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    //! Matching semantics for [`find_user_by_email`].

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn users() -> Vec<UserRecord> {
        vec![
            UserRecord::new("a@x.com", "A", "X", vec![Role::Developer]),
            UserRecord::new("jane.doe@example.com", "Jane", "Doe", vec![Role::Admin]),
            UserRecord::new("JANE.DOE@example.com", "Second", "Jane", vec![Role::Sales]),
        ]
    }

    #[rstest]
    #[case("jane.doe@example.com")]
    #[case("Jane.Doe@Example.com")]
    #[case("JANE.DOE@EXAMPLE.COM")]
    fn matches_ignoring_case(users: Vec<UserRecord>, #[case] email: &str) {
        let found = find_user_by_email(&users, email).expect("user should match");
        assert_eq!(found.first_name(), "Jane");
        assert_eq!(found.roles(), &[Role::Admin]);
    }

    #[rstest]
    fn first_duplicate_in_order_wins(users: Vec<UserRecord>) {
        let found = find_user_by_email(&users, "jane.DOE@example.com").expect("user should match");
        assert_eq!(found.last_name(), "Doe");
    }

    #[rstest]
    #[case("jane.doe@example.co")]
    #[case(" jane.doe@example.com")]
    #[case("jane")]
    #[case("")]
    fn near_misses_are_not_found(users: Vec<UserRecord>, #[case] email: &str) {
        assert!(find_user_by_email(&users, email).is_none());
    }

    #[test]
    fn empty_set_is_not_found() {
        assert!(find_user_by_email(&[], "a@x.com").is_none());
    }

    #[test]
    fn non_ascii_letters_fold_without_locale_rules() {
        let users = vec![UserRecord::new("ÉLODIE@example.com", "Élodie", "M", vec![])];
        assert!(find_user_by_email(&users, "élodie@EXAMPLE.com").is_some());
    }
}
