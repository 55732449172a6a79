//! Decoder for one page of the directory user listing.
//!
//! The body is first read into transport DTOs, then mapped into domain
//! records in one pass. Mapping is fail-fast: the first unknown role or
//! record type rejects the whole page, so a partially decoded page never
//! reaches the accumulator.

mod dto;

use thiserror::Error;
use url::Url;

use self::dto::{UserResourceDto, UsersResponseDto};
use super::page::DirectoryPage;
use super::role::{RecordType, Role, UnknownEnumValue};
use super::user::UserRecord;

/// Reasons a page body is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageDecodeError {
    /// Body is not JSON or lacks required fields.
    #[error("malformed listing page: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
    },
    /// A role or record type token is outside its closed set.
    #[error(transparent)]
    UnknownEnumValue(#[from] UnknownEnumValue),
    /// `links.next` is non-empty but not an absolute URL.
    #[error("next-page cursor is not an absolute URL: '{value}'")]
    InvalidCursor {
        /// Raw cursor value.
        value: String,
    },
}

/// Decode one listing page.
///
/// # Errors
///
/// Returns [`PageDecodeError`] for malformed JSON, missing required fields,
/// unknown enumeration tokens, or a non-URL cursor.
///
/// # Examples
/// ```
/// use directory_lookup::domain::{Role, decode_page};
///
/// let body = br#"{
///     "data": [{
///         "type": "users",
///         "attributes": {"username": "a@x.com", "firstName": "A", "lastName": "X", "roles": ["DEVELOPER"]}
///     }],
///     "links": {"next": null}
/// }"#;
/// let page = decode_page(body).unwrap();
/// assert_eq!(page.records[0].roles(), &[Role::Developer]);
/// assert!(page.next_cursor.is_none());
/// ```
pub fn decode_page(body: &[u8]) -> Result<DirectoryPage, PageDecodeError> {
    let decoded: UsersResponseDto =
        serde_json::from_slice(body).map_err(|error| PageDecodeError::Malformed {
            message: error.to_string(),
        })?;

    let records = decoded
        .data
        .into_iter()
        .map(into_user_record)
        .collect::<Result<Vec<_>, _>>()?;

    let next_cursor = decoded
        .links
        .and_then(|links| links.next)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_cursor(&raw))
        .transpose()?;

    let paging = decoded.meta.and_then(|meta| meta.paging);
    Ok(DirectoryPage {
        records,
        next_cursor,
        total_count: paging.as_ref().and_then(|paging| paging.total),
        page_limit: paging.as_ref().and_then(|paging| paging.limit),
    })
}

fn into_user_record(resource: UserResourceDto) -> Result<UserRecord, PageDecodeError> {
    RecordType::from_wire(&resource.resource_type)?;

    let attributes = resource.attributes;
    let roles = attributes
        .roles
        .iter()
        .map(String::as_str)
        .map(Role::from_wire)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UserRecord::new(
        attributes.username,
        attributes.first_name.unwrap_or_default(),
        attributes.last_name.unwrap_or_default(),
        roles,
    ))
}

fn parse_cursor(raw: &str) -> Result<Url, PageDecodeError> {
    Url::parse(raw).map_err(|_| PageDecodeError::InvalidCursor {
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    //! Decoding coverage over realistic listing bodies.

    use rstest::rstest;

    use super::*;
    use crate::domain::role::EnumKind;

    const FULL_PAGE: &str = r#"{
        "data": [
            {
                "type": "users",
                "id": "24e811a2-2ad0-46e4-b632-61fec324ebed",
                "attributes": {
                    "username": "a@x.com",
                    "firstName": "A",
                    "lastName": "X",
                    "roles": ["DEVELOPER"],
                    "allAppsVisible": true,
                    "provisioningAllowed": false
                },
                "relationships": {
                    "visibleApps": {
                        "links": {
                            "self": "https://directory.test/v1/users/24e8/relationships/visibleApps",
                            "related": "https://directory.test/v1/users/24e8/visibleApps"
                        }
                    }
                },
                "links": { "self": "https://directory.test/v1/users/24e8" }
            },
            {
                "type": "users",
                "id": "5a2e5b9c-0000-4000-8000-000000000002",
                "attributes": {
                    "username": "b@x.com",
                    "firstName": "B",
                    "lastName": "Y",
                    "roles": ["ADMIN", "FINANCE"]
                }
            }
        ],
        "links": {
            "self": "https://directory.test/v1/users?limit=2",
            "next": "https://directory.test/v1/users?cursor=Ag.Bx&limit=2"
        },
        "meta": { "paging": { "total": 5, "limit": 2 } }
    }"#;

    fn page_with_user(resource_type: &str, roles: &str) -> String {
        format!(
            r#"{{"data":[{{"type":"{resource_type}","attributes":{{"username":"u@x.com","firstName":"U","lastName":"X","roles":{roles}}}}}],"links":{{"next":null}}}}"#
        )
    }

    #[test]
    fn decodes_records_cursor_and_paging() {
        let page = decode_page(FULL_PAGE.as_bytes()).expect("page decodes");

        assert_eq!(
            page.records,
            vec![
                UserRecord::new("a@x.com", "A", "X", vec![Role::Developer]),
                UserRecord::new("b@x.com", "B", "Y", vec![Role::Admin, Role::Finance]),
            ]
        );
        assert_eq!(
            page.next_cursor.as_ref().map(Url::as_str),
            Some("https://directory.test/v1/users?cursor=Ag.Bx&limit=2")
        );
        assert_eq!(page.total_count, Some(5));
        assert_eq!(page.page_limit, Some(2));
        assert!(page.has_next());
    }

    #[rstest]
    #[case::null_next(r#"{"data":[],"links":{"self":"https://directory.test/v1/users","next":null}}"#)]
    #[case::absent_next(r#"{"data":[],"links":{"self":"https://directory.test/v1/users"}}"#)]
    #[case::absent_links(r#"{"data":[]}"#)]
    #[case::empty_next(
        r#"{"data":[{"type":"users","attributes":{"username":"a@x.com","roles":["ADMIN"]}}],"links":{"next":""}}"#
    )]
    fn missing_cursor_ends_the_listing(#[case] body: &str) {
        let page = decode_page(body.as_bytes()).expect("page decodes");
        assert!(page.records.iter().all(|user| user.roles() == [Role::Admin]));
        assert!(page.next_cursor.is_none());
        assert!(!page.has_next());
        assert!(page.total_count.is_none());
    }

    #[test]
    fn unknown_role_rejects_the_whole_page() {
        let body = page_with_user("users", r#"["ADMIN", "SUPER_USER"]"#);
        let err = decode_page(body.as_bytes()).expect_err("unknown role must fail");
        assert_eq!(
            err,
            PageDecodeError::UnknownEnumValue(UnknownEnumValue::new(EnumKind::Role, "SUPER_USER"))
        );
    }

    #[test]
    fn unknown_record_type_is_rejected() {
        let body = page_with_user("apps", r#"["ADMIN"]"#);
        let err = decode_page(body.as_bytes()).expect_err("unknown type must fail");
        assert_eq!(
            err,
            PageDecodeError::UnknownEnumValue(UnknownEnumValue::new(
                EnumKind::RecordType,
                "apps"
            ))
        );
    }

    #[test]
    fn non_string_role_is_malformed() {
        let body = page_with_user("users", "[1]");
        let err = decode_page(body.as_bytes()).expect_err("numeric role must fail");
        assert!(matches!(err, PageDecodeError::Malformed { .. }));
    }

    #[rstest]
    #[case::not_json("<html>busy</html>")]
    #[case::missing_data(r#"{"links":{"next":null}}"#)]
    #[case::missing_username(r#"{"data":[{"type":"users","attributes":{"firstName":"A"}}]}"#)]
    #[case::missing_type(r#"{"data":[{"attributes":{"username":"a@x.com"}}]}"#)]
    fn structural_problems_are_malformed(#[case] body: &str) {
        let err = decode_page(body.as_bytes()).expect_err("body must fail");
        assert!(
            matches!(err, PageDecodeError::Malformed { .. }),
            "expected Malformed, got {err:?}"
        );
    }

    #[test]
    fn relative_cursor_is_rejected() {
        let body = r#"{"data":[],"links":{"next":"/v1/users?cursor=2"}}"#;
        let err = decode_page(body.as_bytes()).expect_err("relative cursor must fail");
        assert_eq!(
            err,
            PageDecodeError::InvalidCursor {
                value: "/v1/users?cursor=2".to_owned(),
            }
        );
    }

    #[test]
    fn absent_names_default_to_empty() {
        let body = r#"{"data":[{"type":"users","attributes":{"username":"solo@x.com","roles":[]}}]}"#;
        let page = decode_page(body.as_bytes()).expect("page decodes");
        assert_eq!(page.records, vec![UserRecord::new("solo@x.com", "", "", vec![])]);
    }

    #[rstest]
    #[case::absent_roles(r#"{"data":[{"type":"users","attributes":{"username":"a@x.com"}}]}"#)]
    #[case::null_roles(
        r#"{"data":[{"type":"users","attributes":{"username":"a@x.com","roles":null}}]}"#
    )]
    fn roles_must_be_present(#[case] body: &str) {
        let err = decode_page(body.as_bytes()).expect_err("roles are required");
        assert!(
            matches!(err, PageDecodeError::Malformed { .. }),
            "expected Malformed, got {err:?}"
        );
    }
}
