//! Transport DTOs for the directory listing JSON.
//!
//! Enumerated fields stay raw strings here so the mapping step can report
//! which table rejected which token.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct UsersResponseDto {
    pub(super) data: Vec<UserResourceDto>,
    #[serde(default)]
    pub(super) links: Option<DocumentLinksDto>,
    #[serde(default)]
    pub(super) meta: Option<MetaDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserResourceDto {
    #[serde(rename = "type")]
    pub(super) resource_type: String,
    pub(super) attributes: UserAttributesDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserAttributesDto {
    pub(super) username: String,
    #[serde(default)]
    pub(super) first_name: Option<String>,
    #[serde(default)]
    pub(super) last_name: Option<String>,
    pub(super) roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DocumentLinksDto {
    #[serde(default)]
    pub(super) next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MetaDto {
    #[serde(default)]
    pub(super) paging: Option<PagingDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PagingDto {
    #[serde(default)]
    pub(super) total: Option<u64>,
    #[serde(default)]
    pub(super) limit: Option<u64>,
}
