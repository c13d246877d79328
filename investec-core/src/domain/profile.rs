//! Profile and authorisation setup models

use serde::{Deserialize, Serialize};

use super::de;

/// A banking profile (personal or business) the client can act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "de::id")]
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: String,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub default_profile: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorisationPeriod {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authoriser {
    #[serde(deserialize_with = "de::id")]
    pub authoriser_id: String,
    #[serde(default)]
    pub name: String,
}

/// Who must approve payments from an account, and within which period
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorisationSetup {
    #[serde(default, deserialize_with = "de::id_or_empty")]
    pub number_of_authorisation_required: String,
    #[serde(default)]
    pub period: Vec<AuthorisationPeriod>,
    #[serde(default, rename = "authorisersListA")]
    pub authorisers_list_a: Vec<Authoriser>,
    #[serde(default, rename = "authorisersListB")]
    pub authorisers_list_b: Vec<Authoriser>,
}
