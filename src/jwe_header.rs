use serde::{Deserialize, Serialize};

/// Protected header parameters produced by key management.
///
/// Each strategy fills in only the fields the recipient needs to reverse
/// it; the encryption orchestrator merges this into the protected header
/// it assembles. On a name collision the strategy's value wins, since
/// these fields are algorithm-mandated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JWEHeaderParameters {
    /// Ephemeral public key (ECDH key agreement)
    #[serde(rename = "epk", default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_public_key: Option<serde_json::Value>,

    /// Agreement PartyUInfo (ECDH), base64url
    #[serde(rename = "apu", default, skip_serializing_if = "Option::is_none")]
    pub apu: Option<String>,

    /// Agreement PartyVInfo (ECDH), base64url
    #[serde(rename = "apv", default, skip_serializing_if = "Option::is_none")]
    pub apv: Option<String>,

    /// PBES2 salt input, base64url
    #[serde(rename = "p2s", default, skip_serializing_if = "Option::is_none")]
    pub p2s: Option<String>,

    /// PBES2 iteration count
    #[serde(rename = "p2c", default, skip_serializing_if = "Option::is_none")]
    pub p2c: Option<u32>,

    /// Initialization vector (AES-GCM key wrap), base64url
    #[serde(rename = "iv", default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,

    /// Authentication tag (AES-GCM key wrap), base64url
    #[serde(rename = "tag", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}
