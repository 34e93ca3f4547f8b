use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::ValidationErrors;
use crate::record::Record;
use crate::schema::{ObjectParser, Schema};

pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Proof object produced by the external proving SDK. Carried through
/// untouched; only its envelope is checked.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBlob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_inputs: Option<Map<String, Value>>,
    pub is_local: bool,
    pub blueprint_slug: String,
}

impl Schema for ProofBlob {
    fn parse_at(value: &Value, path: &str) -> Result<Self, ValidationErrors> {
        let mut p = ObjectParser::new(value, path)?;
        let proof_data = p.any("proofData");
        let public_data = p.optional_map("publicData");
        let external_inputs = p.optional_map("externalInputs");
        let is_local = p.boolean("isLocal");
        let blueprint_slug = p.non_empty("blueprintSlug");
        match (public_data, external_inputs, is_local, blueprint_slug) {
            (Some(public_data), Some(external_inputs), Some(is_local), Some(blueprint_slug)) if p.is_clean() => {
                Ok(ProofBlob { proof_data, public_data, external_inputs, is_local, blueprint_slug })
            }
            _ => Err(p.into_errors()),
        }
    }
}

/// A published claim.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leak {
    pub id: Uuid,
    pub description: String,
    pub proof: ProofBlob,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub created_at: DateTime<Utc>,
}

impl Schema for Leak {
    fn parse_at(value: &Value, path: &str) -> Result<Self, ValidationErrors> {
        let mut p = ObjectParser::new(value, path)?;
        let id = p.uuid("id");
        let description = p.text("description", 1, Some(DESCRIPTION_MAX_CHARS));
        let proof = p.nested::<ProofBlob>("proof");
        let created_at = p.timestamp("createdAt");
        match (id, description, proof, created_at) {
            (Some(id), Some(description), Some(proof), Some(created_at)) if p.is_clean() => {
                Ok(Leak { id, description, proof, created_at })
            }
            _ => Err(p.into_errors()),
        }
    }
}

impl Record for Leak {
    const COLLECTION: &'static str = "leaks";

    fn id(&self) -> Uuid { self.id }
    fn created_at(&self) -> DateTime<Utc> { self.created_at }
}

/// Publication body: the leak without server-assigned fields. The
/// description is trimmed but not length-capped here; clipping to
/// [`DESCRIPTION_MAX_CHARS`] happens at publication.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishLeak {
    pub description: String,
    pub proof: ProofBlob,
}

impl Schema for PublishLeak {
    fn parse_at(value: &Value, path: &str) -> Result<Self, ValidationErrors> {
        let mut p = ObjectParser::new(value, path)?;
        let description = p.trimmed("description", 1, None);
        let proof = p.nested::<ProofBlob>("proof");
        match (description, proof) {
            (Some(description), Some(proof)) if p.is_clean() => Ok(PublishLeak { description, proof }),
            _ => Err(p.into_errors()),
        }
    }
}

impl PublishLeak {
    /// Description clipped to the first [`DESCRIPTION_MAX_CHARS`] characters.
    pub fn clipped_description(&self) -> String {
        self.description.chars().take(DESCRIPTION_MAX_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proof() -> Value {
        json!({
            "proofData": {"pi_a": ["1", "2"], "protocol": "groth16"},
            "publicData": {"from": "hr@corp.example"},
            "isLocal": false,
            "blueprintSlug": "zkemail/corp-offer@v1"
        })
    }

    fn leak_json() -> Value {
        json!({
            "id": "2c5ea4c0-4067-11e9-8bad-9b1deb4d3b7d",
            "description": "Offer letter from Corp",
            "proof": proof(),
            "createdAt": "2025-05-01T12:00:00.000Z"
        })
    }

    #[test]
    fn parses_and_serializes_in_camel_case() {
        let leak = Leak::parse(&leak_json()).unwrap();
        assert_eq!(leak.proof.blueprint_slug, "zkemail/corp-offer@v1");
        assert!(leak.proof.external_inputs.is_none());
        let out = serde_json::to_value(&leak).unwrap();
        assert_eq!(out["createdAt"], "2025-05-01T12:00:00.000Z");
        assert_eq!(out["proof"]["isLocal"], false);
        assert_eq!(out["proof"]["proofData"]["protocol"], "groth16");
        assert!(out["proof"].get("externalInputs").is_none());
        assert_eq!(Leak::parse(&out).unwrap(), leak);
    }

    #[test]
    fn proof_envelope_is_enforced() {
        let mut missing_slug = proof();
        missing_slug.as_object_mut().unwrap().remove("blueprintSlug");
        let err = ProofBlob::parse_at(&missing_slug, "proof").err().unwrap();
        assert_eq!(err.issues[0].path, "proof.blueprintSlug");
        assert_eq!(err.issues[0].message, "Required");

        let mut bad_local = proof();
        bad_local["isLocal"] = json!("yes");
        assert!(ProofBlob::parse(&bad_local).is_err());

        let mut empty_slug = proof();
        empty_slug["blueprintSlug"] = json!("");
        assert!(ProofBlob::parse(&empty_slug).is_err());

        let mut bad_public = proof();
        bad_public["publicData"] = json!([1, 2]);
        assert!(ProofBlob::parse(&bad_public).is_err());
    }

    #[test]
    fn proof_data_is_opaque() {
        let mut p = proof();
        p["proofData"] = json!("anything at all");
        assert_eq!(ProofBlob::parse(&p).unwrap().proof_data, Some(json!("anything at all")));
        p.as_object_mut().unwrap().remove("proofData");
        assert_eq!(ProofBlob::parse(&p).unwrap().proof_data, None);
    }

    #[test]
    fn stored_leak_rejects_bad_identity_fields() {
        let mut v = leak_json();
        v["id"] = json!("not-a-uuid");
        v["createdAt"] = json!("May 1st");
        let err = Leak::parse(&v).err().unwrap();
        assert_eq!(err.fields(), vec!["id", "createdAt"]);

        let mut long = leak_json();
        long["description"] = json!("x".repeat(501));
        assert!(Leak::parse(&long).is_err());

        let mut offset = leak_json();
        offset["createdAt"] = json!("2025-05-01T14:00:00.000+02:00");
        assert_eq!(Leak::parse(&offset).err().unwrap().fields(), vec!["createdAt"]);
    }

    #[test]
    fn publish_body_trims_and_allows_long_descriptions() {
        let body = json!({"description": format!("  {}  ", "a".repeat(700)), "proof": proof()});
        let parsed = PublishLeak::parse(&body).unwrap();
        assert_eq!(parsed.description.chars().count(), 700);
        assert_eq!(parsed.clipped_description().chars().count(), 500);

        let blank = json!({"description": "   ", "proof": proof()});
        let err = PublishLeak::parse(&blank).err().unwrap();
        assert_eq!(err.fields(), vec!["description"]);
    }

    #[test]
    fn clipping_counts_characters_not_bytes() {
        let body = json!({"description": "é".repeat(600), "proof": proof()});
        let clipped = PublishLeak::parse(&body).unwrap().clipped_description();
        assert_eq!(clipped.chars().count(), 500);
        assert_eq!(clipped.len(), 1000);
    }
}
