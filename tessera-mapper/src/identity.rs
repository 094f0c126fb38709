//! Subject identity resolution
//!
//! An instance's identifier is resolved in priority order: an
//! already-assigned key is reused; otherwise a non-null identity-source
//! field derives one (used directly when it already looks like an IRI,
//! hashed into the local namespace otherwise); otherwise a random
//! locally-namespaced IRI is minted. The result is assigned to the instance
//! exactly once.

use crate::{MapperError, Result};
use sha2::{Digest, Sha256};
use tessera_graph_ir::RdfKey;
use tessera_model::{Instance, Value};
use tessera_vocab::local;
use tracing::debug;

/// Resolve (minting and assigning if needed) the identifier of an instance
pub fn resolve_identity(instance: &Instance) -> Result<RdfKey> {
    if let Some(key) = instance.key() {
        return Ok(key);
    }

    let schema = instance.schema();
    let from_source = schema
        .identity_field()
        .and_then(|field| instance.get(&field.name))
        .and_then(|value| identity_from_value(&value));

    let key = match from_source {
        Some(key) => key,
        None => {
            let minted = format!("{}{}", local::ID, ulid::Ulid::new().to_string().to_lowercase());
            RdfKey::iri(minted)
        }
    };

    debug!(instance = %instance, key = %key, "assigned identifier");
    instance.assign_key(key.clone())?;
    Ok(key)
}

fn identity_from_value(value: &Value) -> Option<RdfKey> {
    match value {
        Value::Uri(uri) if !uri.is_empty() => Some(RdfKey::iri(uri)),
        Value::String(s) if !s.is_empty() => {
            if looks_like_iri(s) {
                Some(RdfKey::iri(s))
            } else {
                Some(RdfKey::iri(format!("{}{}", local::HASHED, hex(&Sha256::digest(s.as_bytes())))))
            }
        }
        _ => None,
    }
}

/// Heuristic for "already looks like an IRI"
fn looks_like_iri(s: &str) -> bool {
    s.contains("://") || s.starts_with("urn:") || s.starts_with("tag:")
}

/// Deterministic blank-node-free label material for RDF list nodes
///
/// Derived from the subject and predicate so that re-serializing an
/// unchanged entity yields the same triple set.
pub(crate) fn list_label(subject: &str, predicate: &str, index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(subject.as_bytes());
    hasher.update(b"\0");
    hasher.update(predicate.as_bytes());
    let digest = hex(&hasher.finalize());
    format!("l{}-{}", &digest[..16], index)
}

// Small inline hex encoder; not worth a crate dependency.
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Reject instances that cannot be mapped at all
pub(crate) fn validate_entity(instance: &Instance) -> Result<()> {
    let schema = instance.schema();
    if schema.class_iri.is_empty() {
        return Err(MapperError::invalid_entity(format!(
            "type {} declares no ontology class",
            schema.name
        )));
    }
    Ok(())
}
