//! Value codec: native scalars ⇄ typed RDF literals and resources
//!
//! Outbound, [`to_rdf`] renders one field value as a term, honoring the
//! field's language tag and anyURI flag, unwrapping lazy references, passing
//! realized terms through, and resolving nested entities to their
//! identifiers. Inbound, [`from_literal`] dispatches on the declared
//! datatype IRI and delivers into the field's declared kind.
//!
//! Weak-typing mode (checked before everything else on the outbound path)
//! renders every scalar as a plain untyped string literal, for stores that
//! keep no datatypes; inbound it enables kind-directed parsing of plain
//! literals.

use crate::identity::resolve_identity;
use crate::{MapperError, MappingContext, Result};
use chrono::{DateTime, NaiveDate};
use tessera_graph_ir::{Datatype, Term};
use tessera_model::{FieldKind, FieldSchema, Value};
use tessera_vocab::xsd;

/// Inbound conversion failure, split by severity
///
/// `Mismatch` is the deliberately tolerated schema-drift case: the reader
/// logs it and skips the value. `Hard` aborts the whole read.
#[derive(Debug)]
pub(crate) enum ConvertError {
    /// Stored data no longer fits the current field declaration
    Mismatch(String),
    /// Unrecoverable conversion failure
    Hard(MapperError),
}

pub(crate) type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Render a scalar field value as an RDF term
pub(crate) fn to_rdf(ctx: &MappingContext, field: &FieldSchema, value: &Value) -> Result<Term> {
    match value {
        // Lazily-wrapped references are unwrapped before any other rule; a
        // still-deferred reference contributes its identifier without being
        // loaded.
        Value::Ref(reference) => match reference.cached() {
            Some(instance) => to_rdf(ctx, field, &Value::Entity(instance)),
            None => Ok(reference.key().as_term()),
        },

        // Already-realized RDF values pass through unchanged
        Value::Rdf(term) => Ok(term.clone()),

        // A value whose type carries an ontology-class mapping resolves to
        // its identifier, minting one if absent - never inlined
        Value::Entity(instance) => Ok(resolve_identity(instance)?.as_term()),

        Value::Many(_) => Err(MapperError::unsupported(format!(
            "nested container in field {}",
            field.name
        ))),

        scalar => {
            if ctx.options().weak_typing {
                return Ok(Term::string(weak_lexical(scalar, field)?));
            }
            typed_term(scalar, field)
        }
    }
}

fn typed_term(value: &Value, field: &FieldSchema) -> Result<Term> {
    Ok(match value {
        Value::Bool(b) => Term::boolean(*b),
        Value::Int(i) => Term::int(*i),
        Value::Long(l) => Term::long(*l),
        Value::Short(s) => Term::typed(s.to_string(), Datatype::xsd_short()),
        Value::Double(d) => Term::double(*d),
        Value::Float(f) => Term::typed(f.to_string(), Datatype::xsd_float()),
        Value::Char(c) => Term::string(c.to_string()),
        Value::String(s) => match &field.language {
            Some(lang) => Term::lang_string(s, lang.as_ref()),
            None => Term::string(s),
        },
        Value::Date(d) => Term::typed(d.format("%Y-%m-%d").to_string(), Datatype::xsd_date()),
        Value::DateTime(dt) => Term::typed(dt.to_rfc3339(), Datatype::xsd_date_time()),
        // A URI maps to an anyURI literal only when the field requests it;
        // otherwise it is a resource
        Value::Uri(uri) => {
            if field.any_uri_literal {
                Term::typed(uri, Datatype::xsd_any_uri())
            } else {
                Term::iri(uri)
            }
        }
        other => {
            return Err(MapperError::unsupported(format!(
                "cannot convert {} value in field {}",
                other.kind_label(),
                field.name
            )))
        }
    })
}

fn weak_lexical(value: &Value, field: &FieldSchema) -> Result<String> {
    Ok(match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Long(l) => l.to_string(),
        Value::Short(s) => s.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Char(c) => c.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::DateTime(dt) => dt.to_rfc3339(),
        Value::Uri(uri) => uri.clone(),
        other => {
            return Err(MapperError::unsupported(format!(
                "cannot convert {} value in field {}",
                other.kind_label(),
                field.name
            )))
        }
    })
}

/// Convert a literal term into the field's declared kind
///
/// Dispatches by the declared datatype IRI. An unrecognized datatype falls
/// back to the lexical string only when the field accepts strings.
pub(crate) fn from_literal(
    ctx: &MappingContext,
    field: &FieldSchema,
    lexical: &str,
    datatype: &Datatype,
    _language: Option<&str>,
) -> ConvertResult<Value> {
    let dt = datatype.as_iri();

    if xsd::is_integer_family(dt) {
        let parsed: i64 = lexical
            .parse()
            .map_err(|_| drift(field, dt, lexical, "not a valid integer"))?;
        return integer_into_kind(field, dt, parsed);
    }

    if xsd::is_float_family(dt) {
        let parsed: f64 = lexical
            .parse()
            .map_err(|_| drift(field, dt, lexical, "not a valid number"))?;
        return match field.kind {
            FieldKind::Double => Ok(Value::Double(parsed)),
            FieldKind::Float => Ok(Value::Float(parsed as f32)),
            _ => Err(kind_drift(field, dt)),
        };
    }

    match dt {
        xsd::BOOLEAN => {
            let parsed = match lexical {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(drift(field, dt, lexical, "not a valid boolean")),
            };
            match field.kind {
                FieldKind::Bool => Ok(Value::Bool(parsed)),
                _ => Err(kind_drift(field, dt)),
            }
        }
        xsd::DATE => match field.kind {
            FieldKind::Date => NaiveDate::parse_from_str(lexical, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| drift(field, dt, lexical, "not a valid date")),
            _ => Err(kind_drift(field, dt)),
        },
        xsd::DATE_TIME => match field.kind {
            FieldKind::DateTime => DateTime::parse_from_rfc3339(lexical)
                .map(Value::DateTime)
                .map_err(|_| drift(field, dt, lexical, "not a valid dateTime")),
            _ => Err(kind_drift(field, dt)),
        },
        _ if xsd::is_string_like(dt) || datatype.is_lang_string() => {
            string_into_kind(ctx, field, dt, lexical)
        }
        // Unrecognized datatype: lexical fallback only into string-accepting
        // fields
        _ => {
            if field.kind.accepts_string() {
                string_into_kind(ctx, field, dt, lexical)
            } else {
                Err(ConvertError::Hard(MapperError::UnknownDatatype {
                    datatype: dt.to_string(),
                    field: field.name.to_string(),
                }))
            }
        }
    }
}

fn integer_into_kind(field: &FieldSchema, dt: &str, parsed: i64) -> ConvertResult<Value> {
    let in_range = |bounds_dt: &str| -> bool {
        match xsd::integer_bounds(bounds_dt) {
            Some((min, max)) => parsed >= min && parsed <= max,
            None => true,
        }
    };
    match field.kind {
        FieldKind::Int if in_range(xsd::INT) => Ok(Value::Int(parsed as i32)),
        FieldKind::Long => Ok(Value::Long(parsed)),
        FieldKind::Short if in_range(xsd::SHORT) => Ok(Value::Short(parsed as i16)),
        FieldKind::Int | FieldKind::Short => Err(drift(
            field,
            dt,
            &parsed.to_string(),
            "out of range for the declared kind",
        )),
        _ => Err(kind_drift(field, dt)),
    }
}

/// Deliver a string-valued literal into the declared kind
///
/// Plain literals carry no type information: they deliver directly into
/// string-accepting kinds, and into other kinds only in weak-typing mode
/// (kind-directed parse). A plain literal for a non-string field outside
/// weak mode is an unknown-datatype failure.
fn string_into_kind(
    ctx: &MappingContext,
    field: &FieldSchema,
    dt: &str,
    lexical: &str,
) -> ConvertResult<Value> {
    match &field.kind {
        FieldKind::String => Ok(Value::String(lexical.to_string())),
        FieldKind::Uri => Ok(Value::Uri(lexical.to_string())),
        FieldKind::Char => {
            let mut chars = lexical.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(drift(field, dt, lexical, "not a single character")),
            }
        }
        kind if ctx.options().weak_typing => parse_weak(field, kind, dt, lexical),
        _ => Err(ConvertError::Hard(MapperError::UnknownDatatype {
            datatype: dt.to_string(),
            field: field.name.to_string(),
        })),
    }
}

fn parse_weak(
    field: &FieldSchema,
    kind: &FieldKind,
    dt: &str,
    lexical: &str,
) -> ConvertResult<Value> {
    let fail = || drift(field, dt, lexical, "weak-typed parse failed");
    match kind {
        FieldKind::Bool => match lexical {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(fail()),
        },
        FieldKind::Int => lexical.parse().map(Value::Int).map_err(|_| fail()),
        FieldKind::Long => lexical.parse().map(Value::Long).map_err(|_| fail()),
        FieldKind::Short => lexical.parse().map(Value::Short).map_err(|_| fail()),
        FieldKind::Double => lexical.parse().map(Value::Double).map_err(|_| fail()),
        FieldKind::Float => lexical.parse().map(Value::Float).map_err(|_| fail()),
        FieldKind::Date => NaiveDate::parse_from_str(lexical, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| fail()),
        FieldKind::DateTime => DateTime::parse_from_rfc3339(lexical)
            .map(Value::DateTime)
            .map_err(|_| fail()),
        _ => Err(fail()),
    }
}

fn drift(field: &FieldSchema, dt: &str, lexical: &str, why: &str) -> ConvertError {
    ConvertError::Mismatch(format!(
        "value \"{}\" ({}) for field {}: {}",
        lexical,
        xsd::local_name(dt),
        field.name,
        why
    ))
}

fn kind_drift(field: &FieldSchema, dt: &str) -> ConvertError {
    ConvertError::Mismatch(format!(
        "datatype {} does not fit field {} declared as {:?}",
        xsd::local_name(dt),
        field.name,
        field.kind
    ))
}
