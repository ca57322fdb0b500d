//! Persisting whole plans.
//!
//! Plans have two encodings. The binary form is a single packed protobuf
//! `PlanEnvelope`, the document form is JSON with named properties. Both
//! carry a format version and both reconstruct scans the same way, either
//! from the function's encoded bind state, or by binding the function again.

use scanplan_error::{DbError, ErrorKind, OptionExt, Result};
use scanplan_proto::messages::logical::PlanEnvelope;
use scanplan_proto::packed::{PackedDecoder, PackedEncoder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::database::DatabaseContext;
use crate::logical::document::OperatorDocument;
use crate::logical::operator::{LogicalNode, LogicalOperator};
use crate::proto::DatabaseProtoConv;

/// Current version of the persisted plan formats.
pub const PLAN_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub version: u32,
    pub plan: OperatorDocument,
}

fn check_version(version: u32) -> Result<()> {
    if version == 0 || version > PLAN_FORMAT_VERSION {
        return Err(DbError::serialization("Unsupported plan format version")
            .with_field("version", version)
            .with_field("supported", PLAN_FORMAT_VERSION));
    }
    Ok(())
}

/// Serialize a plan to bytes.
///
/// If `verify_plan_serialization` is enabled, the bytes are decoded again and
/// the resulting output types are checked against the original plan.
pub fn serialize_plan(plan: &LogicalOperator, context: &DatabaseContext) -> Result<Vec<u8>> {
    let envelope = PlanEnvelope {
        version: PLAN_FORMAT_VERSION,
        root: Some(plan.to_proto_ctx(context)?),
    };

    let mut buf = Vec::new();
    PackedEncoder::new(&mut buf).encode_next(&envelope)?;
    debug!(len = buf.len(), "serialized plan");

    if context.config().verify_plan_serialization {
        verify_roundtrip(plan, &buf, context)?;
    }

    Ok(buf)
}

/// Deserialize a plan from bytes.
pub fn deserialize_plan(buf: &[u8], context: &DatabaseContext) -> Result<LogicalOperator> {
    let mut decoder = PackedDecoder::new(buf);
    let envelope: PlanEnvelope = decoder.decode_next()?;
    if !decoder.is_exhausted() {
        return Err(DbError::serialization("Trailing bytes after plan"));
    }
    check_version(envelope.version)?;

    let root = envelope.root.required("plan root")?;
    LogicalOperator::from_proto_ctx(root, context)
}

pub fn plan_to_document(plan: &LogicalOperator) -> Result<PlanDocument> {
    Ok(PlanDocument {
        version: PLAN_FORMAT_VERSION,
        plan: plan.to_document()?,
    })
}

pub fn plan_from_document(doc: PlanDocument, context: &DatabaseContext) -> Result<LogicalOperator> {
    check_version(doc.version)?;
    LogicalOperator::from_document(doc.plan, context)
}

/// Serialize a plan to a JSON string.
pub fn plan_to_json(plan: &LogicalOperator) -> Result<String> {
    Ok(serde_json::to_string(&plan_to_document(plan)?)?)
}

pub fn plan_from_json(json: &str, context: &DatabaseContext) -> Result<LogicalOperator> {
    let doc: PlanDocument = serde_json::from_str(json)?;
    plan_from_document(doc, context)
}

fn verify_roundtrip(plan: &LogicalOperator, buf: &[u8], context: &DatabaseContext) -> Result<()> {
    let mut original = plan.clone();
    original.resolve_operator_types()?;

    let mut decoded = deserialize_plan(buf, context)
        .map_err(|e| e.with_kind(ErrorKind::Internal))?;
    decoded.resolve_operator_types()?;

    if original.types() != decoded.types() {
        return Err(DbError::internal("Decoded plan has different output types")
            .with_field("original", format!("{:?}", original.types()))
            .with_field("decoded", format!("{:?}", decoded.types())));
    }

    Ok(())
}
