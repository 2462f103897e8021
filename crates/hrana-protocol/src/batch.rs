//! Batch messages.
//!
//! A batch is an ordered list of steps executed sequentially by the server.
//! Steps may carry a condition on the wire; this crate only produces
//! unconditional steps, so every step runs whatever the earlier steps did.

use std::collections::BTreeMap;

use crate::codec::{WireMessage, from_protos, required, to_protos};
use crate::error::ProtocolError;
use crate::proto;
use crate::stmt::{ServerError, Stmt, StmtResult};

/// One batch step.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStep {
    /// Statement to execute.
    pub stmt: Stmt,
}

impl WireMessage for BatchStep {
    type Proto = proto::BatchStep;

    fn to_proto(&self) -> proto::BatchStep {
        proto::BatchStep {
            stmt: Some(self.stmt.to_proto()),
        }
    }

    fn from_proto(proto: proto::BatchStep) -> Result<Self, ProtocolError> {
        Ok(Self {
            stmt: Stmt::from_proto(required(proto.stmt, "BatchStep.stmt")?)?,
        })
    }
}

/// An ordered sequence of steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    /// Steps in execution order.
    pub steps: Vec<BatchStep>,
}

impl Batch {
    /// Build a batch of unconditional steps that do not return rows.
    pub fn from_sql<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: statements
                .into_iter()
                .map(|sql| BatchStep {
                    stmt: Stmt::new(sql, false),
                })
                .collect(),
        }
    }
}

impl WireMessage for Batch {
    type Proto = proto::Batch;

    fn to_proto(&self) -> proto::Batch {
        proto::Batch {
            steps: to_protos(&self.steps),
        }
    }

    fn from_proto(proto: proto::Batch) -> Result<Self, ProtocolError> {
        Ok(Self {
            steps: from_protos(proto.steps)?,
        })
    }
}

/// Outcome of a batch.
///
/// Step indices absent from both maps did not execute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchResult {
    /// Results of steps that succeeded.
    pub step_results: BTreeMap<u32, StmtResult>,
    /// Errors of steps that failed.
    pub step_errors: BTreeMap<u32, ServerError>,
}

impl BatchResult {
    /// The failed step with the lowest index, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<(u32, &ServerError)> {
        self.step_errors.iter().next().map(|(step, err)| (*step, err))
    }
}

fn map_to_protos<T: WireMessage>(map: &BTreeMap<u32, T>) -> BTreeMap<u32, T::Proto> {
    map.iter().map(|(step, v)| (*step, v.to_proto())).collect()
}

fn map_from_protos<T: WireMessage>(
    map: BTreeMap<u32, T::Proto>,
) -> Result<BTreeMap<u32, T>, ProtocolError> {
    map.into_iter()
        .map(|(step, v)| Ok((step, T::from_proto(v)?)))
        .collect()
}

impl WireMessage for BatchResult {
    type Proto = proto::BatchResult;

    fn to_proto(&self) -> proto::BatchResult {
        proto::BatchResult {
            step_results: map_to_protos(&self.step_results),
            step_errors: map_to_protos(&self.step_errors),
        }
    }

    fn from_proto(proto: proto::BatchResult) -> Result<Self, ProtocolError> {
        Ok(Self {
            step_results: map_from_protos(proto.step_results)?,
            step_errors: map_from_protos(proto.step_errors)?,
        })
    }
}
