#![forbid(unsafe_code)]

use std::fmt;

use crate::stream::{DecodeError, Readable, StreamInput, StreamOutput, Writeable};
use crate::{ContractViolation, Validate};

/// Identifier of the task that spawned a request on a given node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId {
    node_id: String,
    id: i64,
}

impl TaskId {
    pub fn new(node_id: impl Into<String>, id: i64) -> Result<Self, ContractViolation> {
        let node_id = node_id.into();
        if node_id.is_empty() {
            return Err(ContractViolation::InvalidValue {
                field: "task_id.node_id",
                reason: "must not be empty",
            });
        }
        if id < 0 {
            return Err(ContractViolation::InvalidValue {
                field: "task_id.id",
                reason: "must be >= 0",
            });
        }
        Ok(Self { node_id, id })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.id)
    }
}

/// Transport framing written ahead of every action request's own fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionEnvelope {
    pub parent_task: Option<TaskId>,
}

impl ActionEnvelope {
    pub fn with_parent(parent_task: TaskId) -> Self {
        Self {
            parent_task: Some(parent_task),
        }
    }
}

// An unset parent is an empty node id with no numeric id behind it.
impl Writeable for ActionEnvelope {
    fn write_to(&self, out: &mut StreamOutput) {
        match &self.parent_task {
            Some(task) => {
                out.write_string(&task.node_id);
                out.write_i64(task.id);
            }
            None => out.write_string(""),
        }
    }
}

impl Readable for ActionEnvelope {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError> {
        let node_id = input.read_string()?;
        if node_id.is_empty() {
            return Ok(Self::default());
        }
        let id = input.read_i64()?;
        Ok(Self {
            parent_task: Some(TaskId { node_id, id }),
        })
    }
}

/// Capabilities every request handed to the action-dispatch layer provides.
pub trait ActionRequest: Validate + Writeable + Readable {
    fn envelope(&self) -> &ActionEnvelope;

    fn envelope_mut(&mut self) -> &mut ActionEnvelope;

    fn encode(&self) -> Vec<u8> {
        let mut out = StreamOutput::new();
        self.write_to(&mut out);
        out.into_bytes()
    }
}
