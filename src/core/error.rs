use thiserror::Error;

use crate::core::types::{FacilityId, NodeId, SerfId, TaskId};

#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Serf not found: {0:?}")]
    SerfNotFound(SerfId),

    #[error("Facility not found: {0:?}")]
    FacilityNotFound(FacilityId),

    #[error("Task not found: {0:?}")]
    TaskNotFound(TaskId),

    #[error("Resource node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Recipe load error: {0}")]
    RecipeLoad(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HearthError>;
