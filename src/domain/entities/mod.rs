pub mod group;
pub mod pipeline;
pub mod project;

pub use group::Group;
pub use pipeline::{CiStatus, Job, Pipeline};
pub use project::Project;
