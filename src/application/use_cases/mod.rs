pub mod clone_projects;
pub mod pipeline_overview;
pub mod traverse_group;
