pub mod accounts;
pub mod add_workflow;
pub mod preferences;
pub mod youtube;
