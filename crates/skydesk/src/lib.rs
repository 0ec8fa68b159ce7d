pub mod agent;
pub mod airline;
pub mod driver;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod registry;
pub mod session;
pub mod validation;
