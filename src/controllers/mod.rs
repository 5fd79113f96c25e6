pub mod action;
pub mod deployment_controller;
pub mod executor;
pub mod metrics;
pub mod validator;

pub use action::{ActionRequest, ActionResponse};
pub use deployment_controller::DeploymentController;
pub use executor::ActionExecutor;
