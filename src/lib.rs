pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{database::connect, ssm::SsmParameterStore, HelperConfig};
pub use crate::core::parameters::{get_optional_parameter, get_parameter};
pub use crate::core::records::{
    create_face_auth_log, get_or_create_participant, get_or_create_space, get_organization_app,
};
pub use domain::model::{NewFaceAuthLog, OrganizationApp, Participant, Space};
pub use domain::ports::ParameterStore;
pub use utils::error::{HelperError, Result};
