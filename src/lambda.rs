#[cfg(feature = "lambda")]
use anyhow::Context;
#[cfg(feature = "lambda")]
use face_auth_helpers::utils::{logger, validation::*};
#[cfg(feature = "lambda")]
use face_auth_helpers::{
    connect, create_face_auth_log, get_or_create_participant, get_or_create_space,
    get_organization_app, HelperConfig, HelperError, NewFaceAuthLog, SsmParameterStore,
};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "lambda")]
#[derive(Debug, Deserialize)]
pub struct Request {
    pub organization_app_uuid: String,
    pub space_code: String,
    pub space_name: String,
    pub participant_code: String,
    pub participant_user_code: String,
    pub participant_name: String,
    pub authentication_code: String,
    pub is_authenticated: bool,
    #[serde(default)]
    pub reason: serde_json::Value,
    #[serde(default)]
    pub logs: serde_json::Value,
    pub threshold: f64,
}

#[cfg(feature = "lambda")]
impl Validate for Request {
    fn validate(&self) -> face_auth_helpers::Result<()> {
        validate_non_empty_string("organization_app_uuid", &self.organization_app_uuid)?;
        validate_non_empty_string("space_code", &self.space_code)?;
        validate_non_empty_string("participant_code", &self.participant_code)?;
        validate_non_empty_string("authentication_code", &self.authentication_code)?;
        validate_range("threshold", self.threshold, 0.0, 1.0)?;
        Ok(())
    }
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    pub face_auth_log_id: i64,
    pub space_id: i64,
    pub participant_id: i64,
    pub participant_uuid: String,
}

#[cfg(feature = "lambda")]
async fn record_attempt(request: Request) -> anyhow::Result<Response> {
    request.validate()?;

    let config = HelperConfig::from_env();
    config.validate()?;

    let store = SsmParameterStore::from_env(config.aws_region.as_deref()).await;
    let database_url = config
        .resolve_database_url(&store)
        .await
        .context("resolving database url")?;
    let mut conn = connect(&database_url).await.context("connecting to database")?;

    let app = get_organization_app(&mut conn, &request.organization_app_uuid)
        .await?
        .ok_or_else(|| HelperError::NotFound {
            entity: "organization app".to_string(),
            key: request.organization_app_uuid.clone(),
        })?;

    let space = get_or_create_space(
        &mut conn,
        app.organization_id,
        &request.space_code,
        &request.space_name,
    )
    .await?;
    let participant = get_or_create_participant(
        &mut conn,
        app.organization_id,
        &space,
        &request.participant_code,
        &request.participant_user_code,
        &request.participant_name,
    )
    .await?;

    let log = NewFaceAuthLog {
        authentication_code: request.authentication_code,
        organization_id: app.organization_id,
        space_id: space.id,
        participant_id: participant.id,
        is_authenticated: request.is_authenticated,
        reason: request.reason,
        logs: request.logs,
        threshold: request.threshold,
    };
    let face_auth_log_id = create_face_auth_log(&mut conn, &log).await?;

    Ok(Response {
        face_auth_log_id,
        space_id: space.id,
        participant_id: participant.id,
        participant_uuid: participant.uuid,
    })
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!(request_id = %event.context.request_id, "Recording face auth attempt");

    match record_attempt(event.payload).await {
        Ok(response) => {
            tracing::info!(log_id = response.face_auth_log_id, "Face auth attempt recorded");
            Ok(response)
        }
        Err(e) => {
            tracing::error!("Face auth attempt failed: {:#}", e);
            Err(e.into())
        }
    }
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    // JSON for CloudWatch, compact text everywhere else.
    if std::env::var_os("AWS_LAMBDA_FUNCTION_NAME").is_some() {
        logger::init_lambda_logger();
    } else {
        logger::init_local_logger(std::env::var_os("VERBOSE").is_some());
    }

    run(service_fn(function_handler)).await
}
