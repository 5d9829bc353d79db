use crate::app::error::ApiError;
use crate::app::services::{
    ExampleInput, ExamplePatch, ExampleService, IssueOtpInput, OtpService, VerifyOtpInput,
};
use crate::core::request::{GenericRequest, GenericResponse};
use crate::domain::model::OtpView;
use chrono::Utc;
use http::StatusCode;
use serde::Serialize;

fn respond<T: Serialize>(status: StatusCode, result: Result<T, ApiError>) -> GenericResponse {
    match result {
        Ok(value) => GenericResponse::json(status, &value),
        Err(err) => err.into(),
    }
}

pub struct HealthHandler {
    environment: String,
}

impl HealthHandler {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }

    pub fn check(&self) -> GenericResponse {
        GenericResponse::json(
            StatusCode::OK,
            &serde_json::json!({ "status": "ok", "environment": self.environment }),
        )
    }
}

pub struct ExampleHandler {
    service: ExampleService,
}

impl ExampleHandler {
    pub fn new(service: ExampleService) -> Self {
        Self { service }
    }

    pub fn list(&self) -> GenericResponse {
        GenericResponse::json(StatusCode::OK, &self.service.list())
    }

    pub fn get(&self, id: &str) -> GenericResponse {
        respond(StatusCode::OK, self.service.get(id))
    }

    pub fn create(&self, request: &GenericRequest) -> GenericResponse {
        let result = request
            .json::<ExampleInput>()
            .map_err(ApiError::from)
            .and_then(|input| self.service.create(input, Utc::now()));
        respond(StatusCode::CREATED, result)
    }

    pub fn replace(&self, id: &str, request: &GenericRequest) -> GenericResponse {
        let result = request
            .json::<ExampleInput>()
            .map_err(ApiError::from)
            .and_then(|input| self.service.replace(id, input, Utc::now()));
        respond(StatusCode::OK, result)
    }

    pub fn patch(&self, id: &str, request: &GenericRequest) -> GenericResponse {
        let result = request
            .json::<ExamplePatch>()
            .map_err(ApiError::from)
            .and_then(|patch| self.service.patch(id, patch, Utc::now()));
        respond(StatusCode::OK, result)
    }

    pub fn delete(&self, id: &str) -> GenericResponse {
        match self.service.delete(id) {
            Ok(()) => GenericResponse::new(StatusCode::NO_CONTENT),
            Err(err) => err.into(),
        }
    }
}

pub struct OtpHandler {
    service: OtpService,
}

impl OtpHandler {
    pub fn new(service: OtpService) -> Self {
        Self { service }
    }

    pub fn issue(&self, request: &GenericRequest) -> GenericResponse {
        let result = request
            .json::<IssueOtpInput>()
            .map_err(ApiError::from)
            .and_then(|input| self.service.issue(input, Utc::now()))
            .map(|record| OtpView::from(&record));
        respond(StatusCode::CREATED, result)
    }

    pub fn get(&self, id: &str) -> GenericResponse {
        respond(
            StatusCode::OK,
            self.service.get(id).map(|record| OtpView::from(&record)),
        )
    }

    pub fn verify(&self, id: &str, request: &GenericRequest) -> GenericResponse {
        let result = request
            .json::<VerifyOtpInput>()
            .map_err(ApiError::from)
            .and_then(|input| self.service.verify(id, &input.otp, Utc::now()))
            .map(|record| OtpView::from(&record));
        respond(StatusCode::OK, result)
    }
}
