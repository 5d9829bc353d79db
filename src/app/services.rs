use crate::app::error::ApiError;
use crate::domain::model::{Example, OtpRecord, OtpStatus};
use crate::domain::ports::{ExampleRepository, Logger, OtpRepository};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

pub const OTP_LENGTH: usize = 6;
pub const OTP_TTL_MINUTES: i64 = 5;
pub const OTP_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name cannot be empty".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ExampleService {
    repository: Arc<dyn ExampleRepository>,
    logger: Arc<dyn Logger>,
}

impl ExampleService {
    pub fn new(repository: Arc<dyn ExampleRepository>, logger: Arc<dyn Logger>) -> Self {
        Self { repository, logger }
    }

    pub fn list(&self) -> Vec<Example> {
        self.repository.list()
    }

    pub fn get(&self, id: &str) -> Result<Example, ApiError> {
        self.repository
            .find(id)
            .ok_or_else(|| ApiError::not_found("example", id))
    }

    pub fn create(&self, input: ExampleInput, now: DateTime<Utc>) -> Result<Example, ApiError> {
        require_name(&input.name)?;
        let example = Example {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        self.repository.insert(example.clone());
        self.logger.info(&format!("example {} created", example.id));
        Ok(example)
    }

    pub fn replace(
        &self,
        id: &str,
        input: ExampleInput,
        now: DateTime<Utc>,
    ) -> Result<Example, ApiError> {
        require_name(&input.name)?;
        let mut example = self.get(id)?;
        example.name = input.name;
        example.description = input.description;
        self.store_update(example, now)
    }

    pub fn patch(
        &self,
        id: &str,
        patch: ExamplePatch,
        now: DateTime<Utc>,
    ) -> Result<Example, ApiError> {
        let mut example = self.get(id)?;
        if let Some(name) = patch.name {
            require_name(&name)?;
            example.name = name;
        }
        if let Some(description) = patch.description {
            example.description = Some(description);
        }
        self.store_update(example, now)
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        if !self.repository.delete(id) {
            return Err(ApiError::not_found("example", id));
        }
        self.logger.info(&format!("example {} deleted", id));
        Ok(())
    }

    fn store_update(&self, mut example: Example, now: DateTime<Utc>) -> Result<Example, ApiError> {
        example.updated_at = example.updated_at.max(now);
        if !self.repository.update(example.clone()) {
            // deleted between the read and the write
            return Err(ApiError::not_found("example", &example.id));
        }
        Ok(example)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueOtpInput {
    pub user_phone_number: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpInput {
    pub otp: String,
}

#[derive(Clone)]
pub struct OtpService {
    repository: Arc<dyn OtpRepository>,
    logger: Arc<dyn Logger>,
    ttl: Duration,
    max_retries: u32,
}

impl OtpService {
    pub fn new(repository: Arc<dyn OtpRepository>, logger: Arc<dyn Logger>) -> Self {
        Self {
            repository,
            logger,
            ttl: Duration::minutes(OTP_TTL_MINUTES),
            max_retries: OTP_MAX_RETRIES,
        }
    }

    pub fn issue(&self, input: IssueOtpInput, now: DateTime<Utc>) -> Result<OtpRecord, ApiError> {
        if input.user_phone_number.trim().is_empty() {
            return Err(ApiError::Validation(
                "userPhoneNumber cannot be empty".to_string(),
            ));
        }
        if input.user_id.trim().is_empty() {
            return Err(ApiError::Validation("userId cannot be empty".to_string()));
        }

        let record = OtpRecord::issue(
            generate_code(),
            input.user_phone_number,
            input.user_id,
            now,
        );
        self.repository.save(record.clone());
        self.logger
            .info(&format!("otp {} issued for user {}", record.id(), record.user_id()));
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<OtpRecord, ApiError> {
        self.repository
            .find(id)
            .ok_or_else(|| ApiError::not_found("otp", id))
    }

    /// Checks `code` against a pending record, updating its counters.
    ///
    /// The check and the mutation happen inside one repository `modify`, so
    /// concurrent attempts on the same record are applied one after another.
    pub fn verify(&self, id: &str, code: &str, now: DateTime<Utc>) -> Result<OtpRecord, ApiError> {
        let (ttl, max_retries) = (self.ttl, self.max_retries);
        let mut outcome = Err(ApiError::not_found("otp", id));

        self.repository.modify(id, &mut |record: &mut OtpRecord| {
            outcome = apply_attempt(record, code, now, ttl, max_retries);
        });

        if outcome.is_ok() {
            self.logger.info(&format!("otp {} verified", id));
        }
        outcome
    }
}

fn apply_attempt(
    record: &mut OtpRecord,
    code: &str,
    now: DateTime<Utc>,
    ttl: Duration,
    max_retries: u32,
) -> Result<OtpRecord, ApiError> {
    match record.status() {
        OtpStatus::Verified => {
            return Err(ApiError::Conflict(format!(
                "otp '{}' already verified",
                record.id()
            )))
        }
        OtpStatus::Expired => {
            return Err(ApiError::Gone(format!("otp '{}' has expired", record.id())))
        }
        OtpStatus::Pending => {}
    }

    if now - record.creation_date() > ttl {
        record.expire(now);
        return Err(ApiError::Gone(format!("otp '{}' has expired", record.id())));
    }

    if record.otp() == code {
        record.record_valid_attempt(now);
        return Ok(record.clone());
    }

    record.record_retry(now);
    if record.retry_attempts() >= max_retries {
        record.expire(now);
    }
    Err(ApiError::OtpMismatch)
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
