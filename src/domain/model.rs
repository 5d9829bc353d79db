use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpStatus {
    Pending,
    Verified,
    Expired,
}

/// A one-time verification code issued to a phone number.
///
/// The identity is fixed at creation, the modification date never moves
/// backwards and both attempt counters only grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    #[serde(rename = "_id")]
    id: String,
    otp: String,
    creation_date: DateTime<Utc>,
    modification_date: DateTime<Utc>,
    status: OtpStatus,
    valid_attempts: u32,
    retry_attempts: u32,
    user_phone_number: String,
    user_id: String,
}

impl OtpRecord {
    pub fn issue(
        otp: impl Into<String>,
        user_phone_number: impl Into<String>,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            otp: otp.into(),
            creation_date: now,
            modification_date: now,
            status: OtpStatus::Pending,
            valid_attempts: 0,
            retry_attempts: 0,
            user_phone_number: user_phone_number.into(),
            user_id: user_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    pub fn modification_date(&self) -> DateTime<Utc> {
        self.modification_date
    }

    pub fn status(&self) -> OtpStatus {
        self.status
    }

    pub fn valid_attempts(&self) -> u32 {
        self.valid_attempts
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn record_valid_attempt(&mut self, now: DateTime<Utc>) {
        self.valid_attempts = self.valid_attempts.saturating_add(1);
        self.status = OtpStatus::Verified;
        self.touch(now);
    }

    pub fn record_retry(&mut self, now: DateTime<Utc>) {
        self.retry_attempts = self.retry_attempts.saturating_add(1);
        self.touch(now);
    }

    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.status = OtpStatus::Expired;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.modification_date = self.modification_date.max(now);
    }
}

/// Public projection of [`OtpRecord`] that leaves the code itself out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpView {
    pub id: String,
    pub creation_date: DateTime<Utc>,
    pub modification_date: DateTime<Utc>,
    pub status: OtpStatus,
    pub valid_attempts: u32,
    pub retry_attempts: u32,
    pub user_phone_number: String,
    pub user_id: String,
}

impl From<&OtpRecord> for OtpView {
    fn from(record: &OtpRecord) -> Self {
        Self {
            id: record.id.clone(),
            creation_date: record.creation_date,
            modification_date: record.modification_date,
            status: record.status,
            valid_attempts: record.valid_attempts,
            retry_attempts: record.retry_attempts,
            user_phone_number: record.user_phone_number.clone(),
            user_id: record.user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
