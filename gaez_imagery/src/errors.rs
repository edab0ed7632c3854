/*
 * Copyright © 2026, the gaez_imagery authors. All rights reserved.
 *
 * This software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GaezError>;

#[derive(Error, Debug)]
pub enum GaezError {
    #[error("IO error {0}")]
    IOError(#[from] std::io::Error),

    #[error("http error {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("config error {0}")]
    ConfigError(String),

    /// the service rejected what we sent (error envelope with code 400)
    #[error("error code {code} encountered in processing your parameters{message}")]
    ParameterError { code: i64, message: String },

    /// service-side failure with any other envelope code
    #[error("error code {code} encountered in processing your request.{message}")]
    RequestError { code: i64, message: String },

    #[error("no data error {0}")]
    NoDataError(String),

    #[error("invalid response format '{0}', please use 'json', 'image', 'kmz' or 'html'")]
    InvalidResponseFormat(String),

    #[error("invalid image format '{0}'")]
    InvalidImageFormat(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String),
}

pub fn op_failed(msg: impl ToString) -> GaezError {
    GaezError::OpFailed(msg.to_string())
}

pub fn no_data(msg: impl ToString) -> GaezError {
    GaezError::NoDataError(msg.to_string())
}

pub fn config_error(msg: impl ToString) -> GaezError {
    GaezError::ConfigError(msg.to_string())
}

/* #region service error envelope ***********************************************************************/

/// the JSON body the image server returns on failure:
/// `{ "error": { "code": <int>, "message"?: <string>, "details"?: <any> } }`
#[derive(Deserialize, Debug)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub code: i64,
    pub message: Option<String>,
    pub details: Option<JsonValue>,
}

impl ErrorBody {
    fn detail_text(&self) -> String {
        let mut s = String::new();
        if let Some(message) = &self.message {
            s.push_str(" Message: ");
            s.push_str(message);
        }
        if let Some(details) = &self.details {
            s.push_str(" Details: ");
            s.push_str(&details.to_string());
        }
        s
    }

    /// code 400 means the server choked on our parameters, anything else is a generic request failure
    pub fn into_error(self) -> GaezError {
        let message = self.detail_text();
        if self.code == 400 {
            GaezError::ParameterError { code: self.code, message }
        } else {
            GaezError::RequestError { code: self.code, message }
        }
    }
}

/// try to interpret a response body as the service error envelope
pub fn error_from_envelope(body: &[u8]) -> Option<GaezError> {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .map(|env| env.error.into_error())
}

/// map a failed response to the most specific error we can get out of its body
pub fn service_error(status: StatusCode, body: &[u8]) -> GaezError {
    error_from_envelope(body)
        .unwrap_or_else(|| op_failed(format!("request failed with code {}", status.as_str())))
}

/* #endregion service error envelope */
