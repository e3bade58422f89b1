// Minimal client for the Twilio Programmable Messaging API.

use std::collections::HashMap;
use std::time::Duration;

pub mod models;
use reqwest::{header, Client};

use crate::models::{MessageErrorResponse, MessageResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Send a plain SMS message.
    ///
    /// `recipient` should be in E.164 format; a missing leading `+` is added.
    pub async fn send_sms(&self, recipient: &str, body: &str) -> Result<MessageResponse, String> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{sid}/Messages.json",
            sid = self.options.account_sid
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut form_body: HashMap<&str, String> = HashMap::new();
        form_body.insert("To", to_e164(recipient));
        form_body.insert("From", self.options.from_number.clone());
        form_body.insert("Body", body.to_string());

        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await
            .map_err(|e| format!("Request to Twilio failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<MessageErrorResponse>().await {
                Ok(err) => format!("code {}: {}", err.code.unwrap_or_default(), err.message),
                Err(_) => "unreadable error body".to_string(),
            };
            return Err(format!("Twilio returned {}: {}", status, detail));
        }

        response
            .json::<MessageResponse>()
            .await
            .map_err(|e| format!("Failed to parse Twilio response: {}", e))
    }
}

fn to_e164(recipient: &str) -> String {
    if recipient.starts_with('+') {
        recipient.to_string()
    } else {
        format!("+{}", recipient)
    }
}
