//! Cross-context message protocol. Callers send one JSON message per line and
//! receive one JSON response per line once the pipeline has settled.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::DocumentKind;
use crate::error::Result;
use crate::fetch::origin_of;
use crate::pipeline::Orchestrator;

/// Requests understood by the message host.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Message {
    /// Extracted privacy policy text of the page at `url`
    #[serde(rename = "POLICY_TEXT_PRIVACYPOLICY")]
    PrivacyPolicyText { url: String, data: String },
    /// Extracted terms of service text of the page at `url`
    #[serde(rename = "POLICY_TEXT_TERMSOFSERVICE")]
    TermsOfServiceText { url: String, data: String },
    /// Raw HTML of an arbitrary URL
    #[serde(rename = "FETCH_URL_CONTENT")]
    FetchUrlContent { url: String },
}

/// Response to a message: `{"status":"success",...}` or `{"status":"error",...}`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response {
    Success {
        data: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<u32>,
    },
    Error {
        message: String,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

impl Orchestrator {
    /// Handles one message. Failures become error responses, never panics or aborts.
    pub async fn handle_message(&self, message: Message) -> Response {
        let result = match message {
            Message::PrivacyPolicyText { url, data } => {
                self.handle_policy_text(&url, DocumentKind::PrivacyPolicy, &data)
                    .await
            }
            Message::TermsOfServiceText { url, data } => {
                self.handle_policy_text(&url, DocumentKind::TermsOfService, &data)
                    .await
            }
            Message::FetchUrlContent { url } => {
                self.fetch_url_content(&url)
                    .await
                    .map(|data| Response::Success { data, score: None })
            }
        };

        result.unwrap_or_else(|e| {
            warn!("Message failed: {e}");
            Response::error(e.to_string())
        })
    }

    async fn handle_policy_text(
        &self,
        page_url: &str,
        kind: DocumentKind,
        text: &str,
    ) -> Result<Response> {
        let origin = origin_of(&Url::parse(page_url)?)?;
        debug!("Received {kind} content of {origin}: {} characters", text.len());
        let analysis = self.analyze_text(&origin, kind, text).await?;

        Ok(Response::Success {
            data: analysis.summary,
            score: analysis.score,
        })
    }
}

/// Serves messages read line by line until EOF, answering each one in order.
///
/// Blank lines are ignored; lines that are not valid messages get an error response.
///
/// # Errors
///
/// Returns an error only if reading input or writing a response fails.
pub async fn serve<R, W>(orchestrator: &Orchestrator, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0_u64;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Message>(&line) {
            Ok(message) => orchestrator.handle_message(message).await,
            Err(e) => {
                error!("Invalid message: {e}");
                Response::error(format!("Invalid message: {e}"))
            }
        };

        let mut encoded = serde_json::to_string(&response).map_err(std::io::Error::other)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!("Message host finished after {handled} messages");
    Ok(())
}
