//! Typed client for the analysis service.
//!
//! One method per endpoint. Every response body is normalized before it is
//! returned, so callers never see raw wire shapes.

use cipherscope_core::normalize::{
    normalize_attack, normalize_brute_force, normalize_structural, normalize_timing,
    normalize_transform, AttackResult, BruteForceReport, StructuralReport, StudyReport,
    TimingReport, TransformReceipt,
};
use cipherscope_core::request::{BruteForcePayload, TimingPayload};
use cipherscope_core::validate::validate_transform;
use cipherscope_core::wire::error_message;
use cipherscope_core::{AlgorithmId, AttackRequest, ComparisonSet, StudyRequest};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{ClientError, TransportError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Multipart, Transport};

/// Fallback shown when an encrypt upload fails without an `error` field.
pub const ENCRYPT_FALLBACK: &str = "Encryption failed";
/// Fallback shown when a decrypt upload fails without an `error` field.
pub const DECRYPT_FALLBACK: &str = "Decryption failed";
/// Message shown for any failed download; the body is not consulted.
pub const DOWNLOAD_FALLBACK: &str = "Download failed";
/// Fallback shown when structural analysis fails without an `error` field.
pub const STRUCTURAL_FALLBACK: &str = "Failed to fetch structural analysis";

/// Direction of a file transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    pub fn endpoint(self) -> &'static str {
        match self {
            Direction::Encrypt => "/api/encrypt",
            Direction::Decrypt => "/api/decrypt",
        }
    }

    pub fn fallback_error(self) -> &'static str {
        match self {
            Direction::Encrypt => ENCRYPT_FALLBACK,
            Direction::Decrypt => DECRYPT_FALLBACK,
        }
    }
}

/// Client bound to one service and one comparison set.
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    transport: T,
    comparison: ComparisonSet,
}

impl Client<HttpTransport> {
    /// HTTP client for `config.base_url`.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        Ok(Self::with_transport(
            HttpTransport::new(&config.base_url)?,
            config.comparison_set.clone(),
        ))
    }
}

impl<T: Transport> Client<T> {
    /// Client over an arbitrary transport.
    pub fn with_transport(transport: T, comparison: ComparisonSet) -> Self {
        Self {
            transport,
            comparison,
        }
    }

    /// Algorithms this client compares.
    pub fn comparison(&self) -> &ComparisonSet {
        &self.comparison
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one attack and normalize its result.
    pub async fn attack(&self, request: &AttackRequest) -> Result<AttackResult, ClientError> {
        let body = self.post_json(request.endpoint(), request).await?;
        Ok(normalize_attack(request.attack_type(), &self.comparison, &body))
    }

    /// Run either study.
    pub async fn study(&self, request: &StudyRequest) -> Result<StudyReport, ClientError> {
        Ok(match request {
            StudyRequest::BruteForce(payload) => {
                StudyReport::BruteForce(self.brute_force_study(payload).await?)
            }
            StudyRequest::Timing(payload) => {
                StudyReport::Timing(self.timing_analysis(payload).await?)
            }
        })
    }

    /// `POST /api/timing-analysis`.
    pub async fn timing_analysis(&self, payload: &TimingPayload) -> Result<TimingReport, ClientError> {
        let body = self.post_json("/api/timing-analysis", payload).await?;
        Ok(normalize_timing(&self.comparison, &body))
    }

    /// `POST /api/brute-force-study`.
    pub async fn brute_force_study(
        &self,
        payload: &BruteForcePayload,
    ) -> Result<BruteForceReport, ClientError> {
        let body = self.post_json("/api/brute-force-study", payload).await?;
        Ok(normalize_brute_force(&self.comparison, &body))
    }

    /// `GET /api/structural-analysis`.
    pub async fn structural_analysis(&self) -> Result<StructuralReport, ClientError> {
        let response = self
            .send(HttpRequest::get("/api/structural-analysis"))
            .await?;
        let body: Value = serde_json::from_slice(&response.body)?;
        Ok(normalize_structural(&self.comparison, &body))
    }

    /// Upload a whole file to `/api/encrypt` or `/api/decrypt`.
    ///
    /// An empty file or a malformed key fails with [`ClientError::Invalid`]
    /// before anything is sent.
    pub async fn transform(
        &self,
        direction: Direction,
        algorithm: &AlgorithmId,
        key: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<TransformReceipt, ClientError> {
        validate_transform(key, &content)?;
        let form = Multipart::new()
            .text("algorithm", algorithm.as_str())
            .text("key", key)
            .file("file", filename, content);
        let response = self
            .send(HttpRequest::post_multipart(direction.endpoint(), form))
            .await?;
        let body: Value = serde_json::from_slice(&response.body)?;
        Ok(normalize_transform(&body))
    }

    /// Encrypt a file with `algorithm`.
    pub async fn encrypt(
        &self,
        algorithm: &AlgorithmId,
        key: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<TransformReceipt, ClientError> {
        self.transform(Direction::Encrypt, algorithm, key, filename, content)
            .await
    }

    /// Decrypt a file with `algorithm`.
    pub async fn decrypt(
        &self,
        algorithm: &AlgorithmId,
        key: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<TransformReceipt, ClientError> {
        self.transform(Direction::Decrypt, algorithm, key, filename, content)
            .await
    }

    /// `GET /api/download/:filename`, returning the raw bytes.
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>, ClientError> {
        let path = format!("/api/download/{}", encode_path_segment(filename));
        Ok(self.send(HttpRequest::get(path)).await?.body)
    }

    async fn post_json<B: Serialize>(&self, path: &str, payload: &B) -> Result<Value, ClientError> {
        let request = HttpRequest::post_json(path, serde_json::to_vec(payload)?);
        let response = self.send(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Send and map non-2xx responses to [`ClientError::Status`].
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let response = self.transport.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            let message = error_message(&response.body);
            tracing::debug!(status = response.status, ?message, "service returned an error");
            Err(ClientError::Status {
                status: response.status,
                message,
            })
        }
    }
}

/// Percent-encode everything outside the unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(encode_path_segment("encrypted_TEA_a.txt"), "encrypted_TEA_a.txt");
        assert_eq!(encode_path_segment("my file/../x"), "my%20file%2F..%2Fx");
    }

    #[test]
    fn direction_endpoints() {
        assert_eq!(Direction::Encrypt.endpoint(), "/api/encrypt");
        assert_eq!(Direction::Decrypt.fallback_error(), "Decryption failed");
    }
}
