//! Minimal HTTP/1.1 client over `tokio::net::TcpStream`.
//!
//! One connection per request with `Connection: close`. Responses may be
//! framed by `Content-Length`, chunked transfer encoding, or end of stream.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::TransportError;

const READ_CHUNK: usize = 8 * 1024;
const USER_AGENT: &str = concat!("cipherscope/", env!("CARGO_PKG_VERSION"));

/// Parsed `http://host[:port][/prefix]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BaseUrl {
    /// Host as written, brackets kept for IPv6 literals.
    host: String,
    port: u16,
    /// Path prefix without a trailing slash, possibly empty.
    prefix: String,
}

impl BaseUrl {
    fn parse(url: &str) -> Result<Self, TransportError> {
        let invalid = |reason| TransportError::InvalidUrl {
            url: url.to_string(),
            reason,
        };

        let trimmed = url.trim();
        let rest = match trimmed.get(..7) {
            Some(scheme) if scheme.eq_ignore_ascii_case("http://") => &trimmed[7..],
            _ => return Err(invalid("only http:// URLs are supported")),
        };

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(invalid("missing host"));
        }

        let (host, port) = if authority.starts_with('[') {
            let end = authority.find(']').ok_or_else(|| invalid("unclosed IPv6 literal"))?;
            let host = &authority[..=end];
            match &authority[end + 1..] {
                "" => (host, 80),
                port => (
                    host,
                    port.strip_prefix(':')
                        .and_then(|p| p.parse().ok())
                        .ok_or_else(|| invalid("invalid port"))?,
                ),
            }
        } else {
            match authority.rsplit_once(':') {
                Some((host, port)) => (host, port.parse().map_err(|_| invalid("invalid port"))?),
                None => (authority, 80),
            }
        };
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            prefix: path.trim_end_matches('/').to_string(),
        })
    }

    fn connect_host(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }

    fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// [`Transport`] over plain TCP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base: BaseUrl,
}

impl HttpTransport {
    /// Transport for the service at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            base: BaseUrl::parse(base_url)?,
        })
    }

    fn encode(&self, request: &HttpRequest) -> Vec<u8> {
        let mut head = format!(
            "{} {}{} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nAccept: application/json\r\nConnection: close\r\n",
            request.method.as_str(),
            self.base.prefix,
            request.path,
            self.base.host_header(),
            USER_AGENT,
        );
        if let Some(content_type) = &request.content_type {
            head.push_str(&format!("Content-Type: {content_type}\r\n"));
        }
        if !request.body.is_empty() || request.content_type.is_some() {
            head.push_str(&format!("Content-Length: {}\r\n", request.body.len()));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&request.body);
        bytes
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            bytes = request.body.len(),
            "sending request"
        );
        let mut stream = TcpStream::connect((self.base.connect_host(), self.base.port)).await?;
        stream.write_all(&self.encode(&request)).await?;
        stream.flush().await?;

        let response = read_response(&mut stream).await?;
        tracing::debug!(
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );
        Ok(response)
    }
}

// ============================================================================
// Response parsing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    ContentLength(usize),
    Chunked,
    UntilEof,
}

struct Head {
    status: u16,
    headers: Vec<(String, String)>,
    framing: Framing,
    /// Offset of the first body byte in the read buffer.
    body_start: usize,
}

/// Read one response from `reader`, honouring its framing.
pub(crate) async fn read_response<R>(reader: &mut R) -> Result<HttpResponse, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut head: Option<Head> = None;

    loop {
        if head.is_none() {
            head = parse_head(&buf)?;
        }
        if let Some(h) = &head {
            let body = &buf[h.body_start..];
            let complete = match h.framing {
                Framing::ContentLength(n) if body.len() >= n => Some(body[..n].to_vec()),
                Framing::Chunked => decode_chunked(body)?,
                _ => None,
            };
            if let Some(body) = complete {
                return Ok(finish(h, body));
            }
        }

        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            let Some(h) = head else {
                return Err(TransportError::Malformed(
                    "connection closed before response headers".into(),
                ));
            };
            return match h.framing {
                Framing::UntilEof => {
                    let body = buf[h.body_start..].to_vec();
                    Ok(finish(&h, body))
                }
                Framing::ContentLength(n) => Err(TransportError::Malformed(format!(
                    "body ended after {} of {} bytes",
                    buf.len() - h.body_start,
                    n
                ))),
                Framing::Chunked => Err(TransportError::Malformed(
                    "chunked body ended before the last chunk".into(),
                )),
            };
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn finish(head: &Head, body: Vec<u8>) -> HttpResponse {
    HttpResponse {
        status: head.status,
        headers: head.headers.clone(),
        body,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parse the status line and headers once they are fully buffered.
///
/// Interim `1xx` responses are skipped.
fn parse_head(buf: &[u8]) -> Result<Option<Head>, TransportError> {
    let mut offset = 0;
    loop {
        let Some(end) = find(&buf[offset..], b"\r\n\r\n") else {
            return Ok(None);
        };
        let text = std::str::from_utf8(&buf[offset..offset + end])
            .map_err(|_| TransportError::Malformed("response head is not UTF-8".into()))?;
        let mut lines = text.split("\r\n");
        let status_line = lines.next().unwrap_or_default();
        let status = parse_status_line(status_line)?;
        let body_start = offset + end + 4;

        if (100..200).contains(&status) {
            offset = body_start;
            continue;
        }

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| TransportError::Malformed(format!("bad header line: {line}")))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }

        let header = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        };
        let framing = if header("transfer-encoding")
            .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
        {
            Framing::Chunked
        } else if let Some(len) = header("content-length") {
            Framing::ContentLength(len.parse().map_err(|_| {
                TransportError::Malformed(format!("bad Content-Length: {len}"))
            })?)
        } else {
            Framing::UntilEof
        };

        return Ok(Some(Head {
            status,
            headers,
            framing,
            body_start,
        }));
    }
}

fn parse_status_line(line: &str) -> Result<u16, TransportError> {
    let mut parts = line.splitn(3, ' ');
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/1.") => code
            .parse()
            .map_err(|_| TransportError::Malformed(format!("bad status line: {line}"))),
        _ => Err(TransportError::Malformed(format!("bad status line: {line}"))),
    }
}

/// Decode a chunked body. `Ok(None)` means more bytes are needed.
fn decode_chunked(data: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
    let mut body = Vec::new();
    let mut pos = 0;
    loop {
        let Some(line_end) = find(&data[pos..], b"\r\n") else {
            return Ok(None);
        };
        let size_line = std::str::from_utf8(&data[pos..pos + line_end])
            .map_err(|_| TransportError::Malformed("chunk size is not UTF-8".into()))?;
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| TransportError::Malformed(format!("bad chunk size: {size_hex}")))?;
        pos += line_end + 2;

        if size == 0 {
            // Optional trailers, then an empty line.
            let rest = &data[pos..];
            if rest.starts_with(b"\r\n") || find(rest, b"\r\n\r\n").is_some() {
                return Ok(Some(body));
            }
            return Ok(None);
        }

        if data.len() < pos + size + 2 {
            return Ok(None);
        }
        body.extend_from_slice(&data[pos..pos + size]);
        if &data[pos + size..pos + size + 2] != b"\r\n" {
            return Err(TransportError::Malformed("chunk not terminated by CRLF".into()));
        }
        pos += size + 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_urls() {
        let url = BaseUrl::parse("http://127.0.0.1:5000").unwrap();
        assert_eq!((url.host.as_str(), url.port, url.prefix.as_str()), ("127.0.0.1", 5000, ""));

        let url = BaseUrl::parse("HTTP://example.org/service/").unwrap();
        assert_eq!((url.host.as_str(), url.port, url.prefix.as_str()), ("example.org", 80, "/service"));

        let url = BaseUrl::parse("http://[::1]:8080").unwrap();
        assert_eq!(url.connect_host(), "::1");
        assert_eq!(url.host_header(), "[::1]:8080");
    }

    #[test]
    fn rejects_unsupported_urls() {
        assert!(BaseUrl::parse("https://example.org").is_err());
        assert!(BaseUrl::parse("http://").is_err());
        assert!(BaseUrl::parse("http://host:notaport").is_err());
        assert!(BaseUrl::parse("localhost:5000").is_err());
    }

    #[test]
    fn encodes_post_with_length() {
        let transport = HttpTransport::new("http://localhost:5000/app").unwrap();
        let bytes = transport.encode(&HttpRequest::post_json("/api/x", b"{}".to_vec()));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("POST /app/api/x HTTP/1.1\r\nHost: localhost:5000\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("Content-Length: 2\r\n"));
        assert!(text.ends_with("\r\n\r\n{}"));
    }

    #[test]
    fn get_has_no_length() {
        let transport = HttpTransport::new("http://localhost").unwrap();
        let text = String::from_utf8(transport.encode(&HttpRequest::get("/api/structural-analysis"))).unwrap();
        assert!(!text.contains("Content-Length"));
        assert!(text.contains("Host: localhost\r\n"));
    }

    #[tokio::test]
    async fn reads_content_length_body() {
        let mut raw: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhelloEXTRA";
        let response = read_response(&mut raw).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"hello");
    }

    #[tokio::test]
    async fn reads_chunked_body() {
        let mut raw: &[u8] =
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n6;x=1\r\npedia \r\n0\r\n\r\n";
        let response = read_response(&mut raw).await.unwrap();
        assert_eq!(response.body, b"Wikipedia ");
    }

    #[tokio::test]
    async fn reads_until_eof_without_framing() {
        let mut raw: &[u8] = b"HTTP/1.0 500 INTERNAL SERVER ERROR\r\nContent-Type: text/html\r\n\r\n<p>boom</p>";
        let response = read_response(&mut raw).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, b"<p>boom</p>");
        assert_eq!(response.headers[0].1, "text/html");
    }

    #[tokio::test]
    async fn skips_interim_responses() {
        let mut raw: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n";
        let response = read_response(&mut raw).await.unwrap();
        assert_eq!(response.status, 201);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn short_body_is_malformed() {
        let mut raw: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc";
        assert!(matches!(
            read_response(&mut raw).await,
            Err(TransportError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let mut raw: &[u8] = b"SSH-2.0-OpenSSH\r\n\r\n";
        assert!(matches!(
            read_response(&mut raw).await,
            Err(TransportError::Malformed(_))
        ));
    }
}
