//! Scripted transport shared by the integration suites.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use tracedepot_fetch::{BodyStream, ResponseParts, Transport, TransportError};
use tracedepot_verify::Md5Hasher;

/// One scripted response. Queued per method; the last entry repeats once
/// the queue runs dry, so "always answer X" scripts need a single entry.
#[derive(Debug, Clone)]
pub enum Scripted {
    Body {
        bytes: Vec<u8>,
        content_length: Option<u64>,
        etag: Option<String>,
    },
    Status(u16),
    Timeout,
}

impl Scripted {
    /// A 200 with no integrity headers at all.
    pub fn plain(bytes: &[u8]) -> Self {
        Scripted::Body {
            bytes: bytes.to_vec(),
            content_length: None,
            etag: None,
        }
    }

    /// A 200 with the requested subset of integrity headers.
    pub fn with_integrity(bytes: &[u8], length: bool, etag: bool) -> Self {
        Scripted::Body {
            bytes: bytes.to_vec(),
            content_length: length.then_some(bytes.len() as u64),
            etag: etag.then(|| Md5Hasher::hex_digest(bytes)),
        }
    }

    /// A 200 whose declared Content-Length disagrees with the body.
    pub fn lying_length(bytes: &[u8], declared: u64) -> Self {
        Scripted::Body {
            bytes: bytes.to_vec(),
            content_length: Some(declared),
            etag: None,
        }
    }
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    head_queue: Mutex<VecDeque<Scripted>>,
    get_queue: Mutex<VecDeque<Scripted>>,
    post_body: Mutex<Option<String>>,
    log: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_head(&self, response: Scripted) {
        self.head_queue.lock().unwrap().push_back(response);
    }

    pub fn script_get(&self, response: Scripted) {
        self.get_queue.lock().unwrap().push_back(response);
    }

    /// Script both HEAD and GET with the same response, the common case.
    pub fn script(&self, response: Scripted) {
        self.script_head(response.clone());
        self.script_get(response);
    }

    pub fn script_post(&self, body: &str) {
        *self.post_body.lock().unwrap() = Some(body.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.requests().iter().map(|r| r.method).collect()
    }

    fn record(&self, method: &'static str, url: &str, headers: &[(String, String)]) {
        self.log.lock().unwrap().push(Recorded {
            method,
            url: url.to_string(),
            headers: headers.to_vec(),
        });
    }

    fn next(queue: &Mutex<VecDeque<Scripted>>, method: &str) -> Result<Scripted, TransportError> {
        let mut queue = queue.lock().unwrap();
        match queue.len() {
            0 => Err(TransportError::Other(format!(
                "no scripted response for {method}"
            ))),
            1 => Ok(queue.front().cloned().unwrap()),
            _ => Ok(queue.pop_front().unwrap()),
        }
    }

    fn parts(url: &str, response: &Scripted) -> Result<ResponseParts, TransportError> {
        match response {
            Scripted::Body {
                content_length,
                etag,
                ..
            } => Ok(ResponseParts {
                status: 200,
                content_length: *content_length,
                etag: etag.clone(),
            }),
            Scripted::Status(status) => Err(TransportError::Status {
                status: *status,
                url: url.to_string(),
            }),
            Scripted::Timeout => Err(TransportError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

impl Transport for ScriptedTransport {
    async fn head(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<ResponseParts, TransportError> {
        self.record("HEAD", url, headers);
        let response = Self::next(&self.head_queue, "HEAD")?;
        Self::parts(url, &response)
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<(ResponseParts, BodyStream), TransportError> {
        self.record("GET", url, headers);
        let response = Self::next(&self.get_queue, "GET")?;
        let parts = Self::parts(url, &response)?;
        let Scripted::Body { bytes, .. } = response else {
            unreachable!("parts() rejects non-body responses");
        };
        let chunks: Vec<Result<Bytes, TransportError>> = bytes
            .chunks(3)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        let stream: BodyStream = Box::pin(futures_util::stream::iter(chunks));
        Ok((parts, stream))
    }

    async fn post_form(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, TransportError> {
        let headers: Vec<(String, String)> = params.to_vec();
        self.record("POST", url, &headers);
        self.post_body
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| TransportError::Other("no scripted response for POST".to_string()))
    }
}
