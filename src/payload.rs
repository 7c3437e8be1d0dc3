//! Decoders layered on top of scanned text.
//!
//! A [`Decoder`] is a pure function from the raw text of a scan result to an
//! optional typed value. Failures never propagate: they are logged at `info`
//! and yield `None`. Scanned text may carry credentials, so only its length
//! is logged at `info`; the text itself is logged at `debug`.

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use std::fmt;
use url::Url;

type DecodeFn<T> = dyn Fn(&str) -> Result<T, DecodeError> + Send + Sync;

/// Stateless mapping from scanned text to an optional `T`
pub struct Decoder<T> {
    decode: Box<DecodeFn<T>>,
}

impl<T: 'static> Decoder<T> {
    /// Decoder from a function that returns `None` for text it rejects
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        Self::try_from_fn(move |text: &str| decode(text).ok_or(DecodeError::Rejected))
    }

    fn try_from_fn<F>(decode: F) -> Self
    where
        F: Fn(&str) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        Self {
            decode: Box::new(decode),
        }
    }

    /// Decode `text`, `None` when it does not hold a `T`
    pub fn decode(&self, text: &str) -> Option<T> {
        match (self.decode)(text) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::info!(%err, len = text.len(), "scanned payload did not decode");
                tracing::debug!(payload = text, "undecodable payload");
                None
            }
        }
    }

    /// Decode raw payload bytes, rejecting anything that is not UTF-8
    pub fn decode_bytes(&self, bytes: &[u8]) -> Option<T> {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.decode(text),
            Err(err) => {
                let err = DecodeError::from(err);
                tracing::info!(%err, len = bytes.len(), "scanned payload is not text");
                None
            }
        }
    }

    /// Transform the decoded value
    pub fn map<U: 'static, F>(self, f: F) -> Decoder<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.decode;
        Decoder {
            decode: Box::new(move |text: &str| inner(text).map(&f)),
        }
    }

    /// Chain a second step that may reject the decoded value
    pub fn and_then<U: 'static, F>(self, f: F) -> Decoder<U>
    where
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let inner = self.decode;
        Decoder {
            decode: Box::new(move |text: &str| {
                inner(text).and_then(|value| f(value).ok_or(DecodeError::Rejected))
            }),
        }
    }
}

impl<T: DeserializeOwned + 'static> Decoder<T> {
    /// Parse the text as JSON into `T`
    pub fn json() -> Self {
        Self::try_from_fn(|text: &str| Ok(serde_json::from_str(text)?))
    }
}

impl Decoder<Url> {
    /// Parse the text as an absolute URL.
    ///
    /// Relative references such as `www.example.com` or `/path` have no
    /// scheme and are rejected; map them with [`Decoder::new`] and
    /// [`Url::join`] against a known base if they should be accepted.
    pub fn url() -> Self {
        Self::try_from_fn(|text: &str| Ok(Url::parse(text)?))
    }
}

impl Decoder<String> {
    /// Pass the text through unchanged
    pub fn text() -> Self {
        Self::try_from_fn(|text: &str| Ok(text.to_owned()))
    }
}

impl<T> fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, PartialEq, Deserialize)]
    struct Ticket {
        id: u32,
        holder: String,
    }

    #[test]
    fn test_json_decodes_matching_shape() {
        let decoder = Decoder::<Ticket>::json();
        let ticket = decoder.decode(r#"{"id": 7, "holder": "ana"}"#);
        assert_eq!(
            ticket,
            Some(Ticket {
                id: 7,
                holder: "ana".to_string()
            })
        );
    }

    #[test]
    fn test_json_rejects_malformed_and_mismatched() {
        let decoder = Decoder::<Ticket>::json();
        assert_eq!(decoder.decode("{not json"), None);
        assert_eq!(decoder.decode(r#"{"id": "seven"}"#), None);
        assert_eq!(decoder.decode(""), None);
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        let decoder = Decoder::<Ticket>::json();
        assert_eq!(decoder.decode_bytes(&[0xff, 0xfe, b'{']), None);
        assert!(decoder.decode_bytes(br#"{"id":1,"holder":"b"}"#).is_some());
    }

    #[test]
    fn test_url() {
        let decoder = Decoder::url();
        let url = decoder.decode("https://example.com").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(decoder.decode(""), None);
        assert_eq!(decoder.decode("not a url"), None);
    }

    #[test]
    fn test_url_rejects_relative_references() {
        let decoder = Decoder::url();
        assert_eq!(decoder.decode("www.example.com"), None);
        assert_eq!(decoder.decode("/pair?token=1"), None);

        let base = Url::parse("https://example.com/").unwrap();
        let relative = Decoder::new(move |text: &str| base.join(text).ok());
        assert_eq!(
            relative.decode("/pair").map(String::from),
            Some("https://example.com/pair".to_string())
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_decode_keeps_payload_out_of_info_logs() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(Decoder::<Ticket>::json().decode("secret-token-4242"), None);
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("scanned payload did not decode"));
        assert!(output.contains("len=17"));
        assert!(!output.contains("secret-token-4242"));
    }

    #[test]
    fn test_composition() {
        let host = Decoder::url().and_then(|url| url.host_str().map(str::to_owned));
        assert_eq!(host.decode("https://example.com/a").as_deref(), Some("example.com"));
        assert_eq!(host.decode("mailto:someone@example.com"), None);

        let len = Decoder::text().map(|s| s.len());
        assert_eq!(len.decode("abcd"), Some(4));

        let even = Decoder::new(|s: &str| s.parse::<u32>().ok().filter(|n| n % 2 == 0));
        assert_eq!(even.decode("4"), Some(4));
        assert_eq!(even.decode("5"), None);
    }
}
