//! HTTP client wrapper and content retrieval with encoding negotiation.
//!
//! Every fetch is a single GET: no retry, no caching. The character set a
//! server declares is ignored; the apparent encoding is always sniffed from
//! the body, since several of the harvested sites mislabel Shift_JIS pages.

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{DecoderResult, Encoding};
use reqwest::blocking::Client;
use strum::{Display, EnumString};

use crate::config::FetchConfig;
use crate::error::{HarvesterError, Result};
use crate::uri::hostname;

/// How invalid byte sequences are treated when decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DecodePolicy {
    /// Fail with `HarvesterError::Decode`.
    #[default]
    Strict,
    /// Drop undecodable sequences.
    Ignore,
    /// Substitute U+FFFD for undecodable sequences.
    Replace,
}

/// Create a configured HTTP client.
///
/// Headers are the library defaults. No timeout applies unless
/// `config.timeout` is set.
pub fn create_client(config: &FetchConfig) -> Result<Client> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(client)
}

/// Raw body of a successful response together with its sniffed encoding.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub url: String,
    pub bytes: Vec<u8>,
    pub apparent_encoding: &'static Encoding,
}

impl FetchedContent {
    /// Wrap a body, detecting its apparent encoding.
    pub fn new(url: impl Into<String>, bytes: Vec<u8>) -> Self {
        let url = url.into();
        let apparent_encoding = apparent_encoding(&bytes, &url);
        Self {
            url,
            bytes,
            apparent_encoding,
        }
    }

    /// Decode the body with an explicit encoding label.
    ///
    /// See [`encoding_for_label`] for the accepted labels.
    pub fn decode(&self, label: &str, policy: DecodePolicy) -> Result<String> {
        let encoding = encoding_for_label(label)?;

        match policy {
            DecodePolicy::Strict => encoding
                .decode_without_bom_handling_and_without_replacement(&self.bytes)
                .map(Cow::into_owned)
                .ok_or_else(|| HarvesterError::Decode {
                    url: self.url.clone(),
                    encoding: encoding.name().to_string(),
                }),
            DecodePolicy::Replace => {
                let (text, _) = encoding.decode_without_bom_handling(&self.bytes);
                Ok(text.into_owned())
            }
            DecodePolicy::Ignore => Ok(decode_skipping_malformed(encoding, &self.bytes)),
        }
    }

    /// Lossy decode with the apparent encoding, for feeding HTML parsers.
    pub fn text(&self) -> String {
        let (text, _, _) = self.apparent_encoding.decode(&self.bytes);
        text.into_owned()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Codec names in common use for Japanese sites that the WHATWG label set
/// lacks. WHATWG `Shift_JIS` decodes the Windows-31J superset.
const CODEC_ALIASES: [(&str, &str); 7] = [
    ("cp932", "shift_jis"),
    ("mskanji", "shift_jis"),
    ("eucjp", "euc-jp"),
    ("ujis", "euc-jp"),
    ("u-jis", "euc-jp"),
    ("iso2022-jp", "iso-2022-jp"),
    ("u8", "utf-8"),
];

/// Look up an encoding by label.
///
/// WHATWG labels are accepted as-is. Codec spellings such as `cp932`,
/// `euc_jp` or `utf_8` are accepted as well, with `_` read as `-`.
///
/// # Examples
/// ```
/// use legaldata_harvester::http::encoding_for_label;
///
/// assert_eq!(encoding_for_label("cp932").unwrap(), encoding_rs::SHIFT_JIS);
/// assert_eq!(encoding_for_label("EUC_JP").unwrap(), encoding_rs::EUC_JP);
/// assert!(encoding_for_label("klingon").is_err());
/// ```
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    let trimmed = label.trim();
    if let Some(encoding) = Encoding::for_label(trimmed.as_bytes()) {
        return Ok(encoding);
    }

    let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
    let canonical = CODEC_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map_or(normalized.as_str(), |&(_, name)| name);

    Encoding::for_label(canonical.as_bytes())
        .ok_or_else(|| HarvesterError::UnknownEncoding(label.to_string()))
}

/// Decode `bytes`, dropping malformed sequences. U+FFFD characters that
/// are encoded in the input are kept.
fn decode_skipping_malformed(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut text = String::with_capacity(bytes.len());
    let mut remaining = bytes;

    loop {
        let needed = decoder
            .max_utf8_buffer_length_without_replacement(remaining.len())
            .unwrap_or(remaining.len());
        text.reserve(needed);

        let (result, read) =
            decoder.decode_to_string_without_replacement(remaining, &mut text, true);
        remaining = &remaining[read..];
        match result {
            DecoderResult::InputEmpty => return text,
            DecoderResult::Malformed(_, _) | DecoderResult::OutputFull => {}
        }
    }
}

/// Guess the encoding of a body, using the URL's top-level domain as a hint.
pub fn apparent_encoding(bytes: &[u8], url: &str) -> &'static Encoding {
    let tld = hostname(url).and_then(|host| host.rsplit('.').next().map(str::to_string));

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(tld.as_deref().map(str::as_bytes), true)
}

/// Issue a single GET and return the body.
///
/// Fails with `HarvesterError::Status` on any non-success status; the body
/// of such a response is discarded.
pub fn fetch(client: &Client, url: &str) -> Result<FetchedContent> {
    tracing::debug!(url, "Fetching");

    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(HarvesterError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes()?;
    Ok(FetchedContent::new(url, bytes.to_vec()))
}

/// Fetch the undecoded body.
pub fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    Ok(fetch(client, url)?.into_bytes())
}

/// Fetch and decode with an explicit encoding.
pub fn fetch_text(
    client: &Client,
    url: &str,
    encoding: &str,
    policy: DecodePolicy,
) -> Result<String> {
    fetch(client, url)?.decode(encoding, policy)
}

/// Fetch an XML document, decoded strictly as UTF-8.
pub fn fetch_xml_text(client: &Client, url: &str) -> Result<String> {
    fetch_text(client, url, "utf-8", DecodePolicy::Strict)
}

/// Fetch a page for HTML parsing, decoded with its apparent encoding.
pub fn fetch_html(client: &Client, url: &str) -> Result<String> {
    Ok(fetch(client, url)?.text())
}

/// Report whether `url` answers with 200.
///
/// Transport failures are still errors.
pub fn probe(client: &Client, url: &str) -> Result<bool> {
    let status = client.get(url).send()?.status();
    tracing::debug!(url, status = status.as_u16(), "Probed");
    Ok(status == reqwest::StatusCode::OK)
}
