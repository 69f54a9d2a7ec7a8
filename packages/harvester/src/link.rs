//! The Link data model shared by every site loader.
//!
//! A `Link` is a value describing one harvestable document: its resolved
//! URL, its media type, provenance fields for display, and the typed fields
//! of the source that produced it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{HarvesterError, Result};

/// Provenance keys excluded from a link's payload.
pub const PROVENANCE_FIELDS: [&str; 3] = ["category", "name", "description"];

/// Content kind of a link's target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaType {
    Html,
    Pdf,
    Xml,
    Txt,
}

impl MediaType {
    /// Default filename extension.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Xml => "xml",
            Self::Txt => "txt",
        }
    }

    /// Classify a link target by its suffix.
    ///
    /// Fails with `UnexpectedLink` rather than guessing.
    ///
    /// # Examples
    /// ```
    /// use legaldata_harvester::link::MediaType;
    ///
    /// assert_eq!(MediaType::from_target("/sesc/a.pdf").unwrap(), MediaType::Pdf);
    /// assert!(MediaType::from_target("/sesc/a.docx").is_err());
    /// ```
    pub fn from_target(target: &str) -> Result<Self> {
        let path = target.split(['?', '#']).next().unwrap_or(target);
        if path.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if path.ends_with(".html") || path.ends_with(".htm") {
            Ok(Self::Html)
        } else if path.ends_with(".xml") {
            Ok(Self::Xml)
        } else if path.ends_with(".txt") {
            Ok(Self::Txt)
        } else {
            Err(HarvesterError::UnexpectedLink(target.to_string()))
        }
    }
}

/// A public-comment project a document belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Publication date as printed on the listing (公表日).
    pub publish_date: String,
    /// Project title (案件名).
    pub project_name: String,
}

/// A law entry of the e-Gov law list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawEntry {
    pub law_id: String,
    pub law_name: String,
    pub law_number: String,
    pub promulgation_date: String,
}

/// Source-specific fields, one variant per kind of link.
///
/// Serialized flat next to the common fields and tagged with `source`, so
/// a metadata file parses back into the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LinkDetails {
    Egov(LawEntry),
    FsaPublicComment(ProjectRef),
    FsaNews {
        year: i32,
    },
    SescHoudou {
        yyyy: i32,
        houdou_category: String,
    },
    SescJirei {
        title: String,
    },
    JpxRule,
    JpxPublicComment(ProjectRef),
    Jsda,
    JsdaHandbook {
        type_name: String,
        type_desc: String,
        title: String,
    },
    DirReportSite {
        keyword: String,
        sub_keyword: String,
    },
    DirReport {
        keyword: String,
        sub_keyword: String,
    },
}

/// Defaults a kind of link carries before any per-link override.
struct Provenance {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    media_type: MediaType,
}

impl LinkDetails {
    fn provenance(&self) -> Provenance {
        let (category, name, description, media_type) = match self {
            Self::Egov(_) => ("e-Gov", "e-Gov", "e-Gov法令データ", MediaType::Xml),
            Self::FsaPublicComment(_) => (
                "FSA",
                "FSAパブリックコメント",
                "金融庁（FSA）パブリックコメント",
                MediaType::Pdf,
            ),
            Self::FsaNews { .. } => ("FSA", "FSAニュース", "金融庁（FSA）ニュース", MediaType::Html),
            Self::SescHoudou { .. } => ("SESC", "SESC報道", "SESC報道", MediaType::Html),
            Self::SescJirei { .. } => ("SESC", "SESC事例", "SESC事例", MediaType::Pdf),
            Self::JpxRule => (
                "JPX",
                "JPX定款等諸規則／諸規則内規",
                "JPX定款等諸規則／諸規則内規",
                MediaType::Html,
            ),
            Self::JpxPublicComment(_) => (
                "JPX",
                "JPXパブリックコメント",
                "日本取引所グループ（JPX）パブリックコメント",
                MediaType::Pdf,
            ),
            Self::Jsda => ("JSDA", "JSDA協会規約", "JSDA協会規約", MediaType::Pdf),
            Self::JsdaHandbook { .. } => {
                ("JSDA", "JSDAハンドブック", "JSDAハンドブック", MediaType::Pdf)
            }
            Self::DirReportSite { .. } => {
                ("大和総研", "大和総研レポート", "大和総研レポート", MediaType::Html)
            }
            Self::DirReport { .. } => {
                ("大和総研", "大和総研レポート", "大和総研レポート", MediaType::Pdf)
            }
        };
        Provenance {
            category,
            name,
            description,
            media_type,
        }
    }
}

/// One harvestable document reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL of the document.
    pub url: String,

    /// Content kind; persisted under the `extension` key.
    #[serde(rename = "extension")]
    pub media_type: MediaType,

    pub category: String,
    pub name: String,
    pub description: String,

    /// Whether the persisted artifact is extracted text.
    #[serde(default)]
    pub preprocessed: bool,

    #[serde(flatten)]
    pub details: LinkDetails,
}

impl Link {
    /// Create a link with the provenance defaults of its kind.
    ///
    /// `url` must already be resolved with [`crate::uri::resolve_url`].
    #[must_use]
    pub fn new(url: impl Into<String>, details: LinkDetails) -> Self {
        let provenance = details.provenance();
        Self {
            url: url.into(),
            media_type: provenance.media_type,
            category: provenance.category.to_string(),
            name: provenance.name.to_string(),
            description: provenance.description.to_string(),
            preprocessed: false,
            details,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// File name for the persisted content, e.g. `content.pdf`.
    #[must_use]
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.media_type.extension())
    }

    /// The link without its provenance fields.
    pub fn payload(&self) -> Result<Map<String, Value>> {
        let mut map = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for field in PROVENANCE_FIELDS {
            map.remove(field);
        }
        Ok(map)
    }

    /// Full field set as pretty JSON with a 4-space indent.
    ///
    /// Non-ASCII characters are written as-is.
    pub fn to_metadata_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
