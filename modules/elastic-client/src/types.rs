use serde::Deserialize;
use serde_json::value::RawValue;

#[derive(Debug, Deserialize)]
pub(crate) struct CountResponse {
    pub count: u64,
}

/// One search hit. The source document is kept raw; callers decode it
/// into whatever shape their index holds.
#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source")]
    pub source: Box<RawValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

fn empty_hits() -> HitsEnvelope {
    HitsEnvelope { hits: Vec::new() }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "_scroll_id")]
    pub scroll_id: Option<String>,
    #[serde(default = "empty_hits")]
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<Box<RawValue>>,
}
