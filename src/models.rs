use serde::{Deserialize, Serialize};

/// A single PKD classification record as returned by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PkdCode {
    pub id: String,
    pub version: u32,
    /// Relevance score in 0.0..=1.0.
    pub score: f64,
    pub payload: PkdPayload,
}

/// Human-readable classification fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PkdPayload {
    /// The group/class/subclass code string, e.g. "47.71.Z".
    pub grupa_klasa_podklasa: String,
    /// Display name of the grouping.
    pub nazwa_grupowania: String,
    /// Extended description.
    pub opis_dodatkowy: String,
}

impl PkdCode {
    pub fn new(id: impl Into<String>, version: u32, score: f64, payload: PkdPayload) -> PkdCode {
        PkdCode {
            id: id.into(),
            version,
            score,
            payload,
        }
    }

    /// Relevance as a rounded percentage, for display ("Trafność: NN%").
    pub fn score_percent(&self) -> u32 {
        (self.score * 100.0).round() as u32
    }
}

/// One best-match suggestion plus an ordered list of further candidates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub ai_suggestion: PkdCode,
    pub pkd_code_data: Vec<PkdCode>,
}

impl SearchResults {
    /// Candidates excluding the suggested record itself. The backend repeats
    /// the suggestion inside the candidate list, so listings filter it out
    /// by id.
    pub fn other_matches(&self) -> impl Iterator<Item = &PkdCode> {
        self.pkd_code_data
            .iter()
            .filter(|code| code.id != self.ai_suggestion.id)
    }
}

/// Every backend response body wraps its payload in a `data` field.
#[derive(Deserialize, Debug)]
pub struct ApiEnvelope<T> {
    pub data: T,
}
