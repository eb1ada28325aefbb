// Roster construction: parsing raw name lists and maintaining the ordered
// participant list.
//
// Two ingestion paths exist. Pasted text is split into lines, trimmed, and
// blank lines are dropped. File imports additionally tolerate single-column
// CSV exports: one trailing comma and wrapping double quotes are stripped.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::participant::{Participant, ParticipantId};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read names file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Where a block of raw text came from. Determines how much cleanup each
/// line receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestSource {
    /// Typed or pasted into the app.
    Pasted,
    /// Read from a text or CSV file.
    File,
}

/// Split raw text into participant names.
///
/// Handles both `\n` and `\r\n` line endings. Lines that are empty after
/// trimming never produce a name.
pub fn parse_names(raw: &str, source: IngestSource) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match source {
            IngestSource::Pasted => Some(line.to_string()),
            IngestSource::File => {
                let cleaned = clean_file_line(line);
                (!cleaned.is_empty()).then(|| cleaned.to_string())
            }
        })
        .collect()
}

/// Strip one trailing comma, then one leading and one trailing double quote.
fn clean_file_line(line: &str) -> &str {
    let line = line.strip_suffix(',').unwrap_or(line);
    let line = line.strip_prefix('"').unwrap_or(line);
    let line = line.strip_suffix('"').unwrap_or(line);
    line.trim()
}

/// Read a names file as text.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// file in a legacy encoding still yields (imperfect) names.
pub fn read_names_file(path: &Path) -> Result<String, RosterError> {
    let bytes = std::fs::read(path).map_err(|source| RosterError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The ordered list of all known participants.
///
/// Insertion order is preserved and names may repeat; only ids are unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    /// Build a roster directly from names, one participant per name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Roster {
            participants: names.into_iter().map(Participant::new).collect(),
        }
    }

    /// Parse `raw` and append every resulting name as a new participant.
    ///
    /// Existing entries are untouched. Returns the number of participants added.
    pub fn ingest(&mut self, raw: &str, source: IngestSource) -> usize {
        let names = parse_names(raw, source);
        let added = names.len();
        self.participants
            .extend(names.into_iter().map(Participant::new));
        debug!("Ingested {} names from {:?} input", added, source);
        added
    }

    /// Remove the participant with the given id.
    ///
    /// Unknown ids are ignored. Returns the removed participant, if any.
    pub fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        let idx = self.participants.iter().position(|p| &p.id == id)?;
        Some(self.participants.remove(idx))
    }

    /// Drop every participant.
    pub fn clear(&mut self) {
        self.participants.clear();
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.participants.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.participants.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn names(roster: &Roster) -> Vec<&str> {
        roster.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn parse_pasted_drops_blank_lines() {
        let parsed = parse_names("Amy\n\n   \nBob\n", IngestSource::Pasted);
        assert_eq!(parsed, vec!["Amy", "Bob"]);
    }

    #[test]
    fn parse_handles_crlf() {
        let parsed = parse_names("Amy\r\nBob\r\n\r\nCara", IngestSource::Pasted);
        assert_eq!(parsed, vec!["Amy", "Bob", "Cara"]);
    }

    #[test]
    fn parse_pasted_keeps_quotes_and_commas() {
        let parsed = parse_names("\"Jerry\",", IngestSource::Pasted);
        assert_eq!(parsed, vec!["\"Jerry\","]);
    }

    #[test]
    fn parse_file_strips_comma_and_quotes() {
        let parsed = parse_names("Tom\n\n \"Jerry\",\n", IngestSource::File);
        assert_eq!(parsed, vec!["Tom", "Jerry"]);
    }

    #[test]
    fn parse_file_strips_only_one_trailing_comma() {
        let parsed = parse_names("Amy,,", IngestSource::File);
        assert_eq!(parsed, vec!["Amy,"]);
    }

    #[test]
    fn parse_file_strips_unbalanced_quote() {
        let parsed = parse_names("\"Amy\n Bob\"", IngestSource::File);
        assert_eq!(parsed, vec!["Amy", "Bob"]);
    }

    #[test]
    fn parse_file_drops_lines_empty_after_cleaning() {
        let parsed = parse_names(",\n\"\"\n\" \",\nDee", IngestSource::File);
        assert_eq!(parsed, vec!["Dee"]);
    }

    #[test]
    fn parse_keeps_inner_whitespace_and_punctuation() {
        let parsed = parse_names("  Mary Ann  \n?!", IngestSource::Pasted);
        assert_eq!(parsed, vec!["Mary Ann", "?!"]);
    }

    #[test]
    fn ingest_appends_after_existing_entries() {
        let mut roster = Roster::from_names(["Amy"]);
        let first_id = roster.as_slice()[0].id.clone();
        let added = roster.ingest("Bob\nCara", IngestSource::Pasted);
        assert_eq!(added, 2);
        assert_eq!(names(&roster), vec!["Amy", "Bob", "Cara"]);
        assert_eq!(roster.as_slice()[0].id, first_id);
    }

    #[test]
    fn ingest_allows_duplicate_names() {
        let mut roster = Roster::new();
        roster.ingest("Amy\nAmy", IngestSource::Pasted);
        assert_eq!(roster.len(), 2);
        assert_ne!(roster.as_slice()[0].id, roster.as_slice()[1].id);
    }

    #[test]
    fn ingest_blank_text_adds_nothing() {
        let mut roster = Roster::new();
        assert_eq!(roster.ingest(" \n\r\n\t", IngestSource::Pasted), 0);
        assert!(roster.is_empty());
    }

    #[test]
    fn remove_known_id_shrinks_by_one() {
        let mut roster = Roster::from_names(["Amy", "Bob", "Cara"]);
        let bob = roster.as_slice()[1].id.clone();
        let removed = roster.remove(&bob).map(|p| p.name);
        assert_eq!(removed.as_deref(), Some("Bob"));
        assert_eq!(names(&roster), vec!["Amy", "Cara"]);
        assert!(!roster.contains(&bob));
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut roster = Roster::from_names(["Amy", "Bob"]);
        assert!(roster.remove(&ParticipantId::generate()).is_none());
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn clear_empties_roster() {
        let mut roster = Roster::from_names(["Amy", "Bob"]);
        roster.clear();
        assert!(roster.is_empty());
    }

    #[test]
    fn read_names_file_missing_is_error() {
        let path = std::env::temp_dir().join("classroom_core_missing_names.txt");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            read_names_file(&path),
            Err(RosterError::Io { .. })
        ));
    }

    #[test]
    fn read_names_file_decodes_invalid_utf8_lossily() {
        let path = std::env::temp_dir().join("classroom_core_lossy_names.txt");
        std::fs::write(&path, b"Amy\n\xffBob\n").unwrap();
        let text = read_names_file(&path).unwrap();
        let parsed = parse_names(&text, IngestSource::File);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], "Amy");
        assert!(parsed[1].ends_with("Bob"));
        let _ = std::fs::remove_file(&path);
    }
}
