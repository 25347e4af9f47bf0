use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::chord::{parse_chord, Chord, PairKey};
use crate::store::{ChordStore, Result, ScoreEntry, ScoreHistory, StoreError};

// Save-file layout, shared with the old Python tracker:
// a 2-element JSON array of [chord_list, pair_score_dict], where pair keys
// are "A&Bm" strings and history keys are stringified f64 timestamps.
type RawHistory = BTreeMap<String, Option<u32>>;
type RawDoc = (Vec<String>, BTreeMap<String, RawHistory>);

/// Load practice data from `path`.
///
/// A missing or zero-length file means "no data yet" and yields an empty
/// store. Anything else that fails — unreadable file, invalid JSON,
/// malformed pair key, non-numeric timestamp — is a hard error; a corrupt
/// file must never silently turn into partial data.
pub fn load(path: &Path) -> Result<ChordStore> {
    if !path.exists() {
        log::info!("No save file at {}, starting empty", path.display());
        return Ok(ChordStore::new());
    }

    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        log::info!("Save file {} is empty, starting empty", path.display());
        return Ok(ChordStore::new());
    }

    let (chord_names, raw_scores): RawDoc = serde_json::from_str(&contents)?;

    let mut chords: Vec<Chord> = Vec::with_capacity(chord_names.len());
    for name in &chord_names {
        let chord =
            parse_chord(name).ok_or_else(|| StoreError::MalformedChord(name.clone()))?;
        chords.push(chord);
    }

    let mut scores = BTreeMap::new();
    for (key_str, raw_history) in raw_scores {
        let key = PairKey::decode(&key_str)?;
        let mut entries = Vec::with_capacity(raw_history.len());
        for (ts_str, score) in raw_history {
            let timestamp: f64 = ts_str
                .parse()
                .ok()
                .filter(|t: &f64| t.is_finite())
                .ok_or(StoreError::BadTimestamp(ts_str))?;
            entries.push(ScoreEntry { timestamp, score });
        }
        scores.insert(key, ScoreHistory::from_entries(entries));
    }

    log::info!(
        "Loaded {} chords / {} pairs from {}",
        chords.len(),
        scores.len(),
        path.display()
    );
    Ok(ChordStore::from_parts(chords, scores))
}

/// Save practice data to `path`, overwriting whatever is there.
///
/// The document is written to a temp file in the target directory and
/// renamed into place, so a crash mid-save leaves the old file intact.
/// Timestamps are formatted with `f64`'s shortest round-trip notation, so
/// a save/load cycle reproduces them bit-exactly.
pub fn save(store: &ChordStore, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            fs::create_dir_all(p)?;
            p
        }
        _ => Path::new("."),
    };

    let chord_names: Vec<&str> = store.chords().iter().map(Chord::as_str).collect();
    let mut raw_scores: BTreeMap<String, RawHistory> = BTreeMap::new();
    for (key, history) in store.scores() {
        let raw: RawHistory = history
            .entries()
            .iter()
            .map(|e| (format!("{}", e.timestamp), e.score))
            .collect();
        raw_scores.insert(key.encode(), raw);
    }

    let doc = serde_json::to_string_pretty(&(chord_names, raw_scores))?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(doc.as_bytes())?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    log::debug!("Saved {} pairs to {}", store.scores().len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::parse_chord;

    fn key(a: &str, b: &str) -> PairKey {
        PairKey::new(parse_chord(a).unwrap(), parse_chord(b).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("nope.json")).unwrap();
        assert!(store.chords().is_empty());
        assert!(store.scores().is_empty());
    }

    #[test]
    fn test_empty_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        fs::write(&path, "").unwrap();
        let store = load(&path).unwrap();
        assert!(store.chords().is_empty());
    }

    #[test]
    fn test_round_trip_exact() {
        let mut store = ChordStore::new();
        for name in ["G", "C", "D", "Em"] {
            store.add_chord(name);
        }
        let k = key("C", "G");
        store.add_score(&k, 10, Some(1_628_000_000.25));
        store.add_score(&k, 45, Some(1_628_000_123.456_789));
        store.add_score(&k, 30, Some(1_628_100_000.0));
        store.add_score(&key("D", "Em"), 12, Some(1_628_200_000.5));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        save(&store, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, store);
        // Spot-check the fractional timestamp survived exactly
        let history = loaded.history(&k).unwrap();
        assert!(history
            .entries()
            .iter()
            .any(|e| e.timestamp == 1_628_000_123.456_789));
    }

    #[test]
    fn test_round_trip_preserves_chord_order() {
        let mut store = ChordStore::new();
        for name in ["E", "A", "D", "G", "B"] {
            store.add_chord(name);
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        save(&store, &path).unwrap();

        let loaded = load(&path).unwrap();
        let names: Vec<&str> = loaded.chords().iter().map(Chord::as_str).collect();
        assert_eq!(names, vec!["E", "A", "D", "G", "B"]);
    }

    #[test]
    fn test_python_era_file_loads() {
        // Hand-written document in the legacy format
        let doc = r#"[
            ["A", "Am", "C"],
            {
                "A&Am": {"1620000000.5": null, "1620000060.5": 22},
                "A&C": {"1620000001.5": null},
                "Am&C": {"1620000001.5": null}
            }
        ]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        fs::write(&path, doc).unwrap();

        let store = load(&path).unwrap();
        assert_eq!(store.chords().len(), 3);
        assert_eq!(store.scores().len(), 3);
        assert_eq!(store.highscore(&key("A", "Am")), 22);
        assert_eq!(store.last_played(&key("A", "Am")), Some(1_620_000_060.5));
    }

    #[test]
    fn test_corrupt_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_malformed_pair_key_is_fatal() {
        let doc = r#"[["A", "B"], {"A&B&C": {"1.0": null}}]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        fs::write(&path, doc).unwrap();
        assert!(matches!(load(&path), Err(StoreError::MalformedPair(_))));
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let doc = r#"[["A", "B"], {"A&B": {"yesterday": 10}}]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        fs::write(&path, doc).unwrap();
        assert!(matches!(load(&path), Err(StoreError::BadTimestamp(_))));
    }

    #[test]
    fn test_invalid_chord_name_is_fatal() {
        let doc = r#"[["A", "H9"], {}]"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");
        fs::write(&path, doc).unwrap();
        assert!(matches!(load(&path), Err(StoreError::MalformedChord(_))));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.json");

        let mut store = ChordStore::new();
        store.add_chord("A");
        store.add_chord("B");
        save(&store, &path).unwrap();

        store.add_chord("C");
        save(&store, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.chords().len(), 3);
        assert_eq!(loaded.scores().len(), 3);
    }
}
