use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GameError, GameResult};

const MAGIC: &[u8; 4] = b"RVH1";
pub const NAME_BYTES: usize = 8;
// Each entry: 8 bytes name + 4 bytes score + 4 bytes level
const ENTRY_SIZE: usize = NAME_BYTES + 8;
// Header: 4 magic + 1 entry count
const HEADER_SIZE: usize = 5;
/// Hard upper bound on stored entries, whatever the configured capacity.
pub const MAX_STORED: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    pub level: u32,
}

impl HighScoreEntry {
    pub fn new(name: &str, score: u32, level: u32) -> Self {
        let name: String = name
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .take(NAME_BYTES)
            .collect();
        HighScoreEntry { name, score, level }
    }
}

/// The table a fresh install starts with, and what `reset` restores.
pub fn default_entries() -> Vec<HighScoreEntry> {
    [
        ("ALIEN", 1000, 3),
        ("LASER", 800, 2),
        ("CANON", 600, 2),
        ("SAUCR", 400, 1),
        ("BUNKR", 200, 1),
        ("CRAB", 150, 1),
        ("SQUID", 100, 1),
        ("OCTO", 75, 1),
        ("UFO", 50, 1),
        ("ZAP", 25, 1),
    ]
    .iter()
    .map(|&(name, score, level)| HighScoreEntry::new(name, score, level))
    .collect()
}

/// Raw persistence for the high-score list. `read` returns `Ok(None)` when
/// nothing has been stored yet.
pub trait ScoreStore {
    fn read(&mut self) -> GameResult<Option<Vec<HighScoreEntry>>>;
    fn write(&mut self, entries: &[HighScoreEntry]) -> GameResult<()>;
    fn clear(&mut self) -> GameResult<()>;
}

// ── File store ───────────────────────────────────────────────────────────

pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store next to the executable.
    pub fn default_path() -> PathBuf {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join("rustvaders.scores");
            }
        }
        PathBuf::from("rustvaders.scores")
    }
}

fn decode(data: &[u8]) -> GameResult<Vec<HighScoreEntry>> {
    if data.len() < HEADER_SIZE {
        return Err(GameError::CorruptScores(format!("{} byte file", data.len())));
    }
    if &data[0..4] != MAGIC {
        return Err(GameError::CorruptScores("bad magic".to_string()));
    }
    let count = data[4] as usize;
    if count > MAX_STORED {
        return Err(GameError::CorruptScores(format!("{} entries", count)));
    }
    if data.len() < HEADER_SIZE + count * ENTRY_SIZE {
        return Err(GameError::CorruptScores("truncated".to_string()));
    }

    let mut entries = Vec::with_capacity(count);
    let mut offset = HEADER_SIZE;
    for _ in 0..count {
        let name_bytes = &data[offset..offset + NAME_BYTES];
        let name = String::from_utf8_lossy(name_bytes)
            .trim_end_matches('\0')
            .to_string();
        offset += NAME_BYTES;

        let score = read_u32(&data[offset..offset + 4]);
        offset += 4;
        let level = read_u32(&data[offset..offset + 4]);
        offset += 4;

        entries.push(HighScoreEntry::new(&name, score, level));
    }
    Ok(entries)
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn encode(entries: &[HighScoreEntry]) -> Vec<u8> {
    let count = entries.len().min(MAX_STORED);
    let mut buf = Vec::with_capacity(HEADER_SIZE + count * ENTRY_SIZE);
    buf.extend_from_slice(MAGIC);
    buf.push(count as u8);
    for entry in &entries[..count] {
        // Name padded with zeros
        let name_bytes = entry.name.as_bytes();
        let len = name_bytes.len().min(NAME_BYTES);
        buf.extend_from_slice(&name_bytes[..len]);
        buf.resize(buf.len() + NAME_BYTES - len, 0);
        buf.extend_from_slice(&entry.score.to_le_bytes());
        buf.extend_from_slice(&entry.level.to_le_bytes());
    }
    buf
}

impl ScoreStore for FileScoreStore {
    fn read(&mut self) -> GameResult<Option<Vec<HighScoreEntry>>> {
        match fs::read(&self.path) {
            Ok(data) => decode(&data).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, entries: &[HighScoreEntry]) -> GameResult<()> {
        fs::write(&self.path, encode(entries))?;
        Ok(())
    }

    fn clear(&mut self) -> GameResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// ── In-memory store ──────────────────────────────────────────────────────

/// Store that never touches the disk. Used when no score file is wanted
/// and by tests.
#[derive(Default)]
pub struct MemoryScoreStore {
    saved: Option<Vec<HighScoreEntry>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `entries`, as if saved by an earlier run.
    pub fn with_entries(entries: Vec<HighScoreEntry>) -> Self {
        Self { saved: Some(entries) }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn read(&mut self) -> GameResult<Option<Vec<HighScoreEntry>>> {
        Ok(self.saved.clone())
    }

    fn write(&mut self, entries: &[HighScoreEntry]) -> GameResult<()> {
        self.saved = Some(entries.to_vec());
        Ok(())
    }

    fn clear(&mut self) -> GameResult<()> {
        self.saved = None;
        Ok(())
    }
}

// ── Table ────────────────────────────────────────────────────────────────

/// Ordered top-N list. Always sorted by score descending and never longer
/// than its capacity.
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
    capacity: usize,
    store: Box<dyn ScoreStore>,
}

impl HighScores {
    pub fn load(store: Box<dyn ScoreStore>, capacity: usize) -> Self {
        let mut table = HighScores {
            entries: Vec::new(),
            capacity: capacity.clamp(1, MAX_STORED),
            store,
        };
        table.reload();
        table
    }

    fn reload(&mut self) {
        self.entries = match self.store.read() {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                let defaults = default_entries();
                if let Err(err) = self.store.write(&defaults) {
                    tracing::warn!("could not seed high scores: {}", err);
                }
                defaults
            }
            Err(err) => {
                tracing::warn!("falling back to default high scores: {}", err);
                default_entries()
            }
        };
        self.normalize();
    }

    fn normalize(&mut self) {
        // Stable, so an equal score never jumps ahead of an older entry
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
    }

    /// True iff the table has room or `score` beats the lowest entry.
    pub fn is_high_score(&self, score: u32) -> bool {
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries
            .iter()
            .map(|e| e.score)
            .min()
            .map_or(true, |lowest| score > lowest)
    }

    pub fn add(&mut self, name: &str, score: u32, level: u32) {
        self.entries.push(HighScoreEntry::new(name, score, level));
        self.normalize();
        tracing::info!(name, score, level, "high score recorded");
        self.save();
    }

    fn save(&mut self) {
        if let Err(err) = self.store.write(&self.entries) {
            tracing::warn!("could not save high scores: {}", err);
        }
    }

    /// Wipe persisted scores and start over from the defaults.
    pub fn reset(&mut self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!("could not clear high scores: {}", err);
        }
        self.reload();
        tracing::info!("high scores reset");
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn top_score(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.score)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_table() -> HighScores {
        HighScores::load(Box::new(MemoryScoreStore::with_entries(Vec::new())), MAX_STORED)
    }

    fn scores(table: &HighScores) -> Vec<u32> {
        table.entries().iter().map(|e| e.score).collect()
    }

    #[test]
    fn inserts_are_kept_sorted() {
        let mut table = empty_table();
        for score in [50, 999, 200] {
            table.add("AAAAA", score, 1);
        }
        assert_eq!(scores(&table), vec![999, 200, 50]);
    }

    #[test]
    fn full_table_evicts_lowest() {
        let mut table = HighScores::load(Box::new(MemoryScoreStore::new()), MAX_STORED);
        assert_eq!(table.entries().len(), 10);
        table.add("NEW", 30, 1);
        assert_eq!(table.entries().len(), 10);
        assert_eq!(*scores(&table).last().unwrap(), 30);
        assert!(table.entries().iter().all(|e| e.name != "ZAP"));
    }

    #[test]
    fn equal_to_minimum_does_not_qualify() {
        let table = HighScores::load(Box::new(MemoryScoreStore::new()), MAX_STORED);
        assert!(!table.is_high_score(25));
        assert!(table.is_high_score(26));
    }

    #[test]
    fn room_left_always_qualifies() {
        let table = empty_table();
        assert!(table.is_high_score(0));
    }

    #[test]
    fn equal_score_lands_after_existing_entry() {
        let mut table = empty_table();
        table.add("FIRST", 100, 1);
        table.add("SECND", 100, 2);
        assert_eq!(table.entries()[0].name, "FIRST");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut table = HighScores::load(Box::new(MemoryScoreStore::new()), MAX_STORED);
        table.add("TOP", 5000, 9);
        table.reset();
        assert_eq!(table.entries(), default_entries().as_slice());
        table.reset();
        assert_eq!(table.entries(), default_entries().as_slice());
    }

    #[test]
    fn names_are_clipped_to_field_width() {
        let entry = HighScoreEntry::new("ABCDEFGHIJKL", 1, 1);
        assert_eq!(entry.name, "ABCDEFGH");
    }

    #[test]
    fn corrupt_bytes_are_rejected() {
        assert!(decode(b"RV").is_err());
        assert!(decode(b"XXXX\x00").is_err());
        assert!(decode(b"RVH1\x0b").is_err());
        assert!(decode(b"RVH1\x02").is_err());
    }
}
