use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// TimeLabel is the time shown next to a commentary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TimeLabel {
    PreRace,
    Elapsed(String),
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeLabel::PreRace => write!(f, "PRE"),
            TimeLabel::Elapsed(t) => write!(f, "{}", t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentaryEntry {
    pub time_label: TimeLabel,
    pub text: String,
    pub highlight: bool,
}

/// CommentaryLog is the race commentary feed. Entries are only ever added; the whole feed is
/// dropped when the map is cleared.
#[derive(Debug, Clone, Default)]
pub struct CommentaryLog {
    entries: VecDeque<CommentaryEntry>,
}

impl CommentaryLog {
    pub fn new() -> CommentaryLog {
        CommentaryLog::default()
    }

    pub fn push(&mut self, entry: CommentaryEntry) {
        self.entries.push_front(entry);
    }

    /// entries iterates newest entry first.
    pub fn entries(&self) -> impl Iterator<Item = &CommentaryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&CommentaryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> CommentaryEntry {
        CommentaryEntry {
            time_label: TimeLabel::PreRace,
            text: text.to_owned(),
            highlight: false,
        }
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut log = CommentaryLog::new();
        log.push(entry("Track boundary defined."));
        log.push(entry("Start line set."));

        let texts: Vec<&str> = log.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["Start line set.", "Track boundary defined."]);
        assert_eq!(log.latest().unwrap().text, "Start line set.");
    }

    #[test]
    fn labels_render_like_the_race_clock() {
        assert_eq!(TimeLabel::PreRace.to_string(), "PRE");
        assert_eq!(TimeLabel::Elapsed("00:01.20".to_owned()).to_string(), "00:01.20");
    }
}
