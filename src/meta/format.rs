use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::SongMeta;

/// `title\tartist\talbum`, one record per line, no trailing newline.
pub fn to_tsv(songs: &[SongMeta]) -> String {
    songs
        .iter()
        .map(|s| format!("{}\t{}\t{}", tsv_field(&s.song_title), tsv_field(&s.artist_name), tsv_field(&s.album_title)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON array indented with four spaces.
pub fn to_json(songs: &[SongMeta]) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    songs.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
pub fn from_json(s: &str) -> Result<Vec<SongMeta>, serde_json::Error> {
    serde_json::from_str(s)
}

// tabs and line breaks would split a record across columns or lines
fn tsv_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_break = false;
    for ch in s.trim().chars() {
        if matches!(ch, '\t' | '\n' | '\r') {
            if !in_break { out.push(' '); }
            in_break = true;
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out
}
