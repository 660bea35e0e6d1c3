//! Line-oriented note scanner.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{TagSet, TagValue};

/// Tags whose `<name>` opener always starts a code block, even when the
/// closing marker is missing.
pub const FORMULA_TAGS: &[&str] = &[
    "adaptiveeval",
    "piercingeval",
    "ppiercingeval",
    "mpiercingeval",
    "sealeval",
    "unsealeval",
    "maxeval",
    "speed",
];

/// `<name>` or `<name:value>`; closing markers (`</name>`) never match.
static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([^<>:/][^<>:]*)(?::([^>]*))?>").expect("tag pattern is valid")
});

pub fn is_formula_tag(name: &str) -> bool {
    FORMULA_TAGS.contains(&name)
}

/// Scans a raw note into a [`TagSet`].
///
/// - Lines are split on any run of CR/LF; blank lines are dropped.
/// - `<name:value>` records the verbatim value; `<name>` records a flag.
/// - `<name>` opens a code block when `name` is a formula tag or a matching
///   `</name>` appears on a later line. Lines up to the closing marker are
///   captured, each followed by `\n`. An unclosed block captures to the end
///   of the note. Repeated blocks of one name are concatenated.
/// - `<name>body</name>` on a single line captures `body`.
///
/// Never fails: empty or malformed text yields an empty or partial set.
pub fn extract_tags(note: &str) -> TagSet {
    let lines: Vec<&str> = note
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .collect();
    let lowered: Vec<String> = lines.iter().map(|line| line.to_ascii_lowercase()).collect();

    let mut tags = TagSet::new();
    let mut capturing: Option<String> = None;

    for (index, line) in lines.iter().enumerate() {
        if let Some(name) = capturing.as_deref() {
            if lowered[index].contains(&closing_marker(name)) {
                capturing = None;
            } else {
                tags.append_code(name, &format!("{line}\n"));
            }
            continue;
        }

        let mut cursor = 0;
        while let Some(caps) = TAG_PATTERN.captures_at(line, cursor) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            cursor = whole.end();

            let name = caps
                .get(1)
                .map(|m| m.as_str().trim().to_lowercase())
                .unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            if let Some(value) = caps.get(2) {
                tags.insert(name, TagValue::Literal(value.as_str().to_string()));
                continue;
            }

            let close = closing_marker(&name);
            let rest = &line[whole.end()..];

            // ASCII lowering keeps byte offsets aligned with `rest`.
            if let Some(inline_end) = rest.to_ascii_lowercase().find(&close) {
                let body = rest[..inline_end].trim();
                tags.append_code(&name, &format!("{body}\n"));
                cursor = whole.end() + inline_end + close.len();
                continue;
            }

            let closes_later = lowered[index + 1..]
                .iter()
                .any(|later| later.contains(&close));
            if is_formula_tag(&name) || closes_later {
                tags.append_code(&name, "");
                capturing = Some(name);
                break;
            }

            tags.insert(name, TagValue::Flag);
        }
    }

    tags
}

fn closing_marker(name: &str) -> String {
    format!("</{name}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_note_yields_empty_set() {
        assert!(extract_tags("").is_empty());
        assert!(extract_tags("\r\n\r\n").is_empty());
        assert!(extract_tags("plain description text").is_empty());
    }

    #[test]
    fn flags_and_literals() {
        let tags = extract_tags("<Adaptive>\r\n<piercing:0.4> <nullguard>");
        assert_eq!(tags.get("adaptive"), Some(&TagValue::Flag));
        assert_eq!(tags.literal("piercing"), Some("0.4"));
        assert!(tags.flag("nullguard"));
    }

    #[test]
    fn literal_value_is_verbatim() {
        let tags = extract_tags("<sealtag: Fire , ice>");
        assert_eq!(tags.literal("sealtag"), Some(" Fire , ice"));
    }

    #[test]
    fn block_body_is_newline_joined() {
        let note = "<piercingeval>\n(a.agi - b.agi)\n* 0.01\n</piercingeval>\n<adaptive>";
        let tags = extract_tags(note);
        assert_eq!(tags.code("piercingeval"), Some("(a.agi - b.agi)\n* 0.01\n"));
        assert!(tags.flag("adaptive"));
    }

    #[test]
    fn blank_lines_inside_blocks_are_dropped() {
        let tags = extract_tags("<speed>\n\nspeed += 1;\n\r\n</speed>");
        assert_eq!(tags.code("speed"), Some("speed += 1;\n"));
    }

    #[test]
    fn unclosed_formula_block_captures_to_end() {
        let tags = extract_tags("<sealeval>\na.hpRate() < 0.5\n<sealp>");
        assert_eq!(tags.code("sealeval"), Some("a.hpRate() < 0.5\n<sealp>\n"));
        assert!(!tags.contains("sealp"));
    }

    #[test]
    fn unknown_tag_with_later_close_is_a_block() {
        let tags = extract_tags("<numbercolour>\n\"#FF0000\"\n</numbercolour>");
        assert_eq!(tags.code("numbercolour"), Some("\"#FF0000\"\n"));
    }

    #[test]
    fn inline_block() {
        let tags = extract_tags("<speed>speed += a.atk;</speed>");
        assert_eq!(tags.code("speed"), Some("speed += a.atk;\n"));
    }

    #[test]
    fn inline_block_body_is_not_rescanned() {
        let tags = extract_tags("<sealeval>a.hp < 5 && b.mp > 3</sealeval> <sealp>");
        assert_eq!(tags.code("sealeval"), Some("a.hp < 5 && b.mp > 3\n"));
        assert!(tags.flag("sealp"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn repeated_blocks_concatenate() {
        let note = "<speed>\nspeed += 1;\n</speed>\n<speed>\nspeed *= 2;\n</speed>";
        let tags = extract_tags(note);
        assert_eq!(tags.code("speed"), Some("speed += 1;\nspeed *= 2;\n"));
    }

    #[test]
    fn later_literal_overrides_earlier() {
        let tags = extract_tags("<max:10>\n<max:20>");
        assert_eq!(tags.literal("max"), Some("20"));
    }
}
