//! Splitting an uploaded document into page-store records
//!
//! ATX heading lines become heading markers at their level; the body text
//! between headings is chunked into pages of at most `page_size` characters,
//! preferring blank-line boundaries so paragraphs stay whole. The caller
//! appends the resulting records to the page store in order, which preserves
//! the reading sequence through the store's monotonic ids.

/// One paginated record before insertion: content plus heading level
/// (0 = body page, >0 = heading marker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated {
    pub content: String,
    pub heading: u32,
}

/// Splits `text` into heading markers and body pages of at most `page_size`
/// characters.
pub fn paginate(text: &str, page_size: usize) -> Vec<Paginated> {
    let mut records = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    let flush_paragraph = |current: &mut String, paragraphs: &mut Vec<String>| {
        if !current.trim().is_empty() {
            paragraphs.push(current.trim_end().to_string());
        }
        current.clear();
    };

    for line in text.lines() {
        if let Some((level, title)) = heading_line(line) {
            flush_paragraph(&mut current, &mut paragraphs);
            pack_pages(&mut records, &mut paragraphs, page_size);
            records.push(Paginated {
                content: title.to_string(),
                heading: level,
            });
        } else if line.trim().is_empty() {
            flush_paragraph(&mut current, &mut paragraphs);
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    flush_paragraph(&mut current, &mut paragraphs);
    pack_pages(&mut records, &mut paragraphs, page_size);
    records
}

/// Parses an ATX heading line into (level, title).
fn heading_line(line: &str) -> Option<(u32, &str)> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.starts_with(' ') && !rest.is_empty() {
        return None;
    }
    let title = rest.trim();
    if title.is_empty() {
        return None;
    }
    Some((hashes as u32, title))
}

/// Packs accumulated paragraphs into body pages of at most `page_size`
/// characters, hard-splitting any paragraph that is itself over the limit.
fn pack_pages(records: &mut Vec<Paginated>, paragraphs: &mut Vec<String>, page_size: usize) {
    let mut page = String::new();
    for paragraph in paragraphs.drain(..) {
        for piece in split_oversized(&paragraph, page_size) {
            let needed = if page.is_empty() {
                piece.chars().count()
            } else {
                page.chars().count() + 2 + piece.chars().count()
            };
            if !page.is_empty() && needed > page_size {
                records.push(Paginated {
                    content: std::mem::take(&mut page),
                    heading: 0,
                });
            }
            if !page.is_empty() {
                page.push_str("\n\n");
            }
            page.push_str(&piece);
        }
    }
    if !page.is_empty() {
        records.push(Paginated {
            content: page,
            heading: 0,
        });
    }
}

fn split_oversized(paragraph: &str, page_size: usize) -> Vec<String> {
    if paragraph.chars().count() <= page_size {
        return vec![paragraph.to_string()];
    }
    let chars: Vec<char> = paragraph.chars().collect();
    chars
        .chunks(page_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_become_markers_at_their_level() {
        let records = paginate("# Book\n\nintro text\n\n## Chapter\n\nbody text\n", 1000);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0], Paginated { content: "Book".into(), heading: 1 });
        assert_eq!(records[1], Paginated { content: "intro text".into(), heading: 0 });
        assert_eq!(records[2], Paginated { content: "Chapter".into(), heading: 2 });
        assert_eq!(records[3], Paginated { content: "body text".into(), heading: 0 });
    }

    #[test]
    fn paragraphs_pack_into_bounded_pages() {
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(60), "b".repeat(60), "c".repeat(60));
        let records = paginate(&text, 130);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.content.chars().count() <= 130));
        assert!(records[0].content.contains("aaa"));
        assert!(records[0].content.contains("bbb"));
        assert!(records[1].content.contains("ccc"));
    }

    #[test]
    fn oversized_paragraph_is_hard_split() {
        let text = "x".repeat(250);
        let records = paginate(&text, 100);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.content.chars().count() <= 100));
        let total: usize = records.iter().map(|r| r.content.chars().count()).sum();
        assert_eq!(total, 250);
    }

    #[test]
    fn non_heading_hashes_stay_in_body() {
        let records = paginate("#!/bin/sh\necho hi\n", 1000);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heading, 0);
    }

    #[test]
    fn plain_text_without_headings_is_one_stream_of_pages() {
        let records = paginate("just one paragraph", 1000);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "just one paragraph");
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "汉".repeat(150);
        let records = paginate(&text, 100);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.content.chars().count() <= 100));
    }
}
