//! Fixed-size word-count chunking.

pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split whitespace-tokenized text into consecutive non-overlapping
/// windows of `chunk_size` words. The final window may be shorter.
/// Empty input yields an empty vec.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_size.max(1))
        .map(|window| window.join(" "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 500).is_empty());
        assert!(chunk_text("   \n\t ", 500).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let chunks = chunk_text("one two three", 500);
        assert_eq!(chunks, vec!["one two three".to_string()]);
    }

    #[test]
    fn every_chunk_except_the_last_is_full() {
        let text = (0..23).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let chunks = chunk_text(&text, 5);

        assert_eq!(chunks.len(), 5);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.split_whitespace().count(), 5);
        }
        assert_eq!(chunks.last().unwrap().split_whitespace().count(), 3);
    }

    #[test]
    fn concatenated_chunks_reproduce_the_token_sequence() {
        let text = "The  quick\nbrown fox   jumps over the lazy dog again and again";
        let original: Vec<&str> = text.split_whitespace().collect();

        let chunks = chunk_text(text, 4);
        let rebuilt: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.split_whitespace().map(|w| w.to_string()))
            .collect();

        assert_eq!(rebuilt, original);
    }
}
