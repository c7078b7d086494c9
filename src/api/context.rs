//! Context assembly for downstream language models
//!
//! Formats ranked search results into a single textual context block.

use crate::api::retriever::SearchResult;

/// Fixed answer when nothing cleared the similarity threshold
pub const NO_RESULTS_CONTEXT: &str = "No relevant documents found.";

/// Assemble ranked results into a context block.
///
/// Pure function: one labeled block per result in input order (already
/// rank-sorted), carrying the 1-based position, the chunk name, the
/// similarity rounded to two decimals, and the full chunk content. Blocks
/// are separated by a blank line.
pub fn assemble_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_CONTEXT.to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[{}] {} (similarity: {:.2})\n{}",
                i + 1,
                result.chunk.name,
                result.similarity,
                result.chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ChunkRecord;

    fn result(name: &str, content: &str, similarity: f32) -> SearchResult {
        SearchResult {
            chunk: ChunkRecord {
                name: name.to_string(),
                path: format!("/docs/{}", name),
                content: content.to_string(),
                embedding: None,
                indexed_at: None,
            },
            similarity,
        }
    }

    #[test]
    fn test_empty_results_yield_sentinel() {
        assert_eq!(assemble_context(&[]), NO_RESULTS_CONTEXT);
    }

    #[test]
    fn test_blocks_are_labeled_and_ordered() {
        let results = vec![
            result("a.txt_chunk_1", "first block", 0.912),
            result("b.txt_chunk_3", "second block", 0.5),
        ];

        let context = assemble_context(&results);

        assert!(context.starts_with("[1] a.txt_chunk_1 (similarity: 0.91)\nfirst block"));
        assert!(context.contains("\n\n[2] b.txt_chunk_3 (similarity: 0.50)\nsecond block"));
    }

    #[test]
    fn test_similarity_rounds_to_two_decimals() {
        let context = assemble_context(&[result("c", "text", 0.876)]);
        assert!(context.contains("(similarity: 0.88)"));
    }
}
