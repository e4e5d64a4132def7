// Pure assembly of the retrieved-passage block and the augmented prompt


use itertools::Itertools;

use super::RetrievedPassage;

/// One `- {text}` bullet per passage, in retrieval order, joined by newlines.
/// Empty when nothing was retrieved.
#[inline]
pub fn format_passages(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|passage| format!("- {}", passage.text))
        .join("\n")
}

/// Wrap the passage block and the user's own words in labeled sections.
///
/// `raw_query` must be the query as typed, not the embedding-prefixed form.
#[inline]
pub fn build_augmented_prompt(passage_block: &str, raw_query: &str) -> String {
    format!(
        "The following are relevant passages:\n\
         <retrieved-data>\n\
         {passage_block}\n\
         </retrieved-data>\n\
         \n\
         Here's the original user prompt, answer with help of the retrieved passages:\n\
         <user-prompt>\n\
         {raw_query}\n\
         </user-prompt>"
    )
}
