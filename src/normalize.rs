//! Corpus normalization.
//!
//! Extracted texts are concatenated in upload order with no separator,
//! newlines flattened to spaces, English stop-words dropped, and URL
//! substrings removed. URL removal runs on already-joined text, so a URL
//! broken by upstream tokenization may be only partially consumed; this
//! is an accepted lossy transformation.
//!
//! Stop-word matching is per whitespace token, so punctuation glued to a
//! word ("(the", "The,") defeats the match and the word survives into the
//! corpus. Accepted lossiness as well; the corpus feeds statistical
//! models, not exact search.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").unwrap());

/// Fixed English stop-word set, matched case-insensitively.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
        "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
        "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
        "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
        "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
        "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re",
        "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
        "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
        "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
        "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
        "wouldn't",
    ]
    .into_iter()
    .collect()
});

/// Build one normalized corpus string from extracted texts in upload order.
pub fn normalize(texts: &[String]) -> String {
    let combined = texts.concat().replace('\n', " ");
    let filtered = remove_stop_words(&combined);
    URL_PATTERN.replace_all(&filtered, "").into_owned()
}

fn remove_stop_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}
