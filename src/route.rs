//! Intent routing for user queries.
//!
//! The router tokenizes the question, lowercases and lemmatizes each
//! token, and inspects only the FIRST token: `summarise`/`summarize`
//! routes to [`Intent::Summarize`], anything else to [`Intent::Answer`].
//!
//! The first-token policy is position-sensitive on purpose: "please
//! summarize this" routes to Answer. That behavior is reproducible and
//! regression-tested; do not widen the check.

use crate::models::Intent;

/// Route a question to a summarization or answering intent.
pub fn route(question: &str) -> Intent {
    let first = tokenize(question).into_iter().next();
    match first {
        Some(token) if is_summarize(&lemmatize(&token.to_lowercase())) => Intent::Summarize,
        _ => Intent::Answer,
    }
}

fn is_summarize(lemma: &str) -> bool {
    lemma == "summarise" || lemma == "summarize"
}

/// Split into word tokens on non-alphanumeric boundaries, keeping
/// apostrophes inside contractions.
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect()
}

/// Light English lemmatizer: strips possessives and common plural /
/// inflection suffixes. Coarse by design; the router only needs
/// inflections of "summarize" to collapse onto their lemma.
fn lemmatize(token: &str) -> String {
    let token = token.strip_suffix("'s").unwrap_or(token);

    if let Some(stem) = token.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["xes", "ches", "shes"] {
        if let Some(stem) = token.strip_suffix(suffix) {
            if !stem.is_empty() {
                // "boxes" -> "box", "benches" -> "bench"
                return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
            }
        }
    }
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us")
    {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}
