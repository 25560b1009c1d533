//! Display-text cleanup applied to every answer before it is shown.
//!
//! Two steps, in order: capitalize sentence starts (segments split on
//! `". "`), then enforce terminal punctuation. The punctuation fix strips
//! a non-terminal tail character by character until it can append `.`
//! after an alphanumeric or finds one of `.!?`, so an all-punctuation
//! tail terminates with an empty string rather than looping.

/// Clean up a model answer for display.
pub fn postprocess(text: &str) -> String {
    terminal_punctuation(&capitalize_sentences(text))
}

fn capitalize_sentences(input: &str) -> String {
    input
        .split(". ")
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(". ")
}

fn capitalize_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn terminal_punctuation(text: &str) -> String {
    let mut out: Vec<char> = text.chars().collect();
    loop {
        match out.last() {
            None => break,
            Some(c) if c.is_alphanumeric() => {
                out.push('.');
                break;
            }
            Some('.') | Some('!') | Some('?') => break,
            Some(_) => {
                out.pop();
            }
        }
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_period_after_alphanumeric_tail() {
        assert_eq!(postprocess("hello world"), "Hello world.");
    }

    #[test]
    fn existing_terminal_period_is_kept() {
        assert_eq!(postprocess("hello world."), "Hello world.");
    }

    #[test]
    fn trailing_comma_is_replaced() {
        assert_eq!(postprocess("hello world,"), "Hello world.");
    }

    #[test]
    fn question_and_exclamation_marks_are_terminal() {
        assert_eq!(postprocess("is it so?"), "Is it so?");
        assert_eq!(postprocess("yes!"), "Yes!");
    }

    #[test]
    fn each_sentence_start_is_capitalized() {
        assert_eq!(
            postprocess("first part. second part. third"),
            "First part. Second part. Third."
        );
    }

    #[test]
    fn rest_of_sentence_is_untouched() {
        assert_eq!(postprocess("paris is in France"), "Paris is in France.");
    }

    #[test]
    fn all_punctuation_tail_terminates_empty() {
        assert_eq!(postprocess(",;:"), "");
        assert_eq!(postprocess(""), "");
    }

    #[test]
    fn multiple_junk_characters_are_stripped() {
        assert_eq!(postprocess("answer,, "), "Answer.");
    }
}
