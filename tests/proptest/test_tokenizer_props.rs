//! Property-based tests for line tokenizing and prompt rebuilding

use mysh::ai::{PROMPT_CAPACITY, Prompt};
use mysh::command::Streams;
use mysh::config::BackendConfig;
use mysh::env::Environment;
use mysh::io_adapters::MemWriter;
use mysh::lexer::{TOKEN_DELIMITERS, split_into_tokens};
use mysh::{DispatchOutcome, Interpreter, ShellError};
use proptest::prelude::*;
use std::collections::HashMap;

fn delimiter_run() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(TOKEN_DELIMITERS.to_vec()), 1..4)
        .prop_map(|chars: Vec<char>| chars.into_iter().collect::<String>())
}

proptest! {
    #[test]
    fn test_tokenize_doesnt_panic(s in "\\PC*") {
        let _ = split_into_tokens(&s);
    }

    #[test]
    fn test_whitespace_only_lines_have_no_tokens(s in "[ \t\r\n\u{7}]{0,40}") {
        let argv = split_into_tokens(&s);
        prop_assert!(argv.is_empty());
        prop_assert_eq!(argv.command(), None);
    }

    #[test]
    fn test_blank_lines_dispatch_to_silent_continue(s in "[ \t\r\n\u{7}]{0,40}") {
        let env = Environment::with_dir(HashMap::new(), std::env::temp_dir());
        let mut sh = Interpreter::with_backend(env, BackendConfig::default());
        let (mut out, out_handle) = MemWriter::with_handle();
        let (mut err, err_handle) = MemWriter::with_handle();
        let outcome = sh.run_line(&s, &mut Streams { out: &mut out, err: &mut err });
        prop_assert_eq!(outcome, DispatchOutcome::Continue);
        prop_assert!(out_handle.borrow().is_empty());
        prop_assert!(err_handle.borrow().is_empty());
    }

    #[test]
    fn test_tokens_are_maximal_nonblank_runs(
        words in prop::collection::vec("[^ \t\r\n\u{7}]{1,12}", 0..10),
        leading in "[ \t]{0,3}",
        trailing in "[ \t\r\n]{0,3}",
        separators in prop::collection::vec(delimiter_run(), 10),
    ) {
        let mut line = leading.clone();
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                line.push_str(&separators[i]);
            }
            line.push_str(word);
        }
        line.push_str(&trailing);

        let argv = split_into_tokens(&line);
        prop_assert_eq!(argv.len(), words.len());
        prop_assert!(argv.iter().all(|t| !t.is_empty()));
        let tokens: Vec<&str> = argv.iter().collect();
        let expected: Vec<&str> = words.iter().map(String::as_str).collect();
        prop_assert_eq!(tokens, expected);
    }

    #[test]
    fn test_prompt_rebuild_matches_single_spaced_text(
        words in prop::collection::vec("[a-z]{1,8}", 1..20),
    ) {
        let line = format!("ai: {}", words.join("  \t "));
        let argv = split_into_tokens(&line);
        let suffix = argv.command().unwrap().strip_prefix("ai:").unwrap();
        let prompt = Prompt::from_tokens(suffix, argv.args()).unwrap();
        prop_assert_eq!(prompt.as_str(), words.join(" "));
    }

    #[test]
    fn test_long_prompts_are_bounded(word_len in 1usize..64, count in 1usize..200) {
        let words = vec!["w".repeat(word_len); count];
        let rest: Vec<&str> = words.iter().map(String::as_str).collect();
        let len = word_len * count + (count - 1);
        match Prompt::from_tokens("", &rest) {
            Ok(prompt) => {
                prop_assert!(len <= PROMPT_CAPACITY);
                prop_assert_eq!(prompt.as_str().len(), len);
            }
            Err(ShellError::PromptTooLong { len: reported, capacity }) => {
                prop_assert!(len > PROMPT_CAPACITY);
                prop_assert_eq!(reported, len);
                prop_assert_eq!(capacity, PROMPT_CAPACITY);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

#[test]
fn test_joke_prompt_round_trip() {
    let argv = split_into_tokens("ai: tell me a joke");
    let suffix = argv.command().unwrap().strip_prefix("ai:").unwrap();
    let prompt = Prompt::from_tokens(suffix, argv.args()).unwrap();
    assert_eq!(prompt.as_str(), "tell me a joke");
}
