#![allow(dead_code)]

use template_tokenizer::Token;

pub fn lit(text: &str, position: usize) -> Token {
    Token::Literal {
        text: text.to_string(),
        position,
    }
}

pub fn tag(body: &str, position: usize) -> Token {
    Token::Tag {
        body: body.to_string(),
        position,
    }
}

pub fn filter(body: &str) -> Token {
    Token::Filter {
        body: body.to_string(),
    }
}

pub fn comment(body: &str, position: usize) -> Token {
    Token::Comment {
        body: body.to_string(),
        position,
    }
}

/// Check that every literal token is an untouched slice of the source
/// and that positions never go backwards.
pub fn assert_positions(source: &str, tokens: &[Token]) {
    let mut last = 0;
    for token in tokens {
        if let Some(position) = token.position() {
            assert!(
                position >= last,
                "position went backwards at {token:?}\n--- source ---\n{source}"
            );
            last = position;
        }
        if let Token::Literal { text, position } = token {
            assert!(
                source[*position..].contains(text.as_str()),
                "literal {text:?} not found after {position}\n--- source ---\n{source}"
            );
        }
    }
}
