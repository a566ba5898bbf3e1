//! Lexical front end for `{{ }}` text templates.
//!
//! Splits template source into literal text, tags, pipeline filters
//! and comments, finding the true end of each tag even when its body
//! holds nested braces, quoted `}}`, template literals or comments.
//! Every token keeps its source offset so later stages can report
//! errors against an exact line and column.
//!
//! # Quick start
//!
//! ```
//! use template_tokenizer::{Token, tokenize};
//!
//! let tokens = tokenize("<h1>{{ message }}</h1>").unwrap();
//! assert_eq!(
//!     tokens[1],
//!     Token::Tag { body: "message".to_string(), position: 4 }
//! );
//! ```
//!
//! ## Filters and trimming
//!
//! ```
//! use template_tokenizer::{Token, TrimConfig, tokenize_with};
//!
//! let tokens = tokenize_with("  {{ name |> upper }}  ", TrimConfig::auto()).unwrap();
//! assert_eq!(tokens[0].body(), "");
//! assert_eq!(tokens[1].body(), "name");
//! assert_eq!(tokens[2], Token::Filter { body: "upper".to_string() });
//! assert_eq!(tokens[3].body(), "");
//! ```
//!
//! ## Reporting errors
//!
//! ```
//! use template_tokenizer::tokenize_template;
//!
//! let err = tokenize_template("page.vto", "<p>\n  {{ user.name </p>", Default::default())
//!     .unwrap_err();
//! assert!(err.to_string().starts_with("Error in template page.vto:2:3"));
//! ```

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod error;
pub mod lexer;
pub mod position;
pub mod scanner;
pub mod token;

pub use error::{Cause, TemplateError, TransformError};
pub use lexer::{ScanError, ScanErrorKind, tokenize, tokenize_with};
pub use position::{LineIndex, Location, locate};
pub use scanner::{FILTER_OPERATOR, split_pipeline};
pub use token::{ParseTrimModeError, Token, TrimConfig, TrimMode};

/// Tokenize a named template, reporting failures against its source.
pub fn tokenize_template(
    path: &str,
    source: &str,
    config: TrimConfig,
) -> Result<Vec<Token>, TemplateError> {
    tokenize_with(source, config).map_err(|err| err.into_template_error(path, source))
}
