//! Rally parsing: tokenizer and outcome classifier.

pub mod outcome;
pub mod token;

pub use outcome::{split_token, ClassifiedToken, Outcome, CONTINUE_KEY};
pub use token::{tokenize, Tokens};
