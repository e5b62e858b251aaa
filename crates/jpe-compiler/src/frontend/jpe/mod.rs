//! JPE front-end.
//!
//! JPE is a sectioned, line-oriented format:
//!
//! ```text
//! [Buffs]
//! id: happy_buff
//! display_name: STR_HAPPY
//! duration: 120
//! end
//! ```

pub(crate) mod fields;
mod lexer;
mod parser;
pub(crate) mod values;

pub use fields::{Cardinality, EntitySection, FieldSpec, SectionEntry};
pub use lexer::normalize_key;
pub use parser::{parse, ParserState};

use super::{Frontend, ParseOutput};

/// JPE front-end implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpeFrontend;

impl JpeFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for JpeFrontend {
    type Input = str;

    fn language(&self) -> &str {
        "jpe"
    }

    fn parse(&self, input: &str) -> ParseOutput {
        parse(input)
    }
}
