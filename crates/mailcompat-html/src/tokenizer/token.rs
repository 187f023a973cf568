use std::fmt;

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name", lowercased.
    pub name: String,
    /// "and a value", with character references decoded.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Consecutive characters are grouped into one [`Token::Text`]; end of input is
/// the end of the token stream rather than a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// DOCTYPE token. `raw` holds everything between `<!` and `>`, for example
    /// `DOCTYPE html`.
    Doctype {
        /// Declaration text without the surrounding `<!` and `>`.
        raw: String,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// "a tag name", lowercased.
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes on end tags are parsed and discarded.
    EndTag {
        /// "a tag name", lowercased.
        name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// A run of character data. Content of raw text elements such as `<style>`
    /// arrives as a single token, verbatim.
    Text {
        /// The characters, exactly as they appear in the source.
        data: String,
    },
}

impl Token {
    /// Returns the tag name for start and end tags.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// Literal form of a DOCTYPE token, e.g. `<!DOCTYPE html>`.
    #[must_use]
    pub fn doctype_literal(&self) -> Option<String> {
        match self {
            Self::Doctype { raw } => Some(format!("<!{raw}>")),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { raw } => write!(f, "<!{raw}>"),
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, "/")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Text { data } => write!(f, "{data}"),
        }
    }
}

/// A token together with the byte range of its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    /// Byte offset of the first byte of the token.
    pub offset: usize,
    /// Length in bytes of the token's source text.
    pub len: usize,
    /// The token itself.
    pub token: T,
}

impl<T> Spanned<T> {
    /// Byte offset just past the token.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}
