use crate::vocab::xsd;
use oxsdatatypes::{Boolean, Decimal, Double, Float, Integer};
use std::fmt;
use std::fmt::Write;

/// An RDF statement with every term resolved to an absolute IRI.
///
/// The object is a literal iff `datatype_iri` is non-empty; otherwise it is
/// an IRI. Blank nodes never appear: the parser mints skolem IRIs for them
/// (see [`is_skolem_iri`](crate::is_skolem_iri)).
///
/// The [`Display`](fmt::Display) implementation renders an
/// [N-Triples](https://www.w3.org/TR/n-triples/) line without the trailing
/// newline:
/// ```
/// use oxturtle::Triple;
///
/// let t = Triple {
///     subject_iri: "http://example.com/s".into(),
///     predicate_iri: "http://example.com/p".into(),
///     object: "line one\nline two".into(),
///     datatype_iri: oxturtle::vocab::xsd::STRING.into(),
///     lang_tag: String::new(),
/// };
/// assert_eq!(
///     t.to_string(),
///     "<http://example.com/s> <http://example.com/p> \"line one\\nline two\"^^<http://www.w3.org/2001/XMLSchema#string> ."
/// );
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    /// The subject node, an IRI reference.
    pub subject_iri: String,
    /// The predicate, an IRI reference to its definition.
    pub predicate_iri: String,
    /// The object node: a literal lexical form iff `datatype_iri` is
    /// non-empty, an IRI reference otherwise.
    pub object: String,
    /// Empty means that `object` is an IRI reference.
    pub datatype_iri: String,
    /// Always lower case. When set, `datatype_iri` is fixed to
    /// [`rdf:langString`](crate::vocab::rdf::LANG_STRING).
    pub lang_tag: String,
}

/// An error from one of the typed accessors on [`Triple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DatatypeError {
    /// The triple's datatype IRI is not the requested one.
    #[error("object not an {expected}")]
    Mismatch { expected: &'static str },
    /// The lexical form does not belong to the requested datatype.
    #[error("illegal {expected} syntax")]
    IllegalSyntax { expected: &'static str },
}

impl Triple {
    fn expect_datatype(&self, iri: &str, name: &'static str) -> Result<(), DatatypeError> {
        if self.datatype_iri == iri {
            Ok(())
        } else {
            Err(DatatypeError::Mismatch { expected: name })
        }
    }

    /// Returns the object as an `xsd:string`.
    pub fn xsd_string(&self) -> Result<&str, DatatypeError> {
        self.expect_datatype(xsd::STRING, "xsd:string")?;
        Ok(&self.object)
    }

    /// Returns an `xsd:boolean` object parsed. The lexical space is
    /// exactly `true`, `false`, `1` and `0`.
    pub fn xsd_boolean(&self) -> Result<bool, DatatypeError> {
        self.expect_datatype(xsd::BOOLEAN, "xsd:boolean")?;
        let value: Boolean = self.object.parse().map_err(|_| DatatypeError::IllegalSyntax {
            expected: "xsd:boolean",
        })?;
        Ok(value.into())
    }

    /// Returns an `xsd:decimal` object parsed.
    pub fn xsd_decimal(&self) -> Result<Decimal, DatatypeError> {
        self.expect_datatype(xsd::DECIMAL, "xsd:decimal")?;
        self.object.parse().map_err(|_| DatatypeError::IllegalSyntax {
            expected: "xsd:decimal",
        })
    }

    /// Returns an `xsd:integer` object parsed.
    pub fn xsd_integer(&self) -> Result<Integer, DatatypeError> {
        self.expect_datatype(xsd::INTEGER, "xsd:integer")?;
        self.object.parse().map_err(|_| DatatypeError::IllegalSyntax {
            expected: "xsd:integer",
        })
    }

    /// Returns an `xsd:float` object parsed.
    pub fn xsd_float(&self) -> Result<Float, DatatypeError> {
        self.expect_datatype(xsd::FLOAT, "xsd:float")?;
        self.object.parse().map_err(|_| DatatypeError::IllegalSyntax {
            expected: "xsd:float",
        })
    }

    /// Returns an `xsd:double` object parsed.
    pub fn xsd_double(&self) -> Result<Double, DatatypeError> {
        self.expect_datatype(xsd::DOUBLE, "xsd:double")?;
        self.object.parse().map_err(|_| DatatypeError::IllegalSyntax {
            expected: "xsd:double",
        })
    }

    /// Returns an `xsd:anyURI` object's lexical form. The value space
    /// admits any URI or IRI reference, so there is no syntax check.
    pub fn xsd_any_uri(&self) -> Result<&str, DatatypeError> {
        self.expect_datatype(xsd::ANY_URI, "xsd:anyURI")?;
        Ok(&self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.datatype_iri.is_empty() {
            return write!(
                f,
                "<{}> <{}> <{}> .",
                self.subject_iri, self.predicate_iri, self.object
            );
        }
        write!(f, "<{}> <{}> ", self.subject_iri, self.predicate_iri)?;
        print_quoted_str(&self.object, f)?;
        if self.lang_tag.is_empty() {
            write!(f, "^^<{}> .", self.datatype_iri)
        } else {
            write!(f, "@{} .", self.lang_tag)
        }
    }
}

fn print_quoted_str(string: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '\u{8}' => f.write_str("\\b"),
            '\t' => f.write_str("\\t"),
            '\n' => f.write_str("\\n"),
            '\u{C}' => f.write_str("\\f"),
            '\r' => f.write_str("\\r"),
            '"' => f.write_str("\\\""),
            '\\' => f.write_str("\\\\"),
            '\0'..='\u{1F}' | '\u{7F}' => write!(f, "\\u{:04X}", u32::from(c)),
            _ => f.write_char(c),
        }?;
    }
    f.write_char('"')
}
