//! Streaming parser for the [Turtle](https://www.w3.org/TR/turtle/)
//! serialization of RDF, implemented by [`TurtleReader`].
//!
//! The parser reads one statement at a time from a buffered byte stream and
//! appends the resulting [`Triple`]s to a caller-owned buffer. All IRIs in
//! the output are absolute: relative references are resolved against the
//! prevailing base IRI, prefixed names are expanded, and blank nodes are
//! replaced with globally unique skolem IRIs under [`SKOLEM_IRI_ROOT`].
//!
//! Count the number of people:
//! ```
//! use oxturtle::TurtleReader;
//!
//! let file = br#"@base <http://example.com/> .
//! @prefix schema: <http://schema.org/> .
//! <foo> a schema:Person ;
//!     schema:name "Foo" .
//! <bar> a schema:Person ;
//!     schema:name "Bar" ."#;
//!
//! let mut triples = Vec::new();
//! let mut reader = TurtleReader::new(file.as_slice());
//! while reader.read_append(&mut triples)? {}
//!
//! let count = triples
//!     .iter()
//!     .filter(|t| {
//!         t.predicate_iri == oxturtle::vocab::rdf::TYPE
//!             && t.object == "http://schema.org/Person"
//!     })
//!     .count();
//! assert_eq!(2, count);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

mod error;
mod line;
mod literal;
mod reader;
mod skolem;
mod triple;
pub mod vocab;

pub use crate::error::{TurtleParseError, TurtleSyntaxError};
pub use crate::reader::{IntoTriples, PrefixesIter, TurtleReader};
pub use crate::skolem::{is_skolem_iri, SKOLEM_IRI_ROOT};
pub use crate::triple::{DatatypeError, Triple};
pub use oxiri::IriParseError;

pub(crate) const MAX_LINE_SIZE: usize = 4096 * 4096;
