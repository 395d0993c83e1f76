//! Quoted-literal and numeric-literal recognition for [`TurtleReader`].

use crate::error::{unexpected_eof, TurtleParseError};
use crate::reader::{Name, TurtleReader};
use crate::triple::Triple;
use crate::vocab::{rdf, xsd};
use memchr::memchr2;
use std::io::BufRead;

impl<R: BufRead> TurtleReader<R> {
    /// Continues from the opening quote, short or long form.
    pub(crate) fn read_quoted(
        &mut self,
        delim: u8,
        t: &mut Triple,
    ) -> Result<(), TurtleParseError> {
        let bytes = self.cursor.line.as_bytes();
        if bytes.get(self.cursor.pos + 1) == Some(&delim)
            && bytes.get(self.cursor.pos + 2) == Some(&delim)
        {
            self.read_long_quoted(delim, t)
        } else {
            self.read_short_quoted(delim, t)
        }
    }

    // [22] STRING_LITERAL_QUOTE        ::= '"' ([^#x22#x5C#xA#xD] | ECHAR | UCHAR)* '"'
    // [23] STRING_LITERAL_SINGLE_QUOTE ::= "'" ([^#x27#x5C#xA#xD] | ECHAR | UCHAR)* "'"
    fn read_short_quoted(&mut self, delim: u8, t: &mut Triple) -> Result<(), TurtleParseError> {
        let mut out = String::new();
        let mut i = self.cursor.pos + 1;
        loop {
            let at = {
                let rest = &self.cursor.line.as_bytes()[i..];
                match memchr2(delim, b'\\', rest) {
                    Some(at) if memchr2(b'\n', b'\r', &rest[..at]).is_none() => at,
                    Some(_) => {
                        return Err(self.cursor.syntax("new line in quoted literal").into());
                    }
                    None if memchr2(b'\n', b'\r', rest).is_some() => {
                        return Err(self.cursor.syntax("new line in quoted literal").into());
                    }
                    None => return Err(unexpected_eof("quoted literal not closed").into()),
                }
            };
            out.push_str(&self.cursor.line[i..i + at]);
            i += at;
            if self.cursor.line.as_bytes()[i] == delim {
                self.cursor.pos = i + 1;
                t.object = out;
                return Ok(());
            }
            let (c, next) = self.decode_echar(i)?;
            out.push(c);
            i = next;
        }
    }

    // [24] STRING_LITERAL_LONG_SINGLE_QUOTE ::= "'''" (("'" | "''")? ([^'\] | ECHAR | UCHAR))* "'''"
    // [25] STRING_LITERAL_LONG_QUOTE        ::= '"""' (('"' | '""')? ([^"\] | ECHAR | UCHAR))* '"""'
    fn read_long_quoted(&mut self, delim: u8, t: &mut Triple) -> Result<(), TurtleParseError> {
        let mut out = String::new();
        let mut i = self.cursor.pos + 3;
        loop {
            match memchr2(delim, b'\\', &self.cursor.line.as_bytes()[i..]) {
                None => {
                    // content runs to the end of the line, newline included
                    out.push_str(&self.cursor.line[i..]);
                    self.cursor.expect_raw_line("long quoted literal not closed")?;
                    i = 0;
                }
                Some(at) => {
                    let j = i + at;
                    let bytes = self.cursor.line.as_bytes();
                    if bytes[j] == b'\\' {
                        out.push_str(&self.cursor.line[i..j]);
                        let (c, next) = self.decode_echar(j)?;
                        out.push(c);
                        i = next;
                    } else if bytes.get(j + 1) == Some(&delim)
                        && bytes.get(j + 2) == Some(&delim)
                        && bytes.get(j + 3) != Some(&delim)
                    {
                        // last three quotes of the run terminate; surplus
                        // quotes before them are content
                        out.push_str(&self.cursor.line[i..j]);
                        self.cursor.pos = j + 3;
                        t.object = out;
                        return Ok(());
                    } else {
                        out.push_str(&self.cursor.line[i..=j]);
                        i = j + 1;
                    }
                }
            }
        }
    }

    // [26]   UCHAR ::= '\u' HEX HEX HEX HEX | '\U' HEX HEX HEX HEX HEX HEX HEX HEX
    // [159s] ECHAR ::= '\' [tbnrf"'\]
    pub(crate) fn decode_echar(&self, at: usize) -> Result<(char, usize), TurtleParseError> {
        let c = match self.cursor.line.as_bytes().get(at + 1) {
            Some(b't') => '\t',
            Some(b'b') => '\u{8}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b'f') => '\u{C}',
            Some(b'"') => '"',
            Some(b'\'') => '\'',
            Some(b'\\') => '\\',
            Some(b'u') => return self.decode_hex(at + 2, 4),
            Some(b'U') => return self.decode_hex(at + 2, 8),
            Some(b'\n' | b'\r') | None => {
                return Err(self.cursor.syntax("escape interrupted").into());
            }
            Some(&other) => {
                return Err(self
                    .cursor
                    .syntax(format!("unknown escape sequence \\{}", char::from(other)))
                    .into());
            }
        };
        Ok((c, at + 2))
    }

    /// Continues after the closing quote: `^^` datatype, `@` language tag,
    /// or neither, in which case the literal is an `xsd:string`.
    pub(crate) fn read_literal_suffix(&mut self, t: &mut Triple) -> Result<(), TurtleParseError> {
        match self.cursor.peek() {
            Some(b'^') => self.read_datatype_suffix(t),
            Some(b'@') => self.read_lang_tag(t),
            _ => {
                // "If there is no datatype IRI and no language tag, the
                // datatype is xsd:string." (RDF 1.1 Turtle, subsection 2.5.1)
                t.datatype_iri = xsd::STRING.to_owned();
                Ok(())
            }
        }
    }

    /// Continues from `^` in the buffer.
    fn read_datatype_suffix(&mut self, t: &mut Triple) -> Result<(), TurtleParseError> {
        if self.cursor.line.as_bytes().get(self.cursor.pos + 1) != Some(&b'^') {
            return Err(self
                .cursor
                .syntax(r#"single "^" after quoted string"#)
                .into());
        }
        self.cursor.pos += 2;
        match self.cursor.peek() {
            Some(b'<') => {
                t.datatype_iri = self.read_iri_ref()?;
                Ok(())
            }
            Some(_) => match self.scan_name("datatype")? {
                Name::Iri(iri) => {
                    t.datatype_iri = iri;
                    Ok(())
                }
                Name::Keyword(_) => Err(self.cursor.syntax("datatype missing prefix").into()),
            },
            None => Err(unexpected_eof("datatype interrupted").into()),
        }
    }

    /// Continues from `@` in the buffer. The tag is a letter-only primary
    /// subtag followed by `-`-separated letter-or-digit subtags, each
    /// starting with a letter; the stored value is lower case.
    fn read_lang_tag(&mut self, t: &mut Triple) -> Result<(), TurtleParseError> {
        // "If the LANGTAG rule matched, the datatype is rdf:langString"
        // (RDF 1.1 Turtle, subsection 7.2)
        t.datatype_iri = rdf::LANG_STRING.to_owned();

        let tag_len = {
            let bytes = &self.cursor.line.as_bytes()[self.cursor.pos + 1..];
            let mut in_primary = true;
            let mut subtag_start = 0;
            let mut end = None;
            for (i, &b) in bytes.iter().enumerate() {
                match b {
                    b'A'..=b'Z' | b'a'..=b'z' => {}
                    b'0'..=b'9' => {
                        // the primary subtag is letters only; later subtags
                        // may contain digits after a leading letter
                        if in_primary || i == subtag_start {
                            return Err(self
                                .cursor
                                .syntax("decimal in first code of language tag")
                                .into());
                        }
                    }
                    b'-' => {
                        if i == subtag_start {
                            return Err(self
                                .cursor
                                .syntax("empty code in language tag")
                                .into());
                        }
                        in_primary = false;
                        subtag_start = i + 1;
                    }
                    b' ' | b'\t' | b'\r' | b'\n' | b'.' | b',' | b';' | b')' | b']' => {
                        if i == subtag_start {
                            return Err(self
                                .cursor
                                .syntax("empty code in language tag")
                                .into());
                        }
                        end = Some(i);
                        break;
                    }
                    _ => {
                        return Err(self
                            .cursor
                            .syntax("illegal character in language tag")
                            .into());
                    }
                }
            }
            match end {
                Some(end) => end,
                None => return Err(unexpected_eof("language tag interrupted").into()),
            }
        };
        t.lang_tag = self.cursor.line[self.cursor.pos + 1..self.cursor.pos + 1 + tag_len]
            .to_ascii_lowercase();
        self.cursor.pos += 1 + tag_len;
        Ok(())
    }

    // [19]   INTEGER  ::= [+-]? [0-9]+
    // [20]   DECIMAL  ::= [+-]? [0-9]* '.' [0-9]+
    // [21]   DOUBLE   ::= [+-]? ([0-9]+ '.' [0-9]* EXPONENT | '.' [0-9]+ EXPONENT | [0-9]+ EXPONENT)
    // [154s] EXPONENT ::= [eE] [+-]? [0-9]+
    //
    /// Continues from the sign or first digit. The literal must end on
    /// whitespace; the object keeps the source bytes unchanged.
    pub(crate) fn read_number(
        &mut self,
        signed: bool,
        t: &mut Triple,
    ) -> Result<(), TurtleParseError> {
        let start = self.cursor.pos;
        let (end, datatype) = {
            let bytes = self.cursor.line.as_bytes();
            let mut i = start;
            if signed {
                i += 1;
            }
            let int_digits = digits_from(bytes, i);
            i += int_digits;

            let Some(&b) = bytes.get(i) else {
                return Err(unexpected_eof("number interrupted").into());
            };
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    if int_digits == 0 {
                        return Err(self.cursor.syntax("sign without number").into());
                    }
                    (i, xsd::INTEGER)
                }
                b'.' => {
                    i += 1;
                    let fraction_digits = digits_from(bytes, i);
                    i += fraction_digits;
                    let Some(&b) = bytes.get(i) else {
                        return Err(unexpected_eof("number interrupted").into());
                    };
                    match b {
                        b' ' | b'\t' | b'\r' | b'\n' => {
                            if fraction_digits == 0 {
                                return Err(self
                                    .cursor
                                    .syntax("decimal with empty fraction")
                                    .into());
                            }
                            (i, xsd::DECIMAL)
                        }
                        b'e' | b'E' => {
                            if fraction_digits == 0 {
                                return Err(self
                                    .cursor
                                    .syntax("fraction of double without decimals")
                                    .into());
                            }
                            (self.read_exponent(bytes, i)?, xsd::DOUBLE)
                        }
                        _ => {
                            return Err(self
                                .cursor
                                .syntax("illegal character in fraction")
                                .into());
                        }
                    }
                }
                b'e' | b'E' => {
                    if int_digits == 0 {
                        return Err(self.cursor.syntax("sign without number").into());
                    }
                    (self.read_exponent(bytes, i)?, xsd::DOUBLE)
                }
                _ => return Err(self.cursor.syntax("illegal character in number").into()),
            }
        };
        t.datatype_iri = datatype.to_owned();
        t.object = self.cursor.line[start..end].to_owned();
        self.cursor.pos = end + 1; // pass the terminating whitespace
        Ok(())
    }

    /// Scans `[eE] [+-]? [0-9]+` up to the terminating whitespace; `at`
    /// points at the `e`. Returns the exclusive end of the number.
    fn read_exponent(&self, bytes: &[u8], at: usize) -> Result<usize, TurtleParseError> {
        let mut i = at + 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exponent_digits = digits_from(bytes, i);
        i += exponent_digits;
        let Some(&b) = bytes.get(i) else {
            return Err(unexpected_eof("number interrupted").into());
        };
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                if exponent_digits == 0 {
                    return Err(self.cursor.syntax("no decimals in double exponent").into());
                }
                Ok(i)
            }
            _ => Err(self
                .cursor
                .syntax("illegal character in exponent of double")
                .into()),
        }
    }
}

fn digits_from(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while matches!(bytes.get(i), Some(b'0'..=b'9')) {
        i += 1;
    }
    i - from
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TurtleReader;

    fn object_of(turtle: &str) -> Result<Triple, TurtleParseError> {
        let mut reader = TurtleReader::new(turtle.as_bytes());
        let mut triples = Vec::new();
        reader.read_append(&mut triples)?;
        Ok(triples.pop().unwrap_or_default())
    }

    fn literal(turtle_object: &str) -> Result<Triple, TurtleParseError> {
        object_of(&format!("<http://e/s> <http://e/p> {turtle_object} .\n"))
    }

    #[test]
    fn short_quote_escapes() -> Result<(), TurtleParseError> {
        let t = literal(r#""tab\there\nquote \" backslash \\ bell\b feed\f cr\r""#)?;
        assert_eq!(t.object, "tab\there\nquote \" backslash \\ bell\u{8} feed\u{C} cr\r");
        assert_eq!(t.datatype_iri, xsd::STRING);
        Ok(())
    }

    #[test]
    fn unicode_escapes() -> Result<(), TurtleParseError> {
        let t = literal(r#""A\U0001F600""#)?;
        assert_eq!(t.object, "A\u{1F600}");
        Ok(())
    }

    #[test]
    fn unknown_escape_is_rejected() {
        let err = literal(r#""\x""#).unwrap_err();
        assert_eq!(
            err.to_string(),
            r"Turtle syntax violation on line 1: unknown escape sequence \x"
        );
    }

    #[test]
    fn illegal_hex_in_unicode_escape() {
        let err = literal(r#""\u00ZZ""#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Turtle syntax violation on line 1: illegal hex in Unicode escape"
        );
    }

    #[test]
    fn surrogate_code_point_is_rejected() {
        let err = literal(r#""\uD800""#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Turtle syntax violation on line 1: Unicode escape of illegal code point D800"
        );
    }

    #[test]
    fn newline_in_short_literal() {
        let err = object_of("<http://e/s> <http://e/p> \"broken\nliteral\" .\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Turtle syntax violation on line 1: new line in quoted literal"
        );
    }

    #[test]
    fn long_quote_spans_lines_verbatim() -> Result<(), TurtleParseError> {
        let t = object_of(
            "<http://e/s> <http://e/p> \"\"\"first # not a comment\n  indented\n\nlast\"\"\" .\n",
        )?;
        assert_eq!(t.object, "first # not a comment\n  indented\n\nlast");
        assert_eq!(t.datatype_iri, xsd::STRING);
        Ok(())
    }

    #[test]
    fn long_quote_keeps_surplus_quotes() -> Result<(), TurtleParseError> {
        let t = literal(r#""""a""""""#)?; // five closing quotes: the last three terminate
        assert_eq!(t.object, "a\"\"");
        let t = literal("'''two quotes ('') inside'''")?;
        assert_eq!(t.object, "two quotes ('') inside");
        Ok(())
    }

    #[test]
    fn empty_literals() -> Result<(), TurtleParseError> {
        assert_eq!(literal(r#""""#)?.object, "");
        assert_eq!(literal("''")?.object, "");
        assert_eq!(literal(r#""""""""#)?.object, "");
        Ok(())
    }

    #[test]
    fn datatype_suffix_forms() -> Result<(), TurtleParseError> {
        let t = object_of(
            "@prefix xsd: <http://www.w3.org/2001/XMLSchema#> . <http://e/s> <http://e/p> \"1\"^^xsd:byte .\n",
        )?;
        assert_eq!(t.datatype_iri, "http://www.w3.org/2001/XMLSchema#byte");
        let t = literal("\"1\"^^<http://e/dt>")?;
        assert_eq!(t.datatype_iri, "http://e/dt");
        Ok(())
    }

    #[test]
    fn single_caret_is_rejected() {
        let err = literal("\"1\"^<http://e/dt>").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Turtle syntax violation on line 1: single "^" after quoted string"#
        );
    }

    #[test]
    fn language_tags() -> Result<(), TurtleParseError> {
        let t = literal("\"salut\"@fr")?;
        assert_eq!((t.lang_tag.as_str(), t.datatype_iri.as_str()), ("fr", rdf::LANG_STRING));
        let t = literal("\"Septante\"@fr-BE")?;
        assert_eq!(t.lang_tag, "fr-be"); // stored lower case
        let t = literal("\"x\"@fr-be2")?; // digits allowed past a subtag's first letter
        assert_eq!(t.lang_tag, "fr-be2");
        assert!(literal("\"x\"@fr-").is_err());
        assert!(literal("\"x\"@7up").is_err());
        assert!(literal("\"x\"@en1").is_err()); // primary subtag is letters only
        assert!(literal("\"x\"@fr-1a").is_err());
        assert!(literal("\"x\"@f_r").is_err());
        Ok(())
    }

    #[test]
    fn number_classification() -> Result<(), TurtleParseError> {
        for (lexical, datatype) in [
            ("2", xsd::INTEGER),
            ("-5", xsd::INTEGER),
            ("+30", xsd::INTEGER),
            ("4.002602", xsd::DECIMAL),
            ("-0.5", xsd::DECIMAL),
            (".5", xsd::DECIMAL),
            ("1.663E-4", xsd::DOUBLE),
            ("4e2", xsd::DOUBLE),
            ("-1.0E+1", xsd::DOUBLE),
        ] {
            let t = literal(lexical)?;
            assert_eq!(t.object, lexical, "lexical form must survive unchanged");
            assert_eq!(t.datatype_iri, datatype, "datatype of {lexical}");
        }
        Ok(())
    }

    #[test]
    fn malformed_numbers() {
        for (turtle, reason) in [
            ("+", "sign without number"),
            ("- ", "sign without number"),
            ("1.", "decimal with empty fraction"),
            ("1.E5", "fraction of double without decimals"),
            ("1E", "no decimals in double exponent"),
            ("1E+ ", "no decimals in double exponent"),
            ("1.2.3", "illegal character in fraction"),
            ("12a", "illegal character in number"),
            ("1E5x", "illegal character in exponent of double"),
        ] {
            let err = literal(turtle).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Turtle syntax violation on line 1: {reason}"),
                "for {turtle:?}"
            );
        }
    }
}
