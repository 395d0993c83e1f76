use crate::error::{unexpected_eof, TurtleParseError};
use crate::line::LineCursor;
use crate::skolem;
use crate::triple::Triple;
use crate::vocab::rdf;
use oxiri::{Iri, IriParseError};
use std::collections::hash_map;
use std::collections::HashMap;
use std::io::BufRead;
use std::mem;

/// A streaming [Turtle](https://www.w3.org/TR/turtle/) parser.
///
/// The reader consumes one statement per [`read_append`](Self::read_append)
/// call and emits flat [`Triple`] records: prefixed names expanded, relative
/// IRIs resolved against the current base, and blank nodes replaced with
/// skolem IRIs minted in a per-reader namespace (see
/// [`is_skolem_iri`](crate::is_skolem_iri)). Both the Turtle directive
/// spellings (`@base`/`@prefix`, dot-terminated) and the SPARQL ones
/// (`BASE`/`PREFIX`, case-insensitive, no dot) are accepted.
///
/// ```
/// use oxturtle::TurtleReader;
///
/// let file = br#"@prefix rel: <http://www.perceive.net/schemas/relationship/> .
/// <http://example.org/#spiderman> rel:enemyOf <http://example.org/#green-goblin> ."#;
///
/// let mut triples = Vec::new();
/// let mut reader = TurtleReader::new(file.as_slice());
/// while reader.read_append(&mut triples)? {}
/// assert_eq!(1, triples.len());
/// assert_eq!(
///     "http://www.perceive.net/schemas/relationship/enemyOf",
///     triples[0].predicate_iri
/// );
/// # Result::<_, oxturtle::TurtleParseError>::Ok(())
/// ```
#[must_use]
pub struct TurtleReader<R: BufRead> {
    pub(crate) cursor: LineCursor<R>,
    pub(crate) base_iri: Option<Iri<String>>,
    pub(crate) prefixes: HashMap<String, String>,
    anon_count: u64,
    skolem_root: Option<String>,
}

impl<R: BufRead> TurtleReader<R> {
    /// Builds a new reader over a buffered byte stream.
    pub fn new(read: R) -> Self {
        Self {
            cursor: LineCursor::new(read),
            base_iri: None,
            prefixes: HashMap::new(),
            anon_count: 0,
            skolem_root: None,
        }
    }

    /// Sets the initial base IRI, typically the data location.
    ///
    /// Any `@base` or `BASE` directive in the input updates it.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base_iri = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Binds a prefix ahead of the input's own `@prefix`/`PREFIX`
    /// directives, which may overwrite it.
    #[inline]
    pub fn with_prefix(
        mut self,
        label: impl Into<String>,
        iri: impl Into<String>,
    ) -> Result<Self, IriParseError> {
        let iri = Iri::parse(iri.into())?;
        self.prefixes.insert(label.into(), iri.into_inner());
        Ok(self)
    }

    /// Overrides the lazily minted skolem namespace, making blank-node and
    /// anonymous-node IRIs deterministic. Intended for tests.
    #[inline]
    pub fn with_skolem_root(mut self, root: impl Into<String>) -> Self {
        self.skolem_root = Some(root.into());
        self
    }

    /// The base IRI at the current point of the parse.
    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_ref().map(Iri::as_str)
    }

    /// The prefix bindings at the current point of the parse, as
    /// (label, IRI) tuples in no particular order.
    pub fn prefixes(&self) -> PrefixesIter<'_> {
        PrefixesIter {
            inner: self.prefixes.iter(),
        }
    }

    /// Reads one statement and appends its triples to `dst` in order of
    /// appearance, with the triples of nested anonymous nodes and
    /// collections before the enclosing statement's.
    ///
    /// Returns `Ok(true)` after a statement, `Ok(false)` on a clean end of
    /// stream. Directives are consumed silently. A stream ending in the
    /// middle of a statement yields an [`io::Error`](std::io::Error) of
    /// kind [`UnexpectedEof`](std::io::ErrorKind::UnexpectedEof); triples
    /// already appended stay in `dst`. After any error the reader is in an
    /// undefined state and should be discarded.
    pub fn read_append(&mut self, dst: &mut Vec<Triple>) -> Result<bool, TurtleParseError> {
        let Some(subject) = self.read_subject(dst)? else {
            return Ok(false);
        };
        loop {
            let predicate = self.read_predicate()?;
            loop {
                let mut t = Triple {
                    subject_iri: subject.clone(),
                    predicate_iri: predicate.clone(),
                    ..Triple::default()
                };
                self.read_object(&mut t, dst)?;
                dst.push(t);

                // read terminator or followup
                self.cursor.expect_token("statement not terminated")?;
                match self.cursor.peek() {
                    Some(b'.') => {
                        self.cursor.pos += 1;
                        return Ok(true);
                    }
                    Some(b',') => self.cursor.pos += 1,
                    Some(b';') => {
                        self.cursor.pos += 1;
                        break;
                    }
                    _ => return Err(self.cursor.syntax("illegal triple continuation").into()),
                }
            }
        }
    }

    /// Reads the next subject, handling any directives on the way.
    /// `None` means the stream ended cleanly before a statement.
    fn read_subject(&mut self, dst: &mut Vec<Triple>) -> Result<Option<String>, TurtleParseError> {
        loop {
            if !self.cursor.next_token()? {
                return Ok(None);
            }
            match self.cursor.peek() {
                Some(b'@') => self.read_at_directive()?,
                Some(b'<') => return self.read_iri_ref().map(Some),
                Some(b'[') => return self.read_anonymous(dst).map(Some),
                Some(b'(') => return self.read_collection(dst).map(Some),
                Some(b'_') => return self.read_blank_label().map(Some),
                _ => match self.scan_name("subject node")? {
                    Name::Iri(iri) => return Ok(Some(iri)),
                    Name::Keyword(word) => {
                        if word.eq_ignore_ascii_case("base") {
                            self.read_base_directive(false)?;
                        } else if word.eq_ignore_ascii_case("prefix") {
                            self.read_prefix_directive(false)?;
                        } else {
                            return Err(self.cursor.syntax("illegal subject token").into());
                        }
                    }
                },
            }
        }
    }

    fn read_predicate(&mut self) -> Result<String, TurtleParseError> {
        self.cursor.expect_token("predicate interrupted")?;
        if self.cursor.peek() == Some(b'<') {
            return self.read_iri_ref();
        }
        match self.scan_name("predicate")? {
            Name::Iri(iri) => Ok(iri),
            Name::Keyword(word) if word == "a" => Ok(rdf::TYPE.to_owned()),
            Name::Keyword(_) => Err(self.cursor.syntax("illegal predicate token").into()),
        }
    }

    /// Reads the next object into `t`. Nested anonymous nodes and
    /// collections append their own triples to `dst` first.
    fn read_object(&mut self, t: &mut Triple, dst: &mut Vec<Triple>) -> Result<(), TurtleParseError> {
        self.cursor.expect_token("object interrupted")?;
        match self.cursor.peek() {
            Some(b'<') => t.object = self.read_iri_ref()?,
            Some(b'_') => t.object = self.read_blank_label()?,
            Some(b'[') => t.object = self.read_anonymous(dst)?,
            Some(b'(') => t.object = self.read_collection(dst)?,
            Some(b'"') => {
                self.read_quoted(b'"', t)?;
                self.read_literal_suffix(t)?;
            }
            Some(b'\'') => {
                self.read_quoted(b'\'', t)?;
                self.read_literal_suffix(t)?;
            }
            Some(b'+' | b'-') => self.read_number(true, t)?,
            Some(b'.' | b'0'..=b'9') => self.read_number(false, t)?,
            _ => match self.scan_name("object node")? {
                Name::Iri(iri) => t.object = iri,
                Name::Keyword(word) if word == "true" || word == "false" => {
                    t.object = word;
                    t.datatype_iri = crate::vocab::xsd::BOOLEAN.to_owned();
                }
                Name::Keyword(_) => {
                    return Err(self.cursor.syntax("illegal object token").into());
                }
            },
        }
        Ok(())
    }

    /// Continues from `@` in the buffer.
    fn read_at_directive(&mut self) -> Result<(), TurtleParseError> {
        self.cursor.pos += 1;
        let word = {
            let rest = &self.cursor.line[self.cursor.pos..];
            let end = rest
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(rest.len());
            rest[..end].to_owned()
        };
        self.cursor.pos += word.len();
        match word.as_str() {
            "base" => self.read_base_directive(true),
            "prefix" => self.read_prefix_directive(true),
            _ => Err(self
                .cursor
                .syntax(r#"unknown directive; expected either "@base" or "@prefix""#)
                .into()),
        }
    }

    /// Continues after a `@base` or `BASE` encounter; `terminated` asks for
    /// the Turtle form's closing dot.
    fn read_base_directive(&mut self, terminated: bool) -> Result<(), TurtleParseError> {
        self.cursor.expect_token("directive interrupted")?;
        if self.cursor.peek() != Some(b'<') {
            return Err(self
                .cursor
                .syntax(r#"IRI reference of base directive does not start with "<""#)
                .into());
        }
        let iri = self.read_iri_ref()?;
        self.base_iri = Some(
            Iri::parse(iri)
                .map_err(|e| self.cursor.syntax(format!("illegal base IRI: {e}")))?,
        );
        if terminated {
            self.cursor.expect_token("directive interrupted")?;
            if self.cursor.peek() != Some(b'.') {
                return Err(self
                    .cursor
                    .syntax(r#"base directive not terminated with ".""#)
                    .into());
            }
            self.cursor.pos += 1;
        }
        Ok(())
    }

    /// Continues after a `@prefix` or `PREFIX` encounter.
    fn read_prefix_directive(&mut self, terminated: bool) -> Result<(), TurtleParseError> {
        self.cursor.expect_token("directive interrupted")?;
        let (label, colon) = self.scan_prefix_label()?;
        if !colon {
            return Err(self
                .cursor
                .syntax(r#"prefix label without ":" suffix"#)
                .into());
        }
        self.cursor.expect_token("directive interrupted")?;
        if self.cursor.peek() != Some(b'<') {
            return Err(self
                .cursor
                .syntax(r#"IRI of prefix directive does not start with "<""#)
                .into());
        }
        let iri = self.read_iri_ref()?;
        self.prefixes.insert(label, iri);
        if terminated {
            self.cursor.expect_token("directive interrupted")?;
            if self.cursor.peek() != Some(b'.') {
                return Err(self
                    .cursor
                    .syntax(r#"prefix directive is not terminated with ".""#)
                    .into());
            }
            self.cursor.pos += 1;
        }
        Ok(())
    }

    /// Reads the bytes between `<` and `>`, decodes `\u`/`\U` escapes, and
    /// resolves the reference against the current base IRI.
    pub(crate) fn read_iri_ref(&mut self) -> Result<String, TurtleParseError> {
        let mut raw = String::new();
        let mut seg = self.cursor.pos + 1;
        let mut i = seg;
        let end;
        loop {
            let Some(&b) = self.cursor.line.as_bytes().get(i) else {
                return Err(unexpected_eof("IRI reference interrupted").into());
            };
            match b {
                b'>' => {
                    raw.push_str(&self.cursor.line[seg..i]);
                    end = i + 1;
                    break;
                }
                b'<' | b'"' | b'{' | b'}' | b'|' | b'^' | b'`' => {
                    return Err(self
                        .cursor
                        .syntax("illegal character in IRI reference")
                        .into());
                }
                b'\\' => {
                    raw.push_str(&self.cursor.line[seg..i]);
                    let n = match self.cursor.line.as_bytes().get(i + 1) {
                        Some(b'u') => 4,
                        Some(b'U') => 8,
                        _ => {
                            return Err(self
                                .cursor
                                .syntax("illegal escape in IRI reference")
                                .into());
                        }
                    };
                    let (c, next) = self.decode_hex(i + 2, n)?;
                    raw.push(c);
                    i = next;
                    seg = i;
                }
                0..=0x20 => {
                    return Err(self
                        .cursor
                        .syntax("control character in IRI reference")
                        .into());
                }
                _ => i += 1,
            }
        }
        self.cursor.pos = end;
        self.resolve_iri(raw)
    }

    /// Resolves a URI reference against the current base per RFC 3986.
    fn resolve_iri(&self, raw: String) -> Result<String, TurtleParseError> {
        if let Some(base) = &self.base_iri {
            Ok(base
                .resolve(&raw)
                .map_err(|e| self.cursor.syntax(format!("illegal IRI reference: {e}")))?
                .into_inner())
        } else {
            match Iri::parse(raw) {
                Ok(iri) => Ok(iri.into_inner()),
                Err(_) => Err(self
                    .cursor
                    .syntax("relative reference without base IRI")
                    .into()),
            }
        }
    }

    fn skolem_root(&mut self) -> &str {
        self.skolem_root.get_or_insert_with(skolem::fresh_root)
    }

    /// Continues from `_` in the buffer, mapping `_:label` into the skolem
    /// namespace.
    fn read_blank_label(&mut self) -> Result<String, TurtleParseError> {
        if self.cursor.line.as_bytes().get(self.cursor.pos + 1) != Some(&b':') {
            return Err(self
                .cursor
                .syntax(r#"prefixed name starts with underscore ("_")"#)
                .into());
        }
        // [141s] BLANK_NODE_LABEL ::= '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
        let label = {
            let rest = &self.cursor.line[self.cursor.pos + 2..];
            let mut end = rest.len();
            for (i, c) in rest.char_indices() {
                let ok = if i == 0 {
                    is_pn_chars_u(c) || c.is_ascii_digit()
                } else {
                    is_pn_chars(c) || c == '.'
                };
                if !ok {
                    end = i;
                    break;
                }
            }
            let mut label = &rest[..end];
            while let Some(shorter) = label.strip_suffix('.') {
                label = shorter;
            }
            label.to_owned()
        };
        if label.is_empty() {
            return Err(self.cursor.syntax("empty blank node label").into());
        }
        self.cursor.pos += 2 + label.len();
        Ok(format!("{}blank#{label}", self.skolem_root()))
    }

    fn mint_anon(&mut self) -> String {
        self.anon_count += 1;
        let n = self.anon_count;
        format!("{}anon#{n}", self.skolem_root())
    }

    /// Continues from `[` in the buffer. The minted node may carry a
    /// predicate-object list whose triples land in `dst` before the
    /// enclosing statement's.
    fn read_anonymous(&mut self, dst: &mut Vec<Triple>) -> Result<String, TurtleParseError> {
        self.cursor.pos += 1;
        let iri = self.mint_anon();
        self.cursor.expect_token("blank node not closed")?;
        if self.cursor.peek() == Some(b']') {
            self.cursor.pos += 1;
            return Ok(iri);
        }
        'predicates: loop {
            let predicate = self.read_predicate()?;
            loop {
                let mut t = Triple {
                    subject_iri: iri.clone(),
                    predicate_iri: predicate.clone(),
                    ..Triple::default()
                };
                self.read_object(&mut t, dst)?;
                dst.push(t);
                self.cursor.expect_token("blank node not closed")?;
                match self.cursor.peek() {
                    Some(b']') => {
                        self.cursor.pos += 1;
                        break 'predicates;
                    }
                    Some(b',') => self.cursor.pos += 1,
                    Some(b';') => {
                        self.cursor.pos += 1;
                        continue 'predicates;
                    }
                    _ => {
                        return Err(self
                            .cursor
                            .syntax("illegal predicate-object list continuation")
                            .into());
                    }
                }
            }
        }
        Ok(iri)
    }

    /// Continues from `(` in the buffer, expanding the collection into an
    /// rdf:first/rdf:rest chain and returning its head.
    fn read_collection(&mut self, dst: &mut Vec<Triple>) -> Result<String, TurtleParseError> {
        self.cursor.pos += 1;
        self.cursor.expect_token("collection not closed")?;
        if self.cursor.peek() == Some(b')') {
            self.cursor.pos += 1;
            return Ok(rdf::NIL.to_owned());
        }
        let head = self.mint_anon();
        let mut link = head.clone();
        loop {
            let mut t = Triple {
                subject_iri: link.clone(),
                predicate_iri: rdf::FIRST.to_owned(),
                ..Triple::default()
            };
            self.read_object(&mut t, dst)?;
            dst.push(t);
            self.cursor.expect_token("collection not closed")?;
            if self.cursor.peek() == Some(b')') {
                self.cursor.pos += 1;
                dst.push(Triple {
                    subject_iri: link,
                    predicate_iri: rdf::REST.to_owned(),
                    object: rdf::NIL.to_owned(),
                    ..Triple::default()
                });
                return Ok(head);
            }
            let next = self.mint_anon();
            dst.push(Triple {
                subject_iri: mem::replace(&mut link, next.clone()),
                predicate_iri: rdf::REST.to_owned(),
                object: next,
                ..Triple::default()
            });
        }
    }

    /// Scans a prefixed name or a bare keyword and expands the former
    /// through the prefix map. `slot` names the triple position for the
    /// undefined-prefix error.
    pub(crate) fn scan_name(&mut self, slot: &str) -> Result<Name, TurtleParseError> {
        let (label, colon) = self.scan_prefix_label()?;
        if !colon {
            return Ok(Name::Keyword(label));
        }
        let local = self.scan_local_name()?;
        let Some(expansion) = self.prefixes.get(&label) else {
            return Err(self
                .cursor
                .syntax(format!("undefined prefix on {slot}"))
                .into());
        };
        Ok(Name::Iri(format!("{expansion}{local}")))
    }

    /// Scans `PN_PREFIX? ':'`, or a bare keyword when no colon follows.
    /// The second return is whether the colon was there.
    fn scan_prefix_label(&mut self) -> Result<(String, bool), TurtleParseError> {
        // [167s] PN_PREFIX ::= PN_CHARS_BASE ((PN_CHARS | '.')* PN_CHARS)?
        let (mut label, mut consumed, colon) = {
            let rest = &self.cursor.line[self.cursor.pos..];
            let mut end = rest.len();
            let mut colon = false;
            for (i, c) in rest.char_indices() {
                if c == ':' {
                    end = i;
                    colon = true;
                    break;
                }
                let ok = if i == 0 {
                    is_pn_chars_base(c)
                } else {
                    is_pn_chars(c) || c == '.'
                };
                if !ok {
                    end = i;
                    break;
                }
            }
            (
                rest[..end].to_owned(),
                if colon { end + 1 } else { end },
                colon,
            )
        };
        if colon {
            if label.ends_with('.') {
                return Err(self.cursor.syntax(r#"prefix label ends with ".""#).into());
            }
        } else {
            // keyword: trailing dots belong to the statement
            while label.ends_with('.') {
                label.pop();
                consumed -= 1;
            }
        }
        self.cursor.pos += consumed;
        Ok((label, colon))
    }

    /// Scans an optional `PN_LOCAL`, keeping `%HH` escapes verbatim,
    /// undoing `\`-escapes into their plain characters, and excluding any
    /// trailing run of dots.
    fn scan_local_name(&mut self) -> Result<String, TurtleParseError> {
        // [168s] PN_LOCAL ::= (PN_CHARS_U | ':' | [0-9] | PLX)
        //                     ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
        let (local, consumed) = {
            let rest = &self.cursor.line[self.cursor.pos..];
            let bytes = rest.as_bytes();
            let mut local = String::new();
            let mut i = 0;
            let mut trailing_dots = 0;
            let mut first = true;
            while let Some(c) = rest[i..].chars().next() {
                match c {
                    '%' => {
                        let hex = (bytes.get(i + 1), bytes.get(i + 2));
                        let (Some(a), Some(b)) = hex else {
                            return Err(self
                                .cursor
                                .syntax("illegal percent escape in local name")
                                .into());
                        };
                        if !a.is_ascii_hexdigit() || !b.is_ascii_hexdigit() {
                            return Err(self
                                .cursor
                                .syntax("illegal percent escape in local name")
                                .into());
                        }
                        local.push_str(&rest[i..i + 3]);
                        i += 3;
                        trailing_dots = 0;
                    }
                    '\\' => {
                        let Some(&escaped) = bytes.get(i + 1) else {
                            return Err(self.cursor.syntax("illegal escape in local name").into());
                        };
                        if !matches!(
                            escaped,
                            b'_' | b'~'
                                | b'.'
                                | b'-'
                                | b'!'
                                | b'$'
                                | b'&'
                                | b'\''
                                | b'('
                                | b')'
                                | b'*'
                                | b'+'
                                | b','
                                | b';'
                                | b'='
                                | b'/'
                                | b'?'
                                | b'#'
                                | b'@'
                                | b'%'
                        ) {
                            return Err(self.cursor.syntax("illegal escape in local name").into());
                        }
                        local.push(char::from(escaped));
                        i += 2;
                        trailing_dots = 0;
                    }
                    '.' if !first => {
                        local.push('.');
                        i += 1;
                        trailing_dots += 1;
                    }
                    c if (first && (is_pn_chars_u(c) || c == ':' || c.is_ascii_digit()))
                        || (!first && (is_pn_chars(c) || c == ':')) =>
                    {
                        local.push(c);
                        i += c.len_utf8();
                        trailing_dots = 0;
                    }
                    _ => break,
                }
                first = false;
            }
            for _ in 0..trailing_dots {
                local.pop();
            }
            (local, i - trailing_dots)
        };
        self.cursor.pos += consumed;
        Ok(local)
    }

    /// Decodes `n` hex digits starting at `at` into a character.
    pub(crate) fn decode_hex(
        &self,
        at: usize,
        n: usize,
    ) -> Result<(char, usize), TurtleParseError> {
        let bytes = self.cursor.line.as_bytes();
        let mut code: u32 = 0;
        for k in 0..n {
            let digit = match bytes.get(at + k).copied() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => {
                    return Err(self.cursor.syntax("illegal hex in Unicode escape").into());
                }
            };
            code = code * 16 + u32::from(digit);
        }
        let c = char::from_u32(code).ok_or_else(|| {
            self.cursor
                .syntax(format!("Unicode escape of illegal code point {code:X}"))
        })?;
        Ok((c, at + n))
    }
}

/// A scanned bare token: either an expanded prefixed name or a keyword
/// such as `a`, `true` or a directive head.
pub(crate) enum Name {
    Iri(String),
    Keyword(String),
}

/// Iterator over the reader's prefix bindings.
///
/// See [`TurtleReader::prefixes`].
pub struct PrefixesIter<'a> {
    inner: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for PrefixesIter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let (label, iri) = self.inner.next()?;
        Some((label.as_str(), iri.as_str()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Streams the triples of a reader one at a time.
///
/// Created by the [`IntoIterator`] impl on [`TurtleReader`]:
/// ```
/// use oxturtle::TurtleReader;
///
/// let file = b"<http://e/s> <http://e/p> <http://e/o> , 42 .";
/// let mut objects = Vec::new();
/// for triple in TurtleReader::new(file.as_slice()) {
///     objects.push(triple?.object);
/// }
/// assert_eq!(objects, ["http://e/o", "42"]);
/// # Result::<_, oxturtle::TurtleParseError>::Ok(())
/// ```
#[must_use]
pub struct IntoTriples<R: BufRead> {
    reader: TurtleReader<R>,
    buffer: Vec<Triple>,
    next: usize,
    done: bool,
}

impl<R: BufRead> Iterator for IntoTriples<R> {
    type Item = Result<Triple, TurtleParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.next < self.buffer.len() {
                let triple = mem::take(&mut self.buffer[self.next]);
                self.next += 1;
                return Some(Ok(triple));
            }
            if self.done {
                return None;
            }
            self.buffer.clear();
            self.next = 0;
            match self.reader.read_append(&mut self.buffer) {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: BufRead> IntoIterator for TurtleReader<R> {
    type Item = Result<Triple, TurtleParseError>;
    type IntoIter = IntoTriples<R>;

    fn into_iter(self) -> IntoTriples<R> {
        IntoTriples {
            reader: self,
            buffer: Vec::new(),
            next: 0,
            done: false,
        }
    }
}

// [157s] PN_CHARS_BASE ::= [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6]
//     | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF] | [#x200C-#x200D]
//     | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF]
//     | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
pub(crate) fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

// [158s] PN_CHARS_U ::= PN_CHARS_BASE | '_'
pub(crate) fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

// [160s] PN_CHARS ::= PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]
pub(crate) fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || matches!(c,
            '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(turtle: &str) -> Result<Vec<Triple>, TurtleParseError> {
        let mut reader = TurtleReader::new(turtle.as_bytes())
            .with_skolem_root("http://example.com/skolem-stub/");
        let mut triples = Vec::new();
        while reader.read_append(&mut triples)? {}
        Ok(triples)
    }

    #[test]
    fn prefixed_name_with_escapes() -> Result<(), TurtleParseError> {
        let triples =
            read_all("@prefix og: <http://ogp.me/ns#> . <http://e/s> og:video:height \"12\" .")?;
        assert_eq!(triples[0].predicate_iri, "http://ogp.me/ns#video:height");
        let triples =
            read_all("@prefix wd: <http://w/> . <http://e/s> wd:a%20b <http://e/o> .")?;
        assert_eq!(triples[0].predicate_iri, "http://w/a%20b");
        let triples =
            read_all("@prefix wd: <http://w/> . <http://e/s> wd:a\\~b <http://e/o> .")?;
        assert_eq!(triples[0].predicate_iri, "http://w/a~b");
        Ok(())
    }

    #[test]
    fn local_name_excludes_trailing_dot() -> Result<(), TurtleParseError> {
        let triples = read_all("@prefix : <http://e/> . :s :p :o.")?;
        assert_eq!(triples[0].object, "http://e/o");
        Ok(())
    }

    #[test]
    fn undefined_prefix_is_reported_per_slot() {
        for (turtle, slot) in [
            (":s <http://e/p> <http://e/o> .", "subject node"),
            ("<http://e/s> :p <http://e/o> .", "predicate"),
            ("<http://e/s> <http://e/p> :o .", "object node"),
            ("<http://e/s> <http://e/p> \"1\"^^:t .", "datatype"),
        ] {
            let err = read_all(turtle).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Turtle syntax violation on line 1: undefined prefix on {slot}")
            );
        }
    }

    #[test]
    fn iri_unicode_escapes_decode_before_resolution() -> Result<(), TurtleParseError> {
        let triples = read_all("<http://e/\\u0041> <http://e/p> <http://e/\\U00000042> .")?;
        assert_eq!(triples[0].subject_iri, "http://e/A");
        assert_eq!(triples[0].object, "http://e/B");
        Ok(())
    }

    #[test]
    fn relative_iri_without_base_is_an_error() {
        let err = read_all("<s> <http://e/p> <http://e/o> .").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Turtle syntax violation on line 1: relative reference without base IRI"
        );
    }

    #[test]
    fn anonymous_subject_property_list() -> Result<(), TurtleParseError> {
        let triples = read_all(
            "@prefix foaf: <http://xmlns.com/foaf/0.1/> .\n\
             [ foaf:name \"Alice\" ; foaf:age 7 ] foaf:knows <http://e/bob> .",
        )?;
        let anon = "http://example.com/skolem-stub/anon#1";
        assert_eq!(triples.len(), 3);
        assert_eq!(
            (triples[0].subject_iri.as_str(), triples[0].object.as_str()),
            (anon, "Alice")
        );
        assert_eq!(
            (triples[1].subject_iri.as_str(), triples[1].object.as_str()),
            (anon, "7")
        );
        // the enclosing statement comes after its nested node
        assert_eq!(
            (triples[2].subject_iri.as_str(), triples[2].object.as_str()),
            (anon, "http://e/bob")
        );
        Ok(())
    }

    #[test]
    fn empty_anonymous_node() -> Result<(), TurtleParseError> {
        let triples = read_all("<http://e/s> <http://e/p> [ ] .")?;
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].object, "http://example.com/skolem-stub/anon#1");
        Ok(())
    }

    #[test]
    fn collection_expands_to_first_rest_chain() -> Result<(), TurtleParseError> {
        let triples =
            read_all("@prefix : <http://e/> . :s :p (:a :b ) .")?;
        let n1 = "http://example.com/skolem-stub/anon#1";
        let n2 = "http://example.com/skolem-stub/anon#2";
        let expected = [
            (n1, rdf::FIRST, "http://e/a"),
            (n1, rdf::REST, n2),
            (n2, rdf::FIRST, "http://e/b"),
            (n2, rdf::REST, rdf::NIL),
            ("http://e/s", "http://e/p", n1),
        ];
        assert_eq!(triples.len(), expected.len());
        for (t, (s, p, o)) in triples.iter().zip(expected) {
            assert_eq!(
                (t.subject_iri.as_str(), t.predicate_iri.as_str(), t.object.as_str()),
                (s, p, o)
            );
        }
        Ok(())
    }

    #[test]
    fn empty_collection_is_nil() -> Result<(), TurtleParseError> {
        let triples = read_all("<http://e/s> <http://e/p> ( ) .")?;
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].object, rdf::NIL);
        Ok(())
    }

    #[test]
    fn base_updates_resolve_in_order() -> Result<(), TurtleParseError> {
        let triples = read_all(
            "@base <http://example.com/> . <s1> <p1> <o1> .\n\
             BASE <http://example.net/>\n\
             <s2> <p2> <o2> .",
        )?;
        assert_eq!(triples[0].subject_iri, "http://example.com/s1");
        assert_eq!(triples[1].subject_iri, "http://example.net/s2");
        Ok(())
    }

    #[test]
    fn relative_base_resolves_against_previous() -> Result<(), TurtleParseError> {
        let triples = read_all("@base <http://e/dir/> . @base <sub/> . <x> <y> <z> .")?;
        assert_eq!(triples[0].subject_iri, "http://e/dir/sub/x");
        Ok(())
    }

    #[test]
    fn reader_state_accessors() -> Result<(), Box<dyn std::error::Error>> {
        let mut reader = TurtleReader::new(
            "@base <http://example.com/> . @prefix p: <q/> . <s> p:r <t> .".as_bytes(),
        )
        .with_prefix("seed", "http://seed.example/")?;
        let mut triples = Vec::new();
        reader.read_append(&mut triples)?;
        assert_eq!(reader.base_iri(), Some("http://example.com/"));
        let mut prefixes: Vec<_> = reader.prefixes().collect();
        prefixes.sort_unstable();
        assert_eq!(
            prefixes,
            [
                ("p", "http://example.com/q/"),
                ("seed", "http://seed.example/")
            ]
        );
        Ok(())
    }

    #[test]
    fn skolem_root_is_minted_once_without_override() -> Result<(), TurtleParseError> {
        let mut reader =
            TurtleReader::new("_:a <http://e/p> _:b . _:b <http://e/p> _:a .".as_bytes());
        let mut triples = Vec::new();
        while reader.read_append(&mut triples)? {}
        assert!(crate::is_skolem_iri(&triples[0].subject_iri));
        assert_eq!(triples[0].subject_iri, triples[1].object);
        assert_eq!(triples[0].object, triples[1].subject_iri);
        Ok(())
    }
}
