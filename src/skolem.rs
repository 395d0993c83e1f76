use std::time::{SystemTime, UNIX_EPOCH};

/// The namespace reserved for IRIs minted in place of blank nodes.
pub const SKOLEM_IRI_ROOT: &str = "web+skolem://quies.net/";

/// Returns whether `s` is an IRI minted by a [`TurtleReader`](crate::TurtleReader)
/// for a blank node.
///
/// ```
/// assert!(oxturtle::is_skolem_iri(
///     "web+skolem://quies.net/17e2a9b1c/blank#alice"
/// ));
/// assert!(!oxturtle::is_skolem_iri("http://example.com/alice"));
/// ```
#[inline]
pub fn is_skolem_iri(s: &str) -> bool {
    s.starts_with(SKOLEM_IRI_ROOT)
}

/// Mints a session-unique namespace under [`SKOLEM_IRI_ROOT`].
///
/// Nanosecond time plus 32 random bits keep roots from colliding across
/// parser instances within a process and across processes.
pub(crate) fn fresh_root() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    format!("{SKOLEM_IRI_ROOT}{nanos:x}{:x}/", rand::random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_roots_are_in_namespace_and_distinct() {
        let a = fresh_root();
        let b = fresh_root();
        assert!(is_skolem_iri(&a));
        assert!(is_skolem_iri(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn non_skolem_iris_are_rejected() {
        assert!(!is_skolem_iri(""));
        assert!(!is_skolem_iri("web+skolem://quies.net"));
        assert!(!is_skolem_iri("http://quies.net/blank#a"));
    }
}
