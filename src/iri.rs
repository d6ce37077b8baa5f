use iref::{Iri, IriRef};

/// Checks if the given string is an absolute IRI.
///
/// A string is considered absolute as soon as it carries a scheme separator.
/// Blank node identifiers also satisfy this predicate, which is what the
/// expansion algorithm expects when deciding whether to keep a key.
pub fn is_absolute_iri(value: &str) -> bool {
	value.contains(':')
}

/// Checks if the given string is a blank node identifier.
pub fn is_blank_node_id(value: &str) -> bool {
	value.starts_with("_:")
}

/// Resolves `rel` against `base` following RFC 3986 section 5, including
/// dot-segment removal.
///
/// The resolution fails open: if `base` is absent or cannot be parsed, the
/// relative IRI is returned unchanged. Three cases bypass the RFC algorithm
/// to match the behaviour expected by the JSON-LD algorithms:
/// an empty `rel` returns `base` unchanged, a `base` ending with `#`
/// concatenates, and a `rel` starting with `?` is appended to `base`.
pub fn resolve(base: Option<&str>, rel: &str) -> String {
	if rel.contains(':') {
		// already absolute (or a blank node identifier)
		return rel.to_string();
	}

	let Some(base) = base else {
		return rel.to_string();
	};

	if rel.is_empty() {
		return base.to_string();
	}

	if base.ends_with('#') || rel.starts_with('?') {
		return format!("{base}{rel}");
	}

	match (Iri::new(base), IriRef::new(rel)) {
		(Ok(base), Ok(rel)) => rel.resolved(base).into_string(),
		_ => rel.to_string(),
	}
}
