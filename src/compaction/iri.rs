use crate::container::Container;
use crate::context::{Context, TermDefinition};
use crate::keyword::Keyword;
use crate::utils;
use json_syntax::Value;

/// Compacts an IRI or keyword into a term, CURIE or keyword alias.
///
/// When the IRI has an associated value, the value shape drives the choice
/// between candidate terms (see [`rank_term`]). `is_key` distinguishes key
/// and `@type` positions, which prefer `@vocab`-relative compaction over
/// CURIEs, from value positions which prefer the opposite.
pub(crate) fn compact_iri(
	active_context: &Context,
	iri: &str,
	value: Option<&Value>,
	is_key: bool,
) -> String {
	// keywords compact to their shortest alias
	if let Ok(keyword) = Keyword::try_from(iri) {
		return active_context
			.keyword_alias(keyword)
			.unwrap_or(iri)
			.to_string();
	}

	// collect candidate terms compatible with the value shape
	let mut terms: Vec<String> = Vec::new();
	let mut highest = 0i64;
	let mut list_container = false;
	let is_list = value.is_some_and(utils::is_list);

	for (term, definition) in active_context.terms() {
		let Some(definition) = definition else {
			continue;
		};

		if definition.iri != iri {
			continue;
		}
		// `@set` containers do not accept lists, `@list` containers only
		// accept them
		if is_list && definition.container == Some(Container::Set) {
			continue;
		}
		if !is_list && definition.container == Some(Container::List) && value.is_some() {
			continue;
		}
		// once a `@list` container matched, plain terms are out
		if is_list && list_container && definition.container != Some(Container::List) {
			continue;
		}

		let rank = rank_term(active_context, definition, value);
		if rank > 0 {
			let rank = if definition.container == Some(Container::Set) {
				rank + 1
			} else {
				rank
			};

			if is_list && !list_container && definition.container == Some(Container::List) {
				list_container = true;
				terms.clear();
				highest = rank;
				terms.push(term.to_string());
			} else if rank >= highest {
				if rank > highest {
					terms.clear();
					highest = rank;
				}
				terms.push(term.to_string());
			}
		}
	}

	// keys and types try `@vocab` before CURIEs, values the other way round
	if is_key {
		if terms.is_empty() {
			if let Some(suffix) = vocab_suffix(active_context, iri) {
				return suffix;
			}
		}
		if terms.is_empty() {
			collect_curies(active_context, iri, &mut terms);
		}
	} else {
		if terms.is_empty() {
			collect_curies(active_context, iri, &mut terms);
		}
		if terms.is_empty() {
			if let Some(suffix) = vocab_suffix(active_context, iri) {
				return suffix;
			}
		}
	}

	if terms.is_empty() {
		return iri.to_string();
	}

	// shortest wins, ties broken lexicographically
	terms.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
	terms.into_iter().next().unwrap()
}

/// Returns the `@vocab`-relative suffix of `iri` if the vocabulary mapping
/// is a strict prefix and the suffix is not itself a term.
fn vocab_suffix(active_context: &Context, iri: &str) -> Option<String> {
	let vocab = active_context.vocab()?;
	if vocab.is_empty() {
		return None;
	}
	if iri.len() > vocab.len() && iri.starts_with(vocab) {
		let suffix = &iri[vocab.len()..];
		if !active_context.contains_term(suffix) {
			return Some(suffix.to_string());
		}
	}
	None
}

/// Collects CURIE candidates: `term:suffix` for every prefix-shaped term
/// whose IRI is a strict prefix of `iri`, provided the CURIE itself is not
/// a defined term.
fn collect_curies(active_context: &Context, iri: &str, terms: &mut Vec<String>) {
	for (term, definition) in active_context.terms() {
		// terms with colons cannot be prefixes
		if term.contains(':') {
			continue;
		}

		let Some(definition) = definition else {
			continue;
		};

		let prefix_iri = definition.iri.as_str();
		if !(prefix_iri.ends_with('/') || prefix_iri.ends_with('#'))
			|| iri == prefix_iri
			|| !iri.starts_with(prefix_iri)
		{
			continue;
		}

		let curie = format!("{}:{}", term, &iri[prefix_iri.len()..]);
		if !active_context.contains_term(&curie) {
			terms.push(curie);
		}
	}
}

/// Ranks a candidate term against the value it would hold.
///
/// Higher is better; zero removes the candidate. Lists rank as the sum of
/// their item ranks.
fn rank_term(active_context: &Context, definition: &TermDefinition, value: Option<&Value>) -> i64 {
	// no term restrictions for a null value
	let Some(value) = value else {
		return 3;
	};

	if utils::is_list(value) {
		let items = match value.as_object().and_then(|o| utils::first(o, "@list")) {
			Some(Value::Array(items)) => items.as_slice(),
			_ => &[],
		};

		if items.is_empty() {
			return if definition.container == Some(Container::List) {
				1
			} else {
				0
			};
		}

		return items
			.iter()
			.map(|item| rank_term(active_context, definition, Some(item)))
			.sum();
	}

	let has_type = definition.typ.is_some();
	let has_language = definition.language.is_some();
	let unrestricted = !has_type && !has_language;

	if utils::is_value(value) {
		let object = value.as_object().unwrap();

		if utils::has_key(object, "@type") {
			if has_type {
				let value_type = utils::first(object, "@type").and_then(Value::as_str);
				if value_type == definition.typ.as_deref() {
					return 3;
				}
			}
			return i64::from(unrestricted);
		}

		let inner = utils::first(object, "@value").unwrap();
		if !inner.is_string() {
			return if unrestricted { 2 } else { 1 };
		}

		match utils::first(object, "@language").and_then(Value::as_str) {
			None => {
				// the value carries no language: the term must pin language
				// to null, or carry no rules with no default in force
				let pins_null = has_language && definition.language == Some(None);
				if pins_null || (unrestricted && active_context.default_language().is_none()) {
					3
				} else {
					0
				}
			}
			Some(language) => {
				let matches = has_language
					&& definition.language.as_ref().unwrap().as_deref() == Some(language);
				let default_matches =
					unrestricted && active_context.default_language() == Some(language);
				if matches || default_matches {
					3
				} else {
					i64::from(unrestricted)
				}
			}
		}
	} else {
		// subjects and subject references favour `@id`-typed terms
		if definition.typ.as_deref() == Some("@id") {
			return 3;
		}
		i64::from(unrestricted)
	}
}
