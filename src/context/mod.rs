//! Active context and term resolution.
mod processing;

pub use processing::process_context;

use crate::container::Container;
use crate::iri;
use crate::keyword::{is_keyword, Keyword};
use indexmap::IndexMap;
use iref::IriBuf;

/// Term definition.
///
/// Created by the context processor and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TermDefinition {
	/// Absolute IRI, or keyword for keyword aliases.
	pub iri: String,

	/// Type coercion: an absolute IRI, `@id` or `@vocab`.
	pub typ: Option<String>,

	/// Container mapping.
	pub container: Option<Container>,

	/// Language mapping; `Some(None)` is an explicit null pinning values to
	/// no language.
	pub language: Option<Option<String>>,

	/// Whether the term is a reverse property.
	pub reverse: bool,
}

impl TermDefinition {
	pub(crate) fn new(iri: String) -> Self {
		Self {
			iri,
			typ: None,
			container: None,
			language: None,
			reverse: false,
		}
	}
}

/// Processed context.
///
/// Holds the bindings in force during an operation: base IRI, vocabulary
/// mapping, default language, term definitions and keyword aliases. The
/// context processor clones the active context before any mutation; callers
/// only ever observe the returned value.
#[derive(Clone, Debug, Default)]
pub struct Context {
	base: Option<IriBuf>,
	vocab: Option<String>,
	default_language: Option<String>,
	terms: IndexMap<String, Option<TermDefinition>>,
	keyword_aliases: IndexMap<Keyword, Vec<String>>,
}

impl Context {
	/// Creates a new empty context with the given base IRI.
	pub fn new(base: Option<IriBuf>) -> Self {
		Self {
			base,
			..Self::default()
		}
	}

	/// Returns the base IRI.
	pub fn base(&self) -> Option<&IriBuf> {
		self.base.as_ref()
	}

	pub(crate) fn set_base(&mut self, base: Option<IriBuf>) {
		self.base = base;
	}

	/// Returns the `@vocab` mapping.
	pub fn vocab(&self) -> Option<&str> {
		self.vocab.as_deref()
	}

	pub(crate) fn set_vocab(&mut self, vocab: Option<String>) {
		self.vocab = vocab;
	}

	/// Returns the default `@language`.
	pub fn default_language(&self) -> Option<&str> {
		self.default_language.as_deref()
	}

	pub(crate) fn set_default_language(&mut self, language: Option<String>) {
		self.default_language = language;
	}

	/// Returns the definition of the given term, if any.
	///
	/// Both undefined and explicitly suppressed terms yield `None`; use
	/// [`Self::is_suppressed`] to tell them apart.
	pub fn get(&self, term: &str) -> Option<&TermDefinition> {
		self.terms.get(term).and_then(Option::as_ref)
	}

	/// Checks if the given term carries an explicit null definition.
	pub fn is_suppressed(&self, term: &str) -> bool {
		matches!(self.terms.get(term), Some(None))
	}

	/// Checks if the given term is bound, tombstones included.
	pub fn contains_term(&self, term: &str) -> bool {
		self.terms.contains_key(term)
	}

	/// Checks if no terms are defined.
	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
			&& self.vocab.is_none()
			&& self.default_language.is_none()
	}

	/// Iterates over the term bindings in definition order.
	pub fn terms(&self) -> impl Iterator<Item = (&str, Option<&TermDefinition>)> {
		self.terms.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
	}

	/// Returns the shortest alias of the given keyword, if any.
	pub fn keyword_alias(&self, keyword: Keyword) -> Option<&str> {
		self.keyword_aliases
			.get(&keyword)
			.and_then(|aliases| aliases.first())
			.map(String::as_str)
	}

	/// Defines or redefines a term, keeping the keyword alias table in sync.
	pub(crate) fn set_term(&mut self, term: &str, definition: Option<TermDefinition>) {
		self.remove_term(term);

		if let Some(definition) = &definition {
			if let Ok(keyword) = Keyword::try_from(definition.iri.as_str()) {
				let aliases = self
					.keyword_aliases
					.entry(keyword)
					.or_insert_with(Vec::new);
				if !aliases.iter().any(|a| a == term) {
					aliases.push(term.to_string());
					// shortest first, ties broken lexicographically
					aliases.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
				}
			}
		}

		self.terms.insert(term.to_string(), definition);
	}

	pub(crate) fn remove_term(&mut self, term: &str) {
		if let Some(Some(old)) = self.terms.shift_remove(term) {
			if let Ok(keyword) = Keyword::try_from(old.iri.as_str()) {
				if let Some(aliases) = self.keyword_aliases.get_mut(&keyword) {
					aliases.retain(|a| a != term);
				}
			}
		}
	}

	/// Returns the container mapping of the given property.
	pub fn container_of(&self, property: Option<&str>) -> Option<Container> {
		self.get(property?).and_then(|def| def.container)
	}

	/// Returns the type coercion of the given property.
	pub fn type_of(&self, property: Option<&str>) -> Option<&str> {
		self.get(property?).and_then(|def| def.typ.as_deref())
	}

	/// Returns the language in force for the given property: the term's
	/// language mapping when it carries one (an explicit null suppresses the
	/// default), otherwise the default language.
	pub fn language_of(&self, property: Option<&str>) -> Option<&str> {
		let mut language = self.default_language.as_deref();
		if let Some(def) = property.and_then(|p| self.get(p)) {
			if let Some(mapping) = &def.language {
				language = mapping.as_deref();
			}
		}
		language
	}

	/// Expands a string to an absolute IRI, keyword or blank node
	/// identifier.
	///
	/// The string may be a term, a CURIE, a relative IRI or an absolute IRI.
	/// Returns `None` when the string resolves to an explicitly suppressed
	/// term. Outside context processing a failure to reach an absolute IRI
	/// is not an error; the value is returned unchanged.
	pub fn expand_iri(
		&self,
		value: &str,
		relative_to_base: bool,
		relative_to_vocab: bool,
	) -> Option<String> {
		if is_keyword(value) {
			return Some(value.to_string());
		}

		if relative_to_vocab {
			if self.is_suppressed(value) {
				return None;
			}

			if let Some(def) = self.get(value) {
				return Some(def.iri.clone());
			}
		}

		if let Some((prefix, suffix)) = value.split_once(':') {
			// blank node identifiers and scheme-relative IRIs pass through
			if prefix == "_" || suffix.starts_with("//") {
				return Some(value.to_string());
			}

			if let Some(def) = self.get(prefix) {
				return Some(format!("{}{}", def.iri, suffix));
			}

			return Some(value.to_string());
		}

		if relative_to_vocab {
			if let Some(vocab) = &self.vocab {
				if vocab.is_empty() {
					// an empty vocabulary mapping resolves against the base
					return Some(iri::resolve(
						self.base.as_ref().map(|b| b.as_str()),
						value,
					));
				}
				return Some(format!("{vocab}{value}"));
			}
		}

		if relative_to_base {
			return Some(iri::resolve(
				self.base.as_ref().map(|b| b.as_str()),
				value,
			));
		}

		Some(value.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn context_with(term: &str, iri: &str) -> Context {
		let mut ctx = Context::default();
		ctx.set_term(term, Some(TermDefinition::new(iri.to_string())));
		ctx
	}

	#[test]
	fn expands_terms_and_curies() {
		let ctx = context_with("schema", "http://schema.org/");
		assert_eq!(
			ctx.expand_iri("schema", false, true),
			Some("http://schema.org/".to_string())
		);
		assert_eq!(
			ctx.expand_iri("schema:name", false, false),
			Some("http://schema.org/name".to_string())
		);
		assert_eq!(
			ctx.expand_iri("_:b0", false, true),
			Some("_:b0".to_string())
		);
	}

	#[test]
	fn vocab_and_base() {
		let mut ctx = Context::new(Some(IriBuf::new("http://a/b/".to_string()).unwrap()));
		assert_eq!(
			ctx.expand_iri("c", true, false),
			Some("http://a/b/c".to_string())
		);
		ctx.set_vocab(Some("http://vocab/".to_string()));
		assert_eq!(
			ctx.expand_iri("c", true, true),
			Some("http://vocab/c".to_string())
		);
	}

	#[test]
	fn suppressed_terms_expand_to_none() {
		let mut ctx = context_with("name", "http://schema.org/name");
		ctx.set_term("name", None);
		assert_eq!(ctx.expand_iri("name", false, true), None);
		assert!(ctx.is_suppressed("name"));
	}

	#[test]
	fn keyword_aliases_sorted_shortest_first() {
		let mut ctx = Context::default();
		ctx.set_term("identifier", Some(TermDefinition::new("@id".to_string())));
		ctx.set_term("id", Some(TermDefinition::new("@id".to_string())));
		assert_eq!(ctx.keyword_alias(Keyword::Id), Some("id"));
		ctx.remove_term("id");
		assert_eq!(ctx.keyword_alias(Keyword::Id), Some("identifier"));
	}
}
