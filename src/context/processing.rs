//! Context processing algorithm.
use super::{Context, TermDefinition};
use crate::container::Container;
use crate::error::Error;
use crate::iri;
use crate::keyword::is_keyword;
use crate::options::Options;
use crate::utils;
use iref::IriBuf;
use json_syntax::{Object, Value};
use std::collections::HashMap;

/// Applies a local context to an active context, producing a new active
/// context.
///
/// The local context may be null, an object, an array of objects, or a
/// `{"@context": …}` wrapper around any of those. All remote context
/// references must have been dereferenced to inline objects beforehand; the
/// processor performs no I/O.
pub fn process_context(
	active_context: &Context,
	local_context: &Value,
	options: &Options,
) -> Result<Context, Error> {
	let mut result = active_context.clone();

	// unwrap a `{"@context": …}` wrapper
	let local = match local_context.as_object().and_then(|o| utils::first(o, "@context")) {
		Some(inner) => inner,
		None => local_context,
	};

	for context in Value::force_as_array(local) {
		match context {
			// a null context resets to the initial context
			Value::Null => result = Context::new(options.base.clone()),
			Value::Object(context) => process_context_object(&mut result, context, options)?,
			other => {
				return Err(Error::InvalidLocalContext {
					context: other.clone(),
				})
			}
		}
	}

	Ok(result)
}

fn process_context_object(
	result: &mut Context,
	context: &Object,
	options: &Options,
) -> Result<(), Error> {
	let mut defined: HashMap<String, bool> = HashMap::new();

	if let Some(base) = utils::get_unique(context, "@base")? {
		match base {
			Value::Null => result.set_base(options.base.clone()),
			Value::String(s) if s.is_empty() => result.set_base(None),
			Value::String(s) if iri::is_absolute_iri(s) => {
				match IriBuf::new(s.to_string()) {
					Ok(iri) => result.set_base(Some(iri)),
					Err(_) => {
						return Err(Error::InvalidBaseIri {
							value: base.clone(),
						})
					}
				}
			}
			other => {
				return Err(Error::InvalidBaseIri {
					value: other.clone(),
				})
			}
		}
		defined.insert("@base".to_string(), true);
	}

	if let Some(vocab) = utils::get_unique(context, "@vocab")? {
		match vocab {
			Value::Null => result.set_vocab(None),
			// an empty vocabulary mapping defers to the base IRI
			Value::String(s) if s.is_empty() || iri::is_absolute_iri(s) => {
				result.set_vocab(Some(s.to_string()))
			}
			other => {
				return Err(Error::InvalidVocabMapping {
					value: other.clone(),
				})
			}
		}
		defined.insert("@vocab".to_string(), true);
	}

	if let Some(language) = utils::get_unique(context, "@language")? {
		match language {
			Value::Null => result.set_default_language(None),
			Value::String(s) => result.set_default_language(Some(s.to_lowercase())),
			other => {
				return Err(Error::InvalidDefaultLanguage {
					value: other.clone(),
				})
			}
		}
		defined.insert("@language".to_string(), true);
	}

	for entry in context.entries() {
		create_term_definition(result, context, entry.key.as_str(), &mut defined)?;
	}

	Ok(())
}

/// Creates a term definition during context processing.
///
/// The `defined` map tracks the definition state of every term of the local
/// context: absent means not yet touched, `false` means currently being
/// defined, `true` means defined. Meeting a term in the `false` state is a
/// cyclical context definition.
pub(crate) fn create_term_definition(
	active: &mut Context,
	local: &Object,
	term: &str,
	defined: &mut HashMap<String, bool>,
) -> Result<(), Error> {
	match defined.get(term) {
		Some(true) => return Ok(()),
		Some(false) => {
			return Err(Error::CyclicalContext {
				term: term.to_string(),
			})
		}
		None => (),
	}

	defined.insert(term.to_string(), false);

	if is_keyword(term) {
		return Err(Error::KeywordRedefinition {
			term: term.to_string(),
		});
	}

	active.remove_term(term);

	let value = match utils::get_unique(local, term)? {
		Some(value) => value,
		None => &Value::Null,
	};

	// a null value, or an object with a null `@id`, suppresses the term
	let is_tombstone = value.is_null()
		|| value
			.as_object()
			.is_some_and(|o| utils::first(o, "@id").is_some_and(Value::is_null));
	if is_tombstone {
		active.set_term(term, None);
		defined.insert(term.to_string(), true);
		return Ok(());
	}

	// short-hand string values are equivalent to `{"@id": value}`
	let expanded_shorthand;
	let value = match value {
		Value::String(id) => {
			let mut object = Object::new();
			object.insert("@id".into(), Value::String(id.clone()));
			expanded_shorthand = object;
			&expanded_shorthand
		}
		Value::Object(object) => object,
		_ => {
			return Err(Error::InvalidTermDefinition {
				term: term.to_string(),
			})
		}
	};

	let mut definition = TermDefinition::new(String::new());

	if let Some(reverse) = utils::get_unique(value, "@reverse")? {
		if utils::has_key(value, "@id")
			|| utils::has_key(value, "@type")
			|| utils::has_key(value, "@language")
		{
			return Err(Error::InvalidReverseProperty {
				term: term.to_string(),
			});
		}

		let reverse = reverse.as_str().ok_or_else(|| Error::InvalidReverseProperty {
			term: term.to_string(),
		})?;

		definition.iri = expand_iri_defining(active, reverse, false, true, local, defined)?
			.ok_or_else(|| Error::InvalidIriMapping {
				term: term.to_string(),
			})?;
		definition.typ = Some("@id".to_string());
		definition.reverse = true;
	} else {
		if let Some(id) = utils::get_unique(value, "@id")? {
			let id = id.as_str().ok_or_else(|| Error::InvalidIriMapping {
				term: term.to_string(),
			})?;

			// an `@id` equal to the term itself is treated as absent
			if id != term {
				definition.iri =
					expand_iri_defining(active, id, false, true, local, defined)?
						.ok_or_else(|| Error::InvalidIriMapping {
							term: term.to_string(),
						})?;
			}
		}

		if definition.iri.is_empty() {
			if let Some((prefix, suffix)) = term.split_once(':') {
				if utils::has_key(local, prefix) {
					create_term_definition(active, local, prefix, defined)?;
				}

				match active.get(prefix) {
					Some(prefix_definition) => {
						definition.iri = format!("{}{}", prefix_definition.iri, suffix)
					}
					// the term is itself an absolute IRI
					None => definition.iri = term.to_string(),
				}
			} else if let Some(vocab) = active.vocab() {
				definition.iri = format!("{vocab}{term}");
			} else {
				return Err(Error::InvalidIriMapping {
					term: term.to_string(),
				});
			}
		}
	}

	// the IRI mapping is now established
	defined.insert(term.to_string(), true);

	if !definition.reverse {
		if let Some(typ) = utils::get_unique(value, "@type")? {
			let typ = typ.as_str().ok_or_else(|| Error::InvalidTypeMapping {
				term: term.to_string(),
			})?;

			if typ == "@id" {
				definition.typ = Some("@id".to_string());
			} else {
				definition.typ =
					Some(
						expand_iri_defining(active, typ, true, true, local, defined)?
							.ok_or_else(|| Error::InvalidTypeMapping {
								term: term.to_string(),
							})?,
					);
			}
		}
	}

	if let Some(container) = utils::get_unique(value, "@container")? {
		let container = container
			.as_str()
			.and_then(|s| Container::from_str(s).ok())
			.ok_or_else(|| Error::InvalidContainerMapping {
				term: term.to_string(),
			})?;

		if definition.reverse && container != Container::Index {
			return Err(Error::InvalidReverseProperty {
				term: term.to_string(),
			});
		}

		definition.container = Some(container);
	}

	if !utils::has_key(value, "@type") {
		if let Some(language) = utils::get_unique(value, "@language")? {
			match language {
				Value::Null => definition.language = Some(None),
				Value::String(s) => definition.language = Some(Some(s.to_lowercase())),
				_ => {
					return Err(Error::InvalidLanguageMapping {
						term: term.to_string(),
					})
				}
			}
		}
	}

	if definition.iri == "@context" || definition.iri == "@preserve" {
		return Err(Error::InvalidKeywordAlias {
			term: term.to_string(),
		});
	}

	active.set_term(term, Some(definition));
	Ok(())
}

/// Expands a string to an absolute IRI during context processing.
///
/// Same resolution as [`Context::expand_iri`], except that terms of the
/// local context are defined on demand and a value that does not reach an
/// absolute IRI, keyword or blank node identifier is a syntax error.
fn expand_iri_defining(
	active: &mut Context,
	value: &str,
	relative_to_base: bool,
	relative_to_vocab: bool,
	local: &Object,
	defined: &mut HashMap<String, bool>,
) -> Result<Option<String>, Error> {
	if is_keyword(value) {
		return Ok(Some(value.to_string()));
	}

	if utils::has_key(local, value) && defined.get(value) != Some(&true) {
		create_term_definition(active, local, value, defined)?;
	}

	if relative_to_vocab {
		if active.is_suppressed(value) {
			return Ok(None);
		}

		if let Some(definition) = active.get(value) {
			return Ok(Some(definition.iri.clone()));
		}
	}

	if let Some((prefix, suffix)) = value.split_once(':') {
		if prefix == "_" || suffix.starts_with("//") {
			return Ok(Some(value.to_string()));
		}

		if utils::has_key(local, prefix) && defined.get(prefix) != Some(&true) {
			create_term_definition(active, local, prefix, defined)?;
		}

		if let Some(definition) = active.get(prefix) {
			return Ok(Some(format!("{}{}", definition.iri, suffix)));
		}

		return Ok(Some(value.to_string()));
	}

	if relative_to_vocab {
		if let Some(vocab) = active.vocab() {
			if !vocab.is_empty() {
				return Ok(Some(format!("{vocab}{value}")));
			}

			let resolved = iri::resolve(active.base().map(|b| b.as_str()), value);
			if !iri::is_absolute_iri(&resolved) {
				return Err(Error::ContextValueNotAbsolute { value: resolved });
			}
			return Ok(Some(resolved));
		}
	}

	let resolved = if relative_to_base {
		iri::resolve(active.base().map(|b| b.as_str()), value)
	} else {
		value.to_string()
	};

	if !iri::is_absolute_iri(&resolved) {
		return Err(Error::ContextValueNotAbsolute { value: resolved });
	}

	Ok(Some(resolved))
}
