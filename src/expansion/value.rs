use crate::context::Context;
use crate::error::Error;
use crate::keyword::is_keyword;
use crate::utils;
use json_syntax::{Object, Value};

/// Expands a scalar value using the coercion and keyword rules of the
/// active context.
pub(crate) fn expand_value(
	active_context: &Context,
	active_property: Option<&str>,
	value: &Value,
) -> Value {
	let expanded_property =
		active_property.and_then(|p| active_context.expand_iri(p, false, true));
	let ep = expanded_property.as_deref();

	// `@id` and `@type` values are IRIs, not value objects
	if ep == Some("@id") {
		if let Some(s) = value.as_str() {
			return expanded_iri_value(active_context, s, false);
		}
	} else if ep == Some("@type") {
		if let Some(s) = value.as_str() {
			return expanded_iri_value(active_context, s, true);
		}
	}

	let typ = active_context.type_of(active_property);

	// `@id` coercion (automatic for string values of `@graph`)
	if typ == Some("@id") || (ep == Some("@graph") && value.is_string()) {
		if let Some(s) = value.as_str() {
			return node_reference(active_context, s, false);
		}
	}

	if typ == Some("@vocab") {
		if let Some(s) = value.as_str() {
			return node_reference(active_context, s, true);
		}
	}

	// keyword values are kept as they are
	if ep.is_some_and(is_keyword) {
		return value.clone();
	}

	let mut result = Object::new();
	if let Some(typ) = typ {
		result.insert("@type".into(), Value::String(typ.into()));
	} else if value.is_string() {
		if let Some(language) = active_context.language_of(active_property) {
			result.insert("@language".into(), Value::String(language.into()));
		}
	}
	result.insert("@value".into(), value.clone());
	Value::Object(result)
}

fn expanded_iri_value(active_context: &Context, value: &str, vocab: bool) -> Value {
	let expanded = active_context
		.expand_iri(value, true, vocab)
		.unwrap_or_else(|| value.to_string());
	Value::String(expanded.into())
}

fn node_reference(active_context: &Context, value: &str, vocab: bool) -> Value {
	let expanded = active_context
		.expand_iri(value, true, vocab)
		.unwrap_or_else(|| value.to_string());
	let mut result = Object::new();
	result.insert("@id".into(), Value::String(expanded.into()));
	Value::Object(result)
}

/// Expands a language map into an array of language-tagged values, in
/// lexicographical language order.
pub(crate) fn expand_language_map(map: &Object) -> Result<Value, Error> {
	let mut result = Vec::new();

	for language in utils::sorted_keys(map)? {
		let values = utils::first(map, language).unwrap();
		for item in Value::force_as_array(values) {
			let Some(item) = item.as_str() else {
				return Err(Error::InvalidLanguageMapValue {
					value: item.clone(),
				});
			};

			let mut tagged = Object::new();
			tagged.insert("@value".into(), Value::String(item.into()));
			tagged.insert(
				"@language".into(),
				Value::String(language.to_lowercase().into()),
			);
			result.push(Value::Object(tagged));
		}
	}

	Ok(Value::Array(result))
}

/// Checks that the given value is a valid `@type` value: a string, a
/// subject reference, an empty object, or an array of strings and subject
/// references.
pub(crate) fn validate_type_value(value: &Value) -> Result<(), Error> {
	match value {
		Value::String(_) => Ok(()),
		Value::Object(o) if o.is_empty() || utils::has_key(o, "@id") => Ok(()),
		Value::Array(items)
			if items.iter().all(|item| {
				item.is_string()
					|| item.as_object().is_some_and(|o| utils::has_key(o, "@id"))
			}) =>
		{
			Ok(())
		}
		other => Err(Error::InvalidTypeValue {
			value: other.clone(),
		}),
	}
}
