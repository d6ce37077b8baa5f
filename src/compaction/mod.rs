//! Document compaction.
//!
//! The inverse rewrite of expansion with respect to a chosen context:
//! absolute IRIs shorten back to terms, value objects collapse to bare
//! scalars where the context carries the coercion rules.
mod iri;

pub(crate) use iri::compact_iri;

use crate::container::Container;
use crate::context::Context;
use crate::error::Error;
use crate::options::Options;
use crate::utils;
use json_syntax::{Object, Value};

/// Recursively compacts an element using the given active context. The
/// element must be in expanded form.
pub(crate) fn compact_element(
	active_context: &Context,
	active_property: Option<&str>,
	element: &Value,
	options: &Options,
) -> Result<Value, Error> {
	match element {
		Value::Array(items) => {
			let mut result = Vec::with_capacity(items.len());
			for item in items {
				result.push(compact_element(
					active_context,
					active_property,
					item,
					options,
				)?);
			}

			// collapse singletons unless a container demands an array
			if result.len() == 1 {
				let container = active_context.container_of(active_property);
				if container != Some(Container::List) && container != Some(Container::Set) {
					return Ok(result.into_iter().next().unwrap());
				}
			}

			Ok(Value::Array(result))
		}
		Value::Object(object) => compact_object(active_context, active_property, object, options),
		// scalars are already compact
		scalar => Ok(scalar.clone()),
	}
}

fn compact_object(
	active_context: &Context,
	active_property: Option<&str>,
	element: &Object,
	options: &Options,
) -> Result<Value, Error> {
	// value objects may collapse to bare scalars
	if utils::has_key(element, "@value") {
		return Ok(compact_value(active_context, active_property, element));
	}

	// subject references compact to the bare identifier
	if element.len() == 1 && utils::has_key(element, "@id") {
		let typ = active_context.type_of(active_property);
		if typ == Some("@id") || active_property == Some("@graph") {
			if let Some(id) = utils::first(element, "@id").unwrap().as_str() {
				return Ok(Value::String(
					compact_iri(active_context, id, None, false).into(),
				));
			}
		}
	}

	let mut result = Object::new();

	for key in utils::sorted_keys(element)? {
		let value = utils::first(element, key).unwrap();

		// ignored keys pass through verbatim
		if options.is_ignored(key) {
			result.insert(key.into(), value.clone());
			continue;
		}

		if key == "@id" || key == "@type" {
			let is_type = key == "@type";
			let compacted = match value {
				Value::String(s) => {
					Value::String(compact_iri(active_context, s, None, is_type).into())
				}
				Value::Array(items) => Value::Array(
					items
						.iter()
						.map(|item| match item.as_str() {
							Some(s) => Value::String(
								compact_iri(active_context, s, None, is_type).into(),
							),
							None => item.clone(),
						})
						.collect(),
				),
				other => other.clone(),
			};

			let property = compact_iri(active_context, key, None, is_type);
			let is_empty_array = matches!(&compacted, Value::Array(items) if items.is_empty());
			utils::add_value(&mut result, &property, compacted, is_empty_array);
			continue;
		}

		// every other value is an array in expanded form; tolerate bare
		// values for the markers framing injects (`@preserve`)
		let Value::Array(items) = value else {
			let property = compact_iri(active_context, key, None, true);
			let compacted = compact_element(active_context, Some(&property), value, options)?;
			result.insert(property.into(), compacted);
			continue;
		};

		if items.is_empty() {
			let property = compact_iri(active_context, key, None, true);
			utils::add_value(&mut result, &property, Value::Array(Vec::new()), true);
		}

		for item in items {
			let item_is_list = utils::is_list(item);

			// the term choice depends on the value shape, item by item
			let property = compact_iri(active_context, key, Some(item), true);

			let inner = if item_is_list {
				utils::first(item.as_object().unwrap(), "@list").unwrap()
			} else {
				item
			};
			let mut compacted = compact_element(active_context, Some(&property), inner, options)?;

			let container = active_context.container_of(Some(&property));

			if item_is_list {
				if container == Some(Container::List) {
					// a second list landing on the same term would merge
					// ambiguously
					if options.strict && utils::has_key(&result, &property) {
						return Err(Error::ListCompaction { term: property });
					}
				} else {
					let kwlist = compact_iri(active_context, "@list", None, true);
					let mut list = Object::new();
					list.insert(kwlist.into(), compacted);
					compacted = Value::Object(list);
				}
			}

			let as_array = container == Some(Container::Set)
				|| container == Some(Container::List)
				|| matches!(&compacted, Value::Array(items) if items.is_empty());
			utils::add_value(&mut result, &property, compacted, as_array);
		}
	}

	Ok(Value::Object(result))
}

fn compact_value(active_context: &Context, active_property: Option<&str>, element: &Object) -> Value {
	let typ = active_context.type_of(active_property);
	let language = active_context.language_of(active_property);
	let value = utils::first(element, "@value").unwrap();

	if element.len() == 1 {
		// a bare `@value`: collapse unless a default language would
		// re-attach on expansion
		if language.is_none() || !value.is_string() {
			return value.clone();
		}

		let mut result = Object::new();
		result.insert(
			compact_iri(active_context, "@value", None, false).into(),
			value.clone(),
		);
		return Value::Object(result);
	}

	let element_type = utils::first(element, "@type").and_then(Value::as_str);
	let element_language = utils::first(element, "@language").and_then(Value::as_str);

	// the context carries matching coercion rules: collapse
	if typ.is_some() && element_type == typ {
		return value.clone();
	}
	if language.is_some() && element_language == language {
		return value.clone();
	}

	// otherwise rebuild the value object with aliased keywords
	let mut result = Object::new();
	if let Some(element_type) = element_type {
		result.insert(
			compact_iri(active_context, "@type", None, false).into(),
			Value::String(compact_iri(active_context, element_type, None, true).into()),
		);
	} else if let Some(element_language) = element_language {
		result.insert(
			compact_iri(active_context, "@language", None, false).into(),
			Value::String(element_language.into()),
		);
	}
	result.insert(
		compact_iri(active_context, "@value", None, false).into(),
		value.clone(),
	);
	Value::Object(result)
}
