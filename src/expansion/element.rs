use super::{expand_array, expand_language_map, expand_value, validate_type_value};
use crate::container::Container;
use crate::context::{process_context, Context};
use crate::error::Error;
use crate::iri;
use crate::keyword::is_keyword;
use crate::options::Options;
use crate::utils;
use json_syntax::{Object, Value};
use log::warn;

/// Recursively expands an element using the given active context.
///
/// Returns `None` when the element is dropped: null values, free-floating
/// scalars and nodes yielding no triples.
pub(crate) fn expand_element(
	active_context: &Context,
	active_property: Option<&str>,
	element: &Value,
	inside_list: bool,
	options: &Options,
) -> Result<Option<Value>, Error> {
	match element {
		Value::Null => Ok(None),
		Value::Array(items) => {
			expand_array(active_context, active_property, items, inside_list, options)
		}
		Value::Object(object) => {
			expand_object(active_context, active_property, object, inside_list, options)
		}
		scalar => {
			// drop free-floating scalars that are not in lists
			let expanded_active_property =
				active_property.and_then(|p| active_context.expand_iri(p, false, true));
			if !inside_list
				&& (active_property.is_none()
					|| expanded_active_property.as_deref() == Some("@graph"))
			{
				return Ok(None);
			}

			Ok(Some(expand_value(active_context, active_property, scalar)))
		}
	}
}

fn expand_object(
	context: &Context,
	active_property: Option<&str>,
	element: &Object,
	inside_list: bool,
	options: &Options,
) -> Result<Option<Value>, Error> {
	// if the element has a local context, process it first
	let processed;
	let active_context = match utils::get_unique(element, "@context")? {
		Some(local) => {
			processed = process_context(context, local, options)?;
			&processed
		}
		None => context,
	};

	let expanded_active_property =
		active_property.and_then(|p| active_context.expand_iri(p, false, true));
	let eap = expanded_active_property.as_deref();

	let mut result = Object::new();

	for key in utils::sorted_keys(element)? {
		if key == "@context" {
			continue;
		}

		let value = utils::first(element, key).unwrap();

		let Some(expanded_property) = active_context.expand_iri(key, false, true) else {
			continue;
		};

		// drop keys that do not expand to a keyword or an absolute IRI
		if !(is_keyword(&expanded_property) || iri::is_absolute_iri(&expanded_property)) {
			warn!("dropping key `{key}`: expands to neither a keyword nor an absolute IRI");
			continue;
		}

		if is_keyword(&expanded_property) && eap == Some("@reverse") {
			return Err(Error::InvalidReversePropertyName {
				value: value.clone(),
			});
		}

		match expanded_property.as_str() {
			"@id" if !value.is_string() => {
				return Err(Error::InvalidIdValue {
					value: value.clone(),
				})
			}
			"@type" => validate_type_value(value)?,
			"@graph" if !(value.is_object() || value.is_array()) => {
				return Err(Error::InvalidGraphValue {
					value: value.clone(),
				})
			}
			"@value" if value.is_object() || value.is_array() => {
				return Err(Error::InvalidValueObjectValue {
					value: value.clone(),
				})
			}
			"@language" if !value.is_string() => {
				return Err(Error::InvalidLanguageValue {
					value: value.clone(),
				})
			}
			"@index" if !value.is_string() => {
				return Err(Error::InvalidIndexValue {
					value: value.clone(),
				})
			}
			"@reverse" => {
				let Value::Object(_) = value else {
					return Err(Error::InvalidReverseValue {
						value: value.clone(),
					});
				};

				let expanded_value =
					expand_element(active_context, Some("@reverse"), value, inside_list, options)?;

				if let Some(Value::Object(expanded_value)) = expanded_value {
					// double-reversed properties land back on the node
					if let Some(Value::Object(reverse)) = utils::first(&expanded_value, "@reverse")
					{
						for entry in reverse.entries() {
							utils::add_value(
								&mut result,
								entry.key.as_str(),
								entry.value.clone(),
								true,
							);
						}
					}

					// everything else becomes a reverse property
					for entry in expanded_value.entries() {
						if entry.key.as_str() == "@reverse" {
							continue;
						}

						let reverse_map = reverse_map_of(&mut result);
						utils::add_value(
							reverse_map,
							entry.key.as_str(),
							Value::Array(Vec::new()),
							true,
						);
						for item in Value::force_as_array(&entry.value) {
							if utils::is_value(item) || utils::is_list(item) {
								return Err(Error::InvalidReversePropertyValue {
									value: item.clone(),
								});
							}
							utils::add_value(reverse_map, entry.key.as_str(), item.clone(), true);
						}
					}
				}

				continue;
			}
			_ => (),
		}

		let container = active_context.container_of(Some(key));

		let expanded_value = if container == Some(Container::Language) && value.is_object() {
			Some(expand_language_map(value.as_object().unwrap())?)
		} else if container == Some(Container::Index) && value.is_object() {
			Some(expand_index_map(
				active_context,
				key,
				value.as_object().unwrap(),
				options,
			)?)
		} else {
			let is_list_property = expanded_property == "@list";
			if is_list_property || expanded_property == "@set" {
				// a `@list` directly under `@graph` does not propagate the
				// active property
				let next_active_property = if is_list_property && eap == Some("@graph") {
					None
				} else {
					active_property
				};

				let expanded = expand_element(
					active_context,
					next_active_property,
					value,
					is_list_property,
					options,
				)?;

				if is_list_property {
					if let Some(e) = &expanded {
						if utils::is_list(e) {
							return Err(Error::ListOfLists);
						}
					}
				}

				expanded
			} else {
				expand_element(active_context, Some(key), value, false, options)?
			}
		};

		// drop null values, unless the property is `@value`
		let expanded_value = match expanded_value {
			Some(value) => value,
			None if expanded_property == "@value" => Value::Null,
			None => continue,
		};

		// honour a `@list` container
		let expanded_value = if expanded_property != "@list"
			&& !utils::is_list(&expanded_value)
			&& container == Some(Container::List)
		{
			let items = match expanded_value {
				Value::Array(items) => items,
				value => vec![value],
			};
			let mut list = Object::new();
			list.insert("@list".into(), Value::Array(items));
			Value::Object(list)
		} else {
			expanded_value
		};

		// reverse terms populate the `@reverse` map instead
		if active_context.get(key).is_some_and(|def| def.reverse) {
			let reverse_map = reverse_map_of(&mut result);
			let items = match expanded_value {
				Value::Array(items) => items,
				value => vec![value],
			};
			for item in items {
				if utils::is_value(&item) || utils::is_list(&item) {
					return Err(Error::InvalidReversePropertyValue { value: item });
				}
				utils::add_value(reverse_map, &expanded_property, item, true);
			}
			continue;
		}

		// use an array for everything but the scalar-valued keywords
		let use_array = !matches!(
			expanded_property.as_str(),
			"@index" | "@id" | "@type" | "@value" | "@language"
		);
		utils::add_value(&mut result, &expanded_property, expanded_value, use_array);
	}

	finalize_object(result, active_property, eap, inside_list, options)
}

/// Returns the `@reverse` map of the given node, creating it on first use.
fn reverse_map_of(result: &mut Object) -> &mut Object {
	if !utils::has_key(result, "@reverse") {
		result.insert("@reverse".into(), Value::Object(Object::new()));
	}

	match result.get_unique_mut("@reverse").ok().flatten() {
		Some(Value::Object(map)) => map,
		_ => unreachable!("`@reverse` entry is always a map"),
	}
}

fn expand_index_map(
	active_context: &Context,
	key: &str,
	value: &Object,
	options: &Options,
) -> Result<Value, Error> {
	let mut result = Vec::new();

	for index in utils::sorted_keys(value)? {
		let index_value = utils::first(value, index).unwrap();
		let as_array;
		let index_value = if index_value.is_array() {
			index_value
		} else {
			as_array = Value::Array(vec![index_value.clone()]);
			&as_array
		};

		let expanded = expand_element(active_context, Some(key), index_value, false, options)?;
		if let Some(Value::Array(items)) = expanded {
			for mut item in items {
				if let Value::Object(object) = &mut item {
					if !utils::has_key(object, "@index") {
						object.insert("@index".into(), Value::String(index.into()));
					}
					result.push(item);
				}
			}
		}
	}

	Ok(Value::Array(result))
}

fn finalize_object(
	mut result: Object,
	active_property: Option<&str>,
	expanded_active_property: Option<&str>,
	inside_list: bool,
	options: &Options,
) -> Result<Option<Value>, Error> {
	let count = result.len();
	let has_value = utils::has_key(&result, "@value");

	if has_value {
		// `@value` admits at most one of `@type`/`@language`, plus `@index`
		if utils::has_key(&result, "@type") && utils::has_key(&result, "@language") {
			return Err(Error::InvalidValueObject {
				element: Value::Object(result),
			});
		}

		let mut valid_count = count - 1;
		if utils::has_key(&result, "@type") || utils::has_key(&result, "@language") {
			valid_count -= 1;
		}
		if utils::has_key(&result, "@index") {
			valid_count -= 1;
		}
		if valid_count != 0 {
			return Err(Error::InvalidValueObject {
				element: Value::Object(result),
			});
		}

		let value = utils::first(&result, "@value").unwrap();
		if value.is_null() {
			// drop null `@value`s entirely
			return Ok(None);
		}
		if !value.is_string() && utils::has_key(&result, "@language") {
			// `@language` only applies to strings
			result.remove("@language");
		}
	} else if utils::has_key(&result, "@type") {
		// `@type` is always kept in array form
		let typ = result
			.get_unique_mut("@type")
			.ok()
			.flatten()
			.expect("entry just checked");
		if !typ.is_array() {
			let single = std::mem::replace(typ, Value::Null);
			*typ = Value::Array(vec![single]);
		}
	} else if utils::has_key(&result, "@set") || utils::has_key(&result, "@list") {
		if count > 1 && !(count == 2 && utils::has_key(&result, "@index")) {
			return Err(Error::InvalidSetOrListObject {
				element: Value::Object(result),
			});
		}

		// `@set` unwraps to its content
		if utils::has_key(&result, "@set") {
			let set = utils::first(&result, "@set").unwrap().clone();
			return Ok(Some(set));
		}
	} else if count == 1 && utils::has_key(&result, "@language") {
		// an object with only `@language` is meaningless
		return Ok(None);
	}

	// drop free-floating nodes that yield no triples
	if !options.keep_free_floating_nodes
		&& !inside_list
		&& (active_property.is_none() || expanded_active_property == Some("@graph"))
	{
		if count == 0 || has_value {
			return Ok(None);
		}

		let has_triples = result.entries().iter().any(|entry| {
			let key = entry.key.as_str();
			!is_keyword(key) || key == "@graph" || key == "@type" || key == "@reverse"
		});
		if !has_triples {
			return Ok(None);
		}
	}

	Ok(Some(Value::Object(result)))
}
