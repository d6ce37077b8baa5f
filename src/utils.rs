use crate::error::Error;
use json_syntax::{BorrowUnordered, Object, Value};

/// Checks if the given value is a value object (carries `@value`).
pub fn is_value(v: &Value) -> bool {
	v.as_object().is_some_and(|o| has_key(o, "@value"))
}

/// Checks if the given value is a list object (carries `@list`).
pub fn is_list(v: &Value) -> bool {
	v.as_object().is_some_and(|o| has_key(o, "@list"))
}

/// Checks if the given value is a subject: an object that is neither a
/// value, a list nor a set, with more than a single entry or no `@id`.
pub fn is_subject(v: &Value) -> bool {
	v.as_object().is_some_and(|o| {
		!has_key(o, "@value")
			&& !has_key(o, "@list")
			&& !has_key(o, "@set")
			&& (o.len() > 1 || !has_key(o, "@id"))
	})
}

/// Checks if the given value is a subject reference: an object with only
/// an `@id` entry.
pub fn is_subject_reference(v: &Value) -> bool {
	v.as_object().is_some_and(|o| o.len() == 1 && has_key(o, "@id"))
}

/// Checks if the given value is a blank node: an object whose `@id`, if
/// any, is a blank node identifier, and which is not a value, set or list.
pub fn is_blank_node(v: &Value) -> bool {
	match v.as_object() {
		Some(o) => match first(o, "@id").and_then(Value::as_str) {
			Some(id) => crate::iri::is_blank_node_id(id),
			None => {
				o.is_empty()
					|| !(has_key(o, "@value") || has_key(o, "@set") || has_key(o, "@list"))
			}
		},
		None => false,
	}
}

pub(crate) fn has_key(object: &Object, key: &str) -> bool {
	object.get(key).next().is_some()
}

/// Returns the first value bound to `key`, ignoring eventual duplicates.
pub(crate) fn first<'a>(object: &'a Object, key: &str) -> Option<&'a Value> {
	object.get(key).next()
}

/// Returns the unique value bound to `key`, raising a syntax error on
/// duplicate entries.
pub(crate) fn get_unique<'a>(object: &'a Object, key: &str) -> Result<Option<&'a Value>, Error> {
	object.get_unique(key).map_err(Error::duplicate_key)
}

/// Returns the keys of `object` sorted lexicographically, raising a syntax
/// error on duplicate entries.
pub(crate) fn sorted_keys(object: &Object) -> Result<Vec<&str>, Error> {
	let mut keys: Vec<&str> = object.entries().iter().map(|e| e.key.as_str()).collect();
	keys.sort_unstable();
	for pair in keys.windows(2) {
		if pair[0] == pair[1] {
			return Err(Error::DuplicateKey {
				key: pair[0].to_string(),
			});
		}
	}
	Ok(keys)
}

/// Deep equality, disregarding object entry order.
pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
	a.as_unordered() == b.as_unordered()
}

/// JSON-LD equality: like [`json_eq`] but arrays are compared as multisets,
/// except inside `@list` entries where order is preserved.
pub fn json_ld_eq(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Array(x), Value::Array(y)) => unordered_array_eq(x, y),
		(Value::Object(x), Value::Object(y)) => {
			if x.len() != y.len() {
				return false;
			}
			let mut used = vec![false; y.len()];
			'outer: for entry in x.entries() {
				for (i, candidate) in y.entries().iter().enumerate() {
					if !used[i] && entry.key == candidate.key {
						let eq = if entry.key.as_str() == "@list" {
							ordered_eq(&entry.value, &candidate.value)
						} else {
							json_ld_eq(&entry.value, &candidate.value)
						};
						if eq {
							used[i] = true;
							continue 'outer;
						}
					}
				}
				return false;
			}
			true
		}
		_ => a == b,
	}
}

fn unordered_array_eq(x: &[Value], y: &[Value]) -> bool {
	if x.len() != y.len() {
		return false;
	}
	let mut used = vec![false; y.len()];
	'outer: for a in x {
		for (i, b) in y.iter().enumerate() {
			if !used[i] && json_ld_eq(a, b) {
				used[i] = true;
				continue 'outer;
			}
		}
		return false;
	}
	true
}

fn ordered_eq(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Array(x), Value::Array(y)) => {
			x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_ld_eq(a, b))
		}
		_ => json_ld_eq(a, b),
	}
}

/// Compares two values for equality under JSON-LD semantics: deep equality,
/// or matching `@value`/`@type`/`@language`/`@index` entries, or matching
/// `@id` entries.
pub(crate) fn compare_values(v1: &Value, v2: &Value) -> bool {
	if json_eq(v1, v2) {
		return true;
	}

	if is_value(v1) && is_value(v2) {
		let (a, b) = (v1.as_object().unwrap(), v2.as_object().unwrap());
		return entry_eq(a, b, "@value")
			&& entry_eq(a, b, "@type")
			&& entry_eq(a, b, "@language")
			&& entry_eq(a, b, "@index");
	}

	if let (Some(a), Some(b)) = (v1.as_object(), v2.as_object()) {
		if let (Some(ia), Some(ib)) = (first(a, "@id"), first(b, "@id")) {
			return json_eq(ia, ib);
		}
	}

	false
}

fn entry_eq(a: &Object, b: &Object, key: &str) -> bool {
	match (first(a, key), first(b, key)) {
		(Some(x), Some(y)) => json_eq(x, y),
		(None, None) => true,
		_ => false,
	}
}

/// Adds a value to a subject property, turning the entry into an array when
/// a second distinct value lands on it. Values already present (under
/// [`compare_values`]) are not added twice.
pub(crate) fn add_value(object: &mut Object, property: &str, value: Value, property_is_array: bool) {
	if let Value::Array(values) = value {
		if values.is_empty() && property_is_array && !has_key(object, property) {
			object.insert(property.into(), Value::Array(Vec::new()));
		}
		for v in values {
			add_value(object, property, v, property_is_array);
		}
	} else if has_key(object, property) {
		let present = has_value(object, property, &value);
		let entry = object
			.get_unique_mut(property)
			.ok()
			.flatten()
			.expect("entry just checked");

		if !entry.is_array() && (!present || property_is_array) {
			let single = std::mem::replace(entry, Value::Null);
			*entry = Value::Array(vec![single]);
		}

		if !present {
			if let Value::Array(items) = entry {
				items.push(value);
			}
		}
	} else {
		let value = if property_is_array {
			Value::Array(vec![value])
		} else {
			value
		};
		object.insert(property.into(), value);
	}
}

/// Checks if a subject property already holds the given value.
pub(crate) fn has_value(object: &Object, property: &str, value: &Value) -> bool {
	match first(object, property) {
		Some(Value::Array(items)) => items.iter().any(|v| compare_values(v, value)),
		Some(v) => compare_values(v, value),
		None => false,
	}
}

/// Removes every occurrence of the given value from a subject property.
pub(crate) fn remove_value(
	object: &mut Object,
	property: &str,
	value: &Value,
	property_is_array: bool,
) {
	let kept = match first(object, property) {
		Some(Value::Array(items)) => items
			.iter()
			.filter(|v| !compare_values(v, value))
			.cloned()
			.collect(),
		Some(v) => {
			if compare_values(v, value) {
				Vec::new()
			} else {
				vec![v.clone()]
			}
		}
		None => return,
	};

	object.remove(property);
	match kept.len() {
		0 => (),
		1 if !property_is_array => {
			object.insert(property.into(), kept.into_iter().next().unwrap());
		}
		_ => {
			object.insert(property.into(), Value::Array(kept));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use json_syntax::json;

	#[test]
	fn value_shapes() {
		assert!(is_value(&json!({ "@value": "a" })));
		assert!(is_list(&json!({ "@list": [] })));
		assert!(is_subject(&json!({ "@id": "http://e/a", "http://e/p": [1] })));
		assert!(is_subject(&json!({ "http://e/p": [1] })));
		assert!(!is_subject(&json!({ "@id": "http://e/a" })));
		assert!(is_subject_reference(&json!({ "@id": "http://e/a" })));
		assert!(is_blank_node(&json!({ "@id": "_:b0" })));
		assert!(is_blank_node(&json!({ "http://e/p": [1] })));
		assert!(!is_blank_node(&json!({ "@id": "http://e/a" })));
	}

	#[test]
	fn add_value_semantics() {
		let mut obj = Object::new();
		add_value(&mut obj, "p", json!(1), false);
		assert_eq!(first(&obj, "p"), Some(&json!(1)));
		add_value(&mut obj, "p", json!(2), false);
		assert_eq!(first(&obj, "p"), Some(&json!([1, 2])));
		// duplicates are not added twice
		add_value(&mut obj, "p", json!(1), false);
		assert_eq!(first(&obj, "p"), Some(&json!([1, 2])));
	}

	#[test]
	fn compare_expanded_values() {
		let a = json!({ "@value": "x", "@language": "en" });
		let b = json!({ "@language": "en", "@value": "x" });
		assert!(compare_values(&a, &b));
		let c = json!({ "@value": "x" });
		assert!(!compare_values(&a, &c));
		assert!(compare_values(
			&json!({ "@id": "http://e/a" }),
			&json!({ "@id": "http://e/a", "http://e/p": [1] })
		));
	}

	#[test]
	fn json_ld_equality_ignores_array_order() {
		let a = json!({ "p": [1, 2], "@list": [1, 2] });
		let b = json!({ "p": [2, 1], "@list": [1, 2] });
		assert!(json_ld_eq(&a, &b));
		let c = json!({ "p": [1, 2], "@list": [2, 1] });
		assert!(!json_ld_eq(&a, &c));
	}
}
