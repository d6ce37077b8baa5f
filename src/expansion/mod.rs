//! Document expansion.
//!
//! Rewrites a contextualised document into its canonical expanded form:
//! no terms, no shortcuts, only absolute IRIs and keywords as keys.
mod element;
mod value;

pub(crate) use element::expand_element;
pub(crate) use value::{expand_language_map, expand_value, validate_type_value};

use crate::context::Context;
use crate::error::Error;
use crate::options::Options;
use crate::utils;
use json_syntax::Value;

/// Expands the given document.
///
/// The result is always an array of node objects. All `@context` references
/// must have been dereferenced to inline objects beforehand.
pub fn expand(input: &Value, options: &Options) -> Result<Value, Error> {
	let active_context = Context::new(options.base.clone());
	let expanded = expand_element(&active_context, None, input, false, options)?;

	// optimize away a single `@graph` wrapper
	let expanded = match expanded {
		Some(Value::Object(object))
			if object.len() == 1 && utils::has_key(&object, "@graph") =>
		{
			Some(utils::first(&object, "@graph").unwrap().clone())
		}
		other => other,
	};

	Ok(match expanded {
		Some(value @ Value::Array(_)) => value,
		Some(value) => Value::Array(vec![value]),
		None => Value::Array(Vec::new()),
	})
}

pub(crate) fn expand_array(
	active_context: &Context,
	active_property: Option<&str>,
	items: &[Value],
	inside_list: bool,
	options: &Options,
) -> Result<Option<Value>, Error> {
	let mut result = Vec::new();

	for item in items {
		let expanded = expand_element(active_context, active_property, item, inside_list, options)?;

		if inside_list {
			if let Some(e) = &expanded {
				if e.is_array() || utils::is_list(e) {
					return Err(Error::ListOfLists);
				}
			}
		}

		match expanded {
			Some(Value::Array(values)) => result.extend(values),
			Some(value) => result.push(value),
			None => (),
		}
	}

	Ok(Some(Value::Array(result)))
}
