//! Flattening.
//!
//! Reorganises expanded data into a node-indexed graph map: one subject map
//! per graph, plus an `@merged` view coalescing every graph.
use crate::error::Error;
use crate::keyword::is_keyword;
use crate::namer::UniqueNamer;
use crate::options::Options;
use crate::utils;
use indexmap::IndexMap;
use json_syntax::{Object, Value};

/// Graph name to subject map.
pub(crate) type GraphMap = IndexMap<String, IndexMap<String, Value>>;

/// Recursively flattens the subjects of the given expanded input into
/// `graphs`, renaming blank nodes along the way.
///
/// `name` carries the already-assigned identifier of the current input,
/// `list` the list array to append non-subject values to.
pub(crate) fn node_map(
	input: &Value,
	graphs: &mut GraphMap,
	graph: &str,
	namer: &mut UniqueNamer,
	name: Option<String>,
	mut list: Option<&mut Vec<Value>>,
	options: &Options,
) -> Result<(), Error> {
	if let Value::Array(items) = input {
		for item in items {
			node_map(item, graphs, graph, namer, None, list.as_deref_mut(), options)?;
		}
		return Ok(());
	}

	// non-subjects are only relevant inside lists
	let element = match input.as_object() {
		Some(object) if !utils::has_key(object, "@value") => object,
		_ => {
			if let Some(list) = list {
				list.push(input.clone());
			}
			return Ok(());
		}
	};

	let name = match name {
		Some(name) => name,
		None => {
			let id = utils::first(element, "@id").and_then(Value::as_str);
			if utils::is_blank_node(input) {
				namer.name(id)
			} else {
				id.expect("non-blank subjects carry an `@id`").to_string()
			}
		}
	};

	// lists hold references, not the subjects themselves
	if let Some(list) = list {
		list.push(reference(&name));
	}

	// create the subject, or merge into the existing one
	graphs.entry(graph.to_string()).or_default();
	{
		let subjects = graphs.get_mut(graph).unwrap();
		if !subjects.contains_key(&name) {
			subjects.insert(name.clone(), Value::Object(Object::new()));
		}
		subject_of(subjects, &name).insert("@id".into(), Value::String(name.as_str().into()));
	}

	for property in utils::sorted_keys(element)? {
		if property == "@id" {
			continue;
		}

		let values = utils::first(element, property).unwrap();

		// a nested `@graph` introduces a named graph, except in merged mode
		if property == "@graph" {
			graphs.entry(name.clone()).or_default();
			let target = if graph == "@merged" { graph } else { name.as_str() };
			let target = target.to_string();
			node_map(values, graphs, &target, namer, None, None, options)?;
			continue;
		}

		// ignored keys and non-`@type` keywords are copied as they are
		if options.is_ignored(property) || (property != "@type" && is_keyword(property)) {
			let subjects = graphs.get_mut(graph).unwrap();
			subject_of(subjects, &name).insert(property.into(), values.clone());
			continue;
		}

		for object in Value::force_as_array(values) {
			if utils::is_subject(object) || utils::is_subject_reference(object) {
				let object_id = object
					.as_object()
					.and_then(|o| utils::first(o, "@id"))
					.and_then(Value::as_str);
				let id = if utils::is_blank_node(object) {
					namer.name(object_id)
				} else {
					object_id
						.expect("non-blank subjects carry an `@id`")
						.to_string()
				};

				{
					let subjects = graphs.get_mut(graph).unwrap();
					utils::add_value(subject_of(subjects, &name), property, reference(&id), true);
				}

				node_map(object, graphs, graph, namer, Some(id), None, options)?;
			} else if utils::is_list(object) {
				let mut flattened = Vec::new();
				node_map(
					utils::first(object.as_object().unwrap(), "@list").unwrap(),
					graphs,
					graph,
					namer,
					None,
					Some(&mut flattened),
					options,
				)?;

				let mut list = Object::new();
				list.insert("@list".into(), Value::Array(flattened));
				let subjects = graphs.get_mut(graph).unwrap();
				utils::add_value(
					subject_of(subjects, &name),
					property,
					Value::Object(list),
					true,
				);
			} else {
				// rename blank node `@type` identifiers
				let object = match object.as_str() {
					Some(s) if property == "@type" && s.starts_with("_:") => {
						Value::String(namer.name(Some(s)).into())
					}
					_ => object.clone(),
				};

				let subjects = graphs.get_mut(graph).unwrap();
				utils::add_value(subject_of(subjects, &name), property, object, true);
			}
		}
	}

	Ok(())
}

fn subject_of<'a>(subjects: &'a mut IndexMap<String, Value>, name: &str) -> &'a mut Object {
	subjects
		.get_mut(name)
		.and_then(Value::as_object_mut)
		.expect("subject entries are objects")
}

fn reference(id: &str) -> Value {
	let mut object = Object::new();
	object.insert("@id".into(), Value::String(id.into()));
	Value::Object(object)
}

/// Builds the full graph map for the given expanded input: `@default`,
/// every named graph, and the `@merged` view. Each flattening pass gets a
/// fresh namer so blank node labels are stable per view.
pub(crate) fn graph_map(expanded: &Value, options: &Options) -> Result<GraphMap, Error> {
	let mut graphs: GraphMap = IndexMap::new();
	graphs.insert("@default".to_string(), IndexMap::new());
	graphs.insert("@merged".to_string(), IndexMap::new());

	let mut namer = UniqueNamer::new("_:t");
	node_map(expanded, &mut graphs, "@default", &mut namer, None, None, options)?;

	let mut namer = UniqueNamer::new("_:t");
	node_map(expanded, &mut graphs, "@merged", &mut namer, None, None, options)?;

	Ok(graphs)
}
