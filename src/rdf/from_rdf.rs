use super::{id_str, ObjectTerm, Statement, RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE};
use super::{XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER, XSD_STRING};
use crate::error::Error;
use crate::options::Options;
use crate::utils;
use indexmap::IndexMap;
use json_syntax::{NumberBuf, Object, Value};
use log::warn;
use rdf_types::{Id, LiteralType, Quad, Term};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Default)]
struct GraphData {
	subjects: IndexMap<String, Object>,
	list_map: IndexMap<String, ListEntry>,
}

#[derive(Default)]
struct ListEntry {
	first: Option<Value>,
	rest: Option<String>,
	head: bool,
}

/// Reconstructs an expanded JSON-LD document from RDF statements.
pub(crate) fn from_rdf(statements: &[Statement], options: &Options) -> Result<Value, Error> {
	let mut graphs: IndexMap<String, GraphData> = IndexMap::new();
	graphs.insert(String::new(), GraphData::default());

	for statement in statements {
		let Quad(subject, predicate, object, graph) = statement;
		let s = id_str(subject).to_string();
		let p = predicate.as_str();
		let name = graph.as_ref().map(id_str).unwrap_or("").to_string();

		// rdf:first/rdf:rest statements feed the list map
		if p == RDF_FIRST.as_str() {
			let graph = graphs.entry(name).or_default();
			graph.list_map.entry(s).or_default().first =
				Some(rdf_to_object(object, options));
			continue;
		}

		if p == RDF_REST.as_str() {
			if let Term::Id(Id::Blank(rest)) = object {
				let graph = graphs.entry(name).or_default();
				graph.list_map.entry(s).or_default().rest = Some(rest.to_string());
			}
			continue;
		}

		// named graphs appear as subjects of the default graph
		if !name.is_empty() {
			let default_graph = graphs.get_mut("").unwrap();
			if !default_graph.subjects.contains_key(&name) {
				default_graph
					.subjects
					.insert(name.clone(), subject_stub(&name));
			}
		}

		let graph = graphs.entry(name).or_default();
		let value = graph
			.subjects
			.entry(s)
			.or_insert_with_key(|id| subject_stub(id));

		if p == RDF_TYPE.as_str() && !options.use_rdf_type {
			match object {
				Term::Id(id) => utils::add_value(
					value,
					"@type",
					Value::String(id_str(id).into()),
					true,
				),
				Term::Literal(_) => warn!("ignoring literal rdf:type object"),
			}
		} else {
			utils::add_value(value, p, rdf_to_object(object, options), true);

			// a blank node object might be the head of a list
			if let Term::Id(Id::Blank(blank)) = object {
				graph.list_map.entry(blank.to_string()).or_default().head = true;
			}
		}
	}

	// resolve rdf:first/rdf:rest chains into `@list` arrays
	for graph in graphs.values_mut() {
		let mut lists: IndexMap<String, Value> = IndexMap::new();

		for (head, entry) in &graph.list_map {
			if !(entry.head && entry.first.is_some()) {
				continue;
			}

			let mut items = vec![entry.first.clone().unwrap()];
			let mut rest = entry.rest.clone();
			let mut visited: HashSet<String> = HashSet::from([head.clone()]);

			while let Some(next) = rest {
				if !visited.insert(next.clone()) {
					return Err(Error::RdfListEntry { bnode: next });
				}

				let Some(entry) = graph.list_map.get(&next) else {
					return Err(Error::RdfListEntry { bnode: next });
				};
				let Some(first) = &entry.first else {
					return Err(Error::RdfListEntry { bnode: next });
				};

				items.push(first.clone());
				rest = entry.rest.clone();
			}

			lists.insert(head.clone(), Value::Array(items));
		}

		// replace references to list heads with the lists themselves
		for subject in graph.subjects.values_mut() {
			let keys: Vec<String> = subject
				.entries()
				.iter()
				.map(|entry| entry.key.to_string())
				.collect();
			for key in keys {
				if key == "@id" || key == "@type" {
					continue;
				}

				let value = utils::first(subject, &key).unwrap().clone();
				if let Value::Array(items) = value {
					let mut in_progress = HashSet::new();
					let patched = items
						.iter()
						.map(|item| resolve_list_refs(item, &lists, &mut in_progress))
						.collect();
					subject.insert(key.as_str().into(), Value::Array(patched));
				}
			}
		}
	}

	// assemble the default graph in subject order, attaching named graphs
	let mut ids: Vec<String> = graphs[""].subjects.keys().cloned().collect();
	ids.sort();

	let mut output = Vec::with_capacity(ids.len());
	for id in ids {
		let mut subject = graphs[""].subjects[&id].clone();

		if let Some(named) = graphs.get(&id) {
			let mut graph_ids: Vec<&String> = named.subjects.keys().collect();
			graph_ids.sort();
			let nodes: Vec<Value> = graph_ids
				.into_iter()
				.map(|gid| Value::Object(named.subjects[gid].clone()))
				.collect();
			subject.insert("@graph".into(), Value::Array(nodes));
		}

		output.push(Value::Object(subject));
	}

	Ok(Value::Array(output))
}

fn subject_stub(id: &str) -> Object {
	let mut object = Object::new();
	object.insert("@id".into(), Value::String(id.into()));
	object
}

fn resolve_list_refs(
	value: &Value,
	lists: &IndexMap<String, Value>,
	in_progress: &mut HashSet<String>,
) -> Value {
	if utils::is_subject_reference(value) {
		let id = utils::first(value.as_object().unwrap(), "@id")
			.and_then(Value::as_str)
			.unwrap_or_default();

		if let Some(Value::Array(items)) = lists.get(id) {
			if in_progress.insert(id.to_string()) {
				let patched: Vec<Value> = items
					.iter()
					.map(|item| resolve_list_refs(item, lists, in_progress))
					.collect();
				in_progress.remove(id);

				let mut list = Object::new();
				list.insert("@list".into(), Value::Array(patched));
				return Value::Object(list);
			}
		}
	}

	value.clone()
}

/// Converts an RDF object node to its expanded JSON-LD form.
fn rdf_to_object(object: &ObjectTerm, options: &Options) -> Value {
	match object {
		Term::Id(Id::Iri(iri)) if iri.as_iri() == RDF_NIL => {
			// the empty list
			let mut list = Object::new();
			list.insert("@list".into(), Value::Array(Vec::new()));
			Value::Object(list)
		}
		Term::Id(id) => {
			let mut reference = Object::new();
			reference.insert("@id".into(), Value::String(id_str(id).into()));
			Value::Object(reference)
		}
		Term::Literal(literal) => {
			let mut result = Object::new();
			let lexical = literal.value.as_str();

			match &literal.type_ {
				LiteralType::LangString(tag) => {
					result.insert("@value".into(), Value::String(lexical.into()));
					result.insert("@language".into(), Value::String(tag.as_str().into()));
				}
				LiteralType::Any(datatype) => {
					let mut value = Value::String(lexical.into());
					let mut typ: Option<&str> = Some(datatype.as_str());

					if options.use_native_types {
						typ = native_value(lexical, datatype.as_str(), &mut value);
					}

					result.insert("@value".into(), value);
					if let Some(typ) = typ {
						result.insert("@type".into(), Value::String(typ.into()));
					}
				}
			}

			Value::Object(result)
		}
	}
}

/// Coerces recognised XSD datatypes to native values. Returns the `@type`
/// to retain, if any.
fn native_value<'a>(lexical: &str, datatype: &'a str, value: &mut Value) -> Option<&'a str> {
	if datatype == XSD_BOOLEAN.as_str() {
		match lexical {
			"true" => *value = Value::Boolean(true),
			"false" => *value = Value::Boolean(false),
			_ => (),
		}
		return None;
	}

	if is_numeric_lexical(lexical) {
		if let Ok(parsed) = lexical.parse::<f64>() {
			if parsed.is_finite() {
				if datatype == XSD_INTEGER.as_str() {
					let integer = parsed as i64;
					if integer.to_string() == lexical {
						if let Ok(n) = NumberBuf::from_str(lexical) {
							*value = Value::Number(n);
						}
					}
					return None;
				}

				if datatype == XSD_DOUBLE.as_str() {
					if let Ok(n) = NumberBuf::from_str(&format!("{parsed}")) {
						*value = Value::Number(n);
					}
					return None;
				}

				// unknown numeric datatype, keep the type
				return Some(datatype);
			}
		}
		return Some(datatype);
	}

	if datatype == XSD_STRING.as_str() {
		return None;
	}

	Some(datatype)
}

/// Checks the lexical shape of an XSD number: optional sign, digits, an
/// optional fraction and an optional exponent.
fn is_numeric_lexical(value: &str) -> bool {
	let rest = value.strip_prefix(['+', '-']).unwrap_or(value);
	let mut chars = rest.chars().peekable();

	let mut digits = 0;
	while chars.peek().is_some_and(char::is_ascii_digit) {
		chars.next();
		digits += 1;
	}
	if digits == 0 {
		return false;
	}

	if chars.peek() == Some(&'.') {
		chars.next();
		let mut fraction = 0;
		while chars.peek().is_some_and(char::is_ascii_digit) {
			chars.next();
			fraction += 1;
		}
		if fraction == 0 {
			return false;
		}
	}

	match chars.next() {
		None => true,
		Some('e') | Some('E') => {
			let rest: String = chars.collect();
			let rest = rest.strip_prefix(['+', '-']).unwrap_or(&rest);
			!rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
		}
		Some(_) => false,
	}
}
