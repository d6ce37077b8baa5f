use super::{
	canonical_double, node_id, Id, Statement, RDF_FIRST, RDF_NIL, RDF_REST, RDF_TYPE,
	XSD_BOOLEAN, XSD_DOUBLE, XSD_INTEGER, XSD_STRING,
};
use crate::error::Error;
use crate::keyword::is_keyword;
use crate::namer::UniqueNamer;
use crate::options::Options;
use crate::utils;
use iref::IriBuf;
use json_syntax::{Object, Value};
use langtag::LangTagBuf;
use log::warn;
use rdf_types::{Literal, LiteralType, Quad, Term};

/// Recursively emits the RDF statements found in the given expanded
/// element.
pub(crate) fn to_rdf_element(
	element: &Value,
	namer: &mut UniqueNamer,
	subject: Option<&Id>,
	property: Option<&IriBuf>,
	graph: Option<&Id>,
	options: &Options,
	emit: &mut dyn FnMut(Statement),
) -> Result<(), Error> {
	match element {
		Value::Array(items) => {
			for item in items {
				to_rdf_element(item, namer, subject, property, graph, options, emit)?;
			}
			Ok(())
		}
		Value::Object(object) => {
			if utils::has_key(object, "@value") {
				if let (Some(subject), Some(property)) = (subject, property) {
					if let Some(literal) = literal_of(object) {
						emit(Quad(
							subject.clone(),
							property.clone(),
							Term::Literal(literal),
							graph.cloned(),
						));
					}
				}
				return Ok(());
			}

			if let Some(list) = utils::first(object, "@list") {
				// materialise the list as an rdf:first/rdf:rest chain,
				// built in reverse and expanded through the node path
				let items = Value::force_as_array(list);
				let mut tail = {
					let mut nil = Object::new();
					nil.insert("@id".into(), Value::String(RDF_NIL.as_str().into()));
					Value::Object(nil)
				};
				for item in items.iter().rev() {
					let mut cell = Object::new();
					cell.insert(RDF_FIRST.as_str().into(), Value::Array(vec![item.clone()]));
					cell.insert(RDF_REST.as_str().into(), Value::Array(vec![tail]));
					tail = Value::Object(cell);
				}
				return to_rdf_element(&tail, namer, subject, property, graph, options, emit);
			}

			// the element is a node object
			let is_blank = utils::is_blank_node(element);
			let id = if is_blank {
				namer.name(utils::first(object, "@id").and_then(Value::as_str))
			} else {
				utils::first(object, "@id")
					.and_then(Value::as_str)
					.expect("non-blank subjects carry an `@id`")
					.to_string()
			};

			let Some(id) = node_id(&id) else {
				warn!("skipping node with unparseable identifier `{id}`");
				return Ok(());
			};

			if let (Some(subject), Some(property)) = (subject, property) {
				emit(Quad(
					subject.clone(),
					property.clone(),
					Term::Id(id.clone()),
					graph.cloned(),
				));
			}

			for key in utils::sorted_keys(object)? {
				let values = utils::first(object, key).unwrap();

				if options.is_ignored(key) {
					continue;
				}

				if key == "@graph" {
					to_rdf_element(values, namer, None, None, Some(&id), options, emit)?;
					continue;
				}

				let predicate = if key == "@type" {
					RDF_TYPE.to_owned()
				} else {
					if is_keyword(key) {
						continue;
					}
					match IriBuf::new(key.to_string()) {
						Ok(iri) => iri,
						Err(_) => {
							warn!("skipping non-IRI predicate `{key}`");
							continue;
						}
					}
				};

				to_rdf_element(
					values,
					namer,
					Some(&id),
					Some(&predicate),
					graph,
					options,
					emit,
				)?;
			}

			Ok(())
		}
		Value::String(value) => {
			// bare strings are `@type` IRIs
			if let (Some(subject), Some(property)) = (subject, property) {
				if let Some(object) = node_id(value) {
					emit(Quad(
						subject.clone(),
						property.clone(),
						Term::Id(object),
						graph.cloned(),
					));
				} else {
					warn!("skipping non-IRI object `{value}`");
				}
			}
			Ok(())
		}
		_ => Ok(()),
	}
}

/// Converts a `@value` object to an RDF literal, defaulting the datatype
/// from the value shape. A language attaches only to plain strings.
fn literal_of(object: &Object) -> Option<Literal> {
	let value = utils::first(object, "@value").unwrap();
	let datatype = utils::first(object, "@type")
		.and_then(Value::as_str)
		.map(str::to_string);

	let (lexical, datatype) = match value {
		Value::Boolean(b) => (
			b.to_string(),
			datatype.unwrap_or_else(|| XSD_BOOLEAN.to_string()),
		),
		Value::Number(n) => {
			if n.is_i64() && datatype.as_deref() != Some(XSD_DOUBLE.as_str()) {
				(
					n.to_string(),
					datatype.unwrap_or_else(|| XSD_INTEGER.to_string()),
				)
			} else {
				(
					canonical_double(n.as_f64_lossy()),
					datatype.unwrap_or_else(|| XSD_DOUBLE.to_string()),
				)
			}
		}
		Value::String(s) => (
			s.to_string(),
			datatype.unwrap_or_else(|| XSD_STRING.to_string()),
		),
		_ => return None,
	};

	if datatype == XSD_STRING.as_str() {
		if let Some(language) = utils::first(object, "@language").and_then(Value::as_str) {
			match LangTagBuf::new(language.to_string()) {
				Ok(tag) => return Some(Literal::new(lexical, LiteralType::LangString(tag))),
				Err(_) => warn!("dropping malformed language tag `{language}`"),
			}
		}
	}

	match IriBuf::new(datatype) {
		Ok(datatype) => Some(Literal::new(lexical, LiteralType::Any(datatype))),
		Err(_) => {
			warn!("skipping literal with unparseable datatype");
			None
		}
	}
}
