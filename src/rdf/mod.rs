//! RDF interconversion.
//!
//! Quad emission from expanded documents, reconstruction of expanded
//! documents from quad sequences, and deterministic blank node
//! canonicalisation.
mod from_rdf;
mod normalize;
mod to_rdf;

pub(crate) use from_rdf::from_rdf;
pub(crate) use normalize::normalize;
pub(crate) use to_rdf::to_rdf_element;

use iref::{Iri, IriBuf};
use rdf_types::{BlankIdBuf, Id as RdfId, Literal, LiteralType, Quad, Term};
use static_iref::iri;

pub const RDF_TYPE: &Iri = iri!("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
pub const RDF_FIRST: &Iri = iri!("http://www.w3.org/1999/02/22-rdf-syntax-ns#first");
pub const RDF_REST: &Iri = iri!("http://www.w3.org/1999/02/22-rdf-syntax-ns#rest");
pub const RDF_NIL: &Iri = iri!("http://www.w3.org/1999/02/22-rdf-syntax-ns#nil");

pub const XSD_BOOLEAN: &Iri = iri!("http://www.w3.org/2001/XMLSchema#boolean");
pub const XSD_INTEGER: &Iri = iri!("http://www.w3.org/2001/XMLSchema#integer");
pub const XSD_DOUBLE: &Iri = iri!("http://www.w3.org/2001/XMLSchema#double");
pub const XSD_STRING: &Iri = iri!("http://www.w3.org/2001/XMLSchema#string");

/// Subject, graph or non-literal object node.
pub type Id = RdfId<IriBuf, BlankIdBuf>;

/// Object position node.
pub type ObjectTerm = Term<Id, Literal>;

/// RDF quad.
pub type Statement = Quad<Id, IriBuf, ObjectTerm, Id>;

// <https://www.w3.org/TR/xmlschema11-2/#f-doubleLexmap>
const XSD_CANONICAL_FLOAT: pretty_dtoa::FmtFloatConfig = pretty_dtoa::FmtFloatConfig::default()
	.force_e_notation()
	.capitalize_e(true);

/// Renders a double in the canonical XSD lexical form (`1.5E2`).
pub(crate) fn canonical_double(value: f64) -> String {
	pretty_dtoa::dtoa(value, XSD_CANONICAL_FLOAT)
}

/// Parses a node identifier: blank node identifiers to blank nodes,
/// everything else to IRIs. Returns `None` for unparseable IRIs.
pub(crate) fn node_id(value: &str) -> Option<Id> {
	if value.starts_with("_:") {
		BlankIdBuf::new(value.to_string()).ok().map(RdfId::Blank)
	} else {
		IriBuf::new(value.to_string()).ok().map(RdfId::Iri)
	}
}

pub(crate) fn id_str(id: &Id) -> &str {
	match id {
		RdfId::Iri(iri) => iri.as_str(),
		RdfId::Blank(blank) => blank.as_str(),
	}
}

/// Renders the given statements as N-Quads, one line per quad.
pub fn to_nquads(statements: &[Statement]) -> String {
	let mut output = String::new();
	for statement in statements {
		output.push_str(&statement_to_nquad(statement));
	}
	output
}

/// Renders a single statement as an N-Quads line.
pub fn statement_to_nquad(statement: &Statement) -> String {
	let Quad(subject, predicate, object, graph) = statement;

	let mut line = String::new();
	line.push_str(&format_id(subject));
	line.push(' ');
	line.push('<');
	line.push_str(predicate.as_str());
	line.push('>');
	line.push(' ');
	line.push_str(&format_term(object));
	if let Some(graph) = graph {
		line.push(' ');
		line.push_str(&format_id(graph));
	}
	line.push_str(" .\n");
	line
}

fn format_id(id: &Id) -> String {
	match id {
		RdfId::Iri(iri) => format!("<{}>", iri.as_str()),
		RdfId::Blank(blank) => blank.to_string(),
	}
}

fn format_term(term: &ObjectTerm) -> String {
	match term {
		Term::Id(id) => format_id(id),
		Term::Literal(literal) => format_literal(literal),
	}
}

fn format_literal(literal: &Literal) -> String {
	let mut output = format!("\"{}\"", escape(&literal.value));
	match &literal.type_ {
		LiteralType::Any(datatype) => {
			if datatype.as_iri() != XSD_STRING {
				output.push_str("^^<");
				output.push_str(datatype.as_str());
				output.push('>');
			}
		}
		LiteralType::LangString(tag) => {
			output.push('@');
			output.push_str(tag.as_str());
		}
	}
	output
}

fn escape(value: &str) -> String {
	let mut output = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'\\' => output.push_str("\\\\"),
			'\t' => output.push_str("\\t"),
			'\n' => output.push_str("\\n"),
			'\r' => output.push_str("\\r"),
			'"' => output.push_str("\\\""),
			c => output.push(c),
		}
	}
	output
}
