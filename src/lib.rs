//! This crate is a synchronous implementation of the core
//! [JSON-LD](https://www.w3.org/TR/json-ld/) transformation algorithms.
//!
//! [Linked Data (LD)](https://www.w3.org/standards/semanticweb/data)
//! is a [World Wide Web Consortium (W3C)](https://www.w3.org/)
//! initiative built upon standard Web technologies to create an
//! interrelated network of datasets across the Web.
//! JSON-LD brings [JSON](https://tools.ietf.org/html/rfc7159) and Linked
//! Data together, using a *context* to bind short terms to IRIs and value
//! coercion rules.
//!
//! The processor transforms documents between four canonical shapes:
//! *expanded* ([`expand`]), *compacted* ([`compact`]), *flattened/framed*
//! ([`flatten`], [`frame`]) and *RDF quads* ([`to_rdf`], [`from_rdf`],
//! [`normalize`]). Documents are [`json_syntax::Value`] trees; the
//! processor performs no I/O, so every remote `@context` reference must be
//! dereferenced to an inline object before a document enters the
//! processor.
//!
//! # Example
//!
//! ```
//! use json_ld_processor::{expand, Options};
//! use json_syntax::json;
//!
//! let doc = json!({
//!   "@context": { "name": "http://schema.org/name" },
//!   "@id": "https://www.rust-lang.org",
//!   "name": "Rust Programming Language"
//! });
//!
//! let expanded = expand(&doc, &Options::default()).unwrap();
//! assert_eq!(
//!   expanded,
//!   json!([
//!     {
//!       "@id": "https://www.rust-lang.org",
//!       "http://schema.org/name": [ { "@value": "Rust Programming Language" } ]
//!     }
//!   ])
//! );
//! ```
pub mod compaction;
pub mod container;
pub mod context;
pub mod error;
pub mod expansion;
pub mod flattening;
pub mod framing;
pub mod iri;
pub mod keyword;
pub mod namer;
pub mod options;
pub mod rdf;
pub mod utils;

pub use container::Container;
pub use context::{Context, TermDefinition};
pub use error::{Error, ErrorCode};
pub use expansion::expand;
pub use keyword::{is_keyword, Keyword};
pub use namer::UniqueNamer;
pub use options::Options;
pub use rdf::{to_nquads, Statement};
pub use utils::{is_list, is_subject, is_subject_reference, is_value, json_ld_eq};

use json_syntax::{Object, Value};

/// Applies a local context to an active context, returning the new active
/// context. See [`context::process_context`].
pub fn process_context(
	active: &Context,
	local: &Value,
	options: &Options,
) -> Result<Context, Error> {
	context::process_context(active, local, options)
}

/// Compacts the given document with the given context.
///
/// The input is expanded first, so it may be in any shape. The result uses
/// the terms of `context`, carries the caller's `@context` when it is
/// non-empty, and wraps multiple top-level subjects under `@graph`.
pub fn compact(input: &Value, context: &Value, options: &Options) -> Result<Value, Error> {
	let expanded = expand(input, options)?;
	let active_context = process_context(&Context::new(options.base.clone()), context, options)?;
	let compacted = compaction::compact_element(&active_context, None, &expanded, options)?;
	Ok(finalize_compacted(&active_context, compacted, context))
}

/// Flattens the given document into a graph map: graph names to subject
/// maps, including the `@merged` view coalescing every graph. Graph names
/// and subject identifiers come out in sorted order.
pub fn flatten(input: &Value, options: &Options) -> Result<Value, Error> {
	let expanded = expand(input, options)?;
	let graphs = flattening::graph_map(&expanded, options)?;

	let mut graph_names: Vec<&String> = graphs.keys().collect();
	graph_names.sort();

	let mut result = Object::new();
	for name in graph_names {
		let subjects = &graphs[name.as_str()];
		let mut ids: Vec<&String> = subjects.keys().collect();
		ids.sort();

		let mut graph = Object::new();
		for id in ids {
			graph.insert(id.as_str().into(), subjects[id.as_str()].clone());
		}
		result.insert(name.as_str().into(), Value::Object(graph));
	}

	Ok(Value::Object(result))
}

/// Frames the given document: subjects matching `frame` are selected,
/// shaped and embedded, and the result is compacted with the frame's
/// context.
pub fn frame(input: &Value, frame: &Value, options: &Options) -> Result<Value, Error> {
	let expanded = expand(input, options)?;

	// frames keep their free-floating nodes; an empty frame matches all
	let mut frame_options = options.clone();
	frame_options.keep_free_floating_nodes = true;
	let expanded_frame = expand(frame, &frame_options)?;

	let framed = framing::frame_expanded(&expanded, &expanded_frame, options)?;

	let context = frame
		.as_object()
		.and_then(|o| utils::first(o, "@context"))
		.cloned()
		.unwrap_or_else(|| Value::Object(Object::new()));
	let active_context = process_context(&Context::new(options.base.clone()), &context, options)?;
	let compacted = compaction::compact_element(&active_context, None, &framed, options)?;
	let compacted = finalize_compacted(&active_context, compacted, &context);

	Ok(framing::remove_preserve(&active_context, compacted, options).unwrap_or(Value::Null))
}

/// Emits the RDF statements of the given document.
///
/// The callback is invoked once per statement, then once with `None` to
/// signal completion.
pub fn to_rdf<F>(input: &Value, options: &Options, mut callback: F) -> Result<(), Error>
where
	F: FnMut(Option<Statement>),
{
	let expanded = expand(input, options)?;
	let mut namer = UniqueNamer::new("_:t");
	rdf::to_rdf_element(
		&expanded,
		&mut namer,
		None,
		None,
		None,
		options,
		&mut |statement| callback(Some(statement)),
	)?;
	callback(None);
	Ok(())
}

/// Reconstructs an expanded document from RDF statements.
pub fn from_rdf(statements: &[Statement], options: &Options) -> Result<Value, Error> {
	rdf::from_rdf(statements, options)
}

/// Produces the canonical-labelled quad sequence of the given document:
/// blank nodes renamed to `_:c14n` labels, quads sorted by their N-Quads
/// form. Render with [`to_nquads`] for deterministic bytes.
pub fn normalize(input: &Value, options: &Options) -> Result<Vec<Statement>, Error> {
	let expanded = expand(input, options)?;
	rdf::normalize(&expanded, options)
}

/// Collapses a compacted top-level array, wraps multiple subjects under the
/// `@graph` alias and re-attaches the caller's context.
fn finalize_compacted(active_context: &Context, compacted: Value, context: &Value) -> Value {
	let compacted = match compacted {
		Value::Array(items) if items.len() == 1 => items.into_iter().next().unwrap(),
		Value::Array(items) => {
			let kwgraph = compaction::compact_iri(active_context, "@graph", None, true);
			let mut wrapper = Object::new();
			wrapper.insert(kwgraph.into(), Value::Array(items));
			Value::Object(wrapper)
		}
		other => other,
	};

	let context = match context.as_object().and_then(|o| utils::first(o, "@context")) {
		Some(inner) => inner,
		None => context,
	};

	let context_is_empty = match context {
		Value::Null => true,
		Value::Object(o) => o.is_empty(),
		Value::Array(items) => items.is_empty(),
		_ => false,
	};

	match compacted {
		Value::Object(object) if !context_is_empty => {
			let mut with_context = Object::new();
			with_context.insert("@context".into(), context.clone());
			for entry in object.entries() {
				with_context.insert(entry.key.clone(), entry.value.clone());
			}
			Value::Object(with_context)
		}
		other => other,
	}
}
