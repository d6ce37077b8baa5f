use crate::error::Error;
use iref::IriBuf;

/// Processing options.
///
/// A processor call shares no mutable state with any other call; options are
/// the only configuration carried across operations.
#[derive(Clone, Debug)]
pub struct Options {
	/// Document base IRI used to resolve relative IRI references.
	pub base: Option<IriBuf>,

	/// Default `@embed` flag for framing.
	pub embed: bool,

	/// Default `@explicit` flag for framing.
	pub explicit: bool,

	/// Default `@omitDefault` flag for framing.
	pub omit_default: bool,

	/// Raise an error when compaction would merge several lists into a
	/// single `@list` container.
	pub strict: bool,

	/// Hint for context builders.
	pub optimize: bool,

	/// Retain top-level nodes that produce no triples during expansion.
	pub keep_free_floating_nodes: bool,

	/// Keep `rdf:type` as a regular property when reconstructing from RDF.
	pub use_rdf_type: bool,

	/// Coerce recognised XSD datatypes to native values when reconstructing
	/// from RDF.
	pub use_native_types: bool,

	/// Keys passed through verbatim, untouched by the algorithms.
	pub ignored_keys: Vec<String>,
}

impl Options {
	/// Returns options with the given document base.
	///
	/// The base must be an absolute IRI; the empty string clears it.
	pub fn with_base(mut self, base: &str) -> Result<Self, Error> {
		if base.is_empty() {
			self.base = None;
			return Ok(self);
		}

		match IriBuf::new(base.to_string()) {
			Ok(iri) => {
				self.base = Some(iri);
				Ok(self)
			}
			Err(_) => Err(Error::InvalidBaseUrl {
				value: base.to_string(),
			}),
		}
	}

	/// Checks if the given key is passed through verbatim.
	pub fn is_ignored(&self, key: &str) -> bool {
		self.ignored_keys.iter().any(|k| k == key)
	}
}

impl Default for Options {
	fn default() -> Self {
		Self {
			base: None,
			embed: true,
			explicit: false,
			omit_default: false,
			strict: true,
			optimize: false,
			keep_free_floating_nodes: false,
			use_rdf_type: false,
			use_native_types: true,
			ignored_keys: Vec::new(),
		}
	}
}
