use std::convert::TryFrom;
use std::fmt;

/// Error raised when parsing a string that is not a JSON-LD keyword.
#[derive(Clone, Copy, Debug)]
pub struct NotAKeyword<'a>(pub &'a str);

macro_rules! keyword {
	{
		$(
			$(#[$meta:meta])*
			$ident:ident : $lit:literal
		),*
	} => {
		/// JSON-LD keywords.
		///
		/// Reserved `@`-prefixed tokens recognised by the processor.
		#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
		pub enum Keyword {
			$(
				$(#[$meta])*
				$ident
			),*
		}

		impl Keyword {
			pub fn into_str(self) -> &'static str {
				match self {
					$(
						Self::$ident => $lit
					),*
				}
			}
		}

		impl<'a> TryFrom<&'a str> for Keyword {
			type Error = NotAKeyword<'a>;

			fn try_from(input: &'a str) -> Result<Keyword, NotAKeyword<'a>> {
				match input {
					$(
						$lit => Ok(Self::$ident),
					)*
					_ => Err(NotAKeyword(input))
				}
			}
		}
	};
}

keyword! {
	/// `@base`.
	/// Sets the base IRI against which relative IRI references are resolved.
	Base : "@base",

	/// `@container`.
	/// Sets the container type of a term.
	Container : "@container",

	/// `@context`.
	/// Defines the short-hand names used throughout a JSON-LD document.
	Context : "@context",

	/// `@default`.
	/// Sets the default value of a framed property.
	Default : "@default",

	/// `@embed`.
	/// Framing flag controlling subject embedding.
	Embed : "@embed",

	/// `@explicit`.
	/// Framing flag restricting output to explicitly framed properties.
	Explicit : "@explicit",

	/// `@graph`.
	/// Expresses a graph.
	Graph : "@graph",

	/// `@id`.
	/// Uniquely identifies node objects with IRIs or blank node identifiers.
	Id : "@id",

	/// `@index`.
	/// Specifies an index to maintain on a container or value.
	Index : "@index",

	/// `@language`.
	/// Specifies the language of a string value.
	Language : "@language",

	/// `@list`.
	/// Expresses an ordered set of data.
	List : "@list",

	/// `@null`.
	/// Placeholder for an absent framed value, removed with `@preserve`.
	Null : "@null",

	/// `@omitDefault`.
	/// Framing flag suppressing `@default` filling.
	OmitDefault : "@omitDefault",

	/// `@preserve`.
	/// Wraps framed default values until the final framing pass.
	Preserve : "@preserve",

	/// `@reverse`.
	/// Expresses reverse properties.
	Reverse : "@reverse",

	/// `@set`.
	/// Expresses an unordered set of data.
	Set : "@set",

	/// `@type`.
	/// Sets the type of a node or the datatype of a typed value.
	Type : "@type",

	/// `@value`.
	/// Specifies the data associated with a particular property.
	Value : "@value",

	/// `@vocab`.
	/// Expands plain terms against a common vocabulary IRI.
	Vocab : "@vocab"
}

impl fmt::Display for Keyword {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		self.into_str().fmt(f)
	}
}

/// Checks if the given string is a JSON-LD keyword.
pub fn is_keyword(s: &str) -> bool {
	Keyword::try_from(s).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recognizes_keywords() {
		assert!(is_keyword("@context"));
		assert!(is_keyword("@value"));
		assert!(is_keyword("@omitDefault"));
		assert!(!is_keyword("@foo"));
		assert!(!is_keyword("context"));
	}

	#[test]
	fn round_trips() {
		assert_eq!(Keyword::try_from("@list").unwrap(), Keyword::List);
		assert_eq!(Keyword::List.into_str(), "@list");
	}
}
