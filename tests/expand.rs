use json_ld_processor::{expand, json_ld_eq, ErrorCode, Options};
use json_syntax::json;

#[test]
fn context_alias() {
	let input = json!({
		"@context": { "name": "http://schema.org/name" },
		"name": "Alice"
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	assert_eq!(
		expanded,
		json!([ { "http://schema.org/name": [ { "@value": "Alice" } ] } ])
	);
}

#[test]
fn type_coercion() {
	let input = json!({
		"@context": {
			"born": { "@id": "http://ex/born", "@type": "http://www.w3.org/2001/XMLSchema#date" }
		},
		"born": "1999-01-01"
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	let expected = json!([
		{
			"http://ex/born": [
				{ "@value": "1999-01-01", "@type": "http://www.w3.org/2001/XMLSchema#date" }
			]
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn list_container() {
	let input = json!({
		"@context": { "friends": { "@id": "http://ex/f", "@container": "@list" } },
		"friends": ["a", "b"]
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	let expected = json!([
		{
			"http://ex/f": [
				{ "@list": [ { "@value": "a" }, { "@value": "b" } ] }
			]
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn expansion_is_idempotent() {
	let input = json!({
		"@context": {
			"ex": "http://example.org/",
			"knows": { "@id": "http://example.org/knows", "@type": "@id" }
		},
		"@id": "http://example.org/alice",
		"@type": "ex:Person",
		"knows": "http://example.org/bob",
		"ex:age": 32
	});

	let once = expand(&input, &Options::default()).unwrap();
	let twice = expand(&once, &Options::default()).unwrap();
	assert!(json_ld_eq(&once, &twice), "got {twice:?}");
}

#[test]
fn null_context_resets() {
	// after the reset, `name` has no mapping and the node yields no triples
	let input = json!({
		"@context": [ { "name": "http://schema.org/name" }, null ],
		"name": "Alice"
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	assert_eq!(expanded, json!([]));
}

#[test]
fn empty_vocab_defers_to_base() {
	let input = json!({
		"@context": { "@vocab": "" },
		"@id": "http://example.org/doc",
		"name": "Alice"
	});

	// with a base, relative keys become absolute
	let options = Options::default()
		.with_base("http://example.org/dir/")
		.unwrap();
	let expanded = expand(&input, &options).unwrap();
	assert_eq!(
		expanded,
		json!([
			{
				"@id": "http://example.org/doc",
				"http://example.org/dir/name": [ { "@value": "Alice" } ]
			}
		])
	);

	// without one, the key stays relative and is dropped
	let expanded = expand(&input, &Options::default()).unwrap();
	assert_eq!(expanded, json!([]));
}

#[test]
fn language_map() {
	let input = json!({
		"@context": {
			"label": { "@id": "http://ex/label", "@container": "@language" }
		},
		"label": { "en": "queen", "DE": ["Königin", "Frau"] }
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	assert_eq!(
		expanded,
		json!([
			{
				"http://ex/label": [
					{ "@value": "Königin", "@language": "de" },
					{ "@value": "Frau", "@language": "de" },
					{ "@value": "queen", "@language": "en" }
				]
			}
		])
	);
}

#[test]
fn index_map() {
	let input = json!({
		"@context": {
			"athletes": { "@id": "http://ex/athletes", "@container": "@index" }
		},
		"athletes": {
			"catcher": { "@id": "http://ex/plate" },
			"pitcher": { "@id": "http://ex/mound" }
		}
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	assert_eq!(
		expanded,
		json!([
			{
				"http://ex/athletes": [
					{ "@id": "http://ex/plate", "@index": "catcher" },
					{ "@id": "http://ex/mound", "@index": "pitcher" }
				]
			}
		])
	);
}

#[test]
fn reverse_term() {
	let input = json!({
		"@context": {
			"children": { "@reverse": "http://ex/parent" }
		},
		"@id": "http://ex/alice",
		"children": [ { "@id": "http://ex/bob" } ]
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	let expected = json!([
		{
			"@id": "http://ex/alice",
			"@reverse": {
				"http://ex/parent": [ { "@id": "http://ex/bob" } ]
			}
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn default_language() {
	let input = json!({
		"@context": { "@language": "en", "name": "http://schema.org/name" },
		"name": "Alice"
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	let expected = json!([
		{ "http://schema.org/name": [ { "@value": "Alice", "@language": "en" } ] }
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn set_unwraps() {
	let input = json!({
		"@context": { "nick": "http://ex/nick" },
		"@id": "http://ex/a",
		"nick": { "@set": [ "x", "y" ] }
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	let expected = json!([
		{
			"@id": "http://ex/a",
			"http://ex/nick": [ { "@value": "x" }, { "@value": "y" } ]
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn keyword_aliases() {
	let input = json!({
		"@context": { "id": "@id", "type": "@type", "ex": "http://example.org/" },
		"id": "http://example.org/a",
		"type": "ex:Thing"
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	let expected = json!([
		{ "@id": "http://example.org/a", "@type": [ "http://example.org/Thing" ] }
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn list_of_lists_is_rejected() {
	let input = json!({
		"@context": { "p": { "@id": "http://ex/p", "@container": "@list" } },
		"p": [ { "@list": [ "a" ] } ]
	});

	let err = expand(&input, &Options::default()).unwrap_err();
	assert_eq!(err.code(), ErrorCode::SyntaxError);
}

#[test]
fn free_floating_nodes() {
	let input = json!({
		"@context": { "ex": "http://example.org/" },
		"@id": "http://example.org/a"
	});

	// a lone `@id` yields no triples
	let expanded = expand(&input, &Options::default()).unwrap();
	assert_eq!(expanded, json!([]));

	let options = Options {
		keep_free_floating_nodes: true,
		..Options::default()
	};
	let expanded = expand(&input, &options).unwrap();
	assert_eq!(expanded, json!([ { "@id": "http://example.org/a" } ]));
}

#[test]
fn value_with_type_and_language_is_rejected() {
	let input = json!({
		"@context": { "p": "http://ex/p" },
		"@id": "http://ex/a",
		"p": {
			"@value": "v",
			"@type": "http://ex/T",
			"@language": "en"
		}
	});

	assert!(expand(&input, &Options::default()).is_err());
}

#[test]
fn id_coercion() {
	let input = json!({
		"@context": { "knows": { "@id": "http://ex/knows", "@type": "@id" } },
		"@id": "http://ex/a",
		"knows": "http://ex/b"
	});

	let expanded = expand(&input, &Options::default()).unwrap();
	let expected = json!([
		{ "@id": "http://ex/a", "http://ex/knows": [ { "@id": "http://ex/b" } ] }
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}
