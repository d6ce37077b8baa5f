use json_ld_processor::{normalize, to_nquads, Options};
use json_syntax::json;

#[test]
fn canonical_labels_ignore_input_labels() {
	let first = json!({
		"@context": { "name": "http://ex/name", "knows": "http://ex/knows" },
		"@id": "_:a1",
		"name": "Alice",
		"knows": { "@id": "_:b1", "name": "Bob" }
	});
	let second = json!({
		"@context": { "name": "http://ex/name", "knows": "http://ex/knows" },
		"@id": "_:other",
		"name": "Alice",
		"knows": { "@id": "_:labels", "name": "Bob" }
	});

	let a = to_nquads(&normalize(&first, &Options::default()).unwrap());
	let b = to_nquads(&normalize(&second, &Options::default()).unwrap());
	assert_eq!(a, b);
	assert!(a.contains("_:c14n"), "got {a}");
}

#[test]
fn node_order_does_not_matter() {
	let first = json!({
		"@context": { "name": "http://ex/name", "knows": "http://ex/knows" },
		"@graph": [
			{ "@id": "_:a", "name": "Alice", "knows": { "@id": "_:b" } },
			{ "@id": "_:b", "name": "Bob" }
		]
	});
	let second = json!({
		"@context": { "name": "http://ex/name", "knows": "http://ex/knows" },
		"@graph": [
			{ "@id": "_:n2", "name": "Bob" },
			{ "@id": "_:n1", "name": "Alice", "knows": { "@id": "_:n2" } }
		]
	});

	let a = to_nquads(&normalize(&first, &Options::default()).unwrap());
	let b = to_nquads(&normalize(&second, &Options::default()).unwrap());
	assert_eq!(a, b);
}

#[test]
fn isomorphic_twins_are_broken_deterministically() {
	// the two children have identical first-degree hashes; path hashing
	// must still produce stable labels
	let first = json!({
		"@context": { "p": { "@id": "http://ex/p", "@type": "@id" }, "name": "http://ex/name" },
		"@id": "http://ex/root",
		"p": [
			{ "@id": "_:c1", "name": "x" },
			{ "@id": "_:c2", "name": "x" }
		]
	});
	let second = json!({
		"@context": { "p": { "@id": "http://ex/p", "@type": "@id" }, "name": "http://ex/name" },
		"@id": "http://ex/root",
		"p": [
			{ "@id": "_:d9", "name": "x" },
			{ "@id": "_:d8", "name": "x" }
		]
	});

	let a = to_nquads(&normalize(&first, &Options::default()).unwrap());
	let b = to_nquads(&normalize(&second, &Options::default()).unwrap());
	assert_eq!(a, b);
}

#[test]
fn output_is_sorted() {
	let input = json!({
		"@context": { "b": "http://ex/b", "a": "http://ex/a" },
		"@id": "http://ex/s",
		"b": "2",
		"a": "1"
	});

	let quads = normalize(&input, &Options::default()).unwrap();
	let rendered = to_nquads(&quads);
	let mut lines: Vec<&str> = rendered.lines().collect();
	let unsorted = lines.clone();
	lines.sort();
	assert_eq!(lines, unsorted);
}
