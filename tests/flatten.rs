use json_ld_processor::{flatten, json_ld_eq, Options};
use json_syntax::json;

#[test]
fn nested_subjects_are_hoisted() {
	let input = json!({
		"@context": {
			"name": "http://ex/name",
			"knows": "http://ex/knows"
		},
		"@id": "http://ex/a",
		"knows": { "@id": "http://ex/b", "name": "Bob" }
	});

	let flattened = flatten(&input, &Options::default()).unwrap();
	let expected = json!({
		"@default": {
			"http://ex/a": {
				"@id": "http://ex/a",
				"http://ex/knows": [ { "@id": "http://ex/b" } ]
			},
			"http://ex/b": {
				"@id": "http://ex/b",
				"http://ex/name": [ { "@value": "Bob" } ]
			}
		},
		"@merged": {
			"http://ex/a": {
				"@id": "http://ex/a",
				"http://ex/knows": [ { "@id": "http://ex/b" } ]
			},
			"http://ex/b": {
				"@id": "http://ex/b",
				"http://ex/name": [ { "@value": "Bob" } ]
			}
		}
	});
	assert!(json_ld_eq(&flattened, &expected), "got {flattened:?}");
}

#[test]
fn blank_node_labels_are_stable() {
	let first = json!({
		"@context": { "name": "http://ex/name", "knows": "http://ex/knows" },
		"@id": "_:x",
		"name": "Alice",
		"knows": { "@id": "_:y", "name": "Bob" }
	});
	let second = json!({
		"@context": { "name": "http://ex/name", "knows": "http://ex/knows" },
		"@id": "_:p1",
		"name": "Alice",
		"knows": { "@id": "_:p2", "name": "Bob" }
	});

	// two documents differing only in blank node labels flatten identically
	let a = flatten(&first, &Options::default()).unwrap();
	let b = flatten(&second, &Options::default()).unwrap();
	assert_eq!(a, b);

	let subjects = a
		.as_object()
		.and_then(|o| o.get("@default").next())
		.and_then(|g| g.as_object())
		.unwrap();
	assert!(subjects.get("_:t0").next().is_some(), "got {a:?}");
	assert!(subjects.get("_:t1").next().is_some(), "got {a:?}");
}

#[test]
fn named_graphs() {
	let input = json!({
		"@context": { "name": "http://ex/name" },
		"@id": "http://ex/g",
		"@graph": [
			{ "@id": "http://ex/a", "name": "x" }
		]
	});

	let flattened = flatten(&input, &Options::default()).unwrap();
	let expected = json!({
		"@default": {
			"http://ex/g": { "@id": "http://ex/g" }
		},
		"@merged": {
			"http://ex/g": { "@id": "http://ex/g" },
			"http://ex/a": {
				"@id": "http://ex/a",
				"http://ex/name": [ { "@value": "x" } ]
			}
		},
		"http://ex/g": {
			"http://ex/a": {
				"@id": "http://ex/a",
				"http://ex/name": [ { "@value": "x" } ]
			}
		}
	});
	assert!(json_ld_eq(&flattened, &expected), "got {flattened:?}");
}

#[test]
fn lists_keep_order_and_rename_blanks() {
	let input = json!({
		"@context": {
			"p": { "@id": "http://ex/p", "@container": "@list" }
		},
		"@id": "http://ex/a",
		"p": [ "x", { "@id": "_:b", "http://ex/name": "y" } ]
	});

	let flattened = flatten(&input, &Options::default()).unwrap();
	let graph = flattened
		.as_object()
		.and_then(|o| o.get("@default").next())
		.and_then(|g| g.as_object())
		.unwrap();

	let a = graph.get("http://ex/a").next().unwrap();
	let expected_list = json!([
		{
			"@list": [
				{ "@value": "x" },
				{ "@id": "_:t0" }
			]
		}
	]);
	let p = a
		.as_object()
		.and_then(|o| o.get("http://ex/p").next())
		.unwrap();
	assert!(json_ld_eq(p, &expected_list), "got {flattened:?}");

	// the list member is a first-class subject
	assert!(graph.get("_:t0").next().is_some(), "got {flattened:?}");
}
