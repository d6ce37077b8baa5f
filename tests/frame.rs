use json_ld_processor::{frame, json_ld_eq, Options};
use json_syntax::{json, Value};

fn people() -> Value {
	json!({
		"@context": {
			"ex": "http://ex/",
			"name": "http://ex/name",
			"knows": { "@id": "http://ex/knows", "@type": "@id" }
		},
		"@graph": [
			{ "@id": "http://ex/a", "@type": "ex:P", "name": "x", "knows": "http://ex/b" },
			{ "@id": "http://ex/b", "@type": "ex:Q", "name": "y" }
		]
	})
}

#[test]
fn type_match_selects_subjects() {
	let framed = frame(
		&people(),
		&json!({ "@type": "http://ex/Q" }),
		&Options::default(),
	)
	.unwrap();

	let expected = json!({
		"@id": "http://ex/b",
		"@type": "http://ex/Q",
		"http://ex/name": "y"
	});
	assert!(json_ld_eq(&framed, &expected), "got {framed:?}");
}

#[test]
fn matched_subjects_embed_their_references() {
	let framed = frame(
		&people(),
		&json!({ "@type": "http://ex/P" }),
		&Options::default(),
	)
	.unwrap();

	let expected = json!({
		"@id": "http://ex/a",
		"@type": "http://ex/P",
		"http://ex/name": "x",
		"http://ex/knows": {
			"@id": "http://ex/b",
			"@type": "http://ex/Q",
			"http://ex/name": "y"
		}
	});
	assert!(json_ld_eq(&framed, &expected), "got {framed:?}");
}

#[test]
fn empty_frame_returns_every_subject_once() {
	let framed = frame(&people(), &json!({}), &Options::default()).unwrap();

	let graph = match framed.as_object().and_then(|o| o.get("@graph").next()) {
		Some(Value::Array(items)) => items,
		other => panic!("multiple matches come wrapped in @graph, got {other:?}"),
	};
	assert_eq!(graph.len(), 2, "got {framed:?}");

	let ids: Vec<&str> = graph
		.iter()
		.filter_map(|node| {
			node.as_object()
				.and_then(|o| o.get("@id").next())
				.and_then(Value::as_str)
		})
		.collect();
	assert!(ids.contains(&"http://ex/a"));
	assert!(ids.contains(&"http://ex/b"));
}

#[test]
fn explicit_restricts_output() {
	let framed = frame(
		&people(),
		&json!({
			"@explicit": true,
			"@type": "http://ex/P",
			"http://ex/name": {}
		}),
		&Options::default(),
	)
	.unwrap();

	let expected = json!({
		"@id": "http://ex/a",
		"@type": "http://ex/P",
		"http://ex/name": "x"
	});
	assert!(json_ld_eq(&framed, &expected), "got {framed:?}");
}

#[test]
fn defaults_fill_missing_properties() {
	let framed = frame(
		&people(),
		&json!({
			"@explicit": true,
			"@type": "http://ex/P",
			"http://ex/nick": { "@default": "anonymous" }
		}),
		&Options::default(),
	)
	.unwrap();

	let nick = framed
		.as_object()
		.and_then(|o| o.get("http://ex/nick").next())
		.expect("default filled in");
	assert_eq!(nick, &json!("anonymous"), "got {framed:?}");
}

#[test]
fn omitted_defaults_leave_null() {
	let framed = frame(
		&people(),
		&json!({
			"@explicit": true,
			"@type": "http://ex/P",
			"http://ex/nick": {}
		}),
		&Options::default(),
	)
	.unwrap();

	let nick = framed
		.as_object()
		.and_then(|o| o.get("http://ex/nick").next())
		.expect("property present");
	assert!(nick.is_null(), "got {framed:?}");

	// with @omitDefault the property disappears entirely
	let framed = frame(
		&people(),
		&json!({
			"@explicit": true,
			"@type": "http://ex/P",
			"http://ex/nick": { "@omitDefault": true }
		}),
		&Options::default(),
	)
	.unwrap();
	assert!(
		framed
			.as_object()
			.is_some_and(|o| o.get("http://ex/nick").next().is_none()),
		"got {framed:?}"
	);
}

#[test]
fn embed_off_keeps_references() {
	let framed = frame(
		&people(),
		&json!({
			"@type": "http://ex/P",
			"http://ex/knows": { "@embed": false }
		}),
		&Options::default(),
	)
	.unwrap();

	let knows = framed
		.as_object()
		.and_then(|o| o.get("http://ex/knows").next())
		.expect("reference kept");
	assert!(json_ld_eq(knows, &json!({ "@id": "http://ex/b" })), "got {framed:?}");
}

#[test]
fn blank_nodes_survive_framing() {
	let input = json!({
		"@context": { "name": "http://ex/name", "ex": "http://ex/" },
		"@type": "ex:P",
		"name": "anonymous"
	});

	let framed = frame(&input, &json!({ "@type": "http://ex/P" }), &Options::default()).unwrap();

	let object = framed.as_object().expect("one match");
	let id = object
		.get("@id")
		.next()
		.and_then(Value::as_str)
		.expect("blank nodes get stable labels");
	assert!(id.starts_with("_:"), "got {framed:?}");
}
