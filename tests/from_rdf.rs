use json_ld_processor::{expand, from_rdf, json_ld_eq, to_rdf, ErrorCode, Options, Statement};
use json_syntax::json;
use rdf_types::{BlankIdBuf, Id, Literal, LiteralType, Quad, Term};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

fn iri(value: &str) -> iref::IriBuf {
	iref::IriBuf::new(value.to_string()).unwrap()
}

fn node(value: &str) -> Id {
	if value.starts_with("_:") {
		Id::Blank(BlankIdBuf::new(value.to_string()).unwrap())
	} else {
		Id::Iri(iri(value))
	}
}

fn literal(value: &str, datatype: &str) -> Term<Id, Literal> {
	Term::Literal(Literal::new(
		value.to_string(),
		LiteralType::Any(iri(datatype)),
	))
}

fn statement(s: &str, p: &str, o: Term<Id, Literal>, g: Option<&str>) -> Statement {
	Quad(node(s), iri(p), o, g.map(node))
}

#[test]
fn simple_statement() {
	let statements = vec![statement(
		"http://ex/a",
		"http://ex/name",
		literal("Alice", XSD_STRING),
		None,
	)];

	let expanded = from_rdf(&statements, &Options::default()).unwrap();
	let expected = json!([
		{ "@id": "http://ex/a", "http://ex/name": [ { "@value": "Alice" } ] }
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn rdf_type_becomes_keyword() {
	let statements = vec![statement(
		"http://ex/a",
		RDF_TYPE,
		Term::Id(node("http://ex/Person")),
		None,
	)];

	let expanded = from_rdf(&statements, &Options::default()).unwrap();
	let expected = json!([
		{ "@id": "http://ex/a", "@type": [ "http://ex/Person" ] }
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");

	// unless rdf:type is kept as a plain property
	let options = Options {
		use_rdf_type: true,
		..Options::default()
	};
	let expanded = from_rdf(&statements, &options).unwrap();
	let expected = json!([
		{
			"@id": "http://ex/a",
			"http://www.w3.org/1999/02/22-rdf-syntax-ns#type": [ { "@id": "http://ex/Person" } ]
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn native_types_are_coerced() {
	let statements = vec![statement(
		"http://ex/a",
		"http://ex/age",
		literal("32", XSD_INTEGER),
		None,
	)];

	let expanded = from_rdf(&statements, &Options::default()).unwrap();
	let expected = json!([
		{ "@id": "http://ex/a", "http://ex/age": [ { "@value": 32 } ] }
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");

	// without native types the lexical form and datatype are retained
	let options = Options {
		use_native_types: false,
		..Options::default()
	};
	let expanded = from_rdf(&statements, &options).unwrap();
	let expected = json!([
		{
			"@id": "http://ex/a",
			"http://ex/age": [ { "@value": "32", "@type": "http://www.w3.org/2001/XMLSchema#integer" } ]
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn lists_are_reassembled() {
	let statements = vec![
		statement("http://ex/a", "http://ex/p", Term::Id(node("_:l0")), None),
		statement("_:l0", RDF_FIRST, literal("a", XSD_STRING), None),
		statement("_:l0", RDF_REST, Term::Id(node("_:l1")), None),
		statement("_:l1", RDF_FIRST, literal("b", XSD_STRING), None),
		statement("_:l1", RDF_REST, Term::Id(node(RDF_NIL)), None),
	];

	let expanded = from_rdf(&statements, &Options::default()).unwrap();
	let expected = json!([
		{
			"@id": "http://ex/a",
			"http://ex/p": [
				{ "@list": [ { "@value": "a" }, { "@value": "b" } ] }
			]
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn broken_list_chain_is_an_error() {
	let statements = vec![
		statement("http://ex/a", "http://ex/p", Term::Id(node("_:l0")), None),
		statement("_:l0", RDF_FIRST, literal("a", XSD_STRING), None),
		statement("_:l0", RDF_REST, Term::Id(node("_:l1")), None),
	];

	let err = from_rdf(&statements, &Options::default()).unwrap_err();
	assert_eq!(err.code(), ErrorCode::RdfError);
}

#[test]
fn named_graphs_are_attached() {
	let statements = vec![statement(
		"http://ex/a",
		"http://ex/name",
		literal("x", XSD_STRING),
		Some("http://ex/g"),
	)];

	let expanded = from_rdf(&statements, &Options::default()).unwrap();
	let expected = json!([
		{
			"@id": "http://ex/g",
			"@graph": [
				{ "@id": "http://ex/a", "http://ex/name": [ { "@value": "x" } ] }
			]
		}
	]);
	assert!(json_ld_eq(&expanded, &expected), "got {expanded:?}");
}

#[test]
fn rdf_round_trip() {
	let input = json!({
		"@context": {
			"ex": "http://example.org/",
			"name": "http://example.org/name",
			"knows": { "@id": "http://example.org/knows", "@type": "@id" },
			"tags": { "@id": "http://example.org/tags", "@container": "@list" }
		},
		"@id": "http://example.org/alice",
		"@type": "ex:Person",
		"name": "Alice",
		"ex:age": 32,
		"knows": "http://example.org/bob",
		"tags": ["a", "b"]
	});

	let expanded = expand(&input, &Options::default()).unwrap();

	let mut statements: Vec<Statement> = Vec::new();
	to_rdf(&input, &Options::default(), |statement| {
		if let Some(statement) = statement {
			statements.push(statement);
		}
	})
	.unwrap();

	let reconstructed = from_rdf(&statements, &Options::default()).unwrap();
	assert!(
		json_ld_eq(&reconstructed, &expanded),
		"got {reconstructed:?}, want {expanded:?}"
	);
}
