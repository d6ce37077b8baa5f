use super::{to_rdf_element, Id, ObjectTerm, Statement};
use crate::error::Error;
use crate::namer::UniqueNamer;
use crate::options::Options;
use indexmap::IndexMap;
use json_syntax::Value;
use rdf_types::{BlankIdBuf, Id as RdfId, Quad, Term};
use sha2::{Digest, Sha256};

/// Canonicalises the blank node labels of the given expanded document and
/// returns its quads, relabelled with `_:c14n` names and sorted by their
/// N-Quads form.
///
/// Blank nodes are first hashed from the statements they appear in, with
/// placeholder labels standing in for blank node identity. Uniquely hashed
/// nodes are named in hash order; colliding groups are broken apart by
/// hashing the paths to their neighbours over every permutation of the
/// group, so isomorphic blank node subgraphs always receive identical
/// labels.
pub(crate) fn normalize(expanded: &Value, options: &Options) -> Result<Vec<Statement>, Error> {
	// collect deduplicated statements
	let mut statements: Vec<Statement> = Vec::new();
	let mut namer = UniqueNamer::new("_:t");
	to_rdf_element(
		expanded,
		&mut namer,
		None,
		None,
		None,
		options,
		&mut |statement| {
			if !statements.contains(&statement) {
				statements.push(statement);
			}
		},
	)?;

	// index statements by the blank nodes they mention
	let mut bnodes: IndexMap<String, Vec<usize>> = IndexMap::new();
	for (i, statement) in statements.iter().enumerate() {
		if let RdfId::Blank(blank) = &statement.0 {
			bnodes.entry(blank.to_string()).or_default().push(i);
		}
		if let Term::Id(RdfId::Blank(blank)) = &statement.2 {
			bnodes.entry(blank.to_string()).or_default().push(i);
		}
	}

	let mut canon = UniqueNamer::new("_:c14n");
	let mut unnamed: Vec<String> = bnodes.keys().cloned().collect();

	loop {
		let mut unique: IndexMap<String, String> = IndexMap::new();
		let mut duplicates: IndexMap<String, Vec<String>> = IndexMap::new();
		let mut next_unnamed: Vec<String> = Vec::new();

		for bnode in &unnamed {
			let hash = hash_statements(bnode, &bnodes, &statements);
			if let Some(group) = duplicates.get_mut(&hash) {
				group.push(bnode.clone());
				next_unnamed.push(bnode.clone());
			} else if let Some(existing) = unique.shift_remove(&hash) {
				next_unnamed.push(existing.clone());
				next_unnamed.push(bnode.clone());
				duplicates.insert(hash, vec![existing, bnode.clone()]);
			} else {
				unique.insert(hash, bnode.clone());
			}
		}

		// name uniquely hashed nodes in hash order, then rehash
		let mut hashes: Vec<String> = unique.keys().cloned().collect();
		hashes.sort();
		let named = !hashes.is_empty();
		for hash in &hashes {
			canon.name(Some(&unique[hash]));
		}

		if named {
			unnamed = next_unnamed;
			continue;
		}

		// break remaining collision groups through path hashing
		let mut group_hashes: Vec<String> = duplicates.keys().cloned().collect();
		group_hashes.sort();
		for group_hash in group_hashes {
			let mut results: Vec<(String, UniqueNamer)> = Vec::new();
			for bnode in &duplicates[&group_hash] {
				if canon.is_named(bnode) {
					continue;
				}

				let mut path_namer = UniqueNamer::new("_:t");
				path_namer.name(Some(bnode));
				results.push(hash_paths(bnode, &bnodes, &statements, &canon, path_namer));
			}

			results.sort_by(|a, b| a.0.cmp(&b.0));
			for (_, path_namer) in results {
				// name every node the winning path visited, in visit order
				for key in path_namer.existing().keys() {
					canon.name(Some(key));
				}
			}
		}

		break;
	}

	let mut relabeled: Vec<Statement> = statements
		.iter()
		.map(|statement| relabel(statement, &mut canon))
		.collect();
	relabeled.sort_by_key(super::statement_to_nquad);
	Ok(relabeled)
}

/// Hashes all of the statements a blank node appears in, with `_:a`
/// standing for the node itself and `_:z` for every other blank node.
fn hash_statements(
	id: &str,
	bnodes: &IndexMap<String, Vec<usize>>,
	statements: &[Statement],
) -> String {
	let Some(indices) = bnodes.get(id) else {
		return String::new();
	};

	let mut nquads: Vec<String> = indices
		.iter()
		.map(|&i| placeholder_nquad(&statements[i], id))
		.collect();
	nquads.sort();

	let mut hasher = Sha256::new();
	for nquad in &nquads {
		hasher.update(nquad.as_bytes());
	}
	hex(&hasher.finalize())
}

fn placeholder_nquad(statement: &Statement, id: &str) -> String {
	let Quad(subject, predicate, object, graph) = statement;
	let mut line = String::new();

	match subject {
		RdfId::Iri(iri) => {
			line.push('<');
			line.push_str(iri.as_str());
			line.push('>');
		}
		RdfId::Blank(blank) => {
			line.push_str(if blank.as_str() == id { "_:a" } else { "_:z" })
		}
	}

	line.push_str(" <");
	line.push_str(predicate.as_str());
	line.push_str("> ");

	match object {
		Term::Id(RdfId::Iri(iri)) => {
			line.push('<');
			line.push_str(iri.as_str());
			line.push('>');
		}
		Term::Id(RdfId::Blank(blank)) => {
			line.push_str(if blank.as_str() == id { "_:a" } else { "_:z" })
		}
		Term::Literal(literal) => line.push_str(&super::format_literal(literal)),
	}

	if let Some(graph) = graph {
		match graph {
			RdfId::Iri(iri) => {
				line.push_str(" <");
				line.push_str(iri.as_str());
				line.push('>');
			}
			RdfId::Blank(_) => line.push_str(" _:g"),
		}
	}

	line.push_str(" .\n");
	line
}

/// Hashes the paths from a blank node to its neighbours, choosing the
/// lexicographically least path over every permutation of each neighbour
/// group. Returns the hash and the namer that produced the winning paths.
fn hash_paths(
	bnode: &str,
	bnodes: &IndexMap<String, Vec<usize>>,
	statements: &[Statement],
	canon: &UniqueNamer,
	mut path_namer: UniqueNamer,
) -> (String, UniqueNamer) {
	// group neighbours by direction, property and name
	let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
	let indices = bnodes.get(bnode).cloned().unwrap_or_default();
	for i in indices {
		let Quad(subject, predicate, object, _) = &statements[i];

		let (adjacent, direction) = match subject {
			RdfId::Blank(blank) if blank.as_str() != bnode => (blank.to_string(), "p"),
			_ => match object {
				Term::Id(RdfId::Blank(blank)) if blank.as_str() != bnode => {
					(blank.to_string(), "r")
				}
				_ => continue,
			},
		};

		let name = if canon.is_named(&adjacent) {
			canon.existing()[adjacent.as_str()].clone()
		} else if path_namer.is_named(&adjacent) {
			path_namer.existing()[adjacent.as_str()].clone()
		} else {
			hash_statements(&adjacent, bnodes, statements)
		};

		let mut hasher = Sha256::new();
		hasher.update(direction.as_bytes());
		hasher.update(predicate.as_str().as_bytes());
		hasher.update(name.as_bytes());
		groups
			.entry(hex(&hasher.finalize()))
			.or_default()
			.push(adjacent);
	}

	let mut digest = Sha256::new();
	let mut group_hashes: Vec<String> = groups.keys().cloned().collect();
	group_hashes.sort();

	for group_hash in group_hashes {
		digest.update(group_hash.as_bytes());

		let mut chosen_path: Option<String> = None;
		let mut chosen_namer: Option<UniqueNamer> = None;

		for permutation in Permutations::new(groups[&group_hash].clone()) {
			let mut namer_copy = path_namer.clone();
			let mut recurse = Vec::new();
			let mut path = String::new();
			let mut skip = false;

			for adjacent in &permutation {
				if canon.is_named(adjacent) {
					path.push_str(&canon.existing()[adjacent.as_str()]);
				} else {
					if !namer_copy.is_named(adjacent) {
						recurse.push(adjacent.clone());
					}
					path.push_str(&namer_copy.name(Some(adjacent)));
				}

				if beaten(&path, &chosen_path) {
					skip = true;
					break;
				}
			}

			if !skip {
				for adjacent in recurse {
					let (result, returned) =
						hash_paths(&adjacent, bnodes, statements, canon, namer_copy);
					namer_copy = returned;
					path.push_str(&namer_copy.name(Some(&adjacent)));
					path.push('<');
					path.push_str(&result);
					path.push('>');

					if beaten(&path, &chosen_path) {
						skip = true;
						break;
					}
				}
			}

			if skip {
				continue;
			}

			let wins = match &chosen_path {
				None => true,
				Some(chosen) => path < *chosen,
			};
			if wins {
				chosen_path = Some(path);
				chosen_namer = Some(namer_copy);
			}
		}

		if let Some(path) = &chosen_path {
			digest.update(path.as_bytes());
		}
		if let Some(namer) = chosen_namer {
			path_namer = namer;
		}
	}

	(hex(&digest.finalize()), path_namer)
}

/// Checks if a partial path can no longer beat the chosen one.
fn beaten(path: &str, chosen: &Option<String>) -> bool {
	match chosen {
		Some(chosen) => path.len() >= chosen.len() && path > chosen.as_str(),
		None => false,
	}
}

fn relabel(statement: &Statement, canon: &mut UniqueNamer) -> Statement {
	let Quad(subject, predicate, object, graph) = statement;
	Quad(
		relabel_id(subject, canon),
		predicate.clone(),
		relabel_term(object, canon),
		graph.as_ref().map(|graph| relabel_id(graph, canon)),
	)
}

fn relabel_id(id: &Id, canon: &mut UniqueNamer) -> Id {
	match id {
		RdfId::Blank(blank) => {
			let label = canon.name(Some(blank.as_str()));
			RdfId::Blank(
				BlankIdBuf::new(label).expect("canonical labels are valid blank node identifiers"),
			)
		}
		RdfId::Iri(iri) => RdfId::Iri(iri.clone()),
	}
}

fn relabel_term(term: &ObjectTerm, canon: &mut UniqueNamer) -> ObjectTerm {
	match term {
		Term::Id(id) => Term::Id(relabel_id(id, canon)),
		Term::Literal(literal) => Term::Literal(literal.clone()),
	}
}

fn hex(digest: &[u8]) -> String {
	let mut output = String::with_capacity(digest.len() * 2);
	for byte in digest {
		output.push_str(&format!("{byte:02x}"));
	}
	output
}

/// Iterator over the permutations of a group, starting from the sorted
/// order and advancing lexicographically.
struct Permutations {
	items: Vec<String>,
	done: bool,
}

impl Permutations {
	fn new(mut items: Vec<String>) -> Self {
		items.sort();
		Self { items, done: false }
	}
}

impl Iterator for Permutations {
	type Item = Vec<String>;

	fn next(&mut self) -> Option<Vec<String>> {
		if self.done {
			return None;
		}

		let current = self.items.clone();
		if !next_permutation(&mut self.items) {
			self.done = true;
		}
		Some(current)
	}
}

fn next_permutation(items: &mut [String]) -> bool {
	if items.len() < 2 {
		return false;
	}

	let mut i = items.len() - 1;
	while i > 0 && items[i - 1] >= items[i] {
		i -= 1;
	}
	if i == 0 {
		return false;
	}

	let mut j = items.len() - 1;
	while items[j] <= items[i - 1] {
		j -= 1;
	}
	items.swap(i - 1, j);
	items[i..].reverse();
	true
}
