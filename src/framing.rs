//! Framing.
//!
//! Selects and shapes subjects from a graph according to a frame: an
//! expanded document fragment whose non-keyword entries ducktype the
//! subjects to match, and whose `@embed`/`@explicit`/`@omitDefault` flags
//! control embedding and default filling.
use crate::container::Container;
use crate::context::Context;
use crate::error::Error;
use crate::flattening;
use crate::keyword::is_keyword;
use crate::options::Options;
use crate::utils;
use indexmap::IndexMap;
use json_syntax::{Object, Value};

/// Item of the output tree under construction.
///
/// Embedded subjects are held as indices into the node arena so that a
/// later, better embedding site can demote an earlier one to a bare
/// reference.
enum Item {
	Json(Value),
	Node(usize),
}

struct Slot {
	items: Vec<Item>,
	array: bool,
}

#[derive(Default)]
struct FrameNode {
	entries: IndexMap<String, Slot>,
}

#[derive(Clone, Copy, PartialEq)]
enum Parent {
	Top,
	Node(usize),
}

struct EmbedSite {
	parent: Parent,
	property: Option<String>,
}

/// Per-call framing state: the merged subject map, the embed registry and
/// the output arena. Discarded when the call returns.
struct FrameState<'a> {
	options: &'a Options,
	subjects: IndexMap<String, Value>,
	embeds: IndexMap<String, EmbedSite>,
	nodes: Vec<FrameNode>,
	top: Vec<Item>,
}

/// Frames an expanded input against an expanded frame.
///
/// The subjects come from the `@merged` view of the flattened input, so a
/// frame selects across every graph.
pub(crate) fn frame_expanded(
	input: &Value,
	frame: &Value,
	options: &Options,
) -> Result<Value, Error> {
	let mut graphs = flattening::graph_map(input, options)?;
	let subjects = graphs.shift_remove("@merged").unwrap_or_default();

	let mut subject_ids: Vec<String> = subjects.keys().cloned().collect();
	subject_ids.sort();

	let mut state = FrameState {
		options,
		subjects,
		embeds: IndexMap::new(),
		nodes: Vec::new(),
		top: Vec::new(),
	};

	frame_subjects(&mut state, &subject_ids, frame, Parent::Top, None)?;

	let framed = state
		.top
		.iter()
		.map(|item| materialize(&state.nodes, item))
		.collect();
	Ok(Value::Array(framed))
}

fn frame_subjects(
	state: &mut FrameState,
	subjects: &[String],
	frame: &Value,
	parent: Parent,
	property: Option<&str>,
) -> Result<(), Error> {
	// a frame must be a single object
	let frame_object = match frame {
		Value::Array(items) if items.len() == 1 => match &items[0] {
			Value::Object(object) => object,
			_ => {
				return Err(Error::InvalidFrame {
					frame: frame.clone(),
				})
			}
		},
		_ => {
			return Err(Error::InvalidFrame {
				frame: frame.clone(),
			})
		}
	};

	let matches: Vec<String> = subjects
		.iter()
		.filter(|id| {
			state
				.subjects
				.get(*id)
				.and_then(Value::as_object)
				.is_some_and(|subject| filter_subject(subject, frame_object))
		})
		.cloned()
		.collect();

	let embed_default = flag(frame_object, "@embed").unwrap_or(state.options.embed);
	let explicit_on = flag(frame_object, "@explicit").unwrap_or(state.options.explicit);

	for id in matches {
		// each top-level match is an independent embedding universe
		if property.is_none() {
			state.embeds.clear();
		}

		let mut embed_on = embed_default;

		if embed_on && state.embeds.contains_key(&id) {
			// only overwrite an existing embed if it has already been
			// attached to its parent; otherwise the embed would occur twice
			// once the pending parent is attached
			embed_on = false;

			let reference = Item::Json(reference(&id));
			let existing = &state.embeds[&id];
			let attached = match existing.parent {
				Parent::Top => state
					.top
					.iter()
					.any(|item| items_equal(&state.nodes, item, &reference)),
				Parent::Node(parent_index) => match existing.property.as_deref() {
					Some(parent_property) => state.nodes[parent_index]
						.entries
						.get(parent_property)
						.is_some_and(|slot| {
							slot.items
								.iter()
								.any(|item| items_equal(&state.nodes, item, &reference))
						}),
					None => false,
				},
			};

			if attached {
				embed_on = true;
				remove_embed(state, &id);
			}
		}

		if !embed_on {
			add_frame_output(state, parent, property, Item::Json(reference(&id)));
			continue;
		}

		state.embeds.insert(
			id.clone(),
			EmbedSite {
				parent,
				property: property.map(str::to_string),
			},
		);

		let node_index = state.nodes.len();
		state.nodes.push(FrameNode::default());
		put(
			state,
			node_index,
			"@id",
			Item::Json(Value::String(id.as_str().into())),
		);

		let subject = state.subjects.get(&id).cloned().unwrap_or(Value::Null);
		let subject = subject.as_object().cloned().unwrap_or_else(Object::new);

		for prop in utils::sorted_keys(&subject)? {
			if prop == "@id" {
				continue;
			}

			let values = utils::first(&subject, prop).unwrap();

			// keywords and ignored keys are copied verbatim
			if state.options.is_ignored(prop) || is_keyword(prop) {
				put(state, node_index, prop, Item::Json(values.clone()));
				continue;
			}

			if !utils::has_key(frame_object, prop) {
				// unframed properties embed unless `@explicit` is on
				if !explicit_on {
					embed_values(state, &subject, prop, Parent::Node(node_index))?;
				}
				continue;
			}

			let sub_frame = utils::first(frame_object, prop).unwrap().clone();

			for object in Value::force_as_array(values) {
				if utils::is_list(object) {
					let list_index = new_list(state);
					add_frame_output(
						state,
						Parent::Node(node_index),
						Some(prop),
						Item::Node(list_index),
					);

					let items = utils::first(object.as_object().unwrap(), "@list").unwrap();
					for item in Value::force_as_array(items) {
						if utils::is_subject_reference(item) {
							let item_id = item
								.as_object()
								.and_then(|o| utils::first(o, "@id"))
								.and_then(Value::as_str)
								.unwrap()
								.to_string();
							frame_subjects(
								state,
								&[item_id],
								&sub_frame,
								Parent::Node(list_index),
								Some("@list"),
							)?;
						} else {
							add_frame_output(
								state,
								Parent::Node(list_index),
								Some("@list"),
								Item::Json(item.clone()),
							);
						}
					}
					continue;
				}

				if utils::is_subject_reference(object) {
					let object_id = object
						.as_object()
						.and_then(|o| utils::first(o, "@id"))
						.and_then(Value::as_str)
						.unwrap()
						.to_string();
					frame_subjects(
						state,
						&[object_id],
						&sub_frame,
						Parent::Node(node_index),
						Some(prop),
					)?;
				} else {
					add_frame_output(
						state,
						Parent::Node(node_index),
						Some(prop),
						Item::Json(object.clone()),
					);
				}
			}
		}

		// fill in defaults for framed properties the subject lacks
		for prop in utils::sorted_keys(frame_object)? {
			if is_keyword(prop) {
				continue;
			}

			let next = utils::first(frame_object, prop)
				.map(|f| Value::force_as_array(f))
				.and_then(<[Value]>::first)
				.and_then(Value::as_object);

			let omit_default_on = next
				.and_then(|n| flag(n, "@omitDefault"))
				.unwrap_or(state.options.omit_default);

			if !omit_default_on && !state.nodes[node_index].entries.contains_key(prop) {
				let preserve = next
					.and_then(|n| utils::first(n, "@default"))
					.cloned()
					.unwrap_or_else(|| Value::String("@null".into()));
				let mut wrapper = Object::new();
				wrapper.insert("@preserve".into(), preserve);
				put(state, node_index, prop, Item::Json(Value::Object(wrapper)));
			}
		}

		add_frame_output(state, parent, property, Item::Node(node_index));
	}

	Ok(())
}

/// Checks if the given subject matches the given frame: a non-wildcard
/// `@type` entry requires one matching type, then every non-keyword frame
/// key must be present on the subject.
fn filter_subject(subject: &Object, frame: &Object) -> bool {
	if let Some(types) = utils::first(frame, "@type") {
		let types = Value::force_as_array(types);
		// a single empty object is the wildcard type
		let wildcard = types.len() == 1 && types[0].is_object();
		if !wildcard {
			return types
				.iter()
				.any(|typ| utils::has_value(subject, "@type", typ));
		}
	}

	for entry in frame.entries() {
		let key = entry.key.as_str();
		if !is_keyword(key) && !utils::has_key(subject, key) {
			return false;
		}
	}

	true
}

/// Embeds every value of a subject property into the output, recursing
/// into subjects not yet embedded elsewhere.
fn embed_values(
	state: &mut FrameState,
	subject: &Object,
	property: &str,
	output: Parent,
) -> Result<(), Error> {
	let values = utils::first(subject, property).unwrap().clone();

	for object in Value::force_as_array(&values) {
		if utils::is_list(object) {
			let list_index = new_list(state);
			add_frame_output(state, output, Some(property), Item::Node(list_index));
			embed_values(
				state,
				object.as_object().unwrap(),
				"@list",
				Parent::Node(list_index),
			)?;
			continue;
		}

		if utils::is_subject_reference(object) {
			let id = object
				.as_object()
				.and_then(|o| utils::first(o, "@id"))
				.and_then(Value::as_str)
				.unwrap()
				.to_string();

			if !state.embeds.contains_key(&id) {
				state.embeds.insert(
					id.clone(),
					EmbedSite {
						parent: output,
						property: Some(property.to_string()),
					},
				);

				let node_index = state.nodes.len();
				state.nodes.push(FrameNode::default());

				let embedded = state.subjects.get(&id).cloned().unwrap_or(Value::Null);
				if let Some(embedded) = embedded.as_object() {
					for prop in utils::sorted_keys(embedded)? {
						let prop_values = utils::first(embedded, prop).unwrap();
						if is_keyword(prop) || state.options.is_ignored(prop) {
							put(state, node_index, prop, Item::Json(prop_values.clone()));
						} else {
							embed_values(state, embedded, prop, Parent::Node(node_index))?;
						}
					}
				}

				add_frame_output(state, output, Some(property), Item::Node(node_index));
			} else {
				// already embedded elsewhere: keep the bare reference
				add_frame_output(state, output, Some(property), Item::Json(object.clone()));
			}
			continue;
		}

		add_frame_output(state, output, Some(property), Item::Json(object.clone()));
	}

	Ok(())
}

/// Demotes an existing embed to a bare reference, along with every embed
/// that hangs below it.
fn remove_embed(state: &mut FrameState, id: &str) {
	let Some(embed) = state.embeds.get(id) else {
		return;
	};
	let parent = embed.parent;
	let property = embed.property.clone();
	let reference_item = Item::Json(reference(id));

	match parent {
		Parent::Top => {
			if let Some(position) = state
				.top
				.iter()
				.position(|item| items_equal(&state.nodes, item, &reference_item))
			{
				state.top[position] = reference_item;
			}
		}
		Parent::Node(parent_index) => {
			if let Some(property) = property {
				let position = state.nodes[parent_index]
					.entries
					.get(&property)
					.and_then(|slot| {
						slot.items
							.iter()
							.position(|item| items_equal(&state.nodes, item, &reference_item))
					});
				if let Some(position) = position {
					if let Some(slot) = state.nodes[parent_index].entries.get_mut(&property) {
						slot.items[position] = reference_item;
					}
				}
			}
		}
	}

	remove_dependents(state, id);
}

fn remove_dependents(state: &mut FrameState, id: &str) {
	let dependents: Vec<String> = state
		.embeds
		.iter()
		.filter_map(|(dependent, embed)| match embed.parent {
			Parent::Node(parent_index) if node_id(&state.nodes, parent_index) == Some(id) => {
				Some(dependent.clone())
			}
			_ => None,
		})
		.collect();

	for dependent in dependents {
		if state.embeds.shift_remove(&dependent).is_some() {
			remove_dependents(state, &dependent);
		}
	}
}

fn add_frame_output(state: &mut FrameState, parent: Parent, property: Option<&str>, item: Item) {
	match parent {
		Parent::Top => state.top.push(item),
		Parent::Node(index) => {
			let property = property.expect("node parents always carry a property");
			let present = state.nodes[index]
				.entries
				.get(property)
				.is_some_and(|slot| {
					slot.items
						.iter()
						.any(|existing| items_equal(&state.nodes, existing, &item))
				});
			if !present {
				let slot = state.nodes[index]
					.entries
					.entry(property.to_string())
					.or_insert_with(|| Slot {
						items: Vec::new(),
						array: true,
					});
				slot.array = true;
				slot.items.push(item);
			}
		}
	}
}

/// Sets a single-valued entry, replacing any existing value.
fn put(state: &mut FrameState, index: usize, property: &str, item: Item) {
	state.nodes[index].entries.insert(
		property.to_string(),
		Slot {
			items: vec![item],
			array: false,
		},
	);
}

fn new_list(state: &mut FrameState) -> usize {
	let index = state.nodes.len();
	let mut node = FrameNode::default();
	node.entries.insert(
		"@list".to_string(),
		Slot {
			items: Vec::new(),
			array: true,
		},
	);
	state.nodes.push(node);
	index
}

fn reference(id: &str) -> Value {
	let mut object = Object::new();
	object.insert("@id".into(), Value::String(id.into()));
	Value::Object(object)
}

fn flag(frame: &Object, key: &str) -> Option<bool> {
	utils::first(frame, key)
		.map(Value::force_as_array)
		.and_then(<[Value]>::first)
		.and_then(Value::as_boolean)
}

fn node_id<'a>(nodes: &'a [FrameNode], index: usize) -> Option<&'a str> {
	nodes[index]
		.entries
		.get("@id")
		.and_then(|slot| slot.items.first())
		.and_then(|item| match item {
			Item::Json(value) => value.as_str(),
			Item::Node(_) => None,
		})
}

fn item_id<'a>(nodes: &'a [FrameNode], item: &'a Item) -> Option<&'a str> {
	match item {
		Item::Json(value) => value
			.as_object()
			.and_then(|o| utils::first(o, "@id"))
			.and_then(Value::as_str),
		Item::Node(index) => node_id(nodes, *index),
	}
}

/// Output items compare by subject identity when both sides have one, and
/// by JSON-LD value equality otherwise.
fn items_equal(nodes: &[FrameNode], a: &Item, b: &Item) -> bool {
	match (item_id(nodes, a), item_id(nodes, b)) {
		(Some(x), Some(y)) => x == y,
		_ => match (a, b) {
			(Item::Json(x), Item::Json(y)) => utils::compare_values(x, y),
			_ => false,
		},
	}
}

fn materialize(nodes: &[FrameNode], item: &Item) -> Value {
	match item {
		Item::Json(value) => value.clone(),
		Item::Node(index) => {
			let node = &nodes[*index];
			let mut object = Object::new();
			for (key, slot) in &node.entries {
				let value = if slot.array {
					Value::Array(slot.items.iter().map(|i| materialize(nodes, i)).collect())
				} else {
					slot.items
						.first()
						.map(|i| materialize(nodes, i))
						.unwrap_or(Value::Null)
				};
				object.insert(key.as_str().into(), value);
			}
			Value::Object(object)
		}
	}
}

/// Removes `@preserve` markers as the last framing step: null preserves
/// drop, singleton arrays unwrap unless the term's container keeps them.
pub(crate) fn remove_preserve(
	active_context: &Context,
	input: Value,
	options: &Options,
) -> Option<Value> {
	match input {
		Value::Array(items) => Some(Value::Array(
			items
				.into_iter()
				.filter_map(|item| remove_preserve(active_context, item, options))
				.collect(),
		)),
		Value::Object(mut object) => {
			if let Some(preserved) = utils::first(&object, "@preserve") {
				if preserved.as_str() == Some("@null") {
					return None;
				}
				return Some(preserved.clone());
			}

			if utils::has_key(&object, "@value") {
				return Some(Value::Object(object));
			}

			if utils::has_key(&object, "@list") {
				let list = utils::first(&object, "@list").unwrap().clone();
				let cleaned = remove_preserve(active_context, list, options)
					.unwrap_or_else(|| Value::Array(Vec::new()));
				object.insert("@list".into(), cleaned);
				return Some(Value::Object(object));
			}

			let keys: Vec<String> = object
				.entries()
				.iter()
				.map(|entry| entry.key.to_string())
				.collect();
			for key in keys {
				if options.is_ignored(&key) {
					continue;
				}

				let value = utils::first(&object, &key).unwrap().clone();
				let mut result =
					remove_preserve(active_context, value, options).unwrap_or(Value::Null);

				if let Value::Array(items) = &result {
					if items.len() == 1 {
						let container = active_context.container_of(Some(&key));
						if container != Some(Container::Set) && container != Some(Container::List)
						{
							result = items[0].clone();
						}
					}
				}

				object.insert(key.as_str().into(), result);
			}

			Some(Value::Object(object))
		}
		other => Some(other),
	}
}
