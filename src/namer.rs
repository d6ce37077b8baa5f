use indexmap::IndexMap;

/// Deterministic blank node labeller.
///
/// Issues sequential labels `prefix + n`. A label requested twice for the
/// same input yields the same output, and the assignment table preserves
/// insertion order, which the canonicalisation algorithm relies on.
#[derive(Clone, Debug)]
pub struct UniqueNamer {
	prefix: String,
	counter: usize,
	existing: IndexMap<String, String>,
}

impl UniqueNamer {
	/// Creates a new namer issuing labels starting with `prefix`.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			counter: 0,
			existing: IndexMap::new(),
		}
	}

	/// Returns the canonical label for `old`, assigning the next sequential
	/// label on first sight. `None` always produces a fresh label.
	pub fn name(&mut self, old: Option<&str>) -> String {
		if let Some(old) = old {
			if let Some(name) = self.existing.get(old) {
				return name.clone();
			}
		}

		let name = format!("{}{}", self.prefix, self.counter);
		self.counter += 1;

		if let Some(old) = old {
			self.existing.insert(old.to_string(), name.clone());
		}

		name
	}

	/// Checks if `old` has already been assigned a label.
	pub fn is_named(&self, old: &str) -> bool {
		self.existing.contains_key(old)
	}

	/// Returns the assignment table, in insertion order.
	pub fn existing(&self) -> &IndexMap<String, String> {
		&self.existing
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sequential_and_stable() {
		let mut namer = UniqueNamer::new("_:t");
		assert_eq!(namer.name(Some("_:b0")), "_:t0");
		assert_eq!(namer.name(Some("_:b1")), "_:t1");
		assert_eq!(namer.name(Some("_:b0")), "_:t0");
		assert!(namer.is_named("_:b1"));
		assert!(!namer.is_named("_:b2"));
	}

	#[test]
	fn anonymous_labels_are_unique() {
		let mut namer = UniqueNamer::new("_:t");
		assert_eq!(namer.name(None), "_:t0");
		assert_eq!(namer.name(None), "_:t1");
		assert!(namer.existing().is_empty());
	}
}
