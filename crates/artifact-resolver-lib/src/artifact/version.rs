use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Deserialize};

/// A run of dot separated numbers followed by whatever is left of the string.
static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^(\d+(?:\.\d+)*)(.*)$").expect("version pattern should compile.")
});

/// The version of an artifact.
///
/// # Format
/// Versions are a dot separated list of numeric components optionally followed by a suffix,
/// e.g. `1.2.3` or `8.2.0-alpha`.
/// - Components are compared numerically from left to right, missing components count as `0`
/// so `1.0` and `1.0.0` are equal.
/// - A suffix only breaks ties. A suffixed version is newer than the bare version it extends
/// and suffixes are compared lexically against each other.
///
/// Parsing never fails. Strings which don't start with a number are treated as `0` with no suffix,
/// metadata files contain all sorts of free form text and one bad entry shouldn't stop a resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Version {
	text: String,
	components: Vec<u64>,
	suffix: String,
}

impl Version {
	pub fn parse(text: &str) -> Self {
		let text = text.trim();
		let (components, suffix) = if let Some(captures) = VERSION_PATTERN.captures(text) {
			let components = captures[1]
				.split('.')
				/* Only digits get here so a failure is an overflow */
				.map(|c| c.parse::<u64>().unwrap_or(u64::MAX))
				.collect();
			/* "1." is just "1" */
			let suffix = match &captures[2] {
				"." => String::new(),
				s => s.to_string(),
			};
			(components, suffix)
		} else {
			(Vec::new(), String::new())
		};

		Version {
			text: text.to_string(),
			components,
			suffix,
		}
	}

	/// The string this version was parsed from.
	pub fn as_str(&self) -> &str {
		&self.text
	}

	pub fn components(&self) -> &[u64] {
		&self.components
	}

	/// Gets the component at `index`, components past the end are `0`.
	pub fn component(&self, index: usize) -> u64 {
		self.components.get(index).copied().unwrap_or(0)
	}

	pub fn suffix(&self) -> &str {
		&self.suffix
	}

	/// `true` when `self` is strictly newer than `other`.
	pub fn is_newer(&self, other: &Version) -> bool {
		self > other
	}

	/// Components without trailing zeros, two equal versions always share this.
	fn significant_components(&self) -> &[u64] {
		let len = self.components.iter().rposition(|c| *c != 0).map_or(0, |i| i + 1);
		&self.components[..len]
	}
}

/// Compares two version strings, see [`Version`] for the rules.
pub fn compare(lhs: &str, rhs: &str) -> Ordering {
	Version::parse(lhs).cmp(&Version::parse(rhs))
}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> Ordering {
		let len = std::cmp::max(self.components.len(), other.components.len());
		for i in 0..len {
			match self.component(i).cmp(&other.component(i)) {
				Ordering::Equal => {},
				ord => return ord,
			}
		}

		match (self.suffix.is_empty(), other.suffix.is_empty()) {
			(true, true) => Ordering::Equal,
			(true, false) => Ordering::Less,
			(false, true) => Ordering::Greater,
			(false, false) => self.suffix.cmp(&other.suffix),
		}
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialEq for Version {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Version {}

impl std::hash::Hash for Version {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.significant_components().hash(state);
		self.suffix.hash(state);
	}
}

impl std::fmt::Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.text)
	}
}

impl std::str::FromStr for Version {
	type Err = std::convert::Infallible;
	fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self::parse(s)) }
}

impl From<&str> for Version {
	fn from(value: &str) -> Self { Self::parse(value) }
}

impl From<String> for Version {
	fn from(value: String) -> Self { Self::parse(&value) }
}

impl From<Version> for String {
	fn from(value: Version) -> Self { value.text }
}

impl AsRef<str> for Version {
	fn as_ref(&self) -> &str {
		&self.text
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test] fn version_trailing_zero_is_eq() { assert_eq!(Version::parse("1.0"), Version::parse("1.0.0")) }
	#[test] fn version_trailing_zeros_are_eq() { assert_eq!(compare("2", "2.0.0.0"), Ordering::Equal) }
	#[test] fn version_are_not_compared_lexically() { assert!(Version::parse("1.2.4") < Version::parse("1.2.10")) }
	#[test] fn version_short_version_is_lt() { assert!(Version::parse("1.2") < Version::parse("1.2.3")) }
	#[test] fn version_higher_major_is_gt() { assert!(Version::parse("8.2.0-alpha") > Version::parse("7.0.0")) }
	#[test] fn version_suffix_is_newer_than_bare() { assert!(Version::parse("3.2-alpha").is_newer(&Version::parse("3.2"))) }
	#[test] fn version_suffix_is_compared_lexically() { assert!(Version::parse("3.2-alpha") < Version::parse("3.2-beta")) }
	#[test] fn version_suffix_does_not_beat_components() { assert!(Version::parse("3.2-beta") < Version::parse("3.3")) }
	#[test] fn version_is_newer_is_strict() { assert!(!Version::parse("1.0").is_newer(&Version::parse("1.0.0"))) }
	#[test] fn version_huge_component_saturates() { assert!(Version::parse("1.99999999999999999999999") > Version::parse("1.2")) }

	#[test]
	fn version_malformed_is_zero() {
		for s in ["", "LATEST", "v1.2", "  "] {
			let v = Version::parse(s);
			assert!(v.components().is_empty(), "{s:?} should have no components");
			assert_eq!(v.suffix(), "");
			assert_eq!(v, Version::parse("0"));
		}
	}

	#[test]
	fn version_keeps_original_text() {
		let v = Version::parse("8.2.0-alpha");
		assert_eq!(v.to_string(), "8.2.0-alpha");
		assert_eq!(v.components(), &[8, 2, 0]);
		assert_eq!(v.suffix(), "-alpha");
	}

	#[test]
	fn version_equal_versions_hash_equal() {
		let set: std::collections::HashSet<Version> = ["1.0", "1.0.0", "1"].into_iter().map(Version::parse).collect();
		assert_eq!(set.len(), 1);
	}
}
