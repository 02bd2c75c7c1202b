use serde::{Serialize, Deserialize};

use super::Version;

/// The version constraint attached to a dependency request.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionSpecifier {
	/// No constraint, the newest available version is used.
	///
	/// Accepts everything, it only appears to reject versions while none are known.
	#[default] Latest,
	/// Only this version, trailing zero components are ignored.
	Exact(Version),
	/// The `+` forms.
	///
	/// Every component in `fixed` must match exactly, the component after them must be at least `minimum`
	/// and anything after that is free.
	/// - `1.2+` is `fixed: [1], minimum: 2`
	/// - `1.+` is the same as `1.0+`
	/// - `1+` is `fixed: [], minimum: 1`
	MinimumWithCarry { fixed: Vec<u64>, minimum: u64 },
}

impl VersionSpecifier {
	/// Never fails, see [`Version::parse`] for how malformed versions are treated.
	pub fn parse(s: &str) -> Self {
		let s = s.trim();
		if s.is_empty() || s == "+" || s.eq_ignore_ascii_case("LATEST") {
			return VersionSpecifier::Latest
		}

		if let Some(body) = s.strip_suffix('+') {
			let mut components = Version::parse(body).components().to_vec();
			/* A trailing '.' stands in for a 0 component */
			if body.ends_with('.') || components.is_empty() {
				components.push(0);
			}
			let minimum = components.pop().unwrap_or(0);
			VersionSpecifier::MinimumWithCarry { fixed: components, minimum }
		} else {
			VersionSpecifier::Exact(Version::parse(s))
		}
	}

	/// Checks if `version` is acceptable under this specifier.
	pub fn matches(&self, version: &Version) -> bool {
		match self {
			VersionSpecifier::Latest => true,
			VersionSpecifier::Exact(v) => v == version,
			VersionSpecifier::MinimumWithCarry { fixed, minimum } => {
				fixed.iter().enumerate().all(|(i, c)| version.component(i) == *c)
				&& version.component(fixed.len()) >= *minimum
			},
		}
	}

	pub fn is_latest(&self) -> bool {
		matches!(self, VersionSpecifier::Latest)
	}

	pub fn is_exact(&self) -> bool {
		matches!(self, VersionSpecifier::Exact(_))
	}
}

impl std::fmt::Display for VersionSpecifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			VersionSpecifier::Latest => write!(f, "LATEST"),
			VersionSpecifier::Exact(v) => write!(f, "{}", v),
			VersionSpecifier::MinimumWithCarry { fixed, minimum } => {
				for c in fixed {
					write!(f, "{}.", c)?;
				}
				write!(f, "{}+", minimum)
			},
		}
	}
}

impl From<&str> for VersionSpecifier {
	fn from(value: &str) -> Self { Self::parse(value) }
}

#[cfg(test)]
mod test {
	use super::*;

	fn accepts(spec: &str, version: &str) -> bool {
		VersionSpecifier::parse(spec).matches(&Version::parse(version))
	}

	#[test] fn specifier_latest_is_case_insensitive() { assert!(VersionSpecifier::parse("latest").is_latest()) }
	#[test] fn specifier_empty_is_latest() { assert!(VersionSpecifier::parse("").is_latest()) }
	#[test] fn specifier_latest_accepts_anything() { assert!(accepts("LATEST", "8.2.0-alpha")) }
	#[test] fn specifier_exact_ignores_trailing_zeros() { assert!(accepts("2.0", "2.0.0") && accepts("2.0.0", "2")) }
	#[test] fn specifier_exact_rejects_other_versions() { assert!(!accepts("2.0", "0.1") && !accepts("2.0", "2.0.1")) }
	#[test] fn specifier_exact_respects_suffix() { assert!(!accepts("3.2", "3.2-alpha")) }

	#[test]
	fn specifier_minor_range_holds_major() {
		assert!(accepts("1.0+", "1.0"));
		assert!(accepts("1.0+", "1.1.0"));
		assert!(accepts("1.2+", "1.2.5"));
		assert!(accepts("1.2+", "1.10"));
		assert!(!accepts("1.2+", "1.1.9"));
		assert!(!accepts("1.0+", "0.9"));
		assert!(!accepts("1.0+", "2.0"));
	}

	#[test]
	fn specifier_trailing_dot_matches_zero() {
		assert_eq!(VersionSpecifier::parse("1.+"), VersionSpecifier::parse("1.0+"));
		assert!(accepts("1.+", "1.9.3"));
		assert!(!accepts("1.+", "2.0"));
	}

	#[test]
	fn specifier_bare_plus_anchors_major() {
		assert!(accepts("1+", "1.0"));
		assert!(accepts("1+", "7.0.0"));
		assert!(accepts("2+", "8.2.0-alpha"));
		assert!(!accepts("2+", "1.9"));
	}

	#[test]
	fn specifier_point_range() {
		assert!(accepts("1.2.3+", "1.2.3"));
		assert!(accepts("1.2.3+", "1.2.4"));
		assert!(!accepts("1.2.3+", "1.3.0"));
		assert!(!accepts("1.2.3+", "1.2.2"));
	}

	#[test]
	fn specifier_display() {
		assert_eq!(VersionSpecifier::parse("1.+").to_string(), "1.0+");
		assert_eq!(VersionSpecifier::parse("1+").to_string(), "1+");
		assert_eq!(VersionSpecifier::parse("latest").to_string(), "LATEST");
		assert_eq!(VersionSpecifier::parse("7.0.0").to_string(), "7.0.0");
	}
}
