//! Path codec.
//!
//! A path is an ordered list of decoded segments. Its canonical string form
//! is a single leading `/` followed by the percent-encoded segments joined
//! with `/`; the root path has no segments and renders as `/`.
//!
//! Round-trip law: `canonicalize(&path_to_array(p)) == normalize(p)` for
//! every `p`, and `path_to_array(&canonicalize(s)) == s` for every segment
//! list `s` without empty first or last segment.

use std::borrow::Cow;

/// Segment delimiter.
pub const DELIMITER: char = '/';

/// Splits `path` into decoded segments.
///
/// Empty segments produced by leading or trailing delimiters are discarded;
/// empty interior segments (`/a//b`) are kept. Percent-escapes are decoded;
/// a segment whose escapes do not form valid UTF-8 is kept verbatim.
///
/// # Example
///
/// ```
/// use compass_urls::path::path_to_array;
///
/// assert_eq!(path_to_array("/users/42/"), vec!["users", "42"]);
/// assert_eq!(path_to_array("/a%20b"), vec!["a b"]);
/// assert!(path_to_array("/").is_empty());
/// ```
pub fn path_to_array(path: &str) -> Vec<String> {
	let trimmed = path.trim_matches(DELIMITER);
	if trimmed.is_empty() {
		return Vec::new();
	}
	trimmed
		.split(DELIMITER)
		.map(|raw| decode_segment(raw).into_owned())
		.collect()
}

/// Joins decoded segments into the canonical path string.
///
/// # Example
///
/// ```
/// use compass_urls::path::canonicalize;
///
/// assert_eq!(canonicalize(&["users", "a b"]), "/users/a%20b");
/// assert_eq!(canonicalize::<&str>(&[]), "/");
/// ```
pub fn canonicalize<S: AsRef<str>>(segments: &[S]) -> String {
	let mut out = String::with_capacity(segments.iter().map(|s| s.as_ref().len() + 1).sum::<usize>().max(1));
	for segment in segments {
		out.push(DELIMITER);
		out.push_str(&encode_segment(segment.as_ref()));
	}
	if out.is_empty() {
		out.push(DELIMITER);
	}
	out
}

/// Returns the canonical form of `path`.
pub fn normalize(path: &str) -> String {
	canonicalize(&path_to_array(path))
}

/// Decodes the percent-escapes of one segment.
pub fn decode_segment(raw: &str) -> Cow<'_, str> {
	if !raw.contains('%') {
		return Cow::Borrowed(raw);
	}
	urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Percent-encodes one segment; RFC 3986 unreserved characters are kept.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
	urlencoding::encode(segment)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/", &[])]
	#[case("", &[])]
	#[case("//", &[])]
	#[case("/users", &["users"])]
	#[case("users", &["users"])]
	#[case("/users/", &["users"])]
	#[case("/users/42/posts", &["users", "42", "posts"])]
	#[case("/a//b", &["a", "", "b"])]
	#[case("//a//", &["a"])]
	fn test_path_to_array(#[case] input: &str, #[case] expected: &[&str]) {
		assert_eq!(path_to_array(input), expected);
	}

	#[rstest]
	#[case("/caf%C3%A9", "café")]
	#[case("/a%2Fb", "a/b")]
	#[case("/100%25", "100%")]
	#[case("/a+b", "a+b")]
	fn test_path_to_array_decodes(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(path_to_array(input), vec![expected.to_string()]);
	}

	#[rstest]
	fn test_invalid_utf8_escape_kept_verbatim() {
		assert_eq!(path_to_array("/%FF%FE"), vec!["%FF%FE".to_string()]);
	}

	#[rstest]
	fn test_canonicalize_root() {
		assert_eq!(canonicalize::<String>(&[]), "/");
	}

	#[rstest]
	fn test_canonicalize_encodes_reserved() {
		assert_eq!(canonicalize(&["a/b", "c d", "é"]), "/a%2Fb/c%20d/%C3%A9");
	}

	#[rstest]
	#[case("/users/", "/users")]
	#[case("users", "/users")]
	#[case("/a%20b/", "/a%20b")]
	#[case("/a b", "/a%20b")]
	#[case("///", "/")]
	fn test_normalize(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize(input), expected);
	}

	#[rstest]
	fn test_round_trip_segments() {
		let segments = vec!["docs".to_string(), "a/b".to_string(), "100%".to_string()];
		assert_eq!(path_to_array(&canonicalize(&segments)), segments);
	}
}
