// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Coarse browser identification from a user-agent string.
//!
//! The profiler classifies an agent into one of four families by keyword and
//! returns the versioned token that matched, e.g. `chrome/96.0.4664.110`.
//! Checks run in a fixed priority order so agents that advertise several
//! engines (Chrome also claims Safari) resolve deterministically:
//!
//! 1. Internet Explorer (`msie`)
//! 2. Firefox
//! 3. Safari, only when the agent does not also mention Chrome
//! 4. Chrome

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static IE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"msie [\d.]+;").unwrap());
static FIREFOX_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"firefox/[\d.]+").unwrap());
static SAFARI_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"safari/[\d.]+").unwrap());
static CHROME_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"chrome/[\d.]+").unwrap());

/// Browser family recognised by the profiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserFamily {
	InternetExplorer,
	Firefox,
	Safari,
	Chrome,
}

impl fmt::Display for BrowserFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InternetExplorer => write!(f, "ie"),
			Self::Firefox => write!(f, "firefox"),
			Self::Safari => write!(f, "safari"),
			Self::Chrome => write!(f, "chrome"),
		}
	}
}

/// Matched browser token. Serializes as the bare token string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserTag {
	family: BrowserFamily,
	token: String,
}

impl BrowserTag {
	pub fn family(&self) -> BrowserFamily {
		self.family
	}

	/// The lowercased substring of the agent that matched, e.g. `firefox/95.0`.
	pub fn as_str(&self) -> &str {
		&self.token
	}
}

impl fmt::Display for BrowserTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.token)
	}
}

impl Serialize for BrowserTag {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.token)
	}
}

/// Identifies the browser family and version token of a user agent.
///
/// Returns `None` for unknown browsers, and also when a family keyword is
/// present but carries no parsable version. A keyword only counts when it
/// does not start the agent string.
pub fn identify(user_agent: &str) -> Option<BrowserTag> {
	let agent = user_agent.to_lowercase();
	let mentions = |keyword: &str| agent.find(keyword).is_some_and(|idx| idx > 0);

	let (family, pattern) = if mentions("msie") {
		(BrowserFamily::InternetExplorer, &*IE_TOKEN)
	} else if mentions("firefox") {
		(BrowserFamily::Firefox, &*FIREFOX_TOKEN)
	} else if mentions("safari") && !agent.contains("chrome") {
		(BrowserFamily::Safari, &*SAFARI_TOKEN)
	} else if mentions("chrome") {
		(BrowserFamily::Chrome, &*CHROME_TOKEN)
	} else {
		return None;
	};

	pattern.find(&agent).map(|m| BrowserTag {
		family,
		token: m.as_str().to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
		(KHTML, like Gecko) Chrome/96.0.4664.110 Safari/537.36";
	const SAFARI_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
		(KHTML, like Gecko) Version/15.1 Safari/605.1.15";
	const FIREFOX_UA: &str =
		"Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:95.0) Gecko/20100101 Firefox/95.0";
	const IE_UA: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1; Trident/4.0)";

	#[test]
	fn chrome_wins_over_safari() {
		let tag = identify(CHROME_UA).unwrap();
		assert_eq!(tag.family(), BrowserFamily::Chrome);
		assert_eq!(tag.as_str(), "chrome/96.0.4664.110");
	}

	#[test]
	fn safari_without_chrome() {
		let tag = identify(SAFARI_UA).unwrap();
		assert_eq!(tag.family(), BrowserFamily::Safari);
		assert_eq!(tag.as_str(), "safari/605.1.15");
	}

	#[test]
	fn firefox() {
		let tag = identify(FIREFOX_UA).unwrap();
		assert_eq!(tag.family(), BrowserFamily::Firefox);
		assert_eq!(tag.as_str(), "firefox/95.0");
	}

	#[test]
	fn internet_explorer_keeps_trailing_semicolon() {
		let tag = identify(IE_UA).unwrap();
		assert_eq!(tag.family(), BrowserFamily::InternetExplorer);
		assert_eq!(tag.as_str(), "msie 8.0;");
	}

	#[test]
	fn unknown_agents_have_no_tag() {
		assert!(identify("").is_none());
		assert!(identify("curl/8.4.0").is_none());
		// Keyword at the very start of the agent is not counted.
		assert!(identify("chrome/96.0").is_none());
	}

	#[test]
	fn keyword_without_version_has_no_tag() {
		assert!(identify("Mozilla/5.0 Firefox").is_none());
	}

	#[test]
	fn tag_serializes_as_plain_string() {
		let tag = identify(FIREFOX_UA).unwrap();
		assert_eq!(serde_json::to_value(&tag).unwrap(), serde_json::json!("firefox/95.0"));
	}

	proptest! {
		#[test]
		fn never_panics(agent in ".*") {
			let _ = identify(&agent);
		}

		#[test]
		fn chrome_version_is_reported_verbatim(version in "[0-9]{1,3}(\\.[0-9]{1,4}){0,3}") {
			let agent = format!(
				"Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Safari/537.36"
			);
			let tag = identify(&agent).unwrap();
			prop_assert_eq!(tag.family(), BrowserFamily::Chrome);
			prop_assert_eq!(tag.as_str(), format!("chrome/{version}"));
		}
	}
}
