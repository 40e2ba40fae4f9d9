//! Section and contact enumeration.
//!
//! Sections come from a direct query when the server supports it. When the
//! query is refused or comes back empty, every candidate node is scanned and
//! kept when its identifier attribute is a single uppercase letter or `#`.

use std::sync::LazyLock;

use regex::Regex;
use rollcall_protocol::{ElementRef, Locator};
use rollcall_runtime::{Backend, Result as BackendResult};
use tracing::{debug, warn};

use crate::anchor::{Anchor, ElementPath};
use crate::error::Result;
use crate::locators::Locators;
use crate::query::ResilientQuery;

static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Z]|#)$").expect("valid section regex"));

/// Strips namespace prefixes: `com.app:id/A` becomes `A`.
pub fn normalize_identifier(raw: &str) -> &str {
	let tail = raw.rsplit('/').next().unwrap_or(raw);
	tail.rsplit(':').next().unwrap_or(tail)
}

/// Whether a normalized identifier names a section header.
pub fn is_section_marker(identifier: &str) -> bool {
	SECTION_MARKER.is_match(identifier)
}

/// Lists sections and the contacts inside them.
///
/// Remembers a refused direct query so later passes go straight to the scan.
#[derive(Debug, Default)]
pub struct SectionEnumerator {
	direct_query_refused: bool,
}

impl SectionEnumerator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Section anchors in on-screen order.
	///
	/// Only fatal errors escape; anything else yields an empty list.
	pub async fn list_sections(&mut self, query: &mut ResilientQuery, locators: &Locators) -> Result<Vec<Anchor>> {
		if !self.direct_query_refused {
			match query.find_all(&locators.sections).await {
				Ok(found) if !found.is_empty() => {
					return Ok(found
						.into_iter()
						.enumerate()
						.map(|(i, el)| Anchor::resolved(ElementPath::root(&locators.sections, i), el))
						.collect());
				}
				Ok(_) => debug!(target = "rollcall", "section query matched nothing, scanning candidates"),
				Err(err) if err.is_fatal() => return Err(err),
				Err(err) => {
					if err.kind() == rollcall_runtime::FailureKind::Rejected {
						self.direct_query_refused = true;
					}
					debug!(target = "rollcall", error = %err, "section query failed, scanning candidates");
				}
			}
		}

		let candidates = locators.section_candidates.clone();
		let attribute = locators.section_id_attribute.clone();
		let scan = query
			.run("scan sections", &locators.section_candidates, move |backend, _| {
				let (candidates, attribute) = (candidates.clone(), attribute.clone());
				Box::pin(async move { scan_candidates(backend.as_ref(), &candidates, &attribute).await })
			})
			.await;

		match scan {
			Ok(found) => Ok(found
				.into_iter()
				.map(|(i, el)| Anchor::resolved(ElementPath::root(&locators.section_candidates, i), el))
				.collect()),
			Err(err) if err.is_fatal() => Err(err),
			Err(err) => {
				warn!(target = "rollcall", error = %err, "could not list sections");
				Ok(Vec::new())
			}
		}
	}

	/// Contact rows of the section at `section`, or `None` when there are
	/// not that many sections right now.
	pub async fn list_contacts(
		&mut self,
		query: &mut ResilientQuery,
		locators: &Locators,
		section: usize,
	) -> Result<Option<Vec<Anchor>>> {
		let sections = self.list_sections(query, locators).await?;
		let Some(anchor) = sections.into_iter().nth(section) else {
			return Ok(None);
		};
		let rows = query.find_all_in(&anchor, &locators.contact_rows).await?;
		Ok(Some(
			rows.into_iter()
				.enumerate()
				.map(|(i, el)| Anchor::resolved(anchor.path().child(&locators.contact_rows, i), el))
				.collect(),
		))
	}
}

async fn scan_candidates(
	backend: &dyn Backend,
	candidates: &Locator,
	attribute: &str,
) -> BackendResult<Vec<(usize, ElementRef)>> {
	let nodes = backend.find_all(candidates).await?;
	let mut sections = Vec::new();
	for (index, node) in nodes.into_iter().enumerate() {
		match backend.attribute(&node, attribute).await {
			Ok(Some(raw)) if is_section_marker(normalize_identifier(&raw)) => sections.push((index, node)),
			Ok(_) => {}
			Err(err) if err.is_stale() => debug!(target = "rollcall", index, "candidate went stale, skipping"),
			Err(err) => return Err(err),
		}
	}
	Ok(sections)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::testing::{FakeContact, FakeDevice, FakeFactory};
	use crate::timings::Timings;

	#[test]
	fn identifiers_are_normalized() {
		assert_eq!(normalize_identifier("com.snapchat.android:id/A"), "A");
		assert_eq!(normalize_identifier("pkg:B"), "B");
		assert_eq!(normalize_identifier("#"), "#");
		assert_eq!(normalize_identifier(""), "");
	}

	#[test]
	fn only_single_capitals_and_hash_are_sections() {
		for id in ["A", "Z", "#"] {
			assert!(is_section_marker(id), "{id}");
		}
		for id in ["a", "AB", "", "1", "select_recipients_friends_x"] {
			assert!(!is_section_marker(id), "{id}");
		}
	}

	fn device() -> FakeDevice {
		FakeDevice::with_contacts([
			FakeContact::connected("Amy"),
			FakeContact::connected("Ann"),
			FakeContact::connected("Bea"),
			FakeContact::connected("2pac"),
		])
		.on_contact_list()
	}

	async fn query_on(device: &FakeDevice) -> ResilientQuery {
		ResilientQuery::connect(Arc::new(FakeFactory::new(device.clone())), Timings::immediate())
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn direct_query_and_scan_agree() {
		let locators = Locators::default();

		let direct = device();
		let mut query = query_on(&direct).await;
		let via_query = SectionEnumerator::new().list_sections(&mut query, &locators).await.unwrap();

		let refused = device().without_section_query();
		let mut query = query_on(&refused).await;
		let mut enumerator = SectionEnumerator::new();
		let via_scan = enumerator.list_sections(&mut query, &locators).await.unwrap();

		assert_eq!(via_query.len(), 3);
		assert_eq!(via_scan.len(), 3);
		assert!(enumerator.direct_query_refused);
	}

	#[tokio::test]
	async fn contacts_are_listed_per_section() {
		let device = device();
		let mut query = query_on(&device).await;
		let locators = Locators::default();
		let mut enumerator = SectionEnumerator::new();

		let first = enumerator.list_contacts(&mut query, &locators, 0).await.unwrap().unwrap();
		let last = enumerator.list_contacts(&mut query, &locators, 2).await.unwrap().unwrap();
		let missing = enumerator.list_contacts(&mut query, &locators, 3).await.unwrap();

		assert_eq!(first.len(), 2);
		assert_eq!(last.len(), 1);
		assert!(missing.is_none());
		let name = query.text(&first[1].child(&locators.contact_name, 0)).await.unwrap();
		assert_eq!(name, "Ann");
	}

	#[tokio::test]
	async fn empty_list_yields_no_sections() {
		let device = FakeDevice::new().on_contact_list();
		let mut query = query_on(&device).await;

		let sections = SectionEnumerator::new()
			.list_sections(&mut query, &Locators::default())
			.await
			.unwrap();

		assert!(sections.is_empty());
	}
}
