//! The traversal state machine.
//!
//! ```text
//! Idle -> EnumeratingSections -> EnumeratingContacts -> ReReadingSnapshot
//!      -> OpeningContact -> Deciding -> Advancing -> (ReReadingSnapshot | next section) -> Done
//! ```
//!
//! The contact list is re-read before every contact because opening a chat
//! and coming back invalidates every element handle. A removal shifts the
//! following rows up by one, so the cursor stays on the same index after a
//! [`Outcome::Removed`].

use std::sync::Arc;

use rollcall_runtime::SessionFactory;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::decision::DecisionPolicy;
use crate::enumerator::SectionEnumerator;
use crate::error::{Result, ResultExt};
use crate::navigation;
use crate::policy::Outcome;
use crate::query::ResilientQuery;
use crate::scroll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
	Idle,
	EnumeratingSections,
	EnumeratingContacts,
	ReReadingSnapshot,
	OpeningContact,
	Deciding,
	Advancing,
	Done,
}

/// What the cursor does after visiting a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
	Advance,
	/// Visit the same index again.
	Rewind,
	/// The section has no row at this index any more.
	SectionExhausted,
}

/// Position within one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
	pub section: usize,
	pub contact: usize,
	/// Contacts seen when the section was entered.
	bound: usize,
	rewinds: usize,
}

impl Cursor {
	fn new(section: usize, bound: usize) -> Self {
		Self {
			section,
			contact: 0,
			bound,
			rewinds: 0,
		}
	}

	fn in_bounds(&self) -> bool {
		self.contact < self.bound
	}

	/// A section cannot lose more rows than it started with, so rewinds past
	/// that count advance instead.
	fn apply(&mut self, step: Step) {
		match step {
			Step::Advance => self.contact += 1,
			Step::Rewind if self.rewinds < self.bound => self.rewinds += 1,
			Step::Rewind => {
				warn!(target = "rollcall", section = self.section + 1, "rewind limit reached, advancing");
				self.contact += 1;
			}
			Step::SectionExhausted => self.contact = self.bound,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
	/// Zero-based section index.
	pub section: usize,
	/// Zero-based row index at the time of the visit.
	pub index: usize,
	/// `None` when the name could not be read.
	pub name: Option<String>,
	pub outcome: Outcome,
}

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
	pub sections: usize,
	pub contacts: Vec<ContactRecord>,
	pub session_repairs: u32,
}

impl RunReport {
	pub fn count(&self, outcome: Outcome) -> usize {
		self.contacts.iter().filter(|r| r.outcome == outcome).count()
	}

	/// Names with the given outcome, in visit order.
	pub fn names(&self, outcome: Outcome) -> Vec<&str> {
		self.contacts
			.iter()
			.filter(|r| r.outcome == outcome)
			.filter_map(|r| r.name.as_deref())
			.collect()
	}
}

/// Walks every section and contact once, acting on each by policy.
pub struct Traversal {
	query: ResilientQuery,
	enumerator: SectionEnumerator,
	config: EngineConfig,
	phase: Phase,
	report: RunReport,
}

impl Traversal {
	pub fn new(query: ResilientQuery, config: EngineConfig) -> Self {
		Self {
			query,
			enumerator: SectionEnumerator::new(),
			config,
			phase: Phase::Idle,
			report: RunReport::default(),
		}
	}

	/// Opens the first session and builds a traversal on it.
	pub async fn connect(factory: Arc<dyn SessionFactory>, config: EngineConfig) -> Result<Self> {
		let query = ResilientQuery::connect(factory, config.timings.clone()).await?;
		Ok(Self::new(query, config))
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Progress so far; complete after [`Traversal::run`] returns.
	pub fn report(&self) -> &RunReport {
		&self.report
	}

	/// Navigates from the app's start screen to the contact list.
	pub async fn bootstrap(&mut self) -> Result<()> {
		info!(target = "rollcall", "opening contact list");
		navigation::bootstrap(&mut self.query, &self.config.locators).await
	}

	/// Visits every contact. Fails only on a fatal error.
	pub async fn run(&mut self) -> Result<RunReport> {
		let walked = self.walk().await;
		self.report.session_repairs = self.query.repairs();
		walked?;
		self.phase = Phase::Done;
		info!(
			target = "rollcall",
			sections = self.report.sections,
			contacts = self.report.contacts.len(),
			sent = self.report.count(Outcome::MessageSent),
			removed = self.report.count(Outcome::Removed),
			repairs = self.report.session_repairs,
			"traversal complete"
		);
		Ok(self.report.clone())
	}

	/// Ends the backend session.
	pub async fn close(self) -> rollcall_runtime::Result<()> {
		self.query.close().await
	}

	async fn walk(&mut self) -> Result<()> {
		self.phase = Phase::EnumeratingSections;
		self.query.dismiss_keyboard().await.non_fatal("dismiss keyboard")?;
		self.query.settle().await;

		let sections = self.enumerator.list_sections(&mut self.query, &self.config.locators).await?;
		self.report.sections = sections.len();
		info!(target = "rollcall", count = sections.len(), "sections found");

		for section in 0..sections.len() {
			self.walk_section(section).await?;
		}
		Ok(())
	}

	async fn walk_section(&mut self, section: usize) -> Result<()> {
		self.phase = Phase::EnumeratingContacts;
		let listed = self
			.enumerator
			.list_contacts(&mut self.query, &self.config.locators, section)
			.await
			.non_fatal("list contacts")?;
		let bound = match listed {
			Some(Some(rows)) => rows.len(),
			Some(None) => {
				warn!(target = "rollcall", section = section + 1, "section vanished");
				return Ok(());
			}
			None => {
				warn!(target = "rollcall", section = section + 1, "could not list contacts, skipping section");
				return Ok(());
			}
		};
		info!(target = "rollcall", section = section + 1, contacts = bound, "entering section");

		let mut cursor = Cursor::new(section, bound);
		let mut last_removed = None;
		while cursor.in_bounds() {
			let step = self.visit(cursor, &mut last_removed).await?;
			self.phase = Phase::Advancing;
			cursor.apply(step);
		}
		Ok(())
	}

	async fn visit(&mut self, cursor: Cursor, last_removed: &mut Option<String>) -> Result<Step> {
		self.phase = Phase::ReReadingSnapshot;
		let just_removed = last_removed.take();
		self.query.settle().await;
		self.query.dismiss_keyboard().await.non_fatal("dismiss keyboard")?;

		let listed = self
			.enumerator
			.list_contacts(&mut self.query, &self.config.locators, cursor.section)
			.await
			.non_fatal("re-read contacts")?;
		let rows = match listed {
			Some(Some(rows)) => rows,
			Some(None) => {
				info!(target = "rollcall", section = cursor.section + 1, "section no longer present");
				return Ok(Step::SectionExhausted);
			}
			None => {
				warn!(target = "rollcall", section = cursor.section + 1, contact = cursor.contact + 1, "could not re-read contacts, skipping index");
				return Ok(Step::Advance);
			}
		};
		let Some(row) = rows.get(cursor.contact) else {
			debug!(target = "rollcall", section = cursor.section + 1, rows = rows.len(), "section shrank below cursor");
			return Ok(Step::SectionExhausted);
		};

		let name_anchor = row.child(&self.config.locators.contact_name, 0);
		let Some(name) = self.query.text(&name_anchor).await.non_fatal("read contact name")? else {
			self.record(cursor, None, Outcome::SkippedUnresolvable);
			return Ok(Step::Advance);
		};
		let name = name.trim().to_string();

		if just_removed.is_some_and(|removed| removed == name) {
			warn!(target = "rollcall", name, "contact still listed after removal, moving on");
			self.record(cursor, Some(name), Outcome::SkippedUnresolvable);
			return Ok(Step::Advance);
		}

		if !self.config.policy.should_process(&name) {
			self.record(cursor, Some(name), Outcome::SkippedByPolicy);
			return Ok(Step::Advance);
		}

		self.phase = Phase::OpeningContact;
		info!(target = "rollcall", section = cursor.section + 1, contact = cursor.contact + 1, name, "opening contact");
		scroll::scroll_into_view(
			&mut self.query,
			&name_anchor,
			&self.config.locators.bounds_attribute,
			self.config.safe_band,
		)
		.await?;

		if let Err(err) = self.query.click_anchor(&name_anchor).await {
			if err.is_fatal() {
				return Err(err);
			}
			warn!(target = "rollcall", name, error = %err, "could not open contact, recovering");
			navigation::recover_to_root(&mut self.query, &self.config.locators).await?;
			self.record(cursor, Some(name), Outcome::SkippedUnresolvable);
			return Ok(Step::Advance);
		}

		self.phase = Phase::Deciding;
		let outcome = DecisionPolicy::new(&self.config.locators, &self.config.policy)
			.decide(&mut self.query, &name)
			.await?;
		self.record(cursor, Some(name.clone()), outcome);

		if outcome.rewinds() {
			*last_removed = Some(name);
			Ok(Step::Rewind)
		} else {
			Ok(Step::Advance)
		}
	}

	fn record(&mut self, cursor: Cursor, name: Option<String>, outcome: Outcome) {
		info!(
			target = "rollcall",
			section = cursor.section + 1,
			contact = cursor.contact + 1,
			name = name.as_deref().unwrap_or("<unreadable>"),
			%outcome,
			"contact done"
		);
		self.report.contacts.push(ContactRecord {
			section: cursor.section,
			index: cursor.contact,
			name,
			outcome,
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cursor_rewinds_until_limit() {
		let mut cursor = Cursor::new(0, 2);
		cursor.apply(Step::Rewind);
		cursor.apply(Step::Rewind);
		assert_eq!(cursor.contact, 0);
		cursor.apply(Step::Rewind);
		assert_eq!(cursor.contact, 1);
		cursor.apply(Step::SectionExhausted);
		assert!(!cursor.in_bounds());
	}

	#[test]
	fn report_counts_by_outcome() {
		let record = |name: &str, outcome| ContactRecord {
			section: 0,
			index: 0,
			name: Some(name.into()),
			outcome,
		};
		let report = RunReport {
			sections: 1,
			contacts: vec![
				record("a", Outcome::Removed),
				record("b", Outcome::MessageSent),
				record("c", Outcome::Removed),
			],
			session_repairs: 0,
		};
		assert_eq!(report.count(Outcome::Removed), 2);
		assert_eq!(report.names(Outcome::Removed), ["a", "c"]);
	}
}
