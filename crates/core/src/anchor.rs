//! Re-resolvable element handles.
//!
//! An [`ElementRef`] dies with the UI tree it came from. An [`Anchor`] keeps
//! the handle together with the [`ElementPath`] that produced it, so a retry
//! can locate the same element again after a stale reference or a new session.

use std::fmt;

use rollcall_protocol::{ElementRef, Locator};
use rollcall_runtime::{Backend, Error as BackendError, Result as BackendResult};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
	locator: Locator,
	index: usize,
}

/// Chain of `(locator, index)` steps from the document root to one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
	steps: Vec<Step>,
}

impl ElementPath {
	/// The `index`-th match of `locator` at document level.
	pub fn root(locator: &Locator, index: usize) -> Self {
		Self {
			steps: vec![Step {
				locator: locator.clone(),
				index,
			}],
		}
	}

	/// The `index`-th match of `locator` under this path's element.
	pub fn child(&self, locator: &Locator, index: usize) -> Self {
		let mut steps = self.steps.clone();
		steps.push(Step {
			locator: locator.clone(),
			index,
		});
		Self { steps }
	}

	pub fn depth(&self) -> usize {
		self.steps.len()
	}

	/// Walks the path against the live tree.
	pub async fn resolve(&self, backend: &dyn Backend) -> BackendResult<ElementRef> {
		let mut current: Option<ElementRef> = None;
		for step in &self.steps {
			let matches = match &current {
				None => backend.find_all(&step.locator).await?,
				Some(parent) => backend.find_all_in(parent, &step.locator).await?,
			};
			let found = matches
				.into_iter()
				.nth(step.index)
				.ok_or_else(|| BackendError::NoSuchElement(format!("{}[{}]", step.locator, step.index)))?;
			current = Some(found);
		}
		current.ok_or_else(|| BackendError::NoSuchElement("empty element path".into()))
	}
}

impl fmt::Display for ElementPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, step) in self.steps.iter().enumerate() {
			if i > 0 {
				f.write_str(" > ")?;
			}
			write!(f, "{}[{}]", step.locator, step.index)?;
		}
		Ok(())
	}
}

/// An element path plus, when available, the handle it last resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
	path: ElementPath,
	element: Option<ElementRef>,
}

impl Anchor {
	pub fn resolved(path: ElementPath, element: ElementRef) -> Self {
		Self {
			path,
			element: Some(element),
		}
	}

	pub fn unresolved(path: ElementPath) -> Self {
		Self { path, element: None }
	}

	/// Unresolved anchor for the `index`-th match of `locator` under this one.
	pub fn child(&self, locator: &Locator, index: usize) -> Self {
		Self::unresolved(self.path.child(locator, index))
	}

	pub fn path(&self) -> &ElementPath {
		&self.path
	}

	pub fn element(&self) -> Option<&ElementRef> {
		self.element.as_ref()
	}

	/// The handle to act on for attempt number `attempt`.
	///
	/// Attempt 0 reuses the cached handle; later attempts re-resolve the path
	/// because the cached handle may belong to a stale tree or a dead session.
	pub async fn current(&self, backend: &dyn Backend, attempt: u32) -> BackendResult<ElementRef> {
		match (&self.element, attempt) {
			(Some(element), 0) => Ok(element.clone()),
			_ => self.path.resolve(backend).await,
		}
	}
}

impl fmt::Display for Anchor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.path.fmt(f)
	}
}
