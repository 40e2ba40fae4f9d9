//! Testing infrastructure for the engine.
//!
//! [`FakeDevice`] is an in-memory model of the target app: a screen stack,
//! a sectioned contact list with on-screen geometry, chat and profile screens,
//! and both removal flows. [`FakeFactory`] hands out [`FakeSession`]s bound to
//! one device, so state survives a session repair the way it does on a real
//! device with `noReset`.
//!
//! Faults are injected per operation with [`FakeDevice::inject`] and consumed
//! in order by whichever session performs that operation next.
//!
//! # Example
//!
//! ```ignore
//! use rollcall::testing::{FakeContact, FakeDevice, FakeFactory};
//!
//! let device = FakeDevice::with_contacts([FakeContact::connected("Ada"), FakeContact::stranger("Bo")]);
//! let factory = FakeFactory::new(device.clone());
//! // ... run a traversal against the factory, then inspect device.sent(), device.removed()
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::ready;
use std::sync::Arc;

use parking_lot::Mutex;
use rollcall_protocol::{ElementRef, Locator, Swipe, WindowSize};
use rollcall_runtime::{Backend, BoxFuture, Error as BackendError, Result as BackendResult, SessionFactory};

use crate::locators::Locators;

/// Device window.
pub const WINDOW: WindowSize = WindowSize {
	width: 1080,
	height: 2400,
};
/// Top edge of the first list slot at scroll offset zero.
pub const LIST_TOP: i32 = 600;
/// Height of one list slot (section header or contact row).
pub const ROW_HEIGHT: i32 = 150;

/// Backend operations that can carry an injected fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOp {
	Find,
	FindAll,
	FindIn,
	FindAllIn,
	Click,
	SetText,
	Text,
	Attribute,
	IsDisplayed,
	PressConfirm,
	DismissKeyboard,
	NavigateBack,
	Swipe,
	WindowSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
	/// The session dies.
	Backend,
	Stale,
	Intercepted,
	Rejected,
}

impl Fault {
	fn error(self, op: FakeOp) -> BackendError {
		let msg = format!("injected during {op:?}");
		match self {
			Self::Backend => BackendError::BackendFailure(msg),
			Self::Stale => BackendError::StaleReference(msg),
			Self::Intercepted => BackendError::ClickIntercepted(msg),
			Self::Rejected => BackendError::InvalidSelector(msg),
		}
	}
}

/// Which removal affordance the options menu offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalUi {
	ManageFriendship,
	Toggle,
	Unavailable,
}

#[derive(Debug, Clone)]
pub struct FakeContact {
	pub name: String,
	pub connected: bool,
	pub removal: RemovalUi,
	/// The options menu ignores the first tap.
	pub stubborn_options: bool,
	/// Confirming removal has no effect.
	pub survives_removal: bool,
	/// The chat offers no way into the profile.
	pub profile_hidden: bool,
}

impl FakeContact {
	pub fn connected(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			connected: true,
			removal: RemovalUi::ManageFriendship,
			stubborn_options: false,
			survives_removal: false,
			profile_hidden: false,
		}
	}

	pub fn stranger(name: impl Into<String>) -> Self {
		Self {
			connected: false,
			..Self::connected(name)
		}
	}

	pub fn with_removal(mut self, removal: RemovalUi) -> Self {
		self.removal = removal;
		self
	}

	pub fn with_stubborn_options(mut self) -> Self {
		self.stubborn_options = true;
		self
	}

	pub fn surviving_removal(mut self) -> Self {
		self.survives_removal = true;
		self
	}

	pub fn without_profile(mut self) -> Self {
		self.profile_hidden = true;
		self
	}

	fn section(&self) -> char {
		section_of(&self.name)
	}
}

fn section_of(name: &str) -> char {
	match name.chars().next() {
		Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
		_ => '#',
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
	Home,
	ChatList,
	ContactList,
	Preview(String),
	Chat(String),
	Profile(String),
	Options(String),
	Manage(String),
	RemoveDialog(String),
	ConfirmDialog(String),
}

impl Screen {
	fn contact(&self) -> Option<&str> {
		match self {
			Self::Home | Self::ChatList | Self::ContactList => None,
			Self::Preview(n)
			| Self::Chat(n)
			| Self::Profile(n)
			| Self::Options(n)
			| Self::Manage(n)
			| Self::RemoveDialog(n)
			| Self::ConfirmDialog(n) => Some(n),
		}
	}
}

impl fmt::Display for Screen {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Home => "home",
			Self::ChatList => "chat list",
			Self::ContactList => "contact list",
			Self::Preview(_) => "preview",
			Self::Chat(_) => "chat",
			Self::Profile(_) => "profile",
			Self::Options(_) => "options",
			Self::Manage(_) => "manage",
			Self::RemoveDialog(_) => "remove dialog",
			Self::ConfirmDialog(_) => "confirm dialog",
		};
		match self.contact() {
			Some(name) => write!(f, "{label}:{name}"),
			None => f.write_str(label),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Widget {
	ChatTab,
	ListRoot,
	ChatHeader,
	MessageField,
	AddFriend,
	VideoCall,
	Profile,
	Options,
	ManageFriendship,
	RemoveFriend,
	RemoveConfirm,
	RemoveToggle,
	ConfirmYes,
}

const WIDGETS: [Widget; 13] = [
	Widget::ChatTab,
	Widget::ListRoot,
	Widget::ChatHeader,
	Widget::MessageField,
	Widget::AddFriend,
	Widget::VideoCall,
	Widget::Profile,
	Widget::Options,
	Widget::ManageFriendship,
	Widget::RemoveFriend,
	Widget::RemoveConfirm,
	Widget::RemoveToggle,
	Widget::ConfirmYes,
];

impl Widget {
	fn locator(self, locators: &Locators) -> &Locator {
		match self {
			Self::ChatTab => &locators.chat_tab,
			Self::ListRoot => &locators.list_root,
			Self::ChatHeader => &locators.chat_header,
			Self::MessageField => &locators.message_field,
			Self::AddFriend => &locators.add_friend,
			Self::VideoCall => &locators.video_call,
			Self::Profile => &locators.profile,
			Self::Options => &locators.options,
			Self::ManageFriendship => &locators.manage_friendship,
			Self::RemoveFriend => &locators.remove_friend,
			Self::RemoveConfirm => &locators.remove_confirm,
			Self::RemoveToggle => &locators.remove_toggle,
			Self::ConfirmYes => &locators.confirm_yes,
		}
	}

	fn key(self) -> String {
		format!("{self:?}")
	}

	fn from_key(key: &str) -> Option<Self> {
		WIDGETS.into_iter().find(|w| w.key() == key)
	}
}

/// What a locator selects in the fake tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
	Sections,
	Candidates,
	Rows,
	Names,
	Widget(Widget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
	Section(char),
	Row(String),
	Name(String),
	Widget(Widget),
}

impl Node {
	fn element(&self, generation: u64) -> ElementRef {
		let (kind, key) = match self {
			Self::Section(c) => ("section", c.to_string()),
			Self::Row(n) => ("row", n.clone()),
			Self::Name(n) => ("name", n.clone()),
			Self::Widget(w) => ("widget", w.key()),
		};
		ElementRef::new(format!("{generation}:{kind}:{key}"))
	}

	fn parse(id: &str) -> Option<(u64, Self)> {
		let mut parts = id.splitn(3, ':');
		let generation = parts.next()?.parse().ok()?;
		let node = match (parts.next()?, parts.next()?) {
			("section", key) => Self::Section(key.chars().next()?),
			("row", key) => Self::Row(key.to_string()),
			("name", key) => Self::Name(key.to_string()),
			("widget", key) => Self::Widget(Widget::from_key(key)?),
			_ => return None,
		};
		Some((generation, node))
	}
}

#[derive(Debug, Default)]
struct Log {
	sent: Vec<(String, String)>,
	removed: Vec<String>,
	opened: Vec<String>,
	profiles: Vec<String>,
	swipes: Vec<Swipe>,
	back_presses: u32,
	sessions_created: u32,
}

#[derive(Debug)]
struct FakeApp {
	locators: Locators,
	contacts: Vec<FakeContact>,
	screens: Vec<Screen>,
	draft: String,
	scroll_offset: i32,
	options_tapped: bool,
	sections_query_supported: bool,
	generation: u64,
	session_open: bool,
	pending_create_failures: u32,
	faults: VecDeque<(FakeOp, Fault)>,
	log: Log,
}

impl FakeApp {
	fn top(&self) -> &Screen {
		self.screens.last().unwrap_or(&Screen::Home)
	}

	fn contact(&self, name: &str) -> Option<&FakeContact> {
		self.contacts.iter().find(|c| c.name == name)
	}

	fn sections(&self) -> Vec<char> {
		let mut sections: Vec<char> = Vec::new();
		for contact in &self.contacts {
			let section = contact.section();
			if sections.last() != Some(&section) {
				sections.push(section);
			}
		}
		sections
	}

	fn rows_in(&self, section: char) -> impl Iterator<Item = &FakeContact> {
		self.contacts.iter().filter(move |c| c.section() == section)
	}

	fn on_list(&self) -> bool {
		*self.top() == Screen::ContactList
	}

	fn widgets(&self) -> Vec<Widget> {
		match self.top() {
			Screen::Home => vec![Widget::ChatTab],
			Screen::ChatList => vec![Widget::ListRoot],
			Screen::ContactList => Vec::new(),
			Screen::Preview(_) => vec![Widget::ChatHeader],
			Screen::Chat(name) => {
				let contact = self.contact(name);
				let header = if contact.is_some_and(|c| c.connected) {
					Widget::VideoCall
				} else {
					Widget::AddFriend
				};
				if contact.is_some_and(|c| c.profile_hidden) {
					vec![Widget::MessageField, header]
				} else {
					vec![Widget::MessageField, Widget::Profile, header]
				}
			}
			Screen::Profile(_) => vec![Widget::Options],
			Screen::Options(name) => match self.contact(name).map(|c| c.removal) {
				Some(RemovalUi::ManageFriendship) => vec![Widget::ManageFriendship],
				Some(RemovalUi::Toggle) => vec![Widget::RemoveToggle],
				Some(RemovalUi::Unavailable) | None => Vec::new(),
			},
			Screen::Manage(_) => vec![Widget::RemoveFriend],
			Screen::RemoveDialog(_) => vec![Widget::RemoveConfirm],
			Screen::ConfirmDialog(_) => vec![Widget::ConfirmYes],
		}
	}

	fn classify(&self, locator: &Locator) -> Option<Target> {
		let l = &self.locators;
		if *locator == l.sections {
			Some(Target::Sections)
		} else if *locator == l.section_candidates {
			Some(Target::Candidates)
		} else if *locator == l.contact_rows {
			Some(Target::Rows)
		} else if *locator == l.contact_name {
			Some(Target::Names)
		} else {
			WIDGETS
				.into_iter()
				.find(|w| w.locator(l) == locator)
				.map(Target::Widget)
		}
	}

	fn check(&mut self, generation: u64, op: FakeOp) -> BackendResult<()> {
		if generation != self.generation || !self.session_open {
			return Err(BackendError::BackendFailure("invalid session id".into()));
		}
		if let Some(pos) = self.faults.iter().position(|(o, _)| *o == op) {
			if let Some((_, fault)) = self.faults.remove(pos) {
				return Err(fault.error(op));
			}
		}
		Ok(())
	}

	fn is_present(&self, node: &Node) -> bool {
		match node {
			Node::Section(c) => self.on_list() && self.sections().contains(c),
			Node::Row(n) | Node::Name(n) => self.on_list() && self.contact(n).is_some(),
			Node::Widget(w) => self.widgets().contains(w),
		}
	}

	fn node(&self, generation: u64, element: &ElementRef) -> BackendResult<Node> {
		let stale = || BackendError::StaleReference(element.to_string());
		let (owner, node) = Node::parse(element.id()).ok_or_else(stale)?;
		if owner != generation || !self.is_present(&node) {
			return Err(stale());
		}
		Ok(node)
	}

	fn select(&self, target: Target) -> BackendResult<Vec<Node>> {
		let list = self.on_list();
		Ok(match target {
			Target::Sections if !self.sections_query_supported => {
				return Err(BackendError::InvalidSelector("matches() is not supported".into()));
			}
			Target::Sections if list => self.sections().into_iter().map(Node::Section).collect(),
			Target::Candidates if list => self
				.sections()
				.into_iter()
				.flat_map(move |s| {
					std::iter::once(Node::Section(s)).chain(self.rows_in(s).map(|c| Node::Row(c.name.clone())))
				})
				.collect(),
			Target::Rows if list => self.contacts.iter().map(|c| Node::Row(c.name.clone())).collect(),
			Target::Names if list => self.contacts.iter().map(|c| Node::Name(c.name.clone())).collect(),
			Target::Widget(w) if self.widgets().contains(&w) => vec![Node::Widget(w)],
			_ => Vec::new(),
		})
	}

	fn find_all(&mut self, generation: u64, locator: &Locator) -> BackendResult<Vec<ElementRef>> {
		self.check(generation, FakeOp::FindAll)?;
		let nodes = match self.classify(locator) {
			Some(target) => self.select(target)?,
			None => Vec::new(),
		};
		Ok(nodes.iter().map(|n| n.element(generation)).collect())
	}

	fn find(&mut self, generation: u64, locator: &Locator) -> BackendResult<ElementRef> {
		self.check(generation, FakeOp::Find)?;
		let nodes = match self.classify(locator) {
			Some(target) => self.select(target)?,
			None => Vec::new(),
		};
		nodes
			.first()
			.map(|n| n.element(generation))
			.ok_or_else(|| BackendError::NoSuchElement(locator.to_string()))
	}

	fn children(&self, parent: &Node, locator: &Locator) -> Vec<Node> {
		match (parent, self.classify(locator)) {
			(Node::Section(s), Some(Target::Rows)) => self.rows_in(*s).map(|c| Node::Row(c.name.clone())).collect(),
			(Node::Row(n), Some(Target::Names)) => vec![Node::Name(n.clone())],
			_ => Vec::new(),
		}
	}

	fn find_all_in(&mut self, generation: u64, parent: &ElementRef, locator: &Locator) -> BackendResult<Vec<ElementRef>> {
		self.check(generation, FakeOp::FindAllIn)?;
		let parent = self.node(generation, parent)?;
		Ok(self
			.children(&parent, locator)
			.iter()
			.map(|n| n.element(generation))
			.collect())
	}

	fn find_in(&mut self, generation: u64, parent: &ElementRef, locator: &Locator) -> BackendResult<ElementRef> {
		self.check(generation, FakeOp::FindIn)?;
		let parent = self.node(generation, parent)?;
		self.children(&parent, locator)
			.first()
			.map(|n| n.element(generation))
			.ok_or_else(|| BackendError::NoSuchElement(locator.to_string()))
	}

	fn current_contact(&self) -> String {
		self.top().contact().unwrap_or_default().to_string()
	}

	fn pop_to_profile(&mut self) {
		while self.screens.len() > 1 && !matches!(self.top(), Screen::Profile(_)) {
			self.screens.pop();
		}
	}

	fn remove_contact(&mut self, name: &str) {
		if self.contact(name).is_some_and(|c| c.survives_removal) {
			return;
		}
		self.contacts.retain(|c| c.name != name);
		self.log.removed.push(name.to_string());
	}

	fn click(&mut self, generation: u64, element: &ElementRef) -> BackendResult<()> {
		self.check(generation, FakeOp::Click)?;
		let node = self.node(generation, element)?;
		let current = self.current_contact();
		match node {
			Node::Section(_) => {}
			Node::Row(name) | Node::Name(name) => {
				self.log.opened.push(name.clone());
				self.screens.push(Screen::Preview(name));
			}
			Node::Widget(widget) => match widget {
				Widget::ChatTab => self.screens.push(Screen::ChatList),
				Widget::ListRoot => {
					self.scroll_offset = 0;
					self.screens.push(Screen::ContactList);
				}
				Widget::ChatHeader => self.screens.push(Screen::Chat(current)),
				Widget::Profile => {
					self.options_tapped = false;
					self.log.profiles.push(current.clone());
					self.screens.push(Screen::Profile(current));
				}
				Widget::Options => {
					let stubborn = self.contact(&current).is_some_and(|c| c.stubborn_options);
					if stubborn && !self.options_tapped {
						self.options_tapped = true;
					} else {
						self.screens.push(Screen::Options(current));
					}
				}
				Widget::ManageFriendship => self.screens.push(Screen::Manage(current)),
				Widget::RemoveFriend => self.screens.push(Screen::RemoveDialog(current)),
				Widget::RemoveToggle => self.screens.push(Screen::ConfirmDialog(current)),
				Widget::RemoveConfirm | Widget::ConfirmYes => {
					self.remove_contact(&current);
					self.pop_to_profile();
				}
				Widget::MessageField | Widget::AddFriend | Widget::VideoCall => {}
			},
		}
		Ok(())
	}

	fn set_text(&mut self, generation: u64, element: &ElementRef, text: &str) -> BackendResult<()> {
		self.check(generation, FakeOp::SetText)?;
		match self.node(generation, element)? {
			Node::Widget(Widget::MessageField) => {
				self.draft = text.to_string();
				Ok(())
			}
			other => Err(BackendError::InvalidElementState(format!("{other:?} does not take text"))),
		}
	}

	fn text(&mut self, generation: u64, element: &ElementRef) -> BackendResult<String> {
		self.check(generation, FakeOp::Text)?;
		Ok(match self.node(generation, element)? {
			Node::Name(name) => name,
			Node::Section(c) => c.to_string(),
			Node::Row(_) | Node::Widget(_) => String::new(),
		})
	}

	fn slot(&self, node: &Node) -> Option<i32> {
		let mut slot = 0;
		for section in self.sections() {
			if *node == Node::Section(section) {
				return Some(slot);
			}
			slot += 1;
			for contact in self.rows_in(section) {
				if matches!(node, Node::Row(n) | Node::Name(n) if *n == contact.name) {
					return Some(slot);
				}
				slot += 1;
			}
		}
		None
	}

	fn attribute(&mut self, generation: u64, element: &ElementRef, name: &str) -> BackendResult<Option<String>> {
		self.check(generation, FakeOp::Attribute)?;
		let node = self.node(generation, element)?;
		Ok(match name {
			"resource-id" => match &node {
				Node::Section(c) => Some(format!("com.snapchat.android:id/{c}")),
				Node::Row(n) => Some(format!("select_recipients_friends_{n}")),
				Node::Name(_) | Node::Widget(_) => None,
			},
			"bounds" => match self.slot(&node) {
				Some(slot) => {
					let y1 = LIST_TOP + slot * ROW_HEIGHT - self.scroll_offset;
					Some(format!("[40,{y1}][1040,{}]", y1 + ROW_HEIGHT))
				}
				None => Some("[0,0][1080,200]".into()),
			},
			_ => None,
		})
	}
}

/// Shared handle to the in-memory app.
#[derive(Clone)]
pub struct FakeDevice {
	app: Arc<Mutex<FakeApp>>,
}

impl fmt::Debug for FakeDevice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FakeDevice")
			.field("screen", &self.screen_name())
			.finish_non_exhaustive()
	}
}

impl Default for FakeDevice {
	fn default() -> Self {
		Self::new()
	}
}

impl FakeDevice {
	/// An app on its home screen with no contacts.
	pub fn new() -> Self {
		Self {
			app: Arc::new(Mutex::new(FakeApp {
				locators: Locators::default(),
				contacts: Vec::new(),
				screens: vec![Screen::Home],
				draft: String::new(),
				scroll_offset: 0,
				options_tapped: false,
				sections_query_supported: true,
				generation: 0,
				session_open: false,
				pending_create_failures: 0,
				faults: VecDeque::new(),
				log: Log::default(),
			})),
		}
	}

	/// An app holding `contacts`, grouped into sections by initial.
	pub fn with_contacts(contacts: impl IntoIterator<Item = FakeContact>) -> Self {
		let device = Self::new();
		{
			let mut app = device.app.lock();
			app.contacts = contacts.into_iter().collect();
			app.contacts.sort_by_key(|c| {
				let s = c.section();
				(s == '#', s)
			});
		}
		device
	}

	/// Makes the direct section query fail as an invalid selector.
	pub fn without_section_query(self) -> Self {
		self.app.lock().sections_query_supported = false;
		self
	}

	/// Opens the contact list as if bootstrap had already run.
	pub fn on_contact_list(self) -> Self {
		self.app.lock().screens = vec![Screen::Home, Screen::ChatList, Screen::ContactList];
		self
	}

	/// Queues `fault` for the next `op`.
	pub fn inject(&self, op: FakeOp, fault: Fault) {
		self.app.lock().faults.push_back((op, fault));
	}

	/// The next `count` session creations fail with a backend failure.
	pub fn fail_session_creation(&self, count: u32) {
		self.app.lock().pending_create_failures = count;
	}

	/// Kills the live session as if the server restarted.
	pub fn drop_session(&self) {
		self.app.lock().session_open = false;
	}

	pub fn screen_name(&self) -> String {
		self.app.lock().top().to_string()
	}

	pub fn contacts(&self) -> Vec<String> {
		self.app.lock().contacts.iter().map(|c| c.name.clone()).collect()
	}

	/// `(contact, message)` pairs in send order.
	pub fn sent(&self) -> Vec<(String, String)> {
		self.app.lock().log.sent.clone()
	}

	pub fn removed(&self) -> Vec<String> {
		self.app.lock().log.removed.clone()
	}

	/// Contacts whose rows were clicked, in order.
	pub fn opened(&self) -> Vec<String> {
		self.app.lock().log.opened.clone()
	}

	/// Contacts whose profile was opened, which only the removal flow does.
	pub fn profiles_opened(&self) -> Vec<String> {
		self.app.lock().log.profiles.clone()
	}

	pub fn swipes(&self) -> Vec<Swipe> {
		self.app.lock().log.swipes.clone()
	}

	pub fn scroll_offset(&self) -> i32 {
		self.app.lock().scroll_offset
	}

	pub fn back_presses(&self) -> u32 {
		self.app.lock().log.back_presses
	}

	/// Successful session creations.
	pub fn sessions_created(&self) -> u32 {
		self.app.lock().log.sessions_created
	}

	fn with<T>(&self, f: impl FnOnce(&mut FakeApp) -> T) -> T {
		f(&mut *self.app.lock())
	}
}

/// One session against a [`FakeDevice`].
///
/// Becomes a broken session (every call fails with a backend failure) once a
/// newer session is created or it is closed.
pub struct FakeSession {
	device: FakeDevice,
	generation: u64,
	id: String,
}

impl Backend for FakeSession {
	fn session_id(&self) -> &str {
		&self.id
	}

	fn find<'a>(&'a self, locator: &'a Locator) -> BoxFuture<'a, BackendResult<ElementRef>> {
		Box::pin(ready(self.device.with(|app| app.find(self.generation, locator))))
	}

	fn find_all<'a>(&'a self, locator: &'a Locator) -> BoxFuture<'a, BackendResult<Vec<ElementRef>>> {
		Box::pin(ready(self.device.with(|app| app.find_all(self.generation, locator))))
	}

	fn find_in<'a>(&'a self, parent: &'a ElementRef, locator: &'a Locator) -> BoxFuture<'a, BackendResult<ElementRef>> {
		Box::pin(ready(self.device.with(|app| app.find_in(self.generation, parent, locator))))
	}

	fn find_all_in<'a>(
		&'a self,
		parent: &'a ElementRef,
		locator: &'a Locator,
	) -> BoxFuture<'a, BackendResult<Vec<ElementRef>>> {
		Box::pin(ready(self.device.with(|app| app.find_all_in(self.generation, parent, locator))))
	}

	fn click<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, BackendResult<()>> {
		Box::pin(ready(self.device.with(|app| app.click(self.generation, element))))
	}

	fn set_text<'a>(&'a self, element: &'a ElementRef, text: &'a str) -> BoxFuture<'a, BackendResult<()>> {
		Box::pin(ready(self.device.with(|app| app.set_text(self.generation, element, text))))
	}

	fn text<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, BackendResult<String>> {
		Box::pin(ready(self.device.with(|app| app.text(self.generation, element))))
	}

	fn attribute<'a>(&'a self, element: &'a ElementRef, name: &'a str) -> BoxFuture<'a, BackendResult<Option<String>>> {
		Box::pin(ready(self.device.with(|app| app.attribute(self.generation, element, name))))
	}

	fn is_displayed<'a>(&'a self, element: &'a ElementRef) -> BoxFuture<'a, BackendResult<bool>> {
		Box::pin(ready(self.device.with(|app| {
			app.check(self.generation, FakeOp::IsDisplayed)?;
			app.node(self.generation, element).map(|_| true)
		})))
	}

	fn press_confirm(&self) -> BoxFuture<'_, BackendResult<()>> {
		Box::pin(ready(self.device.with(|app| {
			app.check(self.generation, FakeOp::PressConfirm)?;
			if let Screen::Chat(name) = app.top().clone() {
				if !app.draft.is_empty() {
					let message = std::mem::take(&mut app.draft);
					app.log.sent.push((name, message));
				}
			}
			Ok(())
		})))
	}

	fn dismiss_keyboard(&self) -> BoxFuture<'_, BackendResult<()>> {
		Box::pin(ready(self.device.with(|app| app.check(self.generation, FakeOp::DismissKeyboard))))
	}

	fn navigate_back(&self) -> BoxFuture<'_, BackendResult<()>> {
		Box::pin(ready(self.device.with(|app| {
			app.check(self.generation, FakeOp::NavigateBack)?;
			app.log.back_presses += 1;
			if app.screens.len() > 1 {
				app.screens.pop();
			}
			Ok(())
		})))
	}

	fn swipe(&self, swipe: Swipe) -> BoxFuture<'_, BackendResult<()>> {
		Box::pin(ready(self.device.with(|app| {
			app.check(self.generation, FakeOp::Swipe)?;
			app.scroll_offset = (app.scroll_offset + swipe.start_y - swipe.end_y).max(0);
			app.log.swipes.push(swipe);
			Ok(())
		})))
	}

	fn window_size(&self) -> BoxFuture<'_, BackendResult<WindowSize>> {
		Box::pin(ready(self.device.with(|app| {
			app.check(self.generation, FakeOp::WindowSize)?;
			Ok(WINDOW)
		})))
	}

	fn close(&self) -> BoxFuture<'_, BackendResult<()>> {
		Box::pin(ready(self.device.with(|app| {
			if app.generation == self.generation {
				app.session_open = false;
			}
			Ok(())
		})))
	}
}

/// Creates [`FakeSession`]s on one device.
#[derive(Debug, Clone)]
pub struct FakeFactory {
	device: FakeDevice,
}

impl FakeFactory {
	pub fn new(device: FakeDevice) -> Self {
		Self { device }
	}
}

impl SessionFactory for FakeFactory {
	fn create(&self) -> BoxFuture<'_, BackendResult<Arc<dyn Backend>>> {
		let created = self.device.with(|app| {
			if app.pending_create_failures > 0 {
				app.pending_create_failures -= 1;
				return Err(BackendError::BackendFailure("could not start session".into()));
			}
			app.generation += 1;
			app.session_open = true;
			app.log.sessions_created += 1;
			Ok(app.generation)
		});
		let device = self.device.clone();
		Box::pin(ready(created.map(|generation| {
			Arc::new(FakeSession {
				device,
				generation,
				id: format!("fake-{generation}"),
			}) as Arc<dyn Backend>
		})))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn contacts_are_grouped_by_initial_with_symbols_last() {
		let device = FakeDevice::with_contacts([
			FakeContact::connected("zed"),
			FakeContact::connected("9lives"),
			FakeContact::connected("Amy"),
			FakeContact::connected("Zoe"),
		]);
		assert_eq!(device.contacts(), ["Amy", "zed", "Zoe", "9lives"]);
		assert_eq!(device.app.lock().sections(), ['A', 'Z', '#']);
	}

	#[test]
	fn element_ids_round_trip() {
		let node = Node::Row("Mo:Ali".into());
		let element = node.element(4);
		assert_eq!(Node::parse(element.id()), Some((4, node)));
	}

	#[tokio::test]
	async fn stale_after_leaving_the_list() {
		let device = FakeDevice::with_contacts([FakeContact::connected("Amy")]).on_contact_list();
		let factory = FakeFactory::new(device.clone());
		let session = factory.create().await.unwrap();
		let locators = Locators::default();

		let names = session.find_all(&locators.contact_name).await.unwrap();
		session.click(&names[0]).await.unwrap();
		assert_eq!(device.screen_name(), "preview:Amy");

		let err = session.text(&names[0]).await.unwrap_err();
		assert!(err.is_stale());
	}

	#[tokio::test]
	async fn superseded_session_is_broken() {
		let device = FakeDevice::new();
		let factory = FakeFactory::new(device.clone());
		let old = factory.create().await.unwrap();
		let _new = factory.create().await.unwrap();

		let err = old.navigate_back().await.unwrap_err();
		assert!(err.is_backend_failure());
	}
}
