//! End-to-end traversal runs against the in-memory device.

use std::sync::Arc;

use rollcall::testing::{FakeContact, FakeDevice, FakeFactory, FakeOp, Fault};
use rollcall::{EngineConfig, Error, Outcome, PolicyConfig, Traversal};

fn policy(removal_enabled: bool) -> PolicyConfig {
	PolicyConfig {
		messages_to_send: vec!["hey".into()],
		removal_enabled,
		..PolicyConfig::default()
	}
}

async fn traversal(device: &FakeDevice, policy: PolicyConfig) -> Traversal {
	let factory = Arc::new(FakeFactory::new(device.clone()));
	Traversal::connect(factory, EngineConfig::immediate().with_policy(policy))
		.await
		.unwrap()
}

fn sent_to(device: &FakeDevice) -> Vec<String> {
	device.sent().into_iter().map(|(name, _)| name).collect()
}

#[tokio::test]
async fn bootstrap_then_full_run() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy"), FakeContact::stranger("Bo")]);
	let mut traversal = traversal(&device, policy(false)).await;

	traversal.bootstrap().await.unwrap();
	let report = traversal.run().await.unwrap();
	traversal.close().await.unwrap();

	assert_eq!(report.sections, 2);
	assert_eq!(report.names(Outcome::MessageSent), ["Amy"]);
	assert_eq!(report.names(Outcome::SkippedByPolicy), ["Bo"]);
	assert_eq!(device.sent(), [("Amy".to_string(), "hey".to_string())]);
	assert_eq!(device.screen_name(), "contact list");
}

#[tokio::test]
async fn removal_disabled_never_opens_a_profile() {
	let device = FakeDevice::with_contacts([
		FakeContact::stranger("Amy"),
		FakeContact::stranger("Bo"),
		FakeContact::connected("Cy"),
	])
	.on_contact_list();
	let mut traversal = traversal(&device, policy(false)).await;

	let report = traversal.run().await.unwrap();

	assert!(device.profiles_opened().is_empty());
	assert!(device.removed().is_empty());
	assert_eq!(report.count(Outcome::Removed), 0);
	assert_eq!(sent_to(&device), ["Cy"]);
}

#[tokio::test]
async fn strangers_are_removed_and_friends_messaged() {
	let device = FakeDevice::with_contacts([
		FakeContact::stranger("Amy"),
		FakeContact::stranger("Ann"),
		FakeContact::connected("Ava"),
		FakeContact::connected("Ben"),
		FakeContact::stranger("Bud"),
	])
	.on_contact_list();
	let mut traversal = traversal(&device, policy(true)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(device.removed(), ["Amy", "Ann", "Bud"]);
	assert_eq!(sent_to(&device), ["Ava", "Ben"]);
	assert_eq!(device.contacts(), ["Ava", "Ben"]);
	assert_eq!(report.count(Outcome::Removed), 3);
	assert_eq!(report.count(Outcome::MessageSent), 2);
	// rewound visits reuse the same index
	let amy_and_ann: Vec<_> = report.contacts.iter().take(3).map(|r| (r.section, r.index)).collect();
	assert_eq!(amy_and_ann, [(0, 0), (0, 0), (0, 0)]);
}

#[tokio::test]
async fn exempt_strangers_are_kept() {
	let device = FakeDevice::with_contacts([FakeContact::stranger("Team Snapchat"), FakeContact::stranger("Tom")])
		.on_contact_list();
	let mut traversal = traversal(
		&device,
		PolicyConfig {
			exempt_from_removal_if_name_contains: vec!["team".into()],
			..policy(true)
		},
	)
	.await;

	let report = traversal.run().await.unwrap();

	assert_eq!(device.removed(), ["Tom"]);
	assert_eq!(report.names(Outcome::SkippedByPolicy), ["Team Snapchat"]);
}

#[tokio::test]
async fn allow_list_limits_who_is_messaged() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Brooke"), FakeContact::connected("Okafor")])
		.on_contact_list();
	let mut traversal = traversal(
		&device,
		PolicyConfig {
			allow_send_only_if_name_contains: vec!["ok".into()],
			..policy(false)
		},
	)
	.await;

	let report = traversal.run().await.unwrap();

	assert_eq!(sent_to(&device), ["Okafor"]);
	assert_eq!(device.opened(), ["Okafor"]);
	assert_eq!(report.names(Outcome::SkippedByPolicy), ["Brooke"]);
}

#[tokio::test]
async fn allow_list_with_removal_still_opens_everyone() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Brooke"), FakeContact::connected("Okafor")])
		.on_contact_list();
	let mut traversal = traversal(
		&device,
		PolicyConfig {
			allow_send_only_if_name_contains: vec!["ok".into()],
			..policy(true)
		},
	)
	.await;

	traversal.run().await.unwrap();

	assert_eq!(device.opened(), ["Brooke", "Okafor"]);
	assert_eq!(sent_to(&device), ["Okafor"]);
	assert!(device.removed().is_empty());
}

#[tokio::test]
async fn empty_list_completes_without_contact_operations() {
	let device = FakeDevice::new().on_contact_list();
	let mut traversal = traversal(&device, policy(true)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(report.sections, 0);
	assert!(report.contacts.is_empty());
	assert!(device.opened().is_empty());
	assert!(device.sent().is_empty());
	assert_eq!(traversal.phase(), rollcall::Phase::Done);
}

#[tokio::test]
async fn removal_without_effect_does_not_loop() {
	let device = FakeDevice::with_contacts([FakeContact::stranger("Amy").surviving_removal(), FakeContact::connected("Ava")])
		.on_contact_list();
	let mut traversal = traversal(&device, policy(true)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(device.profiles_opened(), ["Amy"]);
	assert_eq!(sent_to(&device), ["Ava"]);
	let visits: Vec<_> = report
		.contacts
		.iter()
		.map(|r| (r.index, r.name.as_deref(), r.outcome))
		.collect();
	assert_eq!(
		visits,
		[
			(0, Some("Amy"), Outcome::Removed),
			(0, Some("Amy"), Outcome::SkippedUnresolvable),
			(1, Some("Ava"), Outcome::MessageSent),
		]
	);
}

#[tokio::test]
async fn fallback_section_scan_gives_the_same_run() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy"), FakeContact::connected("Bo")])
		.without_section_query()
		.on_contact_list();
	let mut traversal = traversal(&device, policy(false)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(report.sections, 2);
	assert_eq!(sent_to(&device), ["Amy", "Bo"]);
}

#[tokio::test]
async fn contacts_in_band_need_no_scrolling() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy"), FakeContact::connected("Bo")])
		.on_contact_list();
	let mut traversal = traversal(&device, policy(false)).await;

	traversal.run().await.unwrap();

	assert!(device.swipes().is_empty());
}

#[tokio::test]
async fn backend_failure_mid_run_is_repaired() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy"), FakeContact::connected("Bo")])
		.on_contact_list();
	device.inject(FakeOp::PressConfirm, Fault::Backend);
	let mut traversal = traversal(&device, policy(false)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(report.session_repairs, 1);
	assert_eq!(device.sessions_created(), 2);
	assert_eq!(sent_to(&device), ["Amy", "Bo"]);
}

#[tokio::test]
async fn exhausted_repair_stops_the_run_and_close_still_works() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy"), FakeContact::connected("Bo")])
		.on_contact_list();
	let mut traversal = traversal(&device, policy(false)).await;
	device.inject(FakeOp::Click, Fault::Backend);
	device.fail_session_creation(2);

	let err = traversal.run().await.unwrap_err();

	assert!(matches!(err, Error::GuardianExhausted { attempts: 2, .. }), "{err:?}");
	assert!(device.sent().is_empty());
	traversal.close().await.unwrap();
}

#[tokio::test]
async fn unreadable_name_is_skipped() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy"), FakeContact::connected("Ann")])
		.on_contact_list();
	device.inject(FakeOp::Text, Fault::Rejected);
	let mut traversal = traversal(&device, policy(false)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(report.contacts[0].name, None);
	assert_eq!(report.contacts[0].outcome, Outcome::SkippedUnresolvable);
	assert_eq!(sent_to(&device), ["Ann"]);
}

#[tokio::test]
async fn failed_open_recovers_and_moves_on() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy"), FakeContact::connected("Ann")])
		.on_contact_list();
	for _ in 0..3 {
		device.inject(FakeOp::Click, Fault::Intercepted);
	}
	let mut traversal = traversal(&device, policy(false)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(report.contacts[0].outcome, Outcome::SkippedUnresolvable);
	assert_eq!(report.contacts[0].name.as_deref(), Some("Amy"));
	assert_eq!(sent_to(&device), ["Ann"]);
}

#[tokio::test]
async fn stale_reads_are_absorbed() {
	let device = FakeDevice::with_contacts([FakeContact::connected("Amy")]).on_contact_list();
	device.inject(FakeOp::Text, Fault::Stale);
	device.inject(FakeOp::FindAllIn, Fault::Stale);
	let mut traversal = traversal(&device, policy(false)).await;

	let report = traversal.run().await.unwrap();

	assert_eq!(report.session_repairs, 0);
	assert_eq!(sent_to(&device), ["Amy"]);
}
