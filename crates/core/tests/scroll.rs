//! Scroll-into-view against the fake list geometry.

use std::sync::Arc;

use rollcall::scroll::{MAX_SWIPE_DISTANCE, scroll_into_view};
use rollcall::testing::{FakeContact, FakeDevice, FakeFactory};
use rollcall::{Locators, ResilientQuery, SafeBand, SectionEnumerator, Timings};

fn long_list() -> FakeDevice {
	FakeDevice::with_contacts((0..15).map(|i| FakeContact::connected(format!("A{i:02}")))).on_contact_list()
}

async fn query_on(device: &FakeDevice) -> ResilientQuery {
	ResilientQuery::connect(Arc::new(FakeFactory::new(device.clone())), Timings::immediate())
		.await
		.unwrap()
}

#[tokio::test]
async fn far_row_is_swiped_into_the_band() {
	let device = long_list();
	let mut query = query_on(&device).await;
	let locators = Locators::default();
	let rows = SectionEnumerator::new()
		.list_contacts(&mut query, &locators, 0)
		.await
		.unwrap()
		.unwrap();
	let target = rows[13].child(&locators.contact_name, 0);

	let in_band = scroll_into_view(&mut query, &target, &locators.bounds_attribute, SafeBand::default())
		.await
		.unwrap();

	assert!(in_band);
	let swipes = device.swipes();
	assert_eq!(swipes.len(), 3);
	assert!(swipes.iter().all(|s| s.start_y - s.end_y == MAX_SWIPE_DISTANCE));
	assert_eq!(device.scroll_offset(), 900);
}

#[tokio::test]
async fn near_row_needs_no_swipe() {
	let device = long_list();
	let mut query = query_on(&device).await;
	let locators = Locators::default();
	let rows = SectionEnumerator::new()
		.list_contacts(&mut query, &locators, 0)
		.await
		.unwrap()
		.unwrap();

	let in_band = scroll_into_view(
		&mut query,
		&rows[0].child(&locators.contact_name, 0),
		&locators.bounds_attribute,
		SafeBand::default(),
	)
	.await
	.unwrap();

	assert!(in_band);
	assert!(device.swipes().is_empty());
}
