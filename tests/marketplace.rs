use droshky::api::{IdentityApi, OfferApi, OrderApi, PartyKind, VerificationApi};
use droshky::db::DbPool;
use droshky::engine::Engine;
use droshky::entities::{
    Category, DocumentStatus, Driver, NegotiationStatus, OfferStatus, OrderStatus, Vehicle,
};

async fn engine() -> Engine {
    let DbPool(pool) = DbPool::new("sqlite::memory:", 1).await.expect("connect");

    Engine::new(pool).await.expect("schema bootstrap")
}

fn vehicle() -> Vehicle {
    Vehicle {
        model: "Lada Vesta".into(),
        color: "white".into(),
        plate: "AB123CD".into(),
    }
}

async fn register_verified_driver(engine: &Engine, handle: &str) -> Driver {
    let driver = engine
        .register_driver(handle.into(), "Boris".into(), "+100".into(), vehicle())
        .await
        .expect("register driver")
        .profile;

    for category in Category::REQUIRED {
        let document = engine
            .submit_document(handle.into(), category, "scan".into())
            .await
            .expect("submit document");

        engine
            .adjudicate_document(document.id, true, None)
            .await
            .expect("approve document");
    }

    driver
}

#[tokio::test]
async fn registration_is_idempotent_per_handle() {
    let engine = engine().await;

    let first = engine
        .register_passenger("tg:100".into(), "Anna".into(), "+371".into())
        .await
        .expect("first registration");
    assert!(!first.returning);

    let second = engine
        .register_passenger("tg:100".into(), "Someone Else".into(), "+000".into())
        .await
        .expect("repeat registration");

    assert!(second.returning);
    assert_eq!(second.profile.id, first.profile.id);
    assert_eq!(second.profile.name, "Anna");
    assert_eq!(second.profile.phone, "+371");

    let driver = engine
        .register_driver("tg:200".into(), "Boris".into(), "+100".into(), vehicle())
        .await
        .expect("register driver");
    assert!(!driver.returning);
    assert!(!driver.profile.verified);
    assert_eq!(driver.profile.rating.to_string(), "5.00");

    let again = engine
        .register_driver("tg:200".into(), "B".into(), "+1".into(), vehicle())
        .await
        .expect("repeat driver registration");
    assert!(again.returning);
    assert_eq!(again.profile.name, "Boris");
}

#[tokio::test]
async fn classify_party_reflects_registry() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p".into(), "Anna".into(), "+371".into())
        .await
        .expect("register passenger");
    engine
        .register_driver("tg:d".into(), "Boris".into(), "+100".into(), vehicle())
        .await
        .expect("register driver");
    engine
        .register_passenger("tg:both".into(), "Vera".into(), "+1".into())
        .await
        .expect("register passenger side");
    engine
        .register_driver("tg:both".into(), "Vera".into(), "+1".into(), vehicle())
        .await
        .expect("register driver side");

    assert_eq!(engine.classify_party("tg:p".into()).await.unwrap(), PartyKind::Passenger);
    assert_eq!(engine.classify_party("tg:d".into()).await.unwrap(), PartyKind::Driver);
    assert_eq!(engine.classify_party("tg:both".into()).await.unwrap(), PartyKind::Ambiguous);
    assert_eq!(engine.classify_party("tg:none".into()).await.unwrap(), PartyKind::Unknown);
}

#[tokio::test]
async fn adjudication_drives_verified_flag() {
    let engine = engine().await;

    engine
        .register_driver("tg:d1".into(), "Boris".into(), "+100".into(), vehicle())
        .await
        .expect("register driver");

    let license = engine
        .submit_document("tg:d1".into(), Category::License, "license scan".into())
        .await
        .expect("submit license");
    let registration = engine
        .submit_document("tg:d1".into(), Category::VehicleRegistration, "reg scan".into())
        .await
        .expect("submit registration");

    let status = engine.verification_status("tg:d1".into()).await.unwrap();
    assert!(!status.verified);
    assert_eq!(status.documents.len(), 2);

    engine.adjudicate_document(license.id, true, None).await.unwrap();
    let status = engine.verification_status("tg:d1".into()).await.unwrap();
    assert!(!status.verified);

    engine.adjudicate_document(registration.id, true, None).await.unwrap();
    let status = engine.verification_status("tg:d1".into()).await.unwrap();
    assert!(status.verified);

    // insurance never gates verification
    engine
        .submit_document("tg:d1".into(), Category::Insurance, "policy".into())
        .await
        .unwrap();
    assert!(engine.verification_status("tg:d1".into()).await.unwrap().verified);

    // re-adjudication can flip a verified driver back
    let rejected = engine
        .adjudicate_document(license.id, false, Some("illegible".into()))
        .await
        .unwrap();
    assert_eq!(rejected.status, DocumentStatus::Rejected);

    let status = engine.verification_status("tg:d1".into()).await.unwrap();
    assert!(!status.verified);
    let standing = status
        .documents
        .iter()
        .find(|doc| doc.category == Category::License)
        .expect("license standing");
    assert_eq!(standing.reason.as_deref(), Some("illegible"));
}

#[tokio::test]
async fn resubmission_supersedes_in_place() {
    let engine = engine().await;

    engine
        .register_driver("tg:d2".into(), "Boris".into(), "+100".into(), vehicle())
        .await
        .expect("register driver");

    let first = engine
        .submit_document("tg:d2".into(), Category::License, "blurry scan".into())
        .await
        .unwrap();
    engine
        .adjudicate_document(first.id, false, Some("illegible".into()))
        .await
        .unwrap();

    let second = engine
        .submit_document("tg:d2".into(), Category::License, "sharp scan".into())
        .await
        .unwrap();

    // same row, fresh payload, back to pending, reason gone
    assert_eq!(second.id, first.id);
    assert_eq!(second.payload, "sharp scan");
    assert_eq!(second.status, DocumentStatus::Pending);
    assert_eq!(second.reason, None);

    let status = engine.verification_status("tg:d2".into()).await.unwrap();
    assert_eq!(
        status.documents.iter().filter(|doc| doc.category == Category::License).count(),
        1
    );
}

#[tokio::test]
async fn resubmitting_approved_document_revokes_verification() {
    let engine = engine().await;

    register_verified_driver(&engine, "tg:d3").await;
    assert!(engine.verification_status("tg:d3".into()).await.unwrap().verified);

    engine
        .submit_document("tg:d3".into(), Category::License, "renewed license".into())
        .await
        .unwrap();

    assert!(!engine.verification_status("tg:d3".into()).await.unwrap().verified);
}

#[tokio::test]
async fn unverified_driver_cannot_offer() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p1".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();
    engine
        .register_driver("tg:d4".into(), "Boris".into(), "+100".into(), vehicle())
        .await
        .unwrap();

    let order = engine
        .create_order("tg:p1".into(), "Old Town".into(), "Airport".into(), 500)
        .await
        .unwrap();

    let error = engine
        .make_offer("tg:d4".into(), order.id, 600, None)
        .await
        .expect_err("unverified driver");
    assert!(error.is_policy_denied());

    assert!(engine.list_offers(order.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_offer_is_rejected() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p2".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();
    register_verified_driver(&engine, "tg:d5").await;

    let order = engine
        .create_order("tg:p2".into(), "Old Town".into(), "Airport".into(), 500)
        .await
        .unwrap();

    engine
        .make_offer("tg:d5".into(), order.id, 600, Some("comfort class".into()))
        .await
        .expect("first offer");

    let error = engine
        .make_offer("tg:d5".into(), order.id, 550, None)
        .await
        .expect_err("second offer from same driver");
    assert!(error.is_conflict());

    assert_eq!(engine.list_offers(order.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn acceptance_finalizes_price_and_driver() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p3".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();
    let d1 = register_verified_driver(&engine, "tg:d6").await;
    let d2 = register_verified_driver(&engine, "tg:d7").await;

    let order = engine
        .create_order("tg:p3".into(), "Old Town".into(), "Airport".into(), 500)
        .await
        .unwrap();

    let first = engine.make_offer("tg:d6".into(), order.id, 600, None).await.unwrap();
    let second = engine.make_offer("tg:d7".into(), order.id, 550, None).await.unwrap();

    let accepted = engine.accept_offer(second.id, order.id).await.unwrap();

    assert_eq!(accepted.status, OrderStatus::Accepted);
    assert_eq!(accepted.final_price, Some(550));
    assert_eq!(accepted.accepted_driver_id, Some(d2.id));
    assert_ne!(accepted.accepted_driver_id, Some(d1.id));

    // the losing offer is left pending, not cascaded
    let offers = engine.list_offers(order.id).await.unwrap();
    let losing = offers.iter().find(|view| view.offer.id == first.id).unwrap();
    assert_eq!(losing.offer.status, OfferStatus::Pending);

    // a later acceptance on the same order loses
    let error = engine
        .accept_offer(first.id, order.id)
        .await
        .expect_err("order already taken");
    assert!(error.is_conflict());

    // exactly one accepted driver survives
    let offers = engine.list_offers(order.id).await.unwrap();
    let accepted_count = offers
        .iter()
        .filter(|view| view.offer.status == OfferStatus::Accepted)
        .count();
    assert_eq!(accepted_count, 1);
}

#[tokio::test]
async fn available_orders_are_newest_first_with_passenger_profile() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p4".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();

    let older = engine
        .create_order("tg:p4".into(), "Centre".into(), "Harbour".into(), 300)
        .await
        .unwrap();
    let newer = engine
        .create_order("tg:p4".into(), "Harbour".into(), "Centre".into(), 350)
        .await
        .unwrap();

    let listing = engine.list_available_orders().await.unwrap();

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].order.id, newer.id);
    assert_eq!(listing[1].order.id, older.id);
    assert_eq!(listing[0].passenger_name, "Anna");
    assert_eq!(listing[0].passenger_rating.to_string(), "5.00");

    // accepted orders drop out of the listing
    let driver = register_verified_driver(&engine, "tg:d8").await;
    let offer = engine.make_offer("tg:d8".into(), newer.id, 350, None).await.unwrap();
    engine.accept_offer(offer.id, newer.id).await.unwrap();
    assert_eq!(driver.handle, "tg:d8");

    let listing = engine.list_available_orders().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].order.id, older.id);
}

#[tokio::test]
async fn ride_lifecycle_guards_out_of_order_transitions() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p5".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();
    register_verified_driver(&engine, "tg:d9").await;

    let order = engine
        .create_order("tg:p5".into(), "Old Town".into(), "Airport".into(), 500)
        .await
        .unwrap();

    assert!(engine.start_ride(order.id).await.expect_err("not accepted").is_conflict());

    let offer = engine.make_offer("tg:d9".into(), order.id, 500, None).await.unwrap();
    engine.accept_offer(offer.id, order.id).await.unwrap();

    assert!(engine.complete_ride(order.id).await.expect_err("not started").is_conflict());

    engine.start_ride(order.id).await.unwrap();
    let completed = engine.complete_ride(order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    assert!(engine.cancel_order(order.id).await.expect_err("already closed").is_conflict());
}

#[tokio::test]
async fn cancellation_closes_open_orders() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p6".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();

    let order = engine
        .create_order("tg:p6".into(), "Old Town".into(), "Airport".into(), 500)
        .await
        .unwrap();

    let cancelled = engine.cancel_order(order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    assert!(engine.list_available_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn negotiation_chain_is_append_only() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p7".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();
    let driver = register_verified_driver(&engine, "tg:d10").await;

    let order = engine
        .create_order("tg:p7".into(), "Old Town".into(), "Airport".into(), 500)
        .await
        .unwrap();
    engine.make_offer("tg:d10".into(), order.id, 600, None).await.unwrap();

    let opening = engine
        .make_counter_offer(order.id, "tg:p7".into(), driver.id, 450)
        .await
        .expect("passenger counter-offer");
    assert_eq!(opening.price, 450);
    assert_eq!(opening.status, NegotiationStatus::Pending);

    let reply = engine
        .respond_to_counter_offer("tg:d10".into(), opening.id, false, Some(470))
        .await
        .expect("driver counters back");

    // the reply is a new node in the reverse direction
    assert_ne!(reply.id, opening.id);
    assert_eq!(reply.price, 470);
    assert_eq!(reply.from_user_id, driver.id);
    assert_eq!(reply.to_user_id, opening.from_user_id);
    assert_eq!(reply.status, NegotiationStatus::Pending);

    // the original node is untouched by the counter
    let accepted = engine
        .respond_to_counter_offer("tg:d10".into(), opening.id, true, None)
        .await
        .expect("original still pending");
    assert_eq!(accepted.status, NegotiationStatus::Accepted);
}

#[tokio::test]
async fn negotiation_responses_are_guarded() {
    let engine = engine().await;

    engine
        .register_passenger("tg:p8".into(), "Anna".into(), "+371".into())
        .await
        .unwrap();
    let addressee = register_verified_driver(&engine, "tg:d11").await;
    register_verified_driver(&engine, "tg:d12").await;

    let order = engine
        .create_order("tg:p8".into(), "Old Town".into(), "Airport".into(), 500)
        .await
        .unwrap();

    let negotiation = engine
        .make_counter_offer(order.id, "tg:p8".into(), addressee.id, 450)
        .await
        .unwrap();

    // only the addressed driver may respond
    let error = engine
        .respond_to_counter_offer("tg:d12".into(), negotiation.id, true, None)
        .await
        .expect_err("wrong driver");
    assert!(error.is_policy_denied());

    let rejected = engine
        .respond_to_counter_offer("tg:d11".into(), negotiation.id, false, None)
        .await
        .unwrap();
    assert_eq!(rejected.status, NegotiationStatus::Rejected);

    // resolved nodes are immutable
    let error = engine
        .respond_to_counter_offer("tg:d11".into(), negotiation.id, true, None)
        .await
        .expect_err("already resolved");
    assert!(error.is_conflict());
}

#[tokio::test]
async fn unknown_references_fail_not_found() {
    let engine = engine().await;

    let error = engine
        .create_order("tg:nobody".into(), "A".into(), "B".into(), 100)
        .await
        .expect_err("unregistered passenger");
    assert!(error.is_not_found());

    register_verified_driver(&engine, "tg:d13").await;
    let error = engine
        .make_offer("tg:d13".into(), uuid::Uuid::new_v4(), 100, None)
        .await
        .expect_err("missing order");
    assert!(error.is_not_found());

    let error = engine
        .accept_offer(uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
        .await
        .expect_err("missing offer");
    assert!(error.is_not_found());

    let error = engine
        .respond_to_counter_offer("tg:d13".into(), uuid::Uuid::new_v4(), true, None)
        .await
        .expect_err("missing negotiation");
    assert!(error.is_not_found());

    let error = engine
        .submit_document("tg:nobody".into(), Category::License, "scan".into())
        .await
        .expect_err("unregistered driver");
    assert!(error.is_not_found());
}

#[tokio::test]
async fn driver_availability_toggle_round_trips() {
    let engine = engine().await;

    register_verified_driver(&engine, "tg:d14").await;

    let online = engine
        .set_driver_availability("tg:d14".into(), true)
        .await
        .expect("go online");
    assert!(online.online);

    let offline = engine
        .set_driver_availability("tg:d14".into(), false)
        .await
        .expect("go offline");
    assert!(!offline.online);
}
