use chrono::DateTime;
use parcel_core::db::open_db_in_memory;
use parcel_core::{ParcelService, ParcelStatus, ParcelStore, RepoError, SqliteParcelStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn register_stores_registered_parcel_with_current_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let service = ParcelService::new(&store);

    let registered = service.register(5, "Pine st 9").unwrap();
    assert!(registered.number > 0);
    assert_eq!(registered.status, ParcelStatus::Registered);
    assert!(registered.created_at.ends_with('Z'));
    DateTime::parse_from_rfc3339(&registered.created_at).unwrap();

    assert_eq!(store.get(registered.number).unwrap(), registered);
}

#[test]
fn next_status_walks_lifecycle_and_stops_at_delivered() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let service = ParcelService::new(&store);

    let number = service.register(5, "Pine st 9").unwrap().number;

    assert_eq!(service.next_status(number).unwrap(), Some(ParcelStatus::Sent));
    assert_eq!(
        service.next_status(number).unwrap(),
        Some(ParcelStatus::Delivered)
    );
    assert_eq!(service.next_status(number).unwrap(), None);
    assert_eq!(store.get(number).unwrap().status, ParcelStatus::Delivered);
}

#[test]
fn next_status_for_missing_parcel_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());

    let err = service.next_status(77).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(77)));
}

#[test]
fn change_address_and_delete_respect_registered_guard() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let service = ParcelService::new(&store);

    let editable = service.register(9, "old").unwrap().number;
    service.change_address(editable, "new").unwrap();
    assert_eq!(store.get(editable).unwrap().address, "new");

    let shipped = service.register(9, "fixed").unwrap().number;
    service.next_status(shipped).unwrap();
    service.change_address(shipped, "ignored").unwrap();
    service.delete(shipped).unwrap();
    assert_eq!(store.get(shipped).unwrap().address, "fixed");

    service.delete(editable).unwrap();
    assert!(store.get(editable).unwrap_err().is_not_found());
}

#[test]
fn client_parcels_lists_only_requested_client() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);

    let client = rng.gen_range(1..10_000_000);
    let first = service.register(client, "a").unwrap();
    let second = service.register(client, "b").unwrap();
    service.register(client + 1, "c").unwrap();

    let mut numbers: Vec<_> = service
        .client_parcels(client)
        .unwrap()
        .into_iter()
        .map(|parcel| parcel.number)
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![first.number, second.number]);
}
