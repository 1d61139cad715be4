use chrono::NaiveDate;
use eventsproject_core::db::open_db_in_memory;
use eventsproject_core::{
    Event, EventRepository, Logistics, LogisticsRepository, ModelValidationError, Participant,
    ParticipantRepository, RepoError, Role, SqliteEventRepository, SqliteLogisticsRepository,
    SqliteParticipantRepository,
};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn save_event(conn: &Connection, description: &str, start: NaiveDate) -> Event {
    let repo = SqliteEventRepository::try_new(conn).unwrap();
    repo.save(&Event::new(description, start, start)).unwrap()
}

#[test]
fn participant_save_assigns_id_and_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParticipantRepository::try_new(&conn).unwrap();

    let mut saved = repo
        .save(&Participant::new("Tounsi", "Ahmed", Role::Organizer))
        .unwrap();
    let id = saved.id.unwrap();
    assert!(saved.events.is_empty());

    saved.role = Role::Speaker;
    let updated = repo.save(&saved).unwrap();
    assert_eq!(updated.id, Some(id));

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.role, Role::Speaker);
    assert_eq!(loaded.last_name, "Tounsi");
}

#[test]
fn participant_find_by_unknown_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParticipantRepository::try_new(&conn).unwrap();
    assert!(repo.find_by_id(404).unwrap().is_none());
}

#[test]
fn participant_save_rejects_blank_name_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParticipantRepository::try_new(&conn).unwrap();

    let err = repo
        .save(&Participant::new("", "Ahmed", Role::Guest))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::BlankField("last_name"))
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM participants;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn links_saved_from_either_side_are_visible_from_both() {
    let conn = open_db_in_memory().unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();

    let first = save_event(&conn, "Kickoff", date(2024, 3, 1));
    let second = save_event(&conn, "Retro", date(2024, 3, 8));

    let mut guest = Participant::new("Ben Ali", "Sami", Role::Guest);
    guest.join_event(first.id.unwrap());
    let guest = participants.save(&guest).unwrap();

    let mut second = second;
    second.add_participant(guest.id.unwrap());
    events.save(&second).unwrap();

    let reloaded = participants.find_by_id(guest.id.unwrap()).unwrap().unwrap();
    assert_eq!(
        reloaded.events.iter().copied().collect::<Vec<_>>(),
        vec![first.id.unwrap(), second.id.unwrap()]
    );

    let first_loaded = events.find_by_id(first.id.unwrap()).unwrap().unwrap();
    assert!(first_loaded.participants.contains(&guest.id.unwrap()));
}

#[test]
fn saving_a_side_with_fewer_links_keeps_existing_links() {
    let conn = open_db_in_memory().unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();

    let speaker = participants
        .save(&Participant::new("Trabelsi", "Ines", Role::Speaker))
        .unwrap();
    let mut event = Event::new("Panel", date(2024, 6, 1), date(2024, 6, 2));
    event.add_participant(speaker.id.unwrap());
    let saved = events.save(&event).unwrap();

    let mut stale = saved.clone();
    stale.participants.clear();
    let resaved = events.save(&stale).unwrap();

    assert!(resaved.participants.contains(&speaker.id.unwrap()));
}

#[test]
fn event_save_round_trips_dates_and_cost() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut event = Event::new("Music Festival", date(2024, 7, 10), date(2024, 7, 12));
    event.cost = Decimal::new(123_45, 2);
    let saved = repo.save(&event).unwrap();

    let loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.start_date, date(2024, 7, 10));
    assert_eq!(loaded.end_date, date(2024, 7, 12));
    assert_eq!(loaded.cost, Decimal::new(123_45, 2));
}

#[test]
fn event_description_is_unique() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    repo.save(&Event::new("Tech Conference", date(2024, 1, 1), date(2024, 1, 1)))
        .unwrap();
    let err = repo
        .save(&Event::new("Tech Conference", date(2025, 1, 1), date(2025, 1, 1)))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn find_by_description_is_exact_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let saved = save_event(&conn, "Tech Conference", date(2024, 1, 1));

    let found = repo.find_by_description("Tech Conference").unwrap().unwrap();
    assert_eq!(found.id, saved.id);
    assert!(repo.find_by_description("tech conference").unwrap().is_none());
    assert!(repo.find_by_description("Tech").unwrap().is_none());
}

#[test]
fn find_by_start_date_between_is_inclusive_and_ordered() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let late = save_event(&conn, "Late", date(2024, 12, 31));
    let early = save_event(&conn, "Early", date(2024, 12, 1));
    save_event(&conn, "Before", date(2024, 11, 30));
    save_event(&conn, "After", date(2025, 1, 1));

    let events = repo
        .find_by_start_date_between(date(2024, 12, 1), date(2024, 12, 31))
        .unwrap();
    let ids: Vec<_> = events.iter().map(|event| event.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

#[test]
fn find_by_participant_name_and_role_matches_all_three_fields() {
    let conn = open_db_in_memory().unwrap();
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();

    let organized = save_event(&conn, "Organized", date(2024, 5, 1));
    let attended = save_event(&conn, "Attended", date(2024, 5, 2));

    let mut organizer = Participant::new("Tounsi", "Ahmed", Role::Organizer);
    organizer.join_event(organized.id.unwrap());
    participants.save(&organizer).unwrap();

    let mut namesake = Participant::new("Tounsi", "Ahmed", Role::Guest);
    namesake.join_event(attended.id.unwrap());
    participants.save(&namesake).unwrap();

    let found = events
        .find_by_participant_name_and_role("Tounsi", "Ahmed", Role::Organizer)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, organized.id);

    assert!(events
        .find_by_participant_name_and_role("Ahmed", "Tounsi", Role::Organizer)
        .unwrap()
        .is_empty());
}

#[test]
fn logistics_save_requires_owner_and_loads_under_event() {
    let conn = open_db_in_memory().unwrap();
    let logistics = SqliteLogisticsRepository::try_new(&conn).unwrap();
    let events = SqliteEventRepository::try_new(&conn).unwrap();

    let orphan = Logistics::new("tables", true, Decimal::new(20, 0), 4);
    assert!(matches!(
        logistics.save(&orphan).unwrap_err(),
        RepoError::Validation(ModelValidationError::MissingOwner)
    ));

    let event = save_event(&conn, "Gala", date(2024, 9, 9));
    let mut item = orphan.clone();
    item.event_id = event.id;
    let saved = logistics.save(&item).unwrap();

    let loaded = logistics.find_by_id(saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.unit_price, Decimal::new(20, 0));
    assert_eq!(loaded.quantity, 4);
    assert!(loaded.reserved);

    let event = events.find_by_id(event.id.unwrap()).unwrap().unwrap();
    assert_eq!(event.logistics, vec![loaded]);
}

#[test]
fn deleting_an_event_cascades_to_its_logistics() {
    let conn = open_db_in_memory().unwrap();
    let logistics = SqliteLogisticsRepository::try_new(&conn).unwrap();

    let event = save_event(&conn, "Cancelled", date(2024, 2, 2));
    let mut item = Logistics::new("tent", true, Decimal::new(300, 0), 1);
    item.event_id = event.id;
    let saved = logistics.save(&item).unwrap();

    conn.execute("DELETE FROM events WHERE id = ?1;", [event.id.unwrap()])
        .unwrap();
    assert!(logistics.find_by_id(saved.id.unwrap()).unwrap().is_none());
}

#[test]
fn corrupt_role_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParticipantRepository::try_new(&conn).unwrap();
    let saved = repo
        .save(&Participant::new("Tounsi", "Ahmed", Role::Guest))
        .unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "UPDATE participants SET role = 'HOST' WHERE id = ?1;",
        [saved.id.unwrap()],
    )
    .unwrap();

    let err = repo.find_by_id(saved.id.unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("HOST")));
}
