use newsdeck_core::db::open_store_in_memory;
use newsdeck_core::{
    seed_deck, CardService, Column, ColumnMode, EditingSurface, ServiceError,
    SqliteCardRepository, COLUMN_SPLIT_MARK, DEFAULT_INTRO, WIDE_CARD_ID,
};
use std::io::Write as _;

#[test]
fn load_deck_returns_seed_defaults_for_an_empty_store() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&mut conn).unwrap();
    let service = CardService::new(repo);

    let deck = service.load_deck().unwrap();
    assert_eq!(deck, seed_deck());
    assert_eq!(service.load_intro().unwrap(), DEFAULT_INTRO);
}

#[test]
fn save_then_load_overlays_stored_fields_onto_the_seeds() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&mut conn).unwrap();
    let mut service = CardService::new(repo);

    let mut deck = service.load_deck().unwrap();
    deck[2].title = "Authored title".to_string();
    deck[2].description = "Authored body".to_string();
    service.save_deck(&deck, "authored intro").unwrap();

    let reloaded = service.load_deck().unwrap();
    assert_eq!(reloaded[2].title, "Authored title");
    assert_eq!(reloaded[2].description, "Authored body");
    // Presentation fields always come from the seed table.
    assert_eq!(reloaded[2].lab, seed_deck()[2].lab);
    assert_eq!(service.load_intro().unwrap(), "authored intro");
}

#[test]
fn only_one_editing_session_can_be_active() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&mut conn).unwrap();
    let mut service = CardService::new(repo);
    let deck = service.load_deck().unwrap();

    let session = service.begin_editing(&deck[0]).unwrap();
    assert!(service.is_editing());

    let err = service.begin_editing(&deck[1]).unwrap_err();
    assert!(matches!(err, ServiceError::EditAlreadyActive(id) if id == WIDE_CARD_ID));

    service.cancel_editing(session);
    assert!(!service.is_editing());
    service.begin_editing(&deck[1]).unwrap();
}

#[test]
fn commit_flushes_and_frees_the_session_slot() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&mut conn).unwrap();
    let mut service = CardService::new(repo);
    let mut deck = service.load_deck().unwrap();

    let mut session = service.begin_editing(&deck[0]).unwrap();
    session.toggle_columns();
    session
        .surface_mut(Column::Right)
        .replace_markup("second column");
    assert_eq!(session.mode(), ColumnMode::Split);

    let canonical = service.commit_editing(session).unwrap();
    assert!(canonical.contains(COLUMN_SPLIT_MARK));
    assert!(!service.is_editing());

    deck[0].description = canonical.clone();
    service.save_deck(&deck, DEFAULT_INTRO).unwrap();
    assert_eq!(service.load_deck().unwrap()[0].description, canonical);
}

#[test]
fn a_committed_split_description_restores_on_the_next_session() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&mut conn).unwrap();
    let mut service = CardService::new(repo);
    let mut deck = service.load_deck().unwrap();

    let mut session = service.begin_editing(&deck[0]).unwrap();
    session
        .surface_mut(Column::Left)
        .replace_markup("left body");
    session.notify_input(Column::Left);
    session.toggle_columns();
    session
        .surface_mut(Column::Right)
        .replace_markup("right body");
    deck[0].description = service.commit_editing(session).unwrap();
    service.save_deck(&deck, DEFAULT_INTRO).unwrap();

    let reloaded = service.load_deck().unwrap();
    let next = service.begin_editing(&reloaded[0]).unwrap();
    assert_eq!(next.mode(), ColumnMode::Split);
    assert_eq!(next.draft().left, "left body");
    assert_eq!(next.draft().right, "right body");
}

#[test]
fn export_is_refused_while_editing() {
    struct NoPages;
    impl newsdeck_core::PageRasterizer for NoPages {
        fn page_count(&self) -> usize {
            0
        }
        fn rasterize_page(
            &mut self,
            _index: usize,
        ) -> Result<Vec<u8>, newsdeck_core::RasterizeError> {
            unreachable!("no pages to rasterize")
        }
    }

    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&mut conn).unwrap();
    let mut service = CardService::new(repo);
    let deck = service.load_deck().unwrap();

    let session = service.begin_editing(&deck[0]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = service
        .export_pages(&mut NoPages, dir.path())
        .unwrap_err();
    assert!(matches!(err, ServiceError::ExportDuringEdit));

    service.cancel_editing(session);
    let report = service.export_pages(&mut NoPages, dir.path()).unwrap();
    assert!(report.is_complete());
}

#[test]
fn attach_card_image_embeds_a_data_url() {
    let mut conn = open_store_in_memory().unwrap();
    let repo = SqliteCardRepository::try_new(&mut conn).unwrap();
    let service = CardService::new(repo);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.png");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
    drop(file);

    let mut card = seed_deck().remove(0);
    service.attach_card_image(&mut card, &path).unwrap();
    assert!(card.main_image.starts_with("data:image/png;base64,"));
}

#[test]
fn card_records_serialize_for_host_consumption() {
    let card = seed_deck().remove(0);
    let json = serde_json::to_value(&card).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["lab"], card.lab);
    assert!(json["description"].is_string());
}
