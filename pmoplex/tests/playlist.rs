use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use percent_encoding::percent_decode_str;
use pmoplex::{
    KindTag, LibraryItem, MediaContainer, MediaItem, Method, Playlist, PlaylistEdit, PlaylistItem,
    PlexError, PlexObject, PlexServer, RawRecord, Result, library,
};

/// Serveur en mémoire : enregistre les requêtes et rejoue des réponses préparées
#[derive(Default)]
struct RecordingServer {
    calls: Mutex<Vec<(Method, String)>>,
    responses: Mutex<VecDeque<MediaContainer>>,
}

impl RecordingServer {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn respond(&self, children: Vec<RawRecord>) {
        self.responses.lock().unwrap().push_back(MediaContainer {
            attributes: RawRecord::new("MediaContainer"),
            children,
        });
    }

    fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlexServer for RecordingServer {
    fn query(&self, path: &str, method: Method) -> Result<MediaContainer> {
        self.calls.lock().unwrap().push((method, path.to_string()));
        Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Élément minimal dont la catégorie est imposée
struct Tagged {
    kind: &'static str,
    rating_key: u64,
    item_id: u64,
}

impl PlaylistItem for Tagged {
    fn kind(&self) -> KindTag {
        KindTag::from(self.kind)
    }

    fn rating_key(&self) -> Option<u64> {
        Some(self.rating_key)
    }

    fn playlist_item_id(&self) -> Option<u64> {
        Some(self.item_id)
    }

    fn section_uuid(&self, _server: &dyn PlexServer) -> Result<String> {
        Ok("0123-abcd".to_string())
    }
}

fn tagged(kind: &'static str, rating_key: u64) -> Tagged {
    Tagged {
        kind,
        rating_key,
        item_id: rating_key + 100,
    }
}

fn playlist_record(playlist_type: &str) -> RawRecord {
    RawRecord::new("Playlist")
        .with("ratingKey", "3")
        .with("key", "/library/playlists/3/items")
        .with("type", "playlist")
        .with("title", "Soirée")
        .with("summary", "")
        .with("playlistType", playlist_type)
        .with("smart", "0")
        .with("leafCount", "3")
        .with("duration", "5400000")
        .with("addedAt", "1480000000")
        .with("updatedAt", "1480003600")
}

fn playlist(server: &Arc<RecordingServer>, playlist_type: &str) -> Playlist {
    Playlist::build(server.clone(), &playlist_record(playlist_type), "/playlists")
}

fn decoded(path: &str) -> String {
    percent_decode_str(path).decode_utf8().unwrap().into_owned()
}

#[test]
fn test_construction_hydrates_every_field() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");

    assert_eq!(p.key.as_deref(), Some("/library/playlists/3"));
    assert_eq!(p.rating_key, Some(3));
    assert_eq!(p.title.as_deref(), Some("Soirée"));
    assert_eq!(p.summary.as_deref(), Some(""));
    assert_eq!(p.smart, Some(false));
    assert_eq!(p.leaf_count, Some(3));
    assert_eq!(p.duration, Some(5_400_000));
    assert_eq!(p.added_at.map(|t| t.timestamp()), Some(1_480_000_000));
    assert_eq!(p.updated_at.map(|t| t.timestamp()), Some(1_480_003_600));
    assert_eq!(p.guid, None);
    assert_eq!(p.composite, None);
    assert_eq!(p.initpath, "/playlists");
    assert_eq!(p.kind(), KindTag::from("video"));

    // La construction ne fait aucun appel réseau
    assert!(server.calls().is_empty());
}

#[test]
fn test_items_fetches_children() {
    let server = RecordingServer::new();
    server.respond(vec![
        RawRecord::new("Video")
            .with("ratingKey", "10")
            .with("type", "movie")
            .with("title", "Alien")
            .with("playlistItemID", "1"),
        RawRecord::new("Video")
            .with("ratingKey", "11")
            .with("type", "movie")
            .with("title", "Aliens")
            .with("playlistItemID", "2"),
    ]);
    let p = playlist(&server, "video");

    let items: Vec<MediaItem> = p.items().unwrap().collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].title.as_deref(), Some("Aliens"));
    assert_eq!(items[0].playlist_item_id, Some(1));
    assert_eq!(items[0].initpath, "/library/playlists/3/items");
    assert_eq!(
        server.calls(),
        vec![(Method::Get, "/library/playlists/3/items".to_string())]
    );

    // Chaque appel refait la requête
    assert_eq!(p.items().unwrap().count(), 0);
    assert_eq!(server.calls().len(), 2);
}

#[test]
fn test_add_items_rejects_mixed_kinds_without_request() {
    let server = RecordingServer::new();
    let p = playlist(&server, "movie");

    let movie = tagged("movie", 10);
    let show = tagged("show", 11);
    let err = p.add_items(&[&movie, &show]).unwrap_err();

    match &err {
        PlexError::MixedKinds { expected, found } => {
            assert_eq!(expected.as_str(), "movie");
            assert_eq!(found.as_str(), "show");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_validation_error());
    assert!(server.calls().is_empty());
}

#[test]
fn test_add_items_single_request_in_order() {
    let server = RecordingServer::new();
    let p = playlist(&server, "movie");

    let a = tagged("movie", 10);
    let b = tagged("movie", 11);
    let c = tagged("movie", 12);
    p.add_items(&[&a, &b, &c]).unwrap();

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    let (method, path) = &calls[0];
    assert_eq!(*method, Method::Put);
    assert!(path.starts_with("/library/playlists/3/items?uri="));
    assert_eq!(
        decoded(path),
        "/library/playlists/3/items?uri=library://0123-abcd/directory//library/metadata/10,11,12"
    );
}

#[test]
fn test_add_item_with_media_items() {
    let server = RecordingServer::new();
    let p = playlist(&server, "audio");

    let track = MediaItem::build(
        server.clone(),
        &RawRecord::new("Track")
            .with("ratingKey", "42")
            .with("type", "track")
            .with("librarySectionUUID", "music-uuid"),
        "/library/sections/2/all",
    );
    p.add_item(&track).unwrap();

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert!(decoded(&calls[0].1).ends_with("library://music-uuid/directory//library/metadata/42"));

    let movie = MediaItem::build(
        server.clone(),
        &RawRecord::new("Video").with("ratingKey", "7").with("type", "movie"),
        "/library/sections/1/all",
    );
    assert!(matches!(
        p.add_item(&movie),
        Err(PlexError::MixedKinds { .. })
    ));
    assert_eq!(server.calls().len(), 1);
}

#[test]
fn test_shows_and_seasons_join_video_playlists() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");

    let types = [("show", "20"), ("season", "21"), ("episode", "22"), ("movie", "23")];
    let items: Vec<MediaItem> = types
        .into_iter()
        .map(|(media_type, rating_key)| {
            MediaItem::build(
                server.clone(),
                &RawRecord::new("Directory")
                    .with("ratingKey", rating_key)
                    .with("type", media_type)
                    .with("librarySectionUUID", "tv-uuid"),
                "/library/sections/1/all",
            )
        })
        .collect();
    let refs: Vec<&dyn PlaylistItem> = items.iter().map(|i| i as &dyn PlaylistItem).collect();

    p.add_items(&refs).unwrap();

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        decoded(&calls[0].1).ends_with("library://tv-uuid/directory//library/metadata/20,21,22,23")
    );
}

#[test]
fn test_add_items_empty_batch() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");
    assert!(matches!(p.add_items(&[]), Err(PlexError::EmptyBatch)));
    assert!(server.calls().is_empty());
}

#[test]
fn test_remove_item() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");

    p.remove_item(&tagged("video", 10)).unwrap();
    assert_eq!(
        server.calls(),
        vec![(Method::Delete, "/library/playlists/3/items/110".to_string())]
    );
}

#[test]
fn test_move_item_paths_differ() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");
    let item = tagged("video", 10);
    let other = tagged("video", 11);

    p.move_item(&item, None).unwrap();
    p.move_item(&item, Some(&other as &dyn PlaylistItem)).unwrap();

    assert_eq!(
        server.calls(),
        vec![
            (Method::Put, "/library/playlists/3/items/110/move".to_string()),
            (
                Method::Put,
                "/library/playlists/3/items/110/move?after=111".to_string()
            ),
        ]
    );
}

#[test]
fn test_move_requires_membership_id() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");
    let loose = MediaItem::build(
        server.clone(),
        &RawRecord::new("Video").with("ratingKey", "7").with("type", "movie"),
        "/library/sections/1/all",
    );

    assert!(matches!(
        p.move_item(&loose, None),
        Err(PlexError::MissingAttribute("playlistItemID"))
    ));
    assert!(server.calls().is_empty());
}

#[test]
fn test_edit_sends_only_supplied_fields() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");

    p.edit(&PlaylistEdit::new().title("X")).unwrap();
    p.edit(&PlaylistEdit::new().summary("")).unwrap();

    let calls = server.calls();
    assert_eq!(calls[0], (Method::Put, "/library/metadata/3?title=X".to_string()));
    assert!(!calls[0].1.contains("summary"));
    assert_eq!(calls[1], (Method::Put, "/library/metadata/3?summary=".to_string()));
}

#[test]
fn test_delete_uses_key() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");

    p.delete().unwrap();
    assert_eq!(
        server.calls(),
        vec![(Method::Delete, "/library/playlists/3".to_string())]
    );
}

#[test]
fn test_operations_need_a_key() {
    let server = RecordingServer::new();
    let p = Playlist::build(
        server.clone(),
        &RawRecord::new("Playlist").with("title", "Sans clé"),
        "/playlists",
    );

    assert!(matches!(p.delete(), Err(PlexError::MissingAttribute("key"))));
    assert!(matches!(p.items(), Err(PlexError::MissingAttribute("key"))));
    assert!(matches!(
        p.edit(&PlaylistEdit::new().title("X")),
        Err(PlexError::MissingAttribute("ratingKey"))
    ));
    assert!(server.calls().is_empty());
}

#[test]
fn test_bare_items_key_is_missing() {
    let server = RecordingServer::new();
    let p = Playlist::build(
        server.clone(),
        &RawRecord::new("Playlist").with("ratingKey", "3").with("key", "/items"),
        "/playlists",
    );

    assert_eq!(p.key, None);
    assert!(matches!(p.delete(), Err(PlexError::MissingAttribute("key"))));
    assert!(server.calls().is_empty());
}

#[test]
fn test_create_posts_and_hydrates_response() {
    let server = RecordingServer::new();
    server.respond(vec![
        RawRecord::new("Playlist")
            .with("ratingKey", "99")
            .with("key", "/playlists/99/items")
            .with("type", "playlist")
            .with("title", "Nouvelle")
            .with("playlistType", "video")
            .with("smart", "0"),
    ]);

    let a = tagged("video", 10);
    let b = tagged("video", 11);
    let created = Playlist::create(server.clone(), "Nouvelle", &[&a, &b]).unwrap();

    assert_eq!(created.rating_key, Some(99));
    assert_eq!(created.key.as_deref(), Some("/playlists/99"));
    assert_eq!(created.title.as_deref(), Some("Nouvelle"));

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Method::Post);
    assert_eq!(
        decoded(&calls[0].1),
        "/playlists?smart=0&title=Nouvelle&type=video&uri=library://0123-abcd/directory//library/metadata/10,11"
    );
    assert_eq!(created.initpath, calls[0].1);
}

#[test]
fn test_create_rejects_mixed_kinds() {
    let server = RecordingServer::new();
    let a = tagged("video", 10);
    let b = tagged("audio", 11);

    let err = Playlist::create(server.clone(), "Mix", &[&a, &b]).unwrap_err();
    assert!(matches!(err, PlexError::MixedKinds { .. }));
    assert!(matches!(
        Playlist::create(server.clone(), "Vide", &[]),
        Err(PlexError::EmptyBatch)
    ));
    assert!(server.calls().is_empty());
}

#[test]
fn test_create_with_empty_response() {
    let server = RecordingServer::new();
    let a = tagged("video", 10);
    assert!(matches!(
        Playlist::create(server.clone(), "Perdue", &[&a]),
        Err(PlexError::NotFound(_))
    ));
}

#[test]
fn test_reload_returns_fresh_projection() {
    let server = RecordingServer::new();
    let p = playlist(&server, "video");
    server.respond(vec![playlist_record("video").with("title", "Renommée")]);

    let fresh = p.reload().unwrap();
    assert_eq!(fresh.title.as_deref(), Some("Renommée"));
    assert_eq!(p.title.as_deref(), Some("Soirée"));
    assert_eq!(
        server.calls(),
        vec![(Method::Get, "/library/playlists/3".to_string())]
    );
}

#[test]
fn test_fetch_by_rating_key() {
    let server = RecordingServer::new();
    server.respond(vec![playlist_record("audio")]);

    let p = Playlist::fetch(server.clone(), 3).unwrap();
    assert_eq!(p.playlist_type.as_deref(), Some("audio"));
    assert_eq!(p.initpath, "/playlists/3");
}

#[test]
fn test_library_lookups() {
    let server = RecordingServer::new();
    let listing = vec![
        playlist_record("video").with("title", "Films"),
        RawRecord::new("Video").with("type", "movie").with("ratingKey", "5"),
        playlist_record("audio").with("title", "Jazz").with("ratingKey", "8"),
    ];
    server.respond(listing.clone());

    let items = library::list_items(server.clone(), "/playlists").unwrap();
    assert_eq!(items.len(), 3);
    assert!(matches!(items[1], LibraryItem::Media(_)));
    assert_eq!(
        items[0].as_playlist().and_then(|p| p.title.clone()),
        Some("Films".to_string())
    );

    server.respond(listing.clone());
    assert_eq!(library::playlists(server.clone()).unwrap().len(), 2);

    server.respond(listing.clone());
    let jazz = library::playlist(server.clone(), "Jazz").unwrap();
    assert_eq!(jazz.rating_key, Some(8));

    server.respond(listing);
    assert!(matches!(
        library::playlist(server.clone(), "Rock"),
        Err(PlexError::NotFound(_))
    ));
}
