//! Exemple d'utilisation de pmoplex
//!
//! Cet exemple montre comment :
//! - Se connecter au serveur Plex décrit par la configuration
//! - Lister les playlists et leurs éléments
//! - Créer une playlist à partir des éléments d'une autre, puis la supprimer
//!
//! Usage : `cargo run -p pmoplex --example playlist_tour -- "Titre de playlist"`

use std::sync::Arc;

use pmoplex::{HttpPlexServer, Playlist, PlaylistItem, PlexConfig, PlexServer, library};

fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    tracing_subscriber::fmt::init();

    let config = PlexConfig::load_config("")?;
    let server: Arc<dyn PlexServer> = Arc::new(HttpPlexServer::from_config(&config)?);

    println!("=== Playlists ===");
    for playlist in library::playlists(server.clone())? {
        println!(
            "  [{}] {} ({} éléments, {})",
            playlist.rating_key.unwrap_or_default(),
            playlist.title.as_deref().unwrap_or("?"),
            playlist.leaf_count.unwrap_or_default(),
            playlist.playlist_type.as_deref().unwrap_or("?"),
        );
    }

    let Some(title) = std::env::args().nth(1) else {
        return Ok(());
    };

    let source = library::playlist(server.clone(), &title)?;
    let items: Vec<_> = source.items()?.collect();
    println!("\n=== {} ===", title);
    for item in &items {
        println!(
            "  #{} {}",
            item.playlist_item_id.unwrap_or_default(),
            item.title.as_deref().unwrap_or("?")
        );
    }

    if items.is_empty() {
        return Ok(());
    }

    let refs: Vec<&dyn PlaylistItem> = items.iter().map(|i| i as &dyn PlaylistItem).collect();
    let copy = Playlist::create(server, &format!("{} (copie)", title), &refs)?;
    println!("\n✓ Copie créée : {:?}", copy);

    copy.delete()?;
    println!("✓ Copie supprimée");

    Ok(())
}
