//! Mock repository implementations for testing
//!
//! Each mock keeps its rows in a `BTreeMap` keyed by a serial id, so listings
//! come back in insertion order like the `ORDER BY id` queries they stand in for.

use async_trait::async_trait;
use cadenza_core::models::{
    Artist, ArtistFields, Broadcast, BroadcastDraft, NewSubscription, Playlist, PlaylistFields,
    Subscription, TaxonomyKind, TaxonomyTerm, TermField, Track, TrackFields, TrackTerms,
};
use cadenza_core::AppError;
use cadenza_db::{
    ArtistStore, BroadcastStore, PlaylistStore, SubscriptionStore, TaxonomyStore, TrackStore,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

fn terms_mut(track: &mut Track, field: TermField) -> &mut Vec<String> {
    match field {
        TermField::Genre => &mut track.genre,
        TermField::Category => &mut track.category,
        TermField::Artists => &mut track.artists,
    }
}

/// Mock track repository
#[derive(Clone, Default)]
pub struct MockTrackStore {
    table: Arc<Mutex<Table<Track>>>,
    fail_inserts: Arc<AtomicBool>,
}

impl MockTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, fields: &TrackFields, audio_key: Option<&str>, image_key: Option<&str>) -> Track {
        self.table.lock().unwrap().insert_with(|id| Track {
            id,
            title: fields.title.clone(),
            album_title: fields.album_title.clone(),
            artists: fields.artists.clone(),
            genre: fields.genre.clone(),
            category: fields.category.clone(),
            audio_key: audio_key.map(str::to_string),
            image_key: image_key.map(str::to_string),
            created_at: Utc::now(),
            visible: fields.visible,
            duration: fields.duration,
        })
    }

    pub fn track(&self, id: i32) -> Option<Track> {
        self.table.lock().unwrap().rows.get(&id).cloned()
    }

    pub fn rows(&self) -> Vec<Track> {
        self.table.lock().unwrap().all()
    }

    /// Make `insert` return no row
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    fn filtered(&self, keep: impl Fn(&Track) -> bool) -> Vec<Track> {
        self.rows().into_iter().filter(|t| keep(t)).collect()
    }
}

#[async_trait]
impl TrackStore for MockTrackStore {
    async fn insert(
        &self,
        fields: &TrackFields,
        audio_key: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<Option<Track>, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(self.seed(fields, audio_key, image_key)))
    }

    async fn get(&self, id: i32) -> Result<Option<Track>, AppError> {
        Ok(self.track(id))
    }

    async fn update(
        &self,
        id: i32,
        fields: &TrackFields,
        audio_key: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        let Some(track) = table.rows.get_mut(&id) else {
            return Ok(0);
        };
        track.title = fields.title.clone();
        track.album_title = fields.album_title.clone();
        track.artists = fields.artists.clone();
        track.genre = fields.genre.clone();
        track.category = fields.category.clone();
        track.visible = fields.visible;
        track.duration = fields.duration;
        if let Some(key) = audio_key {
            track.audio_key = Some(key.to_string());
        }
        if let Some(key) = image_key {
            track.image_key = Some(key.to_string());
        }
        Ok(1)
    }

    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        Ok(table
            .rows
            .get_mut(&id)
            .map(|track| track.visible = visible)
            .map_or(0, |_| 1))
    }

    async fn delete(&self, id: i32) -> Result<Option<Track>, AppError> {
        Ok(self.table.lock().unwrap().rows.remove(&id))
    }

    async fn list(&self) -> Result<Vec<Track>, AppError> {
        Ok(self.rows())
    }

    async fn list_by_album(&self, album_title: &str) -> Result<Vec<Track>, AppError> {
        Ok(self.filtered(|t| t.visible && t.album_title == album_title))
    }

    async fn list_by_artist(&self, artist: &str) -> Result<Vec<Track>, AppError> {
        Ok(self.filtered(|t| t.visible && t.artists.iter().any(|a| a == artist)))
    }

    async fn list_by_ids(&self, ids: &[i32]) -> Result<Vec<Track>, AppError> {
        Ok(self.filtered(|t| ids.contains(&t.id)))
    }

    async fn find_containing(
        &self,
        field: TermField,
        value: &str,
    ) -> Result<Vec<TrackTerms>, AppError> {
        Ok(self
            .rows()
            .into_iter()
            .filter_map(|mut track| {
                let terms = std::mem::take(terms_mut(&mut track, field));
                terms.iter().any(|t| t == value).then_some(TrackTerms {
                    id: track.id,
                    terms,
                })
            })
            .collect())
    }

    async fn replace_terms(
        &self,
        field: TermField,
        id: i32,
        terms: &[String],
    ) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        let Some(track) = table.rows.get_mut(&id) else {
            return Ok(0);
        };
        *terms_mut(track, field) = terms.to_vec();
        Ok(1)
    }
}

/// Mock artist repository
#[derive(Clone, Default)]
pub struct MockArtistStore {
    table: Arc<Mutex<Table<Artist>>>,
}

impl MockArtistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, fields: &ArtistFields, image_key: Option<&str>) -> Artist {
        self.table.lock().unwrap().insert_with(|id| Artist {
            id,
            name: fields.name.clone(),
            image_key: image_key.map(str::to_string),
            visible: fields.visible,
        })
    }

    pub fn artist(&self, id: i32) -> Option<Artist> {
        self.table.lock().unwrap().rows.get(&id).cloned()
    }

    pub fn rows(&self) -> Vec<Artist> {
        self.table.lock().unwrap().all()
    }
}

#[async_trait]
impl ArtistStore for MockArtistStore {
    async fn insert(
        &self,
        fields: &ArtistFields,
        image_key: Option<&str>,
    ) -> Result<Option<Artist>, AppError> {
        Ok(Some(self.seed(fields, image_key)))
    }

    async fn get(&self, id: i32) -> Result<Option<Artist>, AppError> {
        Ok(self.artist(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Artist>, AppError> {
        Ok(self.rows().into_iter().find(|a| a.name == name))
    }

    async fn list(&self) -> Result<Vec<Artist>, AppError> {
        Ok(self.rows())
    }

    async fn update(
        &self,
        id: i32,
        fields: &ArtistFields,
        image_key: Option<&str>,
    ) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        let Some(artist) = table.rows.get_mut(&id) else {
            return Ok(0);
        };
        artist.name = fields.name.clone();
        artist.visible = fields.visible;
        if let Some(key) = image_key {
            artist.image_key = Some(key.to_string());
        }
        Ok(1)
    }

    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        Ok(table
            .rows
            .get_mut(&id)
            .map(|artist| artist.visible = visible)
            .map_or(0, |_| 1))
    }

    async fn delete(&self, id: i32) -> Result<Option<Artist>, AppError> {
        Ok(self.table.lock().unwrap().rows.remove(&id))
    }
}

/// Mock genre/category repository
#[derive(Clone, Default)]
pub struct MockTaxonomyStore {
    tables: Arc<Mutex<HashMap<TaxonomyKind, Table<TaxonomyTerm>>>>,
}

impl MockTaxonomyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, kind: TaxonomyKind, label: &str, visible: bool) -> TaxonomyTerm {
        self.tables
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .insert_with(|id| TaxonomyTerm {
                id,
                label: label.to_string(),
                visible,
            })
    }

    pub fn labels(&self, kind: TaxonomyKind) -> Vec<String> {
        self.terms(kind).into_iter().map(|t| t.label).collect()
    }

    fn terms(&self, kind: TaxonomyKind) -> Vec<TaxonomyTerm> {
        self.tables
            .lock()
            .unwrap()
            .get(&kind)
            .map(Table::all)
            .unwrap_or_default()
    }
}

#[async_trait]
impl TaxonomyStore for MockTaxonomyStore {
    async fn insert_many(
        &self,
        kind: TaxonomyKind,
        labels: &[String],
        visible: bool,
    ) -> Result<Vec<TaxonomyTerm>, AppError> {
        Ok(labels
            .iter()
            .map(|label| self.seed(kind, label, visible))
            .collect())
    }

    async fn list(&self, kind: TaxonomyKind) -> Result<Vec<TaxonomyTerm>, AppError> {
        Ok(self.terms(kind))
    }

    async fn rename(
        &self,
        kind: TaxonomyKind,
        id: i32,
        label: &str,
        visible: bool,
    ) -> Result<Option<String>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(term) = tables.get_mut(&kind).and_then(|t| t.rows.get_mut(&id)) else {
            return Ok(None);
        };
        let previous = std::mem::replace(&mut term.label, label.to_string());
        term.visible = visible;
        Ok(Some(previous))
    }

    async fn set_visibility(
        &self,
        kind: TaxonomyKind,
        id: i32,
        visible: bool,
    ) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .get_mut(&kind)
            .and_then(|t| t.rows.get_mut(&id))
            .map(|term| term.visible = visible)
            .map_or(0, |_| 1))
    }

    async fn delete(&self, kind: TaxonomyKind, id: i32) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .get_mut(&kind)
            .and_then(|t| t.rows.remove(&id))
            .map_or(0, |_| 1))
    }
}

/// Mock playlist repository
#[derive(Clone, Default)]
pub struct MockPlaylistStore {
    table: Arc<Mutex<Table<Playlist>>>,
}

impl MockPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, fields: &PlaylistFields, image_key: Option<&str>) -> Playlist {
        self.table.lock().unwrap().insert_with(|id| Playlist {
            id,
            name: fields.name.clone(),
            song_ids: fields.song_ids.clone(),
            image_key: image_key.map(str::to_string),
            visible: fields.visible,
        })
    }

    pub fn playlist(&self, id: i32) -> Option<Playlist> {
        self.table.lock().unwrap().rows.get(&id).cloned()
    }

    pub fn rows(&self) -> Vec<Playlist> {
        self.table.lock().unwrap().all()
    }
}

#[async_trait]
impl PlaylistStore for MockPlaylistStore {
    async fn insert(
        &self,
        fields: &PlaylistFields,
        image_key: Option<&str>,
    ) -> Result<Option<Playlist>, AppError> {
        Ok(Some(self.seed(fields, image_key)))
    }

    async fn get(&self, id: i32) -> Result<Option<Playlist>, AppError> {
        Ok(self.playlist(id))
    }

    async fn list(&self) -> Result<Vec<Playlist>, AppError> {
        Ok(self.rows())
    }

    async fn list_visible(&self) -> Result<Vec<Playlist>, AppError> {
        Ok(self.rows().into_iter().filter(|p| p.visible).collect())
    }

    async fn update(
        &self,
        id: i32,
        fields: &PlaylistFields,
        image_key: Option<&str>,
    ) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        let Some(playlist) = table.rows.get_mut(&id) else {
            return Ok(0);
        };
        playlist.name = fields.name.clone();
        playlist.song_ids = fields.song_ids.clone();
        playlist.visible = fields.visible;
        if let Some(key) = image_key {
            playlist.image_key = Some(key.to_string());
        }
        Ok(1)
    }

    async fn set_songs(&self, id: i32, song_ids: &[i32]) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        Ok(table
            .rows
            .get_mut(&id)
            .map(|playlist| playlist.song_ids = song_ids.to_vec())
            .map_or(0, |_| 1))
    }

    async fn set_visibility(&self, id: i32, visible: bool) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        Ok(table
            .rows
            .get_mut(&id)
            .map(|playlist| playlist.visible = visible)
            .map_or(0, |_| 1))
    }

    async fn delete(&self, id: i32) -> Result<Option<Playlist>, AppError> {
        Ok(self.table.lock().unwrap().rows.remove(&id))
    }

    async fn remove_song(&self, track_id: i32) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        let mut changed = 0;
        for playlist in table.rows.values_mut() {
            let before = playlist.song_ids.len();
            playlist.song_ids.retain(|id| *id != track_id);
            if playlist.song_ids.len() != before {
                changed += 1;
            }
        }
        Ok(changed)
    }
}

/// Mock push subscription repository
#[derive(Clone, Default)]
pub struct MockSubscriptionStore {
    table: Arc<Mutex<Table<Subscription>>>,
}

impl MockSubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.table
            .lock()
            .unwrap()
            .all()
            .into_iter()
            .map(|s| s.endpoint)
            .collect()
    }
}

#[async_trait]
impl SubscriptionStore for MockSubscriptionStore {
    async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<Subscription>, AppError> {
        Ok(self
            .table
            .lock()
            .unwrap()
            .rows
            .values()
            .find(|s| s.endpoint == endpoint)
            .cloned())
    }

    async fn insert_if_absent(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Option<Subscription>, AppError> {
        let mut table = self.table.lock().unwrap();
        if table
            .rows
            .values()
            .any(|s| s.endpoint == subscription.endpoint)
        {
            return Ok(None);
        }
        Ok(Some(table.insert_with(|id| Subscription {
            id,
            endpoint: subscription.endpoint.clone(),
            expiration_time: subscription.expiration_time,
            keys: subscription.keys.clone(),
            subscribed_at: Utc::now(),
        })))
    }

    async fn list(&self) -> Result<Vec<Subscription>, AppError> {
        Ok(self.table.lock().unwrap().all())
    }

    async fn delete_by_endpoint(&self, endpoint: &str) -> Result<u64, AppError> {
        let mut table = self.table.lock().unwrap();
        let before = table.rows.len();
        table.rows.retain(|_, s| s.endpoint != endpoint);
        Ok((before - table.rows.len()) as u64)
    }
}

/// Mock broadcast repository
#[derive(Clone, Default)]
pub struct MockBroadcastStore {
    table: Arc<Mutex<Table<Broadcast>>>,
}

impl MockBroadcastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Broadcast> {
        self.table.lock().unwrap().all()
    }
}

#[async_trait]
impl BroadcastStore for MockBroadcastStore {
    async fn insert(
        &self,
        draft: &BroadcastDraft,
        image_key: Option<&str>,
    ) -> Result<Option<Broadcast>, AppError> {
        Ok(Some(self.table.lock().unwrap().insert_with(|id| Broadcast {
            id,
            title: draft.title.clone(),
            body: draft.body.clone(),
            image_key: image_key.map(str::to_string),
            created_at: Utc::now(),
            url: draft.url.clone(),
        })))
    }

    async fn list(&self) -> Result<Vec<Broadcast>, AppError> {
        Ok(self.rows())
    }

    async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<Broadcast>, AppError> {
        let mut rows: Vec<Broadcast> = self
            .rows()
            .into_iter()
            .filter(|b| b.created_at >= since)
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn delete(&self, id: i32) -> Result<Option<Broadcast>, AppError> {
        Ok(self.table.lock().unwrap().rows.remove(&id))
    }
}
