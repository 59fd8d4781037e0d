use super::error::MetainfoError;
use super::fields::{self, resolve_alias};
use super::info::Info;
use super::info_hash::InfoHash;
use crate::bencode::{decode, find_raw_value, Value};
use crate::constants::{MAX_CREATION_DATE_SECS, MAX_METAINFO_SIZE, MIN_CREATION_DATE_SECS};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::Path;
use tracing::{debug, warn};

/// A parsed torrent file.
///
/// Built once from a single decode pass and never mutated afterwards.
/// Equality and hashing use only the [`InfoHash`].
///
/// # Examples
///
/// ```no_run
/// use torrent_metainfo::Metainfo;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let metainfo = Metainfo::from_file("example.torrent")?;
///
/// println!("Torrent: {}", metainfo.info.name);
/// println!("Size: {} bytes", metainfo.info.total_length);
/// println!("Info hash: {}", metainfo.info_hash);
/// for file in &metainfo.info.files {
///     println!("  {} pieces {}..={}", file.path.display(), file.start_piece, file.end_piece);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Metainfo {
    /// The info dictionary containing file and piece information.
    pub info: Info,
    /// SHA-1 of the info dictionary's source bytes.
    pub info_hash: InfoHash,
    /// Tracker tiers, tried in order. URLs within a tier are shuffled.
    pub announce_tiers: Vec<Vec<String>>,
    /// When the torrent was created; the Unix epoch if absent.
    pub creation_date: DateTime<Utc>,
    pub comment: String,
    /// Name/version of the program that created the torrent.
    pub created_by: String,
    /// Character encoding of legacy string fields, as declared by the creator.
    pub encoding: String,
    pub publisher_url: String,
    /// Web seed URLs from `url-list` ([BEP-19](http://bittorrent.org/beps/bep_0019.html)).
    pub http_seeds: Vec<String>,
    /// DHT bootstrap nodes, passed through uninterpreted.
    pub nodes: Vec<Value>,
    raw_info: Bytes,
}

/// Recognized top-level keys, gathered in one pass before anything is
/// interpreted.
#[derive(Default)]
struct TopLevelFields<'a> {
    info: Option<&'a Value>,
    announce: Option<&'a Value>,
    announce_list: Option<&'a Value>,
    creation_date: Option<&'a Value>,
    comment: Option<&'a Value>,
    comment_utf8: Option<&'a Value>,
    created_by: Option<&'a Value>,
    encoding: Option<&'a Value>,
    publisher_url: Option<&'a Value>,
    publisher_url_utf8: Option<&'a Value>,
    url_list: Option<&'a Value>,
    nodes: Option<&'a Value>,
}

impl<'a> TopLevelFields<'a> {
    fn collect(dict: &'a BTreeMap<Bytes, Value>) -> Self {
        let mut found = Self::default();
        for (key, value) in dict {
            let slot = match key.as_ref() {
                b"info" => &mut found.info,
                b"announce" => &mut found.announce,
                b"announce-list" => &mut found.announce_list,
                b"creation date" => &mut found.creation_date,
                b"comment" => &mut found.comment,
                b"comment.utf-8" => &mut found.comment_utf8,
                b"created by" => &mut found.created_by,
                b"encoding" => &mut found.encoding,
                b"publisher-url" => &mut found.publisher_url,
                b"publisher-url.utf-8" => &mut found.publisher_url_utf8,
                b"url-list" => &mut found.url_list,
                b"nodes" => &mut found.nodes,
                // Hoffman-style seeds (BEP-17) are recognized but not used.
                b"httpseeds" => continue,
                _ => continue,
            };
            *slot = Some(value);
        }
        found
    }
}

impl Metainfo {
    /// Parses a torrent file from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid bencode, if a recognized
    /// field has the wrong type, or if the info dictionary is invalid (see
    /// [`Info::from_value`]).
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let root = decode(data)?;
        let dict = fields::dict(&root, "root")?;
        let keys = TopLevelFields::collect(dict);

        let info_value = keys.info.ok_or(MetainfoError::MissingField("info"))?;
        let raw_info = find_raw_value(data, b"info")?.ok_or(MetainfoError::MissingField("info"))?;
        let raw_info = Bytes::copy_from_slice(raw_info);
        let info_hash = InfoHash::from_info_bytes(&raw_info);
        let info = Info::from_value(info_value)?;

        let announce_tiers = parse_announce_tiers(keys.announce, keys.announce_list)?;

        let creation_date = match keys.creation_date {
            Some(value) => parse_creation_date(value)?,
            None => DateTime::<Utc>::default(),
        };

        let comment = resolve_alias(
            fields::opt_string(keys.comment, "comment")?,
            fields::opt_string(keys.comment_utf8, "comment.utf-8")?,
        );
        let publisher_url = resolve_alias(
            fields::opt_string(keys.publisher_url, "publisher-url")?,
            fields::opt_string(keys.publisher_url_utf8, "publisher-url.utf-8")?,
        );
        let created_by = fields::opt_string(keys.created_by, "created by")?.unwrap_or_default();
        let encoding = fields::opt_string(keys.encoding, "encoding")?.unwrap_or_default();

        let http_seeds = match keys.url_list {
            Some(value) => parse_url_list(value)?,
            None => Vec::new(),
        };

        let nodes = keys
            .nodes
            .and_then(Value::as_list)
            .map(<[Value]>::to_vec)
            .unwrap_or_default();

        debug!(
            "Decoded torrent {:?} ({}): {} pieces, {} files, {} bytes",
            info.name,
            info_hash,
            info.piece_count(),
            info.files.len(),
            info.total_length
        );

        Ok(Self {
            info,
            info_hash,
            announce_tiers,
            creation_date,
            comment,
            created_by,
            encoding,
            publisher_url,
            http_seeds,
            nodes,
            raw_info,
        })
    }

    /// Reads and parses a torrent file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`MetainfoError::TooLarge`] for files over
    /// [`MAX_METAINFO_SIZE`], an I/O error if the file cannot be read, or any
    /// error of [`Metainfo::from_bytes`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MetainfoError> {
        let path = path.as_ref();
        check_size(std::fs::metadata(path)?.len())?;
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Reads a torrent file asynchronously, then runs the decode on the
    /// blocking thread pool.
    pub async fn from_file_async(path: impl AsRef<Path>) -> Result<Self, MetainfoError> {
        let path = path.as_ref();
        check_size(tokio::fs::metadata(path).await?.len())?;
        let data = tokio::fs::read(path).await?;
        Self::decode_blocking(Bytes::from(data)).await
    }

    /// Like [`Metainfo::from_bytes`], but reports failure as `None`.
    pub fn try_from_bytes(data: &[u8]) -> Option<Self> {
        Self::from_bytes(data)
            .inspect_err(|e| debug!("Ignoring undecodable torrent: {}", e))
            .ok()
    }

    /// Like [`Metainfo::from_file`], but reports failure as `None`.
    pub fn try_from_file(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        Self::from_file(path)
            .inspect_err(|e| debug!("Ignoring torrent file {}: {}", path.display(), e))
            .ok()
    }

    pub(crate) async fn decode_blocking(data: Bytes) -> Result<Self, MetainfoError> {
        tokio::task::spawn_blocking(move || Self::from_bytes(&data))
            .await
            .map_err(|e| MetainfoError::Io(std::io::Error::other(e)))?
    }

    /// Returns the exact source bytes of the info dictionary.
    ///
    /// These are the bytes the info hash was computed from, suitable for
    /// sharing the metadata with peers ([BEP-9](http://bittorrent.org/beps/bep_0009.html)).
    pub fn info_metadata_bytes(&self) -> &Bytes {
        &self.raw_info
    }

    /// Returns every tracker URL, tier by tier, without duplicates.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers: Vec<String> = Vec::new();

        for tier in &self.announce_tiers {
            for tracker in tier {
                if !trackers.contains(tracker) {
                    trackers.push(tracker.clone());
                }
            }
        }

        trackers
    }

    /// Returns true if peers may only be found through the listed trackers.
    pub fn is_private(&self) -> bool {
        self.info.private
    }
}

impl PartialEq for Metainfo {
    fn eq(&self, other: &Self) -> bool {
        self.info_hash == other.info_hash
    }
}

impl Eq for Metainfo {}

impl Hash for Metainfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info_hash.hash(state);
    }
}

impl TryFrom<&[u8]> for Metainfo {
    type Error = MetainfoError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

fn check_size(size: u64) -> Result<(), MetainfoError> {
    if size > MAX_METAINFO_SIZE {
        return Err(MetainfoError::TooLarge {
            size,
            limit: MAX_METAINFO_SIZE,
        });
    }
    Ok(())
}

/// Resolves tracker tiers ([BEP-12](http://bittorrent.org/beps/bep_0012.html)).
///
/// A usable `announce-list` replaces the single-tier `announce` fallback.
/// A bare string in place of the list is ignored.
fn parse_announce_tiers(
    announce: Option<&Value>,
    announce_list: Option<&Value>,
) -> Result<Vec<Vec<String>>, MetainfoError> {
    let mut tiers = Vec::new();

    if let Some(value) = announce {
        let url = fields::string(value, "announce")?;
        if !url.is_empty() {
            tiers.push(vec![url]);
        }
    }

    match announce_list {
        Some(Value::List(list)) => {
            let parsed = parse_tier_list(list)?;
            if !parsed.is_empty() {
                tiers = parsed;
            }
        }
        Some(Value::Bytes(_)) => warn!("Ignoring announce-list given as a bare string"),
        Some(other) => warn!("Ignoring announce-list of type {}", other.kind()),
        None => {}
    }

    Ok(tiers)
}

fn parse_tier_list(list: &[Value]) -> Result<Vec<Vec<String>>, MetainfoError> {
    let mut rng = rand::rng();
    let mut tiers = Vec::with_capacity(list.len());

    for tier in list {
        let mut urls: Vec<String> = fields::string_list(tier, "announce-list")?
            .into_iter()
            .filter(|url| !url.is_empty())
            .collect();

        if urls.is_empty() {
            continue;
        }

        urls.shuffle(&mut rng);
        tiers.push(urls);
    }

    Ok(tiers)
}

fn parse_creation_date(value: &Value) -> Result<DateTime<Utc>, MetainfoError> {
    let timestamp = match value {
        Value::Integer(i) => *i,
        Value::Bytes(b) => std::str::from_utf8(b)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or(MetainfoError::InvalidField("creation date"))?,
        _ => return Err(MetainfoError::InvalidField("creation date")),
    };
    creation_date_from_timestamp(timestamp)
}

/// Interprets a creation timestamp as Unix seconds, or as milliseconds when
/// it is too large to be a date in seconds.
///
/// The accepted range is 0001-01-01 to 9999-12-31 UTC.
pub fn creation_date_from_timestamp(timestamp: i64) -> Result<DateTime<Utc>, MetainfoError> {
    if (MIN_CREATION_DATE_SECS..=MAX_CREATION_DATE_SECS).contains(&timestamp) {
        return DateTime::from_timestamp(timestamp, 0).ok_or(MetainfoError::DateRange(timestamp));
    }

    let min_millis = MIN_CREATION_DATE_SECS * 1000;
    let max_millis = MAX_CREATION_DATE_SECS * 1000 + 999;
    if (min_millis..=max_millis).contains(&timestamp) {
        return DateTime::from_timestamp_millis(timestamp)
            .ok_or(MetainfoError::DateRange(timestamp));
    }

    Err(MetainfoError::DateRange(timestamp))
}

/// Reads web seeds, given either as one URL or as a list of URLs.
fn parse_url_list(value: &Value) -> Result<Vec<String>, MetainfoError> {
    let urls = match value {
        Value::Bytes(_) => vec![fields::string(value, "url-list")?],
        Value::List(_) => fields::string_list(value, "url-list")?,
        _ => return Err(MetainfoError::InvalidField("url-list")),
    };
    Ok(urls.into_iter().filter(|url| !url.is_empty()).collect())
}
