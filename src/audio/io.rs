//! Tag and property I/O through lofty.
//!
//! Reading goes through lofty's format-independent [`Tag`] so every format
//! maps onto the same [`TagSet`]. Writing edits the file's existing tag of
//! the handler's type in place, leaving items we don't model untouched.

use std::fs::File;
use std::path::Path;

use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::{AudioFile as _, FileType, TaggedFile, TaggedFileExt};
use lofty::mp4::{Mp4Codec, Mp4File};
use lofty::picture::{Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};

use super::AudioProperties;
use super::convert::Codec;
use crate::error::{Error, Result};
use crate::tags::{Artwork, TagSet};

fn open(path: &Path) -> Result<TaggedFile> {
    Probe::open(path)
        .map_err(|e| Error::metadata(path, format!("Failed to open file for probing: {}", e)))?
        .guess_file_type()
        .map_err(|e| Error::metadata(path, format!("Failed to probe file type: {}", e)))?
        .read()
        .map_err(|e| Error::metadata(path, format!("Failed to read file metadata: {}", e)))
}

/// Read tags and technical properties.
pub fn read(path: &Path) -> Result<(TagSet, AudioProperties)> {
    let tagged_file = open(path)?;

    // Get the primary tag, or fall back to the first available tag
    let tags = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .map(tag_to_tagset)
        .unwrap_or_default();

    let props = tagged_file.properties();
    let properties = AudioProperties {
        duration: props.duration(),
        bitrate_kbps: props.audio_bitrate(),
        sample_rate: props.sample_rate(),
        channels: props.channels(),
        bit_depth: props.bit_depth(),
        codec: codec_of(path, tagged_file.file_type()),
    };

    Ok((tags, properties))
}

fn codec_of(path: &Path, file_type: FileType) -> Option<Codec> {
    match file_type {
        FileType::Flac => Some(Codec::Flac),
        FileType::Mpeg => Some(Codec::Mp3),
        FileType::Aac => Some(Codec::Aac),
        FileType::Opus => Some(Codec::Opus),
        FileType::Vorbis => Some(Codec::Vorbis),
        FileType::Wav => Some(Codec::Lpcm),
        FileType::Mp4 => mp4_codec(path),
        _ => None,
    }
}

/// MP4 files hold either AAC or ALAC; only the sample description knows.
fn mp4_codec(path: &Path) -> Option<Codec> {
    let mut file = File::open(path).ok()?;
    let mp4 = Mp4File::read_from(&mut file, ParseOptions::new()).ok()?;
    match mp4.properties().codec() {
        Mp4Codec::AAC => Some(Codec::Aac),
        Mp4Codec::ALAC => Some(Codec::Alac),
        Mp4Codec::MP3 => Some(Codec::Mp3),
        Mp4Codec::FLAC => Some(Codec::Flac),
        _ => None,
    }
}

fn text(tag: &Tag, key: ItemKey) -> Option<String> {
    tag.get_string(&key).map(str::to_string)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

fn tag_to_tagset(tag: &Tag) -> TagSet {
    let composers: Vec<String> = tag
        .get_strings(&ItemKey::Composer)
        .flat_map(|s| s.split('\0'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let tempo = tag
        .get_string(&ItemKey::IntegerBpm)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .or_else(|| {
            tag.get_string(&ItemKey::Bpm)
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|b| *b >= 0.0)
                .map(|b| b.round() as u32)
        });

    let artwork = tag
        .pictures()
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .or_else(|| tag.pictures().first())
        .map(|p| {
            let mime = p.mime_type().map(|m| m.as_str().to_string());
            Artwork::new(p.data().to_vec(), mime.unwrap_or_else(|| "image/jpeg".to_string()))
        });

    TagSet {
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
        album_artist: text(tag, ItemKey::AlbumArtist),
        genre: tag.genre().map(|s| s.to_string()),
        date: text(tag, ItemKey::RecordingDate)
            .or_else(|| text(tag, ItemKey::ReleaseDate))
            .or_else(|| text(tag, ItemKey::Year)),
        composer: (!composers.is_empty()).then_some(composers),
        isrc: text(tag, ItemKey::Isrc),
        lyrics: text(tag, ItemKey::Lyrics),
        artwork,
        track_number: tag.track(),
        track_count: tag.track_total(),
        disc_number: tag.disk(),
        disc_count: tag.disk_total(),
        tempo,
        compilation: tag.get_string(&ItemKey::FlagCompilation).and_then(parse_flag),
        comment: tag.comment().map(|s| s.to_string()),
        copyright: text(tag, ItemKey::CopyrightMessage),
    }
}

fn put_text(tag: &mut Tag, key: ItemKey, value: Option<&str>) {
    match value {
        Some(v) => {
            tag.insert_text(key, v.to_string());
        }
        None => tag.remove_key(&key),
    }
}

fn apply_tagset(tag: &mut Tag, tags: &TagSet) {
    put_text(tag, ItemKey::TrackTitle, tags.title.as_deref());
    put_text(tag, ItemKey::TrackArtist, tags.artist.as_deref());
    put_text(tag, ItemKey::AlbumTitle, tags.album.as_deref());
    put_text(tag, ItemKey::AlbumArtist, tags.album_artist.as_deref());
    put_text(tag, ItemKey::Genre, tags.genre.as_deref());
    put_text(tag, ItemKey::RecordingDate, tags.date.as_deref());
    put_text(tag, ItemKey::Isrc, tags.isrc.as_deref());
    put_text(tag, ItemKey::Lyrics, tags.lyrics.as_deref());
    put_text(tag, ItemKey::Comment, tags.comment.as_deref());
    put_text(tag, ItemKey::CopyrightMessage, tags.copyright.as_deref());

    tag.remove_key(&ItemKey::Composer);
    for name in tags.composer.iter().flatten() {
        tag.push(TagItem::new(ItemKey::Composer, ItemValue::Text(name.clone())));
    }

    match tags.track_number {
        Some(n) => tag.set_track(n),
        None => tag.remove_track(),
    }
    match tags.track_count {
        Some(n) => tag.set_track_total(n),
        None => tag.remove_track_total(),
    }
    match tags.disc_number {
        Some(n) => tag.set_disk(n),
        None => tag.remove_disk(),
    }
    match tags.disc_count {
        Some(n) => tag.set_disk_total(n),
        None => tag.remove_disk_total(),
    }

    tag.remove_key(&ItemKey::Bpm);
    match tags.tempo {
        // Not every tag type has an integer BPM item
        Some(t) => {
            if !tag.insert_text(ItemKey::IntegerBpm, t.to_string()) {
                tag.insert_text(ItemKey::Bpm, t.to_string());
            }
        }
        None => tag.remove_key(&ItemKey::IntegerBpm),
    }
    let compilation = tags.compilation.map(|c| if c { "1" } else { "0" });
    put_text(tag, ItemKey::FlagCompilation, compilation);
}

/// Replace the front cover. A picture of another type carrying the same
/// image (read back as the artwork when no front cover exists) is replaced
/// too, so an unchanged file keeps a single copy.
fn apply_artwork(path: &Path, tag: &mut Tag, artwork: Option<&Artwork>) -> Result<()> {
    tag.remove_picture_type(PictureType::CoverFront);
    let Some(art) = artwork.filter(|a| !a.data.is_empty()) else {
        return Ok(());
    };

    let same_image: Vec<usize> = tag
        .pictures()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.data() == art.data.as_slice())
        .map(|(i, _)| i)
        .collect();
    for index in same_image.into_iter().rev() {
        tag.remove_picture(index);
    }

    let mut picture = Picture::from_reader(&mut art.data.as_slice())
        .map_err(|e| Error::metadata(path, format!("Unsupported artwork: {}", e)))?;
    picture.set_pic_type(PictureType::CoverFront);
    tag.push_picture(picture);
    Ok(())
}

/// Write a tag set to `path` as a tag of `tag_type`.
///
/// Fields that are `None` are removed from the file.
pub fn write(path: &Path, tag_type: TagType, tags: &TagSet) -> Result<()> {
    let mut tagged_file = open(path)?;

    let tag_type = if tagged_file.file_type().supports_tag_type(tag_type) {
        tag_type
    } else {
        tagged_file.primary_tag_type()
    };

    // Get or create the tag
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| Error::metadata(path, format!("File does not support {:?} tags", tag_type)))?;

    apply_tagset(tag, tags);
    apply_artwork(path, tag, tags.artwork.as_ref())?;

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| Error::metadata(path, format!("Failed to write tags to file: {}", e)))?;

    tracing::debug!("Wrote {:?} tag to {}", tag_type, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_non_audio_file_returns_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "This is just some text, not music.").expect("Failed to write to temp file");

        let result = read(file.path());

        assert!(matches!(result, Err(Error::Metadata { .. })));
    }

    #[test]
    fn test_read_non_existent_file_returns_error() {
        let result = read(Path::new("non_existent_file.mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_write_to_non_audio_file_returns_error() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "Not an audio file").expect("Failed to write");

        let result = write(file.path(), TagType::Id3v2, &TagSet::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_tag_roundtrip_through_generic_tag() {
        let tags = TagSet {
            title: Some("Shine".to_string()),
            artist: Some("Spektrem".to_string()),
            album_artist: Some("Spektrem".to_string()),
            composer: Some(vec!["Jane Doe".to_string(), "John Roe".to_string()]),
            isrc: Some("GB2LD0901581".to_string()),
            track_number: Some(1),
            track_count: Some(2),
            ..Default::default()
        };

        let mut tag = Tag::new(TagType::VorbisComments);
        apply_tagset(&mut tag, &tags);
        let read_back = tag_to_tagset(&tag);

        assert_eq!(read_back, tags);
    }

    fn png() -> Vec<u8> {
        use image::{DynamicImage, ImageFormat, RgbImage};
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb([0, 120, 200])));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_non_front_picture_is_not_duplicated() {
        let data = png();
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.push_picture(Picture::from_reader(&mut data.as_slice()).unwrap());
        assert_eq!(tag.pictures()[0].pic_type(), PictureType::Other);

        let tags = tag_to_tagset(&tag);
        assert_eq!(tags.artwork.as_ref().map(|a| a.data.as_slice()), Some(data.as_slice()));

        apply_tagset(&mut tag, &tags);
        apply_artwork(Path::new("cover.flac"), &mut tag, tags.artwork.as_ref()).unwrap();

        assert_eq!(tag.pictures().len(), 1);
        assert_eq!(tag.pictures()[0].pic_type(), PictureType::CoverFront);
        assert_eq!(tag.pictures()[0].data(), data.as_slice());
    }

    #[test]
    fn test_unrelated_pictures_are_kept() {
        let mut tag = Tag::new(TagType::VorbisComments);
        let mut back = Picture::from_reader(&mut png().as_slice()).unwrap();
        back.set_pic_type(PictureType::CoverBack);
        tag.push_picture(back);

        let mut other = png();
        other.extend_from_slice(b"trailing");
        let front = Artwork::new(other, "image/png");
        apply_artwork(Path::new("cover.flac"), &mut tag, Some(&front)).unwrap();

        assert_eq!(tag.pictures().len(), 2);
    }

    #[test]
    fn test_absent_fields_are_removed() {
        let mut tag = Tag::new(TagType::VorbisComments);
        tag.insert_text(ItemKey::Genre, "House".to_string());
        tag.set_track(4);

        apply_tagset(&mut tag, &TagSet::default());

        assert!(tag.genre().is_none());
        assert!(tag.track().is_none());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
