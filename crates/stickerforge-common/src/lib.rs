//! Stickerforge-Common: Shared media types.
//!
//! This crate provides the media vocabulary used across stickerforge:
//!
//! - **MediaBlob**: an immutable, resolved media payload with its MIME type
//! - **MediaKind**: static / animated / other classification of a MIME type
//! - **MIME helpers**: normalization of `Content-Type` style values
//!
//! # Examples
//!
//! ```
//! use stickerforge_common::{MediaBlob, MediaKind};
//!
//! let blob = MediaBlob::new(vec![0u8; 4], "image/GIF", "party.gif");
//! assert_eq!(blob.mime_type(), "image/gif");
//! assert_eq!(blob.kind(), MediaKind::Animated);
//! ```

pub mod media;

pub use media::{normalize_mime, MediaBlob, MediaKind};
