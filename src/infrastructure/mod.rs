// Infrastructure layer: plist codec, format conversion, file system adapters, eventing
pub mod backup;
pub mod converter;
pub mod event_ndjson;
pub mod locator;
pub mod plist_codec;
