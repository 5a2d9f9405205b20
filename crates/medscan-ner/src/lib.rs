//! Drug-name entity extraction for OCR text.
//!
//! Backends implement [`EntityExtractor`]: a local lexicon matcher
//! ([`GazetteerExtractor`]) and a client for a remote NER service
//! ([`HttpEntityExtractor`]). The resolver only consumes the first
//! `DRUG` entity, see [`first_drug`].

pub mod extraction;
pub mod gazetteer;
pub mod remote;

pub use extraction::*;
pub use gazetteer::*;
pub use remote::*;
