//! Codec bindings for notebooks and notes.

use super::{
    binary_field, decode_text, encode_text, flag_from_int, flag_to_int, CodecResult, Helper,
    RecordCodec,
};
use crate::model::note::{Note, RawNote};
use crate::model::notebook::{Notebook, RawNotebook};

impl RecordCodec for Notebook {
    type Raw = RawNotebook;

    const BINARY_FIELDS: &'static [&'static str] = &["name"];

    fn encode(&self, helper: Helper<'_>) -> CodecResult<RawNotebook> {
        Ok(RawNotebook {
            id: self.id.clone(),
            creator_id: self.creator_id.clone(),
            name: encode_text(binary_field::<Self>("name"), &self.name, helper)?,
            public: flag_to_int(self.public),
            synced: flag_to_int(self.synced),
        })
    }

    fn parse(raw: &RawNotebook, helper: Helper<'_>) -> CodecResult<Self> {
        Ok(Self {
            id: raw.id.clone(),
            creator_id: raw.creator_id.clone(),
            name: decode_text(binary_field::<Self>("name"), &raw.name, helper)?,
            public: flag_from_int("public", raw.public)?,
            synced: flag_from_int("synced", raw.synced)?,
        })
    }
}

impl RecordCodec for Note {
    type Raw = RawNote;

    const BINARY_FIELDS: &'static [&'static str] = &["name", "content"];

    fn encode(&self, helper: Helper<'_>) -> CodecResult<RawNote> {
        Ok(RawNote {
            id: self.id.clone(),
            creator_id: self.creator_id.clone(),
            notebook_id: self.notebook_id.clone(),
            name: encode_text(binary_field::<Self>("name"), &self.name, helper)?,
            content: encode_text(binary_field::<Self>("content"), &self.content, helper)?,
            public: flag_to_int(self.public),
            synced: flag_to_int(self.synced),
        })
    }

    fn parse(raw: &RawNote, helper: Helper<'_>) -> CodecResult<Self> {
        Ok(Self {
            id: raw.id.clone(),
            creator_id: raw.creator_id.clone(),
            notebook_id: raw.notebook_id.clone(),
            name: decode_text(binary_field::<Self>("name"), &raw.name, helper)?,
            content: decode_text(binary_field::<Self>("content"), &raw.content, helper)?,
            public: flag_from_int("public", raw.public)?,
            synced: flag_from_int("synced", raw.synced)?,
        })
    }
}
