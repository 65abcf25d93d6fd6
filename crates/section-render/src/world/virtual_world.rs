//! `World` implementation backed by [`VirtualFilesystem`]

use chrono::{DateTime, Datelike, Timelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Array, Bytes, Datetime, Dict, Value};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, World};

use super::fonts::{global_font_cache, FontCache};
use super::virtual_fs::VirtualFilesystem;
use crate::error::RenderError;

/// A single-document compilation world
///
/// The JSON object passed as `inputs` is exposed to the source as
/// `sys.inputs`.
pub struct SectionWorld {
    filesystem: VirtualFilesystem,
    main: FileId,
    font_cache: &'static FontCache,
    library: LazyHash<Library>,
    time: DateTime<Utc>,
}

impl SectionWorld {
    pub fn new(source: String, inputs: &serde_json::Value) -> Result<Self, RenderError> {
        let mut filesystem = VirtualFilesystem::new();
        let main = filesystem.mount_main(source);

        let inputs = match json_to_value(inputs)? {
            Value::Dict(dict) => dict,
            Value::None => Dict::new(),
            _ => {
                return Err(RenderError::InvalidInput(
                    "template inputs must be a JSON object".to_string(),
                ))
            }
        };

        Ok(Self {
            filesystem,
            main,
            font_cache: global_font_cache(),
            library: LazyHash::new(Library::builder().with_inputs(inputs).build()),
            time: Utc::now(),
        })
    }

    /// Pin the clock used by `datetime.today()`
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn mount_file(&mut self, path: &str, content: Bytes) -> Result<FileId, RenderError> {
        self.filesystem.mount_file(path, content)
    }
}

fn json_to_value(json: &serde_json::Value) -> Result<Value, RenderError> {
    Ok(match json {
        serde_json::Value::Null => Value::None,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                return Err(RenderError::InvalidInput(format!("invalid number: {}", n)));
            }
        }
        serde_json::Value::String(s) => Value::Str(s.as_str().into()),
        serde_json::Value::Array(items) => {
            let items = items
                .iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(Array::from(items.as_slice()))
        }
        serde_json::Value::Object(map) => {
            let mut dict = Dict::new();
            for (key, value) in map {
                dict.insert(key.as_str().into(), json_to_value(value)?);
            }
            Value::Dict(dict)
        }
    })
}

impl World for SectionWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        self.font_cache.book()
    }

    fn main(&self) -> FileId {
        self.main
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        self.filesystem
            .source(id)
            .ok_or_else(|| FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        self.filesystem
            .file(id)
            .cloned()
            .ok_or_else(|| FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.font_cache.font(index)
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let adjusted = self.time + chrono::Duration::hours(offset.unwrap_or(0));
        Datetime::from_ymd_hms(
            adjusted.year(),
            adjusted.month() as u8,
            adjusted.day() as u8,
            adjusted.hour() as u8,
            adjusted.minute() as u8,
            adjusted.second() as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_world_exposes_main_source() {
        let world = SectionWorld::new("Hello".to_string(), &json!({})).unwrap();
        assert!(world.source(world.main()).is_ok());
    }

    #[test]
    fn test_non_object_inputs_rejected() {
        let result = SectionWorld::new("x".to_string(), &json!([1, 2]));
        assert!(matches!(result, Err(RenderError::InvalidInput(_))));
    }

    #[test]
    fn test_nested_inputs_convert() {
        let value = json_to_value(&json!({"rows": [["a", 1], ["b", 2.5]], "flag": null})).unwrap();
        match value {
            Value::Dict(dict) => {
                assert!(dict.contains("rows"));
                assert!(dict.contains("flag"));
            }
            other => panic!("expected dict, got {:?}", other),
        }
    }

    #[test]
    fn test_pinned_clock() {
        let time = Utc.with_ymd_and_hms(2024, 3, 31, 10, 0, 0).unwrap();
        let world = SectionWorld::new("x".to_string(), &json!({}))
            .unwrap()
            .with_time(time);
        assert!(world.today(Some(5)).is_some());
    }
}
