//! YAML transcoding: convert variant values to YAML text.
//!
//! Mapping:
//!   - Nil, Bool, Int, Real, String -> YAML scalars (.nan, .inf, -.inf)
//!   - Array, IntArray, StringArray -> YAML sequence
//!   - Dictionary                   -> YAML mapping (any key type)
//!   - ByteArray                    -> YAML !!binary (base64-encoded)
//!   - geometry, FloatArray         -> `!Name [ reals ]`
//!   - Vector2Array and friends     -> `!Name [ [ reals ], ... ]`
//!   - Image                        -> `!Image { width, height, mipmaps, format, data: !!binary }`
//!   - NodePath, Object, InputEvent -> `!Name "canonical text"`

use base64::prelude::*;
use libvartext::{Image, Value, WriteOptions};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Number, Value as YamlValue};

use super::{lower, Lowered};

/// Encode a value as a YAML string.
pub fn encode(value: &Value, options: &WriteOptions<'_>) -> Result<String, String> {
    let yaml_value = value_to_yaml(value, options);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn tagged(tag: &str, value: YamlValue) -> YamlValue {
    YamlValue::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag),
        value,
    }))
}

fn reals(values: &[f64]) -> YamlValue {
    YamlValue::Sequence(values.iter().map(|f| YamlValue::Number(Number::from(*f))).collect())
}

fn binary(bytes: &[u8]) -> YamlValue {
    tagged("!!binary", YamlValue::String(BASE64_STANDARD.encode(bytes)))
}

fn image_to_yaml(img: &Image) -> YamlValue {
    let mut map = Mapping::new();
    map.insert("width".into(), YamlValue::Number(img.width().into()));
    map.insert("height".into(), YamlValue::Number(img.height().into()));
    map.insert("mipmaps".into(), YamlValue::Number(img.mipmaps().into()));
    map.insert("format".into(), img.format().name().into());
    map.insert("data".into(), binary(img.data()));
    tagged("Image", YamlValue::Mapping(map))
}

fn value_to_yaml(value: &Value, options: &WriteOptions<'_>) -> YamlValue {
    let native = match lower(value, options) {
        Lowered::Reals(name, values) => return tagged(name, reals(&values)),
        Lowered::RealGroups(name, groups) => {
            return tagged(name, YamlValue::Sequence(groups.iter().map(|g| reals(g)).collect()))
        }
        Lowered::Text(name, text) => return tagged(name, YamlValue::String(text)),
        Lowered::Native(native) => native,
    };
    match native {
        Value::Nil => YamlValue::Null,
        Value::Bool(b) => YamlValue::Bool(*b),
        Value::Int(n) => YamlValue::Number(Number::from(*n)),
        Value::Real(f) => YamlValue::Number(Number::from(*f)),
        Value::String(s) => YamlValue::String(s.clone()),
        Value::Image(img) => image_to_yaml(img),
        Value::Dictionary(dict) => {
            let mut map = Mapping::new();
            for (k, v) in dict {
                map.insert(value_to_yaml(k, options), value_to_yaml(v, options));
            }
            YamlValue::Mapping(map)
        }
        Value::Array(arr) => {
            YamlValue::Sequence(arr.iter().map(|v| value_to_yaml(v, options)).collect())
        }
        Value::ByteArray(bytes) => binary(bytes),
        Value::IntArray(a) => {
            YamlValue::Sequence(a.iter().map(|n| YamlValue::Number(Number::from(*n))).collect())
        }
        Value::StringArray(a) => {
            YamlValue::Sequence(a.iter().map(|s| YamlValue::String(s.clone())).collect())
        }
        // Everything else was lowered above.
        other => YamlValue::String(libvartext::to_string(other)),
    }
}
