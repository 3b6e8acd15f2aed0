//! Lenient typing of the raw `data` payload, applied before validation.
//!
//! Clients send coordinates as strings (`"50.9"`) and difficulty codes as
//! numbers (`1`). Every known scalar field is normalized in place to the type
//! the payload structs expect. A value that cannot be read as that type is
//! removed and reported against its dotted path, so the rest of the payload
//! is still validated and all violations come back together.

use serde_json::{Map, Number, Value};

use crate::error::FieldErrors;

pub const MSG_EXPECTED_NUMBER: &str = "Требуется численное значение.";
pub const MSG_EXPECTED_INTEGER: &str = "Значение должно быть целым числом.";
pub const MSG_INTEGER_OUT_OF_RANGE: &str = "Значение вне допустимого диапазона.";
pub const MSG_EXPECTED_STRING: &str = "Некорректная строка.";
pub const MSG_EXPECTED_OBJECT: &str = "Ожидался объект.";
pub const MSG_EXPECTED_LIST: &str = "Ожидался список.";

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// Number or numeric string.
    Float,
    /// Whole number or numeric string, `i64`.
    Integer,
    /// Whole number or numeric string that must fit `i32`.
    SmallInteger,
    /// String; numbers are converted to their decimal text.
    Text,
    /// Like `Text`, but `null` means blank.
    Code,
}

const USER_FIELDS: &[(&str, Kind)] = &[
    ("email", Kind::Text),
    ("first_name", Kind::Text),
    ("last_name", Kind::Text),
    ("patronymic", Kind::Text),
    ("phone", Kind::Text),
];

const AREA_FIELDS: &[(&str, Kind)] = &[("title", Kind::Text), ("parent_id", Kind::Integer)];

const PEREVAL_FIELDS: &[(&str, Kind)] = &[
    ("beauty_title", Kind::Text),
    ("title", Kind::Text),
    ("other_titles", Kind::Text),
    ("connect", Kind::Text),
];

const COORDS_FIELDS: &[(&str, Kind)] = &[
    ("latitude", Kind::Float),
    ("longitude", Kind::Float),
    ("height", Kind::SmallInteger),
];

const LEVEL_FIELDS: &[(&str, Kind)] = &[
    ("winter", Kind::Code),
    ("summer", Kind::Code),
    ("autumn", Kind::Code),
    ("spring", Kind::Code),
];

const IMAGE_FIELDS: &[(&str, Kind)] = &[("title", Kind::Text)];

/// Normalize the payload object in place and return the type errors found.
pub(crate) fn coerce_payload(root: &mut Map<String, Value>) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(user) = section(root, "user", "user", &mut errors) {
        coerce_fields(user, "user", USER_FIELDS, &mut errors);
    }
    if let Some(area) = section(root, "area", "area", &mut errors) {
        coerce_fields(area, "area", AREA_FIELDS, &mut errors);
    }
    if let Some(pereval) = section(root, "pereval", "pereval", &mut errors) {
        coerce_fields(pereval, "pereval", PEREVAL_FIELDS, &mut errors);
        if let Some(coords) = section(pereval, "coords", "pereval.coords", &mut errors) {
            coerce_fields(coords, "pereval.coords", COORDS_FIELDS, &mut errors);
        }
        if let Some(level) = section(pereval, "level", "pereval.level", &mut errors) {
            coerce_fields(level, "pereval.level", LEVEL_FIELDS, &mut errors);
        }
        coerce_images(pereval, &mut errors);
    }

    errors
}

/// The nested object under `key`. `null` is dropped so defaults apply; any
/// other non-object is dropped and reported.
fn section<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut FieldErrors,
) -> Option<&'a mut Map<String, Value>> {
    match parent.get(key).map(Value::is_object) {
        None => None,
        Some(true) => parent.get_mut(key).and_then(Value::as_object_mut),
        Some(false) => {
            if parent.remove(key).is_some_and(|value| !value.is_null()) {
                reject(errors, path, MSG_EXPECTED_OBJECT);
            }
            None
        }
    }
}

fn coerce_fields(
    object: &mut Map<String, Value>,
    prefix: &str,
    fields: &[(&str, Kind)],
    errors: &mut FieldErrors,
) {
    for &(name, kind) in fields {
        let Some(value) = object.get(name) else {
            continue;
        };
        match coerce(value, kind) {
            Ok(coerced) => {
                object.insert(name.to_string(), coerced);
            }
            Err(message) => {
                object.remove(name);
                reject(errors, &format!("{prefix}.{name}"), message);
            }
        }
    }
}

fn coerce_images(pereval: &mut Map<String, Value>, errors: &mut FieldErrors) {
    if !pereval.get("images").is_some_and(Value::is_array) {
        if pereval.remove("images").is_some_and(|value| !value.is_null()) {
            reject(errors, "pereval.images", MSG_EXPECTED_LIST);
        }
        return;
    }

    let Some(Value::Array(items)) = pereval.get_mut("images") else {
        return;
    };
    for (index, item) in items.iter_mut().enumerate() {
        let path = format!("pereval.images[{index}]");
        match item {
            Value::Object(image) => coerce_fields(image, &path, IMAGE_FIELDS, errors),
            other => {
                reject(errors, &path, MSG_EXPECTED_OBJECT);
                *other = Value::Object(Map::new());
            }
        }
    }
}

fn coerce(value: &Value, kind: Kind) -> Result<Value, &'static str> {
    if value.is_null() {
        return Ok(match kind {
            Kind::Code => Value::String(String::new()),
            _ => Value::Null,
        });
    }

    match kind {
        Kind::Float => read_float(value)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(MSG_EXPECTED_NUMBER),
        Kind::Integer | Kind::SmallInteger => {
            let number = read_integer(value).ok_or(MSG_EXPECTED_INTEGER)?;
            if kind == Kind::SmallInteger && i32::try_from(number).is_err() {
                return Err(MSG_INTEGER_OUT_OF_RANGE);
            }
            Ok(Value::from(number))
        }
        Kind::Text | Kind::Code => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) => Ok(Value::String(number.to_string())),
            _ => Err(MSG_EXPECTED_STRING),
        },
    }
}

fn read_float(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn read_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// `number` as an integer when it has no fractional part.
fn integral(number: f64) -> Option<i64> {
    (number.is_finite() && number.fract() == 0.0 && number.abs() <= MAX_EXACT_INTEGER)
        .then(|| number as i64)
}

fn reject(errors: &mut FieldErrors, path: &str, message: &str) {
    errors
        .entry(path.to_string())
        .or_default()
        .push(message.to_string());
}
