//! Parsing and validation of the composite `{user, area, pereval}` payload
//! carried in the `data` form field, plus the image-count rules applied by
//! the create and update endpoints.
//!
//! The raw payload structs mirror the wire format with every field optional so
//! that a missing value is reported against its own field path instead of
//! aborting deserialization. Scalars are first normalized by
//! [`crate::coercion`]. Once every rule passes, the payload is converted into
//! [`SubmitData`] whose fields are no longer optional and whose names are
//! trimmed.

use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::coercion::{coerce_payload, MSG_EXPECTED_OBJECT};
use crate::error::{CoreError, FieldErrors};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const MSG_MALFORMED_JSON: &str = "Некорректный формат JSON в поле data";
pub const MSG_IMAGE_COUNT_MISMATCH: &str =
    "Количество загруженных файлов не совпадает с количеством заголовков";
pub const MSG_IMAGES_MISSING: &str = "Файлы изображений не переданы";
pub const MSG_BLANK_TITLE: &str = "Название перевала не может быть пустым";
pub const MSG_BLANK_FIELD: &str = "Поле не может состоять только из пробелов.";

/// Key for errors that cannot be attributed to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SubmitPayload {
    #[validate(nested)]
    pub user: UserPayload,
    #[validate(nested)]
    pub area: AreaPayload,
    #[validate(nested)]
    pub pereval: PerevalPayload,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserPayload {
    #[validate(
        required(message = "Обязательное поле."),
        length(min = 1, max = 254, message = "Email должен содержать от 1 до 254 символов."),
        email(message = "Введите правильный адрес электронной почты.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Обязательное поле."),
        length(min = 1, max = 150, message = "Поле first_name должно содержать от 1 до 150 символов."),
        custom(function = not_blank)
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "Обязательное поле."),
        length(min = 1, max = 150, message = "Поле last_name должно содержать от 1 до 150 символов."),
        custom(function = not_blank)
    )]
    pub last_name: Option<String>,
    #[validate(length(max = 150, message = "Не более 150 символов."))]
    pub patronymic: Option<String>,
    #[validate(length(max = 20, message = "Не более 20 символов."))]
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AreaPayload {
    #[validate(
        required(message = "Обязательное поле."),
        length(min = 1, max = 255, message = "Поле title должно содержать от 1 до 255 символов."),
        custom(function = not_blank)
    )]
    pub title: Option<String>,
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PerevalPayload {
    #[validate(length(max = 50, message = "Не более 50 символов."))]
    pub beauty_title: Option<String>,
    #[validate(
        required(message = "Обязательное поле."),
        length(min = 1, max = 255, message = "Название должно содержать от 1 до 255 символов."),
        custom(function = title_not_blank)
    )]
    pub title: Option<String>,
    #[validate(length(max = 255, message = "Не более 255 символов."))]
    pub other_titles: Option<String>,
    pub connect: Option<String>,
    #[validate(nested)]
    pub coords: CoordsPayload,
    pub level: LevelData,
    #[validate(nested)]
    pub images: Vec<ImageMeta>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CoordsPayload {
    #[validate(
        required(message = "Обязательное поле."),
        range(min = -90.0, max = 90.0, message = "Широта должна быть в диапазоне от -90 до 90")
    )]
    pub latitude: Option<f64>,
    #[validate(
        required(message = "Обязательное поле."),
        range(min = -180.0, max = 180.0, message = "Долгота должна быть в диапазоне от -180 до 180")
    )]
    pub longitude: Option<f64>,
    #[validate(
        required(message = "Обязательное поле."),
        range(min = 0, message = "Высота не может быть отрицательной")
    )]
    pub height: Option<i32>,
}

/// Seasonal difficulty ratings. Free-form codes, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub winter: String,
    pub summer: String,
    pub autumn: String,
    pub spring: String,
}

/// Metadata for one uploaded image, paired by position with the uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct ImageMeta {
    #[validate(length(max = 255, message = "Не более 255 символов."))]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated composite
// ---------------------------------------------------------------------------

/// A fully validated submission.
#[derive(Debug, Clone)]
pub struct SubmitData {
    pub user: UserData,
    pub area: AreaData,
    pub pereval: PerevalData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaData {
    pub title: String,
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub latitude: f64,
    pub longitude: f64,
    pub height: i32,
}

#[derive(Debug, Clone)]
pub struct PerevalData {
    pub beauty_title: Option<String>,
    pub title: String,
    pub other_titles: Option<String>,
    pub connect: Option<String>,
    pub coords: Coords,
    pub level: LevelData,
    pub images: Vec<ImageMeta>,
}

/// Parse the raw `data` field and validate every rule, reporting all violations at once.
pub fn parse_submission(raw: &str) -> Result<SubmitData, CoreError> {
    let mut value: Value = serde_json::from_str(raw)
        .map_err(|_| CoreError::MalformedPayload(MSG_MALFORMED_JSON.to_string()))?;

    let Some(root) = value.as_object_mut() else {
        return Err(non_field_error(MSG_EXPECTED_OBJECT));
    };
    let type_errors = coerce_payload(root);

    let payload: SubmitPayload =
        serde_json::from_value(value).map_err(|e| non_field_error(&e.to_string()))?;

    let mut errors = FieldErrors::new();
    if let Err(violations) = payload.validate() {
        flatten_errors("", &violations, &mut errors);
    }

    // A value dropped for its type also fails `required`; report only the type.
    for (path, messages) in type_errors {
        errors.retain(|key, _| !is_within(key, &path));
        errors.insert(path, messages);
    }

    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors));
    }

    Ok(payload.into_validated())
}

fn non_field_error(message: &str) -> CoreError {
    let mut errors = FieldErrors::new();
    errors.insert(NON_FIELD_ERRORS.to_string(), vec![message.to_string()]);
    CoreError::InvalidFields(errors)
}

/// Whether `key` is `path` itself or a field nested under it.
fn is_within(key: &str, path: &str) -> bool {
    key.strip_prefix(path)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
}

/// Whitespace-only values. Empty strings are left to the length rule.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    reject_blank(value, MSG_BLANK_FIELD)
}

fn title_not_blank(value: &str) -> Result<(), ValidationError> {
    reject_blank(value, MSG_BLANK_TITLE)
}

fn reject_blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

/// Flatten nested `validator` errors into dotted field paths.
fn flatten_errors(prefix: &str, violations: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in violations.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.entry(path).or_default().extend(errs.iter().map(describe));
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_errors(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn describe(err: &ValidationError) -> String {
    match &err.message {
        Some(message) => message.to_string(),
        None => err.code.to_string(),
    }
}

impl SubmitPayload {
    /// Only called after validation succeeded, so every required field is present.
    fn into_validated(self) -> SubmitData {
        let SubmitPayload {
            user,
            area,
            pereval,
        } = self;

        SubmitData {
            user: UserData {
                email: trimmed(user.email),
                first_name: trimmed(user.first_name),
                last_name: trimmed(user.last_name),
                patronymic: user.patronymic.map(|v| v.trim().to_string()),
                phone: user.phone.map(|v| v.trim().to_string()),
            },
            area: AreaData {
                title: trimmed(area.title),
                parent_id: area.parent_id,
            },
            pereval: PerevalData {
                beauty_title: pereval.beauty_title,
                title: trimmed(pereval.title),
                other_titles: pereval.other_titles,
                connect: pereval.connect,
                coords: Coords {
                    latitude: pereval.coords.latitude.unwrap_or_default(),
                    longitude: pereval.coords.longitude.unwrap_or_default(),
                    height: pereval.coords.height.unwrap_or_default(),
                },
                level: pereval.level,
                images: pereval.images,
            },
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

// ---------------------------------------------------------------------------
// Image count rules
// ---------------------------------------------------------------------------

/// Create path: when metadata is declared, the uploaded file count must match it.
pub fn check_submit_images(declared: usize, uploaded: usize) -> Result<(), CoreError> {
    if declared > 0 && declared != uploaded {
        return Err(CoreError::Validation(MSG_IMAGE_COUNT_MISMATCH.to_string()));
    }
    Ok(())
}

/// Update path: declared metadata requires at least one file and an exact count match.
pub fn check_update_images(declared: usize, uploaded: usize) -> Result<(), CoreError> {
    if declared > 0 && uploaded == 0 {
        return Err(CoreError::Validation(MSG_IMAGES_MISSING.to_string()));
    }
    check_submit_images(declared, uploaded)
}
