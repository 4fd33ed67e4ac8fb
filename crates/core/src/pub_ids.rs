//! Public identifiers form: edit the publisher-assigned id of a
//! publishable object.
//!
//! Flow: [`PublicIdentifiersForm::init_data`] or
//! [`PublicIdentifiersForm::read_input`], then
//! [`PublicIdentifiersForm::validate`], then
//! [`PublicIdentifiersForm::execute`]. The caller persists the returned
//! object.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::assoc::AssocType;
use crate::error::CoreError;
use crate::types::DbId;

/// Pub id type of the publisher-assigned identifier.
pub const PUB_ID_TYPE_PUBLISHER_ID: &str = "publisher-id";

pub const FIELD_PUBLISHER_ID: &str = "publisher_id";

pub const ERR_NUMERIC_NOT_ALLOWED: &str = "editor.publicIdentificationNumericNotAllowed";
pub const ERR_PATTERN_NOT_ALLOWED: &str = "editor.publicIdentificationPatternNotAllowed";
pub const ERR_EXISTS_FOR_SAME_TYPE: &str = "editor.publicIdentificationExistsForTheSameType";
pub const ERR_TOO_LONG: &str = "validator.maxLength";

/// Longest identifier the store accepts, in characters.
pub const PUB_ID_MAX_LENGTH: usize = 255;

/// Submission-file ids look like `<fileId>-<revision>`; a publisher id of
/// that shape would be ambiguous in URLs.
static FILE_ID_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-(\d+)$").expect("valid regex"));

/// Objects that can carry public identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PubObjectKind {
    Submission,
    Publication,
    Representation,
    SubmissionFile,
    Issue,
    Chapter,
}

impl PubObjectKind {
    pub fn assoc_type(self) -> AssocType {
        match self {
            Self::Submission => AssocType::Submission,
            Self::Publication => AssocType::Publication,
            Self::Representation => AssocType::Representation,
            Self::SubmissionFile => AssocType::SubmissionFile,
            Self::Issue => AssocType::Issue,
            Self::Chapter => AssocType::Chapter,
        }
    }

    /// Parse the URL slug used by the API (`submission`, `submission-file`, ...).
    pub fn from_slug(slug: &str) -> Option<Self> {
        let kind = match slug {
            "submission" => Self::Submission,
            "publication" => Self::Publication,
            "representation" => Self::Representation,
            "submission-file" => Self::SubmissionFile,
            "issue" => Self::Issue,
            "chapter" => Self::Chapter,
            _ => return None,
        };
        Some(kind)
    }

    /// Kinds whose form view links back to the owning submission.
    fn links_to_submission(self) -> bool {
        matches!(self, Self::Representation | Self::Chapter)
    }
}

/// A publishable object and the identifiers stored on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubObject {
    pub kind: PubObjectKind,
    pub id: DbId,
    /// Owning submission, when the object belongs to one.
    pub submission_id: Option<DbId>,
    /// Pub id type -> value.
    pub stored_pub_ids: BTreeMap<String, String>,
}

impl PubObject {
    pub fn new(kind: PubObjectKind, id: DbId) -> Self {
        Self {
            kind,
            id,
            submission_id: None,
            stored_pub_ids: BTreeMap::new(),
        }
    }

    pub fn stored_pub_id(&self, pub_id_type: &str) -> Option<&str> {
        self.stored_pub_ids.get(pub_id_type).map(String::as_str)
    }

    /// Store a pub id; an empty value removes it.
    pub fn set_stored_pub_id(&mut self, pub_id_type: &str, value: Option<&str>) {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => {
                self.stored_pub_ids
                    .insert(pub_id_type.to_string(), v.to_string());
            }
            None => {
                self.stored_pub_ids.remove(pub_id_type);
            }
        }
    }
}

/// Lookup of identifiers already in use within a context.
#[async_trait]
pub trait PubIdRegistry: Send + Sync {
    /// Whether any object in the context already uses `pub_id` as a
    /// `pub_id_type`, ignoring the object `(assoc_type, exclude_id)` itself.
    /// With `for_same_type`, only objects of `assoc_type` are considered.
    async fn any_pub_id_exists(
        &self,
        context_id: DbId,
        pub_id_type: &str,
        pub_id: &str,
        assoc_type: AssocType,
        exclude_id: DbId,
        for_same_type: bool,
    ) -> Result<bool, CoreError>;
}

/// A validation failure on one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    /// Locale key of the message.
    pub message: String,
    pub params: BTreeMap<String, String>,
}

impl FieldError {
    fn new(field: &str, message: &str, params: &[(&str, &str)]) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Errors collected while validating a form, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn add(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Values submitted by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PubIdsInput {
    pub publisher_id: Option<String>,
}

/// Template-free description of the form for the client.
#[derive(Debug, Clone, Serialize)]
pub struct PubIdsFormView {
    pub context_id: DbId,
    pub pub_object: PubObject,
    pub stage_id: Option<i32>,
    pub form_params: Option<serde_json::Value>,
    pub publisher_id: Option<String>,
    /// Set for representations and chapters.
    pub submission_id: Option<DbId>,
}

/// Check the format rules that need no lookup.
///
/// Returns the first rule the value breaks.
pub fn check_publisher_id_format(kind: PubObjectKind, publisher_id: &str) -> Option<FieldError> {
    if publisher_id.chars().count() > PUB_ID_MAX_LENGTH {
        return Some(FieldError::new(
            FIELD_PUBLISHER_ID,
            ERR_TOO_LONG,
            &[("length", PUB_ID_MAX_LENGTH.to_string().as_str())],
        ));
    }
    if publisher_id.bytes().all(|b| b.is_ascii_digit()) {
        return Some(FieldError::new(
            FIELD_PUBLISHER_ID,
            ERR_NUMERIC_NOT_ALLOWED,
            &[("publicIdentifier", publisher_id)],
        ));
    }
    if publisher_id.contains('/') {
        return Some(FieldError::new(
            FIELD_PUBLISHER_ID,
            ERR_PATTERN_NOT_ALLOWED,
            &[("pattern", "\"/\"")],
        ));
    }
    if kind == PubObjectKind::SubmissionFile && FILE_ID_LIKE_RE.is_match(publisher_id) {
        return Some(FieldError::new(
            FIELD_PUBLISHER_ID,
            ERR_PATTERN_NOT_ALLOWED,
            &[("pattern", r"'/^(\d+)-(\d+)$/' i.e. 'number-number'")],
        ));
    }
    None
}

/// Edits the publisher id of one object within a context.
#[derive(Debug, Clone)]
pub struct PublicIdentifiersForm {
    context_id: DbId,
    pub_object: PubObject,
    stage_id: Option<i32>,
    form_params: Option<serde_json::Value>,
    publisher_id: Option<String>,
    errors: FormErrors,
}

impl PublicIdentifiersForm {
    pub fn new(
        context_id: DbId,
        pub_object: PubObject,
        stage_id: Option<i32>,
        form_params: Option<serde_json::Value>,
    ) -> Self {
        Self {
            context_id,
            pub_object,
            stage_id,
            form_params,
            publisher_id: None,
            errors: FormErrors::default(),
        }
    }

    pub fn context_id(&self) -> DbId {
        self.context_id
    }

    pub fn pub_object(&self) -> &PubObject {
        &self.pub_object
    }

    pub fn stage_id(&self) -> Option<i32> {
        self.stage_id
    }

    pub fn form_params(&self) -> Option<&serde_json::Value> {
        self.form_params.as_ref()
    }

    pub fn publisher_id(&self) -> Option<&str> {
        self.publisher_id.as_deref()
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// The assoc type the object's identifiers are checked against.
    pub fn assoc_type(&self) -> AssocType {
        self.pub_object.kind.assoc_type()
    }

    /// Load the current values from the object.
    pub fn init_data(&mut self) {
        self.publisher_id = self
            .pub_object
            .stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID)
            .map(str::to_string);
    }

    /// Take the user's values. Surrounding whitespace is dropped.
    pub fn read_input(&mut self, input: PubIdsInput) {
        self.publisher_id = input
            .publisher_id
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
    }

    /// Validate the submitted values, collecting errors per field.
    ///
    /// Returns `true` when the form is valid.
    pub async fn validate<R>(&mut self, registry: &R) -> Result<bool, CoreError>
    where
        R: PubIdRegistry + ?Sized,
    {
        self.errors.clear();

        if let Some(publisher_id) = self.publisher_id.as_deref() {
            if let Some(error) = check_publisher_id_format(self.pub_object.kind, publisher_id) {
                self.errors.add(error);
            } else if registry
                .any_pub_id_exists(
                    self.context_id,
                    PUB_ID_TYPE_PUBLISHER_ID,
                    publisher_id,
                    self.assoc_type(),
                    self.pub_object.id,
                    true,
                )
                .await?
            {
                self.errors.add(FieldError::new(
                    FIELD_PUBLISHER_ID,
                    ERR_EXISTS_FOR_SAME_TYPE,
                    &[("publicIdentifier", publisher_id)],
                ));
            }
        }

        Ok(self.errors.is_empty())
    }

    /// Record that the store refused the publisher id as taken, after
    /// another object claimed it between validation and saving.
    pub fn reject_taken_publisher_id(&mut self) -> &FormErrors {
        self.errors.clear();
        let publisher_id = self.publisher_id.clone().unwrap_or_default();
        self.errors.add(FieldError::new(
            FIELD_PUBLISHER_ID,
            ERR_EXISTS_FOR_SAME_TYPE,
            &[("publicIdentifier", publisher_id.as_str())],
        ));
        &self.errors
    }

    /// Apply the values to the object and return it for persisting.
    pub fn execute(&mut self) -> &PubObject {
        let publisher_id = self.publisher_id.clone();
        self.pub_object
            .set_stored_pub_id(PUB_ID_TYPE_PUBLISHER_ID, publisher_id.as_deref());
        &self.pub_object
    }

    /// Remove a stored pub id of the given type from the object.
    pub fn clear_pub_id(&mut self, pub_id_type: &str) -> &PubObject {
        self.pub_object.set_stored_pub_id(pub_id_type, None);
        if pub_id_type == PUB_ID_TYPE_PUBLISHER_ID {
            self.publisher_id = None;
        }
        &self.pub_object
    }

    pub fn view(&self) -> PubIdsFormView {
        PubIdsFormView {
            context_id: self.context_id,
            pub_object: self.pub_object.clone(),
            stage_id: self.stage_id,
            form_params: self.form_params.clone(),
            publisher_id: self.publisher_id.clone(),
            submission_id: self
                .pub_object
                .kind
                .links_to_submission()
                .then_some(self.pub_object.submission_id)
                .flatten(),
        }
    }
}
