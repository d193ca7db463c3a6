//! Language version reconciliation
//!
//! A generated project references the compiler options file through a `None` item.
//! When that file asks for C# 10 or preview, the project's `LangVersion` setting is
//! rewritten to match so that IDEs analyze the code with the same language version
//! the compiler uses.

use std::borrow::Cow;

use crate::config::SyncConfig;
use crate::document::ProjectDocument;
use crate::error::SyncError;
use crate::parser::{scan_options, LangVersionRequest};
use crate::resolver::FileResolver;
use crate::schema::{Match, MsBuildSchema, DEFAULT_LANG_VERSION};

/// What a reconciliation did to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No `None` item references an options file
    NoReference,
    /// The options file does not request a language version
    NoOverride { options_path: String },
    /// `LangVersion` was set from the options file
    Updated {
        options_path: String,
        /// The previous value, `None` if the setting was created
        previous: Option<String>,
        version: LangVersionRequest,
    },
}

/// The result of reconciling one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<'a> {
    pub text: Cow<'a, str>,
    pub outcome: Outcome,
}

impl Reconciliation<'_> {
    /// Whether the returned text differs from the input
    pub fn is_changed(&self) -> bool {
        matches!(self.text, Cow::Owned(_))
    }

    pub fn into_text(self) -> String {
        self.text.into_owned()
    }
}

/// Keeps a project's `LangVersion` in line with its compiler options file
#[derive(Debug, Clone, Default)]
pub struct ProjectLangVersionSync {
    config: SyncConfig,
}

impl ProjectLangVersionSync {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Reconcile `text` and return the resulting document text
    pub fn reconcile(
        &self,
        text: &str,
        resolver: &impl FileResolver,
    ) -> Result<String, SyncError> {
        Ok(self.reconcile_with_report(text, resolver)?.into_text())
    }

    /// Reconcile `text`, reporting what was changed
    ///
    /// The input is returned borrowed whenever the resulting text is identical to it.
    pub fn reconcile_with_report<'a>(
        &self,
        text: &'a str,
        resolver: &impl FileResolver,
    ) -> Result<Reconciliation<'a>, SyncError> {
        let mut document = ProjectDocument::parse(text)?;
        let schema = MsBuildSchema::for_document(&document);

        let suffix = self.config.options_file_suffix.as_str();
        let options_path =
            match Match::classify(schema.none_includes_ending_with(&document, suffix)) {
                Match::None => {
                    tracing::debug!("No {} reference found", suffix);
                    return Ok(unchanged(text, Outcome::NoReference));
                }
                Match::Found(path) => path.to_string(),
                Match::Ambiguous(paths) => {
                    return Err(SyncError::AmbiguousReference {
                        paths: paths.into_iter().map(str::to_string).collect(),
                    });
                }
            };

        let lines = resolver
            .read_lines(&options_path)
            .map_err(|source| SyncError::missing_resource(&options_path, source))?;

        let Some(request) = scan_options(&lines).request() else {
            tracing::debug!("{} does not request a language version", options_path);
            return Ok(unchanged(text, Outcome::NoOverride { options_path }));
        };

        let previous = set_lang_version(&mut document, &schema, request)?;
        tracing::info!(
            "LangVersion {} -> {} (from {})",
            previous.as_deref().unwrap_or("<unset>"),
            request.project_value(),
            options_path
        );

        let output = document.serialize(self.config.line_ending.for_input(text));
        let text = if output == text {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(output)
        };

        Ok(Reconciliation {
            text,
            outcome: Outcome::Updated {
                options_path,
                previous,
                version: request,
            },
        })
    }
}

fn unchanged(text: &str, outcome: Outcome) -> Reconciliation<'_> {
    Reconciliation {
        text: Cow::Borrowed(text),
        outcome,
    }
}

/// Apply `request` to the single `LangVersion` element, creating it if needed
///
/// Returns the value the element had before, `None` if it was created.
fn set_lang_version(
    document: &mut ProjectDocument,
    schema: &MsBuildSchema,
    request: LangVersionRequest,
) -> Result<Option<String>, SyncError> {
    let (path, previous) = match Match::classify(document.paths_of(&schema.lang_version)) {
        Match::Found(path) => {
            let previous = document.element(&path).map(|el| el.text());
            (path, previous)
        }
        Match::None => (create_lang_version(document, schema)?, None),
        Match::Ambiguous(paths) => {
            return Err(SyncError::AmbiguousElement {
                name: schema.lang_version.local.to_string(),
                count: paths.len(),
            });
        }
    };

    if let Some(element) = document.element_mut(&path) {
        element.set_text(request.project_value());
    }
    Ok(previous)
}

/// Append a `LangVersion` with the default value to the first property group
fn create_lang_version(
    document: &mut ProjectDocument,
    schema: &MsBuildSchema,
) -> Result<Vec<usize>, SyncError> {
    let missing = || SyncError::MissingPropertyGroup {
        name: schema.property_group.local.to_string(),
    };

    let mut group_path = document
        .paths_of(&schema.property_group)
        .into_iter()
        .next()
        .ok_or_else(missing)?;
    let group = document.element_mut(&group_path).ok_or_else(missing)?;

    let mut setting = group.new_child(schema.lang_version.local, schema.namespace());
    setting.set_text(DEFAULT_LANG_VERSION);
    group.append_child(setting);

    let index = group
        .children()
        .iter()
        .rposition(|node| matches!(node, crate::document::Node::Element(_)))
        .ok_or_else(missing)?;
    group_path.push(index);
    Ok(group_path)
}

/// Reconcile `text` with the default settings
pub fn reconcile(text: &str, resolver: &impl FileResolver) -> Result<String, SyncError> {
    ProjectLangVersionSync::default().reconcile(text, resolver)
}
