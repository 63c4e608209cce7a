use std::fmt;

/// Build-time failures raised while constructing a library or composing a
/// program. Every failure aborts the affected build; no partial GLSL is
/// produced.
///
/// `Display` and `Error` are implemented by hand because several variants
/// carry a field named `source` that holds a wiring source name, not an
/// error cause; `#[derive(thiserror::Error)]` would treat it as the error
/// source and fail to compile for `String`.
#[derive(Debug)]
pub enum ComposeError {
    MissingProvider {
        node: String,
        effect: String,
    },

    DuplicateProvider {
        effect: String,
        first: String,
        second: String,
    },

    CyclicRequirement {
        path: Vec<String>,
    },

    UnboundAttribute {
        name: String,
    },

    UnsupportedOutputType {
        output: String,
        source: String,
        ty: String,
    },

    MissingOutputSource {
        output: String,
        source: String,
    },
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::MissingProvider { node, effect } => {
                write!(f, "no node provides effect '{effect}' required by '{node}'")
            }
            ComposeError::DuplicateProvider {
                effect,
                first,
                second,
            } => {
                write!(
                    f,
                    "effect '{effect}' is provided by both '{first}' and '{second}'"
                )
            }
            ComposeError::CyclicRequirement { path } => {
                write!(f, "cyclic requirement through nodes: {}", path.join(" -> "))
            }
            ComposeError::UnboundAttribute { name } => {
                write!(f, "attribute '{name}' has no fixed binding location")
            }
            ComposeError::UnsupportedOutputType { output, source, ty } => {
                write!(
                    f,
                    "output '{output}' is wired to '{source}' of unsupported type '{ty}'"
                )
            }
            ComposeError::MissingOutputSource { output, source } => {
                write!(
                    f,
                    "output '{output}' is wired to '{source}', which no resolved dependency produces"
                )
            }
        }
    }
}

impl std::error::Error for ComposeError {}
