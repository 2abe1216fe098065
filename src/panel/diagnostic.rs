//! Structured diagnostics for configuration processing and text conversion.

/// Stage of the pipeline that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticPhase {
    Catalog,
    Document,
    Register,
    Field,
    Codec,
}

/// Severity of a panel diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// Points a diagnostic at a register entry and optionally one of its field
/// configs. `raw` carries the offending source text verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticContext {
    pub register: String,
    pub field_index: Option<usize>,
    pub raw: Option<String>,
}

impl DiagnosticContext {
    pub fn register(key: impl Into<String>) -> Self {
        Self {
            register: key.into(),
            field_index: None,
            raw: None,
        }
    }

    pub fn field(key: impl Into<String>, index: usize) -> Self {
        Self {
            register: key.into(),
            field_index: Some(index),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// Structured diagnostic record; configuration errors are collected rather
/// than aborting the surrounding register or module.
#[derive(Debug, Clone)]
pub struct PanelDiagnostic {
    pub phase: DiagnosticPhase,
    pub level: DiagnosticLevel,
    pub code: &'static str,
    pub message: String,
    pub context: Option<DiagnosticContext>,
}

impl PanelDiagnostic {
    pub fn new(
        phase: DiagnosticPhase,
        level: DiagnosticLevel,
        code: &'static str,
        message: impl Into<String>,
        context: Option<DiagnosticContext>,
    ) -> Self {
        Self {
            phase,
            level,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(
        phase: DiagnosticPhase,
        code: &'static str,
        message: impl Into<String>,
        context: DiagnosticContext,
    ) -> Self {
        Self::new(phase, DiagnosticLevel::Error, code, message, Some(context))
    }

    pub fn warning(
        phase: DiagnosticPhase,
        code: &'static str,
        message: impl Into<String>,
        context: DiagnosticContext,
    ) -> Self {
        Self::new(phase, DiagnosticLevel::Warning, code, message, Some(context))
    }

    pub fn format_human(&self) -> String {
        let location = match &self.context {
            Some(ctx) => {
                let mut loc = format!("reg[{}]", ctx.register);
                if let Some(index) = ctx.field_index {
                    loc.push_str(&format!(".item[{index}]"));
                }
                if let Some(raw) = &ctx.raw {
                    loc.push_str(&format!(" '{raw}'"));
                }
                loc
            }
            None => "<document>".to_string(),
        };
        format!(
            "{level:?} {code}: {message} @ {location}",
            level = self.level,
            code = self.code,
            message = self.message,
            location = location
        )
    }
}
