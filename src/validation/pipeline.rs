//! The per-field validation pipeline.
//!
//! # Responsibilities
//! - Compile `Rules` against a vocabulary into runnable steps
//! - Run each field's steps against a fresh `FieldState`
//! - Collect the converted value or the first resolved error per field
//!
//! # Design Decisions
//! - `name:arg` steps get their argument as the value; bare steps get the
//!   trimmed form input, read again for every step
//! - After a bare step, an unset working value defaults to the raw input
//! - The skip flag is checked before each step: when set it is cleared and
//!   the field stops, leaving it out of the data map
//! - Any error discards the data map

use crate::form::{FormData, FormError, FormFile, FormSource, Value};
use crate::observability::metrics;
use crate::validation::errors::{FieldErrors, Overrides, RuleError, Validated};
use crate::validation::registry::{Rule, Vocabulary};
use crate::validation::rules::Rules;
use crate::validation::validators::ValidatorError;

/// Mutable state of one field during one validation call.
#[derive(Debug, Default)]
pub struct FieldState {
    working: Option<Value>,
    skip_remaining: bool,
}

/// What a validator can see and change.
pub struct RuleContext<'a> {
    source: &'a dyn FormSource,
    state: &'a mut FieldState,
}

impl<'a> RuleContext<'a> {
    pub fn new(source: &'a dyn FormSource, state: &'a mut FieldState) -> Self {
        Self { source, state }
    }

    /// Raw value of any field, straight from the form.
    pub fn get(&self, key: &str) -> &str {
        self.source.get(key)
    }

    pub fn get_file(&self, key: &str) -> Result<&FormFile, FormError> {
        self.source.get_file(key)
    }

    pub fn working(&self) -> Option<&Value> {
        self.state.working.as_ref()
    }

    pub fn set_working(&mut self, value: Value) {
        self.state.working = Some(value);
    }

    pub fn skip_remaining(&self) -> bool {
        self.state.skip_remaining
    }

    pub fn set_skip_remaining(&mut self, skip: bool) {
        self.state.skip_remaining = skip;
    }
}

#[derive(Debug, Clone)]
struct Step {
    rule: Rule,
    argument: Option<String>,
}

#[derive(Debug, Clone)]
struct CompiledField {
    name: String,
    steps: Vec<Step>,
}

/// Rules resolved against a vocabulary, ready to validate many forms.
#[derive(Debug, Clone)]
pub struct Schema {
    vocabulary: Vocabulary,
    fields: Vec<CompiledField>,
    overrides: Overrides,
}

impl Schema {
    /// Parse every field's rules and resolve every rule name.
    pub fn compile(rules: &Rules, vocabulary: Vocabulary) -> Result<Self, RuleError> {
        let fields = rules
            .iter()
            .map(|(name, spec)| {
                let steps = spec
                    .tokens()?
                    .into_iter()
                    .map(|token| {
                        Ok(Step {
                            rule: vocabulary.resolve(token.name())?,
                            argument: token.argument().map(str::to_owned),
                        })
                    })
                    .collect::<Result<Vec<_>, RuleError>>()?;
                Ok(CompiledField {
                    name: name.clone(),
                    steps,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(Self {
            vocabulary,
            fields,
            overrides: Overrides::default(),
        })
    }

    /// Use custom error messages.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Validate a form. `Err` means the rules themselves are broken.
    pub fn validate(&self, source: &dyn FormSource) -> Result<Validated, RuleError> {
        let mut data = FormData::new();
        let mut errors = FieldErrors::default();

        for field in &self.fields {
            self.run_field(field, source, &mut data, &mut errors)?;
        }

        if errors.is_empty() {
            Ok(Validated::Valid(data))
        } else {
            tracing::debug!(failed = errors.len(), errors = %errors, "Form validation failed");
            metrics::record_validation_failures(errors.len());
            Ok(Validated::Invalid(errors))
        }
    }

    fn run_field(
        &self,
        field: &CompiledField,
        source: &dyn FormSource,
        data: &mut FormData,
        errors: &mut FieldErrors,
    ) -> Result<(), RuleError> {
        let mut state = FieldState::default();

        for step in &field.steps {
            if state.skip_remaining {
                state.skip_remaining = false;
                break;
            }

            let raw;
            let value = match &step.argument {
                Some(argument) => argument.as_str(),
                None => {
                    raw = source.get(&field.name).trim().to_owned();
                    raw.as_str()
                }
            };

            let mut ctx = RuleContext::new(source, &mut state);
            match (step.rule.validator())(&mut ctx, &field.name, value) {
                Ok(()) => {}
                Err(ValidatorError::Misconfigured(e)) => return Err(e),
                Err(ValidatorError::Invalid(failure)) => {
                    let message = match self.overrides.resolve(&field.name, step.rule.name()) {
                        Some(message) => message.to_owned(),
                        None => failure.into_message(),
                    };
                    errors.insert(field.name.clone(), message);
                    break;
                }
            }

            if step.argument.is_none() && state.working.is_none() {
                state.working = Some(Value::String(value.to_owned()));
            }

            if !state.skip_remaining {
                if let Some(working) = &state.working {
                    data.insert(field.name.clone(), working.clone());
                }
            }
        }

        Ok(())
    }
}
