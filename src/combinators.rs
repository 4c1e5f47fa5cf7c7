//! Alternative grouping over whole chains.
//!
//! [`one_of`] accepts several alternatives, each one chain or a group of
//! chains that must all pass together. Every alternative runs in
//! non-persisting mode; if at least one passes, nothing is recorded. If
//! every alternative fails, a single *alternative* error wrapping all the
//! nested field errors attaches to the request.

use crate::chain::{RunError, ValidationChain};
use crate::context::Context;
use crate::error::ValidationError;
use crate::request::Request;

/// One alternative of a [`one_of`] grouping.
#[derive(Debug, Clone)]
pub enum OneOfGroup {
    /// A single chain that must pass.
    Chain(ValidationChain),
    /// A group of chains that must all pass together.
    Group(Vec<ValidationChain>),
}

impl OneOfGroup {
    fn chains(&self) -> &[ValidationChain] {
        match self {
            OneOfGroup::Chain(chain) => std::slice::from_ref(chain),
            OneOfGroup::Group(chains) => chains,
        }
    }
}

impl From<ValidationChain> for OneOfGroup {
    fn from(chain: ValidationChain) -> Self {
        OneOfGroup::Chain(chain)
    }
}

impl From<Vec<ValidationChain>> for OneOfGroup {
    fn from(chains: Vec<ValidationChain>) -> Self {
        OneOfGroup::Group(chains)
    }
}

/// Runs every alternative against the request in non-persisting mode.
///
/// All alternatives run to completion regardless of earlier outcomes. If
/// none passes, one alternative error wrapping every nested field error
/// attaches to the request, with the given message or the fallback
/// `"Invalid value(s)"`.
///
/// # Example
///
/// ```rust
/// use dragnet::{body, one_of, validation_result, OneOfGroup, Request};
/// use serde_json::json;
///
/// let mut req = Request::new().with_body(json!({}));
/// let by_email = body("email").custom(|v, _| Ok(v.is_some()));
/// let by_phone = body("phone").custom(|v, _| Ok(v.is_some()));
///
/// one_of(&mut req, vec![by_email.into(), by_phone.into()], Some("contact required".into()))
///     .unwrap();
///
/// let errors = validation_result(&req).array();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].message(), "contact required");
/// ```
pub fn one_of(
    req: &mut Request,
    groups: Vec<OneOfGroup>,
    message: Option<String>,
) -> Result<(), RunError> {
    let mut nested = Vec::new();
    let mut passed = false;
    for group in &groups {
        let mut group_errors = Vec::new();
        for chain in group.chains() {
            let context = chain.dry_run(req)?;
            group_errors.extend(context.errors().to_vec());
        }
        if group_errors.is_empty() {
            passed = true;
        } else {
            nested.extend(group_errors);
        }
    }

    let mut context = Context::surrogate();
    if !passed {
        context.add_error(ValidationError::Alternative {
            message: message.unwrap_or_else(|| "Invalid value(s)".to_string()),
            nested,
        });
    }
    req.push_context(context);
    Ok(())
}
