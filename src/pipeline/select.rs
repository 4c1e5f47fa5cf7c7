//! Stage 1: seed field instances from the context's selectors.

use crate::context::Context;
use crate::request::Request;
use crate::select::{select_fields, FieldInstance};

/// Expands the context's fields across its locations and seeds the
/// instance list. The incoming instance list of a fresh run is empty;
/// selection replaces it entirely.
pub fn select(req: &Request, context: &Context) -> Vec<FieldInstance> {
    select_fields(req, &context.fields, &context.locations)
}
