//! Server-side update scripts.
//!
//! The tag append runs as an inline painless script so the three-branch
//! conditional (create list, no-op, append) executes atomically inside the
//! engine. A client-side read-modify-write would lose updates under
//! concurrent crawls of different collections tagging the same document.

/// Build the conditional tag-append script for a list-valued field.
///
/// Branches:
/// 1. field absent: create it as a single-element list,
/// 2. tag already present: no-op (the engine skips the write entirely),
/// 3. otherwise: append the tag.
pub fn tag_append_script(field: &str) -> String {
    format!(
        "if (ctx._source.{field} == null) {{ ctx._source.{field} = [params.tag] }} \
         else if (ctx._source.{field}.contains(params.tag)) {{ ctx.op = 'noop' }} \
         else {{ ctx._source.{field}.add(params.tag) }}",
        field = field
    )
}
