use std::collections::BTreeSet;

///
/// SchemaDiff
///
/// Symmetric difference between the staging projection and the target
/// table's columns, minus system-generated columns. Diagnostic only: the
/// pipeline reports drift and keeps going, it never mutates a schema.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SchemaDiff {
    /// Columns staging carries that the target table lacks.
    pub missing_in_target: Vec<String>,
    /// Columns the target table carries that staging lacks.
    pub missing_in_staging: Vec<String>,
}

impl SchemaDiff {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing_in_target.is_empty() && self.missing_in_staging.is_empty()
    }
}

/// Compare staging columns against target columns, ignoring the given
/// system-generated names on both sides. Output is sorted for stable
/// reporting.
#[must_use]
pub fn reconcile<S: AsRef<str>, T: AsRef<str>>(
    staging: &[S],
    target: &[T],
    ignored: &[&str],
) -> SchemaDiff {
    let staging_set: BTreeSet<&str> = staging
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| !ignored.contains(c))
        .collect();
    let target_set: BTreeSet<&str> = target
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| !ignored.contains(c))
        .collect();

    SchemaDiff {
        missing_in_target: staging_set
            .difference(&target_set)
            .map(ToString::to_string)
            .collect(),
        missing_in_staging: target_set
            .difference(&staging_set)
            .map(ToString::to_string)
            .collect(),
    }
}

///
/// TESTS
///
