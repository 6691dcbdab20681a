//! Setting up register caches for repeatedly read fields.

use crate::error::Result;
use crate::iir::accesses::profile_stmts;
use crate::iir::{KCache, StencilInstantiation, VerticalExtent};

/// Gives a read-only `KCache` to every non-temporary field that a multistage
/// reads at two or more distinct defined vertical shifts.
///
/// A field is disqualified as soon as anything makes its register window
/// unsound or useless there: it is written, accessed with a horizontal
/// offset, read through a vertical indirection, or serving as one.
pub(crate) fn run(instantiation: &mut StencilInstantiation) -> Result<()> {
    let fields = &instantiation.fields;
    for multistage in &mut instantiation.multistages {
        let statements = multistage
            .stages
            .iter()
            .flat_map(|stage| &stage.do_methods)
            .flat_map(|do_method| &do_method.statements);
        for (name, profile) in &profile_stmts(statements) {
            let temporary = fields
                .iter()
                .any(|field| field.name == *name && field.is_temporary);
            if temporary
                || profile.written
                || profile.horizontal
                || profile.indirection
                || profile.undefined_read
                || profile.read_shifts.len() < 2
                || multistage.cache(name).is_some()
            {
                continue;
            }
            let mut shifts = profile.read_shifts.iter();
            let Some(&first) = shifts.next() else {
                continue;
            };
            let window = shifts.fold(VerticalExtent::at(first), |window, &shift| {
                window.merge(VerticalExtent::at(shift))
            });
            multistage.caches.push(KCache {
                field: name.clone(),
                window,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examples::{smoother, vertical_indirection};
    use crate::lowering::Lowerer;

    #[test]
    fn a_three_point_column_read_gets_a_window() {
        let program = smoother();
        let mut lowered = Lowerer::new().lower(&program.stencils[0]).unwrap();
        run(&mut lowered).unwrap();
        let cache = lowered.multistages[0].cache("in").unwrap();
        assert_eq!(cache.window, VerticalExtent::Defined { minus: -1, plus: 1 });
        assert!(lowered.multistages[0].cache("out").is_none());
    }

    #[test]
    fn indirection_involved_fields_are_never_cached() {
        let program = vertical_indirection();
        let mut lowered = Lowerer::new().lower(&program.stencils[0]).unwrap();
        run(&mut lowered).unwrap();
        for multistage in &lowered.multistages {
            assert!(multistage.caches.is_empty());
        }
    }
}
