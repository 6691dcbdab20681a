//! Reduction example: gathering cell values onto their edges.

use super::*;

/// `out[e, k] = sum of in[c, k] over the cells c of edge e`.
pub fn neighbor_sum() -> Program {
    let column = interval(Start, End, 0, 0);
    let body = vec![assign_stmt(
        field_access("out"),
        reduce("+", neighbor_field_access("in"), double(0.0), [Edge, Cell]),
    )];

    program(
        "neighbor_sum_stencil.cpp",
        Unstructured,
        [stencil(
            "neighbor_sum_stencil",
            ast([vertical_region_stmt(body.into(), column, Forward)]),
            [
                field("in", unstructured_dimensions(Cell, true)),
                field("out", unstructured_dimensions(Edge, true)),
            ],
        )],
    )
}
