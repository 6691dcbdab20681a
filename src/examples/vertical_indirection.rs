//! The vertical indirection stencil: six forward sweeps reading their
//! levels through a `vert_nbh` lookup field.

use super::*;

/// Six forward regions over one shared interval, each reading through (or
/// rewriting) the vertical indirection `vert_nbh`.
pub fn vertical_indirection() -> Program {
    let column = interval(Start, End, 0, 0);

    // out[c, k] = in[c, vert_nbh[c, k]]
    let body_1 = vec![assign_stmt(
        field_access("out"),
        indirected_field_access("in", 0, "vert_nbh"),
    )];
    // out[c, k] = in[c, vert_nbh[c, k] + 1]
    let body_2 = vec![assign_stmt(
        field_access("out"),
        indirected_field_access("in", 1, "vert_nbh"),
    )];
    // in_out[c, k] = in_out[c, vert_nbh[c, k] + 1]
    let body_3 = vec![assign_stmt(
        field_access("in_out"),
        indirected_field_access("in_out", 1, "vert_nbh"),
    )];
    // vert_nbh[c, k] = vert_nbh[c, k + 1], then read through the updated
    // lookup: out[c, k] = in[c, vert_nbh[c, k]]
    let body_4 = vec![
        assign_stmt(field_access("vert_nbh"), field_access_at("vert_nbh", 1)),
        assign_stmt(
            field_access("out"),
            indirected_field_access("in", 0, "vert_nbh"),
        ),
    ];
    // vert_nbh[c, k] = vert_nbh[c, k + 1], then
    // in_out[c, k] = in_out[c, vert_nbh[c, k] + 1]
    let body_5 = vec![
        assign_stmt(field_access("vert_nbh"), field_access_at("vert_nbh", 1)),
        assign_stmt(
            field_access("in_out"),
            indirected_field_access("in_out", 1, "vert_nbh"),
        ),
    ];
    // in[c, k] = in[c, vert_nbh[c, k] - 1]
    let body_6 = vec![assign_stmt(
        field_access("in"),
        indirected_field_access("in", -1, "vert_nbh"),
    )];

    let regions = [body_1, body_2, body_3, body_4, body_5, body_6]
        .map(|body| vertical_region_stmt(body.into(), column, Forward));

    program(
        "vertical_indirection_stencil.cpp",
        Unstructured,
        [stencil(
            "vertical_indirection_stencil",
            ast(regions),
            ["in", "in_out", "out", "vert_nbh"]
                .map(|name| field(name, unstructured_dimensions(Cell, true))),
        )],
    )
}
