//! Column smoothing example: a three-point vertical average.

use super::*;

/// `out[c, k] = (in[c, k - 1] + in[c, k] + in[c, k + 1]) / 3` over the
/// interior levels. The three-shift read of `in` makes it the textbook
/// candidate for a vertical register cache.
pub fn smoother() -> Program {
    let column = interval(Start, End, 1, -1);
    let body = vec![assign_stmt(
        field_access("out"),
        binary(
            binary(
                binary(field_access_at("in", -1), "+", field_access("in")),
                "+",
                field_access_at("in", 1),
            ),
            "/",
            double(3.0),
        ),
    )];

    program(
        "smoother_stencil.cpp",
        Unstructured,
        [stencil(
            "smoother_stencil",
            ast([vertical_region_stmt(body.into(), column, Forward)]),
            ["in", "out"].map(|name| field(name, unstructured_dimensions(Cell, true))),
        )],
    )
}
