//! JSON (de)serialization of stencil descriptions.

use super::program::Program;
use crate::error::Result;

/// Serializes a program to pretty-printed JSON.
pub fn to_json(program: &Program) -> Result<String> {
    Ok(serde_json::to_string_pretty(program)?)
}

/// Deserializes a program from JSON.
pub fn from_json(json: &str) -> Result<Program> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::super::expr::{double, field_access};
    use super::super::field::{unstructured_dimensions, Field};
    use super::super::interval::{interval, Level};
    use super::super::program::{program, GridType};
    use super::super::region::LoopOrder;
    use super::super::stencil::stencil;
    use super::super::stmt::{assign_stmt, vertical_region_stmt};
    use super::super::{ast, field};
    use super::*;
    use crate::sir::field::LocationType;

    fn sample() -> Program {
        let body = ast([assign_stmt(field_access("out"), double(1.0))]);
        let column = interval(Level::Start, Level::End, 0, 0);
        let fields: Vec<Field> = ["in", "out"]
            .map(|name| field(name, unstructured_dimensions(LocationType::Cell, true)))
            .into();
        program(
            "sample.cpp",
            GridType::Unstructured,
            [stencil(
                "sample",
                ast([vertical_region_stmt(body, column, LoopOrder::Forward)]),
                fields,
            )],
        )
    }

    #[test]
    fn json_round_trips() {
        let program = sample();
        let json = to_json(&program).unwrap();
        assert_eq!(from_json(&json).unwrap(), program);
    }

    #[test]
    fn json_names_the_stencil() {
        let json = to_json(&sample()).unwrap();
        assert!(json.contains("\"sample\""));
        assert!(json.contains("\"Unstructured\""));
    }
}
