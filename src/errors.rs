//! Error types for every fallible maze operation.
//!
//! Generated by `error_chain!`, so the crate gets `Error`, `ErrorKind`, `ResultExt`
//! (for `chain_err`) and a `Result` alias whose error is our own `Error`.

use error_chain::error_chain;

use crate::cells::Coordinate;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        Json(::serde_json::Error);
        Image(::image::ImageError);
    }

    errors {
        InvalidDimension(width: u32, height: u32) {
            description("invalid grid dimension")
            display("invalid grid dimensions {}x{}: width and height must both be at least 2", width, height)
        }
        OutOfBounds(x: f64, y: f64, width: u32, height: u32) {
            description("position outside the grid")
            display("position ({}, {}) is outside the {}x{} grid", x, y, width, height)
        }
        NotAdjacent(a: Coordinate, b: Coordinate) {
            description("cells are not adjacent")
            display("cells {:?} and {:?} are not grid adjacent", a, b)
        }
        UnknownAlgorithm(name: String) {
            description("unknown maze generation algorithm")
            display("unknown maze generation algorithm '{}'", name)
        }
        InvalidFieldOfView(field_of_view: f64) {
            description("invalid field of view")
            display("field of view {} must be within (0, π) radians", field_of_view)
        }
        RayEscapedBounds(column: usize, steps: usize) {
            description("ray escaped the maze bounds")
            display("ray for screen column {} did not hit a wall within {} steps, the maze boundary is open", column, steps)
        }
        MalformedSnapshot(reason: String) {
            description("malformed grid snapshot")
            display("malformed grid snapshot: {}", reason)
        }
    }
}
