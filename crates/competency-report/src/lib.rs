//! competency-report: Rendering of graded attempts.

pub mod html;
